//! JSON body extractor answering with [`Error`] bodies.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Json as AxumJson, Request};
use axum::response::{IntoResponse, Response};
use derive_more::{Deref, DerefMut, From};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};

/// Drop-in for [`axum::Json`] whose rejections are JSON errors.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extractor = <AxumJson<T> as FromRequest<S>>::from_request(req, state).await;
        extractor.map(|x| Self(x.0)).map_err(Into::into)
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    #[inline]
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

impl From<JsonRejection> for Error<'static> {
    fn from(rejection: JsonRejection) -> Self {
        let message = match &rejection {
            JsonRejection::JsonDataError(_) => "Request body does not match the expected fields",
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
            JsonRejection::MissingJsonContentType(_) => "Content-Type must be application/json",
            JsonRejection::BytesRejection(_) => "Request body could not be read",
            _ => return ErrorKind::InternalServerError.with_context(rejection.body_text()),
        };
        ErrorKind::BadRequest
            .with_message(message)
            .with_context(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;

    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Event {
        #[allow(dead_code)]
        version_id: uuid::Uuid,
    }

    async fn extract(content_type: &str, body: &'static str) -> Result<Json<Event>, Error<'static>> {
        let request = axum::http::Request::builder()
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .map_err(|_| Error::new(ErrorKind::InternalServerError))?;
        Json::<Event>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn malformed_bodies_are_bad_requests() {
        let syntax = extract("application/json", "{").await.expect_err("truncated body");
        assert_eq!(syntax.kind(), ErrorKind::BadRequest);
        assert_eq!(syntax.message(), Some("Request body is not valid JSON"));

        let fields = extract("application/json", r#"{"version_id": 7}"#)
            .await
            .expect_err("wrong field type");
        assert_eq!(fields.message(), Some("Request body does not match the expected fields"));

        let content_type = extract("text/plain", "{}").await.expect_err("not json");
        assert_eq!(content_type.kind(), ErrorKind::BadRequest);
    }
}
