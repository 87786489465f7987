//! Path extractor answering with [`Error`] bodies.

use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequestParts, Path as AxumPath};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};

/// Drop-in for [`axum::extract::Path`].
///
/// Malformed identifiers are rejected with [`ErrorKind::InvalidPathParam`].
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        <AxumPath<T> as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .map(|x| Self(x.0))
            .map_err(Into::into)
    }
}

impl From<PathRejection> for Error<'static> {
    fn from(rejection: PathRejection) -> Self {
        let kind = match rejection {
            PathRejection::FailedToDeserializePathParams(_) => ErrorKind::InvalidPathParam,
            _ => ErrorKind::InternalServerError,
        };
        kind.with_context(rejection.body_text())
    }
}
