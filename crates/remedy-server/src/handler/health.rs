//! Liveness probe.

use axum::Router;
use axum::routing::get;

use crate::extract::Json;
use crate::handler::response::Health;
use crate::service::ServiceState;

/// Answers as long as the process serves requests.
async fn health_status() -> Json<Health> {
    Json(Health::healthy())
}

/// Returns a [`Router`] with the health route.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::handler::test::create_test_server;
    use crate::service::testing::Harness;

    #[tokio::test]
    async fn health_is_public() -> anyhow::Result<()> {
        let harness = Harness::new(false);
        let server = create_test_server(&harness)?;

        let response = server.get("/health").await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.json::<Health>(), Health::healthy());
        Ok(())
    }
}
