use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the session store and report `degraded` when it does not answer.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.store().health_check().await {
        Ok(()) => HealthResponse::ok(),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::degraded()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn open_store_is_healthy() {
        let state = test_support::state().await;
        assert_eq!(health_status(&state).await.status, "ok");
    }
}
