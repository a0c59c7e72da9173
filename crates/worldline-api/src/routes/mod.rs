//! Route modules organized by bounded context.

pub mod checkpoints;
pub mod health;
pub mod import;
pub mod layout;
pub mod segments;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use worldline_checkpoint::domain::store::{NodeStore, StoreSettings};
    use worldline_core::model::Node;
    use worldline_core::repository::{CheckpointRepository, PersistedStore};
    use worldline_test_support::{EmptyCheckpointRepository, FixedClock, SequentialIds, fixed_now};

    use crate::state::AppState;

    pub(crate) fn state_with(nodes: Vec<Node>) -> AppState {
        state_with_repository(nodes, Arc::new(EmptyCheckpointRepository))
    }

    pub(crate) fn state_with_repository(
        nodes: Vec<Node>,
        repository: Arc<dyn CheckpointRepository>,
    ) -> AppState {
        let store = NodeStore::from_persisted(
            PersistedStore {
                nodes,
                ..PersistedStore::default()
            },
            StoreSettings::default(),
        );
        AppState::new(
            Arc::new(FixedClock(fixed_now())),
            Arc::new(SequentialIds::default()),
            store,
            repository,
        )
    }

    /// Sends one request and returns the status plus the JSON body (`Null`
    /// for an empty body).
    pub(crate) async fn send(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<&serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(json).unwrap())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
