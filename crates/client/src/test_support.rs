use std::sync::Arc;

use crate::app::App;
use crate::config::ClientConfig;
use crate::store::InMemorySessionStore;

/// Nothing listens here; every call fails with `Unreachable`.
pub(crate) const DEAD_API: &str = "http://127.0.0.1:9";

pub(crate) async fn offline_app(store: InMemorySessionStore) -> App {
    let config = ClientConfig::from_lookup(|key| match key {
        crate::config::API_URL_ENV => Some(DEAD_API.to_string()),
        crate::config::DATA_DIR_ENV => Some("/nonexistent".to_string()),
        _ => None,
    })
    .unwrap();
    App::with_store(config, Arc::new(store)).await.unwrap()
}
