use drivelog_core::{IdCodec, TokenCache};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<drivelog_db::Database>,
    pub codec: Arc<IdCodec>,
    pub tokens: TokenCache,
}
