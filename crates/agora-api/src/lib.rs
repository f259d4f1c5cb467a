pub mod answers;
pub mod comments;
pub mod error;
pub mod messages;
pub mod questions;
pub mod routes;
pub mod users;

use std::sync::Arc;

use agora_db::Database;
use agora_gateway::dispatcher::Dispatcher;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub dispatcher: Dispatcher,
}
