/// API routes and handlers
pub mod flash;
pub mod users;
pub mod views;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new().merge(users::routes())
}
