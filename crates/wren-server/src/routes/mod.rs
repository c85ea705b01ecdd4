// Export route modules
pub mod index;
pub mod reply;
pub mod session;

#[cfg(test)]
pub mod testing;

use crate::state::AppState;
use axum::Router;

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(index::routes())
        .merge(reply::routes(state.clone()))
        .merge(session::routes(state))
}
