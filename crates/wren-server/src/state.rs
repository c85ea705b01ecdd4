use std::sync::Arc;
use wren::controller::TurnController;

/// Shared application state
///
/// Every request goes through the same controller, so the page and the API read one history.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<TurnController>,
}

impl AppState {
    pub fn new(controller: TurnController) -> Self {
        Self {
            controller: Arc::new(controller),
        }
    }
}
