//! Shared application state injected into every handler.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::QueryFacade;
use crate::application::services::AuthService;
use crate::domain::click_queue::QueuedClick;

/// Cheap to clone: every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub facade: Arc<QueryFacade>,
    pub auth_service: Arc<AuthService>,
    /// Producer side of the queue drained by the click worker.
    pub click_sender: mpsc::Sender<QueuedClick>,
}

impl AppState {
    pub fn new(
        facade: Arc<QueryFacade>,
        auth_service: Arc<AuthService>,
        click_sender: mpsc::Sender<QueuedClick>,
    ) -> Self {
        Self {
            facade,
            auth_service,
            click_sender,
        }
    }
}
