use std::sync::Arc;

use application::{ConnectionRegistry, DeliveryDispatcher, Persistence};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConnectionRegistry>,
    pub dispatcher: DeliveryDispatcher,
    pub persistence: Persistence,
}

impl AppState {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        dispatcher: DeliveryDispatcher,
        persistence: Persistence,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            persistence,
        }
    }
}
