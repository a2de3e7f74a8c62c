use std::sync::Arc;

use application::{
    ConnectionRegistry, DeliveryDispatcher, InMemorySocialStore, Persistence,
};
use axum::Router;
use domain::{UserId, UserProfile};
use web_api::{router, AppState};

/// 内存存储驱动的测试应用
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemorySocialStore>,
    pub registry: Arc<ConnectionRegistry>,
    pub dispatcher: DeliveryDispatcher,
}

/// 构建测试应用并预置两个用户档案
pub async fn build_app() -> TestApp {
    let store = Arc::new(InMemorySocialStore::new());
    for (id, username) in [(1, "alice"), (2, "bob")] {
        store
            .add_user(UserProfile {
                id: UserId::new(id).expect("valid id"),
                username: username.to_string(),
                profile_image: None,
            })
            .await;
    }

    let registry = Arc::new(ConnectionRegistry::new());
    let dispatcher = DeliveryDispatcher::new(registry.clone());
    let persistence = Persistence {
        messages: store.clone(),
        notifications: store.clone(),
        users: store.clone(),
    };
    let state = AppState::new(registry.clone(), dispatcher.clone(), persistence);

    TestApp {
        router: router(state),
        store,
        registry,
        dispatcher,
    }
}
