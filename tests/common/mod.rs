#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use ecotrack::config::EnvironmentConfig;
use ecotrack::models::{MaterialType, Role, User};
use ecotrack::repositories::MemoryStore;
use ecotrack::services::{CreateOrderInput, RegisterUser};
use ecotrack::test_utils::{GeoScript, RecordingDispatcher, ScriptedGeo};
use ecotrack::AppState;

pub const WAIT: Duration = Duration::from_secs(2);

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub geo: Arc<ScriptedGeo>,
    pub notifier: Arc<RecordingDispatcher>,
    pub state: AppState,
    pub client: User,
    pub other_client: User,
    pub logistic: User,
    pub second_logistic: User,
    pub manager: User,
    pub admin: User,
}

pub async fn harness(script: GeoScript) -> Harness {
    let mut config = EnvironmentConfig::default();
    config.routing.geo_timeout = Duration::from_millis(100);
    config.notification_timeout = Duration::from_millis(500);

    let store = Arc::new(MemoryStore::new());
    let geo = Arc::new(ScriptedGeo::new(script));
    let notifier = Arc::new(RecordingDispatcher::new());
    let state = AppState::new(config, store.clone(), geo.clone(), notifier.clone());

    let client = register(&state, "client@example.com", None).await;
    let other_client = register(&state, "other@example.com", None).await;
    let logistic = register(&state, "ops@logistic.com", None).await;
    let second_logistic = register(&state, "night@logistic.com", None).await;
    let manager = register(&state, "boss@manager.com", None).await;
    let admin = register(&state, "root@admin.com", None).await;

    assert_eq!(logistic.role, Role::Logistic);
    assert_eq!(manager.role, Role::Manager);
    assert_eq!(admin.role, Role::Admin);

    Harness {
        store,
        geo,
        notifier,
        state,
        client,
        other_client,
        logistic,
        second_logistic,
        manager,
        admin,
    }
}

pub async fn register(state: &AppState, email: &str, role: Option<&str>) -> User {
    state
        .users
        .register_user(RegisterUser {
            email: email.to_string(),
            company_name: None,
            role: role.map(str::to_string),
        })
        .await
        .unwrap()
}

pub fn pet_order() -> CreateOrderInput {
    CreateOrderInput {
        material_type: MaterialType::Pet,
        volume_kg: 100.0,
        pickup_address: "Address A".to_string(),
    }
}
