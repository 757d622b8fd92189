//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::Store;
use crate::services::{
    GeoDistance, NotificationDispatcher, NotificationService, OrderWorkflow, PricingEngine, RoleResolver,
    RouteGenerator, UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub store: Arc<dyn Store>,
    pub pricing: PricingEngine,
    pub routes: RouteGenerator,
    pub workflow: OrderWorkflow,
    pub users: UserService,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        store: Arc<dyn Store>,
        geo: Arc<dyn GeoDistance>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        let pricing = PricingEngine::new(Arc::new(config.pricing.clone()));
        let routes = RouteGenerator::new(store.clone(), geo, Arc::new(config.routing.clone()));
        let notifications = NotificationService::new(dispatcher, config.notification_timeout);
        let workflow = OrderWorkflow::new(store.clone(), pricing.clone(), routes.clone(), notifications);
        let users = UserService::new(store.clone(), RoleResolver::new(Arc::new(config.role_domains.clone())));

        Self {
            config: Arc::new(config),
            store,
            pricing,
            routes,
            workflow,
            users,
        }
    }
}
