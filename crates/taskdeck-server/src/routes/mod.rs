pub mod health;
pub mod projects;
pub mod search;
pub mod tasks;
pub mod teams;
pub mod users;

use std::sync::Arc;

use axum::Router;
use taskdeck_service::LocalService;
use tower_http::cors::CorsLayer;

pub struct InnerAppState {
    pub service: LocalService,
}

pub type AppState = Arc<InnerAppState>;

pub fn build_router(service: LocalService) -> Router {
    let state: AppState = Arc::new(InnerAppState { service });

    Router::new()
        .merge(health::routes())
        .merge(tasks::routes())
        .merge(projects::routes())
        .merge(users::routes())
        .merge(teams::routes())
        .merge(search::routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
