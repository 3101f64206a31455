pub mod error;
pub mod routes;

use axum::Router;
use db::DBService;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
}

pub fn build_router(db: DBService) -> Router {
    let state = AppState { db };

    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(routes::quests::router())
                .merge(routes::notifications::router()),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
