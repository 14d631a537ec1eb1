use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_codes_handler, delete_code_handler, get_code_handler, health_handler,
    list_codes_handler, purge_invalid_handler, search_codes_handler, update_code_handler,
    update_status_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            // axum 0.8 `nest` matches the inner `/` route at `/v1/codes` but not at
            // the trailing-slash `/v1/codes/`; register the collection route here so
            // both forms reach the same handlers.
            .route(
                "/v1/codes/",
                post(create_codes_handler).get(list_codes_handler),
            )
            .nest(
                "/v1/codes",
                Router::new()
                    .route("/", post(create_codes_handler).get(list_codes_handler))
                    .route("/search", get(search_codes_handler))
                    .route("/invalid", delete(purge_invalid_handler))
                    .route(
                        "/{id}",
                        get(get_code_handler)
                            .put(update_code_handler)
                            .delete(delete_code_handler),
                    )
                    .route("/{id}/status", put(update_status_handler)),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
