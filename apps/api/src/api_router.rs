mod cors;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use kinboard_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/api/events",
            get(handlers::events::list_events_handler)
                .post(handlers::events::create_event_handler),
        )
        .route(
            "/api/events/{event_id}",
            get(handlers::events::get_event_handler)
                .put(handlers::events::update_event_handler)
                .delete(handlers::events::delete_event_handler),
        )
        .route(
            "/api/events/{event_id}/invites",
            get(handlers::invites::list_invites_handler)
                .post(handlers::invites::create_invite_handler),
        )
        .route(
            "/api/events/{event_id}/invites/{invite_id}",
            axum::routing::delete(handlers::invites::delete_invite_handler),
        )
        .route(
            "/api/events/{event_id}/invites/{invite_id}/resend",
            post(handlers::invites::resend_invite_handler),
        )
        .route_layer(from_fn_with_state(app_state.clone(), middleware::require_auth));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route(
            "/confirm-invite",
            get(handlers::confirm::confirm_invite_handler),
        )
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
