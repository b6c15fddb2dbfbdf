use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use retailhub_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(
    app_state: AppState,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let admin_routes = Router::new()
        .route(
            "/invitations",
            get(handlers::invitations::list_invitations_handler)
                .post(handlers::invitations::create_invitations_handler),
        )
        .route(
            "/retailers/notify",
            post(handlers::retailers::notify_retailer_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/invitations/track/pixel",
            get(handlers::tracking::tracking_pixel_handler),
        )
        .route(
            "/invitations/track/click",
            get(handlers::tracking::tracking_click_handler),
        )
        .route(
            "/activate/{token}",
            get(handlers::activation::activate_handler)
                .post(handlers::activation::activate_handler),
        );

    let cors_layer = cors::build_cors_layer(&app_state.frontend_url)?;

    Ok(Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}
