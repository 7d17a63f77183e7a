/// HTTP router assembly
use crate::{api, middleware, state::AppState};
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the application router
///
/// `/api` routes are JSON endpoints; everything else is served from
/// `web_dir` with `index.html` as the SPA fallback, behind the session guard.
pub fn create_router(app_state: AppState, web_dir: &Path) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(api::health::health))
        .route("/auth/sign-up", post(api::auth::sign_up))
        .route("/auth/sign-in", post(api::auth::sign_in))
        .route("/auth/federated", post(api::auth::federated))
        .route("/auth/sign-out", post(api::auth::sign_out));

    // Protected routes (ID token required)
    let protected_routes = Router::new()
        .route(
            "/profile",
            get(api::profile::get_profile).post(api::profile::write_profile),
        )
        .route("/profiles", get(api::profile::list_profiles))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth_middleware,
        ));

    // Static file serving for web UI (SPA with fallback to index.html)
    let pages = ServeDir::new(web_dir).fallback(ServeFile::new(web_dir.join("index.html")));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .fallback_service(pages)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            middleware::session_guard_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
