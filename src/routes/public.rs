use crate::{AppState, handlers};
use axum::{
    Router,
    routing::get,
};

/// Public Router Module
///
/// Endpoints reachable without a session. Pages here still receive the actor as
/// `Option<AuthUser>` so they can show member-only links.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // The home page is the restaurant listing.
        .route("/", get(handlers::list_restaurants))
        // GET /restaurants
        // Every restaurant in creation order, or the "No restaurants yet" prompt.
        .route("/restaurants", get(handlers::list_restaurants))
        // GET /restaurants/{id}
        // Detail page of a single restaurant; 404 page for unknown ids.
        .route("/restaurants/{id}", get(handlers::show_restaurant))
        // GET /users/sign_up, POST /users
        // Account registration. A successful sign-up also signs the user in.
        .route("/users/sign_up", get(handlers::sign_up_form))
        .route("/users", axum::routing::post(handlers::sign_up))
        // GET/POST /users/sign_in
        .route(
            "/users/sign_in",
            get(handlers::sign_in_form).post(handlers::sign_in),
        )
        // GET/DELETE /users/sign_out
        // Ends the session. GET is accepted so a plain link works.
        .route(
            "/users/sign_out",
            get(handlers::sign_out).delete(handlers::sign_out),
        )
}
