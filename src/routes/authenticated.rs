use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Every route here sits behind the session gate layered on in `create_router`:
/// anonymous visitors are redirected to `/users/sign_in` before the handler runs.
/// Creator-only checks for edit/update/delete happen inside the handlers.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /restaurants/new
        // The creation form. This is the page anonymous visitors never reach.
        .route("/restaurants/new", get(handlers::new_restaurant))
        // POST /restaurants
        // Creates a restaurant owned by the actor, then redirects to the listing.
        .route("/restaurants", post(handlers::create_restaurant))
        // GET /restaurants/{id}/edit
        .route("/restaurants/{id}/edit", get(handlers::edit_restaurant))
        // PATCH/DELETE /restaurants/{id}
        // POST carries the verb in `_method` for plain HTML forms.
        .route(
            "/restaurants/{id}",
            axum::routing::patch(handlers::update_restaurant)
                .put(handlers::update_restaurant)
                .delete(handlers::delete_restaurant)
                .post(handlers::submit_restaurant_form),
        )
}
