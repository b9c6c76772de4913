use crate::{
    AppState,
    auth::{self, AuthUser},
    errors::{AppError, RepositoryError},
    flash::{self, Flash},
    models::{FormErrors, RestaurantForm, SignInForm, SignUpForm, normalize_email},
    templates::{self, PageContext},
};
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;
use uuid::Uuid;
use validator::Validate;

const RESTAURANTS_PATH: &str = "/restaurants";

/// Builds the page context, consuming any pending flash.
fn page_context(actor: Option<AuthUser>, cookies: &Cookies) -> PageContext {
    PageContext {
        actor,
        flash: flash::take(cookies),
    }
}

/// Ids that do not parse get the same 404 page as unknown ones.
fn restaurant_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

/// Redirects to the listing with `message` queued for display.
fn back_to_listing(cookies: &Cookies, message: Flash) -> Response {
    flash::set(cookies, message);
    Redirect::to(RESTAURANTS_PATH).into_response()
}

// --- Restaurant Handlers ---

/// list_restaurants
///
/// [Public Route] GET /restaurants (and GET /). Renders every restaurant, or the
/// empty-state prompt. Edit/delete controls only appear for signed-in visitors.
pub async fn list_restaurants(
    actor: Option<AuthUser>,
    cookies: Cookies,
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let restaurants = state.repo.list_restaurants().await?;
    let ctx = page_context(actor, &cookies);
    Ok(Html(templates::restaurants_index(&restaurants, &ctx)))
}

/// show_restaurant
///
/// [Public Route] GET /restaurants/{id}.
pub async fn show_restaurant(
    actor: Option<AuthUser>,
    cookies: Cookies,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = restaurant_id(&raw_id)?;
    let restaurant = state
        .repo
        .get_restaurant(id)
        .await?
        .ok_or(AppError::NotFound)?;
    let ctx = page_context(actor, &cookies);
    Ok(Html(templates::restaurant_show(&restaurant, &ctx)))
}

/// new_restaurant
///
/// [Authenticated Route] GET /restaurants/new. Anonymous visitors never get here:
/// the `AuthUser` extractor redirects them to the sign-in page.
pub async fn new_restaurant(actor: AuthUser, cookies: Cookies) -> Html<String> {
    let ctx = page_context(Some(actor), &cookies);
    Html(templates::restaurant_new("", None, &ctx))
}

/// create_restaurant
///
/// [Authenticated Route] POST /restaurants. The actor is recorded as creator.
/// An invalid name re-renders the form (422) and persists nothing.
pub async fn create_restaurant(
    actor: AuthUser,
    cookies: Cookies,
    State(state): State<AppState>,
    Form(form): Form<RestaurantForm>,
) -> Result<Response, AppError> {
    let name = match form.validated_name(state.config.min_name_length) {
        Ok(name) => name,
        Err(errors) => return Ok(new_form_with_errors(actor, &cookies, &form, &errors)),
    };

    match state.repo.create_restaurant(name, Some(actor.id)).await {
        Ok(restaurant) => {
            tracing::info!(restaurant_id = %restaurant.id, user_id = %actor.id, "restaurant created");
            Ok(back_to_listing(&cookies, Flash::RestaurantCreated))
        }
        Err(RepositoryError::DuplicateName) => {
            let errors = FormErrors::single("Name has already been taken");
            Ok(new_form_with_errors(actor, &cookies, &form, &errors))
        }
        Err(e) => Err(e.into()),
    }
}

fn new_form_with_errors(
    actor: AuthUser,
    cookies: &Cookies,
    form: &RestaurantForm,
    errors: &FormErrors,
) -> Response {
    let ctx = page_context(Some(actor), cookies);
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Html(templates::restaurant_new(&form.name, Some(errors), &ctx)),
    )
        .into_response()
}

/// edit_restaurant
///
/// [Authenticated Route] GET /restaurants/{id}/edit. Only the creator gets the
/// form; anyone else is sent back to the listing with an alert.
pub async fn edit_restaurant(
    actor: AuthUser,
    cookies: Cookies,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let id = restaurant_id(&raw_id)?;
    let restaurant = state
        .repo
        .get_restaurant(id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !restaurant.is_managed_by(actor.id) {
        tracing::warn!(restaurant_id = %id, user_id = %actor.id, "edit refused: not the creator");
        return Ok(back_to_listing(&cookies, Flash::EditForbidden));
    }

    let ctx = page_context(Some(actor), &cookies);
    Ok(Html(templates::restaurant_edit(&restaurant, &restaurant.name, None, &ctx)).into_response())
}

/// update_restaurant
///
/// [Authenticated Route] PATCH /restaurants/{id}. Ownership is checked before
/// anything else; the new name goes through the same validation as create.
pub async fn update_restaurant(
    actor: AuthUser,
    cookies: Cookies,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Form(form): Form<RestaurantForm>,
) -> Result<Response, AppError> {
    let id = restaurant_id(&raw_id)?;
    apply_update(actor, cookies, state, id, form).await
}

async fn apply_update(
    actor: AuthUser,
    cookies: Cookies,
    state: AppState,
    id: Uuid,
    form: RestaurantForm,
) -> Result<Response, AppError> {
    let restaurant = state
        .repo
        .get_restaurant(id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !restaurant.is_managed_by(actor.id) {
        tracing::warn!(restaurant_id = %id, user_id = %actor.id, "update refused: not the creator");
        return Ok(back_to_listing(&cookies, Flash::EditForbidden));
    }

    let errors = match form.validated_name(state.config.min_name_length) {
        Ok(name) => match state.repo.update_restaurant(id, name).await {
            Ok(Some(updated)) => {
                tracing::info!(restaurant_id = %updated.id, user_id = %actor.id, "restaurant updated");
                return Ok(back_to_listing(&cookies, Flash::RestaurantUpdated));
            }
            // Removed between the ownership check and the update.
            Ok(None) => return Err(AppError::NotFound),
            Err(RepositoryError::DuplicateName) => FormErrors::single("Name has already been taken"),
            Err(e) => return Err(e.into()),
        },
        Err(errors) => errors,
    };

    let ctx = page_context(Some(actor), &cookies);
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        Html(templates::restaurant_edit(&restaurant, &form.name, Some(&errors), &ctx)),
    )
        .into_response())
}

/// delete_restaurant
///
/// [Authenticated Route] DELETE /restaurants/{id}. Only the creator may delete.
pub async fn delete_restaurant(
    actor: AuthUser,
    cookies: Cookies,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let id = restaurant_id(&raw_id)?;
    apply_delete(actor, cookies, state, id).await
}

async fn apply_delete(
    actor: AuthUser,
    cookies: Cookies,
    state: AppState,
    id: Uuid,
) -> Result<Response, AppError> {
    let restaurant = state
        .repo
        .get_restaurant(id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !restaurant.is_managed_by(actor.id) {
        tracing::warn!(restaurant_id = %id, user_id = %actor.id, "delete refused: not the creator");
        return Ok(back_to_listing(&cookies, Flash::DeleteForbidden));
    }

    if !state.repo.delete_restaurant(id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(restaurant_id = %id, user_id = %actor.id, "restaurant deleted");
    Ok(back_to_listing(&cookies, Flash::RestaurantDeleted))
}

/// submit_restaurant_form
///
/// [Authenticated Route] POST /restaurants/{id}. HTML forms can only POST, so the
/// edit and delete forms name the real verb in a hidden `_method` field.
pub async fn submit_restaurant_form(
    actor: AuthUser,
    cookies: Cookies,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Form(form): Form<RestaurantForm>,
) -> Result<Response, AppError> {
    let id = restaurant_id(&raw_id)?;
    match form.method.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("patch") | Some("put") => apply_update(actor, cookies, state, id, form).await,
        Some("delete") => apply_delete(actor, cookies, state, id).await,
        _ => Ok(StatusCode::METHOD_NOT_ALLOWED.into_response()),
    }
}

// --- User Handlers ---

/// sign_up_form
///
/// [Public Route] GET /users/sign_up. Signed-in users are sent home.
pub async fn sign_up_form(actor: Option<AuthUser>, cookies: Cookies) -> Response {
    if actor.is_some() {
        return Redirect::to("/").into_response();
    }
    let ctx = page_context(None, &cookies);
    Html(templates::sign_up_page("", None, &ctx)).into_response()
}

/// sign_up
///
/// [Public Route] POST /users. Creates the account, hashes the password, and
/// signs the new user in for the rest of the visit.
pub async fn sign_up(
    cookies: Cookies,
    State(state): State<AppState>,
    Form(form): Form<SignUpForm>,
) -> Result<Response, AppError> {
    let form = SignUpForm {
        email: normalize_email(&form.email),
        ..form
    };

    if let Err(errors) = form.validate() {
        return Ok(sign_up_with_errors(&cookies, &form.email, &errors.into()));
    }

    let password_hash = auth::hash_password(&form.password)?;
    let user = match state.repo.create_user(form.email.clone(), password_hash).await {
        Ok(user) => user,
        Err(RepositoryError::DuplicateEmail) => {
            let errors = FormErrors::single("Email has already been taken");
            return Ok(sign_up_with_errors(&cookies, &form.email, &errors));
        }
        Err(e) => return Err(e.into()),
    };

    auth::start_session(&cookies, user.id, &state.config)?;
    tracing::info!(user_id = %user.id, "user signed up");
    flash::set(&cookies, Flash::SignedUp);
    Ok(Redirect::to("/").into_response())
}

fn sign_up_with_errors(cookies: &Cookies, email: &str, errors: &FormErrors) -> Response {
    let ctx = page_context(None, cookies);
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Html(templates::sign_up_page(email, Some(errors), &ctx)),
    )
        .into_response()
}

/// sign_in_form
///
/// [Public Route] GET /users/sign_in. Also the landing page for gated redirects,
/// so it shows any pending alert.
pub async fn sign_in_form(actor: Option<AuthUser>, cookies: Cookies) -> Response {
    if actor.is_some() {
        return Redirect::to("/").into_response();
    }
    let ctx = page_context(None, &cookies);
    Html(templates::sign_in_page("", None, &ctx)).into_response()
}

/// sign_in
///
/// [Public Route] POST /users/sign_in. Unknown email and wrong password give the
/// same message.
pub async fn sign_in(
    cookies: Cookies,
    State(state): State<AppState>,
    Form(form): Form<SignInForm>,
) -> Result<Response, AppError> {
    let email = normalize_email(&form.email);
    let user = state
        .repo
        .find_user_by_email(&email)
        .await?
        .filter(|user| auth::verify_password(&form.password, &user.password_hash));

    let Some(user) = user else {
        tracing::info!("failed sign-in attempt");
        let ctx = page_context(None, &cookies);
        return Ok((
            StatusCode::UNAUTHORIZED,
            Html(templates::sign_in_page(&email, Some("Invalid Email or password."), &ctx)),
        )
            .into_response());
    };

    auth::start_session(&cookies, user.id, &state.config)?;
    tracing::info!(user_id = %user.id, "user signed in");
    flash::set(&cookies, Flash::SignedIn);
    Ok(Redirect::to("/").into_response())
}

/// sign_out
///
/// [Public Route] GET/DELETE /users/sign_out. Safe to call without a session.
pub async fn sign_out(actor: Option<AuthUser>, cookies: Cookies) -> Redirect {
    auth::end_session(&cookies);
    if let Some(actor) = actor {
        tracing::info!(user_id = %actor.id, "user signed out");
    }
    flash::set(&cookies, Flash::SignedOut);
    Redirect::to("/")
}
