//! HTML pages for the restaurant listing site.
//!
//! Simple inline templates without a template engine. Every value that came
//! from a user goes through [`html_escape`].

use axum::http::StatusCode;

use crate::{auth::AuthUser, flash::Flash, models::{FormErrors, Restaurant}};

/// Per-request page context: who is looking, and any pending flash.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub actor: Option<AuthUser>,
    pub flash: Option<Flash>,
}

const STYLES: &str = r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Arial, sans-serif;
        max-width: 800px;
        margin: 40px auto;
        padding: 0 20px;
        background: #f5f5f5;
    }
    .container {
        background: white;
        padding: 30px;
        border-radius: 8px;
        box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    }
    nav { margin-bottom: 20px; color: #666; }
    nav a { margin-right: 10px; }
    .notice { color: #3c763d; background: #dff0d8; padding: 10px; border-radius: 4px; }
    .alert { color: #d9534f; background: #f2dede; padding: 10px; border-radius: 4px; }
    #error_explanation { border: 2px solid #d9534f; padding: 10px; margin: 10px 0; }
    #error_explanation h2 { font-size: 16px; color: #d9534f; margin: 0 0 8px; }
    .restaurant { border-bottom: 1px solid #ddd; padding: 10px 0; }
    .restaurant form { display: inline; }
    label { display: block; font-weight: bold; margin-bottom: 5px; }
    input[type="text"], input[type="email"], input[type="password"] {
        width: 100%;
        padding: 8px;
        box-sizing: border-box;
    }
    .field { margin: 12px 0; }
"#;

fn layout(title: &str, ctx: &PageContext, body: &str) -> String {
    let account = match &ctx.actor {
        Some(actor) => format!(
            r#"<span>Signed in as {}</span> <a href="/users/sign_out">Sign out</a>"#,
            html_escape(&actor.email)
        ),
        None => r#"<a href="/users/sign_in">Sign in</a> <a href="/users/sign_up">Sign up</a>"#
            .to_string(),
    };

    let flash_html = ctx.flash.map_or(String::new(), |flash| {
        let class = if flash.is_alert() { "alert" } else { "notice" };
        format!(r#"<p class="{class}">{}</p>"#, flash.message())
    });

    document(title, &account, &flash_html, body)
}

/// The page skeleton. `account` holds the sign in/out links of the nav bar.
fn document(title: &str, account: &str, flash_html: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>{STYLES}</style>
</head>
<body>
    <div class="container">
        <nav><a href="/restaurants">Restaurants</a> {account}</nav>
        {flash_html}
        {body}
    </div>
</body>
</html>"#,
        title = html_escape(title),
    )
}

/// Render the restaurant listing (also served at `/`).
pub fn restaurants_index(restaurants: &[Restaurant], ctx: &PageContext) -> String {
    let listing = if restaurants.is_empty() {
        "<p>No restaurants yet</p>".to_string()
    } else {
        restaurants
            .iter()
            .map(|restaurant| restaurant_entry(restaurant, ctx.actor.is_some()))
            .collect::<String>()
    };

    let body = format!(
        r#"<h1>Restaurants</h1>
        {listing}
        <p><a href="/restaurants/new">Add a restaurant</a></p>"#
    );
    layout("Restaurants", ctx, &body)
}

fn restaurant_entry(restaurant: &Restaurant, signed_in: bool) -> String {
    let name = html_escape(&restaurant.name);
    let id = restaurant.id;
    let actions = if signed_in {
        format!(
            r#"<a href="/restaurants/{id}/edit">Edit {name}</a>
            <form method="POST" action="/restaurants/{id}">
                <input type="hidden" name="_method" value="delete">
                <button type="submit">Delete {name}</button>
            </form>"#
        )
    } else {
        String::new()
    };

    format!(
        r#"<div class="restaurant">
            <h2><a href="/restaurants/{id}">{name}</a></h2>
            {actions}
        </div>"#
    )
}

/// Render a single restaurant.
pub fn restaurant_show(restaurant: &Restaurant, ctx: &PageContext) -> String {
    let name = html_escape(&restaurant.name);
    let edit = if ctx.actor.is_some() {
        format!(r#"<a href="/restaurants/{}/edit">Edit {name}</a>"#, restaurant.id)
    } else {
        String::new()
    };
    let body = format!(
        r#"<h1>{name}</h1>
        <p>{edit} <a href="/restaurants">Back to restaurants</a></p>"#
    );
    layout(&restaurant.name, ctx, &body)
}

/// Render the new-restaurant form, optionally re-populated after a failed submit.
pub fn restaurant_new(name: &str, errors: Option<&FormErrors>, ctx: &PageContext) -> String {
    let form = restaurant_form("/restaurants", None, name, errors, "Create Restaurant");
    let body = format!("<h1>New Restaurant</h1>{form}");
    layout("New Restaurant", ctx, &body)
}

/// Render the edit form for `restaurant`, showing `name` in the field.
pub fn restaurant_edit(
    restaurant: &Restaurant,
    name: &str,
    errors: Option<&FormErrors>,
    ctx: &PageContext,
) -> String {
    let action = format!("/restaurants/{}", restaurant.id);
    let form = restaurant_form(&action, Some("patch"), name, errors, "Update Restaurant");
    let body = format!("<h1>Editing Restaurant</h1>{form}");
    layout("Edit Restaurant", ctx, &body)
}

fn restaurant_form(
    action: &str,
    method: Option<&str>,
    name: &str,
    errors: Option<&FormErrors>,
    submit: &str,
) -> String {
    let method_field = method.map_or(String::new(), |m| {
        format!(r#"<input type="hidden" name="_method" value="{m}">"#)
    });
    format!(
        r#"{errors}
        <form method="POST" action="{action}">
            {method_field}
            <div class="field">
                <label for="restaurant_name">Name</label>
                <input type="text" id="restaurant_name" name="name" value="{name}">
            </div>
            <button type="submit">{submit}</button>
        </form>"#,
        errors = error_summary("restaurant", errors),
        name = html_escape(name),
    )
}

/// Render the sign-up form.
pub fn sign_up_page(email: &str, errors: Option<&FormErrors>, ctx: &PageContext) -> String {
    let body = format!(
        r#"<h1>Sign up</h1>
        {errors}
        <form method="POST" action="/users">
            <div class="field">
                <label for="user_email">Email</label>
                <input type="email" id="user_email" name="email" value="{email}" autofocus>
            </div>
            <div class="field">
                <label for="user_password">Password</label>
                <input type="password" id="user_password" name="password">
            </div>
            <div class="field">
                <label for="user_password_confirmation">Password confirmation</label>
                <input type="password" id="user_password_confirmation" name="password_confirmation">
            </div>
            <button type="submit">Sign up</button>
        </form>
        <p><a href="/users/sign_in">Sign in</a></p>"#,
        errors = error_summary("user", errors),
        email = html_escape(email),
    );
    layout("Sign up", ctx, &body)
}

/// Render the sign-in form.
pub fn sign_in_page(email: &str, error: Option<&str>, ctx: &PageContext) -> String {
    let error_html = error.map_or(String::new(), |e| {
        format!(r#"<p class="alert">{}</p>"#, html_escape(e))
    });
    let body = format!(
        r#"<h1>Sign in</h1>
        {error_html}
        <form method="POST" action="/users/sign_in">
            <div class="field">
                <label for="user_email">Email</label>
                <input type="email" id="user_email" name="email" value="{email}" autofocus>
            </div>
            <div class="field">
                <label for="user_password">Password</label>
                <input type="password" id="user_password" name="password">
            </div>
            <button type="submit">Sign in</button>
        </form>
        <p><a href="/users/sign_up">Sign up</a></p>"#,
        email = html_escape(email),
    );
    layout("Sign in", ctx, &body)
}

/// Render a bare error page for `status`.
pub fn error_page(status: StatusCode) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        r#"<h1>{} {reason}</h1>
        <p><a href="/restaurants">Back to restaurants</a></p>"#,
        status.as_u16()
    );
    // Error responses do not know the actor, so the account links are left out.
    document(reason, "", "", &body)
}

fn error_summary(model: &str, errors: Option<&FormErrors>) -> String {
    let Some(errors) = errors.filter(|e| !e.is_empty()) else {
        return String::new();
    };
    let count = errors.len();
    let noun = if count == 1 { "error" } else { "errors" };
    let items: String = errors
        .messages()
        .iter()
        .map(|m| format!("<li>{}</li>", html_escape(m)))
        .collect();
    format!(
        r#"<div id="error_explanation">
            <h2>{count} {noun} prohibited this {model} from being saved:</h2>
            <ul>{items}</ul>
        </div>"#
    )
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
