//! One-shot messages carried across a redirect.
//!
//! The cookie only stores a short key; the text shown to the user lives in
//! [`Flash::message`], so nothing user-controlled is echoed back from the cookie.

use tower_cookies::{Cookie, Cookies, cookie::SameSite};

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    SignedUp,
    SignedIn,
    SignedOut,
    SignInRequired,
    RestaurantCreated,
    RestaurantUpdated,
    RestaurantDeleted,
    EditForbidden,
    DeleteForbidden,
}

impl Flash {
    const ALL: [Flash; 9] = [
        Flash::SignedUp,
        Flash::SignedIn,
        Flash::SignedOut,
        Flash::SignInRequired,
        Flash::RestaurantCreated,
        Flash::RestaurantUpdated,
        Flash::RestaurantDeleted,
        Flash::EditForbidden,
        Flash::DeleteForbidden,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Flash::SignedUp => "signed_up",
            Flash::SignedIn => "signed_in",
            Flash::SignedOut => "signed_out",
            Flash::SignInRequired => "sign_in_required",
            Flash::RestaurantCreated => "restaurant_created",
            Flash::RestaurantUpdated => "restaurant_updated",
            Flash::RestaurantDeleted => "restaurant_deleted",
            Flash::EditForbidden => "edit_forbidden",
            Flash::DeleteForbidden => "delete_forbidden",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flash| flash.key() == key)
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::SignedUp => "Welcome! You have signed up successfully.",
            Flash::SignedIn => "Signed in successfully.",
            Flash::SignedOut => "Signed out successfully.",
            Flash::SignInRequired => "You need to sign in or sign up before continuing.",
            Flash::RestaurantCreated => "Restaurant created successfully",
            Flash::RestaurantUpdated => "Restaurant updated successfully",
            Flash::RestaurantDeleted => "Restaurant deleted successfully",
            Flash::EditForbidden => "You can only edit restaurants you have created",
            Flash::DeleteForbidden => "You can only delete restaurants you have created",
        }
    }

    /// Alerts report a refused action; everything else is a notice.
    pub fn is_alert(self) -> bool {
        matches!(
            self,
            Flash::SignInRequired | Flash::EditForbidden | Flash::DeleteForbidden
        )
    }
}

/// Queues `flash` for the next rendered page.
pub fn set(cookies: &Cookies, flash: Flash) {
    let mut cookie = Cookie::new(FLASH_COOKIE, flash.key());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookies.add(cookie);
}

/// Reads and clears the pending flash, if any.
pub fn take(cookies: &Cookies) -> Option<Flash> {
    let cookie = cookies.get(FLASH_COOKIE)?;
    let mut removal = Cookie::from(FLASH_COOKIE);
    removal.set_path("/");
    cookies.remove(removal);
    Flash::from_key(cookie.value())
}
