//! Router Module Index
//!
//! Splits the site's routes by access level. The session gate is applied as a
//! layer on the authenticated router in `create_router`, so a handler cannot be
//! exposed to anonymous visitors by accident.

/// Pages anyone can load: listing, detail, and the account forms.
pub mod public;

/// Routes that require a signed-in user (create, edit, update, delete).
pub mod authenticated;
