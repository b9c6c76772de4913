use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidateLength, ValidationErrors};

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// An account holder, stored in the `users` table. The password is only ever
/// held as an Argon2 PHC string; the plaintext never reaches the repository.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    // Normalized (trimmed, lowercase) and unique.
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Restaurant
///
/// A listed restaurant from the `restaurants` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    // FK to users.id. Seeded rows may have no creator.
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Restaurant {
    /// Whether `user_id` may edit or delete this restaurant.
    ///
    /// Restaurants without a recorded creator can be managed by any signed-in user.
    pub fn is_managed_by(&self, user_id: Uuid) -> bool {
        self.user_id.is_none_or(|creator| creator == user_id)
    }
}

// --- Form Payloads (Input Schemas) ---

/// RestaurantForm
///
/// Body of the new/edit restaurant forms. Browsers can only submit GET and POST,
/// so the edit and delete forms carry the intended verb in a hidden `_method` field.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RestaurantForm {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "_method", default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl RestaurantForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method: None,
        }
    }

    /// Returns the trimmed name when it has at least `min_len` characters.
    pub fn validated_name(&self, min_len: u64) -> Result<String, FormErrors> {
        let name = self.name.trim().to_string();
        if !name.validate_length(Some(min_len), None, None) {
            return Err(FormErrors::single(format!(
                "Name is too short (minimum is {min_len} characters)"
            )));
        }
        Ok(name)
    }
}

/// SignUpForm
///
/// Body of the registration form (POST /users). Missing fields deserialize as
/// empty strings and are reported by validation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct SignUpForm {
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password is too short (minimum is 6 characters)"))]
    pub password: String,
    #[validate(must_match(
        other = "password",
        message = "Password confirmation doesn't match Password"
    ))]
    pub password_confirmation: String,
}

/// SignInForm
///
/// Body of the sign-in form (POST /users/sign_in).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

/// Trims and lowercases an email so lookups and uniqueness are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// --- Validation Feedback ---

/// FormErrors
///
/// Human readable messages shown in the error summary of a re-rendered form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormErrors(pub Vec<String>);

impl FormErrors {
    pub fn single(message: impl Into<String>) -> Self {
        Self(vec![message.into()])
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ValidationErrors> for FormErrors {
    /// Flattens derive-based validation failures, ordered by field name so the
    /// summary is stable between requests.
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|(a, _), (b, _)| a.cmp(b));

        let messages = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| {
                    err.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid"))
                })
            })
            .collect();

        Self(messages)
    }
}
