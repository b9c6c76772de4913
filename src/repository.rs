use crate::errors::RepositoryError;
use crate::models::{Restaurant, User};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository Trait
///
/// The persistence contract used by the handlers. Implementations must be
/// `Send + Sync` so the trait object can be shared as `Arc<dyn Repository>`
/// across Axum's task boundaries.
///
/// Ownership rules are not enforced here; handlers check them before calling
/// the mutating methods.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Restaurants ---
    // All restaurants, oldest first.
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, RepositoryError>;
    async fn get_restaurant(&self, id: Uuid) -> Result<Option<Restaurant>, RepositoryError>;
    async fn create_restaurant(
        &self,
        name: String,
        user_id: Option<Uuid>,
    ) -> Result<Restaurant, RepositoryError>;
    // Returns None when no restaurant has this id.
    async fn update_restaurant(
        &self,
        id: Uuid,
        name: String,
    ) -> Result<Option<Restaurant>, RepositoryError>;
    // Returns true only if a row was removed.
    async fn delete_restaurant(&self, id: Uuid) -> Result<bool, RepositoryError>;

    // --- Users ---
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    // Fails with DuplicateEmail when the (normalized) email is taken.
    async fn create_user(
        &self,
        email: String,
        password_hash: String,
    ) -> Result<User, RepositoryError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL. Queries are bound at runtime so the crate
/// builds without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a unique-constraint violation to `duplicate`, logging anything else.
fn map_unique(err: sqlx::Error, duplicate: RepositoryError, op: &str) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return duplicate;
        }
    }
    tracing::error!("{op} error: {:?}", err);
    RepositoryError::Database(err)
}

fn log_err(op: &'static str) -> impl Fn(sqlx::Error) -> RepositoryError {
    move |err| {
        tracing::error!("{op} error: {:?}", err);
        RepositoryError::Database(err)
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, RepositoryError> {
        sqlx::query_as::<_, Restaurant>(
            r#"SELECT id, name, user_id, created_at, updated_at
               FROM restaurants
               ORDER BY created_at ASC, id ASC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(log_err("list_restaurants"))
    }

    async fn get_restaurant(&self, id: Uuid) -> Result<Option<Restaurant>, RepositoryError> {
        sqlx::query_as::<_, Restaurant>(
            r#"SELECT id, name, user_id, created_at, updated_at
               FROM restaurants
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_err("get_restaurant"))
    }

    async fn create_restaurant(
        &self,
        name: String,
        user_id: Option<Uuid>,
    ) -> Result<Restaurant, RepositoryError> {
        sqlx::query_as::<_, Restaurant>(
            r#"INSERT INTO restaurants (id, name, user_id, created_at, updated_at)
               VALUES ($1, $2, $3, NOW(), NOW())
               RETURNING id, name, user_id, created_at, updated_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique(e, RepositoryError::DuplicateName, "create_restaurant"))
    }

    async fn update_restaurant(
        &self,
        id: Uuid,
        name: String,
    ) -> Result<Option<Restaurant>, RepositoryError> {
        sqlx::query_as::<_, Restaurant>(
            r#"UPDATE restaurants
               SET name = $2, updated_at = NOW()
               WHERE id = $1
               RETURNING id, name, user_id, created_at, updated_at"#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique(e, RepositoryError::DuplicateName, "update_restaurant"))
    }

    async fn delete_restaurant(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let res = sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(log_err("delete_restaurant"))?;
        Ok(res.rows_affected() > 0)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_err("get_user"))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(log_err("find_user_by_email"))
    }

    async fn create_user(
        &self,
        email: String,
        password_hash: String,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, email, password_hash, created_at)
               VALUES ($1, $2, $3, NOW())
               RETURNING id, email, password_hash, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique(e, RepositoryError::DuplicateEmail, "create_user"))
    }
}

/// InMemoryRepository
///
/// Process-local `Repository` used for local runs without `DATABASE_URL` and by
/// the test suite. Vectors keep insertion order, which is the listing order.
#[derive(Default)]
pub struct InMemoryRepository {
    restaurants: RwLock<Vec<Restaurant>>,
    users: RwLock<Vec<User>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn name_taken(restaurants: &[Restaurant], name: &str, except: Option<Uuid>) -> bool {
    restaurants
        .iter()
        .any(|r| Some(r.id) != except && r.name.to_lowercase() == name.to_lowercase())
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, RepositoryError> {
        Ok(self.restaurants.read().await.clone())
    }

    async fn get_restaurant(&self, id: Uuid) -> Result<Option<Restaurant>, RepositoryError> {
        let restaurants = self.restaurants.read().await;
        Ok(restaurants.iter().find(|r| r.id == id).cloned())
    }

    async fn create_restaurant(
        &self,
        name: String,
        user_id: Option<Uuid>,
    ) -> Result<Restaurant, RepositoryError> {
        let mut restaurants = self.restaurants.write().await;
        if name_taken(&restaurants, &name, None) {
            return Err(RepositoryError::DuplicateName);
        }
        let now = Utc::now();
        let restaurant = Restaurant {
            id: Uuid::new_v4(),
            name,
            user_id,
            created_at: now,
            updated_at: now,
        };
        restaurants.push(restaurant.clone());
        Ok(restaurant)
    }

    async fn update_restaurant(
        &self,
        id: Uuid,
        name: String,
    ) -> Result<Option<Restaurant>, RepositoryError> {
        let mut restaurants = self.restaurants.write().await;
        if name_taken(&restaurants, &name, Some(id)) {
            return Err(RepositoryError::DuplicateName);
        }
        Ok(restaurants.iter_mut().find(|r| r.id == id).map(|r| {
            r.name = name;
            r.updated_at = Utc::now();
            r.clone()
        }))
    }

    async fn delete_restaurant(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut restaurants = self.restaurants.write().await;
        let before = restaurants.len();
        restaurants.retain(|r| r.id != id);
        Ok(restaurants.len() < before)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(
        &self,
        email: String,
        password_hash: String,
    ) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == email) {
            return Err(RepositoryError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }
}
