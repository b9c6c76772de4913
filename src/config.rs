use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup and
/// immutable afterwards; handlers and extractors pull it out of the shared state via FromRef.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Postgres connection string. Absent locally means the in-memory store is used.
    pub db_url: Option<String>,
    // Address the HTTP listener binds to.
    pub bind_addr: String,
    // Runtime environment marker. Controls the dev bypass and log format.
    pub env: Env,
    // HMAC secret used to sign and verify session tokens.
    pub session_secret: String,
    // Lifetime of a session token, in seconds.
    pub session_ttl_secs: u64,
    // Minimum number of characters in a restaurant name.
    pub min_name_length: u64,
}

/// Env
///
/// Runtime context: local development conveniences vs. hardened production settings.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const LOCAL_SESSION_SECRET: &str = "restaurant-portal-local-session-secret";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60 * 24;
const DEFAULT_MIN_NAME_LENGTH: u64 = 3;
const MAX_SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 365;

impl Default for AppConfig {
    /// Safe, non-panicking values for test state setup.
    fn default() -> Self {
        Self {
            db_url: None,
            bind_addr: "127.0.0.1:0".to_string(),
            env: Env::Local,
            session_secret: "restaurant-portal-test-session-secret".to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            min_name_length: DEFAULT_MIN_NAME_LENGTH,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from the environment.
    ///
    /// # Panics
    /// Panics when a variable required in production is missing, or when a numeric
    /// setting does not parse or is out of range, so the process never starts half-configured.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let (db_url, session_secret) = match env {
            Env::Production => (
                Some(env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod")),
                env::var("SESSION_SECRET").expect("FATAL: SESSION_SECRET must be set in production."),
            ),
            Env::Local => (
                env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
                env::var("SESSION_SECRET").unwrap_or_else(|_| LOCAL_SESSION_SECRET.to_string()),
            ),
        };

        let min_name_length = parse_var("MIN_RESTAURANT_NAME_LEN", DEFAULT_MIN_NAME_LENGTH);
        assert!(
            min_name_length >= 1,
            "FATAL: MIN_RESTAURANT_NAME_LEN must be at least 1"
        );

        let session_ttl_secs = parse_var("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS);
        assert!(
            (1..=MAX_SESSION_TTL_SECS).contains(&session_ttl_secs),
            "FATAL: SESSION_TTL_SECS must be between 1 and {MAX_SESSION_TTL_SECS}"
        );

        Self {
            db_url,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            env,
            session_secret,
            session_ttl_secs,
            min_name_length,
        }
    }
}

fn parse_var(name: &str, default: u64) -> u64 {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("FATAL: {name} must be a positive integer, got {raw:?}")),
        Err(_) => default,
    }
}
