use std::env;

use crate::{models::Credential, repository::IdPolicy};

/// Default listening address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:1323";

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup and
/// immutable afterwards; pulled into handlers and extractors through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the log output format.
    pub env: Env,
    // Address the HTTP listener binds to.
    pub bind_addr: String,
    // How the employee registry assigns ids to new records.
    pub id_policy: IdPolicy,
    // The fixed credential store checked by POST /login.
    pub credentials: Vec<Credential>,
}

/// Env
///
/// Defines the runtime context: human-readable logs locally, JSON logs in production.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// The built-in credential store. There is no registration flow; this list is the
/// only source of valid logins.
pub fn default_credentials() -> Vec<Credential> {
    vec![Credential {
        login: "james.bond".to_string(),
        password: "james123!".to_string(),
    }]
}

impl Default for AppConfig {
    /// Same values `load()` yields with an empty environment, without reading it.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            id_policy: IdPolicy::Sequence,
            credentials: default_credentials(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables, falling back to the
    /// defaults for anything unset.
    ///
    /// * `APP_ENV`: `production` selects JSON logging, anything else is local.
    /// * `BIND_ADDR`: listener address.
    /// * `EMPLOYEE_ID_POLICY`: `sequence` (default) or `tail`.
    ///
    /// # Panics
    /// Panics if `EMPLOYEE_ID_POLICY` holds an unknown value, so a typo cannot
    /// silently change id semantics.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let id_policy = match env::var("EMPLOYEE_ID_POLICY") {
            Ok(value) => value
                .parse()
                .unwrap_or_else(|e| panic!("FATAL: EMPLOYEE_ID_POLICY: {e}")),
            Err(_) => IdPolicy::Sequence,
        };

        Self {
            env,
            bind_addr,
            id_policy,
            credentials: default_credentials(),
        }
    }
}
