use rocket::figment::providers::{Env, Serialized};
use rocket::figment::Figment;
use serde::{Deserialize, Serialize};

use crate::format::CreditFormat;

const DEFAULT_DB_PATH: &str = "../visibility.db";

/// Service settings, read from `Rocket.toml` and `VISIBILITY_*` variables
/// on top of Rocket's own configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: String,
    /// Create the database and its schema when `db_path` does not exist.
    pub create_if_missing: bool,
    pub credit_format: CreditFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            create_if_missing: false,
            credit_format: CreditFormat::default(),
        }
    }
}

pub fn figment() -> Figment {
    rocket::Config::figment()
        .join(Serialized::defaults(AppConfig::default()))
        .merge(Env::prefixed("VISIBILITY_").global())
}
