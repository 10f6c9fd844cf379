/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/07/26
******************************************************************************/

//! Runtime configuration, loaded from the environment (and `.env`).

use crate::constants::{
    DEFAULT_API_KEY_HEADER, DEFAULT_GROUP_BASELINE_FILE, DEFAULT_GROUP_CANDIDATES,
    DEFAULT_GROUP_STORE_FILE, DEMO_SEED_GROUPS, MANAGER_SEED_GROUPS, REAL_SEED_GROUPS,
    VIP_SEED_GROUPS,
};
use crate::utils::env::{get_env_list, get_env_or_default, get_env_or_none};
use dotenv::dotenv;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Manager credentials used for the optional auto-connect at startup
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Credentials {
    /// Manager server address, e.g. "mt5.example.com:443"
    pub server: String,
    /// Manager login ID
    pub login: u64,
    /// Manager password
    pub password: String,
}

/// Bind address for the HTTP dispatcher
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HttpConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

/// Where the group catalogue persists
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    /// Backing JSON file for explicitly created groups
    pub store_file: String,
    /// Optional larger baseline catalogue merged on first run
    pub baseline_file: Option<String>,
}

/// Seed catalogues driving the discovery engine.
///
/// Each list can be replaced per deployment through the environment; the
/// defaults in [`crate::constants`] describe the reference deployment.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DiscoveryCatalog {
    /// Primary seed groups (also the /users/real variant)
    pub real_groups: Vec<String>,
    /// Seed groups for the /users/demo variant
    pub demo_groups: Vec<String>,
    /// Seed groups for the /users/vip variant
    pub vip_groups: Vec<String>,
    /// Seed groups for the /users/managers variant
    pub manager_groups: Vec<String>,
    /// Candidate names probed by group discovery
    pub group_candidates: Vec<String>,
}

impl Default for DiscoveryCatalog {
    fn default() -> Self {
        let to_owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            real_groups: to_owned(REAL_SEED_GROUPS),
            demo_groups: to_owned(DEMO_SEED_GROUPS),
            vip_groups: to_owned(VIP_SEED_GROUPS),
            manager_groups: to_owned(MANAGER_SEED_GROUPS),
            group_candidates: DEFAULT_GROUP_CANDIDATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// API-key authentication settings for the dispatcher
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SecurityConfig {
    /// When false every request is authenticated trivially
    pub require_api_key: bool,
    /// Header carrying the key
    pub api_key_header: String,
    /// Accepted keys
    pub api_keys: HashSet<String>,
    /// Origin allow-list; "*" allows all
    pub allowed_origins: Vec<String>,
    /// Log authentication successes and failures
    pub log_security_events: bool,
}

impl SecurityConfig {
    /// Builds the security settings, generating a single key when
    /// authentication is required but no key is configured.
    pub fn new(require_api_key: bool, mut api_keys: HashSet<String>) -> Self {
        if require_api_key && api_keys.is_empty() {
            let key = Self::generate_api_key();
            warn!(
                "No API keys configured. Generated default key: {key} \
                 (set MT5_API_KEYS for permanent use)"
            );
            api_keys.insert(key);
        }
        Self {
            require_api_key,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            api_keys,
            allowed_origins: vec!["*".to_string()],
            log_security_events: true,
        }
    }

    fn from_env() -> Self {
        let require_api_key = get_env_or_default("MT5_REQUIRE_API_KEY", false);
        let api_keys: HashSet<String> = get_env_list("MT5_API_KEYS").into_iter().collect();
        let mut config = Self::new(require_api_key, api_keys);
        config.api_key_header =
            get_env_or_default("MT5_API_KEY_HEADER", DEFAULT_API_KEY_HEADER.to_string());
        let origins = get_env_list("MT5_ALLOWED_ORIGINS");
        if !origins.is_empty() {
            config.allowed_origins = origins;
        }
        config.log_security_events = get_env_or_default("MT5_LOG_SECURITY_EVENTS", true);
        config
    }

    /// A fresh URL-safe random key
    pub fn generate_api_key() -> String {
        rand::rng()
            .sample_iter(Alphanumeric)
            .take(43)
            .map(char::from)
            .collect()
    }

    /// Whether the presented key is accepted
    pub fn is_valid_api_key(&self, api_key: &str) -> bool {
        if !self.require_api_key {
            return true;
        }
        !api_key.is_empty() && self.api_keys.contains(api_key)
    }

    /// Whether the request origin passes the allow-list
    pub fn is_origin_allowed(&self, origin: Option<&str>) -> bool {
        if self.allowed_origins.iter().any(|o| o == "*") {
            return true;
        }
        match origin {
            Some(origin) if !origin.is_empty() => {
                self.allowed_origins.iter().any(|o| o == origin)
            }
            _ => false,
        }
    }
}

/// Main configuration for the bridge
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Optional manager credentials for auto-connect
    pub credentials: Option<Credentials>,
    /// HTTP listener settings
    pub http: HttpConfig,
    /// Authentication settings
    pub security: SecurityConfig,
    /// Group catalogue persistence
    pub storage: StorageConfig,
    /// Discovery seed catalogues
    pub discovery: DiscoveryCatalog,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Loads the configuration from the environment (and `.env` when present)
    pub fn new() -> Self {
        match dotenv() {
            Ok(_) => debug!("Successfully loaded .env file"),
            Err(e) => debug!("Failed to load .env file: {e}"),
        }

        let credentials = match (
            get_env_or_none::<String>("MT5_SERVER"),
            get_env_or_none::<u64>("MT5_LOGIN"),
            get_env_or_none::<String>("MT5_PASSWORD"),
        ) {
            (Some(server), Some(login), Some(password)) => Some(Credentials {
                server,
                login,
                password,
            }),
            _ => None,
        };

        Config {
            credentials,
            http: HttpConfig {
                host: get_env_or_default("MT5_BIND_HOST", String::from("0.0.0.0")),
                port: get_env_or_default("MT5_BIND_PORT", 8080),
            },
            security: SecurityConfig::from_env(),
            storage: StorageConfig {
                store_file: get_env_or_default(
                    "MT5_GROUP_STORE_FILE",
                    String::from(DEFAULT_GROUP_STORE_FILE),
                ),
                baseline_file: get_env_or_none::<String>("MT5_GROUP_BASELINE_FILE")
                    .or_else(|| Some(String::from(DEFAULT_GROUP_BASELINE_FILE))),
            },
            discovery: DiscoveryCatalog::default(),
        }
    }
}
