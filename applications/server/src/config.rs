/// Server configuration
use crate::error::{Result, ServerError};
use healthshare_core::SessionGuard;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Cost bounds accepted by bcrypt
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,

    #[serde(default = "default_guard")]
    pub guard: GuardSettings,

    #[serde(default = "default_web")]
    pub web: WebSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "default_id_token_expiration_hours")]
    pub id_token_expiration_hours: u64,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Cookie carrying the ID token for page requests
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    #[serde(default)]
    pub cookie_secure: bool,

    /// Shared secret of the upstream identity broker; federated sign-in is
    /// disabled when unset
    #[serde(default)]
    pub federation_secret: Option<String>,

    #[serde(default = "default_federation_issuer")]
    pub federation_issuer: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GuardSettings {
    /// Page path patterns that require an auth cookie
    #[serde(default = "default_protected_paths")]
    pub protected_paths: Vec<String>,

    #[serde(default = "default_redirect_to")]
    pub redirect_to: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebSettings {
    /// Directory holding the built web UI
    #[serde(default = "default_web_dir")]
    pub dir: PathBuf,
}

impl ServerConfig {
    /// Load configuration from file and environment
    ///
    /// Reads `path` if given, otherwise `config.toml` when present, then
    /// applies `HEALTHSHARE_` environment overrides
    /// (`HEALTHSHARE_AUTH__JWT_SECRET` sets `auth.jwt_secret`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from("config.toml");
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("HEALTHSHARE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ServerError::Config(
                "JWT secret is required (set HEALTHSHARE_AUTH__JWT_SECRET)".to_string(),
            ));
        }

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.auth.bcrypt_cost) {
            return Err(ServerError::Config(format!(
                "bcrypt cost must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}"
            )));
        }

        if self.auth.cookie_name.is_empty() {
            return Err(ServerError::Config("cookie name must not be empty".to_string()));
        }

        self.session_guard()?;

        Ok(())
    }

    /// Build the session guard from the configured patterns
    pub fn session_guard(&self) -> Result<SessionGuard> {
        SessionGuard::from_config(&self.guard.protected_paths, &self.guard.redirect_to)
            .map_err(|e| ServerError::Config(e.to_string()))
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/healthshare.db".to_string()
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        jwt_secret: String::new(),
        id_token_expiration_hours: default_id_token_expiration_hours(),
        bcrypt_cost: default_bcrypt_cost(),
        cookie_name: default_cookie_name(),
        cookie_secure: false,
        federation_secret: None,
        federation_issuer: default_federation_issuer(),
    }
}

fn default_id_token_expiration_hours() -> u64 {
    24
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_cookie_name() -> String {
    "healthshare-auth-token".to_string()
}

fn default_federation_issuer() -> String {
    "healthshare-broker".to_string()
}

fn default_guard() -> GuardSettings {
    GuardSettings {
        protected_paths: default_protected_paths(),
        redirect_to: default_redirect_to(),
    }
}

fn default_protected_paths() -> Vec<String> {
    vec!["/dashboard/:path*".to_string(), "/profile".to_string()]
}

fn default_redirect_to() -> String {
    "/sign-in".to_string()
}

fn default_web() -> WebSettings {
    WebSettings {
        dir: default_web_dir(),
    }
}

fn default_web_dir() -> PathBuf {
    PathBuf::from("./web")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            auth: default_auth(),
            guard: default_guard(),
            web: default_web(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_require_secret() {
        let config = ServerConfig::default();
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));
    }

    #[test]
    fn test_valid_config() {
        let mut config = ServerConfig::default();
        config.auth.jwt_secret = "secret".to_string();
        assert!(config.validate().is_ok());

        let guard = config.session_guard().unwrap();
        assert!(guard.is_protected("/dashboard/stats"));
        assert!(guard.is_protected("/profile"));
        assert_eq!(guard.redirect_to(), "/sign-in");
    }

    #[test]
    fn test_bad_guard_patterns_rejected() {
        let mut config = ServerConfig::default();
        config.auth.jwt_secret = "secret".to_string();
        config.guard.protected_paths = vec!["dashboard".to_string()];
        assert!(config.validate().is_err());

        config.guard.protected_paths = default_protected_paths();
        config.guard.redirect_to = "https://evil.example".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        let mut config = ServerConfig::default();
        config.auth.jwt_secret = "secret".to_string();
        config.auth.bcrypt_cost = 1;
        assert!(config.validate().is_err());

        config.auth.bcrypt_cost = 32;
        assert!(config.validate().is_err());

        config.auth.bcrypt_cost = MIN_BCRYPT_COST;
        assert!(config.validate().is_ok());
        config.auth.bcrypt_cost = MAX_BCRYPT_COST;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("healthshare.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[auth]\njwt_secret = \"from-file\"\n\n[guard]\nredirect_to = \"/login\""
        )
        .unwrap();

        let config = ServerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.auth.jwt_secret, "from-file");
        assert_eq!(config.guard.redirect_to, "/login");
        assert_eq!(config.auth.cookie_name, "healthshare-auth-token");
        assert_eq!(config.guard.protected_paths, default_protected_paths());
    }
}
