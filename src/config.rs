use crate::error::MigrateError;
use dirs::home_dir;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_NAME: &str = "api-migrate.toml";

pub const DEFAULT_MODULE: &str = "@/lib/pocketbase";
pub const DEFAULT_URL_HELPER: &str = "getApiUrl";
pub const DEFAULT_TOKEN_HELPER: &str = "getAuthToken";
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8090";
pub const DEFAULT_STORAGE_KEY: &str = "pocketbase_auth";
pub const DEFAULT_ERROR_MESSAGE: &str = "Non authentifié";

const DEFAULT_EXTENSIONS: &[&str] = &["ts", "tsx", "jsx"];
const DEFAULT_EXCLUDE: &[&str] = &["node_modules", ".next"];

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub helpers: HelperConfig,

    #[serde(default)]
    pub patterns: PatternConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct ProjectConfig {
    pub root: Option<PathBuf>,
    pub files: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DiscoveryConfig {
    pub extensions: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct HelperConfig {
    pub module: Option<String>,
    pub url_helper: Option<String>,
    pub token_helper: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PatternConfig {
    pub api_base: Option<String>,
    pub storage_key: Option<String>,
    pub error_message: Option<String>,
}

impl Config {
    /// Load config from a toml file
    pub fn from_file(path: &Path) -> Result<Self, MigrateError> {
        let config_str = fs::read_to_string(path)?;
        match toml::from_str(&config_str) {
            Ok(config) => Ok(config),
            Err(e) => {
                eprintln!("Toml parse error in {path:?}: {e}");
                Err(MigrateError::TomlError(e))
            }
        }
    }

    /// Try to load the config from the working directory, then from
    /// $HOME/.config. Falls back to the built-in defaults.
    pub fn load() -> Self {
        if let Ok(local_config) = Config::from_file(Path::new(CONFIG_NAME)) {
            return local_config;
        }
        if let Some(home_dir) = home_dir() {
            let home_config = home_dir.join(".config").join(CONFIG_NAME);
            if let Ok(home_config) = Config::from_file(&home_config) {
                return home_config;
            }
        }
        Config::default()
    }

    /// Get the project root. The MIGRATE_ROOT environment variable takes
    /// priority over the config file.
    pub fn get_root(&self) -> Option<PathBuf> {
        if let Ok(root) = std::env::var("MIGRATE_ROOT") {
            return Some(PathBuf::from(root));
        }
        self.project.root.clone()
    }

    /// File extensions that count as source files during a walk
    pub fn get_extensions(&self) -> Vec<String> {
        self.discovery
            .extensions
            .clone()
            .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect())
    }

    /// Substrings that exclude a path component from a walk
    pub fn get_exclude(&self) -> Vec<String> {
        self.discovery
            .exclude
            .clone()
            .unwrap_or_else(|| DEFAULT_EXCLUDE.iter().map(ToString::to_string).collect())
    }

    /// The module specifier that exports the helper functions
    pub fn get_module(&self) -> String {
        self.helpers
            .module
            .clone()
            .unwrap_or_else(|| DEFAULT_MODULE.to_string())
    }

    /// Name of the helper that builds an API url from a relative path
    pub fn get_url_helper(&self) -> String {
        self.helpers
            .url_helper
            .clone()
            .unwrap_or_else(|| DEFAULT_URL_HELPER.to_string())
    }

    /// Name of the helper that returns the stored session token
    pub fn get_token_helper(&self) -> String {
        self.helpers
            .token_helper
            .clone()
            .unwrap_or_else(|| DEFAULT_TOKEN_HELPER.to_string())
    }

    /// Url prefix whose literals get folded into helper calls
    pub fn get_api_base(&self) -> String {
        self.patterns
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
    }

    /// The localStorage key that holds the serialized auth state
    pub fn get_storage_key(&self) -> String {
        self.patterns
            .storage_key
            .clone()
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string())
    }

    /// Message thrown by the guard statement when no auth state is stored
    pub fn get_error_message(&self) -> String {
        self.patterns
            .error_message
            .clone()
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let config = Config::default();
        assert_eq!(config.get_module(), DEFAULT_MODULE);
        assert_eq!(config.get_url_helper(), "getApiUrl");
        assert_eq!(config.get_token_helper(), "getAuthToken");
        assert_eq!(config.get_api_base(), "http://127.0.0.1:8090");
        assert_eq!(config.get_extensions(), vec!["ts", "tsx", "jsx"]);
        assert_eq!(config.get_exclude(), vec!["node_modules", ".next"]);
    }

    #[test]
    fn test_overrides_from_toml() {
        let config: Config = toml::from_str(
            r#"
            [project]
            root = "/srv/app"
            files = ["hooks/use-data.ts"]

            [helpers]
            module = "~/api/client"
            url_helper = "apiUrl"

            [patterns]
            api_base = "http://localhost:3001"
            "#,
        )
        .unwrap();

        assert_eq!(config.project.root, Some(PathBuf::from("/srv/app")));
        assert_eq!(
            config.project.files,
            Some(vec!["hooks/use-data.ts".to_string()])
        );
        assert_eq!(config.get_module(), "~/api/client");
        assert_eq!(config.get_url_helper(), "apiUrl");
        assert_eq!(config.get_token_helper(), "getAuthToken");
        assert_eq!(config.get_api_base(), "http://localhost:3001");
        assert_eq!(config.get_storage_key(), "pocketbase_auth");
    }

    #[test]
    fn test_from_file_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_NAME);
        fs::write(&path, "[project\nroot = 3").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(MigrateError::TomlError(_))
        ));
    }

    #[test]
    fn test_from_file_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(matches!(
            Config::from_file(&path),
            Err(MigrateError::IoError(_))
        ));
    }
}
