//! Configuration paths

use std::path::PathBuf;

/// Application name used for platform directories
const APP_NAME: &str = "site-checks";

/// Environment variable that overrides the config file location
pub const CONFIG_ENV: &str = "SITE_CHECKS_CONFIG";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/site-checks/`
/// - macOS: `~/Library/Application Support/site-checks/`
/// - Windows: `%APPDATA%\site-checks\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the platform configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Config file named by `SITE_CHECKS_CONFIG`, if set
pub fn config_override() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV)
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_ends_with_file_name() {
        if let Some(path) = config_path() {
            assert!(path.ends_with("site-checks/config.toml"));
        }
    }
}
