use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::constants;

const APP_NAME: &str = "tubehub";

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub theme_name: Option<String>,
  /// Where the JSON store lives. Defaults to the platform data directory.
  pub store_dir: Option<PathBuf>,
  /// Override for the YouTube Data API base URL.
  pub api_base: Option<String>,
}

pub fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", APP_NAME)
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = project_dirs() {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(config_file)
        && let Ok(config) = toml::from_str(&content)
      {
        return config;
      }
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = project_dirs() {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self) {
          let _ = std::fs::write(config_file, content);
        }
      }
    }
  }

  /// Store directory: explicit override, then prefs, then the platform data dir.
  pub fn store_dir(&self, cli_override: Option<PathBuf>) -> PathBuf {
    cli_override
      .or_else(|| self.store_dir.clone())
      .or_else(|| project_dirs().map(|d| d.data_dir().join("store")))
      .unwrap_or_else(|| PathBuf::from(".tubehub"))
  }

  pub fn api_base(&self) -> String {
    self.api_base.clone().filter(|b| !b.trim().is_empty()).unwrap_or_else(|| constants().api_base.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn prefs_round_trip_through_toml() {
    let config = Config {
      theme_name: Some("Paper".to_string()),
      store_dir: Some(PathBuf::from("/tmp/store")),
      api_base: None,
    };
    let text = toml::to_string(&config).expect("serialize");
    let back: Config = toml::from_str(&text).expect("parse");
    assert_eq!(back, config);
  }

  #[test]
  fn partial_prefs_parse() {
    let config: Config = toml::from_str("theme_name = \"Night\"\n").expect("parse");
    assert_eq!(config.theme_name.as_deref(), Some("Night"));
    assert!(config.store_dir.is_none());
  }

  #[test]
  fn store_dir_prefers_cli_override() {
    let config = Config { store_dir: Some(PathBuf::from("/from/prefs")), ..Default::default() };
    assert_eq!(config.store_dir(Some(PathBuf::from("/from/cli"))), PathBuf::from("/from/cli"));
    assert_eq!(config.store_dir(None), PathBuf::from("/from/prefs"));
  }

  #[test]
  fn api_base_falls_back_to_constant() {
    assert_eq!(Config::default().api_base(), constants().api_base);
    let config = Config { api_base: Some("  ".to_string()), ..Default::default() };
    assert_eq!(config.api_base(), constants().api_base);
    let config = Config { api_base: Some("http://localhost:9000".to_string()), ..Default::default() };
    assert_eq!(config.api_base(), "http://localhost:9000");
  }
}
