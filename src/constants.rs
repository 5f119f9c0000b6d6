//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available,
//! with no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

use crate::models::Video;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  /// Default YouTube Data API v3 base URL (overridable in prefs.toml).
  pub api_base: String,

  // Channel add flow
  pub page_size: usize,
  pub upload_tag: String,
  pub date_format: String,
  pub watch_url: String,

  // TUI
  pub error_ttl_secs: u64,

  /// Demo feed shown while no channels are registered.
  pub placeholder_feed: Vec<Video>,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; a malformed file fails the first test run.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn constants_parse() {
    let c = constants();
    assert_eq!(c.page_size, 6);
    assert!(c.api_base.starts_with("https://"));
    assert!(!c.upload_tag.is_empty());
  }

  #[test]
  fn placeholder_feed_is_newest_first() {
    let feed = &constants().placeholder_feed;
    assert_eq!(feed.len(), 3);
    assert!(feed.windows(2).all(|w| w[0].published_at >= w[1].published_at));
  }
}
