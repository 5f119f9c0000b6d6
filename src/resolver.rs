//! Map a user-supplied channel link to YouTube's canonical channel id.

use percent_encoding::percent_decode_str;
use tracing::{debug, warn};
use url::Url;

use crate::youtube::VideoApi;

/// How a link will be resolved, decided from its path alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLink {
  /// `/channel/<id>`: already canonical.
  ChannelId(String),
  /// `/@<handle>`
  Handle(String),
  /// `/user/<name>`
  Username(String),
  /// Anything else: the raw link becomes a channel search query.
  Query(String),
}

/// A canonical YouTube channel id (`UC…`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChannelId(pub String);

impl ResolvedChannelId {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl ParsedLink {
  /// Classify `link`. Returns `None` when it isn't an absolute URL.
  pub fn parse(link: &str) -> Option<ParsedLink> {
    let url = Url::parse(link.trim()).ok()?;
    // Path segments come back percent-encoded; the API expects the decoded text.
    let mut segments = url
      .path_segments()
      .into_iter()
      .flatten()
      .filter(|s| !s.is_empty())
      .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned());
    let first = segments.next().unwrap_or_default();
    let second = segments.next().unwrap_or_default();

    let parsed = match first.as_str() {
      "channel" if !second.is_empty() => ParsedLink::ChannelId(second),
      "user" if !second.is_empty() => ParsedLink::Username(second),
      handle if handle.len() > 1 && handle.starts_with('@') => ParsedLink::Handle(handle[1..].to_string()),
      _ => ParsedLink::Query(link.trim().to_string()),
    };
    Some(parsed)
  }
}

/// Resolve a parsed link, calling the API only when the id isn't in the path.
///
/// A failed request is logged and treated like an empty answer.
pub async fn resolve<A: VideoApi>(api: &A, link: &ParsedLink, key: &str) -> Option<ResolvedChannelId> {
  let id = match link {
    ParsedLink::ChannelId(id) => Some(id.clone()),
    ParsedLink::Handle(handle) => match api.channels_by_handle(handle, key).await {
      Ok(items) => items.into_iter().next().map(|c| c.id),
      Err(e) => {
        warn!(handle = %handle, err = %format!("{:#}", e), "resolver: handle lookup failed");
        None
      }
    },
    ParsedLink::Username(name) => match api.channels_by_username(name, key).await {
      Ok(items) => items.into_iter().next().map(|c| c.id),
      Err(e) => {
        warn!(username = %name, err = %format!("{:#}", e), "resolver: username lookup failed");
        None
      }
    },
    ParsedLink::Query(query) => match api.search_channels(query, key).await {
      Ok(items) => items.into_iter().find_map(|item| item.id.channel_id),
      Err(e) => {
        warn!(query = %query, err = %format!("{:#}", e), "resolver: channel search failed");
        None
      }
    },
  };
  let id = id.filter(|id| !id.is_empty());
  debug!(link = ?link, resolved = ?id, "resolver: done");
  id.map(ResolvedChannelId)
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::youtube::{ChannelItem, SearchId, SearchItem};
  use anyhow::{Result, anyhow};
  use std::sync::Mutex;

  /// Canned-response API that records every call it receives.
  #[derive(Default)]
  pub(crate) struct MockApi {
    pub(crate) handle_items: Vec<ChannelItem>,
    pub(crate) username_items: Vec<ChannelItem>,
    pub(crate) search_items: Vec<SearchItem>,
    pub(crate) upload_items: Vec<SearchItem>,
    pub(crate) fail: bool,
    pub(crate) calls: Mutex<Vec<String>>,
  }

  impl MockApi {
    pub(crate) fn calls(&self) -> Vec<String> {
      self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: String) -> Result<()> {
      self.calls.lock().expect("calls lock").push(call);
      if self.fail { Err(anyhow!("connection refused")) } else { Ok(()) }
    }
  }

  impl VideoApi for MockApi {
    async fn channels_by_handle(&self, handle: &str, key: &str) -> Result<Vec<ChannelItem>> {
      self.record(format!("handle:{}:{}", handle, key))?;
      Ok(self.handle_items.clone())
    }

    async fn channels_by_username(&self, username: &str, key: &str) -> Result<Vec<ChannelItem>> {
      self.record(format!("username:{}:{}", username, key))?;
      Ok(self.username_items.clone())
    }

    async fn search_channels(&self, query: &str, key: &str) -> Result<Vec<SearchItem>> {
      self.record(format!("search:{}:{}", query, key))?;
      Ok(self.search_items.clone())
    }

    async fn recent_uploads(&self, channel_id: &str, max_results: usize, key: &str) -> Result<Vec<SearchItem>> {
      self.record(format!("uploads:{}:{}:{}", channel_id, max_results, key))?;
      Ok(self.upload_items.clone())
    }
  }

  async fn resolve_link<A: VideoApi>(api: &A, link: &str, key: &str) -> Option<ResolvedChannelId> {
    let parsed = ParsedLink::parse(link)?;
    resolve(api, &parsed, key).await
  }

  pub(crate) fn channel_item(id: &str) -> ChannelItem {
    ChannelItem { id: id.to_string() }
  }

  pub(crate) fn channel_search_item(id: &str) -> SearchItem {
    SearchItem { id: SearchId { channel_id: Some(id.to_string()), video_id: None }, snippet: None }
  }

  // --- ParsedLink::parse ---

  #[test]
  fn parse_channel_path() {
    assert_eq!(
      ParsedLink::parse("https://youtube.com/channel/ABC123"),
      Some(ParsedLink::ChannelId("ABC123".to_string()))
    );
    assert_eq!(
      ParsedLink::parse("https://www.youtube.com/channel/ABC123/videos"),
      Some(ParsedLink::ChannelId("ABC123".to_string()))
    );
  }

  #[test]
  fn parse_handle_path() {
    assert_eq!(ParsedLink::parse("https://youtube.com/@someuser"), Some(ParsedLink::Handle("someuser".to_string())));
    assert_eq!(
      ParsedLink::parse("https://youtube.com/@someuser/featured"),
      Some(ParsedLink::Handle("someuser".to_string()))
    );
  }

  #[test]
  fn parse_decodes_non_ascii_segments() {
    assert_eq!(ParsedLink::parse("https://www.youtube.com/@café"), Some(ParsedLink::Handle("café".to_string())));
    assert_eq!(
      ParsedLink::parse("https://www.youtube.com/@caf%C3%A9/videos"),
      Some(ParsedLink::Handle("café".to_string()))
    );
    assert_eq!(ParsedLink::parse("https://youtube.com/user/m%C3%BCller"), Some(ParsedLink::Username("müller".to_string())));
  }

  #[test]
  fn parse_user_path() {
    assert_eq!(ParsedLink::parse("https://youtube.com/user/legacy"), Some(ParsedLink::Username("legacy".to_string())));
  }

  #[test]
  fn parse_other_paths_become_queries() {
    let link = "https://youtube.com/c/PixelLab";
    assert_eq!(ParsedLink::parse(link), Some(ParsedLink::Query(link.to_string())));
    // Missing ids fall through to search rather than matching a strategy.
    let bare = "https://youtube.com/channel/";
    assert_eq!(ParsedLink::parse(bare), Some(ParsedLink::Query(bare.to_string())));
    let at = "https://youtube.com/@";
    assert_eq!(ParsedLink::parse(at), Some(ParsedLink::Query(at.to_string())));
  }

  #[test]
  fn parse_malformed_url_is_none() {
    assert_eq!(ParsedLink::parse("not a url"), None);
    assert_eq!(ParsedLink::parse("@someuser"), None);
    assert_eq!(ParsedLink::parse(""), None);
  }

  // --- resolve ---

  #[tokio::test]
  async fn channel_link_resolves_without_network() {
    let api = MockApi::default();
    let id = resolve_link(&api, "https://youtube.com/channel/ABC123", "key").await;
    assert_eq!(id, Some(ResolvedChannelId("ABC123".to_string())));
    assert!(api.calls().is_empty());
  }

  #[tokio::test]
  async fn handle_link_uses_handle_lookup() {
    let api = MockApi { handle_items: vec![channel_item("XYZ")], ..Default::default() };
    let id = resolve_link(&api, "https://youtube.com/@someuser", "key").await;
    assert_eq!(id, Some(ResolvedChannelId("XYZ".to_string())));
    assert_eq!(api.calls(), vec!["handle:someuser:key".to_string()]);
  }

  #[tokio::test]
  async fn non_ascii_handle_reaches_api_decoded() {
    let api = MockApi { handle_items: vec![channel_item("UCcafe")], ..Default::default() };
    let id = resolve_link(&api, "https://www.youtube.com/@café", "key").await;
    assert_eq!(id, Some(ResolvedChannelId("UCcafe".to_string())));
    assert_eq!(api.calls(), vec!["handle:café:key".to_string()]);
  }

  #[tokio::test]
  async fn handle_lookup_with_no_items_is_none() {
    let api = MockApi::default();
    assert_eq!(resolve_link(&api, "https://youtube.com/@ghost", "key").await, None);
    assert_eq!(api.calls().len(), 1);
  }

  #[tokio::test]
  async fn user_link_uses_username_lookup() {
    let api = MockApi { username_items: vec![channel_item("UC1"), channel_item("UC2")], ..Default::default() };
    let id = resolve_link(&api, "https://youtube.com/user/legacy", "key").await;
    assert_eq!(id, Some(ResolvedChannelId("UC1".to_string())));
    assert_eq!(api.calls(), vec!["username:legacy:key".to_string()]);
  }

  #[tokio::test]
  async fn other_link_searches_with_raw_link() {
    let api = MockApi { search_items: vec![channel_search_item("UCsearch")], ..Default::default() };
    let link = "https://youtube.com/c/PixelLab";
    let id = resolve_link(&api, link, "key").await;
    assert_eq!(id, Some(ResolvedChannelId("UCsearch".to_string())));
    assert_eq!(api.calls(), vec![format!("search:{}:key", link)]);
  }

  #[tokio::test]
  async fn search_skips_results_without_channel_id() {
    let api =
      MockApi { search_items: vec![SearchItem::default(), channel_search_item("UCsecond")], ..Default::default() };
    let id = resolve_link(&api, "https://youtube.com/c/PixelLab", "key").await;
    assert_eq!(id, Some(ResolvedChannelId("UCsecond".to_string())));
  }

  #[tokio::test]
  async fn malformed_link_makes_no_calls() {
    let api = MockApi { handle_items: vec![channel_item("XYZ")], ..Default::default() };
    assert_eq!(resolve_link(&api, "youtube.com/@someuser", "key").await, None);
    assert!(api.calls().is_empty());
  }

  #[tokio::test]
  async fn failed_request_degrades_to_none() {
    let api = MockApi { handle_items: vec![channel_item("XYZ")], fail: true, ..Default::default() };
    assert_eq!(resolve_link(&api, "https://youtube.com/@someuser", "key").await, None);
  }
}
