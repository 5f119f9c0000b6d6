use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::debug;
use url::Url;

// --- Response types ---

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
  #[serde(default = "Vec::new")]
  items: Vec<T>,
}

/// An item from `channels.list`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelItem {
  pub id: String,
}

/// An item from `search.list`. The id object carries either a channel or a video id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItem {
  #[serde(default)]
  pub id: SearchId,
  #[serde(default)]
  pub snippet: Option<Snippet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchId {
  pub channel_id: Option<String>,
  pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
  #[serde(default)]
  pub title: String,
  pub published_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
  pub default: Option<Thumbnail>,
  pub medium: Option<Thumbnail>,
  pub high: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
  pub url: String,
}

impl Thumbnails {
  /// Medium is the size the feed cards use; fall back to whatever exists.
  pub fn best(&self) -> Option<&str> {
    self.medium.as_ref().or(self.high.as_ref()).or(self.default.as_ref()).map(|t| t.url.as_str())
  }
}

// --- API seam ---

/// The read-only YouTube Data API calls the add flow needs.
///
/// Every call takes the caller's API key. An empty `Vec` is a legitimate
/// answer; `Err` means the request itself failed.
pub trait VideoApi {
  fn channels_by_handle(&self, handle: &str, key: &str) -> impl Future<Output = Result<Vec<ChannelItem>>> + Send;

  fn channels_by_username(&self, username: &str, key: &str) -> impl Future<Output = Result<Vec<ChannelItem>>> + Send;

  /// Free-text search restricted to channel results.
  fn search_channels(&self, query: &str, key: &str) -> impl Future<Output = Result<Vec<SearchItem>>> + Send;

  /// Most recent uploads of a channel, newest first.
  fn recent_uploads(
    &self,
    channel_id: &str,
    max_results: usize,
    key: &str,
  ) -> impl Future<Output = Result<Vec<SearchItem>>> + Send;
}

/// `reqwest`-backed client for the YouTube Data API v3.
#[derive(Debug, Clone)]
pub struct YouTubeApi {
  client: Client,
  base: String,
}

impl YouTubeApi {
  pub fn new(base: impl Into<String>) -> Self {
    Self { client: Client::new(), base: base.into().trim_end_matches('/').to_string() }
  }

  fn endpoint(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url> {
    let base = format!("{}/{}", self.base, resource);
    Url::parse_with_params(&base, params).with_context(|| format!("Invalid API endpoint {}", base))
  }

  async fn get_items<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>> {
    let resource = url.path().rsplit('/').next().unwrap_or_default().to_string();
    debug!(resource = %resource, "youtube: request");
    let response = self.client.get(url).send().await.with_context(|| format!("Request to {} failed", resource))?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(anyhow!("YouTube API {} returned {}: {}", resource, status, body.trim()));
    }
    let list: ListResponse<T> =
      response.json().await.with_context(|| format!("Failed to decode {} response", resource))?;
    debug!(resource = %resource, items = list.items.len(), "youtube: response");
    Ok(list.items)
  }
}

impl VideoApi for YouTubeApi {
  async fn channels_by_handle(&self, handle: &str, key: &str) -> Result<Vec<ChannelItem>> {
    let handle = format!("@{}", handle.trim_start_matches('@'));
    let url = self.endpoint("channels", &[("part", "id"), ("forHandle", &handle), ("key", key)])?;
    self.get_items(url).await
  }

  async fn channels_by_username(&self, username: &str, key: &str) -> Result<Vec<ChannelItem>> {
    let url = self.endpoint("channels", &[("part", "id"), ("forUsername", username), ("key", key)])?;
    self.get_items(url).await
  }

  async fn search_channels(&self, query: &str, key: &str) -> Result<Vec<SearchItem>> {
    let url = self.endpoint(
      "search",
      &[("part", "snippet"), ("type", "channel"), ("maxResults", "1"), ("q", query), ("key", key)],
    )?;
    self.get_items(url).await
  }

  async fn recent_uploads(&self, channel_id: &str, max_results: usize, key: &str) -> Result<Vec<SearchItem>> {
    let max = max_results.to_string();
    let url = self.endpoint(
      "search",
      &[
        ("part", "snippet"),
        ("channelId", channel_id),
        ("order", "date"),
        ("type", "video"),
        ("maxResults", &max),
        ("key", key),
      ],
    )?;
    self.get_items(url).await
  }
}
