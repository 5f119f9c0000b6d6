use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single upload shown in the feed or kept in the saved ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
  /// External video id; also the identity used by the saved ledger.
  pub id: String,
  /// Display name of the channel as the user registered it.
  pub channel: String,
  pub title: String,
  /// Pre-formatted short date shown next to the title.
  pub time: String,
  pub tag: String,
  pub published_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub thumbnail: Option<String>,
  #[serde(default)]
  pub url: String,
}

/// A registered channel together with the uploads cached when it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
  pub id: String,
  pub name: String,
  pub link: String,
  #[serde(default)]
  pub tag: String,
  #[serde(default)]
  pub favorite: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub channel_id: Option<String>,
  #[serde(default)]
  pub videos: Vec<Video>,
}

/// Form input for registering a channel.
#[derive(Debug, Clone, Default)]
pub struct NewChannel {
  pub name: String,
  pub link: String,
  pub tag: String,
}

impl NewChannel {
  /// Trim every field, returning `None` when the name or link ends up empty.
  pub fn normalized(&self) -> Option<NewChannel> {
    let name = self.name.trim();
    let link = self.link.trim();
    if name.is_empty() || link.is_empty() {
      return None;
    }
    Some(NewChannel { name: name.to_string(), link: link.to_string(), tag: self.tag.trim().to_string() })
  }
}

/// Exact-match feed filter. Empty strings behave like `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
  pub channel: Option<String>,
  pub tag: Option<String>,
}

impl Filter {
  pub fn new(channel: Option<String>, tag: Option<String>) -> Self {
    Self { channel: channel.filter(|c| !c.is_empty()), tag: tag.filter(|t| !t.is_empty()) }
  }

  pub fn is_empty(&self) -> bool {
    self.channel_constraint().is_none() && self.tag_constraint().is_none()
  }

  pub fn channel_constraint(&self) -> Option<&str> {
    self.channel.as_deref().filter(|c| !c.is_empty())
  }

  pub fn tag_constraint(&self) -> Option<&str> {
    self.tag.as_deref().filter(|t| !t.is_empty())
  }

  pub fn matches(&self, video: &Video) -> bool {
    if let Some(channel) = self.channel_constraint()
      && video.channel != channel
    {
      return false;
    }
    if let Some(tag) = self.tag_constraint()
      && video.tag != tag
    {
      return false;
    }
    true
  }
}

/// Values the view can offer in its filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
  pub channels: Vec<String>,
  pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
  pub channels: usize,
  pub feed: usize,
  pub saved: usize,
}

#[cfg(test)]
pub(crate) fn make_video(id: &str, channel: &str, tag: &str, published_at: &str) -> Video {
  Video {
    id: id.to_string(),
    channel: channel.to_string(),
    title: format!("Video {}", id),
    time: String::new(),
    tag: tag.to_string(),
    published_at: published_at.parse().expect("valid RFC 3339 timestamp"),
    thumbnail: None,
    url: format!("https://www.youtube.com/watch?v={}", id),
  }
}

#[cfg(test)]
pub(crate) fn make_channel(id: &str, name: &str, videos: Vec<Video>) -> Channel {
  Channel {
    id: id.to_string(),
    name: name.to_string(),
    link: format!("https://www.youtube.com/@{}", name),
    tag: String::new(),
    favorite: false,
    channel_id: None,
    videos,
  }
}
