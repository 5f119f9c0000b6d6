//! The channel add flow, from form input to a channel ready to persist.
//!
//! `ParsedLink → ResolvedChannelId → FetchedVideos → Channel`. The async part
//! here never touches the store, so callers can run it on a background task
//! and commit the result once it completes.

use chrono::{Local, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::constants::constants;
use crate::models::{Channel, NewChannel, Video};
use crate::resolver::{self, ParsedLink, ResolvedChannelId};
use crate::youtube::{SearchItem, VideoApi};

#[derive(Debug, Error)]
pub enum AddChannelError {
  #[error("Channel name and link are required.")]
  InvalidInput,
  #[error("No API key set. Add a YouTube Data API key first.")]
  MissingCredential,
  #[error("Could not find a YouTube channel for '{0}'.")]
  UnresolvableChannel(String),
  #[error(transparent)]
  Store(#[from] anyhow::Error),
}

/// Uploads mapped into feed entries for one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedVideos(pub Vec<Video>);

/// Everything needed to append a channel, gathered from the network.
#[derive(Debug, Clone)]
pub struct PendingChannel {
  pub request: NewChannel,
  pub channel_id: ResolvedChannelId,
  pub videos: FetchedVideos,
}

impl PendingChannel {
  /// Turn into a stored channel record with the given local id.
  pub fn into_channel(self, id: String) -> Channel {
    Channel {
      id,
      name: self.request.name,
      link: self.request.link,
      tag: self.request.tag,
      favorite: false,
      channel_id: Some(self.channel_id.0),
      videos: self.videos.0,
    }
  }
}

/// Validate, resolve and fetch. No state is touched.
pub async fn prepare_channel<A: VideoApi>(
  api: &A,
  credential: &str,
  request: &NewChannel,
) -> Result<PendingChannel, AddChannelError> {
  let request = request.normalized().ok_or(AddChannelError::InvalidInput)?;
  let key = credential.trim();
  if key.is_empty() {
    return Err(AddChannelError::MissingCredential);
  }

  let Some(parsed) = ParsedLink::parse(&request.link) else {
    warn!(link = %request.link, "add: malformed channel link");
    return Err(AddChannelError::UnresolvableChannel(request.link));
  };
  let Some(channel_id) = resolver::resolve(api, &parsed, key).await else {
    return Err(AddChannelError::UnresolvableChannel(request.link));
  };

  let videos = fetch_videos(api, &channel_id, &request.name, key).await;
  info!(name = %request.name, channel_id = %channel_id.as_str(), videos = videos.0.len(), "add: channel prepared");
  Ok(PendingChannel { request, channel_id, videos })
}

/// Fetch the newest uploads of a resolved channel. Failures degrade to an empty list.
pub async fn fetch_videos<A: VideoApi>(
  api: &A,
  channel_id: &ResolvedChannelId,
  display_name: &str,
  key: &str,
) -> FetchedVideos {
  match api.recent_uploads(channel_id.as_str(), constants().page_size, key).await {
    Ok(items) => FetchedVideos(items.into_iter().filter_map(|item| video_from_item(item, display_name)).collect()),
    Err(e) => {
      warn!(channel_id = %channel_id.as_str(), err = %format!("{:#}", e), "add: upload fetch failed");
      FetchedVideos::default()
    }
  }
}

/// Map a search result to a feed entry attributed to `display_name`.
pub fn video_from_item(item: SearchItem, display_name: &str) -> Option<Video> {
  let id = item.id.video_id.filter(|id| !id.is_empty())?;
  let snippet = item.snippet.unwrap_or_default();
  let published_at = snippet.published_at.unwrap_or_default();
  let c = constants();
  Some(Video {
    url: format!("{}{}", c.watch_url, id),
    id,
    channel: display_name.to_string(),
    title: snippet.title,
    time: published_at.with_timezone(&Local).format(&c.date_format).to_string(),
    tag: c.upload_tag.clone(),
    published_at,
    thumbnail: snippet.thumbnails.best().map(str::to_string),
  })
}

/// A timestamp-based local id not already used by `existing`.
pub fn new_channel_id(existing: &[Channel]) -> String {
  let mut candidate = Utc::now().timestamp_millis();
  while existing.iter().any(|c| c.id == candidate.to_string()) {
    candidate += 1;
  }
  candidate.to_string()
}
