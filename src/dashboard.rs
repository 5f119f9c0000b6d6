//! The dashboard core: reads and writes over an injected [`Store`].
//!
//! Every write loads the current collection, mutates it and writes it back.
//! Views re-read after each write instead of caching.

use anyhow::Result;
use tracing::{debug, info};

use crate::feed;
use crate::models::{Channel, Filter, FilterOptions, NewChannel, Stats, Video};
use crate::pipeline::{self, AddChannelError, PendingChannel};
use crate::store::{CHANNELS_KEY, CREDENTIAL_KEY, SAVED_KEY, Store, StoreExt};
use crate::youtube::VideoApi;

pub struct Dashboard<S: Store> {
  store: S,
}

impl<S: Store> Dashboard<S> {
  pub fn new(store: S) -> Self {
    Self { store }
  }

  // --- Reads ---

  pub fn channels(&self) -> Vec<Channel> {
    self.store.get(CHANNELS_KEY)
  }

  pub fn saved(&self) -> Vec<Video> {
    self.store.get(SAVED_KEY)
  }

  pub fn credential(&self) -> String {
    self.store.get(CREDENTIAL_KEY)
  }

  pub fn has_credential(&self) -> bool {
    !self.credential().trim().is_empty()
  }

  /// The aggregated feed narrowed by `filter`.
  pub fn feed(&self, filter: &Filter) -> Vec<Video> {
    feed::apply_filter(feed::aggregate(&self.channels()), filter)
  }

  pub fn filter_options(&self) -> FilterOptions {
    let channels = self.channels();
    let feed = feed::aggregate(&channels);
    feed::filter_options(&channels, &feed)
  }

  pub fn stats(&self) -> Stats {
    let channels = self.channels();
    let feed_len = feed::aggregate(&channels).len();
    Stats { channels: channels.len(), feed: feed_len, saved: self.saved().len() }
  }

  /// Whether `video_id` is in the saved ledger. Always derived, never stored.
  pub fn is_saved(&self, video_id: &str) -> bool {
    self.saved().iter().any(|v| v.id == video_id)
  }

  // --- Writes ---

  pub fn set_credential(&mut self, credential: &str) -> Result<()> {
    self.store.set(CREDENTIAL_KEY, credential.trim())?;
    info!(empty = credential.trim().is_empty(), "credential updated");
    Ok(())
  }

  /// Run the whole add flow: validate, resolve, fetch, then append and persist.
  ///
  /// Nothing is written unless every step succeeds.
  pub async fn add_channel<A: VideoApi>(&mut self, api: &A, request: &NewChannel) -> Result<Channel, AddChannelError> {
    let pending = pipeline::prepare_channel(api, &self.credential(), request).await?;
    Ok(self.commit_channel(pending)?)
  }

  /// Append a prepared channel (not a favorite) and persist the collection.
  pub fn commit_channel(&mut self, pending: PendingChannel) -> Result<Channel> {
    let mut channels = self.channels();
    let channel = pending.into_channel(pipeline::new_channel_id(&channels));
    channels.push(channel.clone());
    self.store.set(CHANNELS_KEY, &channels)?;
    info!(id = %channel.id, name = %channel.name, videos = channel.videos.len(), "channel added");
    Ok(channel)
  }

  /// Remove a channel by local id. Saved videos from it are kept.
  pub fn remove_channel(&mut self, id: &str) -> Result<bool> {
    let mut channels = self.channels();
    let before = channels.len();
    channels.retain(|c| c.id != id);
    let removed = channels.len() != before;
    self.store.set(CHANNELS_KEY, &channels)?;
    info!(id, removed, "channel remove");
    Ok(removed)
  }

  /// Flip a channel's favorite flag and move favorites to the front.
  ///
  /// The sort is stable, so each group keeps its relative order.
  pub fn toggle_favorite(&mut self, id: &str) -> Result<Option<bool>> {
    let mut channels = self.channels();
    let mut state = None;
    if let Some(channel) = channels.iter_mut().find(|c| c.id == id) {
      channel.favorite = !channel.favorite;
      state = Some(channel.favorite);
    }
    channels.sort_by_key(|c| std::cmp::Reverse(c.favorite));
    self.store.set(CHANNELS_KEY, &channels)?;
    debug!(id, favorite = ?state, "favorite toggled");
    Ok(state)
  }

  /// Save or unsave a feed video by id.
  ///
  /// The id is looked up in the current unfiltered feed, not in the ledger;
  /// an unknown id is a no-op. Returns the new saved state, or `None` when
  /// nothing changed.
  pub fn toggle_saved(&mut self, video_id: &str) -> Result<Option<bool>> {
    let feed = feed::aggregate(&self.channels());
    let Some(found) = feed.into_iter().find(|v| v.id == video_id) else {
      debug!(video_id, "toggle_saved: not in feed");
      return Ok(None);
    };

    let mut saved = self.saved();
    let now_saved = if saved.iter().any(|v| v.id == video_id) {
      saved.retain(|v| v.id != video_id);
      false
    } else {
      saved.push(found);
      true
    };
    self.store.set(SAVED_KEY, &saved)?;
    info!(video_id, saved = now_saved, "saved toggled");
    Ok(Some(now_saved))
  }

  /// Drop a video from the saved ledger regardless of the feed.
  pub fn remove_saved(&mut self, video_id: &str) -> Result<bool> {
    let mut saved = self.saved();
    let before = saved.len();
    saved.retain(|v| v.id != video_id);
    let removed = saved.len() != before;
    self.store.set(SAVED_KEY, &saved)?;
    info!(video_id, removed, "saved remove");
    Ok(removed)
  }
}
