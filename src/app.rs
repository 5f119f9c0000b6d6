use anyhow::Result;
use ratatui::widgets::ListState;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::config::Config;
use crate::constants::constants;
use crate::dashboard::Dashboard;
use crate::models::{Channel, Filter, FilterOptions, NewChannel, Stats, Video};
use crate::pipeline::{AddChannelError, PendingChannel, prepare_channel};
use crate::store::{FileStore, Store};
use crate::theme::{THEMES, Theme, theme_index};
use crate::youtube::YouTubeApi;

// --- Types ---

pub type AddResult = Result<PendingChannel, AddChannelError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  Feed,
  Saved,
  Channels,
}

impl Tab {
  pub const ALL: [Tab; 3] = [Tab::Feed, Tab::Saved, Tab::Channels];

  pub fn label(self) -> &'static str {
    match self {
      Tab::Feed => "Feed",
      Tab::Saved => "Saved",
      Tab::Channels => "Channels",
    }
  }

  pub fn next(self) -> Tab {
    let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
    Self::ALL[(idx + 1) % Self::ALL.len()]
  }

  pub fn prev(self) -> Tab {
    let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
    Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  Browse,
  AddForm,
  Credential,
}

/// A single-line text input with a char-indexed cursor.
#[derive(Debug, Clone, Default)]
pub struct TextField {
  pub value: String,
  pub cursor: usize,
}

impl TextField {
  pub fn clear(&mut self) {
    self.value.clear();
    self.cursor = 0;
  }
}

/// The three-field "add channel" form.
#[derive(Debug, Clone, Default)]
pub struct AddForm {
  pub name: TextField,
  pub link: TextField,
  pub tag: TextField,
  /// 0 = name, 1 = link, 2 = tag.
  pub focus: usize,
}

impl AddForm {
  pub const LABELS: [&'static str; 3] = ["Name", "Link", "Tag"];

  pub fn focused_mut(&mut self) -> &mut TextField {
    match self.focus {
      0 => &mut self.name,
      1 => &mut self.link,
      _ => &mut self.tag,
    }
  }

  pub fn field(&self, idx: usize) -> &TextField {
    match idx {
      0 => &self.name,
      1 => &self.link,
      _ => &self.tag,
    }
  }

  pub fn next_field(&mut self) {
    self.focus = (self.focus + 1) % Self::LABELS.len();
  }

  pub fn prev_field(&mut self) {
    self.focus = (self.focus + Self::LABELS.len() - 1) % Self::LABELS.len();
  }

  pub fn request(&self) -> NewChannel {
    NewChannel { name: self.name.value.clone(), link: self.link.value.clone(), tag: self.tag.value.clone() }
  }

  pub fn reset(&mut self) {
    *self = Self::default();
  }
}

/// Step through `None → options[0] → … → None`.
pub fn cycle_option(current: Option<&str>, options: &[String]) -> Option<String> {
  match current {
    None => options.first().cloned(),
    Some(cur) => match options.iter().position(|o| o == cur) {
      Some(i) => options.get(i + 1).cloned(),
      None => options.first().cloned(),
    },
  }
}

pub struct App<S: Store = FileStore> {
  pub dashboard: Dashboard<S>,
  api: YouTubeApi,
  pub tab: Tab,
  pub mode: AppMode,
  pub theme_index: usize,
  pub list_state: ListState,
  pub filter: Filter,
  /// Snapshots of the dashboard reads, refreshed after every write.
  pub feed: Vec<Video>,
  pub saved: Vec<Video>,
  pub channels: Vec<Channel>,
  pub options: FilterOptions,
  pub stats: Stats,
  pub form: AddForm,
  pub credential_input: TextField,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  /// Informational message, lower priority than status/error.
  pub info_message: Option<String>,
  pub should_quit: bool,
  add_rx: Option<oneshot::Receiver<AddResult>>,
  error_time: Option<Instant>,
}

impl<S: Store> App<S> {
  pub fn new(dashboard: Dashboard<S>, api: YouTubeApi, config: &Config) -> Self {
    let theme_index = config.theme_name.as_deref().map(theme_index).unwrap_or(0);
    let mut app = Self {
      dashboard,
      api,
      tab: Tab::Feed,
      mode: AppMode::Browse,
      theme_index,
      list_state: ListState::default(),
      filter: Filter::default(),
      feed: Vec::new(),
      saved: Vec::new(),
      channels: Vec::new(),
      options: FilterOptions::default(),
      stats: Stats::default(),
      form: AddForm::default(),
      credential_input: TextField::default(),
      last_error: None,
      status_message: None,
      info_message: None,
      should_quit: false,
      add_rx: None,
      error_time: None,
    };
    app.refresh();
    if !app.dashboard.has_credential() {
      app.info_message = Some("No API key yet. Press ^k to set one.".to_string());
    }
    app
  }

  pub fn theme(&self) -> &'static Theme {
    &THEMES[self.theme_index % THEMES.len()]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    let mut config = Config::load();
    config.theme_name = Some(self.theme().name.to_string());
    config.save();
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(constants().error_ttl_secs)
    {
      self.last_error = None;
      self.error_time = None;
    }
  }

  pub fn is_adding(&self) -> bool {
    self.add_rx.is_some()
  }

  /// Re-read everything from the dashboard and clamp the selection.
  pub fn refresh(&mut self) {
    self.channels = self.dashboard.channels();
    self.saved = self.dashboard.saved();
    self.options = self.dashboard.filter_options();
    // A channel filter for a removed channel would silently hide everything.
    if let Some(channel) = self.filter.channel_constraint()
      && !self.options.channels.iter().any(|c| c == channel)
    {
      self.filter.channel = None;
    }
    self.feed = self.dashboard.feed(&self.filter);
    self.stats = self.dashboard.stats();
    self.clamp_selection();
  }

  pub fn visible_len(&self) -> usize {
    match self.tab {
      Tab::Feed => self.feed.len(),
      Tab::Saved => self.saved.len(),
      Tab::Channels => self.channels.len(),
    }
  }

  fn clamp_selection(&mut self) {
    let len = self.visible_len();
    if len == 0 {
      self.list_state.select(None);
    } else {
      let sel = self.list_state.selected().unwrap_or(0);
      self.list_state.select(Some(sel.min(len - 1)));
    }
  }

  pub fn select_next(&mut self) {
    let count = self.visible_len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| (i + 1) % count);
      self.list_state.select(Some(i));
    }
  }

  pub fn select_prev(&mut self) {
    let count = self.visible_len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
      self.list_state.select(Some(i));
    }
  }

  pub fn set_tab(&mut self, tab: Tab) {
    self.tab = tab;
    self.list_state.select(Some(0));
    self.clamp_selection();
  }

  fn selected_video(&self) -> Option<&Video> {
    let idx = self.list_state.selected()?;
    match self.tab {
      Tab::Feed => self.feed.get(idx),
      Tab::Saved => self.saved.get(idx),
      Tab::Channels => None,
    }
  }

  fn selected_channel(&self) -> Option<&Channel> {
    let idx = self.list_state.selected()?;
    if self.tab == Tab::Channels { self.channels.get(idx) } else { None }
  }

  pub fn selected_url(&self) -> Option<String> {
    match self.tab {
      Tab::Channels => self.selected_channel().map(|c| c.link.clone()),
      _ => self.selected_video().map(|v| v.url.clone()).filter(|u| !u.is_empty()),
    }
  }

  pub fn is_saved(&self, video_id: &str) -> bool {
    self.saved.iter().any(|v| v.id == video_id)
  }

  // --- Filters ---

  pub fn cycle_channel_filter(&mut self) {
    self.filter.channel = cycle_option(self.filter.channel_constraint(), &self.options.channels);
    self.refresh();
  }

  pub fn cycle_tag_filter(&mut self) {
    self.filter.tag = cycle_option(self.filter.tag_constraint(), &self.options.tags);
    self.refresh();
  }

  pub fn clear_filter(&mut self) {
    self.filter = Filter::default();
    self.refresh();
  }

  // --- Writes ---

  pub fn toggle_selected_saved(&mut self) {
    if self.tab != Tab::Feed {
      return;
    }
    let Some(id) = self.selected_video().map(|v| v.id.clone()) else { return };
    match self.dashboard.toggle_saved(&id) {
      Ok(Some(true)) => self.info_message = Some("Saved.".to_string()),
      Ok(Some(false)) => self.info_message = Some("Removed from saved.".to_string()),
      Ok(None) => {}
      Err(e) => self.set_error(format!("Save failed: {:#}", e)),
    }
    self.refresh();
  }

  pub fn remove_selected(&mut self) {
    let result = match self.tab {
      Tab::Saved => {
        let Some(id) = self.selected_video().map(|v| v.id.clone()) else { return };
        self.dashboard.remove_saved(&id)
      }
      Tab::Channels => {
        let Some(id) = self.selected_channel().map(|c| c.id.clone()) else { return };
        self.dashboard.remove_channel(&id)
      }
      Tab::Feed => return,
    };
    if let Err(e) = result {
      self.set_error(format!("Remove failed: {:#}", e));
    }
    self.refresh();
  }

  pub fn toggle_selected_favorite(&mut self) {
    let Some(id) = self.selected_channel().map(|c| c.id.clone()) else { return };
    match self.dashboard.toggle_favorite(&id) {
      Ok(_) => {
        self.refresh();
        // Follow the channel to its new position.
        if let Some(pos) = self.channels.iter().position(|c| c.id == id) {
          self.list_state.select(Some(pos));
        }
      }
      Err(e) => self.set_error(format!("Favorite failed: {:#}", e)),
    }
  }

  pub fn open_add_form(&mut self) {
    if self.is_adding() {
      self.set_error("A channel is already being added.".to_string());
      return;
    }
    self.clear_error();
    self.mode = AppMode::AddForm;
  }

  pub fn open_credential_prompt(&mut self) {
    self.clear_error();
    self.credential_input.value = self.dashboard.credential();
    self.credential_input.cursor = self.credential_input.value.chars().count();
    self.mode = AppMode::Credential;
  }

  pub fn submit_credential(&mut self) {
    let value = self.credential_input.value.clone();
    match self.dashboard.set_credential(&value) {
      Ok(()) => {
        self.info_message =
          Some(if value.trim().is_empty() { "API key cleared." } else { "API key saved." }.to_string());
      }
      Err(e) => self.set_error(format!("Failed to save API key: {:#}", e)),
    }
    self.credential_input.clear();
    self.mode = AppMode::Browse;
  }

  /// Start the add flow on a background task. Only one add may be in flight.
  pub fn trigger_add(&mut self) {
    if self.is_adding() {
      self.set_error("A channel is already being added.".to_string());
      return;
    }
    let request = self.form.request();
    let key = self.dashboard.credential();
    let api = self.api.clone();
    info!(name = %request.name.trim(), link = %request.link.trim(), "add triggered");

    self.clear_error();
    self.info_message = None;
    self.status_message = Some(format!("Adding '{}'…", request.name.trim()));
    self.mode = AppMode::Browse;

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(prepare_channel(&api, &key, &request).await);
    });
    self.add_rx = Some(rx);
  }

  pub fn check_pending(&mut self) -> Result<()> {
    if let Some(mut rx) = self.add_rx.take() {
      match rx.try_recv() {
        Ok(result) => {
          self.status_message = None;
          self.apply_add_result(result);
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.add_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.set_error("Add task failed.".to_string());
        }
      }
    }
    Ok(())
  }

  fn apply_add_result(&mut self, result: AddResult) {
    match result {
      Ok(pending) => match self.dashboard.commit_channel(pending) {
        Ok(channel) => {
          self.info_message = Some(format!("Added {} ({} videos).", channel.name, channel.videos.len()));
          self.form.reset();
          self.refresh();
        }
        Err(e) => self.set_error(format!("Failed to save channel: {:#}", e)),
      },
      Err(e) => {
        warn!(err = %e, "add failed");
        self.set_error(e.to_string());
      }
    }
  }
}
