//! Non-interactive subcommands. Each maps to one dashboard read or write.

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Subcommand};
use clap_complete::Shell;
use serde::Serialize;
use std::io::Write;

use crate::dashboard::Dashboard;
use crate::models::{Channel, Filter, NewChannel, Video};
use crate::store::Store;
use crate::youtube::VideoApi;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Print the aggregated feed, newest first
  Feed {
    /// Only uploads from this channel name (exact match)
    #[arg(long)]
    channel: Option<String>,
    /// Only uploads with this tag (exact match)
    #[arg(long)]
    tag: Option<String>,
    #[arg(long)]
    json: bool,
  },
  /// Print the saved videos
  Saved {
    #[arg(long)]
    json: bool,
  },
  /// Print the registered channels, favorites first
  Channels {
    #[arg(long)]
    json: bool,
  },
  /// Print the values available for --channel and --tag
  Options,
  /// Print channel, feed and saved counts
  Stats,
  /// Register a channel and fetch its latest uploads
  Add {
    #[arg(long)]
    name: String,
    /// Channel URL: /channel/<id>, /@handle, /user/<name>, or anything searchable
    #[arg(long)]
    link: String,
    #[arg(long, default_value = "")]
    tag: String,
  },
  /// Remove a channel by its local id
  Remove { id: String },
  /// Toggle a channel's favorite flag
  Favorite { id: String },
  /// Save a feed video, or unsave it if already saved
  Save { video_id: String },
  /// Remove a video from the saved list
  Unsave { video_id: String },
  /// Store the YouTube Data API key
  SetKey { key: String },
  /// Print shell completions
  Completions { shell: Shell },
}

fn print_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<()> {
  let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
  writeln!(out, "{}", text)?;
  Ok(())
}

fn print_videos(out: &mut impl Write, videos: &[Video], is_saved: impl Fn(&str) -> bool) -> Result<()> {
  if videos.is_empty() {
    writeln!(out, "No uploads.")?;
  }
  for v in videos {
    let mark = if is_saved(&v.id) { "*" } else { " " };
    writeln!(out, "{} {:<12} {:<20} {:<12} {}", mark, v.id, v.channel, v.time, v.title)?;
  }
  Ok(())
}

fn print_channels(out: &mut impl Write, channels: &[Channel]) -> Result<()> {
  if channels.is_empty() {
    writeln!(out, "No channels. Add one with `tubehub add --name <name> --link <url>`.")?;
  }
  for c in channels {
    let star = if c.favorite { "★" } else { "☆" };
    writeln!(out, "{} {:<14} {:<20} {:<10} {} ({} videos)", star, c.id, c.name, c.tag, c.link, c.videos.len())?;
  }
  Ok(())
}

/// Run `cmd` against `dashboard`, writing human-readable output to `out`.
pub async fn run<S: Store, A: VideoApi>(
  cmd: Command,
  dashboard: &mut Dashboard<S>,
  api: &A,
  out: &mut impl Write,
) -> Result<()> {
  match cmd {
    Command::Feed { channel, tag, json } => {
      let feed = dashboard.feed(&Filter::new(channel, tag));
      if json {
        print_json(out, &feed)?;
      } else {
        print_videos(out, &feed, |id| dashboard.is_saved(id))?;
      }
    }
    Command::Saved { json } => {
      let saved = dashboard.saved();
      if json {
        print_json(out, &saved)?;
      } else if saved.is_empty() {
        writeln!(out, "You haven't saved any videos yet.")?;
      } else {
        print_videos(out, &saved, |_| false)?;
      }
    }
    Command::Channels { json } => {
      let channels = dashboard.channels();
      if json { print_json(out, &channels)? } else { print_channels(out, &channels)? }
    }
    Command::Options => {
      let options = dashboard.filter_options();
      writeln!(out, "channels: {}", options.channels.join(", "))?;
      writeln!(out, "tags:     {}", options.tags.join(", "))?;
    }
    Command::Stats => {
      let stats = dashboard.stats();
      writeln!(out, "channels: {}\nfeed:     {}\nsaved:    {}", stats.channels, stats.feed, stats.saved)?;
    }
    Command::Add { name, link, tag } => {
      let channel = dashboard.add_channel(api, &NewChannel { name, link, tag }).await?;
      writeln!(out, "Added {} ({}) with {} videos.", channel.name, channel.id, channel.videos.len())?;
    }
    Command::Remove { id } => {
      if !dashboard.remove_channel(&id)? {
        bail!("No channel with id '{}'.", id);
      }
      writeln!(out, "Removed channel {}.", id)?;
    }
    Command::Favorite { id } => match dashboard.toggle_favorite(&id)? {
      Some(true) => writeln!(out, "Channel {} is now a favorite.", id)?,
      Some(false) => writeln!(out, "Channel {} is no longer a favorite.", id)?,
      None => bail!("No channel with id '{}'.", id),
    },
    Command::Save { video_id } => match dashboard.toggle_saved(&video_id)? {
      Some(true) => writeln!(out, "Saved {}.", video_id)?,
      Some(false) => writeln!(out, "Unsaved {}.", video_id)?,
      None => bail!("Video '{}' is not in the feed.", video_id),
    },
    Command::Unsave { video_id } => {
      dashboard.remove_saved(&video_id)?;
      writeln!(out, "Removed {} from saved.", video_id)?;
    }
    Command::SetKey { key } => {
      dashboard.set_credential(&key)?;
      writeln!(out, "API key saved.")?;
    }
    Command::Completions { shell } => {
      let mut cmd = crate::Args::command();
      clap_complete::generate(shell, &mut cmd, env!("CARGO_PKG_NAME"), out);
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{make_channel, make_video};
  use crate::resolver::tests::{MockApi, channel_item};
  use crate::store::{CHANNELS_KEY, MemoryStore, StoreExt};

  fn dashboard() -> Dashboard<MemoryStore> {
    let mut store = MemoryStore::new();
    let channels = vec![
      make_channel("1", "Lab", vec![make_video("a1", "Lab", "Upload", "2024-05-03T10:00:00Z")]),
      make_channel("2", "Studio", vec![make_video("b1", "Studio", "Review", "2024-05-04T10:00:00Z")]),
    ];
    store.set(CHANNELS_KEY, &channels).expect("seed");
    Dashboard::new(store)
  }

  async fn run_text(cmd: Command, d: &mut Dashboard<MemoryStore>, api: &MockApi) -> Result<String> {
    let mut out = Vec::new();
    run(cmd, d, api, &mut out).await?;
    Ok(String::from_utf8(out).expect("utf8"))
  }

  #[tokio::test]
  async fn feed_filters_by_tag() {
    let mut d = dashboard();
    let text = run_text(Command::Feed { channel: None, tag: Some("Review".into()), json: false }, &mut d, &MockApi::default())
      .await
      .expect("run");
    assert!(text.contains("b1"));
    assert!(!text.contains("a1"));
  }

  #[tokio::test]
  async fn feed_json_is_parseable() {
    let mut d = dashboard();
    let text =
      run_text(Command::Feed { channel: None, tag: None, json: true }, &mut d, &MockApi::default()).await.expect("run");
    let videos: Vec<Video> = serde_json::from_str(&text).expect("json");
    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0].id, "b1");
  }

  #[tokio::test]
  async fn save_unknown_video_is_an_error() {
    let mut d = dashboard();
    let err = run_text(Command::Save { video_id: "zzz".into() }, &mut d, &MockApi::default()).await.unwrap_err();
    assert!(err.to_string().contains("not in the feed"));
  }

  #[tokio::test]
  async fn save_marks_video_in_feed_listing() {
    let mut d = dashboard();
    run_text(Command::Save { video_id: "a1".into() }, &mut d, &MockApi::default()).await.expect("save");
    let text =
      run_text(Command::Feed { channel: None, tag: None, json: false }, &mut d, &MockApi::default()).await.expect("run");
    let a1_line = text.lines().find(|l| l.contains("a1")).expect("a1 listed");
    assert!(a1_line.starts_with('*'));
  }

  #[tokio::test]
  async fn add_without_key_reports_missing_credential() {
    let mut d = dashboard();
    let api = MockApi { handle_items: vec![channel_item("UC1")], ..Default::default() };
    let cmd = Command::Add { name: "New".into(), link: "https://youtube.com/@new".into(), tag: String::new() };
    let err = run_text(cmd, &mut d, &api).await.unwrap_err();
    assert!(err.to_string().contains("API key"));
    assert_eq!(d.channels().len(), 2);
  }

  #[tokio::test]
  async fn add_with_key_appends_channel() {
    let mut d = dashboard();
    run_text(Command::SetKey { key: "k".into() }, &mut d, &MockApi::default()).await.expect("set key");
    let api = MockApi { handle_items: vec![channel_item("UC1")], ..Default::default() };
    let cmd = Command::Add { name: "New".into(), link: "https://youtube.com/@new".into(), tag: String::new() };
    let text = run_text(cmd, &mut d, &api).await.expect("add");
    assert!(text.starts_with("Added New"));
    assert_eq!(d.channels().len(), 3);
  }

  #[tokio::test]
  async fn favorite_unknown_channel_is_an_error() {
    let mut d = dashboard();
    assert!(run_text(Command::Favorite { id: "nope".into() }, &mut d, &MockApi::default()).await.is_err());
  }

  #[tokio::test]
  async fn stats_prints_counts() {
    let mut d = dashboard();
    let text = run_text(Command::Stats, &mut d, &MockApi::default()).await.expect("run");
    assert!(text.contains("channels: 2"));
    assert!(text.contains("saved:    0"));
  }
}
