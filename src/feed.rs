//! Build the uploads feed from cached channel videos.

use std::collections::BTreeSet;

use crate::constants::constants;
use crate::models::{Channel, Filter, FilterOptions, Video};

/// Every channel's cached uploads, newest first.
///
/// With no channels registered the built-in demo feed is returned instead.
/// The sort is stable, so equal timestamps keep channel order.
pub fn aggregate(channels: &[Channel]) -> Vec<Video> {
  if channels.is_empty() {
    return constants().placeholder_feed.clone();
  }
  let mut feed: Vec<Video> = channels.iter().flat_map(|c| c.videos.iter().cloned()).collect();
  feed.sort_by(|a, b| b.published_at.cmp(&a.published_at));
  feed
}

/// Keep the items matching every non-empty constraint of `filter`, in order.
pub fn apply_filter(feed: Vec<Video>, filter: &Filter) -> Vec<Video> {
  if filter.is_empty() {
    return feed;
  }
  feed.into_iter().filter(|v| filter.matches(v)).collect()
}

/// Distinct channel names in stored order and the distinct tags of `feed`, sorted.
pub fn filter_options(channels: &[Channel], feed: &[Video]) -> FilterOptions {
  let tags: BTreeSet<&str> = feed.iter().map(|v| v.tag.as_str()).filter(|t| !t.is_empty()).collect();
  let mut names: Vec<String> = Vec::with_capacity(channels.len());
  for c in channels {
    if !names.contains(&c.name) {
      names.push(c.name.clone());
    }
  }
  FilterOptions {
    channels: names,
    tags: tags.into_iter().map(str::to_string).collect(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{make_channel, make_video};

  fn ids(feed: &[Video]) -> Vec<&str> {
    feed.iter().map(|v| v.id.as_str()).collect()
  }

  fn sample_channels() -> Vec<Channel> {
    vec![
      make_channel(
        "1",
        "Lab",
        vec![
          make_video("a1", "Lab", "Upload", "2024-05-03T10:00:00Z"),
          make_video("a2", "Lab", "Upload", "2024-05-01T10:00:00Z"),
        ],
      ),
      make_channel("2", "Empty", Vec::new()),
      make_channel(
        "3",
        "Studio",
        vec![
          make_video("b1", "Studio", "Review", "2024-05-04T10:00:00Z"),
          make_video("b2", "Studio", "Upload", "2024-05-02T10:00:00Z"),
        ],
      ),
    ]
  }

  #[test]
  fn empty_collection_yields_placeholder_feed() {
    let feed = aggregate(&[]);
    assert_eq!(feed, constants().placeholder_feed);
    assert!(!feed.is_empty());
  }

  #[test]
  fn aggregate_flattens_and_sorts_newest_first() {
    let feed = aggregate(&sample_channels());
    assert_eq!(ids(&feed), vec!["b1", "a1", "b2", "a2"]);
  }

  #[test]
  fn channels_without_videos_contribute_nothing() {
    let feed = aggregate(&[make_channel("1", "Empty", Vec::new())]);
    assert!(feed.is_empty());
  }

  #[test]
  fn equal_timestamps_keep_channel_order() {
    let channels = vec![
      make_channel("1", "A", vec![make_video("x", "A", "Upload", "2024-05-01T10:00:00Z")]),
      make_channel("2", "B", vec![make_video("y", "B", "Upload", "2024-05-01T10:00:00Z")]),
    ];
    assert_eq!(ids(&aggregate(&channels)), vec!["x", "y"]);
  }

  #[test]
  fn empty_filter_returns_feed_unchanged() {
    let feed = aggregate(&sample_channels());
    assert_eq!(apply_filter(feed.clone(), &Filter::default()), feed);
  }

  #[test]
  fn filter_by_channel() {
    let feed = aggregate(&sample_channels());
    let filtered = apply_filter(feed, &Filter::new(Some("Lab".into()), None));
    assert_eq!(ids(&filtered), vec!["a1", "a2"]);
  }

  #[test]
  fn filter_by_tag() {
    let feed = aggregate(&sample_channels());
    let filtered = apply_filter(feed, &Filter::new(None, Some("Upload".into())));
    assert_eq!(ids(&filtered), vec!["a1", "b2", "a2"]);
  }

  #[test]
  fn filter_by_channel_and_tag() {
    let feed = aggregate(&sample_channels());
    let filtered = apply_filter(feed, &Filter::new(Some("Studio".into()), Some("Upload".into())));
    assert_eq!(ids(&filtered), vec!["b2"]);
  }

  #[test]
  fn filter_is_case_sensitive() {
    let feed = aggregate(&sample_channels());
    assert!(apply_filter(feed, &Filter::new(Some("lab".into()), None)).is_empty());
  }

  #[test]
  fn filter_applies_to_placeholder_feed() {
    let filtered = apply_filter(aggregate(&[]), &Filter::new(None, Some("Review".into())));
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].channel, "Pixel Lab");
  }

  #[test]
  fn options_list_channels_in_order_and_sorted_tags() {
    let channels = sample_channels();
    let feed = aggregate(&channels);
    let options = filter_options(&channels, &feed);
    assert_eq!(options.channels, vec!["Lab", "Empty", "Studio"]);
    assert_eq!(options.tags, vec!["Review", "Upload"]);
  }

  #[test]
  fn options_list_each_channel_name_once() {
    let channels = vec![
      make_channel("1", "Lab", Vec::new()),
      make_channel("2", "Studio", Vec::new()),
      make_channel("3", "Lab", Vec::new()),
    ];
    let options = filter_options(&channels, &[]);
    assert_eq!(options.channels, vec!["Lab", "Studio"]);
  }
}
