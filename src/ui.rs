use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, Clear, List, ListItem, Padding, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{AddForm, App, AppMode, Tab, TextField};
use crate::models::{Channel, Video};
use crate::store::Store;
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` display columns, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  use unicode_width::UnicodeWidthChar;
  if s.width() <= max_width {
    return s.to_string();
  }
  let budget = max_width.saturating_sub(1);
  let mut used = 0;
  let truncated: String = s
    .chars()
    .take_while(|c| {
      used += c.width().unwrap_or(0);
      used <= budget
    })
    .collect();
  format!("{}…", truncated)
}

/// Left text plus right-aligned muted metadata within `width` columns.
fn split_line<'a>(left: &str, right: &str, width: usize, fg: Style, muted: Style) -> Line<'a> {
  if right.is_empty() {
    return Line::from(Span::styled(truncate_str(left, width), fg));
  }
  let right_w = right.width();
  let left = truncate_str(left, width.saturating_sub(right_w + 2));
  let gap = width.saturating_sub(left.width() + right_w);
  Line::from(vec![Span::styled(left, fg), Span::raw(" ".repeat(gap)), Span::styled(right.to_string(), muted)])
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
  let w = width.min(area.width);
  let h = height.min(area.height);
  Rect { x: area.x + (area.width - w) / 2, y: area.y + (area.height - h) / 2, width: w, height: h }
}

fn rounded_block<'a>(theme: &Theme) -> Block<'a> {
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(theme.border))
}

// --- UI Rendering ---

pub fn ui<S: Store>(frame: &mut Frame, app: &mut App<S>) {
  let theme = app.theme();
  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, tabs_area, main_area, status_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  render_tabs(frame, app, tabs_area);
  match app.tab {
    Tab::Feed => render_feed(frame, app, main_area),
    Tab::Saved => render_saved(frame, app, main_area),
    Tab::Channels => render_channels(frame, app, main_area),
  }
  render_status(frame, app, status_area);
  render_footer(frame, app, footer_area);

  match app.mode {
    AppMode::AddForm => render_add_form(frame, theme, &app.form, frame.area()),
    AppMode::Credential => render_credential(frame, theme, &app.credential_input, frame.area()),
    AppMode::Browse => {}
  }
}

fn render_header<S: Store>(frame: &mut Frame, app: &App<S>, area: Rect) {
  let theme = app.theme();
  let left = Line::from(Span::styled(" ▶ tubehub ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let stats = format!(
    "{} channels · {} in feed · {} saved  v{} ",
    app.stats.channels,
    app.stats.feed,
    app.stats.saved,
    env!("CARGO_PKG_VERSION")
  );
  let width = stats.chars().count() as u16;
  let right = Line::from(Span::styled(stats, Style::default().fg(theme.muted)));
  let right_area = Rect { x: area.x + area.width.saturating_sub(width), width: width.min(area.width), ..area };
  frame.render_widget(right, right_area);
}

fn render_tabs<S: Store>(frame: &mut Frame, app: &App<S>, area: Rect) {
  let theme = app.theme();
  let spans: Vec<Span> = Tab::ALL
    .iter()
    .flat_map(|tab| {
      let style = if *tab == app.tab {
        Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
      } else {
        Style::default().fg(theme.muted)
      };
      [Span::styled(format!(" {} ", tab.label()), style), Span::raw(" ")]
    })
    .collect();
  frame.render_widget(Line::from(spans), area);
}

fn filter_title<S: Store>(app: &App<S>) -> String {
  let channel = app.filter.channel_constraint().unwrap_or("all channels");
  let tag = app.filter.tag_constraint().unwrap_or("all tags");
  format!(" Feed: {} / {} ", channel, tag)
}

fn video_item<'a>(video: &Video, saved: bool, width: usize, theme: &Theme, stripe: bool) -> ListItem<'a> {
  let marker = if saved { "● " } else { "  " };
  let right = format!("{}  {}  {}", video.channel, video.tag, video.time);
  let fg = Style::default().fg(theme.fg);
  let muted = Style::default().fg(theme.muted);
  let mut line = split_line(&video.title, &right, width.saturating_sub(2), fg, muted);
  line.spans.insert(0, Span::styled(marker, Style::default().fg(theme.favorite)));
  ListItem::new(line).bg(if stripe { theme.stripe_bg } else { theme.bg })
}

fn render_video_list<S: Store>(frame: &mut Frame, app: &mut App<S>, area: Rect, title: String, empty: &str) {
  let theme = app.theme();
  let videos = if app.tab == Tab::Saved { &app.saved } else { &app.feed };
  let block = rounded_block(theme)
    .title(title)
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));

  if videos.is_empty() {
    let paragraph =
      Paragraph::new(Span::styled(empty.to_string(), Style::default().fg(theme.muted))).alignment(Alignment::Center);
    frame.render_widget(paragraph.block(block), area);
    return;
  }

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;
  let items: Vec<ListItem> =
    videos.iter().enumerate().map(|(i, v)| video_item(v, app.is_saved(&v.id), inner_w, theme, i % 2 == 1)).collect();

  let list = List::new(items)
    .block(block)
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));
  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_feed<S: Store>(frame: &mut Frame, app: &mut App<S>, area: Rect) {
  let title = filter_title(app);
  render_video_list(frame, app, area, title, "No uploads match these filters.");
}

fn render_saved<S: Store>(frame: &mut Frame, app: &mut App<S>, area: Rect) {
  render_video_list(frame, app, area, " Saved ".to_string(), "You haven't saved any videos yet.");
}

fn channel_item<'a>(channel: &Channel, width: usize, theme: &Theme) -> ListItem<'a> {
  let star = if channel.favorite { "★ " } else { "☆ " };
  let link = channel.link.trim_start_matches("https://").trim_start_matches("http://");
  let right = if channel.tag.is_empty() { link.to_string() } else { format!("{} · {}", channel.tag, link) };
  let left = format!("{} ({} videos)", channel.name, channel.videos.len());
  let mut line =
    split_line(&left, &right, width.saturating_sub(2), Style::default().fg(theme.fg), Style::default().fg(theme.muted));
  line.spans.insert(0, Span::styled(star, Style::default().fg(theme.favorite)));
  ListItem::new(line)
}

fn render_channels<S: Store>(frame: &mut Frame, app: &mut App<S>, area: Rect) {
  let theme = app.theme();
  let block = rounded_block(theme)
    .title(" Channels ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));

  if app.channels.is_empty() {
    let paragraph = Paragraph::new(Span::styled(
      "Add channels to personalise your feed. Press 'a'.",
      Style::default().fg(theme.muted),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(paragraph.block(block), area);
    return;
  }

  let inner_w = area.width.saturating_sub(4) as usize;
  let items: Vec<ListItem> = app.channels.iter().map(|c| channel_item(c, inner_w, theme)).collect();
  let list = List::new(items)
    .block(block)
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));
  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_status<S: Store>(frame: &mut Frame, app: &App<S>, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(info) = &app.info_message {
    (format!(" ℹ  {}", info), Style::default().fg(theme.status))
  } else {
    (" Ready".to_string(), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_footer<S: Store>(frame: &mut Frame, app: &App<S>, area: Rect) {
  let theme = app.theme();
  let keys: Vec<(&str, &str)> = match app.mode {
    AppMode::AddForm => vec![("Tab", "Next field"), ("Enter", "Next/Add"), ("Esc", "Cancel")],
    AppMode::Credential => vec![("Enter", "Save key"), ("Esc", "Cancel")],
    AppMode::Browse => {
      let mut k = vec![("Tab", "Switch"), ("j/k", "Navigate")];
      match app.tab {
        Tab::Feed => {
          k.push(("s", "Save"));
          k.push(("c/t", "Filter"));
          k.push(("x", "Clear"));
        }
        Tab::Saved => k.push(("d", "Remove")),
        Tab::Channels => {
          k.push(("f", "Favorite"));
          k.push(("d", "Remove"));
        }
      }
      k.push(("a", "Add"));
      k.push(("o", "Open"));
      k.push(("^k", "API key"));
      k.push(("q", "Quit"));
      k
    }
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw(" "));
      }
      s
    })
    .collect();
  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

/// Render `field` inside `area` (one line), scrolled so the cursor stays visible.
fn render_field(frame: &mut Frame, field: &TextField, area: Rect, style: Style, focused: bool) {
  if area.width == 0 {
    return;
  }
  let inner_w = area.width as usize;
  let cursor_col = display_width(&field.value, field.cursor);
  let scroll = if cursor_col >= inner_w { cursor_col + 1 - inner_w } else { 0 };

  let visible: String = field
    .value
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= scroll)
    .take_while(|(start, _, _)| *start < scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();
  frame.render_widget(Paragraph::new(visible).style(style), area);

  if focused {
    frame.set_cursor_position((area.x + (cursor_col - scroll) as u16, area.y));
  }
}

fn render_add_form(frame: &mut Frame, theme: &Theme, form: &AddForm, area: Rect) {
  let popup = centered_rect(64, 9, area);
  frame.render_widget(Clear, popup);
  let block = rounded_block(theme)
    .title(" Add channel ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_style(Style::default().fg(theme.accent))
    .style(Style::default().bg(theme.bg))
    .padding(Padding::horizontal(1));
  let inner = block.inner(popup);
  frame.render_widget(block, popup);

  let rows = Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
    .spacing(1)
    .split(inner);
  for (idx, label) in AddForm::LABELS.iter().enumerate() {
    let focused = form.focus == idx;
    let [label_area, field_area] = Layout::horizontal([Constraint::Length(7), Constraint::Min(1)]).areas(rows[idx]);
    let label_style = if focused { Style::default().fg(theme.accent) } else { Style::default().fg(theme.muted) };
    frame.render_widget(Span::styled(format!("{:<6}", label), label_style), label_area);
    render_field(frame, form.field(idx), field_area, Style::default().fg(theme.fg), focused);
  }
}

fn render_credential(frame: &mut Frame, theme: &Theme, field: &TextField, area: Rect) {
  let popup = centered_rect(64, 3, area);
  frame.render_widget(Clear, popup);
  let block = rounded_block(theme)
    .title(" YouTube Data API key ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_style(Style::default().fg(theme.accent))
    .style(Style::default().bg(theme.bg))
    .padding(Padding::horizontal(1));
  let inner = block.inner(popup);
  frame.render_widget(block, popup);
  render_field(frame, field, inner, Style::default().fg(theme.fg), true);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn truncate_keeps_short_strings() {
    assert_eq!(truncate_str("abc", 5), "abc");
    assert_eq!(truncate_str("abcdef", 4), "abc…");
  }

  #[test]
  fn display_width_counts_wide_chars() {
    assert_eq!(display_width("日本", 2), 4);
    assert_eq!(display_width("ab", 1), 1);
  }

  #[test]
  fn centered_rect_fits_inside_area() {
    let area = Rect { x: 0, y: 0, width: 40, height: 10 };
    let r = centered_rect(64, 9, area);
    assert_eq!(r.width, 40);
    assert_eq!(r.y, 0);
    let r = centered_rect(20, 4, area);
    assert_eq!((r.x, r.y), (10, 3));
  }

  #[test]
  fn split_line_pads_to_width() {
    let line = split_line("Title", "meta", 20, Style::default(), Style::default());
    let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
    assert_eq!(text.chars().count(), 20);
    assert!(text.ends_with("meta"));
  }

  #[test]
  fn split_line_measures_wide_titles_in_columns() {
    let line = split_line("日本語のタイトルです", "meta", 20, Style::default(), Style::default());
    let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
    assert!(text.width() <= 20);
    assert!(text.ends_with("meta"));
  }

  #[test]
  fn truncate_counts_display_columns() {
    assert_eq!(truncate_str("日本語", 6), "日本語");
    assert_eq!(truncate_str("日本語", 5), "日本…");
  }

  #[test]
  fn render_field_tolerates_zero_width() {
    use ratatui::{Terminal, backend::TestBackend};
    let mut terminal = Terminal::new(TestBackend::new(10, 3)).expect("terminal");
    let field = TextField { value: "abc".to_string(), cursor: 3 };
    terminal
      .draw(|frame| render_field(frame, &field, Rect { x: 0, y: 0, width: 0, height: 1 }, Style::default(), true))
      .expect("draw");
  }
}
