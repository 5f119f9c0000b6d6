use anyhow::{Context, Result};
use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, AppMode, TextField};
use crate::store::Store;

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Apply a cursor/editing key to a text field. Returns false for keys it doesn't handle.
pub fn edit_field(field: &mut TextField, code: KeyCode) -> bool {
  match code {
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(&field.value, field.cursor);
      field.value.insert(byte_idx, c);
      field.cursor += 1;
    }
    KeyCode::Backspace => {
      if field.cursor > 0 {
        field.cursor -= 1;
        let byte_idx = char_to_byte_index(&field.value, field.cursor);
        field.value.remove(byte_idx);
      }
    }
    KeyCode::Delete => {
      if field.cursor < field.value.chars().count() {
        let byte_idx = char_to_byte_index(&field.value, field.cursor);
        field.value.remove(byte_idx);
      }
    }
    KeyCode::Left => {
      field.cursor = field.cursor.saturating_sub(1);
    }
    KeyCode::Right => {
      if field.cursor < field.value.chars().count() {
        field.cursor += 1;
      }
    }
    KeyCode::Home => {
      field.cursor = 0;
    }
    KeyCode::End => {
      field.cursor = field.value.chars().count();
    }
    _ => return false,
  }
  true
}

/// Open `url` with the platform's default handler.
pub fn open_in_browser(url: &str) -> Result<()> {
  #[cfg(target_os = "macos")]
  let cmd = "open";
  #[cfg(not(target_os = "macos"))]
  let cmd = "xdg-open";
  let mut child = std::process::Command::new(cmd)
    .arg(url)
    .stdin(std::process::Stdio::null())
    .stdout(std::process::Stdio::null())
    .stderr(std::process::Stdio::null())
    .spawn()
    .with_context(|| format!("Failed to run {}", cmd))?;
  // Reap the child in a background thread to avoid zombie processes.
  std::thread::spawn(move || {
    let _ = child.wait();
  });
  Ok(())
}

// --- Event Handling ---

pub fn handle_key_event<S: Store>(app: &mut App<S>, key: event::KeyEvent) -> Result<()> {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('k') {
    app.open_credential_prompt();
    return Ok(());
  }

  match app.mode {
    AppMode::Browse => handle_browse_key(app, key),
    AppMode::AddForm => handle_form_key(app, key),
    AppMode::Credential => handle_credential_key(app, key),
  }
  Ok(())
}

fn handle_browse_key<S: Store>(app: &mut App<S>, key: event::KeyEvent) {
  match key.code {
    KeyCode::Char('q') | KeyCode::Esc => {
      app.should_quit = true;
    }
    KeyCode::Tab => {
      app.set_tab(app.tab.next());
    }
    KeyCode::BackTab => {
      app.set_tab(app.tab.prev());
    }
    KeyCode::Down | KeyCode::Char('j') => {
      app.select_next();
    }
    KeyCode::Up | KeyCode::Char('k') => {
      app.select_prev();
    }
    KeyCode::Enter | KeyCode::Char('s') => {
      app.toggle_selected_saved();
    }
    KeyCode::Char('c') => {
      app.cycle_channel_filter();
    }
    KeyCode::Char('t') => {
      app.cycle_tag_filter();
    }
    KeyCode::Char('x') => {
      app.clear_filter();
    }
    KeyCode::Char('f') => {
      app.toggle_selected_favorite();
    }
    KeyCode::Char('d') | KeyCode::Delete => {
      app.remove_selected();
    }
    KeyCode::Char('a') => {
      app.open_add_form();
    }
    KeyCode::Char('o') => {
      if let Some(url) = app.selected_url()
        && let Err(e) = open_in_browser(&url)
      {
        app.set_error(format!("Failed to open browser: {:#}", e));
      }
    }
    _ => {}
  }
}

fn handle_form_key<S: Store>(app: &mut App<S>, key: event::KeyEvent) {
  match key.code {
    KeyCode::Esc => {
      app.mode = AppMode::Browse;
    }
    KeyCode::Tab | KeyCode::Down => {
      app.form.next_field();
    }
    KeyCode::BackTab | KeyCode::Up => {
      app.form.prev_field();
    }
    KeyCode::Enter => {
      if app.form.focus + 1 < crate::app::AddForm::LABELS.len() {
        app.form.next_field();
      } else {
        app.trigger_add();
      }
    }
    code => {
      edit_field(app.form.focused_mut(), code);
    }
  }
}

fn handle_credential_key<S: Store>(app: &mut App<S>, key: event::KeyEvent) {
  match key.code {
    KeyCode::Esc => {
      app.credential_input.clear();
      app.mode = AppMode::Browse;
    }
    KeyCode::Enter => {
      app.submit_credential();
    }
    code => {
      edit_field(&mut app.credential_input, code);
    }
  }
}
