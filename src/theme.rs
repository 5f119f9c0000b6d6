use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub favorite: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub static THEMES: [Theme; 3] = [
  Theme {
    name: "Night",
    bg: Color::Rgb(24, 24, 32),
    fg: Color::Rgb(220, 220, 230),
    accent: Color::Rgb(255, 85, 85),
    muted: Color::Rgb(120, 120, 140),
    border: Color::Rgb(60, 60, 80),
    highlight_fg: Color::Rgb(255, 255, 255),
    highlight_bg: Color::Rgb(70, 40, 50),
    stripe_bg: Color::Rgb(30, 30, 40),
    status: Color::Rgb(130, 200, 255),
    error: Color::Rgb(255, 120, 90),
    favorite: Color::Rgb(255, 200, 60),
    key_fg: Color::Rgb(24, 24, 32),
    key_bg: Color::Rgb(160, 160, 180),
  },
  Theme {
    name: "Paper",
    bg: Color::Rgb(250, 248, 240),
    fg: Color::Rgb(40, 40, 40),
    accent: Color::Rgb(200, 30, 30),
    muted: Color::Rgb(130, 125, 115),
    border: Color::Rgb(200, 195, 180),
    highlight_fg: Color::Rgb(20, 20, 20),
    highlight_bg: Color::Rgb(240, 220, 200),
    stripe_bg: Color::Rgb(242, 239, 228),
    status: Color::Rgb(30, 100, 170),
    error: Color::Rgb(190, 50, 20),
    favorite: Color::Rgb(190, 130, 0),
    key_fg: Color::Rgb(250, 248, 240),
    key_bg: Color::Rgb(90, 85, 80),
  },
  Theme {
    name: "Terminal",
    bg: Color::Reset,
    fg: Color::Reset,
    accent: Color::Red,
    muted: Color::DarkGray,
    border: Color::DarkGray,
    highlight_fg: Color::Black,
    highlight_bg: Color::Red,
    stripe_bg: Color::Reset,
    status: Color::Cyan,
    error: Color::LightRed,
    favorite: Color::Yellow,
    key_fg: Color::Black,
    key_bg: Color::Gray,
  },
];

pub fn theme_index(name: &str) -> usize {
  THEMES.iter().position(|t| t.name.eq_ignore_ascii_case(name)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn theme_lookup_is_case_insensitive() {
    assert_eq!(theme_index("paper"), 1);
    assert_eq!(theme_index("TERMINAL"), 2);
  }

  #[test]
  fn unknown_theme_defaults_to_first() {
    assert_eq!(theme_index("neon"), 0);
  }
}
