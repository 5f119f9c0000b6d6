mod app;
mod cli;
mod config;
mod constants;
mod dashboard;
mod feed;
mod input;
mod logging;
mod models;
mod pipeline;
mod resolver;
mod store;
mod theme;
mod ui;
mod youtube;

use anyhow::{Context, Result};
use clap::Parser;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use app::App;
use config::Config;
use dashboard::Dashboard;
use store::FileStore;
use youtube::YouTubeApi;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub(crate) struct Args {
  /// Directory holding the JSON store (default: platform data dir)
  #[arg(long, global = true)]
  store_dir: Option<PathBuf>,

  /// Run a single command instead of the dashboard
  #[command(subcommand)]
  command: Option<cli::Command>,
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  logging::init_tracing();

  let config = Config::load();
  let store_dir = config.store_dir(args.store_dir);
  let store = FileStore::open(&store_dir)?;
  info!(store = %store.dir().display(), "tubehub starting");
  let api = YouTubeApi::new(config.api_base());
  let mut dashboard = Dashboard::new(store);

  if let Some(command) = args.command {
    let mut stdout = std::io::stdout().lock();
    return cli::run(command, &mut dashboard, &api, &mut stdout).await;
  }

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let mut app = App::new(dashboard, api, &config);
  let result = run(&mut terminal, &mut app);
  ratatui::restore();
  result
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
  loop {
    app.check_pending()?;
    app.expire_error();

    terminal.draw(|frame| ui::ui(frame, app)).context("Failed to draw frame")?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(app, key)?;
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }
  info!("tubehub exiting");
  Ok(())
}
