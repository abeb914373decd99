//! SOS Terminal UI
//!
//! One screen: the saved number, a big SOS button, a number field and a
//! Save button.

mod app;
mod events;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use events::EventHandler;
use ratatui::prelude::*;
use sos_adapters::SEND_GRACE;
use sos_config::SosConfig;
use sos_dispatch::{DispatchSettings, SosSession};
use std::fs::OpenOptions;
use std::io::stdout;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = SosConfig::load().context("loading configuration")?;
    init_logging(&config)?;

    let capabilities =
        sos_adapters::build_capabilities(&config).context("setting up capabilities")?;
    let (session, session_events) =
        SosSession::new(capabilities, DispatchSettings::from_config(&config));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let shutdown = session.clone();
    let mut app = App::new(session, session_events);
    let event_handler = EventHandler::new(100);

    let result = run_app(&mut terminal, &mut app, event_handler).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Application error: {}", e);
    }

    let pending = shutdown.pending_sms();
    if pending > 0 {
        println!("Waiting for {} SMS send(s) to finish...", pending);
        if !shutdown.flush_sms(SEND_GRACE).await {
            eprintln!("SMS transport still busy; the send was abandoned.");
        }
    }

    Ok(())
}

/// Logs go to a file; stderr would draw over the alternate screen.
fn init_logging(config: &SosConfig) -> Result<()> {
    let path = config.log_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();
    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut event_handler: EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        match event_handler.next().await? {
            events::Event::Tick => app.on_tick(),
            events::Event::Key(key) => {
                if app.handle_key(key) {
                    return Ok(());
                }
            }
            // Redrawn at the top of the loop
            events::Event::Resize(_, _) => {}
        }
    }
}
