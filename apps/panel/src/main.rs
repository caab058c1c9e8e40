use std::{fs, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    devices::DeviceList, sequencer::INIT_PACING, HeadlessSurface, Panel, PanelState, ReqwestTransport, Sequencer,
};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;
mod settings;

use settings::load_settings;

/// How often `watch` checks for a status change to echo.
const STATUS_ECHO: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(name = "panel", about = "Control panel for the keyball gesture service")]
struct Cli {
    /// Service base url, e.g. http://localhost:8080
    #[arg(long)]
    server_url: Option<String>,
    /// Settings file; defaults to ./panel.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load everything, then follow the status until Ctrl-C.
    Watch,
    #[command(flatten)]
    Once(Action),
}

#[derive(Subcommand, Debug)]
enum Action {
    Start,
    Stop,
    Status,
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    Devices,
    /// Set preferred devices; an omitted slot is cleared.
    Prefer {
        #[arg(long, default_value = "")]
        keyboard: String,
        #[arg(long, default_value = "")]
        mouse: String,
    },
    Health,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Show,
    /// Replace the configuration with the JSON document in `file`.
    Update { file: PathBuf },
    Save {
        /// Empty lets the service pick its default location.
        #[arg(long, default_value = "")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = load_settings(cli.config.as_deref())?.with_server_url(cli.server_url)?;
    info!(server_url = %settings.server_url, "panel starting");

    let transport = ReqwestTransport::new(&settings.server_url)
        .with_context(|| format!("failed to build client for '{}'", settings.server_url))?;
    let surface = HeadlessSurface::new();
    let panel = Arc::new(Panel::new(
        Arc::new(transport),
        surface.registry(),
        settings.panel_options(),
    ));

    let action = match cli.command {
        Command::Watch => {
            let sequencer =
                Sequencer::with_timing(Arc::clone(&panel), INIT_PACING, settings.poll_interval());
            return watch(&sequencer, &surface).await;
        }
        Command::Once(action) => action,
    };

    let mut notices = panel.notifications().subscribe();
    let outcome = execute(&panel, action).await;
    panel.settled().await;
    render::drain_notifications(&mut notices);

    if outcome.is_ok() {
        print_summary(&panel.snapshot().await, &surface);
    }
    outcome
}

async fn execute(panel: &Panel, action: Action) -> Result<()> {
    match action {
        Action::Start => panel.start_service().await?,
        Action::Stop => panel.stop_service().await?,
        Action::Status => panel.refresh_status().await?,
        Action::Config { action } => match action {
            ConfigAction::Show => {
                panel.fetch_config().await?;
                println!("{}", panel.snapshot().await.config_text);
            }
            ConfigAction::Update { file } => {
                let text = fs::read_to_string(&file)
                    .with_context(|| format!("failed to read '{}'", file.display()))?;
                panel.update_config(&text).await?;
            }
            ConfigAction::Save { path } => {
                let saved = panel.save_config(&path).await?;
                println!("{saved}");
            }
        },
        Action::Devices => panel.fetch_devices().await?,
        Action::Prefer { keyboard, mouse } => panel.set_preferred(&keyboard, &mouse).await?,
        Action::Health => panel.check_health().await?,
    }
    Ok(())
}

fn print_summary(state: &PanelState, surface: &HeadlessSurface) {
    render::print_lines([render::status_line(state), render::health_line(state)]);
    if state.devices.list != DeviceList::NotLoaded {
        render::print_lines(render::device_lines(state));
    }
    render::print_lines(render::control_lines(surface));
}

async fn watch(sequencer: &Sequencer, surface: &HeadlessSurface) -> Result<()> {
    let panel = Arc::clone(sequencer.panel());
    let printer = tokio::spawn(render::follow_notifications(panel.notifications().subscribe()));

    let poll = sequencer.start().await;
    let mut last = panel.snapshot().await;
    print_summary(&last, surface);

    let mut ticker = interval_at(Instant::now() + STATUS_ECHO, STATUS_ECHO);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                break;
            }
            _ = ticker.tick() => {
                let state = panel.snapshot().await;
                if state.status != last.status {
                    println!("{}", render::status_line(&state));
                }
                last = state;
            }
        }
    }

    info!("panel stopping");
    poll.abort();
    printer.abort();
    Ok(())
}
