use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulsetray::settings::DEFAULT_CONFIG_FILE;
use pulsetray::ui::{self, Theme};
use pulsetray::{
    events, export, App, ConfigError, FileSource, IndicatorRenderer, LogHost, LogNotifier,
    MeasurementSource, Monitor, OuraSource, Palette, Settings, TerminalTray,
};

/// Exit status for configuration errors.
const CONFIG_ERROR_EXIT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "pulsetray")]
#[command(about = "Heart-rate indicator that polls the Oura API and alerts above a threshold")]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Replay samples from a JSON file instead of polling the API
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Log status updates and alerts instead of drawing a terminal UI
    #[arg(long)]
    headless: bool,

    /// Run a single check, write the indicator to this JSON file and exit
    #[arg(short, long, conflicts_with = "headless")]
    export: Option<PathBuf>,

    /// Alert when the heart rate is above this many bpm
    #[arg(short, long)]
    threshold: Option<u32>,

    /// Seconds between checks
    #[arg(short, long)]
    interval: Option<u64>,

    /// Icon size in pixels (16 or 32)
    #[arg(long)]
    icon_size: Option<u32>,

    /// Outline the digits
    #[arg(long)]
    outline: bool,

    /// Show the sample's source in status text and alerts
    #[arg(long)]
    source_label: bool,

    /// Log file used while the terminal UI is running
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Flags that override file and environment settings.
    fn overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = Vec::new();
        if let Some(threshold) = self.threshold {
            overrides.push(("bpm_alert_threshold", threshold.to_string()));
        }
        if let Some(interval) = self.interval {
            overrides.push(("refresh_interval_secs", interval.to_string()));
        }
        if let Some(size) = self.icon_size {
            overrides.push(("icon_size", size.to_string()));
        }
        if self.outline {
            overrides.push(("outline", "true".to_string()));
        }
        if self.source_label {
            overrides.push(("include_source_label", "true".to_string()));
        }
        overrides
    }

    fn interactive(&self) -> bool {
        !self.headless && self.export.is_none()
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match Settings::load_with_overrides(&args.config, &args.overrides()) {
        Ok(settings) => settings,
        Err(err) => return config_error(&err),
    };

    let source = match build_source(&args, &settings) {
        Ok(source) => source,
        Err(err) => return config_error(&err),
    };

    match run(args, settings, source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "exiting");
            eprintln!("pulsetray: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn config_error(err: &ConfigError) -> ExitCode {
    eprintln!("pulsetray: {}", err);
    ExitCode::from(CONFIG_ERROR_EXIT)
}

fn build_source(args: &Args, settings: &Settings) -> Result<Box<dyn MeasurementSource>, ConfigError> {
    match args.file {
        Some(ref path) => Ok(Box::new(FileSource::new(path))),
        None => Ok(Box::new(OuraSource::new(settings.oura_client()?))),
    }
}

fn run(args: Args, settings: Settings, source: Box<dyn MeasurementSource>) -> Result<()> {
    let interactive = args.interactive();
    init_logging(interactive, args.log_file.as_deref())?;

    // Detect before raw mode so the query doesn't race the event loop
    let luma = terminal_light::luma().ok();
    let renderer = IndicatorRenderer::new(settings.render, Palette::from_luma(luma));

    let rt = tokio::runtime::Runtime::new()?;

    if let Some(ref export_path) = args.export {
        return rt.block_on(export_once(source, &settings, renderer, export_path));
    }

    if !interactive {
        return rt.block_on(run_headless(source, &settings, renderer));
    }

    let (tray, notifier, tray_rx) = TerminalTray::channel();
    let monitor = Monitor::new(
        source,
        settings.policy(),
        renderer,
        Box::new(tray),
        Box::new(notifier),
    )
    .with_watermark(settings.watermark());

    // The monitor task runs on the runtime while the TUI owns the main thread
    let handle = {
        let _guard = rt.enter();
        monitor.spawn(settings.refresh_interval)
    };
    let mut app = App::new(handle, tray_rx, Theme::from_luma(luma));

    let result = run_tui(&mut app);

    if let Some(handle) = app.take_monitor() {
        rt.block_on(handle.shutdown());
    }

    result
}

/// Log to stderr, or to a file while the terminal UI owns the screen.
fn init_logging(interactive: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pulsetray=info,pulsetray_adapters=info".into());

    if interactive {
        let path = log_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| std::env::temp_dir().join("pulsetray.log"));
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }

    Ok(())
}

/// Run one tick and write the resulting indicator.
async fn export_once(
    source: Box<dyn MeasurementSource>,
    settings: &Settings,
    renderer: IndicatorRenderer,
    export_path: &Path,
) -> Result<()> {
    let mut monitor = Monitor::new(
        source,
        settings.policy(),
        renderer,
        Box::new(LogHost::new()),
        Box::new(LogNotifier),
    )
    .with_watermark(settings.watermark());

    let outcome = monitor.tick().await;
    let indicator = monitor
        .current_indicator()
        .cloned()
        .context("no indicator installed")?;
    monitor.shutdown();

    export::export_to_file(export_path, &indicator, &outcome)?;
    println!("Exported indicator to: {}", export_path.display());
    Ok(())
}

/// Run until Ctrl-C, reporting through the log.
async fn run_headless(
    source: Box<dyn MeasurementSource>,
    settings: &Settings,
    renderer: IndicatorRenderer,
) -> Result<()> {
    let monitor = Monitor::new(
        source,
        settings.policy(),
        renderer,
        Box::new(LogHost::new()),
        Box::new(LogNotifier),
    )
    .with_watermark(settings.watermark());

    let handle = monitor.spawn(settings.refresh_interval);
    tokio::signal::ctrl_c().await?;
    info!("interrupted");
    handle.shutdown().await;
    Ok(())
}

/// Run the TUI until the user quits.
fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Short timeout so monitor updates show up promptly
        if let Some(event) = events::poll_event(Duration::from_millis(200))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}
