use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEvent,
    MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tui_choropleth::app::App;
use tui_choropleth::config::MapConfig;
use tui_choropleth::data::{self, DataPaths};
use tui_choropleth::map::ChoroplethMap;
use tui_choropleth::scene::svg::to_svg;
use tui_choropleth::ui;

#[derive(Parser)]
#[command(name = "tui-choropleth", version, about)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive map in the terminal
    View(ViewArgs),
    /// Write the map as an SVG document
    Export(ExportArgs),
}

#[derive(Args)]
struct DataArgs {
    /// Country geometry, GeoJSON or TopoJSON
    #[arg(long, default_value = "data/countries-110m_v2.json")]
    geo: PathBuf,
    /// CSV with `region` and `pop_density` columns
    #[arg(long, default_value = "data/region_population_density.csv")]
    density: PathBuf,
    /// CSV with `city`, `country`, `lat`, `lng`, `population`, `capital` columns
    #[arg(long, default_value = "data/worldcities_v2.csv")]
    cities: PathBuf,
    /// TOML map configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct ViewArgs {
    #[command(flatten)]
    data: DataArgs,
    /// Log file; the terminal is busy with the map
    #[arg(long, default_value = "tui-choropleth.log")]
    log: PathBuf,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    data: DataArgs,
    #[arg(short, long, default_value = "map.svg")]
    output: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let setup = match &cli.command {
        Command::View(args) => init_file_logging(&args.log, level),
        Command::Export(_) => init_stderr_logging(level),
    };
    if let Err(e) = setup {
        // no subscriber to report through
        eprintln!("tui-choropleth: {e:#}");
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Command::View(args) => view(args),
        Command::Export(args) => export(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Log to `path`; errors are copied to stderr, where they are only written
/// once the terminal has been restored.
fn init_file_logging(path: &Path, level: Level) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(LevelFilter::from_level(level)),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(LevelFilter::ERROR),
        )
        .try_init()
        .map_err(|e| anyhow!(e))
}

fn init_stderr_logging(level: Level) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!(e))
}

/// Load config and datasets, then build the map. Nothing is drawn on failure.
fn build_map(args: &DataArgs) -> Result<ChoroplethMap> {
    let config = match &args.config {
        Some(path) => MapConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MapConfig::new("map"),
    };
    let datasets = data::load_datasets(&DataPaths {
        geography: args.geo.clone(),
        density: args.density.clone(),
        cities: args.cities.clone(),
    })?;
    Ok(ChoroplethMap::new(config, datasets)?)
}

fn export(args: ExportArgs) -> Result<()> {
    let map = build_map(&args.data)?;
    let svg = to_svg(map.scene());
    fs::write(&args.output, svg).with_context(|| format!("writing {}", args.output.display()))?;
    info!(path = %args.output.display(), nodes = map.scene().node_count(), "exported SVG");
    Ok(())
}

fn view(args: ViewArgs) -> Result<()> {
    let map = build_map(&args.data)?;

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, map);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Hover tracking; every motion is a move, leaving handled by the app
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
            app.mouse_moved(mouse.column, mouse.row);
        }
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, map: ChoroplethMap) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(map, size.width, size.height);
    info!(cols = size.width, rows = size.height, "terminal view started");

    // Main loop
    loop {
        // Draw
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                            KeyCode::Char('r') => app.rerender(),
                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width, height);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
