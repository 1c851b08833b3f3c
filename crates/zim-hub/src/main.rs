mod app;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor::SetCursorStyle,
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use zim_core::{db, editor::EditorView, logging, mode::CursorShape, settings};

use app::App;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "zim", version, about = "A modal text editor with space-travel navigation")]
struct Args {
    /// Files to open, one tab each. Missing files start empty.
    files: Vec<PathBuf>,

    /// Log filter directive, e.g. `debug` or `zim_core::space_travel=trace`.
    /// `ZIM_LOG` takes precedence.
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,

    /// Don't read or write saved settings.
    #[arg(long = "no-db")]
    no_db: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let data_dir = db::data_dir()?;
    let _log_guard = logging::init(&data_dir, &args.log_level)?;
    tracing::info!(files = args.files.len(), no_db = args.no_db, "starting zim");

    let conn = if args.no_db {
        db::open_memory_db()?
    } else {
        db::open_db()?
    };
    let settings = settings::load(&conn).context("Failed to load settings")?;

    let views = args
        .files
        .iter()
        .map(|path| EditorView::open(path))
        .collect::<Result<Vec<_>>>()?;

    let mut app = App::new(views, settings, conn);

    install_panic_hook();

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main event loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        SetCursorStyle::DefaultUserShape
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!("event loop failed: {err:#}");
        eprintln!("Error: {err:?}");
    }

    tracing::info!("exiting zim");
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    const POLL_RATE: Duration = Duration::from_millis(50);
    let mut shown_shape = None;

    loop {
        terminal.draw(|frame| {
            app.render(frame);
        })?;

        let shape = app.cursor_shape();
        if shown_shape != Some(shape) {
            let style = match shape {
                CursorShape::Block => SetCursorStyle::SteadyBlock,
                CursorShape::Line => SetCursorStyle::SteadyBar,
            };
            execute!(terminal.backend_mut(), style)?;
            shown_shape = Some(shape);
        }

        if app.should_quit {
            return Ok(());
        }

        if event::poll(POLL_RATE)? {
            let ev = event::read()?;
            app.handle_event(ev);
        }
    }
}

/// Leave the alternate screen before the default hook prints the panic.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, SetCursorStyle::DefaultUserShape);
        tracing::error!("panic: {info}");
        default_hook(info);
    }));
}
