use std::io::{self, stdout, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{backend::CrosstermBackend, Terminal};

use datapipe::app::{self, LogicThread};
use datapipe::config::Config;
use datapipe::core::registry::default_tasks;
use datapipe::core::schema::default_schema;
use datapipe::headless;
use datapipe::pipeline::RunOutcome;
use datapipe::render::RenderState;
use datapipe::{dlog, ui, Result};

const FRAME_DURATION: Duration = Duration::from_micros(16_666); // 60fps

/// datapipe - terminal dashboard for a simulated data-ingestion pipeline
#[derive(Parser, Debug)]
#[command(name = "datapipe")]
#[command(version, about, long_about = None)]
#[command(
    after_help = "ENVIRONMENT:\n    DATAPIPE_DEBUG=1   Enable debug logging (alternative to --debug)\n    DATAPIPE_LOG       Log level: error, warn, info, debug, trace\n    API_KEY            Insights API key (name configurable)\n    WORLD_NEWS_API_KEY World News API key (name configurable)"
)]
pub struct Cli {
    /// Enable debug logging (writes to ~/.datapipe/datapipe.log)
    #[arg(short = 'd', long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Execute one pipeline run without the TUI and print a JSON summary
    Run {
        /// Skip the insights request after the run
        #[arg(long)]
        no_insights: bool,
    },

    /// Print the warehouse schema
    Schema,

    /// Print the registered pipeline tasks
    Tasks,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    datapipe::log::init_with_debug(cli.debug);

    match cli.command {
        Some(Command::Run { no_insights }) => return run_headless(!no_insights),
        Some(Command::Schema) => return print_schema(&mut stdout()),
        Some(Command::Tasks) => return print_tasks(&mut stdout()),
        None => {}
    }

    if cli.debug {
        dlog!("datapipe starting (debug mode enabled)");
    } else {
        dlog!("datapipe starting");
    }

    let config = Config::load()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let (state_tx, state_rx) = crossbeam_channel::bounded::<RenderState>(1);

    let shutdown_clone = shutdown.clone();
    let logic_handle = thread::spawn(move || LogicThread::run(config, state_tx, shutdown_clone));

    let mut terminal = setup_terminal()?;
    let result = render_loop(&mut terminal, state_rx, &shutdown);

    shutdown.store(true, Ordering::SeqCst);
    let logic_result = logic_handle.join();
    restore_terminal(&mut terminal)?;
    result?;

    match logic_result {
        Ok(inner) => inner,
        Err(_) => Err(datapipe::Error::TaskJoin("logic thread panicked".to_string())),
    }
}

/// One run, log lines on stdout, JSON report last. Exits 1 on a failed run.
fn run_headless(with_insights: bool) -> Result<()> {
    dlog!("Headless run (insights={})", with_insights);
    let config = Config::load()?;
    let runtime = tokio::runtime::Runtime::new()?;

    let report = runtime.block_on(async {
        let (model, services) = app::bootstrap(config)?;
        headless::run_once(&services, model.pipeline, with_insights, &mut stdout()).await
    })?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.summary.outcome == RunOutcome::Failed {
        std::process::exit(1);
    }
    Ok(())
}

fn print_schema(out: &mut impl Write) -> Result<()> {
    for table in default_schema() {
        writeln!(out, "{} ({})", table.name, table.kind.label())?;
        for column in &table.columns {
            let key = column.key.map(|k| k.label()).unwrap_or("");
            writeln!(out, "  {:<3}{:<16}{}", key, column.name, column.ty)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn print_tasks(out: &mut impl Write) -> Result<()> {
    for task in default_tasks() {
        let deps: Vec<&str> = task.dependencies.iter().map(|d| d.as_str()).collect();
        writeln!(
            out,
            "{:<20}{:<12}{:<32}{}",
            task.id.as_str(),
            task.category.label(),
            task.name,
            if deps.is_empty() {
                "-".to_string()
            } else {
                deps.join(", ")
            }
        )?;
    }
    Ok(())
}

fn render_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_rx: Receiver<RenderState>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut state = RenderState::default();
    let mut last_version: u64 = 0;
    let mut last_frame = Instant::now();
    let mut dirty = true;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match state_rx.try_recv() {
            Ok(s) => {
                dirty = dirty || s.version != last_version;
                state = s;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        if last_frame.elapsed() < FRAME_DURATION {
            thread::sleep(Duration::from_micros(500));
            continue;
        }
        last_frame = Instant::now();

        if dirty {
            terminal.draw(|f| ui::draw(f, &state))?;
            last_version = state.version;
            dirty = false;
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(disable_raw_mode()?)
}
