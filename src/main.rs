use std::io::stdout;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use ratatui::DefaultTerminal;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use tracing::{info, warn};

mod cli;
mod controller;
mod domain;
mod filter;
mod grid;
mod inputter;
mod lister;
mod loader;
mod logging;
mod model;
mod selector;
mod session;
mod table;
mod ui;

use cli::Args;
use controller::Controller;
use domain::{TVConfig, TVError};
use loader::LoadOutcome;
use model::{Model, Status};
use selector::{ConsolePrompter, ScriptedPrompter};
use session::Session;

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run() -> Result<(), TVError> {
    let args = Args::parse();
    logging::init(args.log_file.as_deref(), &args.log_level)?;
    let config = args.config();

    let dir = lister::resolve_dir(&args.dir);
    let extensions = lister::normalize_extensions(&args.extensions);
    println!("Scanning {} for {:?}...", dir.display(), extensions);
    let files = lister::list_files(&dir, &extensions);

    let selected = match &args.select {
        Some(answer) => selector::select(&files, &mut ScriptedPrompter::new([answer.as_str()]))?,
        None => selector::select(&files, &mut ConsolePrompter)?,
    };
    if selected.is_empty() {
        println!("No files selected. Exiting.");
        return Ok(());
    }

    println!("\nProcessing files...");
    let sessions = open_sessions(&dir, &selected, &config);
    if sessions.is_empty() {
        println!("\nNo valid files could be loaded.");
        return Ok(());
    }
    println!("\n{} sessions open.", sessions.len());

    run_tui(sessions, &config)
}

/// Loads the files one after the other; failures are reported and skipped.
fn open_sessions(dir: &Path, selected: &[String], config: &TVConfig) -> Vec<Session> {
    let mut sessions = Vec::new();
    for filename in selected {
        println!("   Reading {filename}...");
        match loader::load(&dir.join(filename), config) {
            LoadOutcome::Loaded { table, description } => {
                println!("     -> {description}");
                sessions.push(Session::new(filename.as_str(), description, table));
            }
            LoadOutcome::Failed { error } => {
                println!("     -> Error: Failed to parse. Last error: {error}");
                println!("     -> Skipping {filename} due to errors.");
                warn!("Skipped {filename}");
            }
        }
    }
    sessions
}

fn run_tui(sessions: Vec<Session>, config: &TVConfig) -> Result<(), TVError> {
    let mut terminal = ratatui::init();
    let result = execute!(stdout(), EnableMouseCapture)
        .map_err(TVError::from)
        .and_then(|_| event_loop(&mut terminal, sessions, config));
    if let Err(e) = execute!(stdout(), DisableMouseCapture) {
        warn!("Could not disable mouse capture: {e}");
    }
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    sessions: Vec<Session>,
    config: &TVConfig,
) -> Result<(), TVError> {
    let size = terminal.size()?;
    let mut model = Model::init(config, sessions, size.width as usize, size.height as usize)?;
    let controller = Controller::new(config);
    info!("Showing {} sessions", model.sessions().len());

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui::draw(&model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }

    Ok(())
}
