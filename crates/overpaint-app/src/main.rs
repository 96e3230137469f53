//! Overpaint entry point: replays a session file.

use overpaint_app::{AppConfig, AppError, AppResult, run_session};
use std::path::Path;
use std::process::ExitCode;

const USAGE: &str = "overpaint <session.json> [config.json]";

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting Overpaint");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("overpaint: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> AppResult<()> {
    let mut args = std::env::args().skip(1);
    let session_path = args.next().ok_or_else(|| AppError::Usage(USAGE.to_string()))?;
    let config = match args.next() {
        Some(path) => AppConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => AppConfig::default(),
    };

    let session_path = Path::new(&session_path);
    let json = std::fs::read_to_string(session_path)?;
    let base_dir = session_path.parent().unwrap_or_else(|| Path::new("."));
    let exported = run_session(&json, config, base_dir)?;
    for path in &exported {
        println!("{}", path.display());
    }
    Ok(())
}
