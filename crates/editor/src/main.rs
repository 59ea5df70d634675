use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use room_editor_lib::command::execute_json_batch;
use room_editor_lib::harness::EditorHarness;
use room_editor_lib::persistence::{FileStorage, LayoutStore};

struct Args {
    commands: Option<PathBuf>,
    store: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "room_editor=info,room_editor_lib=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();

    let storage = match args.store {
        Some(dir) => FileStorage::new(dir),
        None => match FileStorage::open_default() {
            Ok(storage) => storage,
            Err(e) => {
                tracing::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
    };
    tracing::info!("Layout storage at {}", storage.dir().display());

    let json = match read_commands(args.commands.as_ref()) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to read commands: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut harness = EditorHarness::with_store(LayoutStore::new(storage));
    let responses = match execute_json_batch(&mut harness, &json) {
        Ok(responses) => responses,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&responses) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            tracing::error!("Failed to serialize responses: {e}");
            return ExitCode::FAILURE;
        }
    }

    if responses.iter().all(|r| r.success) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        commands: None,
        store: None,
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--commands" if i + 1 < args.len() => {
                parsed.commands = Some(PathBuf::from(&args[i + 1]));
                i += 1;
            }
            "--store" if i + 1 < args.len() => {
                parsed.store = Some(PathBuf::from(&args[i + 1]));
                i += 1;
            }
            other => tracing::warn!("Ignoring argument {other}"),
        }
        i += 1;
    }
    parsed
}

/// Commands from a file, or stdin when no file is given
fn read_commands(path: Option<&PathBuf>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut json = String::new();
            std::io::stdin().read_to_string(&mut json)?;
            Ok(json)
        }
    }
}
