//! Command execution
//!
//! Every engine operation is admitted through the in-process FIFO scheduler
//! first. Within one process that serializes engine access the way a
//! multi-user deployment would; separate processes coordinate only through
//! SQLite's own locking.

use crate::cli::{Command, SiteCommand};
use crate::config::Config;
use crate::error::{CliError, Result};
use fieldnote_dates::SystemClock;
use fieldnote_domain::Provenance;
use fieldnote_engine::{Engine, EngineConfig, EngineError, ExportFormat};
use fieldnote_scheduler::{AdmissionScheduler, SchedulerConfig};
use fieldnote_store::SqliteStore;
use std::fs;
use std::time::Duration;
use tracing::debug;

/// Execute one parsed command against the configured database.
pub async fn execute(command: Command, config: &Config) -> Result<()> {
    if let Some(parent) = config.database.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut store = SqliteStore::new(&config.database)?;

    // Directory maintenance bypasses the engine and the scheduler.
    if let Command::Site(args) = &command {
        return match &args.command {
            SiteCommand::Add { id, name } => {
                store.add_site(id, name)?;
                println!("📌 Site {} registered.", id.to_uppercase());
                Ok(())
            }
            SiteCommand::List => {
                for (id, name) in store.list_sites()? {
                    println!("{id}\t{name}");
                }
                Ok(())
            }
        };
    }

    let engine_config = EngineConfig {
        txt_dir: config.txt_dir.clone(),
        pdf_dir: config.pdf_dir.clone(),
        ..EngineConfig::default()
    };
    let engine = Engine::with_config(store, Box::new(SystemClock), engine_config);

    let scheduler = AdmissionScheduler::with_config(SchedulerConfig {
        poll_interval: Duration::from_secs(config.queue_poll_secs),
        timeout: Duration::from_secs(config.queue_timeout_secs),
    });
    let _slot = scheduler
        .enroll(&config.user_id)
        .wait(|position, total| {
            eprintln!("⏳ Waiting for the engine: position {position} of {total}...");
        })
        .await?;

    let outcome = match command {
        Command::Capture { text } => engine.capture(&text.join(" "), &config.user_id),
        Command::Show { text } => engine.show(&text.join(" "), &config.user_id),
        Command::Resolve { text } => engine.resolve(&text.join(" ")),
        Command::Recap { text } => engine.recap(&text.join(" "), &config.user_id),
        Command::Export { format } => {
            let format: ExportFormat = format
                .parse()
                .map_err(CliError::InvalidInput)?;
            engine
                .export(format, &config.user_id)
                .map(|path| format!("📄 Exported to {}", path.display()))
        }
        Command::Ingest { file, site, name } => {
            let text = fs::read_to_string(&file)?;
            let provenance = Provenance {
                file_path: file.display().to_string(),
                original_filename: file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                custom_name: name,
                file_type: file
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned()),
            };
            engine.ingest(&text, &site, Some(provenance), &config.user_id)
        }
        Command::ClearSession => {
            engine.clear_session(&config.user_id);
            Ok("📝 Session cleared.".to_string())
        }
        Command::Site(_) => unreachable!("handled above"),
    };

    match outcome {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        // Validation problems are user guidance, not failures.
        Err(EngineError::Validation(message)) => {
            debug!("validation rejection surfaced to the user");
            println!("{message}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
