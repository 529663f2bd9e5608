//! `exam-tracker` binary entry point.

use anyhow::{Context, Result};
use clap::Parser;
use exam_tracker_core::ExamStore;
use exam_tracker_server::cli::{self, Args, Command};
use exam_tracker_server::{server, telemetry};

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = args.resolve_settings()?;

    telemetry::init_logging(&settings.log_level, args.verbose);
    tracing::debug!(data_dir = %settings.data_dir.display(), backend = ?settings.slot_backend, "settings resolved");

    match &args.command {
        Command::Serve { addr } => {
            let addr = addr.unwrap_or(settings.listen_addr);
            let db = settings
                .open_database()
                .context("Failed to open the dashboard database")?;

            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime
                .block_on(server::serve(db, addr))
                .with_context(|| format!("Server on {} failed", addr))?;
        }
        command => {
            let slot = settings
                .open_slot()
                .context("Failed to open exam storage")?;
            let mut store = ExamStore::load(slot);

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            cli::run_exam_command(command, &mut store, &settings, &mut out)?;
        }
    }

    Ok(())
}
