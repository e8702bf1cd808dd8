pub mod clipboard;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod history;
pub mod logging;
pub mod raster;
pub mod script;
pub mod selection;
pub mod session;
pub mod storage;
pub mod surface;
pub mod tools;
pub mod viewport;

use std::path::PathBuf;

pub use config::AppConfig;
pub use editor::{EditOutcome, ImageEditor};
pub use error::{AppError, AppResult};
pub use script::{EditScript, ScriptReport};
pub use session::EditorSession;

/// One headless edit: open `input`, apply the script, write `output`.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub input: PathBuf,
    pub script: PathBuf,
    pub output: PathBuf,
    pub config: AppConfig,
}

/// Entrypoint used by the CLI binary.
pub fn run(job: &BatchJob) -> AppResult<ScriptReport> {
    tracing::info!(input = %job.input.display(), "starting nanoedit");

    let script = EditScript::from_path(&job.script)?;
    let mut session = EditorSession::from_config(&job.config)?;
    session.open_path(&job.input)?;
    let report = script.apply(&mut session)?;
    session.save_to_path(&job.output)?;

    tracing::info!(
        changed = report.changed,
        unchanged = report.unchanged,
        output = %job.output.display(),
        "edit script applied"
    );
    Ok(report)
}
