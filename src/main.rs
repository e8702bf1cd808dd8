use std::path::PathBuf;

use anyhow::{Context, Result};
use nanoedit::config;
use nanoedit::BatchJob;

const HELP: &str = "\
nanoedit: apply a JSON edit script to a PNG image

USAGE:
  nanoedit [--config <config.json>] <input.png> <script.json> <output.png>

FLAGS:
  -h, --help    Print this help
";

fn main() -> Result<()> {
    nanoedit::logging::init();

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let config_path: Option<PathBuf> = args
        .opt_value_from_str("--config")
        .context("invalid --config value")?;
    let input: PathBuf = args.free_from_str().context("missing <input.png>")?;
    let script: PathBuf = args.free_from_str().context("missing <script.json>")?;
    let output: PathBuf = args.free_from_str().context("missing <output.png>")?;
    let rest = args.finish();
    if !rest.is_empty() {
        tracing::warn!(?rest, "ignoring extra arguments");
    }

    let config = match config_path {
        Some(path) => config::load_app_config_from(&path),
        None => config::load_app_config(),
    };

    let job = BatchJob {
        input,
        script,
        output,
        config,
    };
    let report = nanoedit::run(&job)
        .with_context(|| format!("failed to edit {}", job.input.display()))?;
    println!(
        "{}: {} step(s) changed the image, {} had no effect",
        job.output.display(),
        report.changed,
        report.unchanged
    );
    Ok(())
}
