#![forbid(unsafe_code)]

//! gitdash binary entry point.

use std::process;

use gitdash::app::GitDashboard;
use gitdash::cli::Opts;
use gitdash::logging::{self, LogTarget};
use gitdash_outcome::OutcomeReporter;
use gitdash_runtime::replay::{self, ReplayConfig};
use gitdash_runtime::{ProgramConfig, RuntimeResult, program};

fn main() {
    let opts = Opts::parse();

    let target = LogTarget::choose(opts.log_file.as_deref(), opts.headless);
    if let Err(e) = logging::init(target, &opts.log_filter) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let reporter = OutcomeReporter::from_env();
    let dashboard = GitDashboard::new(opts.repo.clone());
    tracing::info!(repo = %opts.repo.display(), headless = opts.headless, "gitdash starting");

    let result = if opts.headless {
        run_headless(&opts, dashboard, reporter)
    } else {
        program::run(dashboard, ProgramConfig::default(), reporter).map(|()| true)
    };

    match result {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("gitdash: {}", replay::UNFINISHED_MESSAGE);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("gitdash: {e}");
            process::exit(1);
        }
    }
}

/// Replay the key script. `Ok(false)` when the script ends before quitting.
fn run_headless(
    opts: &Opts,
    dashboard: GitDashboard,
    mut reporter: OutcomeReporter,
) -> RuntimeResult<bool> {
    let keys = match opts
        .replay_script()
        .map_err(|e| gitdash_runtime::RuntimeError::Replay(format!("cannot read script: {e}")))
        .and_then(|script| replay::parse_script(&script))
    {
        Ok(keys) => keys,
        Err(e) => {
            if let Err(record_err) = reporter.record_failure(e.to_string()) {
                tracing::warn!(error = %record_err, "could not record failure");
            }
            return Err(e);
        }
    };
    let summary = replay::run_replay(dashboard, &keys, ReplayConfig::default(), reporter)?;
    Ok(summary.quit)
}
