mod cli;
mod config;
mod observability;

use clap::Parser;

use cli::Cli;
use watchboot_env::{ensure_environment, runner, EnvError, EnvOptions, ValidityPolicy};

fn main() {
    let cli = Cli::parse();
    observability::init_tracing(cli.quiet);

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let code = err.exit_code();
            // Sub-steps stream their own stderr and exit code; only
            // bootstrapper-internal failures need a message here.
            if !err.child_reported() {
                eprintln!("watchboot: {:#}", anyhow::Error::new(err));
            }
            std::process::exit(code);
        }
    }
}

/// ensure → resolve → run; the returned code is the watcher's exit status.
fn run(cli: &Cli) -> Result<i32, EnvError> {
    let opts = EnvOptions {
        venv_dir: cli.venv_dir.clone(),
        requirements: cli.requirements.clone(),
        policy: if cli.verify {
            ValidityPolicy::AlwaysVerify
        } else {
            ValidityPolicy::TrustExisting
        },
    };
    let env = ensure_environment(&opts)?;
    tracing::debug!(python = %env.python.display(), "environment resolved");
    runner::run_watcher(&env, &cli.watcher, &cli.args)
}
