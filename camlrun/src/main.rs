//! camlrun: run a program through an external interpreter, or update this tool.

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use camlrun::clean::Cleaner;
use camlrun::cli::{Cli, Mode};
use camlrun::config::load_config;
use camlrun::exit_codes;
use camlrun::io::interpreter::ProcessInterpreter;
use camlrun::io::update::ShellUpdater;
use camlrun::logging;
use camlrun::report::{Failure, FailureKind, emit};
use camlrun::run::run_program;
use camlrun::update::update_self;

fn main() {
    let cli = Cli::parse();
    logging::init();
    if let Err(err) = run(&cli) {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
    std::process::exit(exit_codes::OK);
}

fn run(cli: &Cli) -> Result<()> {
    let mut cfg = load_config(&cli.config).context("load config")?;
    cfg.apply_env(|key| std::env::var(key).ok());
    let stdout = io::stdout();
    let mut console = stdout.lock();

    let ok = match cli.mode() {
        Mode::Run => {
            let request = cli
                .run_request()
                .context("an input file is required to run")?;
            let interpreter = ProcessInterpreter::from_config(&cfg.interpreter);
            let cleaner = Cleaner::from_config(&cfg.interpreter);
            run_program(&interpreter, &cleaner, &request, &mut console)
        }
        Mode::Update => match std::env::current_exe() {
            Ok(target) => {
                let updater = ShellUpdater::new(cfg.update);
                update_self(&updater, &target, cli.debug(), &mut console)
            }
            Err(err) => {
                let failure =
                    Failure::new(FailureKind::Replace, format!("locate executable: {err}"));
                emit(&mut console, &failure.render(cli.debug()));
                false
            }
        },
    };
    debug!(ok, "command finished");
    Ok(())
}
