//! vxshader
//!
//! Splits annotated shader files into vertex and fragment sources.

use std::io;

use anyhow::{Context, Result};
use vx_config::Config;
use vxshader::{Args, Command};

fn main() -> Result<()> {
    let args = Args::parse_from(std::env::args().skip(1))?;

    let config = match args.command {
        Command::Split(_) => {
            let cwd = std::env::current_dir().context("cannot read working directory")?;
            Config::discover(args.config.as_deref(), &cwd)?
        }
        _ => Config::default(),
    };

    let level = config.log.level_filter();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .init();

    let mut stdout = io::stdout().lock();
    if let Some(emitted) = vxshader::run(&args, &config, &mut stdout)? {
        log::debug!(
            "{} diagnostic(s), {} file(s) written",
            emitted.diagnostics.len(),
            emitted.written.len()
        );
    }
    Ok(())
}
