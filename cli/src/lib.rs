use clap::Parser;
use cli::{Args, Command};
use command::{cases::cases, convert::convert, train::train};
use config::Config;
use shell::Shell;
use tracing_subscriber::EnvFilter;

mod cli;
mod command;
mod config;
mod shell;

pub fn run_cli() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.version > 0 {
        maat::print_version(args.version > 1);
        std::process::exit(0);
    }

    init_tracing(args.verbose);

    let mut shell = Shell::new();

    let Some(command) = args.command else {
        eprintln!("No command specified");
        std::process::exit(1);
    };

    let config = Config::load(args.config.as_deref())?;

    match command {
        Command::Convert(args) => convert(&mut shell, config, args)?,
        Command::Train(args) => train(&mut shell, config, args)?,
        Command::Cases(args) => cases(&mut shell, config, args)?,
    }

    Ok(())
}

/// `-v` overrides `RUST_LOG`; without it the environment decides and the
/// default is `warn`.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
