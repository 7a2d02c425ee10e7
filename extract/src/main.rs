use clap::Parser;
use std::process::exit;
use tracing::error;
use tracing_subscriber::EnvFilter;
use typedb_core::config::Config;
use typedb_extract::cli::{Args, Command, initialize};

fn main() {
    let args = Args::parse();
    let config = match initialize(&args) {
        Ok(Some(config)) => config,
        Ok(None) => return,
        Err(e) => {
            eprintln!("Error: {e}");
            exit(2);
        }
    };

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(&config.log_filter)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args, &config) {
        error!("Error: {e}");
        exit(1);
    }
}

fn run(args: &Args, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match &args.command {
        Some(Command::Extract { .. }) => {
            typedb_extract::run(config)?;
        }
        Some(Command::Dump { database }) => print!("{}", typedb_extract::dump(database)?),
        None => return Err("no command given; try `typedb extract <SNAPSHOT>`".into()),
    }
    Ok(())
}
