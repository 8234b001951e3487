mod compare;

use anyhow::Result;
use clap::Command;
use tracing_subscriber::EnvFilter;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "modsites";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Compare the transcript positions of two RNA modification site sets.")
        .subcommand_required(true)
        .subcommand(compare::cli::create_compare_cli())
}

fn main() -> Result<()> {
    // progress goes to stderr so the JSON report can go to stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // COMPARE
        //
        Some((compare::cli::COMPARE_CMD, matches)) => {
            compare::handlers::run_compare(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
