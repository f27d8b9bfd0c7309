//! MediaDupe - Duplicate Media File Remover
//!
//! Entry point for the MediaDupe CLI application.

use clap::Parser;
use mediadupe::{cli::Cli, error::ExitCode, logging};

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logging before anything else can log
    logging::init_logging(cli.verbose, cli.quiet);

    // Run the application logic
    match mediadupe::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            eprintln!("[{}] Error: {:#}", ExitCode::GeneralError.code_prefix(), err);
            std::process::exit(ExitCode::GeneralError.as_i32());
        }
    }
}
