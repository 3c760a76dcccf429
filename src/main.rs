//! freshcart command line storefront

use std::{
    io::{self, Write},
    process::ExitCode,
};

use clap::Parser;
use freshcart::observability;

mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();

    if let Err(error) = observability::init_subscriber(&cli.logging) {
        _ = writeln!(io::stderr(), "{error}");

        return ExitCode::FAILURE;
    }

    let mut out = io::stdout().lock();

    match cli.run(&mut out).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            _ = writeln!(io::stderr(), "{error}");

            ExitCode::FAILURE
        }
    }
}
