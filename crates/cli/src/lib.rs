//! Command-line front end for discogen.
//!
//! `discogen generate` lists the discovery directory (or reads local
//! documents), fetches each selected API's document through an on-disk
//! cache, generates a client crate per API in parallel and optionally
//! builds them.

#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

use clap::{CommandFactory, Parser, Subcommand};

mod compile;
mod directory;
mod fetch;
pub mod generate;
mod logging;
mod output;

pub use fetch::{CACHE_DIR_ENV, Fetcher, cache_file_name};
pub use logging::init_tracing;
pub use output::{WriteResult, crate_manifest, write_file_if_changed};

#[derive(Parser)]
#[command(
    name = "discogen",
    version,
    about = "Generate typed Rust clients from API discovery documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate client crates
    Generate(generate::GenerateArgs),
}

/// Parse `args` (including the program name) and run the command.
/// Returns the process exit code.
pub fn run(args: Vec<String>) -> i32 {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Failed to create tokio runtime: {err}");
            return 1;
        }
    };

    runtime.block_on(run_async(args))
}

async fn run_async(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Generate(args)) => generate::run(args).await,
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

pub(crate) async fn run_cli_async<F, Fut>(f: F) -> i32
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), String>>,
{
    match f().await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}
