use std::process::ExitCode;

use soulscript_cli::cli::app;

#[tokio::main]
async fn main() -> ExitCode {
    match app::run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
