use std::io;
use std::process::ExitCode;

use h5verify::suite::{self, DEFAULT_FILE};

fn main() -> ExitCode {
    let stdout = io::stdout();
    match suite::run(DEFAULT_FILE, stdout.lock()) {
        Ok(summary) if summary.success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("unable to write report: {}", err);
            ExitCode::FAILURE
        }
    }
}
