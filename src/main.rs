use std::process::ExitCode;

use bedrock::cli::{run, Args};
use bedrock::{log, LogSeverity::*};
use ::log::LevelFilter;
use clap::Parser;

fn main() -> ExitCode {
    if let Err(e) = bedrock_logger::init(LevelFilter::Info) {
        eprintln!("Failed to install logger: {}", e);
    }

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    log(
        format!("Reading block {} from {}", args.position(), args.world.display()),
        Info,
    );
    match run(&args) {
        Ok(block) => {
            print!("{}", block);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log(format!("Lookup failed: {}", e), Fatal);
            ExitCode::FAILURE
        }
    }
}
