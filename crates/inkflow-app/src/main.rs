//! Command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let Some(script) = args.next() else {
        eprintln!("{}", inkflow_app::AppError::Usage("inkflow <script.json> [config.json]".into()));
        return ExitCode::FAILURE;
    };
    let config = args.next();

    log::info!("Replaying {}", script.display());
    match inkflow_app::run(&script, config.as_deref()) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("inkflow: {}", e);
            ExitCode::FAILURE
        }
    }
}
