use std::{env, process::ExitCode};

use duck_engine::{DuckingConfig, DuckingPipeline, logger::init_logger};
use log::{error, info};

fn main() -> ExitCode {
    init_logger();

    match run(env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: Option<String>) -> duck_engine::Result<()> {
    let config = match config_path {
        Some(path) => DuckingConfig::from_json_file(path)?,
        None => {
            info!("no configuration file given, using defaults");
            DuckingConfig::default()
        }
    };

    let report = DuckingPipeline::new(config)?.run()?;
    info!("[{}] done: {}", report.run_id, report.summary());
    Ok(())
}
