use std::process::ExitCode;

use parkmaster_server::config::{Config, DEFAULT_CONFIG_PATH};
use parkmaster_server::{logger, server};

const USAGE: &str = "Usage: parkmaster-server [CONFIG_PATH] [--dump-config]";

struct Args {
    config_path: String,
    dump_config: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut config_path = None;
    let mut dump_config = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--dump-config" => dump_config = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with('-') => {
                return Err(format!("Unknown option '{flag}'\n{USAGE}"));
            }
            path if config_path.is_none() => config_path = Some(path.to_string()),
            extra => return Err(format!("Unexpected argument '{extra}'\n{USAGE}")),
        }
    }

    Ok(Args {
        config_path: config_path.unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string()),
        dump_config,
    })
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    let cfg = match Config::load_from(&args.config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("[ERROR] Invalid configuration: {e}");
            return ExitCode::from(2);
        }
    };

    if args.dump_config {
        return match cfg.to_toml() {
            Ok(rendered) => {
                print!("{rendered}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("[ERROR] Failed to render configuration: {e}");
                ExitCode::FAILURE
            }
        };
    }

    if let Err(e) = logger::init(&cfg) {
        eprintln!("[ERROR] Failed to open log files: {e}");
        return ExitCode::FAILURE;
    }

    // Build the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("Using {workers} worker threads"));
    }

    let runtime = match runtime_builder.build() {
        Ok(runtime) => runtime,
        Err(e) => {
            logger::log_error(&format!("Failed to start runtime: {e}"));
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(server::run(cfg)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}
