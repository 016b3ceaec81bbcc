use std::path::PathBuf;
use std::process;

use mrc_lib::error::{MrcError, MrcResult};
use mrc_lib::run_wrapper::{run, run_opt};

const USAGE: &str = "opt-mrc <trace> <max_cache_size> <output_csv> [output_plot]";

fn main() {
    match run_eval() {
        Ok(()) => {}
        Err(e @ MrcError::UsageError(_)) => {
            println!("{}", e);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_eval() -> MrcResult<()> {
    let param_tokens: Vec<String> = std::env::args().skip(1).collect();
    if param_tokens.len() != 3 && param_tokens.len() != 4 {
        return Err(MrcError::UsageError(USAGE.to_string()));
    }

    let trace_path = PathBuf::from(&param_tokens[0]);
    let max_cache_size: usize = param_tokens[1].parse().map_err(|_| {
        MrcError::ConfigError(format!(
            "Invalid max cache size '{}': expected a positive integer",
            param_tokens[1]
        ))
    })?;
    let data_csv = PathBuf::from(&param_tokens[2]);

    run_opt(&trace_path, max_cache_size, &data_csv)?;

    // Plot the curve right away when asked to
    if let Some(output_plot) = param_tokens.get(3) {
        run(&data_csv, &PathBuf::from(output_plot))?;
    }

    Ok(())
}
