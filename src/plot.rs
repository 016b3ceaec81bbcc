use std::env;
use std::path::PathBuf;
use std::process;

use mrc_lib::error::{MrcError, MrcResult};
use mrc_lib::run_wrapper;

fn parse_args() -> MrcResult<(PathBuf, PathBuf)> {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [data_csv, output_plot] => {
            Ok((PathBuf::from(data_csv), PathBuf::from(output_plot)))
        }
        _ => Err(MrcError::UsageError(
            "plot-mrc <data_csv> <output_plot>".to_string(),
        )),
    }
}

fn main() {
    let result = parse_args()
        .and_then(|(data_csv, output_plot)| run_wrapper::run(&data_csv, &output_plot));

    match result {
        Ok(_) => {}
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
