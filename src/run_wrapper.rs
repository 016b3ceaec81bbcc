//! Entry points shared by the binaries

use std::path::Path;

use crate::chart::{self, ChartModel, ChartStyle, OutputFormat};
use crate::error::{MrcError, MrcResult};
use crate::opt;
use crate::table;
use crate::trace;

/// Load the miss ratio table and turn it into what gets drawn
pub fn load_chart_model(input_path: &Path) -> MrcResult<ChartModel> {
    let records = table::load_table(input_path)?;
    let points = table::filter_pow_2(&records);
    Ok(ChartModel::make(points))
}

/// Plot the OPT miss ratio curve in `input_path` to `output_path`
pub fn run(input_path: &Path, output_path: &Path) -> MrcResult<ChartModel> {
    // Reject the destination before touching the input
    OutputFormat::from_path(output_path)?;

    let model = load_chart_model(input_path)?;
    chart::render(&model, &ChartStyle::default(), output_path)?;

    println!("Plot saved to {}", output_path.display());
    Ok(model)
}

/// Simulate OPT over the trace and write its miss ratio curve as CSV
pub fn run_opt(
    trace_path: &Path,
    max_cache_size: usize,
    output_csv: &Path,
) -> MrcResult<()> {
    if max_cache_size == 0 {
        return Err(MrcError::ConfigError(
            "max cache size must be at least 1".to_string(),
        ));
    }

    let trace = trace::fetch_operations(trace_path)?;
    eprintln!(
        "[OPT] {} accesses, cache sizes 1..={}",
        trace.len(),
        max_cache_size
    );
    opt::generate_opt_miss_ratio_data(&trace, max_cache_size, output_csv)?;

    println!("Data generated and saved to {}", output_csv.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_chart_model_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.csv");
        fs::write(
            &input,
            "cache_size,miss_ratio\n1,0.9\n2,0.5\n3,0.8\n4,0.2\n",
        )
        .unwrap();

        let first = load_chart_model(&input).unwrap();
        let second = load_chart_model(&input).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.x_labels, vec!["1", "2", "4"]);
        assert_eq!(first.annotations, vec!["0.90", "0.50", "0.20"]);
    }

    #[test]
    fn test_load_chart_model_no_pow_2() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.csv");
        fs::write(&input, "cache_size,miss_ratio\n0,1.0\n3,0.8\n6,0.4\n").unwrap();

        let model = load_chart_model(&input).unwrap();
        assert!(model.points.is_empty());
        assert!(model.x_ticks.is_empty());
        assert!(model.annotations.is_empty());
    }

    #[test]
    fn test_run_missing_column_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.csv");
        let output = dir.path().join("plot.png");
        fs::write(&input, "size,miss_ratio\n1,0.9\n").unwrap();

        assert!(matches!(
            run(&input, &output),
            Err(MrcError::InputError(_))
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_run_unsupported_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.csv");
        let output = dir.path().join("plot.txt");
        fs::write(&input, "cache_size,miss_ratio\n1,0.9\n").unwrap();

        assert!(matches!(
            run(&input, &output),
            Err(MrcError::OutputError(_))
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_run_opt_rejects_zero() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("curve.csv");
        assert!(matches!(
            run_opt(&dir.path().join("trace"), 0, &output),
            Err(MrcError::ConfigError(_))
        ));
        assert!(!output.exists());
    }
}
