//! Miss ratio table loading and filtering

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::InputError;

pub const CACHE_SIZE_COLUMN: &str = "cache_size";
pub const MISS_RATIO_COLUMN: &str = "miss_ratio";

pub fn get_log_2(value: u64) -> u32 {
    assert!(value > 0);
    63 - value.leading_zeros()
}

pub fn is_pow_2(value: u64) -> bool {
    value != 0 && value & (value - 1) == 0
}

/// A `cache_size` cell as read from the input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CacheSize {
    /// A non-negative integer, possibly written as `8.0`
    Integer(u64),
    /// A number that is negative or fractional
    NotInteger,
    /// Empty or not a number at all
    NotNumber,
}

impl CacheSize {
    pub fn parse(value: &str) -> Self {
        if let Ok(n) = value.parse::<u64>() {
            return CacheSize::Integer(n);
        }
        match value.parse::<f64>() {
            Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
                CacheSize::Integer(f as u64)
            }
            Ok(_) => CacheSize::NotInteger,
            Err(_) => CacheSize::NotNumber,
        }
    }

    /// Returns the size if it passes the power-of-two test
    pub fn pow_2(&self) -> Option<u64> {
        match *self {
            CacheSize::Integer(n) if is_pow_2(n) => Some(n),
            _ => None,
        }
    }
}

/// One row of the input table
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based line in the CSV file
    pub line: u64,
    pub cache_size: CacheSize,
    pub miss_ratio: f64,
}

/// A retained row, positioned on the log2 axis
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPoint {
    pub cache_size: u64,
    pub log_cache_size: f64,
    pub miss_ratio: f64,
}

fn column_index(
    headers: &StringRecord,
    name: &'static str,
    path: &Path,
) -> Result<usize, InputError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| InputError::MissingColumn(path.into(), name))
}

/// Read the table in file order
pub fn load_table(path: &Path) -> Result<Vec<Record>, InputError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| InputError::FileReadError(path.into(), e))?;

    let headers = reader
        .headers()
        .map_err(|e| InputError::ParseError(path.into(), e))?
        .clone();
    let size_index = column_index(&headers, CACHE_SIZE_COLUMN, path)?;
    let ratio_index = column_index(&headers, MISS_RATIO_COLUMN, path)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| InputError::ParseError(path.into(), e))?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let size_cell = row.get(size_index).unwrap_or_default();
        let cache_size = CacheSize::parse(size_cell);
        if cache_size == CacheSize::NotNumber {
            eprintln!(
                "Warning: {} line {}: cache_size '{}' is not a number, row skipped",
                path.display(),
                line,
                size_cell
            );
        }

        let ratio_cell = row.get(ratio_index).unwrap_or_default();
        let miss_ratio =
            ratio_cell
                .parse::<f64>()
                .map_err(|_| InputError::InvalidValue {
                    path: path.into(),
                    line,
                    column: MISS_RATIO_COLUMN,
                    value: ratio_cell.to_string(),
                })?;

        records.push(Record {
            line,
            cache_size,
            miss_ratio,
        });
    }

    Ok(records)
}

/// Keep the rows whose cache size is a nonzero power of two,
/// preserving input order
pub fn filter_pow_2(records: &[Record]) -> Vec<PlotPoint> {
    records
        .iter()
        .filter_map(|record| {
            record.cache_size.pow_2().map(|cache_size| PlotPoint {
                cache_size,
                log_cache_size: get_log_2(cache_size) as f64,
                miss_ratio: record.miss_ratio,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn record(cache_size: u64, miss_ratio: f64) -> Record {
        Record {
            line: 0,
            cache_size: CacheSize::Integer(cache_size),
            miss_ratio,
        }
    }

    #[test]
    fn test_is_pow_2() {
        assert_eq!(is_pow_2(0), false);
        assert_eq!(is_pow_2(1), true);
        assert_eq!(is_pow_2(3), false);
        assert_eq!(is_pow_2(1 << 40), true);
        assert_eq!(is_pow_2((1 << 40) + 1), false);
        assert_eq!(is_pow_2(u64::MAX), false);
    }

    #[test]
    fn test_get_log_2() {
        for k in 0..64 {
            let n = 1u64 << k;
            assert_eq!(get_log_2(n), k);
            assert!(((n as f64).log2() - get_log_2(n) as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn test_parse_cache_size() {
        assert_eq!(CacheSize::parse("16"), CacheSize::Integer(16));
        assert_eq!(CacheSize::parse("16.0"), CacheSize::Integer(16));
        assert_eq!(CacheSize::parse("0"), CacheSize::Integer(0));
        assert_eq!(CacheSize::parse("-4"), CacheSize::NotInteger);
        assert_eq!(CacheSize::parse("2.5"), CacheSize::NotInteger);
        assert_eq!(CacheSize::parse(""), CacheSize::NotNumber);
        assert_eq!(CacheSize::parse("big"), CacheSize::NotNumber);
    }

    #[test]
    fn test_filter_scenario() {
        let records = vec![
            record(1, 0.9),
            record(2, 0.5),
            record(3, 0.8),
            record(4, 0.2),
        ];
        let points = filter_pow_2(&records);

        let sizes: Vec<u64> = points.iter().map(|p| p.cache_size).collect();
        let logs: Vec<f64> = points.iter().map(|p| p.log_cache_size).collect();
        let ratios: Vec<f64> = points.iter().map(|p| p.miss_ratio).collect();
        assert_eq!(sizes, vec![1, 2, 4]);
        assert_eq!(logs, vec![0.0, 1.0, 2.0]);
        assert_eq!(ratios, vec![0.9, 0.5, 0.2]);
    }

    #[test]
    fn test_filter_keeps_input_order() {
        let records = vec![record(8, 0.1), record(0, 1.0), record(2, 0.6), record(8, 0.1)];
        let sizes: Vec<u64> =
            filter_pow_2(&records).iter().map(|p| p.cache_size).collect();
        assert_eq!(sizes, vec![8, 2, 8]);
    }

    #[test]
    fn test_filter_excludes_non_integers() {
        let records = vec![
            Record {
                line: 2,
                cache_size: CacheSize::NotInteger,
                miss_ratio: 0.5,
            },
            Record {
                line: 3,
                cache_size: CacheSize::NotNumber,
                miss_ratio: 0.5,
            },
        ];
        assert!(filter_pow_2(&records).is_empty());
    }

    #[test]
    fn test_load_table() {
        let file = write_csv(
            "label,miss_ratio,cache_size\n\
             a,0.9,1\n\
             b,0.8,3\n\
             c, 0.25 ,4.0\n\
             d,0.1,-8\n",
        );
        let records = load_table(file.path()).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[2].cache_size, CacheSize::Integer(4));
        assert_eq!(records[2].miss_ratio, 0.25);
        assert_eq!(records[3].cache_size, CacheSize::NotInteger);
    }

    #[test]
    fn test_load_table_missing_column() {
        let file = write_csv("size,miss_ratio\n1,0.5\n");
        match load_table(file.path()) {
            Err(InputError::MissingColumn(_, column)) => {
                assert_eq!(column, CACHE_SIZE_COLUMN)
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let file = write_csv("cache_size\n1\n");
        match load_table(file.path()) {
            Err(InputError::MissingColumn(_, column)) => {
                assert_eq!(column, MISS_RATIO_COLUMN)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_load_table_invalid_miss_ratio() {
        let file = write_csv("cache_size,miss_ratio\n1,0.5\n2,oops\n");
        match load_table(file.path()) {
            Err(InputError::InvalidValue { line, value, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "oops");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_load_table_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        assert!(matches!(
            load_table(&path),
            Err(InputError::FileReadError(..))
        ));
    }
}
