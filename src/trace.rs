//! Memory access trace loading

use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::error::TraceError;

pub const ADDRESS_COLUMN: &str = "address";

fn parse_hex(value: &str) -> Option<u64> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u64::from_str_radix(digits, 16).ok()
}

/// Addresses from a CSV trace with a hexadecimal `address` column
fn fetch_csv_operations(
    trace_path: &Path,
    content: &str,
) -> Result<Vec<u64>, TraceError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| TraceError::ParseError(trace_path.into(), e.to_string()))?;
    let address_index =
        headers.iter().position(|h| h == ADDRESS_COLUMN).ok_or_else(|| {
            TraceError::ParseError(
                trace_path.into(),
                format!("missing '{}' column", ADDRESS_COLUMN),
            )
        })?;

    let mut addresses = Vec::new();
    for result in reader.records() {
        let record = result
            .map_err(|e| TraceError::ParseError(trace_path.into(), e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let field = record.get(address_index).unwrap_or_default();
        let address = parse_hex(field).ok_or_else(|| {
            TraceError::ParseError(
                trace_path.into(),
                format!("line {}: invalid hexadecimal address '{}'", line, field),
            )
        })?;
        addresses.push(address);
    }

    Ok(addresses)
}

/// One `op address` access; `op` is `r` or `w`
fn parse_access(line: &str) -> Result<u64, String> {
    let mut fields = line.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some("r" | "w"), Some(address), None) => parse_hex(address)
            .ok_or_else(|| format!("invalid hexadecimal address '{}'", address)),
        (Some(op), Some(_), None) => {
            Err(format!("invalid operation '{}', expected 'r' or 'w'", op))
        }
        _ => Err("expected 'op address'".to_string()),
    }
}

/// Addresses from a plain trace, one access per non-empty line
fn fetch_line_operations(
    trace_path: &Path,
    content: &str,
) -> Result<Vec<u64>, TraceError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(line_num, line)| {
            parse_access(line).map_err(|msg| {
                TraceError::ParseError(
                    trace_path.into(),
                    format!("line {}: {}", line_num + 1, msg),
                )
            })
        })
        .collect()
}

/// Fetch the accessed addresses from the trace file, in order.
/// `.csv` traces are read by column, anything else line by line.
pub fn fetch_operations(trace_path: &Path) -> Result<Vec<u64>, TraceError> {
    let content = std::fs::read_to_string(trace_path)
        .map_err(|e| TraceError::FileReadError(trace_path.into(), e))?;

    let is_csv = trace_path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    let addresses = if is_csv {
        fetch_csv_operations(trace_path, &content)?
    } else {
        fetch_line_operations(trace_path, &content)?
    };

    if addresses.is_empty() {
        return Err(TraceError::EmptyTrace(trace_path.into()));
    }
    Ok(addresses)
}
