//! OPT (Belady) cache simulation
//!
//! On a miss with a full cache, the resident address whose next use lies
//! furthest in the future is evicted. Addresses that are never used again
//! count as infinitely far away.

use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{MrcResult, OutputError};

/// For each access, the index of the next access to the same address
pub fn forward_reuse(trace: &[u64]) -> Vec<Option<usize>> {
    let mut next_use = vec![None; trace.len()];
    let mut last_seen: HashMap<u64, usize> = HashMap::new();

    for (i, &address) in trace.iter().enumerate() {
        if let Some(prev) = last_seen.insert(address, i) {
            next_use[prev] = Some(i);
        }
    }
    next_use
}

/// Number of misses OPT takes on `trace` with room for `cache_size` addresses
pub fn opt_misses(trace: &[u64], cache_size: usize) -> usize {
    if cache_size == 0 {
        return trace.len();
    }

    let next_use = forward_reuse(trace);
    // address -> next use of the resident copy
    let mut resident: HashMap<u64, usize> = HashMap::with_capacity(cache_size);
    // Max-heap on next use; entries go stale once the address is
    // accessed again or evicted, and are skipped when popped
    let mut heap: BinaryHeap<(usize, u64)> = BinaryHeap::new();
    let mut misses = 0;

    for (i, &address) in trace.iter().enumerate() {
        let next = next_use[i].unwrap_or(usize::MAX);

        if let Entry::Occupied(mut entry) = resident.entry(address) {
            entry.insert(next);
            heap.push((next, address));
            continue;
        }

        misses += 1;
        if resident.len() == cache_size {
            while let Some((victim_next, victim)) = heap.pop() {
                if resident.get(&victim) == Some(&victim_next) {
                    resident.remove(&victim);
                    break;
                }
            }
        }
        resident.insert(address, next);
        heap.push((next, address));
    }

    misses
}

/// Fraction of `trace` that misses under OPT
pub fn opt_miss_ratio(trace: &[u64], cache_size: usize) -> f64 {
    if trace.is_empty() {
        return 0.0;
    }
    opt_misses(trace, cache_size) as f64 / trace.len() as f64
}

fn create_progress_bar(max_cache_size: usize) -> ProgressBar {
    let bar = ProgressBar::new(max_cache_size as u64);
    let style = ProgressStyle::with_template(
        "[OPT] [{elapsed_precise}] {bar:60.cyan/blue} {pos:>7}/{len:7} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("##-");
    bar.set_style(style);
    bar
}

/// Write the OPT miss ratio of every cache size in `1..=max_cache_size`
/// as a `cache_size,miss_ratio` table
pub fn generate_opt_miss_ratio_data(
    trace: &[u64],
    max_cache_size: usize,
    output_csv: &Path,
) -> MrcResult<()> {
    let csv_error = |e| OutputError::CsvWriteError(output_csv.into(), e);
    let mut writer = csv::Writer::from_path(output_csv).map_err(csv_error)?;

    writer
        .write_record(["cache_size", "miss_ratio"])
        .map_err(csv_error)?;

    let bar = create_progress_bar(max_cache_size);
    for cache_size in 1..=max_cache_size {
        let miss_ratio = opt_miss_ratio(trace, cache_size);
        writer
            .write_record([cache_size.to_string(), miss_ratio.to_string()])
            .map_err(csv_error)?;
        bar.inc(1);
    }
    bar.finish();

    writer
        .flush()
        .map_err(|e| OutputError::WriteError(output_csv.into(), e))?;
    Ok(())
}
