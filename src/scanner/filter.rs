//! Default post-scan filter (spec.md §4.5 "Post-scan filter (default)"):
//! groups scans by `meter_key` and keeps only the lowest-cost scan in each
//! group, mirroring `filter_scans`/`_COST_OF` in the original
//! `urdubiometer` package's `scanner/default.py`.

use std::collections::HashMap;

use super::types::ScanResult;
use crate::automaton::UnitType;

fn cost_of_unit(unit: UnitType) -> u32 {
    match unit {
        UnitType::Short => 20,
        UnitType::Long => 10,
        UnitType::OptionalShort => 20,
    }
}

fn scan_cost(scan: &str) -> u32 {
    scan.chars()
        .filter_map(UnitType::from_symbol)
        .map(cost_of_unit)
        .sum()
}

/// Keep, for each `meter_key` with more than one candidate scan, only the
/// minimum-cost one. The lower per-symbol weight of `=` means heavy
/// (long) readings win ties.
pub fn default_post_scan_filter(scans: Vec<ScanResult>) -> Vec<ScanResult> {
    if scans.len() < 2 {
        return scans;
    }

    let mut by_meter: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, scan) in scans.iter().enumerate() {
        by_meter.entry(scan.meter_key).or_default().push(i);
    }

    let mut keep = vec![true; scans.len()];
    for indices in by_meter.values() {
        if indices.len() < 2 {
            continue;
        }
        let min_idx = *indices
            .iter()
            .min_by_key(|&&i| scan_cost(&scans[i].scan))
            .expect("non-empty group");
        for &i in indices {
            if i != min_idx {
                keep[i] = false;
            }
        }
    }

    scans
        .into_iter()
        .zip(keep)
        .filter_map(|(scan, keep)| keep.then_some(scan))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::types::Matches;

    fn result(meter_key: usize, scan: &str) -> ScanResult {
        ScanResult {
            scan: scan.to_string(),
            matches: Matches::Units(Vec::new()),
            meter_key,
        }
    }

    #[test]
    fn keeps_lowest_cost_scan_per_meter() {
        let scans = vec![result(0, "--=="), result(0, "==")];
        let filtered = default_post_scan_filter(scans);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].scan, "==");
    }

    #[test]
    fn leaves_distinct_meters_alone() {
        let scans = vec![result(0, "=="), result(1, "--")];
        let filtered = default_post_scan_filter(scans);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let scans = vec![result(0, "--=="), result(0, "=="), result(1, "--")];
        let once = default_post_scan_filter(scans);
        let twice = default_post_scan_filter(once.clone());
        assert_eq!(once, twice);
    }
}
