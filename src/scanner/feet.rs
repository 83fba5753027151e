//! Foot-separator insertion (spec.md §6 "Scan output", GLOSSARY "Foot").
//! A thin, data-driven reimplementation of `_gen_possible_feet`/
//! `find_feet` in the original `urdubiometer` package's
//! `scanner/default.py`, generalized to take each meter's `fp7pattern`
//! as ordinary configuration instead of hardcoding a particular meter
//! list.

use std::collections::HashMap;

use crate::config::MeterConfig;

/// Maps a bare scan string (no `/` separators) to the foot-annotated form
/// implied by some meter's `fp7pattern`, built once from a meters list.
#[derive(Debug, Clone, Default)]
pub struct FootPattern {
    scans_with_feet: HashMap<String, String>,
}

impl FootPattern {
    /// Build the lookup table from every meter carrying an `fp7pattern`.
    /// Meters without one simply contribute nothing (their scans are
    /// left unannotated by [`FootPattern::find_feet`]).
    pub fn from_meters(meters: &[MeterConfig]) -> Self {
        let mut possible: Vec<String> = Vec::new();

        for meter in meters {
            let Some(raw) = &meter.fp7pattern else {
                continue;
            };
            let pattern: String = raw.chars().filter(|c| *c != ' ').collect();

            if pattern.contains('*') {
                let tail = &pattern[2.min(pattern.len())..];
                possible.push(format!("={}", tail));
                possible.push(format!("={}_", tail));
                possible.push(format!("-{}_", tail));
            } else if let Some(loc) = pattern.find("//") {
                possible.push(pattern.clone());
                possible.push(format!("{}_", pattern));
                possible.push(format!("{}_{}", &pattern[..loc], &pattern[loc..]));
            } else {
                possible.push(pattern.clone());
                possible.push(format!("{}_", pattern));
            }
        }

        let scans_with_feet = possible
            .into_iter()
            .map(|with_feet| {
                let bare: String = with_feet.chars().filter(|c| *c != '/').collect();
                (bare, with_feet)
            })
            .collect();

        Self { scans_with_feet }
    }

    /// Insert `/` foot separators into `scan`, per spec.md §6. Returns
    /// `None` when no known foot pattern produces this exact bare scan.
    pub fn find_feet<'a>(&'a self, scan: &str) -> Option<&'a str> {
        self.scans_with_feet.get(scan).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meter(fp7: &str) -> MeterConfig {
        MeterConfig {
            id: "1".into(),
            name: "test".into(),
            regex_pattern: "==".into(),
            fp7pattern: Some(fp7.to_string()),
            notes: None,
            genre: None,
        }
    }

    #[test]
    fn plain_pattern_round_trips_with_and_without_trailing_short() {
        let feet = FootPattern::from_meters(&[meter("==/==")]);
        assert_eq!(feet.find_feet("====").unwrap(), "==/==");
        assert_eq!(feet.find_feet("====_").unwrap(), "==/==_");
    }

    #[test]
    fn unknown_scan_returns_none() {
        let feet = FootPattern::from_meters(&[meter("==/==")]);
        assert!(feet.find_feet("--").is_none());
    }

    #[test]
    fn meter_without_fp7pattern_contributes_nothing() {
        let meter = MeterConfig {
            id: "1".into(),
            name: "test".into(),
            regex_pattern: "==".into(),
            fp7pattern: None,
            notes: None,
            genre: None,
        };
        let feet = FootPattern::from_meters(&[meter]);
        assert!(feet.find_feet("==").is_none());
    }
}
