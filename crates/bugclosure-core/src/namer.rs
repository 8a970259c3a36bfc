//! Rotation-safe log file names.
//!
//! Files are named `<base>_<yyyyMMdd>.txt` for the first file of a day and
//! `<base>_<yyyyMMdd>(N).txt` for every later one. The next name is one
//! past the highest sequence number already present, so a file that
//! exists is never reused. Once `u64::MAX` is taken the lowest free
//! number is used instead.

use std::collections::BTreeSet;

use chrono::NaiveDate;

const EXTENSION: &str = ".txt";

/// Compute the next file name for `base_name` on `date`.
///
/// Only names of the exact form `<base>_<date>.txt` (sequence 0) or
/// `<base>_<date>(N).txt` count; everything else in `existing` is ignored.
pub fn next_name<S: AsRef<str>>(base_name: &str, date: NaiveDate, existing: &[S]) -> String {
    let stem = format!("{}_{}", base_name, date.format("%Y%m%d"));

    let taken: BTreeSet<u64> = existing
        .iter()
        .filter_map(|name| sequence_number(&stem, name.as_ref()))
        .collect();

    let next = match taken.last() {
        None => 0,
        Some(&highest) => highest
            .checked_add(1)
            .unwrap_or_else(|| lowest_free(&taken)),
    };
    file_name(&stem, next)
}

/// Smallest sequence number not in `taken`. A finite set always leaves
/// one in `0..=taken.len()`.
fn lowest_free(taken: &BTreeSet<u64>) -> u64 {
    (0..)
        .zip(taken.iter())
        .find(|&(expected, &n)| expected != n)
        .map_or(taken.len() as u64, |(expected, _)| expected)
}

fn file_name(stem: &str, sequence: u64) -> String {
    match sequence {
        0 => format!("{stem}{EXTENSION}"),
        n => format!("{stem}({n}){EXTENSION}"),
    }
}

/// Same as [`next_name`] for the current local date.
pub fn next_name_today<S: AsRef<str>>(base_name: &str, existing: &[S]) -> String {
    next_name(base_name, chrono::Local::now().date_naive(), existing)
}

fn sequence_number(stem: &str, name: &str) -> Option<u64> {
    let rest = name.strip_prefix(stem)?.strip_suffix(EXTENSION)?;
    if rest.is_empty() {
        return Some(0);
    }
    let digits = rest.strip_prefix('(')?.strip_suffix(')')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
