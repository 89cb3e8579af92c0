//! Regimen input shaping.
//!
//! A regimen records whether a dose is taken in the morning, afternoon and night, written as up to
//! three binary digits joined by hyphens (`1-0-1`). The normaliser runs on every edit of the field,
//! so partially typed values (`1`, `1-0`) are valid intermediate states.

use crate::constants::{REGIMEN_SEPARATOR, REGIMEN_SLOTS};

/// Normalises free-text regimen input.
///
/// Drops every character other than `0` and `1`, keeps at most the first three digits, and joins
/// them with hyphens. Idempotent: the output contains no stray digits and at most three slots.
///
/// ```
/// use rx_core::regimen::normalise_regimen;
///
/// assert_eq!(normalise_regimen("101"), "1-0-1");
/// assert_eq!(normalise_regimen("1a0b1c2"), "1-0-1");
/// assert_eq!(normalise_regimen("222"), "");
/// ```
pub fn normalise_regimen(input: &str) -> String {
    let mut out = String::with_capacity(REGIMEN_SLOTS * 2);
    for digit in input
        .chars()
        .filter(|c| matches!(c, '0' | '1'))
        .take(REGIMEN_SLOTS)
    {
        if !out.is_empty() {
            out.push(REGIMEN_SEPARATOR);
        }
        out.push(digit);
    }
    out
}

/// Returns true when `regimen` is a full `d-d-d` triplet of binary digits.
pub fn is_complete_regimen(regimen: &str) -> bool {
    let slots: Vec<&str> = regimen.split(REGIMEN_SEPARATOR).collect();
    slots.len() == REGIMEN_SLOTS && slots.iter().all(|s| *s == "0" || *s == "1")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_regimen_shape(s: &str) -> bool {
        if s.is_empty() {
            return true;
        }
        let slots: Vec<&str> = s.split('-').collect();
        slots.len() <= REGIMEN_SLOTS && slots.iter().all(|d| *d == "0" || *d == "1")
    }

    #[test]
    fn formats_partial_input() {
        assert_eq!(normalise_regimen("1"), "1");
        assert_eq!(normalise_regimen("11"), "1-1");
        assert_eq!(normalise_regimen("101"), "1-0-1");
    }

    #[test]
    fn strips_noise_and_truncates() {
        assert_eq!(normalise_regimen("1a0b1c2"), "1-0-1");
        // Digits are 1,1,0,1; the fourth is dropped.
        assert_eq!(normalise_regimen("1a1b0c1"), "1-1-0");
        assert_eq!(normalise_regimen("222"), "");
        assert_eq!(normalise_regimen(""), "");
        assert_eq!(normalise_regimen("1-0-1"), "1-0-1");
        assert_eq!(normalise_regimen("1-0-1-1"), "1-0-1");
    }

    #[test]
    fn ignores_unicode_and_other_digits() {
        assert_eq!(normalise_regimen("１0۱1 x 0"), "0-1-0");
        assert_eq!(normalise_regimen("morning 1, noon 0"), "1-0");
    }

    #[test]
    fn normalise_is_idempotent() {
        let inputs = [
            "",
            "1",
            "10",
            "0-0-0",
            "1a1b0c1",
            "9999",
            "--1--0--",
            "abc",
            "1 1 1 1 1",
            "0101010101",
            "١٠١",
        ];
        for input in inputs {
            let once = normalise_regimen(input);
            assert_eq!(normalise_regimen(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn output_always_matches_regimen_shape() {
        // Every string over a small alphabet up to length 5.
        let alphabet = ['0', '1', '2', '-', 'a'];
        let mut level = vec![String::new()];
        let mut inputs = level.clone();
        for _ in 0..5 {
            level = level
                .iter()
                .flat_map(|s| alphabet.iter().map(move |c| format!("{s}{c}")))
                .collect();
            inputs.extend(level.iter().cloned());
        }
        for input in &inputs {
            let out = normalise_regimen(input);
            assert!(has_regimen_shape(&out), "bad shape {out:?} for {input:?}");
        }
    }

    #[test]
    fn complete_regimen_requires_three_slots() {
        assert!(is_complete_regimen("1-0-1"));
        assert!(is_complete_regimen("0-0-0"));
        assert!(!is_complete_regimen("1-0"));
        assert!(!is_complete_regimen("1"));
        assert!(!is_complete_regimen(""));
        assert!(!is_complete_regimen("1-0-2"));
        assert!(!is_complete_regimen("101"));
    }
}
