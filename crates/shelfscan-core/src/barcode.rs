//! Candidate identifier generation for scanned barcodes.
//!
//! Scanners report the same physical code in several shapes: UPC-A (12
//! digits) is often stored as EAN-13 with a leading zero, and some readers
//! drop the UPC check digit or the leading zero entirely. Every plausible
//! representation is tried against the store and the catalog, most likely
//! first.

/// Width that short codes are zero-padded to (UPC-A).
const UPC_A_LEN: usize = 12;

/// Removes every character that is not an ASCII digit.
#[must_use]
pub fn strip_non_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Expands a raw scanned string into the ordered list of identifiers to try.
///
/// Returns an empty list when the input contains no digits. The list never
/// contains duplicates and its order is the lookup priority:
///
/// | digits | candidates |
/// |--------|------------|
/// | 12 | `d`, `0d` |
/// | 13, leading `0` | `d[1..]`, `d` |
/// | 13, otherwise | `d` |
/// | 11 | `d`, `d` padded to 12 |
/// | 8 | `d` |
/// | other | `d`, `d` padded to 12 (when shorter), `0d` (when `d` has no leading zero) |
#[must_use]
pub fn candidate_identifiers(raw: &str) -> Vec<String> {
    let digits = strip_non_digits(raw);
    if digits.is_empty() {
        return Vec::new();
    }

    let mut candidates = Vec::with_capacity(3);
    match digits.len() {
        12 => {
            let prefixed = format!("0{digits}");
            push_unique(&mut candidates, digits);
            push_unique(&mut candidates, prefixed);
        }
        13 if digits.starts_with('0') => {
            push_unique(&mut candidates, digits[1..].to_owned());
            push_unique(&mut candidates, digits);
        }
        11 => {
            let padded = pad_to_upc_a(&digits);
            push_unique(&mut candidates, digits);
            push_unique(&mut candidates, padded);
        }
        8 | 13 => push_unique(&mut candidates, digits),
        len => {
            let padded = (len < UPC_A_LEN).then(|| pad_to_upc_a(&digits));
            let prefixed = (!digits.starts_with('0')).then(|| format!("0{digits}"));
            push_unique(&mut candidates, digits);
            if let Some(padded) = padded {
                push_unique(&mut candidates, padded);
            }
            if let Some(prefixed) = prefixed {
                push_unique(&mut candidates, prefixed);
            }
        }
    }
    candidates
}

fn pad_to_upc_a(digits: &str) -> String {
    format!("{digits:0>UPC_A_LEN$}")
}

fn push_unique(candidates: &mut Vec<String>, candidate: String) {
    if !candidates.contains(&candidate) {
        candidates.push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_non_digits_drops_separators_and_letters() {
        assert_eq!(strip_non_digits(" 0-12345 67890a5\n"), "012345678905");
        assert_eq!(strip_non_digits("abc"), "");
    }

    #[test]
    fn no_digits_yields_no_candidates() {
        assert!(candidate_identifiers("").is_empty());
        assert!(candidate_identifiers("QR:hello").is_empty());
    }

    #[test]
    fn upc_a_tries_itself_then_ean13_form() {
        assert_eq!(
            candidate_identifiers("012345678905"),
            vec!["012345678905", "0012345678905"]
        );
        assert_eq!(
            candidate_identifiers("123456789012"),
            vec!["123456789012", "0123456789012"]
        );
    }

    #[test]
    fn ean13_with_leading_zero_tries_upc_a_first() {
        assert_eq!(
            candidate_identifiers("0012345678905"),
            vec!["012345678905", "0012345678905"]
        );
    }

    #[test]
    fn ean13_without_leading_zero_is_tried_alone() {
        assert_eq!(candidate_identifiers("7891000315507"), vec!["7891000315507"]);
    }

    #[test]
    fn eleven_digits_are_padded_to_upc_a() {
        assert_eq!(
            candidate_identifiers("12345678905"),
            vec!["12345678905", "012345678905"]
        );
    }

    #[test]
    fn ean8_is_tried_alone() {
        assert_eq!(candidate_identifiers("9638-5074"), vec!["96385074"]);
    }

    #[test]
    fn short_codes_get_padded_and_prefixed_variants() {
        assert_eq!(
            candidate_identifiers("1234567890"),
            vec!["1234567890", "001234567890", "01234567890"]
        );
    }

    #[test]
    fn short_code_with_leading_zero_skips_prefixed_variant() {
        assert_eq!(
            candidate_identifiers("0123456"),
            vec!["0123456", "000000123456"]
        );
    }

    #[test]
    fn fourteen_digit_codes_keep_their_leading_zero() {
        assert_eq!(
            candidate_identifiers("07501234567892"),
            vec!["07501234567892"]
        );
        assert_eq!(
            candidate_identifiers("17501234567899"),
            vec!["17501234567899", "017501234567899"]
        );
    }

    #[test]
    fn candidates_are_never_duplicated() {
        for raw in [
            "1", "0", "00000000000", "000000000000", "0000000000000", "12345678", "999",
        ] {
            let candidates = candidate_identifiers(raw);
            let mut deduped = candidates.clone();
            deduped.sort();
            deduped.dedup();
            assert_eq!(
                deduped.len(),
                candidates.len(),
                "duplicate candidate for {raw}: {candidates:?}"
            );
        }
    }
}
