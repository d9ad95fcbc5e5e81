//! Numeric fields with unit suffixes
//!
//! Measurement tools print values such as `12.5Mbps` or `40ms`. The value is
//! the leading decimal literal; the unit is an alphabetic suffix that carries
//! no information for the converter and is dropped.

/// Parse the leading decimal literal of `field`, ignoring an alphabetic unit suffix.
///
/// Accepted: optional sign, digits with an optional fractional part (`3`, `3.`,
/// `.5`, `-0.25`), followed by zero or more ASCII letters. Surrounding
/// whitespace is ignored. Anything else is rejected with a reason string.
pub fn parse_unit_value(field: &str) -> Result<f64, String> {
    let field = field.trim();
    if field.is_empty() {
        return Err("empty field".to_string());
    }

    let bytes = field.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        let frac_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        digits += end - frac_start;
    }

    if digits == 0 {
        return Err(format!("no numeric value in {field:?}"));
    }

    let (number, suffix) = field.split_at(end);
    if !suffix.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(format!("unexpected characters {suffix:?} after value in {field:?}"));
    }

    number
        .parse::<f64>()
        .map_err(|e| format!("invalid number {number:?}: {e}"))
}
