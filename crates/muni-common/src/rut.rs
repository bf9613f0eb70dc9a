//! Chilean RUT (national identification number) helpers.
//!
//! A RUT is a body of digits followed by a modulo-11 check digit, which may
//! be `K`. Users type it in many shapes (`12345678-5`, `12.345.678-5`,
//! `123456785`); the login form normalizes it before sending.

/// Keep only digits and `K`, upper-cased.
pub fn normalize_rut(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'k' || *c == 'K')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Format a RUT the way the login form displays it while typing.
///
/// Up to 8 cleaned characters render as `body-dv`; longer inputs also get
/// thousands separators (`12.345.678-5`).
pub fn format_rut(input: &str) -> String {
    let cleaned = normalize_rut(input);
    if cleaned.len() <= 1 {
        return cleaned;
    }
    let (body, dv) = cleaned.split_at(cleaned.len() - 1);
    if cleaned.len() <= 8 {
        return format!("{}-{}", body, dv);
    }
    format!("{}-{}", group_thousands(body), dv)
}

fn group_thousands(body: &str) -> String {
    let len = body.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in body.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Compute the check digit for a RUT body made of ASCII digits.
pub fn check_digit(body: &str) -> Option<char> {
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let sum: u32 = body
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .zip([2u32, 3, 4, 5, 6, 7].iter().cycle())
        .map(|(d, w)| d * w)
        .sum();
    match 11 - (sum % 11) {
        11 => Some('0'),
        10 => Some('K'),
        d => char::from_digit(d, 10),
    }
}

/// True when the input (in any accepted shape) carries a correct check digit.
pub fn is_valid_rut(input: &str) -> bool {
    let cleaned = normalize_rut(input);
    if cleaned.len() < 2 {
        return false;
    }
    let (body, dv) = cleaned.split_at(cleaned.len() - 1);
    if body.contains('K') {
        return false;
    }
    check_digit(body).is_some_and(|expected| dv.starts_with(expected))
}
