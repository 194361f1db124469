use once_cell::sync::Lazy;
use regex::Regex;

/// Cell address pattern: leading column letters followed by a 1-based row number.
static CELL_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Z]+)([0-9]+)$").expect("Hardcode regex pattern")
});

/// Splits an A1-style cell address into upper-case column letters and the
/// 1-based row number. Letters are matched case-insensitively.
///
/// Returns `None` if the address is not letters followed by digits, or the
/// row number does not fit in a `usize`.
pub(crate) fn split_address(address: &str) -> Option<(String, usize)> {
    let address = address.trim().to_ascii_uppercase();
    let captures = CELL_ADDRESS.captures(address.as_str())?;
    let letters = captures.get(1)?.as_str().to_owned();
    let row = captures.get(2)?.as_str().parse().ok()?;
    Some((letters, row))
}

/// Converts column letters to a 0-based column index:
/// A = 0, B = 1, ..., Z = 25, AA = 26, AB = 27, ...
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|char| char.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .chars()
        .map(|char| char as usize - 'A' as usize + 1)
        .try_fold(0usize, |index, digit| index.checked_mul(26)?.checked_add(digit))
        .map(|column| column - 1)
}
