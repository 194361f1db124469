use crate::feed::column::ColumnType;
use crate::feed::reference::split_address;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::num::IntErrorKind;

/// Leading decimal number, optionally signed, with optional fraction and exponent.
static LEADING_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
        .expect("Hardcode regex pattern")
});

/// A single cell entry of a feed document, positioned by its A1 address.
#[derive(Clone, Debug, PartialEq)]
pub struct RawCell {
    /// Column letters (upper case)
    pub column: String,
    /// Row number (1-based, as in the source)
    pub row: usize,
    /// Raw cell text
    pub text: String,
}

impl RawCell {
    /// Builds a cell from an entry's address title and content text.
    /// Returns `None` if the address cannot be split into letters and a row number.
    pub fn new(address: &str, text: &str) -> Option<Self> {
        let (column, row) = split_address(address)?;
        Some(RawCell {
            column,
            row,
            text: text.to_owned(),
        })
    }

    /// Index of the data row this cell belongs to (source row 2 is data row 0).
    /// Returns `None` for header cells.
    pub fn data_index(&self) -> Option<usize> {
        self.row.checked_sub(2)
    }

    /// Converts the cell text to a typed value for the given column type.
    pub fn coerce(&self, kind: ColumnType) -> Value {
        coerce(&self.text, kind)
    }
}

/// Converts raw cell text to a typed value. Never fails: malformed input
/// degrades to `0`, `0.0` or `null` depending on the type.
pub fn coerce(text: &str, kind: ColumnType) -> Value {
    match kind {
        ColumnType::Integer => Value::from(to_integer(text)),
        ColumnType::Boolean => to_boolean(text).map(Value::Bool).unwrap_or(Value::Null),
        ColumnType::Float => Value::from(to_float(text)),
        ColumnType::Array => Value::from(split_list(text)),
        ColumnType::Json => serde_json::from_str(text).unwrap_or(Value::Null),
        ColumnType::String => Value::from(text),
    }
}

/// Parses the leading integer of the text, ignoring any trailing characters.
/// No leading digits yields 0; out of range values saturate.
fn to_integer(text: &str) -> i64 {
    let text = text.trim_start();
    let mut end = 0;
    for (index, char) in text.char_indices() {
        let is_sign = index == 0 && (char == '-' || char == '+');
        if !char.is_ascii_digit() && !is_sign {
            break;
        }
        end = index + char.len_utf8();
    }
    match text[..end].parse::<i64>() {
        Ok(value) => value,
        Err(error) => match error.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => 0,
        },
    }
}

/// Parses the leading decimal number of the text, 0.0 if there is none.
/// Out of range values saturate at the finite `f64` bounds.
fn to_float(text: &str) -> f64 {
    LEADING_FLOAT
        .find(text.trim_start())
        .and_then(|matcher| matcher.as_str().parse::<f64>().ok())
        .map(|value| value.clamp(f64::MIN, f64::MAX))
        .unwrap_or(0.0)
}

/// `true`/`false` in any case; anything else is not a boolean.
fn to_boolean(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Splits on commas, keeping `\,` as a literal comma, and trims every item.
fn split_list(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut item = String::new();
    let mut chars = text.chars().peekable();
    while let Some(char) = chars.next() {
        match char {
            '\\' if chars.peek() == Some(&',') => {
                item.push(',');
                chars.next();
            }
            ',' => items.push(std::mem::take(&mut item)),
            _ => item.push(char),
        }
    }
    items.push(item);
    items.into_iter().map(|item| item.trim().to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cell_from_address() {
        let cell = RawCell::new("B3", "x").unwrap();
        assert_eq!(cell.column, "B");
        assert_eq!(cell.row, 3);
        assert_eq!(cell.data_index(), Some(1));
        assert!(RawCell::new("bogus", "x").is_none());
    }

    #[test]
    fn header_cells_have_no_data_index() {
        assert_eq!(RawCell::new("A1", "Name").unwrap().data_index(), None);
        assert_eq!(RawCell::new("A0", "Name").unwrap().data_index(), None);
        assert_eq!(RawCell::new("A2", "Alice").unwrap().data_index(), Some(0));
    }

    #[test]
    fn integer_coercion() {
        assert_eq!(coerce("30", ColumnType::Integer), json!(30));
        assert_eq!(coerce(" -7", ColumnType::Integer), json!(-7));
        assert_eq!(coerce("12abc", ColumnType::Integer), json!(12));
        assert_eq!(coerce("1.9", ColumnType::Integer), json!(1));
        assert_eq!(coerce("abc", ColumnType::Integer), json!(0));
        assert_eq!(coerce("", ColumnType::Integer), json!(0));
        assert_eq!(coerce("-", ColumnType::Integer), json!(0));
        assert_eq!(coerce("99999999999999999999", ColumnType::Integer), json!(i64::MAX));
    }

    #[test]
    fn float_coercion() {
        assert_eq!(coerce("1.5", ColumnType::Float), json!(1.5));
        assert_eq!(coerce("-.25", ColumnType::Float), json!(-0.25));
        assert_eq!(coerce("2e3", ColumnType::Float), json!(2000.0));
        assert_eq!(coerce("3.5 kg", ColumnType::Float), json!(3.5));
        assert_eq!(coerce("n/a", ColumnType::Float), json!(0.0));
    }

    #[test]
    fn float_overflow_saturates() {
        assert_eq!(coerce("1e400", ColumnType::Float), json!(f64::MAX));
        assert_eq!(coerce("-1e400", ColumnType::Float), json!(f64::MIN));
        assert_eq!(coerce("1e-400", ColumnType::Float), json!(0.0));
    }

    #[test]
    fn boolean_coercion() {
        assert_eq!(coerce("true", ColumnType::Boolean), json!(true));
        assert_eq!(coerce("FALSE", ColumnType::Boolean), json!(false));
        assert_eq!(coerce("True ", ColumnType::Boolean), json!(true));
        assert_eq!(coerce("yes", ColumnType::Boolean), Value::Null);
        assert_eq!(coerce("0", ColumnType::Boolean), Value::Null);
    }

    #[test]
    fn array_coercion() {
        assert_eq!(coerce("a, b\\, c, d", ColumnType::Array), json!(["a", "b, c", "d"]));
        assert_eq!(coerce("a\\,b,c", ColumnType::Array), json!(["a,b", "c"]));
        assert_eq!(coerce("single", ColumnType::Array), json!(["single"]));
        assert_eq!(coerce("a\\b", ColumnType::Array), json!(["a\\b"]));
    }

    #[test]
    fn json_coercion() {
        assert_eq!(coerce(r#"{"a": [1, 2]}"#, ColumnType::Json), json!({"a": [1, 2]}));
        assert_eq!(coerce("42", ColumnType::Json), json!(42));
        assert_eq!(coerce("{broken", ColumnType::Json), Value::Null);
    }

    #[test]
    fn string_coercion_keeps_text() {
        assert_eq!(coerce("  spaced  ", ColumnType::String), json!("  spaced  "));
    }

    #[test]
    fn coercion_of_rendered_defaults_is_stable() {
        assert_eq!(coerce(&0.to_string(), ColumnType::Integer), json!(0));
        assert_eq!(coerce(&0.0f64.to_string(), ColumnType::Float), json!(0.0));
        assert_eq!(coerce(&true.to_string(), ColumnType::Boolean), json!(true));
    }
}
