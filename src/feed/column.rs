use once_cell::sync::Lazy;
use regex::Regex;

/// Header title pattern `<name>:<type>`. The name is greedy so the last
/// delimiter followed by a recognized type token wins.
static TYPED_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(.+):(?i:(int|integer|bool|boolean|float|double|real|array|json|string))$")
        .expect("Hardcode regex pattern")
});

/// Declared column types for spreadsheet feed data.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ColumnType {
    /// 64-bit signed integers
    Integer,
    /// Boolean values (true/false), anything else is null
    Boolean,
    /// Double-precision floating point numbers
    Float,
    /// Comma separated list of strings
    Array,
    /// Embedded JSON document
    Json,
    /// Raw cell text
    #[default]
    String,
}

impl ColumnType {
    /// Parses a column type from its tag.
    /// Supports the aliases `int`/`integer`, `bool`/`boolean`,
    /// `float`/`double`/`real`, `array`, `json` and `string` (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "INT" | "INTEGER" => Some(Self::Integer),
            "BOOL" | "BOOLEAN" => Some(Self::Boolean),
            "FLOAT" | "DOUBLE" | "REAL" => Some(Self::Float),
            "ARRAY" => Some(Self::Array),
            "JSON" => Some(Self::Json),
            "STRING" => Some(Self::String),
            _ => None,
        }
    }
}

/// A column declared by a header row cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// Spreadsheet column letters (upper case)
    pub letter: String,
    /// Field name used in output rows
    pub name: String,
    /// Declared column type
    pub kind: ColumnType,
}

impl Column {
    /// Builds a column from a header cell title (`"name:type"` or bare `"name"`).
    ///
    /// The title must match as a whole; a suffix that is not a recognized type
    /// tag leaves the full title as the name with type `String`.
    pub fn from_header(letter: &str, title: &str) -> Self {
        let (name, kind) = match TYPED_HEADER.captures(title) {
            Some(captures) => (
                captures[1].to_owned(),
                ColumnType::parse(&captures[2]).unwrap_or_default(),
            ),
            None => (title.to_owned(), ColumnType::String),
        };
        Column {
            letter: letter.to_owned(),
            name,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(title: &str) -> (String, ColumnType) {
        let column = Column::from_header("A", title);
        (column.name, column.kind)
    }

    #[test]
    fn parse_type_aliases() {
        assert_eq!(ColumnType::parse("int"), Some(ColumnType::Integer));
        assert_eq!(ColumnType::parse("Integer"), Some(ColumnType::Integer));
        assert_eq!(ColumnType::parse("BOOL"), Some(ColumnType::Boolean));
        assert_eq!(ColumnType::parse("boolean"), Some(ColumnType::Boolean));
        assert_eq!(ColumnType::parse("real"), Some(ColumnType::Float));
        assert_eq!(ColumnType::parse("double"), Some(ColumnType::Float));
        assert_eq!(ColumnType::parse("array"), Some(ColumnType::Array));
        assert_eq!(ColumnType::parse("json"), Some(ColumnType::Json));
        assert_eq!(ColumnType::parse("string"), Some(ColumnType::String));
        assert_eq!(ColumnType::parse("date"), None);
    }

    #[test]
    fn typed_header() {
        assert_eq!(header("Age:int"), ("Age".to_owned(), ColumnType::Integer));
        assert_eq!(header("Active:BOOL"), ("Active".to_owned(), ColumnType::Boolean));
        assert_eq!(header("Tags:array"), ("Tags".to_owned(), ColumnType::Array));
    }

    #[test]
    fn bare_header_defaults_to_string() {
        assert_eq!(header("Name"), ("Name".to_owned(), ColumnType::String));
    }

    #[test]
    fn unknown_type_suffix_keeps_whole_title() {
        assert_eq!(header("Start:date"), ("Start:date".to_owned(), ColumnType::String));
        assert_eq!(header("Opens at: 10:30"), ("Opens at: 10:30".to_owned(), ColumnType::String));
    }

    #[test]
    fn name_with_colons_splits_at_last_type_delimiter() {
        assert_eq!(header("ratio: a:b:float"), ("ratio: a:b".to_owned(), ColumnType::Float));
        assert_eq!(header("x:int:string"), ("x:int".to_owned(), ColumnType::String));
    }

    #[test]
    fn empty_name_is_not_a_typed_header() {
        assert_eq!(header(":int"), (":int".to_owned(), ColumnType::String));
    }
}
