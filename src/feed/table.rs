use crate::feed::column::Column;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One data row: column name to typed value.
pub type Row = Map<String, Value>;

/// A parsed sheet, the unit served to callers and stored in the cache.
///
/// Field names are the wire format: `{ id, title, updated, items }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedTable {
    /// Source feed id
    pub id: String,
    /// Sheet title
    pub title: String,
    /// Last update timestamp as reported by the source
    pub updated: String,
    /// Rows ordered by data row index
    pub items: Vec<Row>,
}

/// Pads every row with `null` for each header column it lacks.
///
/// Produces new rows whose fields follow the header column order; a name
/// shared by several columns is emitted once.
pub(crate) fn fill_nulls(rows: Vec<Row>, columns: &[Column]) -> Vec<Row> {
    rows.into_iter()
        .map(|mut row| {
            let mut filled = Row::new();
            for column in columns {
                if !filled.contains_key(&column.name) {
                    let value = row.remove(&column.name).unwrap_or(Value::Null);
                    filled.insert(column.name.to_owned(), value);
                }
            }
            filled
        })
        .collect()
}
