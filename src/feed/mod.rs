//! # Feed Parsing Module
//!
//! Turns the cell-level JSON export of a spreadsheet into typed rows. The
//! first row of the sheet is the header: each header cell declares a column
//! name and an optional type (`"Age:int"`), and every data cell below it is
//! coerced to that type and stored under the column name.
pub mod cell;
pub mod column;
pub(crate) mod reference;
pub mod table;

use crate::feed::cell::RawCell;
use crate::feed::column::Column;
use crate::feed::reference::col_to_index;
use crate::feed::table::{fill_nulls, ParsedTable, Row};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised for malformed feed documents.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The document is not JSON or does not have the feed envelope shape
    #[error("Invalid feed document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    /// The feed envelope has no list of cell entries
    #[error("Feed document has no entry list")]
    MissingEntries,
}

/// A `{"$t": "..."}` text node.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TextNode {
    #[serde(rename = "$t", default)]
    pub(crate) text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedDocument {
    pub(crate) feed: Feed,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Feed {
    #[serde(default)]
    pub(crate) id: TextNode,
    #[serde(default)]
    pub(crate) title: TextNode,
    #[serde(default)]
    pub(crate) updated: TextNode,
    pub(crate) entry: Option<Vec<FeedEntry>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedEntry {
    #[serde(default)]
    pub(crate) id: TextNode,
    #[serde(default)]
    pub(crate) title: TextNode,
    #[serde(default)]
    pub(crate) content: TextNode,
}

impl FeedDocument {
    /// Reads the feed envelope and its entry list.
    pub(crate) fn parse(source: &str) -> Result<(Feed, Vec<FeedEntry>), ParseError> {
        let mut document: FeedDocument = serde_json::from_str(source)?;
        let entries = document.feed.entry.take().ok_or(ParseError::MissingEntries)?;
        Ok((document.feed, entries))
    }
}

/// Parser from cell feed documents to [`ParsedTable`].
#[derive(Copy, Clone, Debug)]
pub struct FeedParser {
    /// Pad every row with nulls for all header columns
    pub nullfill: bool,
}

impl FeedParser {
    pub fn new(nullfill: bool) -> Self {
        FeedParser { nullfill }
    }

    /// Parses a feed document into a table.
    ///
    /// Entries whose title is not a cell address are skipped. Data cells in a
    /// column without a header cell contribute no field, but still create
    /// their row.
    pub fn parse(&self, source: &str) -> Result<ParsedTable, ParseError> {
        let (feed, entries) = FeedDocument::parse(source)?;

        let mut cells = Vec::with_capacity(entries.len());
        for entry in &entries {
            match RawCell::new(&entry.title.text, &entry.content.text) {
                Some(cell) => cells.push(cell),
                None => tracing::warn!(address = %entry.title.text, "skipping entry with malformed cell address"),
            }
        }

        // Header cells first, keyed by column index so AA sorts after Z.
        let mut headers = BTreeMap::<usize, Column>::new();
        for cell in cells.iter().filter(|cell| cell.data_index().is_none()) {
            if let Some(index) = col_to_index(&cell.column) {
                headers.insert(index, Column::from_header(&cell.column, &cell.text));
            }
        }
        let columns: Vec<Column> = headers.into_values().collect();

        let mut rows = BTreeMap::<usize, Row>::new();
        for cell in &cells {
            let Some(index) = cell.data_index() else {
                continue;
            };
            let row = rows.entry(index).or_default();
            if let Some(column) = columns.iter().find(|column| column.letter == cell.column) {
                row.insert(column.name.to_owned(), cell.coerce(column.kind));
            }
        }

        let mut items: Vec<Row> = rows.into_values().collect();
        if self.nullfill {
            items = fill_nulls(items, &columns);
        }
        tracing::debug!(rows = items.len(), columns = columns.len(), "parsed feed");

        Ok(ParsedTable {
            id: feed.id.text,
            title: feed.title.text,
            updated: feed.updated.text,
            items,
        })
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        FeedParser::new(true)
    }
}
