//! # Worksheet Resolution
//!
//! A spreadsheet (container) holds several worksheets, each with its own cell
//! feed. Requests may name a worksheet or give its position; this module turns
//! that selector into the worksheet id used in the feed URL.
use crate::config::Config;
use crate::feed::{FeedDocument, ParseError};
use crate::loader::mode::ModePolicy;
use crate::loader::source::Source;
use serde::{Deserialize, Serialize};

/// A worksheet of a container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetListEntry {
    /// Worksheet id (last path segment of the entry id)
    pub id: String,
    /// Worksheet title
    pub name: String,
}

/// Selects a worksheet by name or by 0-based position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetSelector {
    Name(String),
    Index(usize),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

impl From<&str> for SheetSelector {
    fn from(name: &str) -> Self {
        SheetSelector::Name(name.to_owned())
    }
}

impl From<usize> for SheetSelector {
    fn from(index: usize) -> Self {
        SheetSelector::Index(index)
    }
}

/// Parses a worksheet list feed document.
pub fn parse_worksheets(source: &str) -> Result<Vec<SheetListEntry>, ParseError> {
    let (_, entries) = FeedDocument::parse(source)?;
    let mut sheets = Vec::with_capacity(entries.len());
    for entry in entries {
        let id = entry.id.text.trim_end_matches('/').rsplit('/').next().unwrap_or("");
        if id.is_empty() {
            tracing::warn!(name = %entry.title.text, "skipping worksheet without id");
            continue;
        }
        sheets.push(SheetListEntry {
            id: id.to_owned(),
            name: entry.title.text,
        });
    }
    Ok(sheets)
}

/// Picks the worksheet a selector refers to.
///
/// An index selects by position. A name selects the first worksheet with that
/// exact name; failing that, a numeric name is used as a position, and any
/// other name as position 0. Positions past the end fall back to the first
/// worksheet. Only an empty list selects nothing.
pub fn select_sheet<'a>(sheets: &'a [SheetListEntry], selector: &SheetSelector) -> Option<&'a SheetListEntry> {
    let index = match selector {
        SheetSelector::Index(index) => *index,
        SheetSelector::Name(name) => {
            if let Some(sheet) = sheets.iter().find(|sheet| &sheet.name == name) {
                return Some(sheet);
            }
            name.trim().parse::<usize>().unwrap_or(0)
        }
    };
    sheets.get(index).or_else(|| sheets.first())
}

/// Resolves worksheet selectors against the (cached) worksheet list of a container.
pub(crate) struct SheetResolver<'a> {
    source: Source<'a>,
    config: &'a Config,
}

impl<'a> SheetResolver<'a> {
    pub(crate) fn new(source: Source<'a>, config: &'a Config) -> Self {
        SheetResolver { source, config }
    }

    /// Returns the id of the selected worksheet of `container`.
    ///
    /// The worksheet list is obtained under the same policy as the table it
    /// leads to, and cached under its URL.
    pub(crate) fn resolve_sheet_id(&self, container: &str, selector: &SheetSelector, policy: ModePolicy) -> Option<String> {
        let url = self.config.worksheets_url(container);
        let sheets: Vec<SheetListEntry> = self.source.acquire(policy, &url, &url, parse_worksheets)?;
        let sheet = select_sheet(&sheets, selector)?;
        tracing::debug!(container, sheet = %sheet.name, id = %sheet.id, "resolved worksheet");
        Some(sheet.id.to_owned())
    }
}
