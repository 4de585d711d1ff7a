//! Table files: header lines, data lines and key rules
//!
//! Every table file starts with a comment line describing the columns and a
//! name line holding the column names. All following rows are data lines,
//! numbered from 3, and each must have exactly as many columns as the header.

use crate::error::{Error, Result};
use crate::line_reader::{LineReader, Row};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use tracing::{debug, trace};

/// Line number of the first data line
pub const FIRST_DATA_LINE: usize = 3;

/// A table read without any schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Data lines
    pub records: Vec<Record>,
}

impl Table {
    /// Parse table text; the name line fixes the column count
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = LineReader::new(text);
        let header = read_header(&mut reader, None)?;

        let columns: Vec<Column> = header
            .names
            .into_iter()
            .zip(header.comments)
            .enumerate()
            .map(|(index, (name, comment))| Column {
                name,
                comment,
                index,
            })
            .collect();

        let mut records = Vec::new();
        let mut row = Row::new();
        let mut line = FIRST_DATA_LINE;
        while reader.read_row(&mut row) {
            check_column_count(line, row.len(), columns.len())?;
            trace!(line, "data line");
            records.push(Record {
                line,
                cells: row.drain(..).map(Cow::into_owned).collect(),
            });
            line += 1;
        }

        debug!(
            columns = columns.len(),
            records = records.len(),
            "parsed table"
        );

        Ok(Table { columns, records })
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of data lines
    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Index of a named column
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.find_column(name)
            .map(|c| c.index)
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }

    /// Cell of `record` in the named column
    pub fn cell<'t>(&self, record: &'t Record, name: &str) -> Option<&'t str> {
        self.find_column(name)
            .and_then(|c| record.get(c.index))
    }
}

/// A column definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name from the name line
    pub name: String,
    /// Description from the comment line
    pub comment: String,
    /// Column index (0-based)
    pub index: usize,
}

/// One data line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Line number in the table file (data lines start at 3)
    pub line: usize,
    /// Cells in column order
    pub cells: Vec<String>,
}

impl Record {
    /// Get a cell by column index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }
}

/// A typed cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Integer value
    Int(i32),
    /// String value
    String(String),
    /// `|` separated integers
    IntList(Vec<i32>),
    /// `|` separated strings
    StringList(Vec<String>),
}

impl CellValue {
    /// Check if the cell holds an empty string or empty list
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Int(_) => false,
            CellValue::String(s) => s.is_empty(),
            CellValue::IntList(v) => v.is_empty(),
            CellValue::StringList(v) => v.is_empty(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::IntList(v) => {
                let parts: Vec<String> = v.iter().map(i32::to_string).collect();
                write!(f, "{}", parts.join("|"))
            }
            CellValue::StringList(v) => write!(f, "{}", v.join("|")),
        }
    }
}

/// How the key column groups rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMode {
    /// Every row has its own unique key
    #[default]
    Single,
    /// Consecutive rows with the same key form one row set; an empty key
    /// continues the current set
    Set,
}

#[derive(Debug)]
pub(crate) struct Header {
    pub comments: Vec<String>,
    pub names: Vec<String>,
}

/// Read the comment line and name line
///
/// With `required` set, both lines must have that many columns; otherwise
/// the name line decides.
pub(crate) fn read_header(reader: &mut LineReader<'_>, required: Option<usize>) -> Result<Header> {
    let comments = owned_row(reader.next().ok_or(Error::MissingCommentLine)?);
    if let Some(required) = required {
        check_column_count(1, comments.len(), required)?;
    }

    let names = owned_row(reader.next().ok_or(Error::MissingNameLine)?);
    let required = required.unwrap_or(names.len());
    check_column_count(2, names.len(), required)?;
    check_column_count(1, comments.len(), required)?;

    Ok(Header { comments, names })
}

pub(crate) fn check_column_count(line: usize, found: usize, expected: usize) -> Result<()> {
    if found != expected {
        return Err(Error::ColumnCount {
            line,
            found,
            expected,
        });
    }
    Ok(())
}

/// Check the name line against expected names, in order
pub(crate) fn check_column_names<'e, I>(names: &[String], expected: I) -> Result<()>
where
    I: IntoIterator<Item = &'e str>,
{
    for (i, expected) in expected.into_iter().enumerate() {
        let found = names.get(i).map(String::as_str).unwrap_or_default();
        if found != expected {
            return Err(Error::ColumnName {
                index: i + 1,
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
    }
    Ok(())
}

fn owned_row(row: Row<'_>) -> Vec<String> {
    row.into_iter().map(Cow::into_owned).collect()
}

/// Outcome of reading one key cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeyCell {
    /// The row starts a new key (always the case in single mode)
    New,
    /// The row repeats the current set key
    Same,
    /// The key cell was empty and takes the current set key
    Inherited(String),
}

/// Applies the key rules to data lines in file order
#[derive(Debug)]
pub(crate) struct KeyCells {
    column: String,
    mode: KeyMode,
    last: String,
}

impl KeyCells {
    pub fn new(column: &str, mode: KeyMode) -> Self {
        Self {
            column: column.to_string(),
            mode,
            last: String::new(),
        }
    }

    pub fn resolve(&mut self, line: usize, cell: &str) -> Result<KeyCell> {
        if cell.is_empty() {
            if self.mode == KeyMode::Set && !self.last.is_empty() {
                return Ok(KeyCell::Inherited(self.last.clone()));
            }
            return Err(Error::EmptyKey {
                line,
                column: self.column.clone(),
            });
        }

        if self.mode == KeyMode::Set {
            if cell == self.last {
                return Ok(KeyCell::Same);
            }
            self.last = cell.to_string();
        }
        Ok(KeyCell::New)
    }

    pub fn duplicate(&self, line: usize, value: impl fmt::Display) -> Error {
        Error::DuplicateKey {
            line,
            column: self.column.clone(),
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEMS: &str = "id\tname\tprice\nid\tname\tprice\n1\tsword\t100\n2\t\"round \"\"oak\"\" shield\"\t80\n";

    #[test]
    fn test_parse_simple_table() {
        let table = Table::parse(ITEMS).unwrap();

        assert_eq!(table.column_count(), 3);
        assert_eq!(table.columns[1].name, "name");
        assert_eq!(table.columns[2].index, 2);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.records[0].line, 3);
        assert_eq!(table.records[1].line, 4);
        assert_eq!(table.records[1].get(1), Some("round \"oak\" shield"));
        assert_eq!(table.cell(&table.records[0], "price"), Some("100"));
        assert_eq!(table.cell(&table.records[0], "weight"), None);
    }

    #[test]
    fn test_comments_attached_to_columns() {
        let table = Table::parse("Item id\tDisplay name\r\nid\tname\r\n").unwrap();
        assert_eq!(table.columns[0].comment, "Item id");
        assert_eq!(table.columns[1].comment, "Display name");
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_missing_header_lines() {
        assert!(matches!(Table::parse(""), Err(Error::MissingCommentLine)));
        assert!(matches!(Table::parse("a\tb\n"), Err(Error::MissingNameLine)));
    }

    #[test]
    fn test_comment_line_count_mismatch() {
        let err = Table::parse("a\nx\ty\n").unwrap_err();
        assert!(matches!(
            err,
            Error::ColumnCount {
                line: 1,
                found: 1,
                expected: 2
            }
        ));
    }

    #[test]
    fn test_data_line_count_mismatch() {
        let err = Table::parse("a\tb\nx\ty\n1\t2\n3\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 4 column count 1 is invalid, should be 2"
        );
    }

    #[test]
    fn test_column_index() {
        let table = Table::parse(ITEMS).unwrap();
        assert_eq!(table.column_index("price").unwrap(), 2);
        assert!(matches!(
            table.column_index("nope"),
            Err(Error::UnknownColumn(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_check_column_names() {
        let names = vec!["id".to_string(), "name".to_string()];
        assert!(check_column_names(&names, ["id", "name"]).is_ok());
        let err = check_column_names(&names, ["id", "label"]).unwrap_err();
        assert_eq!(err.to_string(), "column 2 should be named as `label`, found `name`");
    }

    #[test]
    fn test_single_keys() {
        let mut keys = KeyCells::new("id", KeyMode::Single);
        assert_eq!(keys.resolve(3, "1").unwrap(), KeyCell::New);
        assert_eq!(keys.resolve(4, "1").unwrap(), KeyCell::New);
        assert!(matches!(
            keys.resolve(5, ""),
            Err(Error::EmptyKey { line: 5, .. })
        ));
    }

    #[test]
    fn test_set_keys() {
        let mut keys = KeyCells::new("skill", KeyMode::Set);
        assert!(matches!(keys.resolve(3, ""), Err(Error::EmptyKey { line: 3, .. })));
        assert_eq!(keys.resolve(3, "10").unwrap(), KeyCell::New);
        assert_eq!(
            keys.resolve(4, "").unwrap(),
            KeyCell::Inherited("10".to_string())
        );
        assert_eq!(keys.resolve(5, "10").unwrap(), KeyCell::Same);
        assert_eq!(keys.resolve(6, "11").unwrap(), KeyCell::New);
        assert_eq!(keys.resolve(7, "10").unwrap(), KeyCell::New);
    }

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::Int(-3).to_string(), "-3");
        assert_eq!(CellValue::IntList(vec![1, 2]).to_string(), "1|2");
        assert_eq!(
            CellValue::StringList(vec!["a".into(), "".into()]).to_string(),
            "a|"
        );
        assert!(CellValue::IntList(Vec::new()).is_empty());
        assert!(!CellValue::Int(0).is_empty());
    }
}
