//! JSON table layouts for schema-less tables
//!
//! A layout names the columns of a table, gives each a kind and optionally
//! a key column. Applying it to a [`Table`] checks the name line and the key
//! rules and converts every cell.

use crate::cell::parse_int_strict;
use crate::error::{Error, Result};
use crate::list::{read_column_int_list, read_column_int_list_strict, read_column_string_list};
use crate::splitter::atoi;
use crate::table::{
    check_column_count, check_column_names, CellValue, KeyCell, KeyCells, KeyMode, Table,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Layout of one table file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableLayout {
    /// Columns in file order
    pub columns: Vec<ColumnLayout>,
    /// Key column, if the table has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyLayout>,
    /// Reject non-numeric integer cells instead of reading them as 0
    #[serde(default)]
    pub strict_integers: bool,
}

/// One column of a layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub name: String,
    #[serde(default)]
    pub kind: ColumnKind,
}

/// Cell type of a column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Int,
    #[default]
    String,
    IntList,
    StringList,
}

impl ColumnKind {
    /// Convert cell text to a value of this kind
    pub fn convert(self, text: &str, strict: bool) -> Result<CellValue> {
        let value = match self {
            ColumnKind::Int if strict => CellValue::Int(parse_int_strict(text)?),
            ColumnKind::Int => CellValue::Int(atoi(text)),
            ColumnKind::String => CellValue::String(text.to_string()),
            ColumnKind::IntList if strict => CellValue::IntList(read_column_int_list_strict(text)?),
            ColumnKind::IntList => CellValue::IntList(read_column_int_list(text)),
            ColumnKind::StringList => CellValue::StringList(read_column_string_list(text)),
        };
        Ok(value)
    }
}

/// Key column of a layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyLayout {
    pub column: String,
    #[serde(default)]
    pub mode: KeyMode,
}

/// A table with every cell converted by its layout
#[derive(Debug, Clone, Serialize)]
pub struct TypedTable {
    pub columns: Vec<String>,
    pub records: Vec<TypedRecord>,
}

/// One converted data line
#[derive(Debug, Clone, Serialize)]
pub struct TypedRecord {
    pub line: usize,
    pub cells: Vec<CellValue>,
}

impl TypedTable {
    /// Rows as an array of JSON objects keyed by column name
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut rows = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let mut object = serde_json::Map::new();
            for (name, cell) in self.columns.iter().zip(&record.cells) {
                object.insert(name.clone(), serde_json::to_value(cell)?);
            }
            rows.push(serde_json::Value::Object(object));
        }
        Ok(serde_json::Value::Array(rows))
    }
}

struct KeyColumn {
    index: usize,
    cells: KeyCells,
    seen: BTreeSet<String>,
}

impl TableLayout {
    /// Parse a layout from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a layout file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&text)
    }

    /// Column names in file order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Check that the table's name line matches this layout
    pub fn check_header(&self, table: &Table) -> Result<()> {
        check_column_count(2, table.column_count(), self.columns.len())?;
        let names: Vec<String> = table.columns.iter().map(|c| c.name.clone()).collect();
        check_column_names(&names, self.column_names())
    }

    /// Convert every cell of `table`, enforcing the key rules
    pub fn apply(&self, table: &Table) -> Result<TypedTable> {
        self.check_header(table)?;

        let mut key = match &self.key {
            Some(layout) => Some(KeyColumn {
                index: self.key_index(&layout.column)?,
                cells: KeyCells::new(&layout.column, layout.mode),
                seen: BTreeSet::new(),
            }),
            None => None,
        };

        let mut records = Vec::with_capacity(table.row_count());
        for record in &table.records {
            let line = record.line;

            let mut starts_key = false;
            let mut inherited = None;
            if let Some(key) = key.as_mut() {
                match key.cells.resolve(line, record.get(key.index).unwrap_or_default())? {
                    KeyCell::New => starts_key = true,
                    KeyCell::Same => {}
                    KeyCell::Inherited(text) => inherited = Some((key.index, text)),
                }
            }

            let cells = self
                .columns
                .iter()
                .enumerate()
                .map(|(index, column)| {
                    let text = match &inherited {
                        Some((key_index, text)) if *key_index == index => text.as_str(),
                        _ => record.get(index).unwrap_or_default(),
                    };
                    column
                        .kind
                        .convert(text, self.strict_integers)
                        .map_err(|e| Error::invalid_column(line, &column.name, e))
                })
                .collect::<Result<Vec<_>>>()?;

            if let Some(key) = key.as_mut() {
                let value = cells[key.index].to_string();
                if starts_key && !key.seen.insert(value.clone()) {
                    return Err(key.cells.duplicate(line, value));
                }
            }

            records.push(TypedRecord { line, cells });
        }

        debug!(records = records.len(), "applied table layout");

        Ok(TypedTable {
            columns: self.column_names().map(str::to_string).collect(),
            records,
        })
    }

    fn key_index(&self, name: &str) -> Result<usize> {
        self.column_names()
            .position(|n| n == name)
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }
}
