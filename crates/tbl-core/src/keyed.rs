//! Typed tables for caller-defined row types
//!
//! A row type lists its column names, says which column holds the key and
//! reads its fields from a [`RowCursor`]. [`KeyedTable`] holds one row per
//! key and [`GroupedTable`] holds a row set per key.

use crate::cell::FromCell;
use crate::error::{Error, Result};
use crate::line_reader::{LineReader, Row};
use crate::list::{read_column_int_list, read_column_string_list, read_column_struct_list};
use crate::splitter::atoi;
use crate::table::{
    check_column_count, check_column_names, read_header, KeyCell, KeyCells, KeyMode,
    FIRST_DATA_LINE,
};
use std::borrow::Cow;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use tracing::{debug, trace};

/// A row type that can be loaded from a table file
pub trait TableRow: Sized {
    /// Key type, parsed from the key column
    type Key: Ord + Clone + fmt::Debug + fmt::Display;

    /// Column names in file order; the name line must match exactly
    const COLUMNS: &'static [&'static str];

    /// Index of the key column in `COLUMNS`
    const KEY_COLUMN: usize;

    /// Read one row, consuming columns left to right
    fn from_columns(columns: &mut RowCursor<'_, '_>) -> Result<Self>;

    /// Key of a parsed row
    fn key(&self) -> Self::Key;
}

/// Reads the columns of one data line in order
///
/// Scalar and list reads never fail; struct reads report the line and
/// column name on failure.
#[derive(Debug)]
pub struct RowCursor<'r, 'a> {
    cells: &'r [Cow<'a, str>],
    names: &'static [&'static str],
    line: usize,
    index: usize,
}

impl<'r, 'a> RowCursor<'r, 'a> {
    fn new(cells: &'r [Cow<'a, str>], names: &'static [&'static str], line: usize) -> Self {
        Self {
            cells,
            names,
            line,
            index: 0,
        }
    }

    /// Line number of the data line being read
    pub fn line(&self) -> usize {
        self.line
    }

    fn next_cell(&mut self) -> (&'static str, &'r str) {
        let name = self.names.get(self.index).copied().unwrap_or_default();
        let cell: &'r str = self.cells.get(self.index).map(|c| &**c).unwrap_or_default();
        self.index += 1;
        (name, cell)
    }

    /// Next column as borrowed text
    pub fn next_str(&mut self) -> &'r str {
        self.next_cell().1
    }

    pub fn next_string(&mut self) -> String {
        self.next_str().to_string()
    }

    /// Next column with permissive integer conversion
    pub fn next_int(&mut self) -> i32 {
        atoi(self.next_str())
    }

    pub fn next_int_list(&mut self) -> Vec<i32> {
        read_column_int_list(self.next_str())
    }

    pub fn next_string_list(&mut self) -> Vec<String> {
        read_column_string_list(self.next_str())
    }

    /// Next column parsed as a single struct
    pub fn next_struct<T: FromCell>(&mut self) -> Result<T> {
        let (name, cell) = self.next_cell();
        T::from_cell(cell).map_err(|e| Error::invalid_column(self.line, name, e))
    }

    /// Next column parsed as a `|` separated list of structs
    pub fn next_struct_list<T: FromCell>(&mut self) -> Result<Vec<T>> {
        let (name, cell) = self.next_cell();
        read_column_struct_list(cell).map_err(|e| Error::invalid_column(self.line, name, e))
    }
}

fn key_column<R: TableRow>() -> Result<&'static str> {
    R::COLUMNS
        .get(R::KEY_COLUMN)
        .copied()
        .ok_or_else(|| Error::UnknownColumn(format!("#{}", R::KEY_COLUMN)))
}

/// Read every data line of `text` as `R`, handing each row to `accept`
/// together with whether it starts a new key
fn read_rows<R, F>(text: &str, mode: KeyMode, mut accept: F) -> Result<()>
where
    R: TableRow,
    F: FnMut(usize, R, bool) -> Result<()>,
{
    let mut keys = KeyCells::new(key_column::<R>()?, mode);
    let mut reader = LineReader::new(text);
    let header = read_header(&mut reader, Some(R::COLUMNS.len()))?;
    check_column_names(&header.names, R::COLUMNS.iter().copied())?;

    let mut row = Row::new();
    let mut line = FIRST_DATA_LINE;
    while reader.read_row(&mut row) {
        check_column_count(line, row.len(), R::COLUMNS.len())?;

        let starts_key = match keys.resolve(line, &row[R::KEY_COLUMN])? {
            KeyCell::New => true,
            KeyCell::Same => false,
            KeyCell::Inherited(key) => {
                row[R::KEY_COLUMN] = Cow::Owned(key);
                false
            }
        };

        let value = R::from_columns(&mut RowCursor::new(&row, R::COLUMNS, line))?;
        trace!(line, key = %value.key(), "data line");
        accept(line, value, starts_key)?;
        line += 1;
    }
    Ok(())
}

/// A table with exactly one row per key
#[derive(Debug, Clone)]
pub struct KeyedTable<R: TableRow> {
    rows: BTreeMap<R::Key, R>,
}

impl<R: TableRow> KeyedTable<R> {
    /// Parse table text; empty and duplicated keys are errors
    pub fn parse(text: &str) -> Result<Self> {
        let mut rows = BTreeMap::new();

        read_rows::<R, _>(text, KeyMode::Single, |line, row, _| {
            match rows.entry(row.key()) {
                btree_map::Entry::Occupied(entry) => Err(duplicate_key::<R>(line, entry.key())),
                btree_map::Entry::Vacant(entry) => {
                    entry.insert(row);
                    Ok(())
                }
            }
        })?;

        debug!(rows = rows.len(), "parsed keyed table");
        Ok(Self { rows })
    }

    /// Find a row by key
    pub fn get(&self, key: &R::Key) -> Option<&R> {
        self.rows.get(key)
    }

    pub fn rows(&self) -> &BTreeMap<R::Key, R> {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.values()
    }
}

/// A table with a set of rows per key
#[derive(Debug, Clone)]
pub struct GroupedTable<R: TableRow> {
    row_sets: BTreeMap<R::Key, Vec<R>>,
}

impl<R: TableRow> GroupedTable<R> {
    /// Parse table text
    ///
    /// Rows of one set must be consecutive. An empty key cell continues the
    /// current set; a key that comes back after another key is duplicated.
    pub fn parse(text: &str) -> Result<Self> {
        let mut row_sets: BTreeMap<R::Key, Vec<R>> = BTreeMap::new();

        read_rows::<R, _>(text, KeyMode::Set, |line, row, starts_key| {
            let key = row.key();
            if starts_key {
                if row_sets.contains_key(&key) {
                    return Err(duplicate_key::<R>(line, &key));
                }
                row_sets.insert(key, vec![row]);
            } else {
                row_sets.entry(key).or_default().push(row);
            }
            Ok(())
        })?;

        debug!(row_sets = row_sets.len(), "parsed grouped table");
        Ok(Self { row_sets })
    }

    /// Find the row set of a key
    pub fn get(&self, key: &R::Key) -> Option<&[R]> {
        self.row_sets.get(key).map(Vec::as_slice)
    }

    pub fn row_sets(&self) -> &BTreeMap<R::Key, Vec<R>> {
        &self.row_sets
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.row_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_sets.is_empty()
    }
}

fn duplicate_key<R: TableRow>(line: usize, key: &R::Key) -> Error {
    Error::DuplicateKey {
        line,
        column: key_column::<R>().unwrap_or_default().to_string(),
        value: key.to_string(),
    }
}
