//! `|` separated lists stored in a single column

use crate::cell::{parse_int_strict, FromCell};
use crate::error::{Error, Result};
use crate::splitter::{atoi, ColumnSplitter};

/// Delimiter between list elements inside one column
pub const LIST_DELIMITER: char = '|';

/// Split a column into integers
///
/// An empty column is an empty list. Non-numeric elements convert to `0`.
pub fn read_column_int_list(column: &str) -> Vec<i32> {
    if column.is_empty() {
        return Vec::new();
    }
    ColumnSplitter::new(column, LIST_DELIMITER).map(atoi).collect()
}

/// Split a column into integers, rejecting any element that is not a number
pub fn read_column_int_list_strict(column: &str) -> Result<Vec<i32>> {
    parse_elements(column, parse_int_strict)
}

/// Split a column into strings
///
/// An empty column is an empty list; `"a|"` is `["a", ""]`.
pub fn read_column_string_list(column: &str) -> Vec<String> {
    if column.is_empty() {
        return Vec::new();
    }
    ColumnSplitter::new(column, LIST_DELIMITER)
        .map(str::to_string)
        .collect()
}

/// Split a column and parse every element with `T::from_cell`
///
/// The first element that fails aborts the whole list.
pub fn read_column_struct_list<T: FromCell>(column: &str) -> Result<Vec<T>> {
    parse_elements(column, T::from_cell)
}

fn parse_elements<T, F>(column: &str, parse: F) -> Result<Vec<T>>
where
    F: Fn(&str) -> Result<T>,
{
    if column.is_empty() {
        return Ok(Vec::new());
    }
    ColumnSplitter::new(column, LIST_DELIMITER)
        .enumerate()
        .map(|(index, token)| {
            parse(token).map_err(|e| Error::ListElement {
                index,
                token: token.to_string(),
                source: Box::new(e),
            })
        })
        .collect()
}
