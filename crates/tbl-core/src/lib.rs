//! tbl-core: Tokenizer and loaders for tab-separated game configuration tables
//!
//! This library provides functionality to:
//! - Split a cell on a single delimiter ([`ColumnSplitter`])
//! - Read rows from table text with quoting and CR/LF handling ([`LineReader`])
//! - Read `|` separated lists and `;` separated struct cells
//! - Load whole table files, either schema-less ([`Table`], [`TableLayout`])
//!   or into caller-defined row types ([`KeyedTable`], [`GroupedTable`])
//!
//! Everything works on text that is already decoded and in memory.

pub mod cell;
pub mod error;
pub mod keyed;
pub mod layout;
pub mod line_reader;
pub mod list;
pub mod splitter;
pub mod table;

pub use cell::{FromCell, StructCell};
pub use error::{Error, Result};
pub use keyed::{GroupedTable, KeyedTable, RowCursor, TableRow};
pub use layout::{ColumnKind, ColumnLayout, KeyLayout, TableLayout, TypedRecord, TypedTable};
pub use line_reader::{LineReader, Row};
pub use list::{read_column_int_list, read_column_string_list, read_column_struct_list};
pub use splitter::{atoi, ColumnSplitter};
pub use table::{CellValue, Column, KeyMode, Record, Table};
