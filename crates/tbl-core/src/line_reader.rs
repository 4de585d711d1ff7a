//! Row reader for tab-separated table text
//!
//! A buffer is consumed one row at a time. Columns are separated by `\t`,
//! rows end at `\n` and a single `\r` directly before the `\n` is dropped.
//! A column wrapped in `"` has the quotes removed and every `""` inside it
//! collapsed to `"`. Tabs are never protected by quotes: unescaping runs on
//! the column text after the row has been split.
//!
//! A `\r` that is not directly followed by `\n` stays in the column text.
//! Existing data may rely on this, so it is kept and only logged.

use std::borrow::Cow;
use tracing::warn;

/// Column delimiter
pub const COLUMN_DELIMITER: u8 = b'\t';

const QUOTE: char = '"';
const ESCAPED_QUOTE: &str = "\"\"";

/// One row: its columns in order
///
/// Columns that needed no unescaping borrow the source text.
pub type Row<'a> = Vec<Cow<'a, str>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// At the start of a column
    Normal,
    /// Inside a column
    ReadColumn,
    /// Just after a `\r`
    ReadNewline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Continue,
    CloseColumn,
    CloseRow { strip_cr: bool },
    KeepCarriageReturn,
}

impl State {
    fn step(self, byte: u8) -> (State, Action) {
        match (self, byte) {
            (State::Normal | State::ReadColumn, COLUMN_DELIMITER) => {
                (State::Normal, Action::CloseColumn)
            }
            (State::Normal | State::ReadColumn, b'\r') => (State::ReadNewline, Action::Continue),
            (State::Normal | State::ReadColumn, b'\n') => {
                (State::Normal, Action::CloseRow { strip_cr: false })
            }
            (State::Normal | State::ReadColumn, _) => (State::ReadColumn, Action::Continue),
            (State::ReadNewline, b'\n') => (State::Normal, Action::CloseRow { strip_cr: true }),
            (State::ReadNewline, b'\r') => (State::ReadNewline, Action::Continue),
            // includes a tab, which then belongs to the column
            (State::ReadNewline, _) => (State::ReadColumn, Action::KeepCarriageReturn),
        }
    }
}

/// Reads rows from a borrowed text buffer
///
/// The buffer must outlive the reader and every row produced from it.
#[derive(Debug, Clone)]
pub struct LineReader<'a> {
    text: &'a str,
    read_index: usize,
    rows_read: usize,
}

impl<'a> LineReader<'a> {
    /// Create a reader positioned at the start of `text`
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            read_index: 0,
            rows_read: 0,
        }
    }

    /// Read the next row into `row`, replacing its contents
    ///
    /// Returns `false` once the buffer is exhausted, leaving `row` empty.
    /// Calling again after that keeps returning `false`.
    pub fn read_row(&mut self, row: &mut Row<'a>) -> bool {
        row.clear();

        let text = self.text;
        let bytes = text.as_bytes();
        if self.read_index >= bytes.len() {
            return false;
        }

        let mut state = State::Normal;
        let mut column_start = self.read_index;

        for (i, &byte) in bytes.iter().enumerate().skip(self.read_index) {
            let (next, action) = state.step(byte);
            state = next;

            match action {
                Action::Continue => {}
                Action::KeepCarriageReturn => {
                    warn!(
                        row = self.rows_read + 1,
                        offset = i - 1,
                        "carriage return not followed by line feed kept in column"
                    );
                }
                Action::CloseColumn => {
                    row.push(unescape_column(&text[column_start..i]));
                    column_start = i + 1;
                }
                Action::CloseRow { strip_cr } => {
                    let column_end = if strip_cr { i - 1 } else { i };
                    row.push(unescape_column(&text[column_start..column_end]));
                    self.read_index = i + 1;
                    self.rows_read += 1;
                    return true;
                }
            }
        }

        self.read_index = bytes.len();
        if column_start < bytes.len() {
            row.push(unescape_column(&text[column_start..]));
        }
        if row.is_empty() {
            return false;
        }

        self.rows_read += 1;
        true
    }

    /// Number of rows returned so far
    ///
    /// After a successful `read_row` this is the 1-based number of that row.
    pub fn line_number(&self) -> usize {
        self.rows_read
    }

    /// True when no rows remain
    pub fn is_exhausted(&self) -> bool {
        self.read_index >= self.text.len()
    }
}

impl<'a> Iterator for LineReader<'a> {
    type Item = Row<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut row = Vec::new();
        self.read_row(&mut row).then_some(row)
    }
}

/// Strip enclosing quotes and collapse doubled quotes
///
/// Text that is not wrapped in quotes is returned unchanged.
pub fn unescape_column(raw: &str) -> Cow<'_, str> {
    let quoted = raw.len() >= 2 && raw.starts_with(QUOTE) && raw.ends_with(QUOTE);
    if !quoted {
        return Cow::Borrowed(raw);
    }

    let inner = &raw[1..raw.len() - 1];
    if inner.contains(ESCAPED_QUOTE) {
        Cow::Owned(inner.replace(ESCAPED_QUOTE, "\""))
    } else {
        Cow::Borrowed(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(text: &str) -> Vec<Vec<String>> {
        LineReader::new(text)
            .map(|row| row.into_iter().map(Cow::into_owned).collect())
            .collect()
    }

    #[test]
    fn test_simple_row() {
        let mut reader = LineReader::new("a\tb\tc\n");
        let mut row = Row::new();
        assert!(reader.read_row(&mut row));
        assert_eq!(row, vec!["a", "b", "c"]);
        assert!(reader.is_exhausted());
        assert!(!reader.read_row(&mut row));
        assert!(row.is_empty());
    }

    #[test]
    fn test_quoted_column_and_crlf() {
        assert_eq!(
            rows("a\t\"b\"\"c\"\td\r\n"),
            vec![vec!["a", "b\"c", "d"]]
        );
    }

    #[test]
    fn test_unterminated_last_row() {
        assert_eq!(rows("x\ty"), vec![vec!["x", "y"]]);
        assert_eq!(rows("h1\th2\nx\ty"), vec![vec!["h1", "h2"], vec!["x", "y"]]);
    }

    #[test]
    fn test_exhaustion_is_idempotent() {
        let mut reader = LineReader::new("x\n");
        let mut row = Row::new();
        assert!(reader.read_row(&mut row));
        assert_eq!(reader.line_number(), 1);
        for _ in 0..3 {
            assert!(!reader.read_row(&mut row));
            assert_eq!(reader.line_number(), 1);
        }
    }

    #[test]
    fn test_empty_buffer() {
        assert!(rows("").is_empty());
    }

    #[test]
    fn test_empty_columns() {
        assert_eq!(rows("\ta\t\tb\n"), vec![vec!["", "a", "", "b"]]);
        assert_eq!(rows("a\t\n"), vec![vec!["a", ""]]);
        assert_eq!(rows("\n"), vec![vec![""]]);
        assert_eq!(rows("\r\n"), vec![vec![""]]);
    }

    #[test]
    fn test_trailing_tab_at_end_of_buffer() {
        assert_eq!(rows("a\t"), vec![vec!["a"]]);
    }

    #[test]
    fn test_multiple_rows_mixed_terminators() {
        assert_eq!(
            rows("1\tone\r\n2\ttwo\n3\tthree"),
            vec![vec!["1", "one"], vec!["2", "two"], vec!["3", "three"]]
        );
    }

    #[test]
    fn test_only_adjacent_carriage_return_stripped() {
        assert_eq!(rows("a\r\r\nb\n"), vec![vec!["a\r"], vec!["b"]]);
    }

    #[test]
    fn test_lone_carriage_return_kept() {
        assert_eq!(rows("a\rb\tc\n"), vec![vec!["a\rb", "c"]]);
        // a tab right after the carriage return does not split the column
        assert_eq!(rows("a\r\tb\n"), vec![vec!["a\r\tb"]]);
        assert_eq!(rows("a\r"), vec![vec!["a\r"]]);
    }

    #[test]
    fn test_blank_lines_are_rows() {
        assert_eq!(rows("a\r\n\r\nb\r\n"), vec![vec!["a"], vec![""], vec!["b"]]);
    }

    #[test]
    fn test_round_trip_plain_columns() {
        let fields = ["plain", "with space", "中文", "1|2|3", "a;b", "mid\"quote"];
        let line = fields.join("\t");
        assert_eq!(rows(&line), vec![fields.to_vec()]);
    }

    #[test]
    fn test_quotes_do_not_protect_tabs() {
        assert_eq!(rows("\"a\tb\"\n"), vec![vec!["\"a", "b\""]]);
    }

    #[test]
    fn test_plain_columns_are_borrowed() {
        let text = String::from("plain\t\"quoted\"\t\"es\"\"caped\"\n");
        let row = LineReader::new(&text).next().unwrap_or_default();
        assert!(matches!(row[0], Cow::Borrowed("plain")));
        assert!(matches!(row[1], Cow::Borrowed("quoted")));
        assert!(matches!(row[2], Cow::Owned(_)));
        assert_eq!(row[2], "es\"caped");
    }

    #[test]
    fn test_scratch_row_is_reused() {
        let mut reader = LineReader::new("a\tb\nc\n");
        let mut row = Row::with_capacity(8);
        assert!(reader.read_row(&mut row));
        assert_eq!(row, vec!["a", "b"]);
        assert!(reader.read_row(&mut row));
        assert_eq!(row, vec!["c"]);
        assert!(row.capacity() >= 8);
        assert_eq!(reader.line_number(), 2);
    }

    #[test]
    fn test_unescape_column() {
        assert_eq!(unescape_column("\"\""), "");
        assert_eq!(unescape_column("\"\"\""), "\"");
        assert_eq!(unescape_column("\"\"\"\""), "\"");
        assert_eq!(unescape_column("\"a\"\"\"\"b\""), "a\"\"b");
        assert_eq!(unescape_column("\""), "\"");
        assert_eq!(unescape_column("\"open"), "\"open");
        assert_eq!(unescape_column("close\""), "close\"");
        assert_eq!(unescape_column("x\"\"y"), "x\"\"y");
    }
}
