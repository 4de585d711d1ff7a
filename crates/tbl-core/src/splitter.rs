//! Single-delimiter column splitter

use std::iter::FusedIterator;

/// Splits one span of text into tokens on a single delimiter character.
///
/// The splitter only borrows `text`. Tokens are slices of that text, so they
/// stay valid for `'a` even after the splitter is dropped, and the text must
/// outlive the splitter.
///
/// Empty fields are never skipped:
/// - `""` yields one empty token
/// - `"a|b|"` yields `"a"`, `"b"`, `""`
/// - `"a|b"` yields `"a"`, `"b"` with no trailing empty token
#[derive(Debug, Clone)]
pub struct ColumnSplitter<'a> {
    text: &'a str,
    delimiter: char,
    // `text.len() + 1` once exhausted
    read_index: usize,
}

impl<'a> ColumnSplitter<'a> {
    /// Create a splitter positioned at the start of `text`
    pub fn new(text: &'a str, delimiter: char) -> Self {
        Self {
            text,
            delimiter,
            read_index: 0,
        }
    }

    /// Next token, or `None` once every token has been returned
    pub fn next_str(&mut self) -> Option<&'a str> {
        let text = self.text;
        let len = text.len();

        if self.read_index > len {
            return None;
        }
        if self.read_index == len {
            self.read_index = len + 1;
            return Some(&text[len..]);
        }

        let rest = &text[self.read_index..];
        match rest.find(self.delimiter) {
            Some(offset) => {
                self.read_index += offset + self.delimiter.len_utf8();
                Some(&rest[..offset])
            }
            None => {
                self.read_index = len + 1;
                Some(rest)
            }
        }
    }

    /// Next token converted with [`atoi`]
    pub fn next_int(&mut self) -> Option<i32> {
        self.next_str().map(atoi)
    }

    /// True once `next_str` has started returning `None`
    pub fn is_exhausted(&self) -> bool {
        self.read_index > self.text.len()
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }
}

impl<'a> Iterator for ColumnSplitter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_str()
    }
}

impl FusedIterator for ColumnSplitter<'_> {}

/// Permissive integer conversion with C `atoi` semantics
///
/// Leading ASCII whitespace is skipped, then an optional sign and the longest
/// run of digits are read. Anything after the digits is ignored, a token with
/// no digits converts to `0`, and out of range values saturate.
pub fn atoi(text: &str) -> i32 {
    let trimmed = text.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let limit = i64::from(i32::MAX) + 1;
    let mut value: i64 = 0;
    for digit in digits.bytes().take_while(|b| b.is_ascii_digit()) {
        value = (value * 10 + i64::from(digit - b'0')).min(limit);
    }
    if negative {
        value = -value;
    }

    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
