//! Cell conversion and `;` separated struct cells

use crate::error::{Error, Result};
use crate::splitter::{atoi, ColumnSplitter};

/// Field delimiter inside a struct cell
pub const STRUCT_DELIMITER: char = ';';

/// A value that can be parsed from the text of one cell or list element
pub trait FromCell: Sized {
    fn from_cell(text: &str) -> Result<Self>;
}

impl FromCell for i32 {
    fn from_cell(text: &str) -> Result<Self> {
        Ok(atoi(text))
    }
}

impl FromCell for String {
    fn from_cell(text: &str) -> Result<Self> {
        Ok(text.to_string())
    }
}

/// Strict integer conversion: the whole token must be a decimal `i32`
pub fn parse_int_strict(text: &str) -> Result<i32> {
    text.trim()
        .parse()
        .map_err(|_| Error::InvalidInteger(text.to_string()))
}

/// Reads the fields of a struct cell in declaration order
///
/// ```
/// use tbl_core::cell::{FromCell, StructCell};
///
/// struct Range {
///     min: i32,
///     max: i32,
/// }
///
/// impl FromCell for Range {
///     fn from_cell(text: &str) -> tbl_core::Result<Self> {
///         let mut fields = StructCell::new(text);
///         let range = Range {
///             min: fields.next_int()?,
///             max: fields.next_int()?,
///         };
///         fields.finish()?;
///         Ok(range)
///     }
/// }
///
/// let range = Range::from_cell("3;9").unwrap();
/// assert_eq!((range.min, range.max), (3, 9));
/// assert!(Range::from_cell("3").is_err());
/// assert!(Range::from_cell("3;9;1").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct StructCell<'a> {
    fields: ColumnSplitter<'a>,
    read: usize,
}

impl<'a> StructCell<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            fields: ColumnSplitter::new(text, STRUCT_DELIMITER),
            read: 0,
        }
    }

    /// Next field as text
    pub fn next_str(&mut self) -> Result<&'a str> {
        let field = self
            .fields
            .next_str()
            .ok_or(Error::MissingField { index: self.read })?;
        self.read += 1;
        Ok(field)
    }

    /// Next field with permissive integer conversion
    pub fn next_int(&mut self) -> Result<i32> {
        self.next_str().map(atoi)
    }

    /// Next field parsed by its own `FromCell` implementation
    pub fn next_value<T: FromCell>(&mut self) -> Result<T> {
        T::from_cell(self.next_str()?)
    }

    /// Fail if the cell has fields that were not read
    pub fn finish(mut self) -> Result<()> {
        match self.fields.next_str() {
            Some(_) => Err(Error::TrailingField {
                expected: self.read,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Reward {
        item: i32,
        count: i32,
        label: String,
    }

    impl FromCell for Reward {
        fn from_cell(text: &str) -> Result<Self> {
            let mut fields = StructCell::new(text);
            let reward = Reward {
                item: fields.next_int()?,
                count: fields.next_int()?,
                label: fields.next_str()?.to_string(),
            };
            fields.finish()?;
            Ok(reward)
        }
    }

    #[test]
    fn test_struct_cell_fields() {
        let reward = Reward::from_cell("1001;5;gold").unwrap();
        assert_eq!(
            reward,
            Reward {
                item: 1001,
                count: 5,
                label: "gold".to_string()
            }
        );
    }

    #[test]
    fn test_struct_cell_empty_trailing_field() {
        let reward = Reward::from_cell("1;2;").unwrap();
        assert_eq!(reward.label, "");
    }

    #[test]
    fn test_struct_cell_missing_field() {
        let err = Reward::from_cell("1;2").unwrap_err();
        assert!(matches!(err, Error::MissingField { index: 2 }));
    }

    #[test]
    fn test_struct_cell_trailing_field() {
        let err = Reward::from_cell("1;2;x;y").unwrap_err();
        assert!(matches!(err, Error::TrailingField { expected: 3 }));
    }

    #[test]
    fn test_empty_cell_is_one_empty_field() {
        let mut fields = StructCell::new("");
        assert_eq!(fields.next_int().unwrap(), 0);
        assert!(fields.finish().is_ok());
    }

    #[test]
    fn test_next_value() {
        let mut fields = StructCell::new("7;seven");
        assert_eq!(fields.next_value::<i32>().unwrap(), 7);
        assert_eq!(fields.next_value::<String>().unwrap(), "seven");
        assert!(fields.finish().is_ok());
    }

    #[test]
    fn test_parse_int_strict() {
        assert_eq!(parse_int_strict("42").unwrap(), 42);
        assert_eq!(parse_int_strict(" -5 ").unwrap(), -5);
        assert!(matches!(
            parse_int_strict("4x"),
            Err(Error::InvalidInteger(token)) if token == "4x"
        ));
        assert!(parse_int_strict("").is_err());
    }
}
