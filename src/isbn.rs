use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons an ISBN can be rejected by [`Isbn::parse`].
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum IsbnError {
    #[error("ISBN cannot be empty")]
    EmptyInput,

    #[error("ISBN must have 10 or 13 characters")]
    InvalidLength,

    #[error("ISBN can only contain digits, and 'X' as the last character of an ISBN-10")]
    InvalidCharacters,

    #[error("Invalid ISBN: checksum mismatch")]
    ChecksumMismatch,
}

/// The two ISBN forms.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IsbnKind {
    Isbn10,
    Isbn13,
}

/// A checksum-validated ISBN, stored without separators.
///
/// ```
/// use backend::isbn::Isbn;
///
/// let isbn: Isbn = "978-0-7475-3269-9".parse().unwrap();
/// assert_eq!(isbn.as_str(), "9780747532699");
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Isbn(String);

impl Isbn {
    /// Strips whitespace and hyphens from `raw`, then checks the length,
    /// the characters and the check digit.
    pub fn parse(raw: impl AsRef<str>) -> Result<Isbn, IsbnError> {
        let cleaned: String = raw
            .as_ref()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        if cleaned.is_empty() {
            return Err(IsbnError::EmptyInput);
        }

        let length = cleaned.chars().count();

        if length != 10 && length != 13 {
            return Err(IsbnError::InvalidLength);
        }

        // the character checks only let ASCII through, so from here on
        // bytes and characters line up
        let bytes = cleaned.as_bytes();

        let valid = if length == 10 {
            isbn10_is_valid(check_isbn10_characters(bytes)?)
        } else {
            isbn13_is_valid(check_isbn13_characters(bytes)?)
        };

        if valid {
            Ok(Isbn(cleaned))
        } else {
            Err(IsbnError::ChecksumMismatch)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> IsbnKind {
        if self.0.len() == 10 {
            IsbnKind::Isbn10
        } else {
            IsbnKind::Isbn13
        }
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

fn check_isbn10_characters(bytes: &[u8]) -> Result<&[u8], IsbnError> {
    let (last, body) = bytes.split_last().ok_or(IsbnError::InvalidLength)?;

    if bytes.len() == 10
        && body.iter().all(u8::is_ascii_digit)
        && (last.is_ascii_digit() || *last == b'X')
    {
        Ok(bytes)
    } else {
        Err(IsbnError::InvalidCharacters)
    }
}

fn check_isbn13_characters(bytes: &[u8]) -> Result<&[u8], IsbnError> {
    if bytes.len() == 13 && bytes.iter().all(u8::is_ascii_digit) {
        Ok(bytes)
    } else {
        Err(IsbnError::InvalidCharacters)
    }
}

fn digit(b: u8) -> u32 {
    u32::from(b - b'0')
}

/// Weights 10 down to 2 over the first nine digits; the last position
/// counts 10 for `X`.
fn isbn10_is_valid(bytes: &[u8]) -> bool {
    let body: u32 = bytes[..9]
        .iter()
        .enumerate()
        .map(|(i, &b)| (10 - i as u32) * digit(b))
        .sum();

    let check = match bytes[9] {
        b'X' => 10,
        b => digit(b),
    };

    (body + check) % 11 == 0
}

/// Weights alternate 1, 3, 1, 3… over the first twelve digits.
fn isbn13_is_valid(bytes: &[u8]) -> bool {
    let sum: u32 = bytes[..12]
        .iter()
        .enumerate()
        .map(|(i, &b)| if i % 2 == 0 { digit(b) } else { 3 * digit(b) })
        .sum();

    (10 - sum % 10) % 10 == digit(bytes[12])
}

impl FromStr for Isbn {
    type Err = IsbnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Isbn::parse(s)
    }
}

impl TryFrom<String> for Isbn {
    type Error = IsbnError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Isbn::parse(s)
    }
}

impl From<Isbn> for String {
    fn from(isbn: Isbn) -> Self {
        isbn.0
    }
}

impl AsRef<str> for Isbn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
