//! Field rules for a Blu-ray record.
//!
//! Each function checks one field and returns its normalized value. The
//! error messages are shown to end users verbatim and clients match on
//! them, so their wording must not change.

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::genre::{Genre, GenreInput};
use crate::isbn::{Isbn, IsbnError};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_DIRECTOR_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
pub const MAX_STUDIO_LENGTH: usize = 100;
pub const MIN_RELEASE_YEAR: i32 = 1900;
pub const MIN_DURATION_MINUTES: i32 = 1;
pub const MAX_DURATION_MINUTES: i32 = 1000;

lazy_static! {
    static ref ISBN_PATTERN: Regex = Regex::new(r"^\d{10}$|^\d{13}$").expect("compile ISBN pattern");
}

/// A rejected field value. Checking stops at the first one.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title cannot exceed 200 characters")]
    TitleTooLong,

    #[error("Director cannot be empty")]
    EmptyDirector,

    #[error("Director cannot exceed 100 characters")]
    DirectorTooLong,

    #[error("ISBN cannot be empty")]
    EmptyIsbn,

    #[error("ISBN must be either 10 or 13 digits")]
    MalformedIsbn,

    /// Raised when the full checksum check is in force.
    #[error(transparent)]
    Isbn(#[from] IsbnError),

    #[error("Release year must be between 1900 and {current_year}")]
    ReleaseYearOutOfRange { current_year: i32 },

    #[error("Invalid genre")]
    InvalidGenre,

    #[error("Duration must be between 1 and 1000 minutes")]
    DurationOutOfRange,

    #[error("Description cannot exceed 500 characters")]
    DescriptionTooLong,

    #[error("Studio cannot exceed 100 characters")]
    StudioTooLong,
}

/// Which check an ISBN goes through when a record is created.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IsbnPolicy {
    /// Exactly 10 or 13 ASCII digits, stored as given.
    Pattern,

    /// [`Isbn::parse`]: separators stripped, trailing `X` allowed on an
    /// ISBN-10, check digit verified.
    Checksum,
}

impl Default for IsbnPolicy {
    fn default() -> Self {
        IsbnPolicy::Pattern
    }
}

impl FromStr for IsbnPolicy {
    type Err = UnknownIsbnPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pattern" => Ok(IsbnPolicy::Pattern),
            "checksum" => Ok(IsbnPolicy::Checksum),
            _ => Err(UnknownIsbnPolicy(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown ISBN policy {0:?} (expected `pattern` or `checksum`)")]
pub struct UnknownIsbnPolicy(pub String);

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

// lengths are measured before trimming
fn length(s: &str) -> usize {
    s.chars().count()
}

pub fn title(raw: &str) -> Result<String, ValidationError> {
    if is_blank(raw) {
        return Err(ValidationError::EmptyTitle);
    }

    if length(raw) > MAX_TITLE_LENGTH {
        return Err(ValidationError::TitleTooLong);
    }

    Ok(raw.trim().to_owned())
}

pub fn director(raw: &str) -> Result<String, ValidationError> {
    if is_blank(raw) {
        return Err(ValidationError::EmptyDirector);
    }

    if length(raw) > MAX_DIRECTOR_LENGTH {
        return Err(ValidationError::DirectorTooLong);
    }

    Ok(raw.trim().to_owned())
}

/// The pattern check: exactly 10 or 13 ASCII digits, nothing else.
pub fn isbn(raw: &str) -> Result<String, ValidationError> {
    if is_blank(raw) {
        return Err(ValidationError::EmptyIsbn);
    }

    // `\d` would also accept non-ASCII digits
    if !raw.is_ascii() || !ISBN_PATTERN.is_match(raw) {
        return Err(ValidationError::MalformedIsbn);
    }

    Ok(raw.to_owned())
}

/// The checksum check, returning the normalized ISBN.
pub fn checked_isbn(raw: &str) -> Result<String, ValidationError> {
    if is_blank(raw) {
        return Err(ValidationError::EmptyIsbn);
    }

    Ok(Isbn::parse(raw)?.into_inner())
}

pub fn isbn_with(policy: IsbnPolicy, raw: &str) -> Result<String, ValidationError> {
    match policy {
        IsbnPolicy::Pattern => isbn(raw),
        IsbnPolicy::Checksum => checked_isbn(raw),
    }
}

pub fn release_year(year: i32, current_year: i32) -> Result<i32, ValidationError> {
    if year < MIN_RELEASE_YEAR || year > current_year {
        return Err(ValidationError::ReleaseYearOutOfRange { current_year });
    }

    Ok(year)
}

pub fn genre(input: &GenreInput) -> Result<Genre, ValidationError> {
    match input {
        GenreInput::Known(genre) => Ok(*genre),
        GenreInput::Unknown(_) => Err(ValidationError::InvalidGenre),
    }
}

pub fn duration_minutes(minutes: i32) -> Result<i32, ValidationError> {
    if minutes < MIN_DURATION_MINUTES || minutes > MAX_DURATION_MINUTES {
        return Err(ValidationError::DurationOutOfRange);
    }

    Ok(minutes)
}

pub fn description(raw: Option<String>) -> Result<Option<String>, ValidationError> {
    match raw {
        Some(d) if length(&d) > MAX_DESCRIPTION_LENGTH => {
            Err(ValidationError::DescriptionTooLong)
        }
        other => Ok(other),
    }
}

pub fn studio(raw: Option<String>) -> Result<Option<String>, ValidationError> {
    match raw {
        Some(s) if length(&s) > MAX_STUDIO_LENGTH => Err(ValidationError::StudioTooLong),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn title_is_trimmed() {
        assert_eq!(title("  Heat \n"), Ok("Heat".to_owned()));
    }

    #[test]
    fn blank_titles_are_rejected() {
        for raw in &["", " ", "\t\n"] {
            let error = title(raw).unwrap_err();

            assert_eq!(error, ValidationError::EmptyTitle);
            assert_eq!(error.to_string(), "Title cannot be empty");
        }
    }

    #[test]
    fn title_length_limit_is_inclusive() {
        assert!(title(&"a".repeat(200)).is_ok());

        let error = title(&"a".repeat(201)).unwrap_err();
        assert_eq!(error.to_string(), "Title cannot exceed 200 characters");
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        assert!(title(&"é".repeat(200)).is_ok());
    }

    #[test]
    fn director_rules() {
        assert_eq!(director(" Michael Mann "), Ok("Michael Mann".to_owned()));
        assert_eq!(
            director("").unwrap_err().to_string(),
            "Director cannot be empty"
        );
        assert_eq!(
            director(&"d".repeat(101)).unwrap_err().to_string(),
            "Director cannot exceed 100 characters"
        );
    }

    #[test]
    fn isbn_pattern_rules() {
        assert_eq!(isbn("0747532699"), Ok("0747532699".to_owned()));
        assert_eq!(isbn("9780747532699"), Ok("9780747532699".to_owned()));

        assert_eq!(isbn("  ").unwrap_err().to_string(), "ISBN cannot be empty");

        for raw in &[
            "074753269",
            "07475326990",
            "074753269X",
            "0-7475-3269-9",
            " 0747532699",
            "٠٧٤٧٥٣٢٦٩٩",
        ] {
            assert_eq!(
                isbn(raw).unwrap_err().to_string(),
                "ISBN must be either 10 or 13 digits",
                "{:?}",
                raw
            );
        }
    }

    #[test]
    fn isbn_pattern_ignores_the_check_digit() {
        assert!(isbn("0747532690").is_ok());
    }

    #[test]
    fn checked_isbn_normalizes() {
        assert_eq!(
            checked_isbn("978-0-7475-3269-9"),
            Ok("9780747532699".to_owned())
        );
        assert_eq!(checked_isbn(" "), Err(ValidationError::EmptyIsbn));
        assert_eq!(
            checked_isbn("0747532690"),
            Err(ValidationError::Isbn(IsbnError::ChecksumMismatch))
        );
    }

    #[test]
    fn policies_parse_by_name() {
        assert_eq!("pattern".parse(), Ok(IsbnPolicy::Pattern));
        assert_eq!(" Checksum".parse(), Ok(IsbnPolicy::Checksum));
        assert_eq!(
            "strict".parse::<IsbnPolicy>(),
            Err(UnknownIsbnPolicy("strict".to_owned()))
        );
    }

    #[test]
    fn release_year_bounds() {
        assert_eq!(release_year(1900, 2026), Ok(1900));
        assert_eq!(release_year(2026, 2026), Ok(2026));

        let error = release_year(1899, 2026).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Release year must be between 1900 and 2026"
        );
        assert!(release_year(2027, 2026).is_err());
    }

    #[test]
    fn unknown_genre_is_invalid() {
        assert_eq!(genre(&GenreInput::Known(Genre::War)), Ok(Genre::War));
        assert_eq!(
            genre(&GenreInput::Unknown("Polka".to_owned()))
                .unwrap_err()
                .to_string(),
            "Invalid genre"
        );
    }

    #[test]
    fn duration_bounds() {
        assert_eq!(duration_minutes(1), Ok(1));
        assert_eq!(duration_minutes(1000), Ok(1000));

        for minutes in &[0, -5, 1001] {
            assert_eq!(
                duration_minutes(*minutes).unwrap_err().to_string(),
                "Duration must be between 1 and 1000 minutes"
            );
        }
    }

    #[test]
    fn optional_text_limits() {
        assert_eq!(description(None), Ok(None));
        assert!(description(Some("d".repeat(500))).is_ok());
        assert_eq!(
            description(Some("d".repeat(501))),
            Err(ValidationError::DescriptionTooLong)
        );

        assert!(studio(Some("s".repeat(100))).is_ok());
        assert_eq!(
            studio(Some("s".repeat(101))),
            Err(ValidationError::StudioTooLong)
        );
    }

    fn count_whitespace(s: impl AsRef<str>) -> usize {
        s.as_ref().chars().filter(|c| c.is_whitespace()).count()
    }

    proptest! {
        #[test]
        fn title_trimming_keeps_inner_whitespace(string in "\\S([^\\n]{0,100}\\S)?", space_before in "\\s{0,5}", space_after in "\\s{0,5}") {
            let raw = format!("{}{}{}", space_before, string, space_after);
            let normalized = title(&raw).unwrap();

            prop_assert!(!normalized.starts_with(char::is_whitespace) && !normalized.ends_with(char::is_whitespace), "{:?} (normalized form of {:?}) has no leading or trailing whitespace", normalized, raw);

            prop_assert_eq!(count_whitespace(&normalized), count_whitespace(&string), "{:?} (normalized form of {:?}) preserves inner whitespace", normalized, raw);
        }

        #[test]
        fn any_ten_or_thirteen_digits_pass_the_pattern(digits in "[0-9]{10}|[0-9]{13}") {
            prop_assert_eq!(isbn(&digits), Ok(digits.clone()));
        }
    }
}
