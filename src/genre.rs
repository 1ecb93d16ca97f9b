use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// The genres a disc can be filed under.
///
/// The declaration order is part of the wire format: clients may send a
/// genre by its zero-based index.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Biography,
    Comedy,
    Crime,
    Drama,
    Documentary,
    Family,
    Fantasy,
    FilmNoir,
    History,
    Horror,
    Music,
    Musical,
    Mystery,
    Romance,
    SciFi,
    Sport,
    Thriller,
    War,
    Western,
}

impl Genre {
    pub const ALL: [Genre; 22] = [
        Genre::Action,
        Genre::Adventure,
        Genre::Animation,
        Genre::Biography,
        Genre::Comedy,
        Genre::Crime,
        Genre::Drama,
        Genre::Documentary,
        Genre::Family,
        Genre::Fantasy,
        Genre::FilmNoir,
        Genre::History,
        Genre::Horror,
        Genre::Music,
        Genre::Musical,
        Genre::Mystery,
        Genre::Romance,
        Genre::SciFi,
        Genre::Sport,
        Genre::Thriller,
        Genre::War,
        Genre::Western,
    ];

    pub fn as_str(self) -> &'static str {
        use Genre::*;

        match self {
            Action => "Action",
            Adventure => "Adventure",
            Animation => "Animation",
            Biography => "Biography",
            Comedy => "Comedy",
            Crime => "Crime",
            Drama => "Drama",
            Documentary => "Documentary",
            Family => "Family",
            Fantasy => "Fantasy",
            FilmNoir => "FilmNoir",
            History => "History",
            Horror => "Horror",
            Music => "Music",
            Musical => "Musical",
            Mystery => "Mystery",
            Romance => "Romance",
            SciFi => "SciFi",
            Sport => "Sport",
            Thriller => "Thriller",
            War => "War",
            Western => "Western",
        }
    }

    pub fn from_index(index: i64) -> Option<Genre> {
        if index < 0 {
            return None;
        }

        Genre::ALL.get(index as usize).copied()
    }
}

impl FromStr for Genre {
    type Err = UnknownGenre;

    /// Matches genre names case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .iter()
            .copied()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownGenre(s.to_owned()))
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A genre name that is not one of [`Genre::ALL`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownGenre(pub String);

/// A genre as supplied by a client, before validation.
///
/// Unrecognized values are kept rather than rejected while deserializing,
/// so that the genre check runs in its proper place among the other field
/// checks.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GenreInput {
    Known(Genre),
    Unknown(String),
}

impl From<Genre> for GenreInput {
    fn from(genre: Genre) -> Self {
        GenreInput::Known(genre)
    }
}

impl<'de> Deserialize<'de> for GenreInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct GenreInputVisitor;

        impl<'de> Visitor<'de> for GenreInputVisitor {
            type Value = GenreInput;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a genre name or index")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<GenreInput, E> {
                Ok(v
                    .parse()
                    .map(GenreInput::Known)
                    .unwrap_or_else(|UnknownGenre(raw)| GenreInput::Unknown(raw)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<GenreInput, E> {
                Ok(Genre::from_index(v)
                    .map(GenreInput::Known)
                    .unwrap_or_else(|| GenreInput::Unknown(v.to_string())))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<GenreInput, E> {
                match i64::try_from(v) {
                    Ok(v) => self.visit_i64(v),
                    Err(_) => Ok(GenreInput::Unknown(v.to_string())),
                }
            }
        }

        deserializer.deserialize_any(GenreInputVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::{Genre, GenreInput, UnknownGenre};

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!("scifi".parse(), Ok(Genre::SciFi));
        assert_eq!(" FilmNoir ".parse(), Ok(Genre::FilmNoir));
        assert_eq!(
            "Opera".parse::<Genre>(),
            Err(UnknownGenre("Opera".to_owned()))
        );
    }

    #[test]
    fn indices_follow_declaration_order() {
        assert_eq!(Genre::from_index(0), Some(Genre::Action));
        assert_eq!(Genre::from_index(17), Some(Genre::SciFi));
        assert_eq!(Genre::from_index(21), Some(Genre::Western));
        assert_eq!(Genre::from_index(22), None);
        assert_eq!(Genre::from_index(-1), None);
    }

    #[test]
    fn every_genre_round_trips_through_its_name() {
        for genre in Genre::ALL.iter().copied() {
            assert_eq!(genre.as_str().parse(), Ok(genre));
        }
    }

    #[test]
    fn input_keeps_unknown_values() {
        let parsed: Vec<GenreInput> =
            serde_json::from_str(r#"["Drama", 3, "Polka", 99, -4]"#).unwrap();

        assert_eq!(
            parsed,
            vec![
                GenreInput::Known(Genre::Drama),
                GenreInput::Known(Genre::Biography),
                GenreInput::Unknown("Polka".to_owned()),
                GenreInput::Unknown("99".to_owned()),
                GenreInput::Unknown("-4".to_owned()),
            ]
        );
    }

    #[test]
    fn genres_serialize_by_name() {
        assert_eq!(serde_json::to_string(&Genre::SciFi).unwrap(), "\"SciFi\"");
    }
}
