use std::convert::TryFrom;

use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::genre::{Genre, GenreInput};
use crate::validation::{self, IsbnPolicy, ValidationError};

/// A single disc in the catalog.
///
/// There is no public constructor: a `Bluray` only comes into being through
/// [`Bluray::create`] and only changes through [`Bluray::update`], so every
/// instance satisfies the field rules in [`crate::validation`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bluray {
    id: Uuid,

    /// Trimmed, at most 200 characters.
    title: String,

    /// Trimmed, at most 100 characters.
    director: String,

    /// Never changes after creation.
    isbn: String,

    /// Never changes after creation.
    release_year: i32,

    genre: Genre,

    duration_minutes: i32,

    description: Option<String>,

    studio: Option<String>,

    #[serde(serialize_with = "serialize_timestamp")]
    date_added: OffsetDateTime,

    /// Unset until the first update; always later than `date_added`.
    #[serde(serialize_with = "serialize_optional_timestamp")]
    last_modified: Option<OffsetDateTime>,
}

/// The fields supplied when adding a disc.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBluray {
    pub title: String,
    pub director: String,
    pub isbn: String,
    pub release_year: i32,
    pub genre: GenreInput,
    pub duration_minutes: i32,
}

/// The full set of editable fields. Absent `description` or `studio`
/// clears the stored value.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlurayChanges {
    pub title: String,
    pub director: String,
    pub genre: GenreInput,
    pub duration_minutes: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub studio: Option<String>,
}

impl Bluray {
    /// Validates `new` with the ISBN pattern check and assigns a fresh ID.
    pub fn create(new: NewBluray) -> Result<Bluray, ValidationError> {
        Bluray::create_with(new, IsbnPolicy::Pattern)
    }

    /// Like [`Bluray::create`], with the ISBN check chosen by the caller.
    pub fn create_with(new: NewBluray, policy: IsbnPolicy) -> Result<Bluray, ValidationError> {
        Bluray::create_at(new, policy, Uuid::new_v4(), now())
    }

    fn create_at(
        new: NewBluray,
        policy: IsbnPolicy,
        id: Uuid,
        now: OffsetDateTime,
    ) -> Result<Bluray, ValidationError> {
        // the order of these checks decides which error a client sees
        let title = validation::title(&new.title)?;
        let director = validation::director(&new.director)?;
        let isbn = validation::isbn_with(policy, &new.isbn)?;
        let release_year = validation::release_year(new.release_year, now.year())?;
        let genre = validation::genre(&new.genre)?;
        let duration_minutes = validation::duration_minutes(new.duration_minutes)?;

        Ok(Bluray {
            id,
            title,
            director,
            isbn,
            release_year,
            genre,
            duration_minutes,
            description: None,
            studio: None,
            date_added: now,
            last_modified: None,
        })
    }

    /// Replaces every editable field at once. On error nothing changes.
    pub fn update(&mut self, changes: BlurayChanges) -> Result<(), ValidationError> {
        self.update_at(changes, now())
    }

    fn update_at(
        &mut self,
        changes: BlurayChanges,
        now: OffsetDateTime,
    ) -> Result<(), ValidationError> {
        let title = validation::title(&changes.title)?;
        let director = validation::director(&changes.director)?;
        let genre = validation::genre(&changes.genre)?;
        let duration_minutes = validation::duration_minutes(changes.duration_minutes)?;
        let description = validation::description(changes.description)?;
        let studio = validation::studio(changes.studio)?;

        // two updates within one clock tick must still move forward
        let earliest = self.last_modified.unwrap_or(self.date_added) + Duration::microseconds(1);

        self.title = title;
        self.director = director;
        self.genre = genre;
        self.duration_minutes = duration_minutes;
        self.description = description;
        self.studio = studio;
        self.last_modified = Some(if now < earliest { earliest } else { now });

        Ok(())
    }

    /// Rebuilds a record read back from storage. Only the storage layer
    /// may call this; the values were validated when first written.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        id: Uuid,
        title: String,
        director: String,
        isbn: String,
        release_year: i32,
        genre: Genre,
        duration_minutes: i32,
        description: Option<String>,
        studio: Option<String>,
        date_added: OffsetDateTime,
        last_modified: Option<OffsetDateTime>,
    ) -> Self {
        Bluray {
            id,
            title,
            director,
            isbn,
            release_year,
            genre,
            duration_minutes,
            description,
            studio,
            date_added,
            last_modified,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn director(&self) -> &str {
        &self.director
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn release_year(&self) -> i32 {
        self.release_year
    }

    pub fn genre(&self) -> Genre {
        self.genre
    }

    pub fn duration_minutes(&self) -> i32 {
        self.duration_minutes
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn studio(&self) -> Option<&str> {
        self.studio.as_deref()
    }

    pub fn date_added(&self) -> OffsetDateTime {
        self.date_added
    }

    pub fn last_modified(&self) -> Option<OffsetDateTime> {
        self.last_modified
    }
}

/// The current time at the precision the database keeps.
pub(crate) fn now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();

    now - Duration::nanoseconds(i64::from(now.nanosecond() % 1_000))
}

/// Microseconds since the Unix epoch, the precision timestamps are kept at.
fn unix_micros(datetime: OffsetDateTime) -> Option<i64> {
    let micros = (datetime - OffsetDateTime::unix_epoch()).whole_microseconds();

    i64::try_from(micros).ok()
}

fn serialize_timestamp<S>(datetime: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let micros = unix_micros(*datetime)
        .ok_or_else(|| S::Error::custom(format!("{} is out of range", datetime)))?;

    serializer.serialize_i64(micros)
}

fn serialize_optional_timestamp<S>(
    datetime: &Option<OffsetDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match datetime {
        Some(datetime) => serialize_timestamp(datetime, serializer),
        None => serializer.serialize_none(),
    }
}
