use futures::future::BoxFuture;
use uuid::Uuid;

use crate::bluray::Bluray;
use crate::errors::BackendError;

mod memory;

/// Persistence for the catalog. Implementations don't validate anything;
/// every `Bluray` they receive already satisfies its own rules.
pub trait Db {
    fn delete(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>>;

    fn exists(&self, id: &Uuid) -> BoxFuture<Result<bool, BackendError>>;

    fn insert(&self, bluray: &Bluray) -> BoxFuture<Result<(), BackendError>>;

    fn isbn_exists(&self, isbn: &str) -> BoxFuture<Result<bool, BackendError>>;

    fn retrieve(&self, id: &Uuid) -> BoxFuture<Result<Option<Bluray>, BackendError>>;

    /// Every record, ordered by title.
    fn retrieve_all(&self) -> BoxFuture<Result<Vec<Bluray>, BackendError>>;

    fn retrieve_by_isbn(&self, isbn: &str) -> BoxFuture<Result<Option<Bluray>, BackendError>>;

    /// Records whose title, director or ISBN contains `term`
    /// (case-sensitive), ordered by title.
    fn search(&self, term: &str) -> BoxFuture<Result<Vec<Bluray>, BackendError>>;

    /// Writes the editable fields and `last_modified`.
    fn update(&self, bluray: &Bluray) -> BoxFuture<Result<(), BackendError>>;
}

pub use self::memory::MemoryDb;
pub use self::postgres::*;

mod postgres {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::{
        self,
        postgres::{PgPool, PgRow},
    };
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::bluray::Bluray;
    use crate::errors::BackendError;
    use crate::genre::{Genre, UnknownGenre};

    const BLURAYS_ID_CONSTRAINT: &str = "blurays_primary_key";
    const BLURAYS_ISBN_CONSTRAINT: &str = "blurays_isbn";

    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn delete(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>> {
            let id = *id;

            async move {
                let query = sqlx::query(include_str!("queries/delete.sql"));

                let count = query
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    Err(BackendError::NonExistentId(id))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }

        fn exists(&self, id: &Uuid) -> BoxFuture<Result<bool, BackendError>> {
            let id = *id;

            async move {
                let query = sqlx::query_as::<_, (bool,)>(include_str!("queries/exists.sql"));

                let (exists,) = query
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(exists)
            }
            .boxed()
        }

        fn insert(&self, bluray: &Bluray) -> BoxFuture<Result<(), BackendError>> {
            let bluray = bluray.clone();

            async move {
                let query = sqlx::query(include_str!("queries/insert.sql"));

                query
                    .bind(bluray.id())
                    .bind(bluray.title())
                    .bind(bluray.director())
                    .bind(bluray.isbn())
                    .bind(bluray.release_year())
                    .bind(bluray.genre().as_str())
                    .bind(bluray.duration_minutes())
                    .bind(bluray.description())
                    .bind(bluray.studio())
                    .bind(bluray.date_added())
                    .bind(bluray.last_modified())
                    .execute(&self.pool)
                    .await
                    .map_err(|e| match map_sqlx_error(e) {
                        BackendError::IsbnAlreadyExists { .. } => BackendError::IsbnAlreadyExists {
                            isbn: bluray.isbn().to_owned(),
                        },
                        e => e,
                    })?;

                Ok(())
            }
            .boxed()
        }

        fn isbn_exists(&self, isbn: &str) -> BoxFuture<Result<bool, BackendError>> {
            let isbn = isbn.to_owned();

            async move {
                let query =
                    sqlx::query_as::<_, (bool,)>(include_str!("queries/isbn_exists.sql"));

                let (exists,) = query
                    .bind(isbn)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(exists)
            }
            .boxed()
        }

        fn retrieve(&self, id: &Uuid) -> BoxFuture<Result<Option<Bluray>, BackendError>> {
            let id = *id;

            async move {
                let query = sqlx::query(include_str!("queries/retrieve.sql"));

                let bluray = query
                    .bind(id)
                    .try_map(|row: PgRow| bluray_from_row(&row))
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(bluray)
            }
            .boxed()
        }

        fn retrieve_all(&self) -> BoxFuture<Result<Vec<Bluray>, BackendError>> {
            async move {
                let query = sqlx::query(include_str!("queries/retrieve_all.sql"));

                let blurays = query
                    .try_map(|row: PgRow| bluray_from_row(&row))
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(blurays)
            }
            .boxed()
        }

        fn retrieve_by_isbn(&self, isbn: &str) -> BoxFuture<Result<Option<Bluray>, BackendError>> {
            let isbn = isbn.to_owned();

            async move {
                let query = sqlx::query(include_str!("queries/retrieve_by_isbn.sql"));

                let bluray = query
                    .bind(isbn)
                    .try_map(|row: PgRow| bluray_from_row(&row))
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(bluray)
            }
            .boxed()
        }

        fn search(&self, term: &str) -> BoxFuture<Result<Vec<Bluray>, BackendError>> {
            let term = term.to_owned();

            async move {
                let query = sqlx::query(include_str!("queries/search.sql"));

                let blurays = query
                    .bind(term)
                    .try_map(|row: PgRow| bluray_from_row(&row))
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(blurays)
            }
            .boxed()
        }

        fn update(&self, bluray: &Bluray) -> BoxFuture<Result<(), BackendError>> {
            let bluray = bluray.clone();

            async move {
                let query = sqlx::query(include_str!("queries/update.sql"));

                let count = query
                    .bind(bluray.id())
                    .bind(bluray.title())
                    .bind(bluray.director())
                    .bind(bluray.genre().as_str())
                    .bind(bluray.duration_minutes())
                    .bind(bluray.description())
                    .bind(bluray.studio())
                    .bind(bluray.last_modified())
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    Err(BackendError::NonExistentId(bluray.id()))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }
    }

    fn bluray_from_row(row: &PgRow) -> Result<Bluray, sqlx::Error> {
        let genre: String = try_get(row, "genre")?;
        let genre: Genre = genre.parse().map_err(|UnknownGenre(genre)| {
            // only possible if someone edits the table by hand
            sqlx::Error::Decode(Box::new(BackendError::UnknownStoredGenre(genre)))
        })?;

        let date_added: OffsetDateTime = try_get(row, "date_added")?;
        let last_modified: Option<OffsetDateTime> = try_get(row, "last_modified")?;

        Ok(Bluray::restore(
            try_get(row, "id")?,
            try_get(row, "title")?,
            try_get(row, "director")?,
            try_get(row, "isbn")?,
            try_get(row, "release_year")?,
            genre,
            try_get(row, "duration_minutes")?,
            try_get(row, "description")?,
            try_get(row, "studio")?,
            date_added,
            last_modified,
        ))
    }

    fn try_get<'a, T: sqlx::Type<sqlx::Postgres> + sqlx::decode::Decode<'a, sqlx::Postgres>>(
        row: &'a PgRow,
        column: &str,
    ) -> Result<T, sqlx::Error> {
        use sqlx::prelude::*;

        row.try_get(column)
    }

    fn map_sqlx_error(error: sqlx::Error) -> BackendError {
        use sqlx::Error;

        match error {
            Error::Database(ref e) if e.constraint() == Some(BLURAYS_ID_CONSTRAINT) => {
                BackendError::IdAlreadyExists
            }
            Error::Database(ref e) if e.constraint() == Some(BLURAYS_ISBN_CONSTRAINT) => {
                BackendError::IsbnAlreadyExists {
                    isbn: String::new(),
                }
            }
            _ => BackendError::Sqlx { source: error },
        }
    }
}
