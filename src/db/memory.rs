use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::future::{self, BoxFuture};
use futures::FutureExt;
use uuid::Uuid;

use crate::bluray::Bluray;
use crate::errors::BackendError;

/// An in-process `Db`, for tests and for running without Postgres.
#[derive(Default)]
pub struct MemoryDb {
    blurays: RwLock<HashMap<Uuid, Bluray>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    // a panic mid-write can't leave a half-written record behind, so the
    // map is still usable after one
    fn read(&self) -> RwLockReadGuard<HashMap<Uuid, Bluray>> {
        self.blurays.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<HashMap<Uuid, Bluray>> {
        self.blurays.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn sorted<'a>(blurays: impl Iterator<Item = &'a Bluray>) -> Vec<Bluray> {
        let mut blurays = blurays.cloned().collect::<Vec<_>>();
        blurays.sort_by(|a, b| a.title().cmp(b.title()).then(a.id().cmp(&b.id())));
        blurays
    }
}

impl super::Db for MemoryDb {
    fn delete(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>> {
        let result = match self.write().remove(id) {
            Some(_) => Ok(()),
            None => Err(BackendError::NonExistentId(*id)),
        };

        future::ready(result).boxed()
    }

    fn exists(&self, id: &Uuid) -> BoxFuture<Result<bool, BackendError>> {
        future::ready(Ok(self.read().contains_key(id))).boxed()
    }

    fn insert(&self, bluray: &Bluray) -> BoxFuture<Result<(), BackendError>> {
        let mut blurays = self.write();

        let result = if blurays.contains_key(&bluray.id()) {
            Err(BackendError::IdAlreadyExists)
        } else if blurays.values().any(|b| b.isbn() == bluray.isbn()) {
            Err(BackendError::IsbnAlreadyExists {
                isbn: bluray.isbn().to_owned(),
            })
        } else {
            blurays.insert(bluray.id(), bluray.clone());
            Ok(())
        };

        future::ready(result).boxed()
    }

    fn isbn_exists(&self, isbn: &str) -> BoxFuture<Result<bool, BackendError>> {
        let exists = self.read().values().any(|b| b.isbn() == isbn);

        future::ready(Ok(exists)).boxed()
    }

    fn retrieve(&self, id: &Uuid) -> BoxFuture<Result<Option<Bluray>, BackendError>> {
        future::ready(Ok(self.read().get(id).cloned())).boxed()
    }

    fn retrieve_all(&self) -> BoxFuture<Result<Vec<Bluray>, BackendError>> {
        let blurays = Self::sorted(self.read().values());

        future::ready(Ok(blurays)).boxed()
    }

    fn retrieve_by_isbn(&self, isbn: &str) -> BoxFuture<Result<Option<Bluray>, BackendError>> {
        let bluray = self.read().values().find(|b| b.isbn() == isbn).cloned();

        future::ready(Ok(bluray)).boxed()
    }

    fn search(&self, term: &str) -> BoxFuture<Result<Vec<Bluray>, BackendError>> {
        let blurays = self.read();
        let matches = blurays.values().filter(|b| {
            b.title().contains(term) || b.director().contains(term) || b.isbn().contains(term)
        });

        future::ready(Ok(Self::sorted(matches))).boxed()
    }

    fn update(&self, bluray: &Bluray) -> BoxFuture<Result<(), BackendError>> {
        let result = match self.write().get_mut(&bluray.id()) {
            Some(existing) => {
                *existing = bluray.clone();
                Ok(())
            }
            None => Err(BackendError::NonExistentId(bluray.id())),
        };

        future::ready(result).boxed()
    }
}
