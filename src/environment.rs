use std::sync::Arc;

use log::Logger;

use crate::db::Db;
use crate::urls::Urls;
use crate::validation::IsbnPolicy;

#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub db: Arc<dyn Db + Send + Sync>,
    pub urls: Arc<Urls>,
    pub config: Config,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        db: Arc<dyn Db + Send + Sync>,
        urls: Arc<Urls>,
        config: Config,
    ) -> Self {
        Self {
            logger,
            db,
            urls,
            config,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    pub(crate) isbn_policy: IsbnPolicy,
}

impl Config {
    pub fn new(isbn_policy: IsbnPolicy) -> Self {
        Self { isbn_policy }
    }
}
