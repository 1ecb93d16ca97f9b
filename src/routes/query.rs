use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub term: String,
}
