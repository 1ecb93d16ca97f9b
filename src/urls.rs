use url::Url;
use uuid::Uuid;

/// Convenience wrapper for URL generation functions.
#[derive(Clone)]
pub struct Urls {
    /// Top-level URL, including trailing slash.
    base: Url,

    /// Path segment for all catalog actions.
    pub(crate) blurays_path: String,
}

impl Urls {
    /// Create a new instance. `blurays_path` should be a single path
    /// segment without slashes.
    pub fn new(base: Url, blurays_path: impl Into<String>) -> Self {
        Urls {
            base,
            blurays_path: blurays_path.into(),
        }
    }

    /// Like [`Urls::new`], parsing `base` first.
    pub fn parse(
        base: impl AsRef<str>,
        blurays_path: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(base.as_ref())?, blurays_path))
    }

    pub fn bluray(&self, id: &Uuid) -> Url {
        let mut url = self.base.clone();
        let id = id.to_string();
        url.path_segments_mut()
            .map(|mut segments| {
                segments
                    .pop_if_empty()
                    .extend(&[self.blurays_path.as_str(), "id", id.as_str()]);
            })
            .ok();
        url
    }
}
