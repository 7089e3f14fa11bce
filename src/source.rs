//! Fetch capability the catalog is populated from.

use async_trait::async_trait;

use crate::catalog::Entry;

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum FetchError {
    /// The transport could not reach the data source at all.
    #[error("request failed: {0}")]
    Unavailable(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("response parse error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait EntrySource: Send + Sync {
    async fn fetch_entry(&self, id: u16) -> Result<Entry, FetchError>;
}

/// Serves a fixed list of entries by id. Ids that are not present answer 404.
#[derive(Clone, Debug, Default)]
pub struct FixedSource {
    entries: Vec<Entry>,
    failing: Vec<(u16, FetchError)>,
    unreachable: bool,
}

impl FixedSource {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            failing: Vec::new(),
            unreachable: false,
        }
    }

    /// Every request fails at the transport level.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// Make a single id fail with `error`, even if an entry exists for it.
    pub fn with_failure(mut self, id: u16, error: FetchError) -> Self {
        self.failing.push((id, error));
        self
    }
}

#[async_trait]
impl EntrySource for FixedSource {
    async fn fetch_entry(&self, id: u16) -> Result<Entry, FetchError> {
        if self.unreachable {
            return Err(FetchError::Unavailable("connection refused".to_string()));
        }
        if let Some((_, error)) = self.failing.iter().find(|(failing, _)| *failing == id) {
            return Err(error.clone());
        }
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
            .ok_or(FetchError::Status(404))
    }
}
