//! Catalog store: every fetched entry, keyed by lower-cased name.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::source::{EntrySource, FetchError};

/// Size of the first-generation catalog.
pub const CATALOG_SIZE: u16 = 151;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub name: String,
    pub base_value: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: u16,
    pub name: String,
    pub height: u16,
    pub weight: u16,
    pub types: Vec<String>,
    pub stats: Vec<Stat>,
    pub sprite: Option<String>,
}

impl Entry {
    /// Sum of all base stats. Battles compare this value.
    pub fn power(&self) -> u32 {
        self.stats.iter().map(|stat| u32::from(stat.base_value)).sum()
    }

    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }
}

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum CatalogError {
    #[error("pokemon data unavailable: {0}")]
    DataUnavailable(String),
    #[error("pokemon not found: {0}")]
    NotFound(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub id: u16,
    pub reason: String,
}

/// Outcome of one population run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogLoad {
    pub catalog: Catalog,
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Fetch ids `1..=limit` one after another and keep every entry that loads.
    ///
    /// Only a transport failure on the very first record is fatal; anything
    /// else is recorded in [`CatalogLoad::skipped`] and the run continues.
    pub async fn populate<S>(source: &S, limit: u16) -> Result<CatalogLoad, CatalogError>
    where
        S: EntrySource + ?Sized,
    {
        info!(limit, "populating catalog");
        let mut catalog = Catalog::default();
        let mut skipped = Vec::new();

        for id in 1..=limit {
            match source.fetch_entry(id).await {
                Ok(entry) => {
                    let name = normalize_name(&entry.name);
                    if !catalog.insert(entry) {
                        warn!(id, %name, "duplicate pokemon name, skipping");
                        skipped.push(SkippedEntry {
                            id,
                            reason: format!("duplicate name {name}"),
                        });
                    } else {
                        debug!(id, %name, "catalog entry loaded");
                    }
                }
                Err(FetchError::Unavailable(reason)) if id == 1 => {
                    warn!(%reason, "pokemon data source unreachable");
                    return Err(CatalogError::DataUnavailable(reason));
                }
                Err(err) => {
                    warn!(id, error = %err, "skipping pokemon");
                    skipped.push(SkippedEntry {
                        id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            loaded = catalog.len(),
            skipped = skipped.len(),
            "catalog populated"
        );
        Ok(CatalogLoad { catalog, skipped })
    }

    /// Build a catalog from already-fetched entries. Later duplicates are dropped.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut catalog = Catalog::default();
        for entry in entries {
            catalog.insert(entry);
        }
        catalog
    }

    fn insert(&mut self, mut entry: Entry) -> bool {
        entry.name = normalize_name(&entry.name);
        if self.index.contains_key(&entry.name) {
            return false;
        }
        self.index.insert(entry.name.clone(), self.entries.len());
        self.entries.push(entry);
        true
    }

    pub fn lookup(&self, name: &str) -> Result<&Entry, CatalogError> {
        self.get(name)
            .ok_or_else(|| CatalogError::NotFound(name.trim().to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.position(name).and_then(|idx| self.entries.get(idx))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Insertion index of `name`, which is also its row in the catalog list.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&normalize_name(name)).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry_at(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// "mr-mime" -> "Mr Mime"
pub fn display_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
                None => "".to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u16, name: &str) -> Entry {
        Entry {
            id,
            name: name.to_string(),
            height: 7,
            weight: 69,
            types: vec!["grass".to_string()],
            stats: vec![
                Stat {
                    name: "hp".to_string(),
                    base_value: 45,
                },
                Stat {
                    name: "attack".to_string(),
                    base_value: 49,
                },
            ],
            sprite: None,
        }
    }

    #[test]
    fn names_keep_insertion_order() {
        let catalog = Catalog::from_entries([entry(4, "charmander"), entry(1, "bulbasaur")]);
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, vec!["charmander", "bulbasaur"]);
    }

    #[test]
    fn lookup_normalizes_case_and_whitespace() {
        let catalog = Catalog::from_entries([entry(1, "Bulbasaur")]);
        assert_eq!(catalog.lookup("  BULBASAUR ").map(|e| e.id), Ok(1));
        assert_eq!(catalog.position("bulbasaur"), Some(0));
    }

    #[test]
    fn lookup_miss_is_not_found() {
        let catalog = Catalog::from_entries([entry(1, "bulbasaur")]);
        assert_eq!(
            catalog.lookup("missingno"),
            Err(CatalogError::NotFound("missingno".to_string()))
        );
    }

    #[test]
    fn duplicate_names_keep_first_entry() {
        let catalog = Catalog::from_entries([entry(1, "bulbasaur"), entry(99, "BULBASAUR")]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("bulbasaur").map(|e| e.id), Some(1));
    }

    #[test]
    fn power_sums_base_stats() {
        assert_eq!(entry(1, "bulbasaur").power(), 94);
    }

    #[test]
    fn display_name_capitalizes_each_part() {
        assert_eq!(display_name("mr-mime"), "Mr Mime");
        assert_eq!(display_name("pikachu"), "Pikachu");
    }
}
