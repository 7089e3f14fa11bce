//! Catalog population against an in-memory source.

use pokedex::catalog::{Catalog, CatalogError, Entry, SkippedEntry, Stat};
use pokedex::source::{FetchError, FixedSource};
use pretty_assertions::assert_eq;

fn pokemon(id: u16, name: &str) -> Entry {
    Entry {
        id,
        name: name.to_string(),
        height: 10,
        weight: 100,
        types: vec!["normal".to_string()],
        stats: vec![Stat {
            name: "hp".to_string(),
            base_value: 50,
        }],
        sprite: None,
    }
}

fn first_five() -> Vec<Entry> {
    vec![
        pokemon(1, "bulbasaur"),
        pokemon(2, "ivysaur"),
        pokemon(3, "venusaur"),
        pokemon(4, "charmander"),
        pokemon(5, "charmeleon"),
    ]
}

#[tokio::test]
async fn populates_in_fetch_order() {
    let source = FixedSource::new(first_five());

    let load = Catalog::populate(&source, 5).await.unwrap();

    assert!(load.skipped.is_empty());
    assert_eq!(
        load.catalog.names().collect::<Vec<_>>(),
        vec!["bulbasaur", "ivysaur", "venusaur", "charmander", "charmeleon"]
    );
    assert_eq!(load.catalog.lookup("Charmander").map(|e| e.id), Ok(4));
}

#[tokio::test]
async fn limit_bounds_the_ids_requested() {
    let source = FixedSource::new(first_five());
    let load = Catalog::populate(&source, 2).await.unwrap();
    assert_eq!(load.catalog.len(), 2);
}

#[tokio::test]
async fn failing_ids_are_skipped_and_reported() {
    let source = FixedSource::new(first_five())
        .with_failure(2, FetchError::Status(500))
        .with_failure(4, FetchError::Decode("missing field `stats`".to_string()));

    let load = Catalog::populate(&source, 6).await.unwrap();

    assert_eq!(
        load.catalog.names().collect::<Vec<_>>(),
        vec!["bulbasaur", "venusaur", "charmeleon"]
    );
    assert_eq!(
        load.skipped,
        vec![
            SkippedEntry {
                id: 2,
                reason: "unexpected status 500".to_string(),
            },
            SkippedEntry {
                id: 4,
                reason: "response parse error: missing field `stats`".to_string(),
            },
            SkippedEntry {
                id: 6,
                reason: "unexpected status 404".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn unreachable_source_is_data_unavailable() {
    let source = FixedSource::unreachable();

    let result = Catalog::populate(&source, 151).await;

    assert_eq!(
        result,
        Err(CatalogError::DataUnavailable("connection refused".to_string()))
    );
}

#[tokio::test]
async fn transport_failure_after_first_record_is_skipped() {
    let source = FixedSource::new(first_five())
        .with_failure(3, FetchError::Unavailable("connection reset".to_string()));

    let load = Catalog::populate(&source, 5).await.unwrap();

    assert_eq!(load.catalog.len(), 4);
    assert_eq!(load.skipped.len(), 1);
    assert_eq!(load.skipped[0].id, 3);
    assert!(!load.catalog.contains("venusaur"));
}

#[tokio::test]
async fn duplicate_names_are_skipped() {
    let mut entries = first_five();
    entries.push(pokemon(6, "Bulbasaur"));
    let source = FixedSource::new(entries);

    let load = Catalog::populate(&source, 6).await.unwrap();

    assert_eq!(load.catalog.len(), 5);
    assert_eq!(load.skipped.len(), 1);
    assert_eq!(load.skipped[0].reason, "duplicate name bulbasaur");
}
