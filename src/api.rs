//! PokeAPI client

use std::sync::OnceLock;

use async_trait::async_trait;
use serde::Deserialize;

use crate::catalog::{Entry, Stat};
use crate::source::{EntrySource, FetchError};

pub const API_BASE: &str = "https://pokeapi.co/api/v2";

#[derive(Clone, Debug, Deserialize)]
struct NamedResource {
    name: String,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u16,
    name: String,
    height: u16,
    weight: u16,
    types: Vec<PokemonTypeSlot>,
    stats: Vec<PokemonStatSlot>,
    sprites: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u16,
    stat: NamedResource,
}

impl From<PokemonResponse> for Entry {
    fn from(response: PokemonResponse) -> Self {
        Entry {
            id: response.id,
            name: response.name,
            height: response.height,
            weight: response.weight,
            types: response
                .types
                .into_iter()
                .map(|slot| slot.kind.name)
                .collect(),
            stats: response
                .stats
                .into_iter()
                .map(|slot| Stat {
                    name: slot.stat.name,
                    base_value: slot.base_stat,
                })
                .collect(),
            sprite: pointer_string(&response.sprites, "/front_default"),
        }
    }
}

/// Fetches entries with `GET {base}/pokemon/{id}`, one request per entry.
#[derive(Clone, Debug)]
pub struct PokeApiSource {
    base_url: String,
}

impl PokeApiSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn pokemon_url(&self, id: u16) -> String {
        format!("{}/pokemon/{id}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl EntrySource for PokeApiSource {
    async fn fetch_entry(&self, id: u16) -> Result<Entry, FetchError> {
        let response = http_client()
            .get(self.pokemon_url(id))
            .send()
            .await
            .map_err(|err| FetchError::Unavailable(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body: PokemonResponse = response
            .json()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))?;
        Ok(body.into())
    }
}

pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, String> {
    let response = http_client()
        .get(url)
        .send()
        .await
        .map_err(|err| err.to_string())?;
    let response = response.error_for_status().map_err(|err| err.to_string())?;
    let bytes = response.bytes().await.map_err(|err| err.to_string())?;
    Ok(bytes.to_vec())
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pokemon_response_maps_to_entry() {
        let json = serde_json::json!({
            "id": 25,
            "name": "pikachu",
            "height": 4,
            "weight": 60,
            "types": [{ "slot": 1, "type": { "name": "electric", "url": "" } }],
            "stats": [
                { "base_stat": 35, "effort": 0, "stat": { "name": "hp", "url": "" } },
                { "base_stat": 55, "effort": 0, "stat": { "name": "attack", "url": "" } }
            ],
            "sprites": { "front_default": "https://example.test/25.png", "back_default": null }
        });
        let response: PokemonResponse = serde_json::from_value(json).expect("valid response");
        let entry = Entry::from(response);

        assert_eq!(entry.id, 25);
        assert_eq!(entry.types, vec!["electric".to_string()]);
        assert_eq!(entry.power(), 90);
        assert_eq!(entry.sprite.as_deref(), Some("https://example.test/25.png"));
    }

    #[test]
    fn null_sprite_is_absent() {
        let sprites = serde_json::json!({ "front_default": null });
        assert_eq!(pointer_string(&sprites, "/front_default"), None);
    }

    #[test]
    fn pokemon_url_trims_trailing_slash() {
        let source = PokeApiSource::new("http://localhost:8080/api/v2/");
        assert_eq!(source.pokemon_url(7), "http://localhost:8080/api/v2/pokemon/7");
    }

    #[test]
    fn each_source_keeps_its_own_base() {
        let public = PokeApiSource::new(API_BASE);
        let local = PokeApiSource::new("http://127.0.0.1:9000");
        assert_eq!(public.pokemon_url(1), "https://pokeapi.co/api/v2/pokemon/1");
        assert_eq!(local.pokemon_url(1), "http://127.0.0.1:9000/pokemon/1");
    }
}
