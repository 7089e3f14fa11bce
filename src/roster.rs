//! Two independently capped rosters that feed a battle.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{normalize_name, Catalog, Entry};

pub const ROSTER_CAPACITY: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::A, Side::B];

    pub fn label(self) -> &'static str {
        match self {
            Side::A => "Side A",
            Side::B => "Side B",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum RosterError {
    #[error("{side} already has {} pokemon", ROSTER_CAPACITY)]
    AtCapacity { side: Side },
    #[error("{name} is already on {side}")]
    Duplicate { side: Side, name: String },
    #[error("{name} is not in the pokedex")]
    NotFound { side: Side, name: String },
    #[error("{name} is not on {side}")]
    NotPresent { side: Side, name: String },
}

/// Ordered entry names. Order decides battle pairing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    members: Vec<String>,
}

impl Roster {
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= ROSTER_CAPACITY
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = normalize_name(name);
        self.members.iter().any(|member| *member == name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rosters {
    a: Roster,
    b: Roster,
}

impl Rosters {
    pub fn side(&self, side: Side) -> &Roster {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut Roster {
        match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        }
    }

    pub fn add(&mut self, side: Side, catalog: &Catalog, name: &str) -> Result<(), RosterError> {
        let name = normalize_name(name);
        let roster = self.side_mut(side);
        if roster.is_full() {
            return Err(RosterError::AtCapacity { side });
        }
        if roster.contains(&name) {
            return Err(RosterError::Duplicate { side, name });
        }
        if !catalog.contains(&name) {
            return Err(RosterError::NotFound { side, name });
        }
        debug!(%side, %name, "roster add");
        roster.members.push(name);
        Ok(())
    }

    pub fn remove(&mut self, side: Side, name: &str) -> Result<(), RosterError> {
        let name = normalize_name(name);
        let roster = self.side_mut(side);
        let Some(pos) = roster.members.iter().position(|member| *member == name) else {
            return Err(RosterError::NotPresent { side, name });
        };
        debug!(%side, %name, "roster remove");
        roster.members.remove(pos);
        Ok(())
    }

    pub fn members(&self, side: Side) -> &[String] {
        self.side(side).members()
    }

    /// Resolve a side's names against the catalog, preserving order.
    pub fn entries<'a>(&self, side: Side, catalog: &'a Catalog) -> Vec<&'a Entry> {
        self.members(side)
            .iter()
            .filter_map(|name| catalog.get(name))
            .collect()
    }

    pub fn clear(&mut self, side: Side) {
        self.side_mut(side).members.clear();
    }

    pub fn clear_all(&mut self) {
        for side in Side::ALL {
            self.clear(side);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty() && self.b.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Stat;

    const NAMES: [&str; 7] = [
        "bulbasaur",
        "ivysaur",
        "venusaur",
        "charmander",
        "charmeleon",
        "charizard",
        "squirtle",
    ];

    fn catalog() -> Catalog {
        Catalog::from_entries(NAMES.iter().enumerate().map(|(idx, name)| Entry {
            id: idx as u16 + 1,
            name: name.to_string(),
            height: 10,
            weight: 100,
            types: Vec::new(),
            stats: vec![Stat {
                name: "hp".to_string(),
                base_value: 50,
            }],
            sprite: None,
        }))
    }

    #[test]
    fn sixth_add_is_rejected_at_capacity() {
        let catalog = catalog();
        for side in Side::ALL {
            let mut rosters = Rosters::default();
            for name in &NAMES[..5] {
                assert_eq!(rosters.add(side, &catalog, name), Ok(()));
            }
            assert_eq!(
                rosters.add(side, &catalog, NAMES[5]),
                Err(RosterError::AtCapacity { side })
            );
            assert_eq!(rosters.members(side).len(), ROSTER_CAPACITY);
        }
    }

    #[test]
    fn capacity_is_checked_before_duplicates() {
        let catalog = catalog();
        let mut rosters = Rosters::default();
        for name in &NAMES[..5] {
            rosters.add(Side::A, &catalog, name).unwrap();
        }
        assert_eq!(
            rosters.add(Side::A, &catalog, NAMES[0]),
            Err(RosterError::AtCapacity { side: Side::A })
        );
    }

    #[test]
    fn duplicate_add_keeps_one_copy() {
        let catalog = catalog();
        let mut rosters = Rosters::default();
        rosters.add(Side::B, &catalog, "squirtle").unwrap();
        assert_eq!(
            rosters.add(Side::B, &catalog, "Squirtle"),
            Err(RosterError::Duplicate {
                side: Side::B,
                name: "squirtle".to_string()
            })
        );
        assert_eq!(rosters.members(Side::B), ["squirtle".to_string()]);
    }

    #[test]
    fn unknown_name_is_not_found() {
        let catalog = catalog();
        let mut rosters = Rosters::default();
        assert_eq!(
            rosters.add(Side::A, &catalog, "nonexistent-name"),
            Err(RosterError::NotFound {
                side: Side::A,
                name: "nonexistent-name".to_string()
            })
        );
        assert!(rosters.members(Side::A).is_empty());
    }

    #[test]
    fn sides_may_share_entries() {
        let catalog = catalog();
        let mut rosters = Rosters::default();
        rosters.add(Side::A, &catalog, "bulbasaur").unwrap();
        rosters.add(Side::B, &catalog, "bulbasaur").unwrap();
        assert_eq!(rosters.members(Side::A), rosters.members(Side::B));
    }

    #[test]
    fn remove_missing_is_not_present() {
        let catalog = catalog();
        let mut rosters = Rosters::default();
        assert_eq!(
            rosters.remove(Side::A, "bulbasaur"),
            Err(RosterError::NotPresent {
                side: Side::A,
                name: "bulbasaur".to_string()
            })
        );

        rosters.add(Side::A, &catalog, "ivysaur").unwrap();
        assert!(rosters.remove(Side::A, "bulbasaur").is_err());
        assert_eq!(rosters.members(Side::A), ["ivysaur".to_string()]);
    }

    #[test]
    fn remove_middle_preserves_order() {
        let catalog = catalog();
        let mut rosters = Rosters::default();
        for name in ["charmander", "bulbasaur", "squirtle"] {
            rosters.add(Side::A, &catalog, name).unwrap();
        }
        rosters.remove(Side::A, "bulbasaur").unwrap();

        let names: Vec<_> = rosters
            .entries(Side::A, &catalog)
            .iter()
            .map(|entry| entry.name.as_str())
            .collect();
        assert_eq!(names, vec!["charmander", "squirtle"]);
    }

    #[test]
    fn clear_all_empties_both_sides() {
        let catalog = catalog();
        let mut rosters = Rosters::default();
        rosters.add(Side::A, &catalog, "bulbasaur").unwrap();
        rosters.add(Side::B, &catalog, "ivysaur").unwrap();
        rosters.clear_all();
        assert!(rosters.is_empty());
    }
}
