//! Cosmetic skins.
//!
//! Ownership is monotonic: a skin can be bought once and never reverts to
//! unowned. The common skin is owned by every new profile and is the
//! default equipped skin.

use serde::{Deserialize, Serialize};

use crate::catalog::Rarity;

/// Id of the skin every profile starts with.
pub const COMMON_SKIN_ID: &str = "common";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skin {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    /// Purchase price in batons. Older server documents omit it.
    #[serde(default)]
    pub price: f64,
    pub owned: bool,
}

impl Skin {
    fn catalog(id: &str, name: &str, rarity: Rarity, price: f64, owned: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            rarity,
            price,
            owned,
        }
    }

    /// Mark the skin as owned. Never clears ownership.
    pub fn mark_owned(&mut self) {
        self.owned = true;
    }
}

/// The full skin shop, with only the common skin owned.
pub fn default_skins() -> Vec<Skin> {
    vec![
        Skin::catalog(COMMON_SKIN_ID, "Classic baton", Rarity::Common, 0.0, true),
        Skin::catalog("rare", "French baguette", Rarity::Rare, 1_000.0, false),
        Skin::catalog("epic", "Rainbow baton", Rarity::Epic, 10_000.0, false),
        Skin::catalog("legendary", "Golden baton", Rarity::Legendary, 100_000.0, false),
    ]
}

/// Skins seeded into a freshly created server profile.
pub fn starter_skins() -> Vec<Skin> {
    default_skins().into_iter().filter(|s| s.owned).collect()
}

/// Look up a shop skin by id.
pub fn find_skin(id: &str) -> Option<Skin> {
    default_skins().into_iter().find(|s| s.id == id)
}
