//! Static card catalog.
//!
//! The catalog is compiled in and read-only at runtime. Owned cards refer
//! back to a template by `id`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rarity
// ---------------------------------------------------------------------------

/// Rarity tier shared by cards and skins. Ordered from least to most rare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }
}

// ---------------------------------------------------------------------------
// Card templates
// ---------------------------------------------------------------------------

/// An immutable purchasable upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub rarity: Rarity,
    /// Income granted per collection at level 1.
    pub base_income: f64,
    /// Seconds between collections.
    pub cooldown: u64,
    /// Purchase price in batons.
    pub cost: f64,
}

/// Every card available in the shop.
pub const CARD_TEMPLATES: &[CardTemplate] = &[
    CardTemplate {
        id: "baker",
        name: "Baker",
        description: "Bakes batons with love",
        rarity: Rarity::Common,
        base_income: 1.0,
        cooldown: 10,
        cost: 10.0,
    },
    CardTemplate {
        id: "bakery",
        name: "Bakery",
        description: "A small cosy bakery",
        rarity: Rarity::Rare,
        base_income: 5.0,
        cooldown: 30,
        cost: 50.0,
    },
    CardTemplate {
        id: "factory",
        name: "Factory",
        description: "Industrial baton production",
        rarity: Rarity::Epic,
        base_income: 20.0,
        cooldown: 60,
        cost: 200.0,
    },
];

/// Look up a card template by id.
pub fn find_template(id: &str) -> Option<&'static CardTemplate> {
    CARD_TEMPLATES.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_ids_are_unique() {
        for (i, a) in CARD_TEMPLATES.iter().enumerate() {
            for b in &CARD_TEMPLATES[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn find_known_template() {
        let baker = find_template("baker").expect("baker is in the catalog");
        assert_eq!(baker.base_income, 1.0);
        assert_eq!(baker.cooldown, 10);
        assert_eq!(baker.cost, 10.0);
    }

    #[test]
    fn find_unknown_template() {
        assert!(find_template("mill").is_none());
    }

    #[test]
    fn rarity_is_ordered() {
        assert!(Rarity::Common < Rarity::Rare);
        assert!(Rarity::Rare < Rarity::Epic);
        assert!(Rarity::Epic < Rarity::Legendary);
    }

    #[test]
    fn rarity_serializes_lowercase() {
        let json = serde_json::to_string(&Rarity::Legendary).unwrap();
        assert_eq!(json, "\"legendary\"");
    }
}
