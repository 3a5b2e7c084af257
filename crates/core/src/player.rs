//! The per-player document and its projections.
//!
//! [`Player`] is the full stored document. [`ProgressSnapshot`] is the
//! persistable gameplay subset pushed by the client and kept in local
//! storage. [`ProgressUpdate`] is the partial form accepted by
//! `save-progress`: absent fields keep their stored value.

use serde::{Deserialize, Serialize};

use crate::achievement::Achievement;
use crate::card::OwnedCard;
use crate::league::League;
use crate::skin::{starter_skins, Skin, COMMON_SKIN_ID};
use crate::types::Timestamp;

/// Batons earned per tap on a new profile.
pub const DEFAULT_BATONS_PER_CLICK: f64 = 1.0;

// ---------------------------------------------------------------------------
// Player document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// External identity, unique across all players.
    pub telegram_id: String,
    pub username: String,
    pub batons: f64,
    pub batons_per_click: f64,
    pub passive_income: f64,
    pub current_league: League,
    pub current_skin: String,
    pub cards: Vec<OwnedCard>,
    pub skins: Vec<Skin>,
    pub achievements: Vec<Achievement>,
    pub last_active: Timestamp,
    pub created_at: Timestamp,
}

impl Player {
    /// A fresh profile: zero balance, bronze league, the common skin owned
    /// and equipped, no cards.
    pub fn new(telegram_id: &str, username: &str, now: Timestamp) -> Self {
        Self {
            telegram_id: telegram_id.to_string(),
            username: username.to_string(),
            batons: 0.0,
            batons_per_click: DEFAULT_BATONS_PER_CLICK,
            passive_income: 0.0,
            current_league: League::default(),
            current_skin: COMMON_SKIN_ID.to_string(),
            cards: Vec::new(),
            skins: starter_skins(),
            achievements: Vec::new(),
            last_active: now,
            created_at: now,
        }
    }

    /// Replace every field present in `update` and touch `last_active`.
    pub fn apply_update(&mut self, update: ProgressUpdate, now: Timestamp) {
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(batons) = update.batons {
            self.batons = batons;
        }
        if let Some(batons_per_click) = update.batons_per_click {
            self.batons_per_click = batons_per_click;
        }
        if let Some(passive_income) = update.passive_income {
            self.passive_income = passive_income;
        }
        if let Some(league) = update.current_league {
            self.current_league = league;
        }
        if let Some(skin) = update.current_skin {
            self.current_skin = skin;
        }
        if let Some(cards) = update.cards {
            self.cards = cards;
        }
        if let Some(skins) = update.skins {
            self.skins = skins;
        }
        self.last_active = now;
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            batons: self.batons,
            batons_per_click: self.batons_per_click,
            passive_income: self.passive_income,
            cards: self.cards.clone(),
            skins: self.skins.clone(),
            current_league: self.current_league,
            current_skin: self.current_skin.clone(),
        }
    }

    pub fn leaderboard_entry(&self) -> LeaderboardEntry {
        LeaderboardEntry {
            username: self.username.clone(),
            batons: self.batons,
            current_league: self.current_league,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots and updates
// ---------------------------------------------------------------------------

/// Gameplay state that is pushed to the server and kept locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub batons: f64,
    pub batons_per_click: f64,
    pub passive_income: f64,
    pub cards: Vec<OwnedCard>,
    pub skins: Vec<Skin>,
    pub current_league: League,
    pub current_skin: String,
}

impl ProgressSnapshot {
    /// Full-replacement update carrying every snapshot field.
    pub fn into_update(self) -> ProgressUpdate {
        ProgressUpdate {
            username: None,
            batons: Some(self.batons),
            batons_per_click: Some(self.batons_per_click),
            passive_income: Some(self.passive_income),
            current_league: Some(self.current_league),
            current_skin: Some(self.current_skin),
            cards: Some(self.cards),
            skins: Some(self.skins),
        }
    }
}

/// Body of `save-progress`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batons: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batons_per_click: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passive_income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_league: Option<League>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_skin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<OwnedCard>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skins: Option<Vec<Skin>>,
}

/// Public leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub username: String,
    pub batons: f64,
    pub current_league: League,
}
