//! Owned cards and their cooldown state machine.
//!
//! A card is either [`CooldownState::Accruing`] (waiting out its cooldown)
//! or [`CooldownState::Ready`]. Collecting a ready card pays its current
//! income as a flat amount and moves it back to `Accruing`.

use serde::{Deserialize, Serialize};

use crate::catalog::CardTemplate;
use crate::types::EpochMillis;

/// Factor applied to a card's current income on every upgrade.
///
/// Upgrades compound: after `n` upgrades income is `base * 1.5^n`.
pub const UPGRADE_MULTIPLIER: f64 = 1.5;

const MILLIS_PER_SEC: i64 = 1000;

/// Cooldown state of a single owned card at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownState {
    Accruing,
    Ready,
}

/// A purchased upgrade instance. At most one per template id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedCard {
    /// Template id from the catalog.
    pub id: String,
    pub name: String,
    pub level: u32,
    /// Batons paid per collection.
    pub passive_income: f64,
    /// Cooldown in seconds. Not affected by level.
    pub cooldown: u64,
    pub last_collected: EpochMillis,
}

impl OwnedCard {
    /// Create a level-1 card from a template, acquired at `now`.
    ///
    /// The card starts `Accruing`.
    pub fn from_template(template: &CardTemplate, now: EpochMillis) -> Self {
        Self {
            id: template.id.to_string(),
            name: template.name.to_string(),
            level: 1,
            passive_income: template.base_income,
            cooldown: template.cooldown,
            last_collected: now,
        }
    }

    pub fn cooldown_millis(&self) -> i64 {
        i64::try_from(self.cooldown)
            .unwrap_or(i64::MAX)
            .saturating_mul(MILLIS_PER_SEC)
    }

    /// Milliseconds since the last collection. Negative clock skew counts as zero.
    pub fn elapsed_at(&self, now: EpochMillis) -> i64 {
        now.saturating_sub(self.last_collected).max(0)
    }

    pub fn state_at(&self, now: EpochMillis) -> CooldownState {
        if self.elapsed_at(now) >= self.cooldown_millis() {
            CooldownState::Ready
        } else {
            CooldownState::Accruing
        }
    }

    pub fn is_ready(&self, now: EpochMillis) -> bool {
        self.state_at(now) == CooldownState::Ready
    }

    /// Fraction of the cooldown that has elapsed, in `0.0..=1.0`.
    pub fn progress_at(&self, now: EpochMillis) -> f64 {
        let cooldown = self.cooldown_millis();
        if cooldown == 0 {
            return 1.0;
        }
        (self.elapsed_at(now) as f64 / cooldown as f64).min(1.0)
    }

    /// Collect the card if it is ready.
    ///
    /// Returns the flat income paid (not scaled by elapsed time) and resets
    /// the collection clock, or `None` while the card is still accruing.
    pub fn collect(&mut self, now: EpochMillis) -> Option<f64> {
        if !self.is_ready(now) {
            return None;
        }
        self.last_collected = now;
        Some(self.passive_income)
    }

    /// Raise the level by one and compound the income.
    pub fn upgrade(&mut self) {
        self.level += 1;
        self.passive_income *= UPGRADE_MULTIPLIER;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_template;

    fn baker_at(now: EpochMillis) -> OwnedCard {
        OwnedCard::from_template(find_template("baker").unwrap(), now)
    }

    #[test]
    fn new_card_starts_accruing_at_level_one() {
        let card = baker_at(1_000);
        assert_eq!(card.level, 1);
        assert_eq!(card.passive_income, 1.0);
        assert_eq!(card.state_at(1_000), CooldownState::Accruing);
    }

    #[test]
    fn becomes_ready_exactly_at_cooldown() {
        let card = baker_at(0);
        assert_eq!(card.state_at(9_999), CooldownState::Accruing);
        assert_eq!(card.state_at(10_000), CooldownState::Ready);
    }

    #[test]
    fn collect_pays_flat_income_and_resets() {
        let mut card = baker_at(0);
        let now = 15_000;
        assert_eq!(card.collect(now), Some(1.0));
        assert_eq!(card.last_collected, now);
        assert_eq!(card.state_at(now), CooldownState::Accruing);
    }

    #[test]
    fn collect_while_accruing_is_none() {
        let mut card = baker_at(0);
        assert_eq!(card.collect(5_000), None);
        assert_eq!(card.last_collected, 0);
    }

    #[test]
    fn upgrade_compounds_income() {
        let mut card = baker_at(0);
        for _ in 0..4 {
            card.upgrade();
        }
        assert_eq!(card.level, 5);
        let expected = 1.0 * UPGRADE_MULTIPLIER.powi(4);
        assert!((card.passive_income - expected).abs() < 1e-9);
        assert_eq!(card.cooldown, 10, "cooldown does not depend on level");
    }

    #[test]
    fn clock_skew_counts_as_zero_elapsed() {
        let card = baker_at(50_000);
        assert_eq!(card.elapsed_at(10_000), 0);
        assert_eq!(card.progress_at(10_000), 0.0);
    }

    #[test]
    fn progress_is_capped_at_one() {
        let card = baker_at(0);
        assert_eq!(card.progress_at(5_000), 0.5);
        assert_eq!(card.progress_at(60_000), 1.0);
    }

    #[test]
    fn wire_format_is_camel_case() {
        let json = serde_json::to_value(baker_at(42)).unwrap();
        assert_eq!(json["lastCollected"], 42);
        assert_eq!(json["passiveIncome"], 1.0);
    }
}
