//! Input validation shared by the service handlers and the client store.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::player::ProgressUpdate;

/// Leaderboard page size when the query omits `limit`.
pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 100;
/// Largest leaderboard page a client may request.
pub const MAX_LEADERBOARD_LIMIT: i64 = 1000;

const MAX_USERNAME_LEN: usize = 64;
const MAX_TELEGRAM_ID_LEN: usize = 64;

/// Reject logins with a blank or oversized telegram id or username.
pub fn validate_login(telegram_id: &str, username: &str) -> Result<(), CoreError> {
    let telegram_id = telegram_id.trim();
    if telegram_id.is_empty() {
        return Err(CoreError::Validation("telegramId is required".into()));
    }
    if telegram_id.len() > MAX_TELEGRAM_ID_LEN {
        return Err(CoreError::Validation(format!(
            "telegramId must be at most {MAX_TELEGRAM_ID_LEN} characters"
        )));
    }
    validate_username(username)
}

fn validate_username(username: &str) -> Result<(), CoreError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(CoreError::Validation("username is required".into()));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(CoreError::Validation(format!(
            "username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    Ok(())
}

/// A currency amount must be finite and non-negative.
pub fn validate_amount(amount: f64) -> Result<f64, CoreError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(CoreError::Validation(format!(
            "amount must be a non-negative number, got {amount}"
        )));
    }
    Ok(amount)
}

/// Check the numeric fields of a `save-progress` body and that no card id
/// appears twice.
pub fn validate_progress_update(update: &ProgressUpdate) -> Result<(), CoreError> {
    for (field, value) in [
        ("batons", update.batons),
        ("batonsPerClick", update.batons_per_click),
        ("passiveIncome", update.passive_income),
    ] {
        if let Some(v) = value {
            validate_amount(v)
                .map_err(|_| CoreError::Validation(format!("{field} must be non-negative")))?;
        }
    }
    if let Some(cards) = &update.cards {
        let mut seen = HashSet::with_capacity(cards.len());
        if let Some(dup) = cards.iter().find(|c| !seen.insert(c.id.as_str())) {
            return Err(CoreError::Validation(format!(
                "cards must not repeat a card id: {}",
                dup.id
            )));
        }
    }
    if let Some(username) = &update.username {
        validate_username(username)?;
    }
    Ok(())
}

/// Apply the default and clamp a requested leaderboard size.
pub fn clamp_leaderboard_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::OwnedCard;
    use crate::catalog::find_template;
    use assert_matches::assert_matches;

    #[test]
    fn login_requires_both_fields() {
        assert!(validate_login("abc", "alice").is_ok());
        assert_matches!(validate_login("", "alice"), Err(CoreError::Validation(_)));
        assert_matches!(validate_login("abc", "   "), Err(CoreError::Validation(_)));
    }

    #[test]
    fn login_rejects_oversized_id() {
        let id = "9".repeat(65);
        assert_matches!(validate_login(&id, "alice"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn amount_rules() {
        assert_eq!(validate_amount(0.0).unwrap(), 0.0);
        assert_eq!(validate_amount(2.5).unwrap(), 2.5);
        assert!(validate_amount(-1.0).is_err());
        assert!(validate_amount(f64::NAN).is_err());
        assert!(validate_amount(f64::INFINITY).is_err());
    }

    #[test]
    fn negative_balance_update_rejected() {
        let update = ProgressUpdate {
            batons: Some(-5.0),
            ..ProgressUpdate::default()
        };
        assert_matches!(validate_progress_update(&update), Err(CoreError::Validation(_)));
    }

    #[test]
    fn repeated_card_id_rejected() {
        let baker = OwnedCard::from_template(find_template("baker").unwrap(), 0);
        let update = ProgressUpdate {
            cards: Some(vec![baker.clone(), baker.clone()]),
            ..ProgressUpdate::default()
        };
        assert_matches!(validate_progress_update(&update), Err(CoreError::Validation(_)));

        let update = ProgressUpdate {
            cards: Some(vec![baker]),
            ..ProgressUpdate::default()
        };
        assert!(validate_progress_update(&update).is_ok());
    }

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_leaderboard_limit(None), 100);
        assert_eq!(clamp_leaderboard_limit(Some(0)), 1);
        assert_eq!(clamp_leaderboard_limit(Some(5)), 5);
        assert_eq!(clamp_leaderboard_limit(Some(1_000_000)), 1000);
    }
}
