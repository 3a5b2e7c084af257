//! The client-side progress store.
//!
//! [`ProgressStore`] owns the session's gameplay state. Every mutation that
//! changes persisted state fires the attached [`PushTrigger`]; the sync
//! layer coalesces those signals into debounced pushes. Server data
//! applied through [`ProgressStore::apply_server_profile`] or a local
//! [`ProgressStore::restore`] never fires a push.
//!
//! The store is shared as [`SharedStore`] so that UI code, the accrual
//! engine and the sync loops all serialize through one lock.

use std::collections::HashSet;
use std::sync::Arc;

use batoners_core::achievement::{Achievement, BALANCE_MILESTONES};
use batoners_core::card::OwnedCard;
use batoners_core::catalog::find_template;
use batoners_core::error::CoreError;
use batoners_core::league::League;
use batoners_core::player::{Player, ProgressSnapshot, DEFAULT_BATONS_PER_CLICK};
use batoners_core::skin::{default_skins, find_skin, Skin, COMMON_SKIN_ID};
use batoners_core::types::{now_millis, EpochMillis};
use batoners_core::validation::validate_amount;
use tokio::sync::{mpsc, Mutex};

/// The store as shared between the session and its background tasks.
pub type SharedStore = Arc<Mutex<ProgressStore>>;

/// Signals the debounced pusher that local state changed.
#[derive(Debug, Clone)]
pub struct PushTrigger(mpsc::UnboundedSender<()>);

impl PushTrigger {
    pub fn new(sender: mpsc::UnboundedSender<()>) -> Self {
        Self(sender)
    }

    /// A trigger and the receiver the pusher listens on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }

    fn fire(&self) {
        // A closed receiver means the session is shutting down.
        let _ = self.0.send(());
    }
}

#[derive(Debug)]
pub struct ProgressStore {
    telegram_id: Option<String>,
    username: Option<String>,
    progress: ProgressSnapshot,
    is_initialized: bool,
    is_syncing: bool,
    last_sync_time: Option<EpochMillis>,
    reached_milestones: HashSet<String>,
    pending_achievements: Vec<Achievement>,
    push: Option<PushTrigger>,
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressStore {
    /// Fresh local state: zero balance, full skin shop with only the common
    /// skin owned and equipped.
    pub fn new() -> Self {
        Self {
            telegram_id: None,
            username: None,
            progress: ProgressSnapshot {
                batons: 0.0,
                batons_per_click: DEFAULT_BATONS_PER_CLICK,
                passive_income: 0.0,
                cards: Vec::new(),
                skins: default_skins(),
                current_league: League::default(),
                current_skin: COMMON_SKIN_ID.to_string(),
            },
            is_initialized: false,
            is_syncing: false,
            last_sync_time: None,
            reached_milestones: HashSet::new(),
            pending_achievements: Vec::new(),
            push: None,
        }
    }

    pub fn with_push_trigger(mut self, trigger: PushTrigger) -> Self {
        self.push = Some(trigger);
        self
    }

    pub fn attach_push_trigger(&mut self, trigger: PushTrigger) {
        self.push = Some(trigger);
    }

    // ---- accessors ----

    pub fn telegram_id(&self) -> Option<&str> {
        self.telegram_id.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn batons(&self) -> f64 {
        self.progress.batons
    }

    pub fn batons_per_click(&self) -> f64 {
        self.progress.batons_per_click
    }

    pub fn passive_income(&self) -> f64 {
        self.progress.passive_income
    }

    pub fn current_league(&self) -> League {
        self.progress.current_league
    }

    pub fn current_skin(&self) -> &str {
        &self.progress.current_skin
    }

    pub fn cards(&self) -> &[OwnedCard] {
        &self.progress.cards
    }

    pub fn card(&self, id: &str) -> Option<&OwnedCard> {
        self.progress.cards.iter().find(|c| c.id == id)
    }

    pub fn skins(&self) -> &[Skin] {
        &self.progress.skins
    }

    pub fn skin(&self, id: &str) -> Option<&Skin> {
        self.progress.skins.iter().find(|s| s.id == id)
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    pub fn is_syncing(&self) -> bool {
        self.is_syncing
    }

    /// Epoch millis of the last successful exchange with the service.
    pub fn last_sync_time(&self) -> Option<EpochMillis> {
        self.last_sync_time
    }

    // ---- server and local state ----

    /// Adopt the login response: identity, server state and the
    /// achievements already recorded for this player.
    pub fn apply_login(&mut self, player: &Player, now: EpochMillis) {
        self.telegram_id = Some(player.telegram_id.clone());
        self.username = Some(player.username.clone());
        self.reached_milestones = player
            .achievements
            .iter()
            .filter(|a| a.completed)
            .map(|a| a.id.clone())
            .collect();
        self.apply_server_profile(player, now);
        self.is_initialized = true;
    }

    /// Overwrite gameplay state with a server document. Server wins.
    pub fn apply_server_profile(&mut self, player: &Player, now: EpochMillis) {
        self.progress = player.snapshot();
        self.normalize_skins();
        self.last_sync_time = Some(now);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.progress.clone()
    }

    /// Replace gameplay state with a locally persisted snapshot.
    pub fn restore(&mut self, snapshot: ProgressSnapshot) {
        self.progress = snapshot;
        self.normalize_skins();
    }

    /// Keep the common skin owned and the equipped skin among owned skins.
    fn normalize_skins(&mut self) {
        match self.progress.skins.iter_mut().find(|s| s.id == COMMON_SKIN_ID) {
            Some(common) => common.mark_owned(),
            None => {
                if let Some(common) = find_skin(COMMON_SKIN_ID) {
                    self.progress.skins.insert(0, common);
                }
            }
        }

        let equipped_owned = self
            .progress
            .skins
            .iter()
            .any(|s| s.id == self.progress.current_skin && s.owned);
        if !equipped_owned {
            tracing::warn!(
                skin = %self.progress.current_skin,
                "Equipped skin is not owned, falling back to common"
            );
            self.progress.current_skin = COMMON_SKIN_ID.to_string();
        }
    }

    // ---- sync bookkeeping ----

    /// Claim the in-flight slot for an explicit sync. Returns `false` if one
    /// is already running.
    pub fn try_begin_sync(&mut self) -> bool {
        if self.is_syncing {
            return false;
        }
        self.is_syncing = true;
        true
    }

    /// Release the sync slot; stamp the sync time when it succeeded.
    pub fn finish_sync(&mut self, succeeded_at: Option<EpochMillis>) {
        self.is_syncing = false;
        if let Some(at) = succeeded_at {
            self.last_sync_time = Some(at);
        }
    }

    /// Stamp a successful push or pull that did not go through the sync slot.
    pub fn record_sync(&mut self, at: EpochMillis) {
        self.last_sync_time = Some(at);
    }

    /// Milestones newly reached since the last call, as completed
    /// achievements. Each milestone is reported once per session.
    pub fn reached_milestones(&mut self) -> Vec<Achievement> {
        std::mem::take(&mut self.pending_achievements)
    }

    /// Put back milestones whose report failed so the next push retries them.
    pub fn requeue_achievements(&mut self, achievements: Vec<Achievement>) {
        for achievement in achievements {
            if !self.pending_achievements.iter().any(|a| a.id == achievement.id) {
                self.pending_achievements.push(achievement);
            }
        }
    }

    // ---- mutations ----

    /// Credit `amount` batons. Rejects negative or non-finite amounts.
    pub fn add_currency(&mut self, amount: f64) -> Result<(), CoreError> {
        let amount = validate_amount(amount)?;
        self.progress.batons += amount;
        self.check_milestones();
        self.schedule_push();
        Ok(())
    }

    /// Debit `amount` if the balance covers it. Returns whether it was spent.
    pub fn spend_currency(&mut self, amount: f64) -> bool {
        if validate_amount(amount).is_err() || self.progress.batons < amount {
            return false;
        }
        self.progress.batons -= amount;
        self.schedule_push();
        true
    }

    /// One tap: credit `batons_per_click`. Returns the amount credited.
    pub fn tap(&mut self) -> f64 {
        let amount = self.progress.batons_per_click;
        match self.add_currency(amount) {
            Ok(()) => amount,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring tap with invalid batons per click");
                0.0
            }
        }
    }

    pub fn collect_passive_income(&mut self) -> f64 {
        self.collect_passive_income_at(now_millis())
    }

    /// Collect every ready card at `now`. Returns the total credited.
    ///
    /// Cards still cooling down are untouched. A push is scheduled only if
    /// at least one card was collected.
    pub fn collect_passive_income_at(&mut self, now: EpochMillis) -> f64 {
        let mut total = 0.0;
        let mut collected = 0usize;
        for card in &mut self.progress.cards {
            if let Some(income) = card.collect(now) {
                total += income;
                collected += 1;
            }
        }

        if collected == 0 {
            return 0.0;
        }

        self.progress.batons += total;
        tracing::trace!(collected, total, "Collected passive income");
        self.check_milestones();
        self.schedule_push();
        total
    }

    /// Buy a level-1 card from the catalog. Fails if the template is
    /// unknown, already owned, or unaffordable.
    pub fn buy_card(&mut self, template_id: &str, now: EpochMillis) -> bool {
        let Some(template) = find_template(template_id) else {
            return false;
        };
        if self.card(template_id).is_some() || !self.spend_currency(template.cost) {
            return false;
        }
        self.progress
            .cards
            .push(OwnedCard::from_template(template, now));
        self.recompute_passive_income();
        true
    }

    /// Level up an owned card. No-op for unknown ids; never charges.
    pub fn upgrade_card(&mut self, card_id: &str) -> bool {
        let Some(card) = self.progress.cards.iter_mut().find(|c| c.id == card_id) else {
            return false;
        };
        card.upgrade();
        self.recompute_passive_income();
        self.schedule_push();
        true
    }

    /// Buy a skin. Catalog prices are authoritative; skins missing from the
    /// local list are taken from the catalog.
    pub fn purchase_skin(&mut self, skin_id: &str) -> bool {
        let catalog = find_skin(skin_id);
        let local = self.skin(skin_id).cloned();

        let (owned, price) = match (&local, &catalog) {
            (Some(skin), Some(shop)) => (skin.owned, shop.price),
            (Some(skin), None) => (skin.owned, skin.price),
            (None, Some(shop)) => (shop.owned, shop.price),
            (None, None) => return false,
        };
        if owned || !self.spend_currency(price) {
            return false;
        }

        match self.progress.skins.iter_mut().find(|s| s.id == skin_id) {
            Some(skin) => skin.mark_owned(),
            None => {
                if let Some(mut skin) = catalog {
                    skin.mark_owned();
                    self.progress.skins.push(skin);
                }
            }
        }
        true
    }

    /// Equip an owned skin. No-op if unknown or not owned.
    pub fn equip_skin(&mut self, skin_id: &str) -> bool {
        if !self.skin(skin_id).is_some_and(|s| s.owned) {
            return false;
        }
        self.progress.current_skin = skin_id.to_string();
        self.schedule_push();
        true
    }

    /// Set `passive_income` to the sum of owned card incomes.
    pub fn recompute_passive_income(&mut self) {
        self.progress.passive_income = self.progress.cards.iter().map(|c| c.passive_income).sum();
    }

    fn check_milestones(&mut self) {
        for &(id, threshold) in BALANCE_MILESTONES {
            if self.progress.batons >= threshold && self.reached_milestones.insert(id.to_string()) {
                tracing::info!(achievement = id, "Milestone reached");
                self.pending_achievements
                    .push(Achievement::completed(id, self.progress.batons));
            }
        }
    }

    fn schedule_push(&self) {
        if let Some(push) = &self.push {
            push.fire();
        }
    }
}
