//! In-memory fakes for service tests
//!
//! `FakeStore` implements every repository port against one locked state
//! map, mirroring the transactional semantics of the real SQL (conditional
//! debits, claim guards, guarded status transitions). `FakeGateway` records
//! deliveries and can be told to fail or block specific sends.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use tokio::sync::Semaphore;

use numhub_core::entities::{
    reasons, Advertisement, AuditLogEntry, BroadcastRun, BroadcastStatus, Country, CountryCounts,
    CountryOverview, MandatoryChannel, NewAdvertisement, NewCountry, NewNumber, NewProof, NewUser,
    Number, PointsEntry, ProGrant, ProMethod, ProSubscription, Proof, PurgeCounts, User, UserStats,
};
use numhub_core::error::DomainError;
use numhub_core::traits::{
    AdvertisementRepository, BroadcastRepository, ChannelRepository, ChatTarget, CountryRepository,
    GatewayError, GatewayResult, LedgerRepository, MaintenanceRepository, MembershipStatus,
    MessageRef, MessagingGateway, NumberRepository, ProofRepository, RepoResult,
    SettingsRepository, UserRepository,
};
use numhub_core::value_objects::{AdId, AudienceFilter, CountryId, NumberId, UserId};

use super::context::ServiceContext;

const MAX_ERRORS_LEN: usize = 4000;

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    history: Vec<PointsEntry>,
    subscriptions: Vec<ProSubscription>,
    countries: HashMap<CountryId, Country>,
    numbers: Vec<Number>,
    settings: HashMap<String, String>,
    ads: HashMap<AdId, Advertisement>,
    runs: HashMap<String, BroadcastRun>,
    channels: Vec<MandatoryChannel>,
    proofs: Vec<Proof>,
    audit: Vec<AuditLogEntry>,
    next_country_id: i32,
    next_number_id: i64,
    next_ad_id: i32,
    next_row_id: i64,
}

fn blank_user(id: UserId) -> User {
    let now = Utc::now();
    User {
        id,
        username: None,
        first_name: None,
        last_name: None,
        joined_at: now,
        notified_admin: false,
        banned: false,
        points: 0,
        invited_by: None,
        daily_bonus_claimed: None,
        is_pro: false,
        pro_expiry: None,
        total_invites: 0,
        proofs_submitted: 0,
        last_activity: now,
    }
}

/// In-memory implementation of every repository port
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<State>,
}

impl FakeStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn push_history(state: &mut State, user: UserId, delta: i64, reason: &str) {
        state.next_row_id += 1;
        state.history.push(PointsEntry {
            id: state.next_row_id,
            user_id: user,
            delta,
            reason: reason.to_string(),
            created_at: Utc::now(),
        });
    }

    // === Seeding / inspection helpers ===

    pub fn put_user(&self, id: UserId) {
        self.lock().users.insert(id, blank_user(id));
    }

    pub fn user(&self, id: UserId) -> User {
        self.lock().users.get(&id).cloned().expect("user seeded")
    }

    pub fn set_banned(&self, id: UserId, banned: bool) {
        self.lock().users.get_mut(&id).expect("user seeded").banned = banned;
    }

    pub fn make_pro(&self, id: UserId) {
        let mut state = self.lock();
        let user = state.users.get_mut(&id).expect("user seeded");
        user.is_pro = true;
        user.pro_expiry = Some(Utc::now() + ChronoDuration::days(30));
    }

    /// Shift the user's stored expiry `age` into the past while leaving
    /// the stale PRO flag set
    pub fn expire_pro(&self, id: UserId, age: ChronoDuration) {
        let mut state = self.lock();
        let user = state.users.get_mut(&id).expect("user seeded");
        user.is_pro = true;
        user.pro_expiry = Some(Utc::now() - age);
    }

    pub fn backdate_daily_bonus(&self, id: UserId, days: i64) {
        let mut state = self.lock();
        let user = state.users.get_mut(&id).expect("user seeded");
        user.daily_bonus_claimed = user
            .daily_bonus_claimed
            .map(|d| d - ChronoDuration::days(days));
    }

    pub fn history_sum(&self, id: UserId) -> i64 {
        self.lock()
            .history
            .iter()
            .filter(|e| e.user_id == id)
            .map(|e| e.delta)
            .sum()
    }

    pub fn put_setting(&self, key: &str, value: &str) {
        self.lock().settings.insert(key.to_string(), value.to_string());
    }

    pub fn put_country(&self, name: &str) -> CountryId {
        let mut state = self.lock();
        state.next_country_id += 1;
        let id = CountryId::new(state.next_country_id);
        state.countries.insert(
            id,
            Country {
                id,
                name: name.to_string(),
                flag: None,
                platform: "Telegram".to_string(),
                activation_channel: None,
                is_active: true,
                created_at: Utc::now(),
            },
        );
        id
    }

    pub fn put_number(&self, country: CountryId, digits: &str) -> NumberId {
        let new = NewNumber::classified(digits, None, None);
        let mut state = self.lock();
        state.next_number_id += 1;
        let id = NumberId::new(state.next_number_id);
        state.numbers.push(Number {
            id,
            country_id: country,
            digits: new.digits,
            platform: new.platform,
            added_by: new.added_by,
            added_at: Utc::now(),
            is_premium: new.is_premium,
            premium_pattern: new.premium_pattern,
            times_used: 0,
            last_used: None,
        });
        id
    }

    pub fn times_used(&self, id: NumberId) -> i32 {
        self.lock()
            .numbers
            .iter()
            .find(|n| n.id == id)
            .expect("number seeded")
            .times_used
    }

    pub fn put_ad(&self, ad: NewAdvertisement) -> AdId {
        let mut state = self.lock();
        state.next_ad_id += 1;
        let id = AdId::new(state.next_ad_id);
        state.ads.insert(
            id,
            Advertisement {
                id,
                title: ad.title,
                content: ad.content,
                created_by: ad.created_by,
                created_at: Utc::now(),
                sent_to: 0,
                is_active: true,
                target_audience: ad.target_audience,
            },
        );
        id
    }

    pub fn ad(&self, id: AdId) -> Advertisement {
        self.lock().ads.get(&id).cloned().expect("ad seeded")
    }

    pub fn deactivate_ad(&self, id: AdId) {
        self.lock().ads.get_mut(&id).expect("ad seeded").is_active = false;
    }

    pub fn put_channel(&self, channel: &str, require_join: bool) {
        let mut state = self.lock();
        state.next_row_id += 1;
        let id = state.next_row_id as i32;
        state.channels.push(MandatoryChannel {
            id,
            channel: channel.to_string(),
            is_group: false,
            require_join_for_points: require_join,
        });
    }

    pub fn proof_count(&self) -> usize {
        self.lock().proofs.len()
    }

    /// Shift every historical row `days` into the past, for retention
    /// tests
    pub fn age_all_history(&self, days: i64) {
        let shift = ChronoDuration::days(days);
        let mut state = self.lock();
        for entry in &mut state.history {
            entry.created_at -= shift;
        }
        for proof in &mut state.proofs {
            proof.posted_at -= shift;
        }
        for entry in &mut state.audit {
            entry.created_at -= shift;
        }
    }

    pub fn audit_count(&self) -> usize {
        self.lock().audit.len()
    }
}

#[async_trait]
impl UserRepository for FakeStore {
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn create_if_absent(&self, user: &NewUser) -> RepoResult<bool> {
        let mut state = self.lock();
        if state.users.contains_key(&user.id) {
            return Ok(false);
        }
        let mut row = blank_user(user.id);
        row.username = user.username.clone();
        row.first_name = user.first_name.clone();
        row.last_name = user.last_name.clone();
        state.users.insert(user.id, row);
        Ok(true)
    }

    async fn set_banned(&self, id: UserId, banned: bool) -> RepoResult<()> {
        let mut state = self.lock();
        let user = state
            .users
            .get_mut(&id)
            .ok_or(DomainError::UserNotFound(id))?;
        user.banned = banned;
        Ok(())
    }

    async fn set_invited_by(&self, id: UserId, inviter: UserId) -> RepoResult<bool> {
        let mut state = self.lock();
        let user = state
            .users
            .get_mut(&id)
            .ok_or(DomainError::UserNotFound(id))?;
        if user.invited_by.is_some() {
            return Ok(false);
        }
        user.invited_by = Some(inviter);
        if let Some(inviter_row) = state.users.get_mut(&inviter) {
            inviter_row.total_invites += 1;
        }
        Ok(true)
    }

    async fn mark_notified(&self, id: UserId) -> RepoResult<()> {
        if let Some(user) = self.lock().users.get_mut(&id) {
            user.notified_admin = true;
        }
        Ok(())
    }

    async fn stats(&self, id: UserId) -> RepoResult<Option<UserStats>> {
        Ok(self.lock().users.get(&id).map(|u| UserStats {
            points: u.points,
            is_pro: u.is_pro,
            pro_expiry: u.pro_expiry,
        }))
    }

    async fn top_by_points(&self, limit: i64) -> RepoResult<Vec<User>> {
        let mut users: Vec<User> = self
            .lock()
            .users
            .values()
            .filter(|u| u.points > 0 && !u.banned)
            .cloned()
            .collect();
        users.sort_by(|a, b| b.points.cmp(&a.points));
        users.truncate(limit as usize);
        Ok(users)
    }

    async fn audience(
        &self,
        filter: AudienceFilter,
        after: Option<UserId>,
    ) -> RepoResult<Vec<UserId>> {
        let floor = after.unwrap_or(UserId::new(i64::MIN));
        let mut ids: Vec<UserId> = self
            .lock()
            .users
            .values()
            .filter(|u| !u.banned && u.id > floor)
            .filter(|u| match filter {
                AudienceFilter::All => true,
                AudienceFilter::Pro => u.is_pro,
                AudienceFilter::WithPoints => u.points > 0,
            })
            .map(|u| u.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn count(&self) -> RepoResult<i64> {
        Ok(self.lock().users.len() as i64)
    }
}

#[async_trait]
impl LedgerRepository for FakeStore {
    async fn add_points(&self, id: UserId, delta: i64, reason: &str) -> RepoResult<()> {
        let mut state = self.lock();
        let user = state
            .users
            .get_mut(&id)
            .ok_or(DomainError::UserNotFound(id))?;
        user.points += delta;
        user.last_activity = Utc::now();
        Self::push_history(&mut state, id, delta, reason);
        Ok(())
    }

    async fn claim_daily_bonus(
        &self,
        id: UserId,
        points: i64,
        today: NaiveDate,
    ) -> RepoResult<bool> {
        let mut state = self.lock();
        let user = state
            .users
            .get_mut(&id)
            .ok_or(DomainError::UserNotFound(id))?;
        if user.daily_bonus_claimed.is_some_and(|last| last >= today) {
            return Ok(false);
        }
        user.points += points;
        user.daily_bonus_claimed = Some(today);
        Self::push_history(&mut state, id, points, reasons::DAILY_BONUS);
        Ok(true)
    }

    async fn grant_pro(&self, grant: &ProGrant) -> RepoResult<()> {
        let mut state = self.lock();
        let user = state
            .users
            .get_mut(&grant.user_id)
            .ok_or(DomainError::UserNotFound(grant.user_id))?;

        if grant.method == ProMethod::Points && grant.points_cost > 0 {
            if user.points < grant.points_cost {
                return Err(DomainError::InsufficientPoints {
                    required: grant.points_cost,
                    available: user.points,
                });
            }
            user.points -= grant.points_cost;
        }
        user.is_pro = true;
        user.pro_expiry = Some(grant.expires_at);

        if grant.method == ProMethod::Points && grant.points_cost > 0 {
            Self::push_history(&mut state, grant.user_id, -grant.points_cost, reasons::PRO_PURCHASE);
        }

        for sub in &mut state.subscriptions {
            if sub.user_id == grant.user_id {
                sub.is_active = false;
            }
        }
        state.next_row_id += 1;
        let sub = ProSubscription {
            id: state.next_row_id,
            user_id: grant.user_id,
            method: grant.method,
            points_paid: grant.points_cost,
            days: grant.days,
            started_at: Utc::now(),
            expires_at: grant.expires_at,
            is_active: true,
        };
        state.subscriptions.push(sub);
        Ok(())
    }

    async fn revoke_pro(&self, id: UserId) -> RepoResult<()> {
        let mut state = self.lock();
        if let Some(user) = state.users.get_mut(&id) {
            user.is_pro = false;
            user.pro_expiry = None;
        }
        for sub in &mut state.subscriptions {
            if sub.user_id == id {
                sub.is_active = false;
            }
        }
        Ok(())
    }

    async fn expired_pro_users(&self, now: DateTime<Utc>) -> RepoResult<Vec<UserId>> {
        Ok(self
            .lock()
            .users
            .values()
            .filter(|u| u.is_pro && u.pro_expiry.is_some_and(|e| e < now))
            .map(|u| u.id)
            .collect())
    }

    async fn history(&self, id: UserId, limit: i64) -> RepoResult<Vec<PointsEntry>> {
        let mut entries: Vec<PointsEntry> = self
            .lock()
            .history
            .iter()
            .filter(|e| e.user_id == id)
            .cloned()
            .collect();
        entries.reverse();
        entries.truncate(limit as usize);
        Ok(entries)
    }

    async fn has_entry_with_reason(&self, id: UserId, reason: &str) -> RepoResult<bool> {
        Ok(self
            .lock()
            .history
            .iter()
            .any(|e| e.user_id == id && e.reason == reason))
    }

    async fn active_subscription(&self, id: UserId) -> RepoResult<Option<ProSubscription>> {
        Ok(self
            .lock()
            .subscriptions
            .iter()
            .rev()
            .find(|s| s.user_id == id && s.is_active)
            .cloned())
    }

    async fn points_distributed(&self) -> RepoResult<i64> {
        Ok(self
            .lock()
            .history
            .iter()
            .filter(|e| e.delta > 0)
            .map(|e| e.delta)
            .sum())
    }
}

#[async_trait]
impl CountryRepository for FakeStore {
    async fn find_by_id(&self, id: CountryId) -> RepoResult<Option<Country>> {
        Ok(self.lock().countries.get(&id).cloned())
    }

    async fn overview(&self) -> RepoResult<Vec<CountryOverview>> {
        let state = self.lock();
        let mut overview: Vec<CountryOverview> = state
            .countries
            .values()
            .filter(|c| c.is_active)
            .map(|c| CountryOverview {
                id: c.id,
                name: c.name.clone(),
                flag: c.flag.clone(),
                platform: c.platform.clone(),
                activation_channel: c.activation_channel.clone(),
                available_count: state.numbers.iter().filter(|n| n.country_id == c.id).count()
                    as i64,
            })
            .collect();
        overview.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(overview)
    }

    async fn counts(&self, id: CountryId) -> RepoResult<CountryCounts> {
        let state = self.lock();
        let total = state.numbers.iter().filter(|n| n.country_id == id).count() as i64;
        let premium = state
            .numbers
            .iter()
            .filter(|n| n.country_id == id && n.is_premium)
            .count() as i64;
        Ok(CountryCounts { total, premium })
    }

    async fn create(&self, country: &NewCountry) -> RepoResult<CountryId> {
        let mut state = self.lock();
        if state.countries.values().any(|c| c.name == country.name) {
            return Err(DomainError::CountryExists(country.name.clone()));
        }
        state.next_country_id += 1;
        let id = CountryId::new(state.next_country_id);
        state.countries.insert(
            id,
            Country {
                id,
                name: country.name.clone(),
                flag: country.flag.clone(),
                platform: country.platform.clone(),
                activation_channel: country.activation_channel.clone(),
                is_active: true,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn toggle_active(&self, id: CountryId) -> RepoResult<bool> {
        let mut state = self.lock();
        let country = state
            .countries
            .get_mut(&id)
            .ok_or(DomainError::CountryNotFound(id))?;
        country.is_active = !country.is_active;
        Ok(country.is_active)
    }

    async fn set_activation_channel(&self, id: CountryId, channel: &str) -> RepoResult<()> {
        let mut state = self.lock();
        let country = state
            .countries
            .get_mut(&id)
            .ok_or(DomainError::CountryNotFound(id))?;
        country.activation_channel = Some(channel.to_string());
        Ok(())
    }
}

#[async_trait]
impl NumberRepository for FakeStore {
    async fn find_by_id(&self, id: NumberId) -> RepoResult<Option<Number>> {
        Ok(self.lock().numbers.iter().find(|n| n.id == id).cloned())
    }

    async fn insert(&self, country: CountryId, number: &NewNumber) -> RepoResult<bool> {
        let mut state = self.lock();
        if state
            .numbers
            .iter()
            .any(|n| n.country_id == country && n.digits == number.digits)
        {
            return Ok(false);
        }
        state.next_number_id += 1;
        let id = NumberId::new(state.next_number_id);
        state.numbers.push(Number {
            id,
            country_id: country,
            digits: number.digits.clone(),
            platform: number.platform.clone(),
            added_by: number.added_by,
            added_at: Utc::now(),
            is_premium: number.is_premium,
            premium_pattern: number.premium_pattern,
            times_used: 0,
            last_used: None,
        });
        Ok(true)
    }

    async fn insert_batch(&self, country: CountryId, batch: &[NewNumber]) -> RepoResult<u64> {
        let mut inserted = 0;
        for number in batch {
            if NumberRepository::insert(self, country, number).await? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn candidate_ids(
        &self,
        country: CountryId,
        premium_only: bool,
    ) -> RepoResult<Vec<NumberId>> {
        let mut ids: Vec<NumberId> = self
            .lock()
            .numbers
            .iter()
            .filter(|n| n.country_id == country && (!premium_only || n.is_premium))
            .map(|n| n.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn mark_used(&self, id: NumberId) -> RepoResult<()> {
        let mut state = self.lock();
        let number = state
            .numbers
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(DomainError::NumberNotFound(id))?;
        number.times_used += 1;
        number.last_used = Some(Utc::now());
        Ok(())
    }

    async fn search(
        &self,
        country: CountryId,
        fragment: &str,
        limit: i64,
    ) -> RepoResult<Vec<Number>> {
        let mut matches: Vec<Number> = self
            .lock()
            .numbers
            .iter()
            .filter(|n| n.country_id == country && n.digits.contains(fragment))
            .cloned()
            .collect();
        matches.sort_by_key(|n| (!n.is_premium, n.times_used, n.id));
        matches.truncate(limit as usize);
        Ok(matches)
    }

    async fn delete_matching(&self, country: CountryId, fragment: &str) -> RepoResult<u64> {
        let mut state = self.lock();
        let before = state.numbers.len();
        state
            .numbers
            .retain(|n| n.country_id != country || !n.digits.contains(fragment));
        Ok((before - state.numbers.len()) as u64)
    }

    async fn by_country(&self, country: CountryId, limit: Option<i64>) -> RepoResult<Vec<Number>> {
        let mut numbers: Vec<Number> = self
            .lock()
            .numbers
            .iter()
            .filter(|n| n.country_id == country)
            .cloned()
            .collect();
        numbers.sort_by_key(|n| (!n.is_premium, n.times_used, n.id));
        if let Some(limit) = limit {
            numbers.truncate(limit as usize);
        }
        Ok(numbers)
    }
}

#[async_trait]
impl SettingsRepository for FakeStore {
    async fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.lock().settings.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.lock().settings.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn seed_defaults(&self, defaults: &[(&str, &str)]) -> RepoResult<()> {
        let mut state = self.lock();
        for (key, value) in defaults {
            state
                .settings
                .entry((*key).to_string())
                .or_insert_with(|| (*value).to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl AdvertisementRepository for FakeStore {
    async fn find_by_id(&self, id: AdId) -> RepoResult<Option<Advertisement>> {
        Ok(self.lock().ads.get(&id).cloned())
    }

    async fn create(&self, ad: &NewAdvertisement) -> RepoResult<AdId> {
        Ok(self.put_ad(ad.clone()))
    }

    async fn list(&self, limit: i64, active_only: bool) -> RepoResult<Vec<Advertisement>> {
        let mut ads: Vec<Advertisement> = self
            .lock()
            .ads
            .values()
            .filter(|a| !active_only || a.is_active)
            .cloned()
            .collect();
        ads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        ads.truncate(limit as usize);
        Ok(ads)
    }

    async fn toggle_active(&self, id: AdId) -> RepoResult<bool> {
        let mut state = self.lock();
        let ad = state
            .ads
            .get_mut(&id)
            .ok_or(DomainError::AdvertisementNotFound(id))?;
        ad.is_active = !ad.is_active;
        Ok(ad.is_active)
    }

    async fn record_sent(&self, id: AdId, sent: i64) -> RepoResult<()> {
        if let Some(ad) = self.lock().ads.get_mut(&id) {
            ad.sent_to += sent;
        }
        Ok(())
    }

    async fn delete(&self, id: AdId) -> RepoResult<()> {
        self.lock()
            .ads
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::AdvertisementNotFound(id))
    }
}

#[async_trait]
impl BroadcastRepository for FakeStore {
    async fn create(&self, run: &BroadcastRun) -> RepoResult<()> {
        self.lock().runs.insert(run.run_id.clone(), run.clone());
        Ok(())
    }

    async fn status(&self, run_id: &str) -> RepoResult<Option<BroadcastStatus>> {
        Ok(self.lock().runs.get(run_id).map(|r| r.status))
    }

    async fn record_attempt(
        &self,
        run_id: &str,
        cursor: UserId,
        sent: i64,
        failed: i64,
        error: Option<&str>,
    ) -> RepoResult<()> {
        let mut state = self.lock();
        let run = state
            .runs
            .get_mut(run_id)
            .ok_or_else(|| DomainError::RunNotFound(run_id.to_string()))?;
        run.sent_count = sent;
        run.failed_count = failed;
        run.cursor = Some(cursor);
        if let Some(error) = error {
            run.errors.push_str(error);
            run.errors.push('\n');
            run.errors.truncate(MAX_ERRORS_LEN);
        }
        Ok(())
    }

    async fn mark_completed(&self, run_id: &str) -> RepoResult<bool> {
        let mut state = self.lock();
        match state.runs.get_mut(run_id) {
            Some(run) if run.status == BroadcastStatus::Running => {
                run.status = BroadcastStatus::Completed;
                run.ended_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_stopped(&self, run_id: &str) -> RepoResult<bool> {
        let mut state = self.lock();
        match state.runs.get_mut(run_id) {
            Some(run) if run.status == BroadcastStatus::Running => {
                run.status = BroadcastStatus::Stopped;
                run.ended_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find(&self, run_id: &str) -> RepoResult<Option<BroadcastRun>> {
        Ok(self.lock().runs.get(run_id).cloned())
    }

    async fn running(&self) -> RepoResult<Vec<BroadcastRun>> {
        Ok(self
            .lock()
            .runs
            .values()
            .filter(|r| r.status == BroadcastStatus::Running)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ChannelRepository for FakeStore {
    async fn list(&self) -> RepoResult<Vec<MandatoryChannel>> {
        Ok(self.lock().channels.clone())
    }

    async fn required_for_points(&self) -> RepoResult<Vec<MandatoryChannel>> {
        Ok(self
            .lock()
            .channels
            .iter()
            .filter(|c| c.require_join_for_points)
            .cloned()
            .collect())
    }

    async fn add(&self, channel: &str, is_group: bool, require_join: bool) -> RepoResult<()> {
        let mut state = self.lock();
        if state.channels.iter().any(|c| c.channel == channel) {
            return Ok(());
        }
        state.next_row_id += 1;
        let id = state.next_row_id as i32;
        state.channels.push(MandatoryChannel {
            id,
            channel: channel.to_string(),
            is_group,
            require_join_for_points: require_join,
        });
        Ok(())
    }

    async fn remove(&self, channel: &str) -> RepoResult<()> {
        self.lock().channels.retain(|c| c.channel != channel);
        Ok(())
    }
}

#[async_trait]
impl ProofRepository for FakeStore {
    async fn insert(&self, proof: &NewProof) -> RepoResult<()> {
        let mut state = self.lock();
        let user = state
            .users
            .get_mut(&proof.user_id)
            .ok_or(DomainError::UserNotFound(proof.user_id))?;
        user.proofs_submitted += 1;
        state.next_row_id += 1;
        let id = state.next_row_id;
        state.proofs.push(Proof {
            id,
            user_id: proof.user_id,
            number: proof.number.clone(),
            platform: proof.platform.clone(),
            code: proof.code.clone(),
            country_name: proof.country_name.clone(),
            posted_at: Utc::now(),
            verified: false,
            verified_by: None,
            verified_at: None,
        });
        Ok(())
    }

    async fn count_for(&self, id: UserId) -> RepoResult<i64> {
        Ok(self
            .lock()
            .proofs
            .iter()
            .filter(|p| p.user_id == id)
            .count() as i64)
    }
}

#[async_trait]
impl MaintenanceRepository for FakeStore {
    async fn record_audit(&self, actor: UserId, action: &str, meta: &str) -> RepoResult<()> {
        let mut state = self.lock();
        state.next_row_id += 1;
        let id = state.next_row_id;
        state.audit.push(AuditLogEntry {
            id,
            actor,
            action: action.to_string(),
            meta: meta.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn recent_audit(&self, limit: i64) -> RepoResult<Vec<AuditLogEntry>> {
        let mut entries = self.lock().audit.clone();
        entries.reverse();
        entries.truncate(limit as usize);
        Ok(entries)
    }

    async fn purge_history(&self, cutoff: DateTime<Utc>) -> RepoResult<PurgeCounts> {
        let mut state = self.lock();

        let proofs_before = state.proofs.len();
        state.proofs.retain(|p| p.posted_at >= cutoff);
        let audit_before = state.audit.len();
        state.audit.retain(|a| a.created_at >= cutoff);
        let history_before = state.history.len();
        state.history.retain(|h| h.created_at >= cutoff);

        Ok(PurgeCounts {
            proofs: (proofs_before - state.proofs.len()) as u64,
            audit_entries: (audit_before - state.audit.len()) as u64,
            points_entries: (history_before - state.history.len()) as u64,
        })
    }
}

/// Gateway fake: records deliveries, with optional per-user failures and a
/// semaphore gate for stepping sends one at a time
#[derive(Default)]
pub struct FakeGateway {
    sent: Mutex<Vec<(UserId, String)>>,
    fail_for: Mutex<HashSet<UserId>>,
    memberships: Mutex<HashMap<(String, UserId), MembershipStatus>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl FakeGateway {
    pub fn fail_sends_to(&self, user: UserId) {
        self.fail_for.lock().unwrap().insert(user);
    }

    pub fn gate_sends(&self, gate: Arc<Semaphore>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    pub fn set_membership(&self, channel: &str, user: UserId, status: MembershipStatus) {
        self.memberships
            .lock()
            .unwrap()
            .insert((channel.to_string(), user), status);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent_to(&self) -> Vec<UserId> {
        self.sent.lock().unwrap().iter().map(|(id, _)| *id).collect()
    }
}

#[async_trait]
impl MessagingGateway for FakeGateway {
    async fn send_message(&self, target: &ChatTarget, text: &str) -> GatewayResult<MessageRef> {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let permit = gate.acquire().await.map_err(|_| {
                GatewayError::Transport("gate closed".to_string())
            })?;
            permit.forget();
        }

        let ChatTarget::User(user) = target else {
            return Ok(MessageRef::new(0));
        };

        if self.fail_for.lock().unwrap().contains(user) {
            return Err(GatewayError::Rejected {
                description: "bot was blocked by the user".to_string(),
            });
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push((*user, text.to_string()));
        Ok(MessageRef::new(sent.len() as i64))
    }

    async fn edit_message(
        &self,
        _target: &ChatTarget,
        _message: MessageRef,
        _text: &str,
    ) -> GatewayResult<()> {
        Ok(())
    }

    async fn delete_message(&self, _target: &ChatTarget, _message: MessageRef) -> GatewayResult<()> {
        Ok(())
    }

    async fn membership_status(
        &self,
        channel: &str,
        user: UserId,
    ) -> GatewayResult<MembershipStatus> {
        Ok(self
            .memberships
            .lock()
            .unwrap()
            .get(&(channel.to_string(), user))
            .copied()
            .unwrap_or(MembershipStatus::Unknown))
    }
}

/// Build a fully wired context over fresh fakes
pub fn test_context() -> (ServiceContext, Arc<FakeStore>, Arc<FakeGateway>) {
    let store = Arc::new(FakeStore::default());
    let gateway = Arc::new(FakeGateway::default());

    let ctx = ServiceContext::new(
        Arc::clone(&store) as Arc<dyn UserRepository>,
        Arc::clone(&store) as Arc<dyn LedgerRepository>,
        Arc::clone(&store) as Arc<dyn CountryRepository>,
        Arc::clone(&store) as Arc<dyn NumberRepository>,
        Arc::clone(&store) as Arc<dyn SettingsRepository>,
        Arc::clone(&store) as Arc<dyn AdvertisementRepository>,
        Arc::clone(&store) as Arc<dyn BroadcastRepository>,
        Arc::clone(&store) as Arc<dyn ChannelRepository>,
        Arc::clone(&store) as Arc<dyn ProofRepository>,
        Arc::clone(&store) as Arc<dyn MaintenanceRepository>,
        Arc::clone(&gateway) as Arc<dyn MessagingGateway>,
        UserId::new(999),
        std::time::Duration::from_millis(10),
    );

    (ctx, store, gateway)
}
