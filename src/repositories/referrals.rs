use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::sync::RwLock;

use crate::models::referrals::{RedemptionRecord, ReferralCode, ReferralMetrics, StoreSnapshot};
use crate::utils;

/// Regeneration attempts before issuance gives up on finding an unused code.
const MAX_ISSUE_ATTEMPTS: u32 = 16;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Referral Code already exists for {referrer_id}")]
    DuplicateReferrer { referrer_id: String, code: String },
    #[error("{new_user_id} is already referred using {code}")]
    AlreadyRedeemed { new_user_id: String, code: String },
    #[error("Code not found: {0}")]
    CodeNotFound(String),
    #[error("No unused code found after {0} attempts")]
    CodeSpaceExhausted(u32),
}

#[derive(Default)]
struct ReferralStore {
    referrals: Vec<ReferralCode>,
    redemptions: Vec<RedemptionRecord>,
    /// normalized code -> position in `referrals`
    codes: HashMap<String, usize>,
    /// referrer id -> position in `referrals`
    referrers: HashMap<String, usize>,
    /// new user id -> position in `redemptions`
    redeemers: HashMap<String, usize>,
}

impl ReferralStore {
    fn issue<R: Rng + ?Sized>(
        &mut self,
        referrer_id: &str,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<ReferralCode, StoreError> {
        if let Some(&index) = self.referrers.get(referrer_id) {
            return Err(StoreError::DuplicateReferrer {
                referrer_id: referrer_id.to_string(),
                code: self.referrals[index].code.clone(),
            });
        }

        let code = (0..MAX_ISSUE_ATTEMPTS)
            .map(|_| utils::generate_code(rng))
            .find(|candidate| !self.codes.contains_key(&utils::normalize_code(candidate)))
            .ok_or(StoreError::CodeSpaceExhausted(MAX_ISSUE_ATTEMPTS))?;

        let referral = ReferralCode {
            code,
            referrer_id: referrer_id.to_string(),
            uses: 0,
            created_at: now,
        };

        let index = self.referrals.len();
        self.codes.insert(utils::normalize_code(&referral.code), index);
        self.referrers.insert(referral.referrer_id.clone(), index);
        self.referrals.push(referral.clone());

        Ok(referral)
    }

    fn redeem(
        &mut self,
        code: &str,
        new_user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ReferralCode, StoreError> {
        if let Some(&index) = self.redeemers.get(new_user_id) {
            return Err(StoreError::AlreadyRedeemed {
                new_user_id: new_user_id.to_string(),
                code: self.redemptions[index].referrer_code.clone(),
            });
        }

        let index = *self
            .codes
            .get(&utils::normalize_code(code))
            .ok_or_else(|| StoreError::CodeNotFound(code.to_string()))?;

        let referral = &mut self.referrals[index];
        referral.uses += 1;

        self.redeemers
            .insert(new_user_id.to_string(), self.redemptions.len());
        self.redemptions.push(RedemptionRecord {
            new_user_id: new_user_id.to_string(),
            referrer_code: referral.code.clone(),
            redeemed_at: now,
        });

        Ok(referral.clone())
    }

    fn metrics(&self, referrer_id: &str) -> ReferralMetrics {
        let codes: HashSet<&str> = self
            .referrals
            .iter()
            .filter(|r| r.referrer_id == referrer_id)
            .map(|r| r.code.as_str())
            .collect();

        let total = self
            .redemptions
            .iter()
            .filter(|ur| codes.contains(ur.referrer_code.as_str()))
            .count();

        ReferralMetrics::from_total(total as u64)
    }
}

/// Process-wide referral store. Every mutation runs under a single write lock,
/// so check-then-write sequences never interleave.
#[derive(Clone, Default)]
pub struct ReferralRepository {
    store: Arc<RwLock<ReferralStore>>,
}

impl ReferralRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn issue_code(&self, referrer_id: &str) -> Result<ReferralCode, StoreError> {
        let mut store = self.store.write().await;
        store.issue(referrer_id, &mut rand::thread_rng(), Utc::now())
    }

    /// Returns the redeemed code, including its updated `uses` counter.
    pub async fn redeem_code(
        &self,
        code: &str,
        new_user_id: &str,
    ) -> Result<ReferralCode, StoreError> {
        let mut store = self.store.write().await;
        store.redeem(code, new_user_id, Utc::now())
    }

    pub async fn metrics(&self, referrer_id: &str) -> ReferralMetrics {
        self.store.read().await.metrics(referrer_id)
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let store = self.store.read().await;
        StoreSnapshot {
            referrals_store: store.referrals.clone(),
            user_referrals: store.redemptions.clone(),
        }
    }
}
