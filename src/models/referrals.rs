use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralCode {
    pub code: String,
    pub referrer_id: String,
    pub uses: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRecord {
    pub new_user_id: String,
    pub referrer_code: String,
    pub redeemed_at: DateTime<Utc>,
}

/// Revenue attributed to a single redemption, in cents.
pub const REVENUE_PER_REFERRAL_CENTS: u64 = 30_000;
/// Commission paid to the referrer per redemption, in cents.
pub const COMMISSION_PER_REFERRAL_CENTS: u64 = 6_000;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralMetrics {
    pub total_referrals: u64,
    pub revenue_generated_cents: u64,
    pub commission_earned_cents: u64,
}

impl ReferralMetrics {
    pub fn from_total(total_referrals: u64) -> Self {
        Self {
            total_referrals,
            revenue_generated_cents: total_referrals * REVENUE_PER_REFERRAL_CENTS,
            commission_earned_cents: total_referrals * COMMISSION_PER_REFERRAL_CENTS,
        }
    }
}

/// Full copy of the store contents, used by the diagnostics endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub referrals_store: Vec<ReferralCode>,
    pub user_referrals: Vec<RedemptionRecord>,
}
