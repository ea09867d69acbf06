use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::{
    models::referrals::{ReferralMetrics, StoreSnapshot},
    repositories::referrals::ReferralRepository,
};

pub enum ReferralRequest {
    IssueCode {
        user_id: Option<String>,
        response: oneshot::Sender<Result<String, ServiceError>>,
    },
    RedeemCode {
        code: Option<String>,
        new_user_id: Option<String>,
        response: oneshot::Sender<Result<String, ServiceError>>,
    },
    GetMetrics {
        referrer_id: Option<String>,
        response: oneshot::Sender<Result<ReferralMetrics, ServiceError>>,
    },
    Snapshot {
        response: oneshot::Sender<StoreSnapshot>,
    },
}

/// Treats `None` and the empty string alike, as the HTTP clients send both.
fn required(value: Option<String>, message: &'static str) -> Result<String, ServiceError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ServiceError::InvalidInput(message)),
    }
}

#[derive(Clone)]
pub struct ReferralRequestHandler {
    repository: ReferralRepository,
}

impl ReferralRequestHandler {
    pub fn new(repository: ReferralRepository) -> Self {
        ReferralRequestHandler { repository }
    }

    async fn issue_code(&self, user_id: Option<String>) -> Result<String, ServiceError> {
        let user_id = required(user_id, "Valid userId (string) is required")?;

        let referral = self.repository.issue_code(&user_id).await?;
        log::info!("Generated code {} for user {}", referral.code, user_id);

        Ok(referral.code)
    }

    async fn redeem_code(
        &self,
        code: Option<String>,
        new_user_id: Option<String>,
    ) -> Result<String, ServiceError> {
        let code = required(code, "code is required")?;
        let new_user_id = required(new_user_id, "newUserId is required")?;

        match self.repository.redeem_code(&code, &new_user_id).await {
            Ok(referral) => {
                log::info!("Redeemed code {} for user {}", referral.code, new_user_id);
                Ok(referral.referrer_id)
            }
            Err(e) => {
                let error = ServiceError::from(e);
                match &error {
                    ServiceError::CodeNotFound(code) => log::warn!("Code not found: {}", code),
                    ServiceError::AlreadyRedeemed { code, .. } => {
                        log::warn!("User {} already redeemed {}", new_user_id, code)
                    }
                    _ => {}
                }
                Err(error)
            }
        }
    }

    async fn get_metrics(
        &self,
        referrer_id: Option<String>,
    ) -> Result<ReferralMetrics, ServiceError> {
        let referrer_id = required(referrer_id, "referrerId query parameter is required")?;

        Ok(self.repository.metrics(&referrer_id).await)
    }
}

#[async_trait]
impl RequestHandler<ReferralRequest> for ReferralRequestHandler {
    async fn handle_request(&self, request: ReferralRequest) {
        match request {
            ReferralRequest::IssueCode { user_id, response } => {
                let code = self.issue_code(user_id).await;
                let _ = response.send(code);
            }
            ReferralRequest::RedeemCode {
                code,
                new_user_id,
                response,
            } => {
                let referrer_id = self.redeem_code(code, new_user_id).await;
                let _ = response.send(referrer_id);
            }
            ReferralRequest::GetMetrics {
                referrer_id,
                response,
            } => {
                let metrics = self.get_metrics(referrer_id).await;
                let _ = response.send(metrics);
            }
            ReferralRequest::Snapshot { response } => {
                let _ = response.send(self.repository.snapshot().await);
            }
        }
    }
}

pub struct ReferralService;

impl ReferralService {
    pub fn new() -> Self {
        ReferralService {}
    }
}

#[async_trait]
impl Service<ReferralRequest, ReferralRequestHandler> for ReferralService {}
