use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{
    repositories::referrals::{ReferralRepository, StoreError},
    settings::Settings,
};

pub mod http;
pub mod referrals;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("Referral Code already exists for {user_id}")]
    DuplicateReferrer { user_id: String, code: String },
    #[error("{new_user_id} is already referred using {code}")]
    AlreadyRedeemed { new_user_id: String, code: String },
    #[error("Invalid code")]
    CodeNotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DuplicateReferrer { referrer_id, code } => ServiceError::DuplicateReferrer {
                user_id: referrer_id,
                code,
            },
            StoreError::AlreadyRedeemed { new_user_id, code } => {
                ServiceError::AlreadyRedeemed { new_user_id, code }
            }
            StoreError::CodeNotFound(code) => ServiceError::CodeNotFound(code),
            e @ StoreError::CodeSpaceExhausted(_) => ServiceError::Internal(e.to_string()),
        }
    }
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

/// Spawns the referral service and serves HTTP until the listener fails.
pub async fn start_services(settings: Settings) -> Result<(), anyhow::Error> {
    let (referral_tx, mut referral_rx) = mpsc::channel(512);

    let mut referral_service = referrals::ReferralService::new();

    log::info!("Starting referral service.");
    tokio::spawn(async move {
        referral_service
            .run(
                referrals::ReferralRequestHandler::new(ReferralRepository::new()),
                &mut referral_rx,
            )
            .await;
    });

    log::info!("Starting HTTP server.");
    http::start_http_server(
        referral_tx,
        &settings.server.listen,
        settings.diagnostics.enabled,
    )
    .await
}
