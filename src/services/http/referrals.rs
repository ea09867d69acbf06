use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{dispatch, error_response, AppState};
use crate::services::referrals::ReferralRequest;

/// Reads a string field from a JSON body; non-string values count as absent.
fn string_field(body: &Result<Json<Value>, JsonRejection>, field: &str) -> Option<String> {
    match body {
        Ok(Json(value)) => value.get(field).and_then(Value::as_str).map(str::to_string),
        Err(rejection) => {
            log::debug!("Rejected request body: {}", rejection);
            None
        }
    }
}

pub async fn generate_referral_code(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let user_id = string_field(&body, "userId");

    match dispatch(&state, |response| ReferralRequest::IssueCode { user_id, response }).await {
        Ok(Ok(code)) => (StatusCode::OK, Json(json!({"success": true, "code": code}))),
        Ok(Err(e)) | Err(e) => error_response(e),
    }
}

pub async fn redeem_referral_code(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let code = string_field(&body, "code");
    let new_user_id = string_field(&body, "newUserId");

    let result = dispatch(&state, |response| ReferralRequest::RedeemCode {
        code,
        new_user_id,
        response,
    })
    .await;

    match result {
        Ok(Ok(referrer_id)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Referral applied!",
                "referrerId": referrer_id,
            })),
        ),
        Ok(Err(e)) | Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
pub struct MetricsQuery {
    #[serde(rename = "referrerId")]
    referrer_id: Option<String>,
}

pub async fn get_referral_metrics(
    State(state): State<AppState>,
    query: Result<Query<MetricsQuery>, QueryRejection>,
) -> impl IntoResponse {
    let referrer_id = match query {
        Ok(Query(query)) => query.referrer_id,
        Err(rejection) => {
            log::debug!("Rejected query string: {}", rejection);
            None
        }
    };

    let result = dispatch(&state, |response| ReferralRequest::GetMetrics {
        referrer_id,
        response,
    })
    .await;

    match result {
        Ok(Ok(metrics)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "totalReferrals": metrics.total_referrals,
                "revenueGeneratedCents": metrics.revenue_generated_cents,
                "commissionEarnedCents": metrics.commission_earned_cents,
            })),
        ),
        Ok(Err(e)) | Err(e) => error_response(e),
    }
}

pub async fn debug_dump(State(state): State<AppState>) -> impl IntoResponse {
    match dispatch(&state, |response| ReferralRequest::Snapshot { response }).await {
        Ok(snapshot) => (StatusCode::OK, Json(json!(snapshot))),
        Err(e) => error_response(e),
    }
}
