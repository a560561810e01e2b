//! Payment-related models for the /api/payments endpoints

use serde::{Deserialize, Serialize};

/// Payment settlement status (owned by the backend)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// A payment record from GET /api/payments/my-payments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    #[serde(default)]
    pub challenge_id: Option<i64>,
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub payment_method_id: String,
    #[serde(default)]
    pub card_last4: String,
    #[serde(default)]
    pub card_brand: String,
    pub status: PaymentStatus,
    #[serde(default)]
    pub stripe_payment_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Payment payload for creating or joining a challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_id: Option<i64>,
    pub amount: f64,
    pub currency: String,
    pub payment_method_id: String,
    pub card_last4: String,
    pub card_brand: String,
}

/// Response from POST /api/payments/process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentResponse {
    pub stripe_payment_id: String,
}

/// Response from GET /api/payments/challenge/{id}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub id: String,
    pub status: PaymentStatus,
}
