use serde::{Deserialize, Serialize};

/// Minimal user reference embedded in other payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

/// Training status of one license category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryStatus {
    Teaching,
    Training,
    Paused,
    Graduated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseCategory {
    pub code: String,
    pub license_category_name: String,
    pub status: CategoryStatus,
}

/// Study group with its theory instructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub instructor: UserRef,
}

/// Profile payload from `/v1/users/{id}/details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub email: String,
    pub phone_number: String,
    pub pay_for_studying: f64,
    #[serde(default)]
    pub license_categories: Vec<LicenseCategory>,
    #[serde(default)]
    pub groups: Option<Vec<Group>>,
    #[serde(default)]
    pub practical_instructor: Option<UserRef>,
    #[serde(default)]
    pub students: Option<Vec<UserRef>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    CreditCard,
    Paypal,
    BankTransfer,
    Cash,
}

/// Payment history entry from `/v1/users/{id}/payments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub amount: f64,
    pub payment_date: String,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub transaction_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Card payment submission (`POST /v1/users/pay/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
}

impl PaymentRequest {
    #[must_use]
    pub fn card(amount: f64, card_number: String, expiry_date: String, cvv: String) -> Self {
        Self {
            amount,
            payment_method: PaymentMethod::Card,
            card_number,
            expiry_date,
            cvv,
        }
    }
}
