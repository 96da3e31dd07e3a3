//! Member model and related types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Member model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    /// Account balance. May go negative as fees are deducted, down to the
    /// configured debt floor.
    #[schema(value_type = String)]
    pub balance: Decimal,
}

/// Register member request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMember {
    #[validate(length(min = 1, message = "First name must not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name must not be empty"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 3, message = "Phone number too short"))]
    pub phone_number: String,
    /// Opening balance, defaults to zero
    #[serde(default)]
    #[schema(value_type = String)]
    pub balance: Decimal,
}

/// Partial update for a member profile. Balance is deliberately excluded:
/// it moves only through credit/debit operations and fee deductions.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct MemberPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl MemberPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
    }
}

/// Credit/debit request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct AmountRequest {
    #[schema(value_type = String)]
    pub amount: Decimal,
}
