//! Client-facing request/response types
//!
//! Auth, registration and account-management DTOs used in API communication.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{MembershipType, UserProfile, UserStatus};

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response data (approved members and admins)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Returned with `202 Accepted` when the account still awaits approval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingLoginResponse {
    pub status: UserStatus,
    pub message: String,
    pub first_name: String,
    pub last_name: String,
    pub membership_type: Option<MembershipType>,
    pub payment_reference: Option<String>,
}

/// Student registration
///
/// Shape checks live here; domain rules (email domain, student id format,
/// card validation) are applied by the server.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub student_id: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    pub membership_type: MembershipType,
    #[validate(length(min = 1, max = 50))]
    pub payment_method: String,
    pub card_number: Option<String>,
    /// `MM/YY`
    pub card_expiry: Option<String>,
    pub card_cvv: Option<String>,
    #[validate(length(max = 100))]
    pub emergency_contact_name: Option<String>,
    #[validate(length(max = 30))]
    pub emergency_contact_phone: Option<String>,
    #[validate(length(max = 50))]
    pub emergency_contact_relation: Option<String>,
    #[validate(length(max = 500))]
    pub billing_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub status: UserStatus,
    pub payment_reference: String,
    pub amount: f64,
    pub currency: String,
    pub expiry_date: String,
    pub message: String,
}

// =============================================================================
// Setup & account management
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetupStatus {
    pub needs_setup: bool,
}

/// First admin account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetupRequest {
    #[validate(length(min = 3, max = 254))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
}

/// Admin credential change, authorised by the current password
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileChange {
    pub current_password: String,
    pub new_email: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalAction {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveUserRequest {
    pub user_id: i64,
    pub action: ApprovalAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_shape() {
        let body = r#"{
            "email": "jane.doe@my.jcu.edu.au",
            "password": "secret1",
            "first_name": "Jane",
            "last_name": "Doe",
            "student_id": "1234567",
            "membership_type": "premium",
            "payment_method": "bank_transfer"
        }"#;
        let req: RegisterRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.membership_type, MembershipType::Premium);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_request_missing_name() {
        let body = r#"{
            "email": "jane.doe@my.jcu.edu.au",
            "password": "secret1",
            "first_name": "",
            "last_name": "Doe",
            "student_id": "1234567",
            "membership_type": "1-trimester",
            "payment_method": "cash"
        }"#;
        let req: RegisterRequest = serde_json::from_str(body).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_approval_action_serde() {
        let req: ApproveUserRequest =
            serde_json::from_str(r#"{"user_id": 5, "action": "reject"}"#).unwrap();
        assert_eq!(req.action, ApprovalAction::Reject);
    }
}
