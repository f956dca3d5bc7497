//! User Model (students and admins)

use serde::{Deserialize, Serialize};

/// Account role, carried as the `role` claim of the access token
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum UserRole {
    #[default]
    Student,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Self::Student),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Membership plan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum MembershipType {
    #[serde(rename = "1-trimester")]
    #[cfg_attr(feature = "db", sqlx(rename = "1-trimester"))]
    OneTrimester,
    #[serde(rename = "3-trimester")]
    #[cfg_attr(feature = "db", sqlx(rename = "3-trimester"))]
    ThreeTrimester,
    #[serde(rename = "premium")]
    #[cfg_attr(feature = "db", sqlx(rename = "premium"))]
    Premium,
}

impl MembershipType {
    /// Plan price in the billing currency
    pub fn price(&self) -> f64 {
        match self {
            Self::OneTrimester => 150.0,
            Self::ThreeTrimester => 400.0,
            Self::Premium => 800.0,
        }
    }

    /// Months of access granted from the registration date
    pub fn duration_months(&self) -> u32 {
        match self {
            Self::OneTrimester => 4,
            Self::ThreeTrimester | Self::Premium => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneTrimester => "1-trimester",
            Self::ThreeTrimester => "3-trimester",
            Self::Premium => "premium",
        }
    }
}

/// Account status
///
/// `Expired` is never stored. It is derived at read time for approved
/// members whose `expiry_date` lies before today.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum UserStatus {
    #[default]
    Pending,
    Approved,
    Suspended,
    Expired,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Suspended => "suspended",
            Self::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "suspended" => Some(Self::Suspended),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

/// Membership payment state
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// User entity (DB row)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub student_id: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub membership_type: Option<MembershipType>,
    /// Stored status (never `expired`)
    pub status: UserStatus,
    pub expiry_date: Option<String>,
    pub approval_date: Option<i64>,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub payment_amount: Option<f64>,
    pub payment_reference: Option<String>,
    pub payment_date: Option<i64>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub emergency_contact_relation: Option<String>,
    pub billing_address: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Status as seen by clients, deriving `expired` from `expiry_date`.
    ///
    /// `today` is a `YYYY-MM-DD` date in the business timezone.
    pub fn effective_status(&self, today: &str) -> UserStatus {
        match (self.status, self.expiry_date.as_deref()) {
            (UserStatus::Approved, Some(expiry)) if expiry < today => UserStatus::Expired,
            (status, _) => status,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn into_profile(self, today: &str) -> UserProfile {
        let status = self.effective_status(today);
        UserProfile {
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            student_id: self.student_id,
            phone: self.phone,
            role: self.role,
            membership_type: self.membership_type,
            status,
            expiry_date: self.expiry_date,
            approval_date: self.approval_date,
            payment_status: self.payment_status,
            payment_method: self.payment_method,
            payment_amount: self.payment_amount,
            payment_reference: self.payment_reference,
            payment_date: self.payment_date,
            emergency_contact_name: self.emergency_contact_name,
            emergency_contact_phone: self.emergency_contact_phone,
            emergency_contact_relation: self.emergency_contact_relation,
            billing_address: self.billing_address,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// User as returned by the API (derived status, no credentials)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub student_id: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub membership_type: Option<MembershipType>,
    pub status: UserStatus,
    pub expiry_date: Option<String>,
    pub approval_date: Option<i64>,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub payment_amount: Option<f64>,
    pub payment_reference: Option<String>,
    pub payment_date: Option<i64>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub emergency_contact_relation: Option<String>,
    pub billing_address: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Admin update payload
///
/// `status` only accepts `approved` or `suspended`; `pending` and `expired`
/// cannot be set directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub membership_type: Option<MembershipType>,
    pub expiry_date: Option<String>,
    pub status: Option<UserStatus>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub emergency_contact_relation: Option<String>,
    pub billing_address: Option<String>,
}

/// Admin user list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserQuery {
    pub status: Option<UserStatus>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approved_user(expiry: Option<&str>) -> User {
        User {
            id: 1,
            email: "jane.doe@my.jcu.edu.au".to_string(),
            password_hash: "hash".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            student_id: Some("1234567".to_string()),
            phone: None,
            role: UserRole::Student,
            membership_type: Some(MembershipType::Premium),
            status: UserStatus::Approved,
            expiry_date: expiry.map(str::to_string),
            approval_date: Some(0),
            payment_status: PaymentStatus::Paid,
            payment_method: Some("credit_card".to_string()),
            payment_amount: Some(800.0),
            payment_reference: Some("PAY_ABCDEF12".to_string()),
            payment_date: None,
            emergency_contact_name: None,
            emergency_contact_phone: None,
            emergency_contact_relation: None,
            billing_address: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_effective_status_derives_expired() {
        let user = approved_user(Some("2025-03-01"));
        assert_eq!(user.effective_status("2025-03-01"), UserStatus::Approved);
        assert_eq!(user.effective_status("2025-03-02"), UserStatus::Expired);
    }

    #[test]
    fn test_effective_status_keeps_non_approved() {
        let mut user = approved_user(Some("2020-01-01"));
        user.status = UserStatus::Suspended;
        assert_eq!(user.effective_status("2025-01-01"), UserStatus::Suspended);

        let user = approved_user(None);
        assert_eq!(user.effective_status("2099-01-01"), UserStatus::Approved);
    }

    #[test]
    fn test_profile_hides_password_hash() {
        let user = approved_user(Some("2099-01-01"));
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());

        let profile = user.into_profile("2025-01-01");
        assert_eq!(profile.status, UserStatus::Approved);
    }

    #[test]
    fn test_membership_serde_names() {
        let json = serde_json::to_string(&MembershipType::OneTrimester).unwrap();
        assert_eq!(json, "\"1-trimester\"");
        let plan: MembershipType = serde_json::from_str("\"3-trimester\"").unwrap();
        assert_eq!(plan, MembershipType::ThreeTrimester);
        assert_eq!(plan.price(), 400.0);
        assert_eq!(MembershipType::OneTrimester.duration_months(), 4);
    }
}
