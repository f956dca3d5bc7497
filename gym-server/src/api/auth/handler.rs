//! Authentication Handlers
//!
//! Handles registration, login and the current-user lookup

use std::time::Duration;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use validator::Validate;

use crate::auth::{CurrentUser, hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::user::{self, NewStudent};
use crate::security_log;
use crate::utils::reference::payment_reference;
use crate::utils::validation::{
    validate_card, validate_email_domain, validate_password, validate_student_id,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, time};

use shared::client::{
    LoginRequest, LoginResponse, PendingLoginResponse, RegisterRequest, RegisterResponse,
};
use shared::models::{UserProfile, UserStatus};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 300;

const CREDIT_CARD: &str = "credit_card";

/// Register a student account
///
/// The account starts `pending` with a pending membership payment. Card data
/// is checked and then discarded.
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<RegisterResponse>> {
    let settings = state.settings().await?;
    if !settings.allow_new_registrations {
        return Err(AppError::new(ErrorCode::RegistrationClosed));
    }

    req.validate()?;
    let gym = &state.config.gym;
    validate_email_domain(&req.email, &gym.allowed_email_domain)?;
    validate_password(&req.password)?;
    validate_student_id(&req.student_id)?;

    let today = time::today(gym.timezone);
    if req.payment_method == CREDIT_CARD {
        validate_card(
            req.card_number.as_deref(),
            req.card_expiry.as_deref(),
            req.card_cvv.as_deref(),
            today,
        )?;
    }

    let password_hash = hash_password(&req.password)?;
    let plan = req.membership_type;
    let expiry_date = time::format_date(time::add_months(today, plan.duration_months()));
    let reference = payment_reference("PAY");

    let created = user::create_student(
        state.pool(),
        NewStudent {
            email: req.email,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            student_id: req.student_id,
            phone: req.phone,
            membership_type: plan,
            payment_method: req.payment_method,
            payment_reference: reference.clone(),
            expiry_date: expiry_date.clone(),
            emergency_contact_name: req.emergency_contact_name,
            emergency_contact_phone: req.emergency_contact_phone,
            emergency_contact_relation: req.emergency_contact_relation,
            billing_address: req.billing_address,
        },
        &gym.billing_currency,
    )
    .await?;

    tracing::info!(
        user_id = created.id,
        email = %created.email,
        plan = plan.as_str(),
        "Student registered, awaiting approval"
    );

    Ok(Json(RegisterResponse {
        user_id: created.id,
        status: created.status,
        payment_reference: reference,
        amount: plan.price(),
        currency: gym.billing_currency.clone(),
        expiry_date,
        message: "Registration received. Your account will be activated once payment is confirmed."
            .to_string(),
    }))
}

/// Login handler
///
/// Pending accounts get `202 Accepted` with their payment reference instead
/// of a token.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Response> {
    let found = user::find_by_email(state.pool(), &req.email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent email enumeration
    let account = match found {
        Some(u) if verify_password(&req.password, &u.password_hash) => u,
        Some(u) => {
            security_log!("WARN", "login_failed", user_id = u.id, reason = "invalid_password");
            return Err(AppError::invalid_credentials());
        }
        None => {
            security_log!("WARN", "login_failed", email = req.email.clone(), reason = "unknown_email");
            return Err(AppError::invalid_credentials());
        }
    };

    if !account.is_admin() && state.settings().await?.system_maintenance {
        return Err(AppError::new(ErrorCode::MaintenanceMode));
    }

    let today = state.today();
    match account.effective_status(&today) {
        UserStatus::Approved => {}
        UserStatus::Pending => {
            let body = PendingLoginResponse {
                status: UserStatus::Pending,
                message: "Your account is awaiting payment confirmation".to_string(),
                first_name: account.first_name,
                last_name: account.last_name,
                membership_type: account.membership_type,
                payment_reference: account.payment_reference,
            };
            return Ok((StatusCode::ACCEPTED, Json(body)).into_response());
        }
        UserStatus::Suspended => return Err(AppError::new(ErrorCode::AccountSuspended)),
        UserStatus::Expired => {
            return Err(AppError::new(ErrorCode::MembershipExpired)
                .with_detail("expiry_date", account.expiry_date.unwrap_or_default()));
        }
    }

    let token = state
        .jwt_service
        .generate_token(account.id, &account.email, account.role)?;

    tracing::info!(
        user_id = account.id,
        email = %account.email,
        role = account.role.as_str(),
        "User logged in successfully"
    );

    Ok(Json(LoginResponse {
        token,
        user: account.into_profile(&today),
    })
    .into_response())
}

/// Get current user profile
pub async fn me(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<UserProfile>> {
    let account = user::find_by_id(state.pool(), current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(account.into_profile(&state.today())))
}

/// Logout handler
///
/// Tokens are stateless; the client drops its copy.
pub async fn logout(Extension(current): Extension<CurrentUser>) -> Json<ApiResponse<()>> {
    tracing::info!(user_id = current.id, email = %current.email, "User logged out");
    Json(ApiResponse::ok())
}
