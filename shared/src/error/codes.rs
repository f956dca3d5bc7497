//! Unified error codes for the gym platform
//!
//! This module defines all error codes used across gym-server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Member (user lifecycle) errors
//! - 4xxx: Schedule (gym session) errors
//! - 5xxx: Booking errors
//! - 6xxx: Billing errors
//! - 7xxx: Notification errors
//! - 8xxx: Settings errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Too many requests from the same client
    TooManyRequests = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account has been suspended by an administrator
    AccountSuspended = 1008,
    /// Membership has expired
    MembershipExpired = 1009,
    /// New registrations are closed
    RegistrationClosed = 1010,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Cannot modify admin user
    CannotModifyAdmin = 2004,

    // ==================== 3xxx: Member ====================
    /// User not found
    UserNotFound = 3001,
    /// Email already registered
    EmailAlreadyExists = 3002,
    /// Student ID already registered
    StudentIdAlreadyExists = 3003,
    /// Email is not in the allowed domain
    InvalidEmailDomain = 3004,
    /// Student ID format is invalid
    InvalidStudentId = 3005,
    /// Password too short
    PasswordTooShort = 3006,
    /// Unknown membership plan
    InvalidMembershipType = 3007,
    /// Card or payment details rejected
    InvalidPaymentDetails = 3008,
    /// Requested user status change is not allowed
    InvalidUserStatusTransition = 3009,
    /// An administrator already exists
    AdminAlreadyExists = 3010,
    /// User is not an approved member
    MemberNotActive = 3011,

    // ==================== 4xxx: Schedule ====================
    /// Gym session not found
    SessionNotFound = 4001,
    /// Date is not an operating day
    OutsideOperatingDays = 4002,
    /// Time is outside operating hours
    OutsideOperatingHours = 4003,
    /// End time must be after start time
    InvalidTimeRange = 4004,
    /// Session duration out of bounds
    InvalidDuration = 4005,
    /// Session capacity out of bounds
    InvalidCapacity = 4006,
    /// Capacity lower than existing bookings
    CapacityBelowBookings = 4007,

    // ==================== 5xxx: Booking ====================
    /// Booking not found
    BookingNotFound = 5001,
    /// Session has no spots left
    SessionFullyBooked = 5002,
    /// User already booked this session
    DuplicateBooking = 5003,
    /// User has an overlapping booking
    BookingTimeConflict = 5004,
    /// Booking status change is not allowed
    InvalidBookingTransition = 5005,
    /// Session date is in the past
    SessionAlreadyPast = 5006,
    /// Rating out of range
    InvalidRating = 5007,

    // ==================== 6xxx: Billing ====================
    /// Billing transaction not found
    TransactionNotFound = 6001,
    /// Amount must be positive
    InvalidAmount = 6002,
    /// Transaction status change is not allowed
    InvalidTransactionTransition = 6003,

    // ==================== 7xxx: Notification ====================
    /// Notification not found
    NotificationNotFound = 7001,

    // ==================== 8xxx: Settings ====================
    /// Invalid setting value
    InvalidSetting = 8001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// System is in maintenance mode
    MaintenanceMode = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::TooManyRequests => "Too many requests, try again later",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountSuspended => {
                "Your account has been suspended. Please contact support."
            }
            ErrorCode::MembershipExpired => "Your membership has expired. Please renew to continue.",
            ErrorCode::RegistrationClosed => "New registrations are currently closed",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::CannotModifyAdmin => "Cannot modify administrator user",

            // Member
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::EmailAlreadyExists => "An account with this email already exists",
            ErrorCode::StudentIdAlreadyExists => "An account with this student ID already exists",
            ErrorCode::InvalidEmailDomain => "Email address is not in the allowed domain",
            ErrorCode::InvalidStudentId => "Student ID must be 6-10 digits",
            ErrorCode::PasswordTooShort => "Password must be at least 6 characters long",
            ErrorCode::InvalidMembershipType => "Invalid membership type",
            ErrorCode::InvalidPaymentDetails => "Invalid payment details",
            ErrorCode::InvalidUserStatusTransition => "User status change is not allowed",
            ErrorCode::AdminAlreadyExists => "Admin setup has already been completed",
            ErrorCode::MemberNotActive => "User is not an approved member",

            // Schedule
            ErrorCode::SessionNotFound => "Session not found",
            ErrorCode::OutsideOperatingDays => "The gym is closed on this day",
            ErrorCode::OutsideOperatingHours => "Session must be within operating hours",
            ErrorCode::InvalidTimeRange => "End time must be after start time",
            ErrorCode::InvalidDuration => "Session duration is out of bounds",
            ErrorCode::InvalidCapacity => "Session capacity is out of bounds",
            ErrorCode::CapacityBelowBookings => {
                "Capacity cannot be lower than the number of existing bookings"
            }

            // Booking
            ErrorCode::BookingNotFound => "Booking not found",
            ErrorCode::SessionFullyBooked => "Session is fully booked",
            ErrorCode::DuplicateBooking => "You already have a booking for this session",
            ErrorCode::BookingTimeConflict => "You already have a booking at this time",
            ErrorCode::InvalidBookingTransition => "Booking status change is not allowed",
            ErrorCode::SessionAlreadyPast => "Session date has already passed",
            ErrorCode::InvalidRating => "Rating must be between 1 and 5",

            // Billing
            ErrorCode::TransactionNotFound => "Transaction not found",
            ErrorCode::InvalidAmount => "Amount must be greater than zero",
            ErrorCode::InvalidTransactionTransition => "Transaction status change is not allowed",

            // Notification
            ErrorCode::NotificationNotFound => "Notification not found",

            // Settings
            ErrorCode::InvalidSetting => "Invalid setting value",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::MaintenanceMode => "System is under maintenance. Please try again later.",
        }
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::TooManyRequests),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1008 => Ok(ErrorCode::AccountSuspended),
            1009 => Ok(ErrorCode::MembershipExpired),
            1010 => Ok(ErrorCode::RegistrationClosed),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::CannotModifyAdmin),

            // Member
            3001 => Ok(ErrorCode::UserNotFound),
            3002 => Ok(ErrorCode::EmailAlreadyExists),
            3003 => Ok(ErrorCode::StudentIdAlreadyExists),
            3004 => Ok(ErrorCode::InvalidEmailDomain),
            3005 => Ok(ErrorCode::InvalidStudentId),
            3006 => Ok(ErrorCode::PasswordTooShort),
            3007 => Ok(ErrorCode::InvalidMembershipType),
            3008 => Ok(ErrorCode::InvalidPaymentDetails),
            3009 => Ok(ErrorCode::InvalidUserStatusTransition),
            3010 => Ok(ErrorCode::AdminAlreadyExists),
            3011 => Ok(ErrorCode::MemberNotActive),

            // Schedule
            4001 => Ok(ErrorCode::SessionNotFound),
            4002 => Ok(ErrorCode::OutsideOperatingDays),
            4003 => Ok(ErrorCode::OutsideOperatingHours),
            4004 => Ok(ErrorCode::InvalidTimeRange),
            4005 => Ok(ErrorCode::InvalidDuration),
            4006 => Ok(ErrorCode::InvalidCapacity),
            4007 => Ok(ErrorCode::CapacityBelowBookings),

            // Booking
            5001 => Ok(ErrorCode::BookingNotFound),
            5002 => Ok(ErrorCode::SessionFullyBooked),
            5003 => Ok(ErrorCode::DuplicateBooking),
            5004 => Ok(ErrorCode::BookingTimeConflict),
            5005 => Ok(ErrorCode::InvalidBookingTransition),
            5006 => Ok(ErrorCode::SessionAlreadyPast),
            5007 => Ok(ErrorCode::InvalidRating),

            // Billing
            6001 => Ok(ErrorCode::TransactionNotFound),
            6002 => Ok(ErrorCode::InvalidAmount),
            6003 => Ok(ErrorCode::InvalidTransactionTransition),

            // Notification
            7001 => Ok(ErrorCode::NotificationNotFound),

            // Settings
            8001 => Ok(ErrorCode::InvalidSetting),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::MaintenanceMode),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
