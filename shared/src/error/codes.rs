//! Unified error codes for the Folio platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Account errors
//! - 4xxx: Portfolio errors
//! - 5xxx: Payment errors
//! - 6xxx: File upload errors
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
    /// Validation failed
    ValidationFailed = 2,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled (suspended accounts cannot log in)
    AccountDisabled = 1007,
    /// Too many requests from this client
    RateLimited = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Account ====================
    /// Account not found
    AccountNotFound = 3001,
    /// Account must be active (paid) for this operation
    AccountNotActive = 3002,
    /// Account is suspended
    AccountSuspended = 3003,
    /// Email already registered
    EmailAlreadyRegistered = 3004,
    /// Password too short
    PasswordTooShort = 3005,
    /// Unknown account status value
    InvalidAccountStatus = 3006,

    // ==================== 4xxx: Portfolio ====================
    /// Portfolio not found
    PortfolioNotFound = 4001,
    /// Portfolio is not published
    PortfolioNotPublished = 4002,
    /// Portfolio is published but its activation period has ended
    PortfolioExpired = 4003,
    /// Slug already taken
    SlugTaken = 4004,
    /// Slug has invalid characters or length
    InvalidSlug = 4005,

    // ==================== 5xxx: Payment ====================
    /// Payment not found
    PaymentNotFound = 5001,
    /// Account already has a pending payment
    PaymentAlreadyPending = 5002,
    /// Account already has an approved payment
    PaymentAlreadyApproved = 5003,
    /// Payment was already approved or rejected
    PaymentAlreadyProcessed = 5004,
    /// Payment left the pending state while the request was in flight
    PaymentNotPending = 5005,
    /// Rejecting a payment requires a reason
    RejectionReasonRequired = 5006,
    /// Payment gateway failed or refused the checkout
    PaymentGatewayError = 5007,
    /// Webhook signature verification failed
    InvalidWebhookSignature = 5008,

    // ==================== 6xxx: File Upload ====================
    /// File too large
    FileTooLarge = 6501,
    /// Unsupported file format
    UnsupportedFileFormat = 6502,
    /// No file provided in request
    NoFileProvided = 6504,
    /// Empty file provided
    EmptyFile = 6505,
    /// File storage failed
    FileStorageFailed = 6509,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
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
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::RateLimited => "Too many requests, try again later",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Account
            ErrorCode::AccountNotFound => "Account not found",
            ErrorCode::AccountNotActive => "Account is not active, complete the payment first",
            ErrorCode::AccountSuspended => "Account is suspended",
            ErrorCode::EmailAlreadyRegistered => "Email already registered",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",
            ErrorCode::InvalidAccountStatus => "Invalid account status",

            // Portfolio
            ErrorCode::PortfolioNotFound => "Portfolio not found",
            ErrorCode::PortfolioNotPublished => "Portfolio is not published",
            ErrorCode::PortfolioExpired => "Portfolio subscription has expired",
            ErrorCode::SlugTaken => "This portfolio address is already taken",
            ErrorCode::InvalidSlug => "Invalid portfolio address",

            // Payment
            ErrorCode::PaymentNotFound => "Payment not found",
            ErrorCode::PaymentAlreadyPending => "A payment is already awaiting validation",
            ErrorCode::PaymentAlreadyApproved => "Your payment has already been approved",
            ErrorCode::PaymentAlreadyProcessed => "This payment has already been processed",
            ErrorCode::PaymentNotPending => "This payment is no longer pending",
            ErrorCode::RejectionReasonRequired => "A reason is required to reject a payment",
            ErrorCode::PaymentGatewayError => "Payment gateway error",
            ErrorCode::InvalidWebhookSignature => "Invalid webhook signature",

            // File Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::FileStorageFailed => "File storage failed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::RateLimited),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),

            // Account
            3001 => Ok(ErrorCode::AccountNotFound),
            3002 => Ok(ErrorCode::AccountNotActive),
            3003 => Ok(ErrorCode::AccountSuspended),
            3004 => Ok(ErrorCode::EmailAlreadyRegistered),
            3005 => Ok(ErrorCode::PasswordTooShort),
            3006 => Ok(ErrorCode::InvalidAccountStatus),

            // Portfolio
            4001 => Ok(ErrorCode::PortfolioNotFound),
            4002 => Ok(ErrorCode::PortfolioNotPublished),
            4003 => Ok(ErrorCode::PortfolioExpired),
            4004 => Ok(ErrorCode::SlugTaken),
            4005 => Ok(ErrorCode::InvalidSlug),

            // Payment
            5001 => Ok(ErrorCode::PaymentNotFound),
            5002 => Ok(ErrorCode::PaymentAlreadyPending),
            5003 => Ok(ErrorCode::PaymentAlreadyApproved),
            5004 => Ok(ErrorCode::PaymentAlreadyProcessed),
            5005 => Ok(ErrorCode::PaymentNotPending),
            5006 => Ok(ErrorCode::RejectionReasonRequired),
            5007 => Ok(ErrorCode::PaymentGatewayError),
            5008 => Ok(ErrorCode::InvalidWebhookSignature),

            // File Upload
            6501 => Ok(ErrorCode::FileTooLarge),
            6502 => Ok(ErrorCode::UnsupportedFileFormat),
            6504 => Ok(ErrorCode::NoFileProvided),
            6505 => Ok(ErrorCode::EmptyFile),
            6509 => Ok(ErrorCode::FileStorageFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
