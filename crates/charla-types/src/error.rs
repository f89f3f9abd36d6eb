use thiserror::Error;

/// Minimum password length accepted by registration (matches the backend).
pub const MIN_PASSWORD_LEN: usize = 8;

/// Outcome classification of a remote call.
///
/// The gateway never lets transport or decoding failures escape as panics
/// or foreign error types; everything crossing its boundary is one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("server error (HTTP {status}): {detail}")]
    ServerError { status: u16, detail: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Local input validation failures, rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("all fields are required")]
    MissingFields,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,

    #[error("message is empty")]
    EmptyMessage,
}

/// Errors from the durable client-side store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}

/// Errors the orchestrator reports to its caller without touching the
/// transcript.
///
/// Remote failures are NOT represented here: those become transcript-visible
/// synthetic messages (or a delayed redirect signal) instead.
#[derive(Debug, Error)]
pub enum ChatError {
    /// No valid access token; the caller is expected to redirect to login.
    #[error("not authenticated")]
    Unauthenticated,

    /// A send for this conversation is already in flight; not queued.
    #[error("a send is already in flight for this conversation")]
    SendInFlight,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from the login/register/logout flows.
///
/// Unlike send failures, these surface directly to the caller (a form or
/// prompt), never to the transcript.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
