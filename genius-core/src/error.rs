use thiserror::Error;

/// Error kinds surfaced by the transaction core, one per row of the
/// propagation table: the outbox tick retries on `Store`, façade calls
/// surface `InsufficientFunds`/`InvalidAddress`/`ByteCodeNotFound`/
/// `MigrationUnapplicable`, and incoming-record proof/signature failures
/// are never returned as an `Err` — they are logged and dropped by the
/// caller instead of being constructed at all.
#[derive(Error, Debug)]
pub enum GeniusError {
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: u64, available: u64 },

    #[error("invalid address: {reason}")]
    InvalidAddress { reason: String },

    #[error("invalid proof: {reason}")]
    InvalidProof { reason: String },

    #[error("invalid signature: {reason}")]
    InvalidSignature { reason: String },

    #[error("proof backend could not locate its circuit bytecode: {reason}")]
    ByteCodeNotFound { reason: String },

    #[error("replicated store error: {reason}")]
    Store { reason: String },

    #[error("operation timed out")]
    Timeout,

    #[error("no migration chain connects {from} to {to}")]
    MigrationUnapplicable { from: String, to: String },

    #[error("invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("value too large for precision {precision}")]
    ValueTooLarge { precision: u8 },

    #[error("value out of range: {reason}")]
    OutOfRange { reason: String },

    #[error("escrow not found: {reason}")]
    EscrowNotFound { reason: String },

    #[error("empty task result")]
    EmptyResult,

    #[error("proof generation failed: {reason}")]
    ProofGenerationFailed { reason: String },

    #[error("malformed wire data: {reason}")]
    Encoding { reason: String },
}

impl GeniusError {
    pub fn invalid_address<S: Into<String>>(reason: S) -> Self {
        GeniusError::InvalidAddress {
            reason: reason.into(),
        }
    }

    pub fn invalid_amount<S: Into<String>>(reason: S) -> Self {
        GeniusError::InvalidAmount {
            reason: reason.into(),
        }
    }

    pub fn store<S: Into<String>>(reason: S) -> Self {
        GeniusError::Store {
            reason: reason.into(),
        }
    }

    pub fn encoding<S: Into<String>>(reason: S) -> Self {
        GeniusError::Encoding {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GeniusError>;
