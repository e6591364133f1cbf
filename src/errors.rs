use core::fmt;

/// Errors raised while validating caller-supplied input, before any
/// signing or network interaction takes place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Salt string is not 32 bytes of hex (with or without a `0x` prefix).
    InvalidSalt(String),
    /// Address string is malformed, or mixed-case with a bad EIP-55 checksum.
    InvalidAddress(String),
    /// A call-only batch was asked to carry a delegate call.
    DelegateCallInBatch,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::InvalidSalt(raw) => {
                write!(f, "salt must be 32 bytes of hex, got {raw:?}")
            }
            InputError::InvalidAddress(raw) => {
                write!(f, "malformed or badly checksummed address {raw:?}")
            }
            InputError::DelegateCallInBatch => {
                write!(f, "call-only batches cannot contain delegate calls")
            }
        }
    }
}

impl std::error::Error for InputError {}

/// Errors surfaced by caller-supplied signing or read providers.
///
/// Provider failures propagate unchanged to the caller; nothing in this
/// crate retries or suppresses them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider declined to sign or the underlying call failed.
    Rejected(String),
    /// Return data was malformed or could not be decoded.
    MalformedReturn,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Rejected(reason) => write!(f, "provider rejected: {reason}"),
            ProviderError::MalformedReturn => write!(f, "provider returned malformed data"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Umbrella error for operations that can fail on both input validation
/// and an injected provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Input(InputError),
    Provider(ProviderError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Input(e) => e.fmt(f),
            Error::Provider(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

impl From<InputError> for Error {
    fn from(e: InputError) -> Self {
        Error::Input(e)
    }
}

impl From<ProviderError> for Error {
    fn from(e: ProviderError) -> Self {
        Error::Provider(e)
    }
}
