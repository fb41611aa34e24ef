//! Wire-encryption capability probe.
//!
//! Firebird 3+ images require wire encryption by default. Jaybird negotiates
//! it with ARC4 and 160-bit keys; a client runtime whose cipher policy caps
//! the key length lower cannot connect. When the probe reports that, the
//! environment builder relaxes the server setting instead of failing.

use thiserror::Error;

/// Environment variable overriding the maximum ARC4 key length, in bits.
pub const MAX_KEY_BITS_ENV: &str = "FIREBIRD_TC_ARC4_MAX_KEY_BITS";

/// Minimum ARC4 key length required for encrypted connections.
pub const ARC4_REQUIRED_BITS: u32 = 160;

/// Failure to evaluate the client cipher policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The cipher is not known to the runtime.
    #[error("cipher not available: {0}")]
    CipherUnavailable(String),

    /// The configured policy could not be read.
    #[error("invalid cipher policy: {0}")]
    InvalidPolicy(String),
}

/// Answers whether the client runtime can negotiate wire encryption.
pub trait WireCryptProbe {
    /// Maximum ARC4 key length, in bits, the runtime allows.
    fn max_arc4_key_bits(&self) -> Result<u32, ProbeError>;

    /// Whether encrypted connections can be negotiated.
    ///
    /// A probe error counts as "not supported".
    fn is_supported(&self) -> bool {
        match self.max_arc4_key_bits() {
            Ok(bits) => bits >= ARC4_REQUIRED_BITS,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "cipher not found, runtime does not support encryption requirements"
                );
                false
            }
        }
    }
}

/// Client cipher policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CipherPolicy {
    /// No restriction on key length.
    #[default]
    Unrestricted,
    /// Key length capped at the given number of bits.
    Limited(u32),
    /// The cipher is not available at all.
    Unavailable,
    /// The policy could not be determined.
    Invalid(String),
}

impl CipherPolicy {
    /// Read the policy from [`MAX_KEY_BITS_ENV`].
    ///
    /// Unset means [`Self::Unrestricted`]; `none` means [`Self::Unavailable`].
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var(MAX_KEY_BITS_ENV) {
            Ok(value) => Self::parse(&value),
            Err(_) => Self::Unrestricted,
        }
    }

    fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("none") {
            return Self::Unavailable;
        }
        if value.eq_ignore_ascii_case("unlimited") {
            return Self::Unrestricted;
        }
        value
            .parse()
            .map_or_else(|_| Self::Invalid(value.to_string()), Self::Limited)
    }
}

impl WireCryptProbe for CipherPolicy {
    fn max_arc4_key_bits(&self) -> Result<u32, ProbeError> {
        match self {
            Self::Unrestricted => Ok(u32::MAX),
            Self::Limited(bits) => Ok(*bits),
            Self::Unavailable => Err(ProbeError::CipherUnavailable("ARC4".into())),
            Self::Invalid(raw) => Err(ProbeError::InvalidPolicy(raw.clone())),
        }
    }
}
