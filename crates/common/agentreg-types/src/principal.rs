use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest identity string accepted by `FromStr`.
pub const MAX_PRINCIPAL_LEN: usize = 256;

/// Error type for principal parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrincipalError {
    #[error("principal exceeds {} bytes", MAX_PRINCIPAL_LEN)]
    TooLong,
    #[error("principal contains whitespace or control characters")]
    Malformed,
}

/// An ambient caller identity.
///
/// A `did:key:z…` DID and a `0x…` account address are both valid principals.
/// Account addresses are stored lower-cased, so `0xA11CE` and `0xa11ce` are
/// the same principal. The *null* principal is the empty string or the zero
/// address.
///
/// Deserialization goes through `FromStr`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

fn canonical(id: String) -> String {
    if id.starts_with("0x") || id.starts_with("0X") {
        id.to_ascii_lowercase()
    } else {
        id
    }
}

impl Principal {
    /// Wrap an identity string without length or character checks.
    pub fn new(id: impl Into<String>) -> Self {
        Self(canonical(id.into()))
    }

    /// The null principal.
    pub fn null() -> Self {
        Self(String::new())
    }

    /// Return the identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty identity and for any `0x` address made only of zeros.
    pub fn is_null(&self) -> bool {
        let s = self.0.trim();
        if s.is_empty() {
            return true;
        }
        match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(digits) => digits.chars().all(|c| c == '0'),
            None => false,
        }
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > MAX_PRINCIPAL_LEN {
            return Err(PrincipalError::TooLong);
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(PrincipalError::Malformed);
        }
        Ok(Self(canonical(s.to_string())))
    }
}

impl TryFrom<String> for Principal {
    type Error = PrincipalError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Principal> for String {
    fn from(p: Principal) -> Self {
        p.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Principal {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
