//! Form request identifier.
//!
//! Bedrock form ids are 32-bit on the wire; zero is never handed out so it can
//! stand for "no form" in inbound packets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// Correlation key linking an outbound form request to its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(NonZeroU32);

impl RequestId {
    /// Smallest valid id
    pub const MIN: RequestId = RequestId(NonZeroU32::MIN);

    /// Largest valid id
    pub const MAX: RequestId = RequestId(NonZeroU32::MAX);

    /// Create from a raw wire value. Returns `None` for zero.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// Get the raw wire value
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// The id following this one, wrapping from `u32::MAX` back to 1.
    pub fn wrapping_next(self) -> Self {
        match self.0.checked_add(1) {
            Some(next) => Self(next),
            None => Self::MIN,
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NonZeroU32> for RequestId {
    fn from(raw: NonZeroU32) -> Self {
        Self(raw)
    }
}

impl From<RequestId> for u32 {
    fn from(id: RequestId) -> Self {
        id.get()
    }
}

impl TryFrom<u32> for RequestId {
    type Error = std::num::TryFromIntError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        NonZeroU32::try_from(raw).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_rejected() {
        assert!(RequestId::new(0).is_none());
        assert!(RequestId::try_from(0u32).is_err());
        assert_eq!(RequestId::new(7).map(RequestId::get), Some(7));
    }

    #[test]
    fn test_wrapping_next_skips_zero() {
        assert_eq!(RequestId::MAX.wrapping_next(), RequestId::MIN);
        assert_eq!(RequestId::MIN.wrapping_next().get(), 2);
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let id = RequestId::new(42).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let parsed: RequestId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, id);
        assert!(serde_json::from_str::<RequestId>("0").is_err());
    }
}
