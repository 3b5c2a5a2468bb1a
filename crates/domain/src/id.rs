//! Typed device identifier.
//!
//! Device ids on this bus are small positive integers assigned by the
//! static catalog — the wire `where` field carries them verbatim.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique identifier for a device within one kind.
///
/// Ids are unique within a kind only; the same id may name a light and a
/// shutter at once (the wire `who` field discriminates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(u32);

impl DeviceId {
    /// Wrap a raw id.
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Access the raw id, as it appears in the wire `where` field.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for DeviceId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DeviceId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_roundtrip_through_display_and_from_str() {
        let id = DeviceId::new(31);
        let text = id.to_string();
        let parsed: DeviceId = text.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let id = DeviceId::new(82);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "82");
        let parsed: DeviceId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn should_return_error_when_parsing_non_numeric_id() {
        let result = DeviceId::from_str("not-a-number");
        assert!(result.is_err());
    }

    #[test]
    fn should_expose_raw_wire_value() {
        assert_eq!(DeviceId::new(35).value(), 35);
    }
}
