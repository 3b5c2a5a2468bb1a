//! Devices — lights and roller shutters with typed states.
//!
//! The wire protocol carries states as small integers (`what`); the typed
//! enums here give them names and reject out-of-domain values at the edge.

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;

/// The kind of device a frame addresses, discriminated by the wire `who`
/// field. The protocol leaves the `who` space open — values other than
/// these are tolerated inbound noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Light,
    Shutter,
}

impl DeviceKind {
    /// The wire `who` value for this kind.
    #[must_use]
    pub fn who(self) -> u32 {
        match self {
            Self::Light => 1,
            Self::Shutter => 2,
        }
    }

    /// Map a wire `who` value back to a kind, if it names one we know.
    #[must_use]
    pub fn from_who(who: u32) -> Option<Self> {
        match who {
            1 => Some(Self::Light),
            2 => Some(Self::Shutter),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::Shutter => f.write_str("shutter"),
        }
    }
}

/// On/off state of a light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightState {
    #[default]
    Off,
    On,
}

impl LightState {
    /// The wire `what` value for this state.
    #[must_use]
    pub fn wire_value(self) -> u32 {
        match self {
            Self::Off => 0,
            Self::On => 1,
        }
    }

    /// Map a wire `what` value back to a state.
    #[must_use]
    pub fn from_wire(what: u32) -> Option<Self> {
        match what {
            0 => Some(Self::Off),
            1 => Some(Self::On),
            _ => None,
        }
    }
}

impl std::fmt::Display for LightState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => f.write_str("off"),
            Self::On => f.write_str("on"),
        }
    }
}

/// Motion state of a roller shutter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShutterState {
    #[default]
    Down,
    Stop,
    Up,
}

impl ShutterState {
    /// The wire `what` value for this state.
    #[must_use]
    pub fn wire_value(self) -> u32 {
        match self {
            Self::Down => 0,
            Self::Stop => 1,
            Self::Up => 2,
        }
    }

    /// Map a wire `what` value back to a state.
    #[must_use]
    pub fn from_wire(what: u32) -> Option<Self> {
        match what {
            0 => Some(Self::Down),
            1 => Some(Self::Stop),
            2 => Some(Self::Up),
            _ => None,
        }
    }
}

impl std::fmt::Display for ShutterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Down => f.write_str("down"),
            Self::Stop => f.write_str("stop"),
            Self::Up => f.write_str("up"),
        }
    }
}

/// A light on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Light {
    pub id: DeviceId,
    pub name: String,
    /// Present in the catalog but unused by the current command set.
    pub dimmable: bool,
    pub state: LightState,
}

/// A roller shutter on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shutter {
    pub id: DeviceId,
    pub name: String,
    /// Present in the catalog but unused by the current command set.
    pub dimmable: bool,
    pub state: ShutterState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_kinds_to_wire_who_values() {
        assert_eq!(DeviceKind::Light.who(), 1);
        assert_eq!(DeviceKind::Shutter.who(), 2);
    }

    #[test]
    fn should_roundtrip_kind_through_who() {
        assert_eq!(DeviceKind::from_who(1), Some(DeviceKind::Light));
        assert_eq!(DeviceKind::from_who(2), Some(DeviceKind::Shutter));
    }

    #[test]
    fn should_reject_unknown_who_value() {
        assert_eq!(DeviceKind::from_who(0), None);
        assert_eq!(DeviceKind::from_who(99), None);
    }

    #[test]
    fn should_roundtrip_light_state_through_wire_value() {
        for state in [LightState::Off, LightState::On] {
            assert_eq!(LightState::from_wire(state.wire_value()), Some(state));
        }
    }

    #[test]
    fn should_reject_out_of_domain_light_state() {
        assert_eq!(LightState::from_wire(2), None);
    }

    #[test]
    fn should_roundtrip_shutter_state_through_wire_value() {
        for state in [ShutterState::Down, ShutterState::Stop, ShutterState::Up] {
            assert_eq!(ShutterState::from_wire(state.wire_value()), Some(state));
        }
    }

    #[test]
    fn should_reject_out_of_domain_shutter_state() {
        assert_eq!(ShutterState::from_wire(3), None);
    }

    #[test]
    fn should_default_light_to_off_and_shutter_to_down() {
        assert_eq!(LightState::default(), LightState::Off);
        assert_eq!(ShutterState::default(), ShutterState::Down);
    }

    #[test]
    fn should_display_lowercase_state_names() {
        assert_eq!(LightState::On.to_string(), "on");
        assert_eq!(ShutterState::Stop.to_string(), "stop");
    }

    #[test]
    fn should_serialize_states_as_lowercase_strings() {
        assert_eq!(serde_json::to_string(&LightState::On).unwrap(), "\"on\"");
        assert_eq!(
            serde_json::to_string(&ShutterState::Up).unwrap(),
            "\"up\""
        );
    }
}
