//! Wire frames — the `*who*what*where##` messages exchanged with the
//! controller.
//!
//! One frame shape serves both outbound commands and inbound event
//! notifications; status queries use the shorter `*#who*where##` form.
//! Wire text is US-ASCII.

use std::fmt;

/// Terminator separating frames on the wire.
pub const FRAME_TERMINATOR: &str = "##";

/// An outbound wire message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// `*{who}*{what}*{where}##` — change a device's state.
    Command { who: u32, what: u32, where_: u32 },
    /// `*#{who}*{where}##` — ask the controller to report a device's state.
    StatusQuery { who: u32, where_: u32 },
}

impl Frame {
    /// Build a state-change command.
    #[must_use]
    pub fn command(who: u32, what: u32, where_: u32) -> Self {
        Self::Command { who, what, where_ }
    }

    /// Build a status query.
    #[must_use]
    pub fn status_query(who: u32, where_: u32) -> Self {
        Self::StatusQuery { who, where_ }
    }

    /// Encode to wire text, terminator included.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command { who, what, where_ } => {
                write!(f, "*{who}*{what}*{where_}{FRAME_TERMINATOR}")
            }
            Self::StatusQuery { who, where_ } => {
                write!(f, "*#{who}*{where_}{FRAME_TERMINATOR}")
            }
        }
    }
}

/// One inbound frame matching `*who*what*where` (terminator stripped).
///
/// The controller uses this shape both to confirm commands and to notify
/// state changes it observed on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedFrame {
    /// Device kind discriminator.
    pub who: u32,
    /// The new state value.
    pub what: u32,
    /// The device id.
    pub where_: u32,
}

/// Which logical channel a session speaks, selected by the handshake
/// string sent immediately after connecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// Sends commands and status queries, reads their confirmations.
    Command,
    /// Receives unsolicited event notifications from the controller.
    Monitor,
}

impl ChannelMode {
    /// The fixed handshake literal for this channel mode.
    #[must_use]
    pub fn handshake(self) -> &'static str {
        match self {
            Self::Command => "*99*0##",
            Self::Monitor => "*99*1##",
        }
    }
}
