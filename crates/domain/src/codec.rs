//! Frame codec — parsing inbound wire text into [`ParsedFrame`]s.
//!
//! A raw read from the controller may contain zero, one, or several
//! `##`-terminated frames, plus partial fragments when a read boundary
//! falls inside a frame. [`decode`] handles a self-contained chunk;
//! [`FrameAssembler`] carries undecoded trailing bytes across reads so
//! split frames are reassembled instead of dropped.

use crate::frame::{FRAME_TERMINATOR, ParsedFrame};

/// Why a frame segment failed to parse.
///
/// Callers on the tolerance path drop these (the bus carries frame shapes
/// we do not speak, such as handshake acks); the error exists so drops can
/// be counted and logged rather than vanish.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The segment was empty (e.g. between two adjacent terminators).
    #[error("empty segment")]
    Empty,

    /// The segment does not start with `*`.
    #[error("segment does not start with '*'")]
    MissingLeadingStar,

    /// The segment starts with `*#` — a status/ack shape, not a state frame.
    #[error("not a state frame (leading '#')")]
    NotAStateFrame,

    /// The segment does not have exactly three `*`-separated fields.
    #[error("expected 3 fields, got {actual}")]
    FieldCount {
        /// Number of fields actually present.
        actual: usize,
    },

    /// A field is not a plain non-negative integer.
    #[error("field {index} is not an integer: {text:?}")]
    InvalidField {
        /// Zero-based field position (0 = who, 1 = what, 2 = where).
        index: usize,
        /// The offending field text.
        text: String,
    },
}

/// Parse one segment (a frame with its terminator already stripped)
/// strictly against the `*who*what*where` pattern.
///
/// # Errors
///
/// Returns [`FrameError`] describing the first mismatch encountered.
pub fn parse_segment(segment: &str) -> Result<ParsedFrame, FrameError> {
    if segment.is_empty() {
        return Err(FrameError::Empty);
    }
    let rest = segment
        .strip_prefix('*')
        .ok_or(FrameError::MissingLeadingStar)?;
    if rest.starts_with('#') {
        return Err(FrameError::NotAStateFrame);
    }

    let fields: Vec<&str> = rest.split('*').collect();
    if fields.len() != 3 {
        return Err(FrameError::FieldCount {
            actual: fields.len(),
        });
    }

    let mut values = [0u32; 3];
    for (index, field) in fields.iter().enumerate() {
        values[index] = field
            .parse()
            .map_err(|_| FrameError::InvalidField {
                index,
                text: (*field).to_owned(),
            })?;
    }

    Ok(ParsedFrame {
        who: values[0],
        what: values[1],
        where_: values[2],
    })
}

/// Split a raw chunk into its non-empty frame segments (terminators
/// removed). Trailing empties from a final terminator are skipped.
pub fn segments(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(FRAME_TERMINATOR).filter(|seg| !seg.is_empty())
}

/// Decode a raw text chunk into the frames it contains.
///
/// Segments that do not match `*who*what*where` are silently dropped —
/// empty input, a lone terminator, partial fragments, and malformed
/// content all yield nothing. Callers that need to observe drops iterate
/// [`segments`] and [`parse_segment`] themselves.
#[must_use]
pub fn decode(raw: &str) -> Vec<ParsedFrame> {
    segments(raw)
        .filter_map(|seg| parse_segment(seg).ok())
        .collect()
}

/// Largest number of bytes the assembler will hold while waiting for a
/// terminator. Valid frames are far smaller; anything beyond this is a
/// terminator-free flood.
const MAX_CARRY_BYTES: usize = 1024;

/// Reassembles frames whose bytes arrive split across socket reads.
///
/// Feed each raw read chunk to [`push`](Self::push); only complete,
/// `##`-terminated frame texts come back out. Trailing bytes with no
/// terminator yet are carried into the next push.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    carry: String,
    discarded: u64,
}

impl FrameAssembler {
    /// Create an empty assembler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw read chunk and return the complete frame texts now
    /// available, terminators included, in arrival order.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.carry.push_str(chunk);

        let mut complete = Vec::new();
        while let Some(pos) = self.carry.find(FRAME_TERMINATOR) {
            let end = pos + FRAME_TERMINATOR.len();
            let frame: String = self.carry.drain(..end).collect();
            // A leading lone terminator yields "##"; skip it.
            if frame.len() > FRAME_TERMINATOR.len() {
                complete.push(frame);
            }
        }

        if self.carry.len() > MAX_CARRY_BYTES {
            self.discarded += self.carry.len() as u64;
            self.carry.clear();
        }

        complete
    }

    /// Bytes dropped so far because no terminator arrived within the
    /// carry bound.
    #[must_use]
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Whether bytes are currently waiting for a terminator.
    #[must_use]
    pub fn has_partial(&self) -> bool {
        !self.carry.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;

    #[test]
    fn should_decode_what_encode_produced() {
        for (who, what, where_) in [(1, 1, 31), (2, 0, 82), (0, 0, 0), (99, 1, 12345)] {
            let text = Frame::command(who, what, where_).encode();
            let frames = decode(&text);
            assert_eq!(frames, vec![ParsedFrame { who, what, where_ }]);
        }
    }

    #[test]
    fn should_decode_empty_input_to_nothing() {
        assert!(decode("").is_empty());
    }

    #[test]
    fn should_decode_lone_terminator_to_nothing() {
        assert!(decode("##").is_empty());
    }

    #[test]
    fn should_decode_garbage_to_nothing() {
        assert!(decode("garbage").is_empty());
    }

    #[test]
    fn should_decode_concatenated_frames_in_order() {
        let frames = decode("*1*1*31##*2*0*82##");
        assert_eq!(
            frames,
            vec![
                ParsedFrame {
                    who: 1,
                    what: 1,
                    where_: 31
                },
                ParsedFrame {
                    who: 2,
                    what: 0,
                    where_: 82
                },
            ]
        );
    }

    #[test]
    fn should_drop_malformed_segment_but_keep_valid_neighbours() {
        let frames = decode("*1*1*31##junk##*2*2*82##");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].where_, 31);
        assert_eq!(frames[1].where_, 82);
    }

    #[test]
    fn should_drop_status_query_shaped_segments() {
        // The command channel echoes our own status queries back sometimes;
        // they are not state frames.
        assert!(decode("*#1*31##").is_empty());
    }

    #[test]
    fn should_reject_segment_with_too_many_fields() {
        assert_eq!(
            parse_segment("*1*1*31*7"),
            Err(FrameError::FieldCount { actual: 4 })
        );
    }

    #[test]
    fn should_reject_segment_with_non_numeric_field() {
        let err = parse_segment("*1*on*31").unwrap_err();
        assert!(matches!(err, FrameError::InvalidField { index: 1, .. }));
    }

    #[test]
    fn should_reject_segment_without_leading_star() {
        assert_eq!(parse_segment("1*1*31"), Err(FrameError::MissingLeadingStar));
    }

    #[test]
    fn should_reject_empty_segment() {
        assert_eq!(parse_segment(""), Err(FrameError::Empty));
    }

    #[test]
    fn should_reassemble_frame_split_across_two_reads() {
        let mut assembler = FrameAssembler::new();
        assert!(assembler.push("*1*1*3").is_empty());
        assert!(assembler.has_partial());

        let complete = assembler.push("1##");
        assert_eq!(complete, vec!["*1*1*31##".to_owned()]);
        assert!(!assembler.has_partial());
    }

    #[test]
    fn should_yield_multiple_frames_from_one_push_in_order() {
        let mut assembler = FrameAssembler::new();
        let complete = assembler.push("*1*1*31##*2*0*82##*1*0*3");
        assert_eq!(
            complete,
            vec!["*1*1*31##".to_owned(), "*2*0*82##".to_owned()]
        );
        assert!(assembler.has_partial());
    }

    #[test]
    fn should_skip_lone_terminator_between_frames() {
        let mut assembler = FrameAssembler::new();
        let complete = assembler.push("*1*1*31####*2*2*82##");
        assert_eq!(
            complete,
            vec!["*1*1*31##".to_owned(), "*2*2*82##".to_owned()]
        );
    }

    #[test]
    fn should_bound_carry_growth_under_terminator_free_flood() {
        let mut assembler = FrameAssembler::new();
        let flood = "x".repeat(4096);
        assert!(assembler.push(&flood).is_empty());
        assert!(assembler.discarded() >= 4096);
        assert!(!assembler.has_partial());

        // Still functional afterwards.
        let complete = assembler.push("*1*1*31##");
        assert_eq!(complete, vec!["*1*1*31##".to_owned()]);
    }
}
