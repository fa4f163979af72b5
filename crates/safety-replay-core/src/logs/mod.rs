//! Driving log model and readers
//!
//! A [`LogHandle`] is the parsed form of one route file: an ordered list of
//! timestamped events, of which only CAN traffic matters for replay. Frames
//! received from the car arrive as [`EventKind::Can`]; frames openpilot asked
//! the panda to send arrive as [`EventKind::SendCan`].

mod jsonl;

pub use jsonl::{JsonLogReader, to_jsonl};

use crate::error::ReplayResult;
use std::path::Path;

/// `src` values at or above this mark frames echoed back after sending
pub const ECHO_SRC_OFFSET: u8 = 128;

/// A single CAN frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanFrame {
    pub address: u32,
    /// Bus number, with [`ECHO_SRC_OFFSET`] added for echoed frames
    pub src: u8,
    pub data: Vec<u8>,
}

impl CanFrame {
    pub fn new(address: u32, src: u8, data: impl Into<Vec<u8>>) -> Self {
        Self {
            address,
            src,
            data: data.into(),
        }
    }

    /// Bus the frame was seen on
    pub fn bus(&self) -> u8 {
        self.src & 0x0F
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether this is openpilot's own frame echoed back by the panda
    pub fn is_echo(&self) -> bool {
        self.src >= ECHO_SRC_OFFSET
    }

    /// Byte at `index`, zero past the end of the payload
    pub fn byte(&self, index: usize) -> u8 {
        self.data.get(index).copied().unwrap_or(0)
    }

    /// Little-endian word made of bytes 0..4
    pub fn bytes_04(&self) -> u32 {
        self.le_word(0)
    }

    /// Little-endian word made of bytes 4..8
    pub fn bytes_48(&self) -> u32 {
        self.le_word(4)
    }

    fn le_word(&self, start: usize) -> u32 {
        u32::from_le_bytes([
            self.byte(start),
            self.byte(start + 1),
            self.byte(start + 2),
            self.byte(start + 3),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Can(Vec<CanFrame>),
    SendCan(Vec<CanFrame>),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Monotonic log time in nanoseconds
    pub mono_time_ns: u64,
    pub kind: EventKind,
}

impl LogEvent {
    pub fn can(mono_time_ns: u64, frames: Vec<CanFrame>) -> Self {
        Self {
            mono_time_ns,
            kind: EventKind::Can(frames),
        }
    }

    pub fn sendcan(mono_time_ns: u64, frames: Vec<CanFrame>) -> Self {
        Self {
            mono_time_ns,
            kind: EventKind::SendCan(frames),
        }
    }
}

/// Parsed log of one route
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogHandle {
    events: Vec<LogEvent>,
}

impl LogHandle {
    pub fn new(events: Vec<LogEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<'a> IntoIterator for &'a LogHandle {
    type Item = &'a LogEvent;
    type IntoIter = std::slice::Iter<'a, LogEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Parses a route file into a [`LogHandle`]
#[cfg_attr(test, mockall::automock)]
pub trait LogReader: Send + Sync {
    fn read(&self, path: &Path) -> ReplayResult<LogHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_words_are_little_endian() {
        let frame = CanFrame::new(0x119, 0, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(frame.bytes_04(), 0x0403_0201);
        assert_eq!(frame.bytes_48(), 0x0807_0605);
    }

    #[test]
    fn test_short_frame_reads_zero() {
        let frame = CanFrame::new(0x40, 0, vec![0xAA]);
        assert_eq!(frame.byte(0), 0xAA);
        assert_eq!(frame.byte(4), 0);
        assert_eq!(frame.bytes_48(), 0);
    }

    #[test]
    fn test_echo_and_bus() {
        let frame = CanFrame::new(0x122, 128, vec![0; 8]);
        assert!(frame.is_echo());
        assert_eq!(frame.bus(), 0);

        let frame = CanFrame::new(0x321, 2, vec![0; 8]);
        assert!(!frame.is_echo());
        assert_eq!(frame.bus(), 2);
    }
}
