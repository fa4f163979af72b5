//! Newline-delimited JSON log format, optionally gzip-compressed
//!
//! ```text
//! {"logMonoTime": 1000000, "can": [{"address": 64, "src": 0, "dat": "AAECAwQFBgc="}]}
//! {"logMonoTime": 1010000, "sendcan": [{"address": 290, "src": 0, "dat": "AAAAAAAAAAA="}]}
//! ```

use super::{CanFrame, EventKind, LogEvent, LogHandle, LogReader};
use crate::error::{ReplayError, ReplayResult};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    log_mono_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    can: Option<Vec<RawFrame>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sendcan: Option<Vec<RawFrame>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawFrame {
    address: u32,
    src: u8,
    dat: String,
}

impl RawFrame {
    fn decode(self) -> Result<CanFrame, String> {
        let data = STANDARD
            .decode(self.dat.as_bytes())
            .map_err(|e| format!("bad payload for address {:#x}: {}", self.address, e))?;
        Ok(CanFrame::new(self.address, self.src, data))
    }

    fn encode(frame: &CanFrame) -> Self {
        Self {
            address: frame.address,
            src: frame.src,
            dat: STANDARD.encode(&frame.data),
        }
    }
}

/// Reads `.jsonl` logs, transparently gunzipping compressed files
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLogReader;

impl JsonLogReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse log content that is already in memory
    pub fn parse(&self, content: &str, origin: &str) -> ReplayResult<LogHandle> {
        let mut events = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let line_no = index + 1;
            let raw: RawEvent = serde_json::from_str(line)
                .map_err(|e| ReplayError::log_at(e.to_string(), origin, line_no))?;

            let kind = match (raw.can, raw.sendcan) {
                (Some(_), Some(_)) => {
                    return Err(ReplayError::log_at(
                        "event has both can and sendcan",
                        origin,
                        line_no,
                    ));
                }
                (Some(frames), None) => EventKind::Can(decode_frames(frames, origin, line_no)?),
                (None, Some(frames)) => {
                    EventKind::SendCan(decode_frames(frames, origin, line_no)?)
                }
                (None, None) => EventKind::Other,
            };
            events.push(LogEvent {
                mono_time_ns: raw.log_mono_time,
                kind,
            });
        }
        Ok(LogHandle::new(events))
    }
}

fn decode_frames(frames: Vec<RawFrame>, origin: &str, line: usize) -> ReplayResult<Vec<CanFrame>> {
    frames
        .into_iter()
        .map(|frame| frame.decode().map_err(|e| ReplayError::log_at(e, origin, line)))
        .collect()
}

impl LogReader for JsonLogReader {
    fn read(&self, path: &Path) -> ReplayResult<LogHandle> {
        let origin = path.display().to_string();
        let bytes = std::fs::read(path)
            .map_err(|e| ReplayError::log_file(format!("cannot open log: {}", e), &origin))?;

        let content = if bytes.starts_with(&GZIP_MAGIC) {
            let mut content = String::new();
            GzDecoder::new(bytes.as_slice())
                .read_to_string(&mut content)
                .map_err(|e| {
                    ReplayError::log_file(format!("cannot decompress log: {}", e), &origin)
                })?;
            content
        } else {
            String::from_utf8(bytes)
                .map_err(|e| ReplayError::log_file(format!("log is not UTF-8: {}", e), &origin))?
        };

        let log = self.parse(&content, &origin)?;
        tracing::debug!("Read {} events from {}", log.len(), origin);
        Ok(log)
    }
}

/// Serialize events into the format read by [`JsonLogReader`]
pub fn to_jsonl(events: &[LogEvent]) -> ReplayResult<String> {
    let mut out = String::new();
    for event in events {
        let (can, sendcan) = match &event.kind {
            EventKind::Can(frames) => (Some(frames.iter().map(RawFrame::encode).collect()), None),
            EventKind::SendCan(frames) => {
                (None, Some(frames.iter().map(RawFrame::encode).collect()))
            }
            EventKind::Other => (None, None),
        };
        let raw = RawEvent {
            log_mono_time: event.mono_time_ns,
            can,
            sendcan,
        };
        out.push_str(&serde_json::to_string(&raw)?);
        out.push('\n');
    }
    Ok(out)
}
