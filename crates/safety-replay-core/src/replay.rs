//! Replay of a recorded drive through a safety mode
//!
//! Every frame openpilot sent during the drive is run through the mode's tx
//! hook, and every frame received from the car through its rx hook, in log
//! order. The drive passes when no frame was blocked while controls were
//! allowed: blocks while disengaged are expected, blocks while engaged mean
//! the safety model and openpilot disagree.

use crate::error::{ReplayError, ReplayResult};
use crate::logs::{EventKind, LogHandle};
use crate::modes::ModeArg;
use crate::safety::{SafetyHooks, SafetyState, hooks_for};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Counters collected over one replay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayStats {
    /// Frames openpilot tried to send
    pub tx_total: u64,
    /// Sent frames while controls were allowed
    pub tx_controls: u64,
    pub tx_blocked: u64,
    /// Blocked frames while controls were allowed
    pub tx_controls_blocked: u64,
    pub blocked_addrs: BTreeSet<u32>,
    /// Received frames run through the rx hook
    pub rx_total: u64,
    /// Received frames that failed the rx checks
    pub rx_invalid: u64,
}

/// Outcome of a replay; `passed` is the truthiness the runner asserts on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayVerdict {
    pub passed: bool,
    pub stats: ReplayStats,
}

impl ReplayVerdict {
    pub fn pass() -> Self {
        Self {
            passed: true,
            stats: ReplayStats::default(),
        }
    }

    pub fn fail() -> Self {
        Self {
            passed: false,
            stats: ReplayStats::default(),
        }
    }
}

/// Runs a parsed log under a safety mode and parameter
#[cfg_attr(test, mockall::automock)]
pub trait ReplayEngine: Send + Sync {
    fn replay(&self, log: &LogHandle, mode: &ModeArg, param: i16) -> ReplayResult<ReplayVerdict>;
}

/// Replay engine backed by the safety hooks in [`crate::safety`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyReplay;

impl SafetyReplay {
    pub fn new() -> Self {
        Self
    }

    /// Numeric code of a mode argument
    ///
    /// Names the table did not know are accepted only if they are themselves
    /// a decimal or `0x`-prefixed hexadecimal code.
    pub fn mode_code(mode: &ModeArg) -> ReplayResult<u16> {
        match mode {
            ModeArg::Code(code) => Ok(*code),
            ModeArg::Raw(raw) => {
                let raw = raw.trim();
                let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
                    Some(hex) => u16::from_str_radix(hex, 16),
                    None => raw.parse::<u16>(),
                };
                parsed.map_err(|_| ReplayError::mode(format!("unknown safety mode '{}'", raw)))
            }
        }
    }

    fn hooks(mode: &ModeArg) -> ReplayResult<Box<dyn SafetyHooks>> {
        let code = Self::mode_code(mode)?;
        hooks_for(code)
            .ok_or_else(|| ReplayError::mode(format!("invalid safety mode: {}", code)))
    }
}

impl ReplayEngine for SafetyReplay {
    fn replay(&self, log: &LogHandle, mode: &ModeArg, param: i16) -> ReplayResult<ReplayVerdict> {
        let mut hooks = Self::hooks(mode)?;
        let mut state = SafetyState::new();
        hooks.init(&mut state, param);
        debug!("Replaying {} events with {} hooks", log.len(), hooks.name());

        let mut stats = ReplayStats::default();
        for event in log {
            state.set_timer((event.mono_time_ns / 1000) as u32);
            match &event.kind {
                EventKind::SendCan(frames) => {
                    for frame in frames {
                        let sent = hooks.tx(&mut state, frame);
                        if !sent {
                            stats.tx_blocked += 1;
                            stats.blocked_addrs.insert(frame.address);
                            if state.controls_allowed {
                                stats.tx_controls_blocked += 1;
                            }
                            debug!(
                                "Blocked {:#x} at {} (controls_allowed={})",
                                frame.address, event.mono_time_ns, state.controls_allowed
                            );
                        }
                        if state.controls_allowed {
                            stats.tx_controls += 1;
                        }
                        stats.tx_total += 1;
                    }
                }
                EventKind::Can(frames) => {
                    // skip the echoes of what openpilot sent
                    for frame in frames.iter().filter(|frame| !frame.is_echo()) {
                        stats.rx_total += 1;
                        if !hooks.rx(&mut state, frame) {
                            stats.rx_invalid += 1;
                        }
                    }
                }
                EventKind::Other => {}
            }
        }

        let lagging = hooks.lagging_addrs(&state);
        if !lagging.is_empty() {
            warn!("Checked addresses missing at end of log: {:x?}", lagging);
        }

        info!(
            tx_total = stats.tx_total,
            tx_controls = stats.tx_controls,
            tx_blocked = stats.tx_blocked,
            tx_controls_blocked = stats.tx_controls_blocked,
            blocked_addrs = ?stats.blocked_addrs,
            "Replay finished with {} hooks",
            hooks.name()
        );

        Ok(ReplayVerdict {
            passed: stats.tx_controls_blocked == 0,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::{CanFrame, LogEvent};
    use crate::modes::{SAFETY_ALLOUTPUT, SAFETY_NOOUTPUT, SAFETY_SUBARU, SAFETY_TOYOTA};

    fn lkas(torque: i32, src: u8) -> CanFrame {
        let word = (((-torque) & 0x1FFF) as u32) << 16;
        let mut data = vec![0u8; 8];
        data[..4].copy_from_slice(&word.to_le_bytes());
        CanFrame::new(0x122, src, data)
    }

    /// Subaru cruise frame with a valid checksum and the given counter
    fn cruise(engaged: bool, counter: u8) -> CanFrame {
        let mut data = vec![0u8; 8];
        data[1] = counter & 0xF;
        if engaged {
            data[5] = 0x02;
        }
        let seed = (0x240u32 as u8).wrapping_add((0x240u32 >> 8) as u8);
        data[0] = data[1..].iter().fold(seed, |acc, b| acc.wrapping_add(*b));
        CanFrame::new(0x240, 0, data)
    }

    #[test]
    fn test_mode_code() {
        assert_eq!(SafetyReplay::mode_code(&ModeArg::Code(7)).unwrap(), 7);
        assert_eq!(SafetyReplay::mode_code(&ModeArg::Raw("10".into())).unwrap(), 10);
        assert_eq!(
            SafetyReplay::mode_code(&ModeArg::Raw("0x1337".into())).unwrap(),
            SAFETY_ALLOUTPUT
        );
        let err = SafetyReplay::mode_code(&ModeArg::Raw("UNKNOWN_MODE".into())).unwrap_err();
        assert!(err.to_string().contains("UNKNOWN_MODE"));
    }

    #[test]
    fn test_unsupported_mode_is_an_error() {
        let log = LogHandle::default();
        let err = SafetyReplay
            .replay(&log, &ModeArg::Code(SAFETY_TOYOTA), 100)
            .unwrap_err();
        assert!(matches!(err, ReplayError::Mode { .. }));
    }

    #[test]
    fn test_nooutput_blocks_are_not_failures() {
        let log = LogHandle::new(vec![LogEvent::sendcan(1_000, vec![lkas(0, 0), lkas(0, 0)])]);
        let verdict = SafetyReplay
            .replay(&log, &ModeArg::Code(SAFETY_NOOUTPUT), 0)
            .unwrap();
        assert!(verdict.passed);
        assert_eq!(verdict.stats.tx_total, 2);
        assert_eq!(verdict.stats.tx_blocked, 2);
        assert_eq!(verdict.stats.tx_controls_blocked, 0);
        assert_eq!(verdict.stats.blocked_addrs, BTreeSet::from([0x122]));
    }

    #[test]
    fn test_alloutput_passes() {
        let log = LogHandle::new(vec![LogEvent::sendcan(1_000, vec![lkas(3000, 0)])]);
        let verdict = SafetyReplay
            .replay(&log, &ModeArg::Raw("0x1337".into()), 0)
            .unwrap();
        assert!(verdict.passed);
        assert_eq!(verdict.stats.tx_controls, 1);
    }

    #[test]
    fn test_subaru_clean_drive_passes() {
        let log = LogHandle::new(vec![
            LogEvent::can(1_000_000, vec![cruise(true, 1)]),
            LogEvent::sendcan(1_010_000, vec![lkas(40, 0)]),
            LogEvent::sendcan(1_020_000, vec![lkas(80, 0)]),
            // echo of our own frame must not reach the rx hook
            LogEvent::can(1_030_000, vec![lkas(80, 128)]),
            LogEvent::can(3_000_000, vec![cruise(false, 2)]),
            LogEvent::sendcan(3_010_000, vec![lkas(0, 0)]),
        ]);
        let verdict = SafetyReplay
            .replay(&log, &ModeArg::Code(SAFETY_SUBARU), 0)
            .unwrap();
        assert!(verdict.passed, "{:?}", verdict.stats);
        assert_eq!(verdict.stats.tx_total, 3);
        assert_eq!(verdict.stats.tx_controls, 2);
        assert_eq!(verdict.stats.tx_blocked, 0);
        assert_eq!(verdict.stats.rx_total, 2);
    }

    #[test]
    fn test_subaru_torque_jump_fails() {
        let log = LogHandle::new(vec![
            LogEvent::can(1_000_000, vec![cruise(true, 1)]),
            LogEvent::sendcan(1_010_000, vec![lkas(500, 0)]),
        ]);
        let verdict = SafetyReplay
            .replay(&log, &ModeArg::Code(SAFETY_SUBARU), 0)
            .unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.stats.tx_controls_blocked, 1);
        assert!(verdict.stats.blocked_addrs.contains(&0x122));
    }
}
