//! Checksum and counter validation of received frames
//!
//! Each checked address keeps a running tally of counter mismatches. Once an
//! address reaches [`MAX_WRONG_COUNTERS`], or its latest checksum is wrong,
//! its frames are invalid and controls are disallowed until it recovers.

use super::state::SafetyState;
use crate::logs::CanFrame;

pub const MAX_WRONG_COUNTERS: u8 = 5;

/// Static description of a checked message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxCheckSpec {
    pub addr: u32,
    pub bus: u8,
    pub len: usize,
    pub check_checksum: bool,
    /// Highest counter value before wrapping; 0 disables the counter check
    pub max_counter: u8,
    /// Nominal period in microseconds
    pub expected_timestep: u32,
}

impl RxCheckSpec {
    pub const fn new(addr: u32, bus: u8, len: usize, expected_timestep: u32) -> Self {
        Self {
            addr,
            bus,
            len,
            check_checksum: true,
            max_counter: 15,
            expected_timestep,
        }
    }

    fn matches(&self, frame: &CanFrame) -> bool {
        self.addr == frame.address && self.bus == frame.bus() && self.len == frame.len()
    }
}

/// Per-mode functions extracting and computing integrity fields
pub trait FrameIntegrity {
    fn checksum(&self, frame: &CanFrame) -> u8;
    fn compute_checksum(&self, frame: &CanFrame) -> u8;
    fn counter(&self, frame: &CanFrame) -> u8;
}

#[derive(Debug, Clone)]
struct RxCheckStatus {
    spec: RxCheckSpec,
    valid_checksum: bool,
    wrong_counters: u8,
    last_counter: u8,
    last_seen: Option<u32>,
}

/// Mutable rx check table of one safety mode
#[derive(Debug, Clone)]
pub struct RxChecks {
    entries: Vec<RxCheckStatus>,
}

impl RxChecks {
    pub fn new(specs: &[RxCheckSpec]) -> Self {
        Self {
            entries: specs
                .iter()
                .map(|spec| RxCheckStatus {
                    spec: *spec,
                    valid_checksum: true,
                    wrong_counters: 0,
                    last_counter: 0,
                    last_seen: None,
                })
                .collect(),
        }
    }

    /// Validate a received frame, updating the tallies for its address
    ///
    /// Frames whose address is not in the table are always valid.
    pub fn check(
        &mut self,
        state: &mut SafetyState,
        frame: &CanFrame,
        integrity: &dyn FrameIntegrity,
    ) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.spec.matches(frame)) else {
            return true;
        };
        entry.last_seen = Some(state.timer());

        entry.valid_checksum = if entry.spec.check_checksum {
            integrity.checksum(frame) == integrity.compute_checksum(frame)
        } else {
            true
        };

        if entry.spec.max_counter > 0 {
            let counter = integrity.counter(frame);
            let expected = ((u16::from(entry.last_counter) + 1)
                % (u16::from(entry.spec.max_counter) + 1)) as u8;
            entry.wrong_counters = if expected == counter {
                entry.wrong_counters.saturating_sub(1)
            } else {
                (entry.wrong_counters + 1).min(MAX_WRONG_COUNTERS)
            };
            entry.last_counter = counter;
        } else {
            entry.wrong_counters = 0;
        }

        let valid = entry.valid_checksum && entry.wrong_counters < MAX_WRONG_COUNTERS;
        if !valid {
            tracing::debug!(
                "Invalid rx frame {:#x}: checksum_ok={}, wrong_counters={}",
                frame.address,
                entry.valid_checksum,
                entry.wrong_counters
            );
            state.controls_allowed = false;
        }
        valid
    }

    /// Addresses that have not been seen within ten periods
    pub fn lagging(&self, state: &SafetyState) -> Vec<u32> {
        self.entries
            .iter()
            .filter(|entry| match entry.last_seen {
                Some(seen) => {
                    state.elapsed_since(seen) > entry.spec.expected_timestep.saturating_mul(10)
                }
                None => true,
            })
            .map(|entry| entry.spec.addr)
            .collect()
    }
}
