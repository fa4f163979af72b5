//! Trivial safety modes

use super::{SafetyHooks, SafetyState};
use crate::logs::CanFrame;

/// Parameter bit enabling bus 0 <-> bus 2 forwarding in ALLOUTPUT
pub const ALLOUTPUT_PARAM_PASSTHROUGH: i16 = 1;

/// Blocks every transmission
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOutputHooks;

impl SafetyHooks for NoOutputHooks {
    fn name(&self) -> &'static str {
        "NOOUTPUT"
    }

    fn rx(&mut self, _state: &mut SafetyState, _frame: &CanFrame) -> bool {
        true
    }

    fn tx(&mut self, _state: &mut SafetyState, _frame: &CanFrame) -> bool {
        false
    }

    fn fwd(&self, _state: &SafetyState, _bus: u8, _frame: &CanFrame) -> Option<u8> {
        None
    }
}

/// Allows everything; for development setups only
#[derive(Debug, Clone, Copy, Default)]
pub struct AllOutputHooks {
    passthrough: bool,
}

impl SafetyHooks for AllOutputHooks {
    fn name(&self) -> &'static str {
        "ALLOUTPUT"
    }

    fn init(&mut self, state: &mut SafetyState, param: i16) {
        self.passthrough = param & ALLOUTPUT_PARAM_PASSTHROUGH != 0;
        state.controls_allowed = true;
        state.relay_malfunction = false;
    }

    fn rx(&mut self, _state: &mut SafetyState, _frame: &CanFrame) -> bool {
        true
    }

    fn tx(&mut self, _state: &mut SafetyState, _frame: &CanFrame) -> bool {
        true
    }

    fn fwd(&self, _state: &SafetyState, bus: u8, _frame: &CanFrame) -> Option<u8> {
        match (self.passthrough, bus) {
            (true, 0) => Some(2),
            (true, 2) => Some(0),
            _ => None,
        }
    }
}
