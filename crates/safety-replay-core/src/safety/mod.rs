//! CAN safety hooks
//!
//! A safety mode inspects every received frame (`rx`), decides whether each
//! frame openpilot wants to send is allowed (`tx`), and decides which bus a
//! frame is forwarded to (`fwd`). All modes share the vehicle-level state in
//! [`SafetyState`]; per-mode bookkeeping such as rx address checks lives in
//! the hooks themselves.

mod basic;
pub mod checks;
pub mod rx_checks;
mod state;
mod subaru;

pub use basic::{ALLOUTPUT_PARAM_PASSTHROUGH, AllOutputHooks, NoOutputHooks};
pub use state::{SafetyState, TorqueSample};
pub use subaru::SubaruHooks;

use crate::logs::CanFrame;
use crate::modes::{
    SAFETY_ALLOUTPUT, SAFETY_NOOUTPUT, SAFETY_SUBARU, SAFETY_SUBARU_HYBRID,
};

/// Allowed (address, bus, length) for transmitted frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanMsg {
    pub addr: u32,
    pub bus: u8,
    pub len: usize,
}

impl CanMsg {
    pub const fn new(addr: u32, bus: u8, len: usize) -> Self {
        Self { addr, bus, len }
    }
}

/// Hooks implementing one safety mode
pub trait SafetyHooks: Send {
    fn name(&self) -> &'static str;

    /// Called once when the mode is selected
    fn init(&mut self, state: &mut SafetyState, _param: i16) {
        state.controls_allowed = false;
        state.relay_malfunction = false;
    }

    /// Inspect a received frame; returns whether it passed the rx checks
    fn rx(&mut self, state: &mut SafetyState, frame: &CanFrame) -> bool;

    /// Returns whether the frame may be sent
    fn tx(&mut self, state: &mut SafetyState, frame: &CanFrame) -> bool;

    /// Bus to forward a frame received on `bus` to, if any
    fn fwd(&self, state: &SafetyState, bus: u8, frame: &CanFrame) -> Option<u8>;

    /// Checked rx addresses that have gone quiet
    fn lagging_addrs(&self, _state: &SafetyState) -> Vec<u32> {
        Vec::new()
    }
}

/// Hooks for a numeric safety mode code, `None` if the mode has no hooks here
pub fn hooks_for(code: u16) -> Option<Box<dyn SafetyHooks>> {
    match code {
        SAFETY_NOOUTPUT => Some(Box::new(NoOutputHooks)),
        SAFETY_ALLOUTPUT => Some(Box::new(AllOutputHooks::default())),
        SAFETY_SUBARU => Some(Box::new(SubaruHooks::global())),
        SAFETY_SUBARU_HYBRID => Some(Box::new(SubaruHooks::hybrid())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::{SAFETY_ELM327, SAFETY_TOYOTA};

    #[test]
    fn test_hooks_for_known_codes() {
        assert_eq!(hooks_for(SAFETY_NOOUTPUT).unwrap().name(), "NOOUTPUT");
        assert_eq!(hooks_for(SAFETY_ALLOUTPUT).unwrap().name(), "ALLOUTPUT");
        assert_eq!(hooks_for(SAFETY_SUBARU).unwrap().name(), "SUBARU");
        assert_eq!(
            hooks_for(SAFETY_SUBARU_HYBRID).unwrap().name(),
            "SUBARU_HYBRID"
        );
    }

    #[test]
    fn test_alloutput_from_table_honours_passthrough() {
        let frame = CanFrame::new(0x122, 0, vec![0; 8]);

        let mut hooks = hooks_for(SAFETY_ALLOUTPUT).unwrap();
        let mut state = SafetyState::new();
        hooks.init(&mut state, ALLOUTPUT_PARAM_PASSTHROUGH);
        assert!(state.controls_allowed);
        assert!(hooks.tx(&mut state, &frame));
        assert_eq!(hooks.fwd(&state, 0, &frame), Some(2));
        assert_eq!(hooks.fwd(&state, 2, &frame), Some(0));
        assert_eq!(hooks.fwd(&state, 1, &frame), None);

        let mut hooks = hooks_for(SAFETY_ALLOUTPUT).unwrap();
        hooks.init(&mut state, 0);
        assert_eq!(hooks.fwd(&state, 0, &frame), None);
    }

    #[test]
    fn test_hooks_for_unsupported_codes() {
        assert!(hooks_for(SAFETY_TOYOTA).is_none());
        assert!(hooks_for(SAFETY_ELM327).is_none());
        assert!(hooks_for(0xBEEF).is_none());
    }
}
