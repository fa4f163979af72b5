//! Limit checks shared by the torque-based safety modes

use super::CanMsg;
use super::state::{SafetyState, TorqueSample};
use crate::logs::CanFrame;

/// Interpret the low `bits` bits of `value` as two's complement
pub fn to_signed(value: i32, bits: u32) -> i32 {
    let mut signed = value;
    if value >= (1 << (bits - 1)) {
        signed = value - (1 << bits);
    }
    signed
}

/// True when `value` is outside `[min, max]`
pub fn max_limit_check(value: i32, max: i32, min: i32) -> bool {
    value > max || value < min
}

/// Torque rate limits relaxed by how hard the driver is steering
#[derive(Debug, Clone, Copy)]
pub struct DriverLimits {
    pub max: i32,
    pub rate_up: i32,
    pub rate_down: i32,
    pub driver_allowance: i32,
    pub driver_factor: i32,
}

/// True when `value` violates the rate limits given the previous command and
/// the measured driver torque
pub fn driver_limit_check(
    value: i32,
    value_last: i32,
    driver_torque: &TorqueSample,
    limits: &DriverLimits,
) -> bool {
    let highest_allowed_rl = value_last.max(0) + limits.rate_up;
    let lowest_allowed_rl = value_last.min(0) - limits.rate_up;

    let driver_max_limit =
        limits.max + (limits.driver_allowance + driver_torque.max) * limits.driver_factor;
    let driver_min_limit =
        -limits.max + (-limits.driver_allowance + driver_torque.min) * limits.driver_factor;

    // past the driver-adjusted limit the command has to head back to zero
    let highest_allowed =
        highest_allowed_rl.min((value_last - limits.rate_down).max(driver_max_limit.max(0)));
    let lowest_allowed =
        lowest_allowed_rl.max((value_last + limits.rate_down).min(driver_min_limit.min(0)));

    value < lowest_allowed || value > highest_allowed
}

/// True when `value` moved more than `max_delta` away from the value at the
/// start of the current real-time window
pub fn rt_rate_limit_check(value: i32, value_last: i32, max_delta: i32) -> bool {
    let highest = value_last.max(0) + max_delta;
    let lowest = value_last.min(0) - max_delta;
    value < lowest || value > highest
}

/// True when the frame's address, bus and length are in `allowed`
pub fn msg_allowed(frame: &CanFrame, allowed: &[CanMsg]) -> bool {
    allowed.iter().any(|msg| {
        msg.addr == frame.address && msg.bus == frame.bus() && msg.len == frame.len()
    })
}

/// Disengage on gas and brake edges and watch for a stock ECU on the bus the
/// harness should have cut
pub fn generic_rx_checks(state: &mut SafetyState, stock_ecu_detected: bool) {
    if state.gas_pressed && !state.gas_pressed_prev {
        state.controls_allowed = false;
    }
    state.gas_pressed_prev = state.gas_pressed;

    if state.brake_pressed && (!state.brake_pressed_prev || state.vehicle_moving) {
        state.controls_allowed = false;
    }
    state.brake_pressed_prev = state.brake_pressed;

    if stock_ecu_detected && state.relay_check_active() {
        state.set_relay_malfunction();
    }
}
