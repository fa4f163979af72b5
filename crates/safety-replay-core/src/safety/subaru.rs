//! Subaru global platform and hybrid safety

use super::checks::{
    DriverLimits, driver_limit_check, generic_rx_checks, max_limit_check, msg_allowed,
    rt_rate_limit_check, to_signed,
};
use super::rx_checks::{FrameIntegrity, RxCheckSpec, RxChecks};
use super::{CanMsg, SafetyHooks, SafetyState};
use crate::logs::CanFrame;

pub const SUBARU_MAX_STEER: i32 = 2047;
/// Max torque change within one real-time window
pub const SUBARU_MAX_RT_DELTA: i32 = 940;
/// Real-time window length in microseconds
pub const SUBARU_RT_INTERVAL: u32 = 250_000;
pub const SUBARU_MAX_RATE_UP: i32 = 50;
pub const SUBARU_MAX_RATE_DOWN: i32 = 70;
pub const SUBARU_DRIVER_TORQUE_ALLOWANCE: i32 = 60;
pub const SUBARU_DRIVER_TORQUE_FACTOR: i32 = 10;
/// Averaged wheel speed above which the car counts as moving (about 1 kph)
pub const SUBARU_STANDSTILL_THRSLD: u32 = 20;

const ADDR_THROTTLE: u32 = 0x40;
const ADDR_STEERING_TORQUE: u32 = 0x119;
const ADDR_BRAKE_PEDAL: u32 = 0x139;
const ADDR_WHEEL_SPEEDS: u32 = 0x13a;
const ADDR_CRUISE_CONTROL: u32 = 0x240;
const ADDR_HYBRID_CRUISE: u32 = 0x321;
const ADDR_ES_LKAS: u32 = 0x122;
const ADDR_ES_DISTANCE: u32 = 0x221;
const ADDR_ES_LKAS_STATE: u32 = 0x322;

const SUBARU_TX_MSGS: &[CanMsg] = &[
    CanMsg::new(ADDR_ES_LKAS, 0, 8),
    CanMsg::new(ADDR_ES_DISTANCE, 0, 8),
    CanMsg::new(ADDR_ES_LKAS_STATE, 0, 8),
];

const SUBARU_RX_CHECKS: &[RxCheckSpec] = &[
    RxCheckSpec::new(ADDR_THROTTLE, 0, 8, 10_000),
    RxCheckSpec::new(ADDR_STEERING_TORQUE, 0, 8, 20_000),
    RxCheckSpec::new(ADDR_BRAKE_PEDAL, 0, 8, 20_000),
    RxCheckSpec::new(ADDR_WHEEL_SPEEDS, 0, 8, 20_000),
    RxCheckSpec::new(ADDR_CRUISE_CONTROL, 0, 8, 50_000),
];

const SUBARU_HYBRID_RX_CHECKS: &[RxCheckSpec] = &[
    RxCheckSpec::new(ADDR_THROTTLE, 0, 8, 10_000),
    RxCheckSpec::new(ADDR_STEERING_TORQUE, 0, 8, 20_000),
    RxCheckSpec::new(ADDR_BRAKE_PEDAL, 0, 8, 20_000),
    RxCheckSpec::new(ADDR_WHEEL_SPEEDS, 0, 8, 20_000),
    RxCheckSpec::new(ADDR_HYBRID_CRUISE, 2, 8, 100_000),
];

const STEER_LIMITS: DriverLimits = DriverLimits {
    max: SUBARU_MAX_STEER,
    rate_up: SUBARU_MAX_RATE_UP,
    rate_down: SUBARU_MAX_RATE_DOWN,
    driver_allowance: SUBARU_DRIVER_TORQUE_ALLOWANCE,
    driver_factor: SUBARU_DRIVER_TORQUE_FACTOR,
};

/// Checksum in byte 0, counter in the low nibble of byte 1
struct SubaruIntegrity;

impl FrameIntegrity for SubaruIntegrity {
    fn checksum(&self, frame: &CanFrame) -> u8 {
        frame.byte(0)
    }

    fn compute_checksum(&self, frame: &CanFrame) -> u8 {
        let seed = (frame.address as u8).wrapping_add((frame.address >> 8) as u8);
        frame
            .data
            .iter()
            .skip(1)
            .fold(seed, |acc, byte| acc.wrapping_add(*byte))
    }

    fn counter(&self, frame: &CanFrame) -> u8 {
        frame.byte(1) & 0xF
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Platform {
    Global,
    Hybrid,
}

#[derive(Debug, Clone)]
pub struct SubaruHooks {
    platform: Platform,
    rx_checks: RxChecks,
}

impl SubaruHooks {
    pub fn global() -> Self {
        Self {
            platform: Platform::Global,
            rx_checks: RxChecks::new(SUBARU_RX_CHECKS),
        }
    }

    pub fn hybrid() -> Self {
        Self {
            platform: Platform::Hybrid,
            rx_checks: RxChecks::new(SUBARU_HYBRID_RX_CHECKS),
        }
    }

    fn rx_global(state: &mut SafetyState, frame: &CanFrame) {
        let addr = frame.address;
        match addr {
            ADDR_STEERING_TORQUE => state.torque_driver.update(driver_torque(frame)),
            // enter controls on rising edge of ACC, exit on ACC off
            ADDR_CRUISE_CONTROL => update_cruise(state, (frame.bytes_48() >> 9) & 1 != 0),
            ADDR_WHEEL_SPEEDS => state.vehicle_moving = vehicle_moving(frame),
            ADDR_BRAKE_PEDAL => state.brake_pressed = brake_pressed(frame),
            ADDR_THROTTLE => state.gas_pressed = frame.byte(4) != 0,
            _ => {}
        }
        generic_rx_checks(state, addr == ADDR_ES_LKAS);
    }

    fn rx_hybrid(state: &mut SafetyState, frame: &CanFrame) {
        let addr = frame.address;
        match (frame.bus(), addr) {
            (0, ADDR_STEERING_TORQUE) => state.torque_driver.update(driver_torque(frame)),
            (2, ADDR_HYBRID_CRUISE) => update_cruise(state, (frame.byte(4) >> 4) & 1 != 0),
            (0, ADDR_WHEEL_SPEEDS) => state.vehicle_moving = vehicle_moving(frame),
            (0, ADDR_BRAKE_PEDAL) => {
                state.brake_pressed = brake_pressed(frame);
                if state.brake_pressed && (!state.brake_pressed_prev || state.vehicle_moving) {
                    state.controls_allowed = false;
                }
                state.brake_pressed_prev = state.brake_pressed;
            }
            (0, ADDR_THROTTLE) => {
                state.gas_pressed = frame.byte(4) != 0;
                if state.gas_pressed && !state.gas_pressed_prev {
                    state.controls_allowed = false;
                }
                state.gas_pressed_prev = state.gas_pressed;
            }
            (0, ADDR_ES_LKAS) if state.relay_check_active() => state.set_relay_malfunction(),
            _ => {}
        }
    }
}

fn driver_torque(frame: &CanFrame) -> i32 {
    let raw = ((frame.bytes_04() >> 16) & 0x7FF) as i32;
    -to_signed(raw, 11)
}

/// Averages front-right and rear-left wheel speeds
fn vehicle_moving(frame: &CanFrame) -> bool {
    let front_right = (frame.bytes_04() >> 12) & 0x1FFF;
    let rear_left = (frame.bytes_48() >> 6) & 0x1FFF;
    (front_right + rear_left) / 2 > SUBARU_STANDSTILL_THRSLD
}

fn brake_pressed(frame: &CanFrame) -> bool {
    frame.bytes_48() & 0xFFF0 > 0
}

fn update_cruise(state: &mut SafetyState, engaged: bool) {
    if engaged && !state.cruise_engaged_prev {
        state.controls_allowed = true;
    }
    if !engaged {
        state.controls_allowed = false;
    }
    state.cruise_engaged_prev = engaged;
}

/// Steering torque requested by an ES_LKAS frame
fn desired_torque(frame: &CanFrame) -> i32 {
    let raw = ((frame.bytes_04() >> 16) & 0x1FFF) as i32;
    -to_signed(raw, 13)
}

impl SafetyHooks for SubaruHooks {
    fn name(&self) -> &'static str {
        match self.platform {
            Platform::Global => "SUBARU",
            Platform::Hybrid => "SUBARU_HYBRID",
        }
    }

    fn rx(&mut self, state: &mut SafetyState, frame: &CanFrame) -> bool {
        let valid = self.rx_checks.check(state, frame, &SubaruIntegrity);
        if valid {
            match self.platform {
                Platform::Global if frame.bus() == 0 => Self::rx_global(state, frame),
                Platform::Global => {}
                Platform::Hybrid => Self::rx_hybrid(state, frame),
            }
        }
        valid
    }

    fn tx(&mut self, state: &mut SafetyState, frame: &CanFrame) -> bool {
        let mut tx = msg_allowed(frame, SUBARU_TX_MSGS) && !state.relay_malfunction;

        if frame.address == ADDR_ES_LKAS {
            let desired = desired_torque(frame);
            let ts = state.timer();
            let mut violation = false;

            if state.controls_allowed {
                violation |= max_limit_check(desired, SUBARU_MAX_STEER, -SUBARU_MAX_STEER);
                violation |= driver_limit_check(
                    desired,
                    state.desired_torque_last,
                    &state.torque_driver,
                    &STEER_LIMITS,
                );
                state.desired_torque_last = desired;

                violation |= rt_rate_limit_check(desired, state.rt_torque_last, SUBARU_MAX_RT_DELTA);
                if state.elapsed_since(state.ts_last) > SUBARU_RT_INTERVAL {
                    state.rt_torque_last = desired;
                    state.ts_last = ts;
                }
            }

            // no torque if controls are not allowed
            if !state.controls_allowed && desired != 0 {
                violation = true;
            }

            if violation || !state.controls_allowed {
                state.desired_torque_last = 0;
                state.rt_torque_last = 0;
                state.ts_last = ts;
            }

            if violation {
                tx = false;
            }
        }
        tx
    }

    fn fwd(&self, state: &SafetyState, bus: u8, frame: &CanFrame) -> Option<u8> {
        if state.relay_malfunction {
            return None;
        }
        match bus {
            // camera CAN
            0 => Some(2),
            // LKAS, distance and LKAS state come from openpilot instead
            2 if !matches!(
                frame.address,
                ADDR_ES_LKAS | ADDR_ES_DISTANCE | ADDR_ES_LKAS_STATE
            ) =>
            {
                Some(0)
            }
            _ => None,
        }
    }

    fn lagging_addrs(&self, state: &SafetyState) -> Vec<u32> {
        self.rx_checks.lagging(state)
    }
}
