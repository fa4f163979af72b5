//! Vehicle state shared by all safety modes

/// Time after mode selection before a stock ECU on the harness bus counts
/// as a relay malfunction
const RELAY_TRANSITION_US: u32 = 1_000_000;

const SAMPLE_LEN: usize = 6;

/// Sliding window over the most recent driver torque readings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TorqueSample {
    values: [i32; SAMPLE_LEN],
    pub min: i32,
    pub max: i32,
}

impl TorqueSample {
    pub fn update(&mut self, value: i32) {
        self.values.rotate_right(1);
        self.values[0] = value;
        self.min = self.values.iter().copied().min().unwrap_or(0);
        self.max = self.values.iter().copied().max().unwrap_or(0);
    }
}

#[derive(Debug, Clone, Default)]
pub struct SafetyState {
    pub controls_allowed: bool,
    pub relay_malfunction: bool,
    pub gas_pressed: bool,
    pub gas_pressed_prev: bool,
    pub brake_pressed: bool,
    pub brake_pressed_prev: bool,
    pub vehicle_moving: bool,
    pub cruise_engaged_prev: bool,
    pub torque_driver: TorqueSample,
    pub desired_torque_last: i32,
    pub rt_torque_last: i32,
    /// Timer value when the real-time torque window last reset
    pub ts_last: u32,
    timer: u32,
    mode_started_at: Option<u32>,
}

impl SafetyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current timer in microseconds (wraps at 2^32)
    pub fn timer(&self) -> u32 {
        self.timer
    }

    /// Advance the timer; the first call marks when the mode went live
    pub fn set_timer(&mut self, micros: u32) {
        self.timer = micros;
        if self.mode_started_at.is_none() {
            self.mode_started_at = Some(micros);
        }
    }

    /// Microseconds since `since`, tolerant of timer wrap
    pub fn elapsed_since(&self, since: u32) -> u32 {
        self.timer.wrapping_sub(since)
    }

    /// Whether enough time has passed for stock ECU traffic to indicate a
    /// broken relay
    pub fn relay_check_active(&self) -> bool {
        self.mode_started_at
            .is_some_and(|start| self.elapsed_since(start) > RELAY_TRANSITION_US)
    }

    pub fn set_relay_malfunction(&mut self) {
        if !self.relay_malfunction {
            tracing::warn!("Relay malfunction: stock ECU traffic on harness bus");
        }
        self.relay_malfunction = true;
        self.controls_allowed = false;
    }
}
