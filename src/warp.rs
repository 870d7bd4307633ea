//! The warp drive: a double-tap detector on the forward key plus the
//! field-of-view ramp that makes engaging it look like a jump to lightspeed.

use crate::config::{DemoConfig, FOV_RECOVERY_FACTOR};

/// Warp engagement and the field of view it drives.
#[derive(Clone, Debug)]
pub struct WarpDrive {
    engaged: bool,
    start_time: f32,
    stop_time: f32,
    last_forward_press: f32,
    fov: f32,
    fov_normal: f32,
    fov_warp: f32,
    fov_inc_rate: f32,
    double_tap_window: f32,
}

impl WarpDrive {
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            engaged: false,
            start_time: 100.0,
            stop_time: -100.0,
            last_forward_press: -100.0,
            fov: config.fov_normal,
            fov_normal: config.fov_normal,
            fov_warp: config.fov_warp,
            fov_inc_rate: config.fov_inc_rate,
            double_tap_window: config.double_tap_window,
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Current field of view in degrees.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    pub fn stop_time(&self) -> f32 {
        self.stop_time
    }

    /// Feed a forward-key press at `now`. Returns `true` if this press
    /// completed a double tap and engaged the drive.
    pub fn forward_pressed(&mut self, now: f32) -> bool {
        let double_tap = now - self.last_forward_press < self.double_tap_window;
        self.last_forward_press = now;
        if double_tap && !self.engaged {
            self.engage(now);
            return true;
        }
        false
    }

    /// Feed a forward-key release at `now`. Returns `true` if the drive was
    /// engaged and has now shut down.
    pub fn forward_released(&mut self, now: f32) -> bool {
        if self.engaged {
            self.disengage(now);
            return true;
        }
        false
    }

    pub fn engage(&mut self, now: f32) {
        self.engaged = true;
        self.start_time = now;
        tracing::debug!(time = now, "warp engaged");
    }

    pub fn disengage(&mut self, now: f32) {
        self.engaged = false;
        self.stop_time = now;
        tracing::debug!(time = now, fov = self.fov, "warp disengaged");
    }

    /// Advance the field of view to `now` and return it.
    ///
    /// While engaged the step grows with time since engagement and stops at
    /// the warp fov. Once disengaged the fov falls back ten times faster and
    /// stops at the normal fov.
    pub fn update(&mut self, now: f32) -> f32 {
        if self.engaged {
            let elapsed = (now - self.start_time).max(0.0);
            self.fov = (self.fov + self.fov_inc_rate * elapsed).min(self.fov_warp);
        } else {
            let elapsed = (now - self.stop_time).max(0.0);
            self.fov = (self.fov - FOV_RECOVERY_FACTOR * self.fov_inc_rate * elapsed)
                .max(self.fov_normal);
        }
        self.fov
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FOV_NORMAL, FOV_WARP};

    fn drive() -> WarpDrive {
        WarpDrive::new(&DemoConfig::default())
    }

    #[test]
    fn starts_cruising_at_normal_fov() {
        let mut warp = drive();
        assert!(!warp.is_engaged());
        assert_eq!(warp.fov(), FOV_NORMAL);
        assert_eq!(warp.update(0.0), FOV_NORMAL);
        assert_eq!(warp.update(5.0), FOV_NORMAL);
    }

    #[test]
    fn one_second_of_warp_adds_rate() {
        let mut warp = drive();
        warp.engage(0.0);
        let fov = warp.update(1.0);
        assert!((fov - 60.8).abs() < 1e-4, "fov = {fov}");
    }

    #[test]
    fn double_tap_engages_within_window() {
        let mut warp = drive();
        assert!(!warp.forward_pressed(1.0));
        assert!(warp.forward_pressed(1.15));
        assert!(warp.is_engaged());
        assert_eq!(warp.start_time(), 1.15);
    }

    #[test]
    fn slow_taps_do_not_engage() {
        let mut warp = drive();
        assert!(!warp.forward_pressed(1.0));
        assert!(!warp.forward_released(1.1));
        assert!(!warp.forward_pressed(1.25));
        assert!(!warp.is_engaged());
        assert!(!warp.forward_pressed(2.0));
        assert!(!warp.is_engaged());
    }

    #[test]
    fn press_while_engaged_keeps_start_time() {
        let mut warp = drive();
        warp.forward_pressed(0.0);
        warp.forward_pressed(0.1);
        assert!(!warp.forward_pressed(0.15));
        assert_eq!(warp.start_time(), 0.1);
    }

    #[test]
    fn release_records_stop_only_when_engaged() {
        let mut warp = drive();
        assert!(!warp.forward_released(3.0));
        assert_eq!(warp.stop_time(), -100.0);

        warp.forward_pressed(3.0);
        warp.forward_pressed(3.1);
        assert!(warp.forward_released(4.0));
        assert!(!warp.is_engaged());
        assert_eq!(warp.stop_time(), 4.0);
    }

    #[test]
    fn ramp_is_monotonic_and_bounded() {
        let mut warp = drive();
        warp.engage(0.0);
        let mut previous = warp.fov();
        let mut t = 0.0;
        while t < 30.0 {
            t += 1.0 / 60.0;
            let fov = warp.update(t);
            assert!(fov >= previous);
            assert!(fov <= FOV_WARP);
            previous = fov;
        }
        assert_eq!(previous, FOV_WARP);

        warp.disengage(t);
        let stop = t;
        while t < stop + 5.0 {
            t += 1.0 / 60.0;
            let fov = warp.update(t);
            assert!(fov <= previous);
            assert!(fov >= FOV_NORMAL);
            previous = fov;
        }
        assert_eq!(previous, FOV_NORMAL);
    }

    #[test]
    fn recovery_is_ten_times_faster() {
        let mut warp = drive();
        warp.engage(0.0);
        warp.update(10.0);
        warp.update(20.0);
        let peak = warp.fov();
        assert!(peak > 80.0);

        warp.disengage(20.0);
        let fov = warp.update(21.0);
        assert!((peak - fov - 8.0).abs() < 1e-3 || fov == FOV_NORMAL);
    }
}
