//! Plant ↔ encoder ↔ controller loop.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::control::SpeedController;
use crate::encoder::EncoderQuantizer;
use crate::plant::FirstOrderPlant;

use super::report::{CrossCheckReport, Tolerance};

/// One recorded sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraceSample {
    /// Sample index.
    pub n: usize,
    /// Time [s].
    pub t: f32,
    /// Setpoint [rad/s].
    pub w: f32,
    /// True plant velocity at the latch instant [rad/s].
    pub x_true: f32,
    /// Quantized measured velocity [rad/s].
    pub x_meas: f32,
    /// Encoder ticks in this gate period.
    pub spdcnt: i16,
    /// Saturated controller output [V].
    pub y: f32,
    /// Output magnitude relative to the limit [%].
    pub duty: f32,
}

/// Recorded closed-loop run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Trace {
    pub samples: Vec<TraceSample>,
}

impl Trace {
    /// Controller outputs in sample order.
    pub fn outputs(&self) -> Vec<f32> {
        self.samples.iter().map(|s| s.y).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Peak |y| over the run.
    pub fn peak_output(&self) -> f32 {
        self.samples.iter().fold(0.0_f32, |m, s| m.max(s.y.abs()))
    }
}

/// Closed loop of plant, encoder and a constant setpoint.
///
/// Per sample: latch the encoder on the current plant velocity, step the
/// controller on the quantized measurement, then advance the plant with
/// the controller output.
#[derive(Debug, Clone)]
pub struct ClosedLoop {
    encoder: EncoderQuantizer,
    plant: FirstOrderPlant,
    setpoint: f32,
    ts: f32,
    recip_ysat: f32,
}

impl ClosedLoop {
    pub fn new(
        encoder: EncoderQuantizer,
        plant: FirstOrderPlant,
        setpoint: f32,
        ysat: f32,
    ) -> Self {
        let ts = encoder.sample_period();
        Self {
            encoder,
            plant,
            setpoint,
            ts,
            recip_ysat: 1.0 / ysat,
        }
    }

    /// Build the loop described by a scenario, starting from rest.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let encoder = EncoderQuantizer::new(&config.encoder);
        let plant = FirstOrderPlant::new(config.plant, encoder.sample_period());
        Self::new(encoder, plant, config.harness.setpoint, config.output.ysat)
    }

    #[inline]
    pub fn setpoint(&self) -> f32 {
        self.setpoint
    }

    /// Change the setpoint for subsequent samples.
    #[inline]
    pub fn set_setpoint(&mut self, w: f32) {
        self.setpoint = w;
    }

    /// Current true plant velocity.
    #[inline]
    pub fn velocity(&self) -> f32 {
        self.plant.velocity()
    }

    /// Run `steps` samples with `controller` in the loop.
    ///
    /// Sample indices continue from zero each call; plant and encoder
    /// state carry over.
    pub fn run(&mut self, controller: &mut dyn SpeedController, steps: usize) -> Trace {
        let mut samples = Vec::with_capacity(steps);
        let mut overflows = 0usize;

        for n in 0..steps {
            let x_true = self.plant.velocity();
            let meas = self.encoder.sample(x_true);
            if meas.overflowed {
                overflows += 1;
            }

            let y = controller.step(self.setpoint, meas.x_meas);
            let sample = self.record(n, x_true, meas.x_meas, meas.spdcnt, y);
            debug!(
                n,
                x_true,
                x_meas = meas.x_meas,
                spdcnt = meas.spdcnt,
                y,
                "sample"
            );
            samples.push(sample);

            self.plant.step(y);
        }

        if overflows > 0 {
            warn!(overflows, "speed count exceeded 16 bits during run");
        }
        info!(
            controller = %controller.kind(),
            steps,
            final_velocity = self.plant.velocity(),
            "closed-loop run complete"
        );
        Trace { samples }
    }

    /// Run `primary` in the loop and `oracle` alongside it on the same
    /// measurements, comparing outputs sample by sample.
    ///
    /// Only the primary output drives the plant.
    pub fn cross_check(
        &mut self,
        primary: &mut dyn SpeedController,
        oracle: &mut dyn SpeedController,
        steps: usize,
        tolerance: Tolerance,
    ) -> (Trace, CrossCheckReport) {
        let mut samples = Vec::with_capacity(steps);
        let mut report = CrossCheckReport::new(primary.kind(), oracle.kind(), tolerance);

        for n in 0..steps {
            let x_true = self.plant.velocity();
            let meas = self.encoder.sample(x_true);

            let y_primary = primary.step(self.setpoint, meas.x_meas);
            let y_oracle = oracle.step(self.setpoint, meas.x_meas);
            let cmp = report.push(n, y_primary, y_oracle);
            if !cmp.within {
                warn!(
                    n,
                    y_primary,
                    y_oracle,
                    abs_err = cmp.abs_err,
                    rel_err = cmp.rel_err,
                    "controller outputs disagree"
                );
            }

            samples.push(self.record(n, x_true, meas.x_meas, meas.spdcnt, y_primary));
            self.plant.step(y_primary);
        }

        info!(
            primary = %report.primary,
            oracle = %report.oracle,
            mismatches = report.mismatch_count,
            max_abs_err = report.max_abs_err,
            "cross-check complete"
        );
        (Trace { samples }, report)
    }

    fn record(&self, n: usize, x_true: f32, x_meas: f32, spdcnt: i16, y: f32) -> TraceSample {
        TraceSample {
            n,
            t: n as f32 * self.ts,
            w: self.setpoint,
            x_true,
            x_meas,
            spdcnt,
            y,
            duty: y.abs() * self.recip_ysat * 100.0,
        }
    }
}
