//! Quantization error is carried, never dropped.

use proptest::prelude::*;
use spd_common::encoder::EncoderGeometry;
use spd_control::encoder::EncoderQuantizer;

proptest! {
    #[test]
    fn counts_sum_to_final_count(velocities in prop::collection::vec(-500.0_f32..500.0, 1..300)) {
        let mut enc = EncoderQuantizer::new(&EncoderGeometry::default());
        let start = enc.count();

        let mut total: i64 = 0;
        for v in velocities {
            let s = enc.sample(v);
            prop_assert!(!s.overflowed);
            prop_assert_eq!(i64::from(s.spdcnt), s.delta);
            prop_assert_eq!(s.x_meas, f32::from(s.spdcnt) * enc.count_to_velocity());
            total += i64::from(s.spdcnt);
        }

        prop_assert_eq!(total, enc.count() - start);
        let expected = (enc.theta_rad() / enc.rad_per_count()).floor() as i64;
        prop_assert_eq!(enc.count(), expected);
    }

    #[test]
    fn window_sums_are_conserved(
        velocities in prop::collection::vec(0.0_f32..300.0, 2..200),
        split in 1usize..199,
    ) {
        let split = split.min(velocities.len() - 1);
        let mut enc = EncoderQuantizer::new(&EncoderGeometry::default());

        for &v in &velocities[..split] {
            enc.sample(v);
        }
        let window_start = enc.count();
        let window: i64 = velocities[split..]
            .iter()
            .map(|&v| i64::from(enc.sample(v).spdcnt))
            .sum();

        prop_assert_eq!(window, enc.count() - window_start);
    }
}

#[test]
fn constant_speed_measures_true_speed_on_average() {
    let mut enc = EncoderQuantizer::new(&EncoderGeometry::default());
    let v = 100.0_f32;
    let n = 2000;
    let counts: i64 = (0..n).map(|_| i64::from(enc.sample(v).spdcnt)).sum();
    let mean = counts as f64 * f64::from(enc.count_to_velocity()) / f64::from(n);
    // Within one count over the run plus f32 angle rounding.
    assert!((mean - f64::from(v)).abs() < 0.05, "mean {mean}");
}
