// Host-side tests for the synthetic beat metronome.

use scene_core::*;

#[test]
fn scripted_elapsed_sequence() {
    let mut beat = BeatEstimator::default();
    let got: Vec<f32> = [0.0, 0.4, 0.6, 1.0, 1.1]
        .iter()
        .map(|&t| beat.tick(t))
        .collect();
    // 0.0: first beat; 0.4: 400ms since -> decay; 0.6: 600ms -> beat;
    // 1.0: 400ms since 0.6 -> decay; 1.1: 500ms since 0.6 -> beat.
    let expected = [1.0, 0.95, 1.0, 0.95, 1.0];
    for (g, e) in got.iter().zip(expected.iter()) {
        assert!((g - e).abs() < 1e-6, "got {got:?}");
    }
}

#[test]
fn intensity_stays_in_unit_range_at_sixty_hz() {
    let mut beat = BeatEstimator::default();
    let mut beats = 0;
    for frame in 0..600 {
        let i = beat.tick(frame as f64 / 60.0);
        assert!((0.0..=1.0).contains(&i));
        if i == 1.0 {
            beats += 1;
        }
    }
    // 10 seconds at 500ms: one beat at t=0 then every 30 frames.
    assert_eq!(beats, 20);
}

#[test]
fn strictly_decreasing_between_beats() {
    let mut beat = BeatEstimator::default();
    let mut prev = beat.tick(0.0);
    for frame in 1..30 {
        let i = beat.tick(frame as f64 / 60.0);
        assert!(i < prev);
        assert!((i - prev * 0.95).abs() < 1e-6);
        prev = i;
    }
}

#[test]
fn per_second_clock_is_refresh_rate_independent() {
    let mut slow = BeatEstimator::new(500.0, DecayClock::per_second());
    let mut fast = BeatEstimator::new(500.0, DecayClock::per_second());
    slow.tick(0.0);
    fast.tick(0.0);
    for f in 1..=12 {
        slow.tick(f as f64 / 60.0);
    }
    for f in 1..=24 {
        fast.tick(f as f64 / 120.0);
    }
    assert!((slow.intensity() - fast.intensity()).abs() < 1e-4);
}
