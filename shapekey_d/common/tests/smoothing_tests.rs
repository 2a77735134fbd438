use common::Lerp;

#[test]
fn lerp_converges_geometrically() {
    let target = 0.8f32;
    let factor = 0.15f32;
    let start = -0.4f32;

    let mut lerp = Lerp::new(start);
    let mut previous_gap = (start - target).abs();

    for n in 1..=40 {
        let value = lerp.filter(target, true, factor);
        let gap = (value - target).abs();
        let expected = (start - target).abs() * (1.0 - factor).powi(n);

        assert!(gap <= previous_gap, "step {} moved away from target", n);
        assert!(
            (gap - expected).abs() < 1e-5,
            "step {}: gap {} expected {}",
            n,
            gap,
            expected
        );
        previous_gap = gap;
    }
}

#[test]
fn factor_one_jumps_to_target() {
    let mut lerp = Lerp::new(0.0);
    assert_eq!(lerp.filter(0.6, true, 1.0), 0.6);
}

#[test]
fn disabled_lerp_tracks_input_exactly() {
    let mut lerp = Lerp::default();
    for target in [0.1f32, -0.7, 0.33, 1.0, 0.0] {
        assert_eq!(lerp.filter(target, false, 0.2), target);
        assert_eq!(lerp.value(), target);
    }
}

#[test]
fn enabling_mid_session_starts_from_current_value() {
    let mut lerp = Lerp::default();
    for _ in 0..10 {
        lerp.filter(0.9, false, 0.1);
    }

    // Same target: no transient when smoothing is switched on.
    assert_eq!(lerp.filter(0.9, true, 0.1), 0.9);

    let next = lerp.filter(0.5, true, 0.1);
    assert!((next - 0.86).abs() < 1e-6);
}
