use common::{Axis, AxisMapping, AxisMode, EyeSide, GroupMappings, GroupTable, Session};

#[test]
fn reconcile_matches_peer_list() {
    let mut table = GroupTable::new();
    table.add("A");
    table.add("B");
    table.get_mut("B").unwrap().x = AxisMapping::two_point(13, 14, 0.1, 0.3);
    let b_before = table.get("B").unwrap().clone();

    let report = table.reconcile(&["B", "C"]);

    assert_eq!(report.removed, vec!["A".to_string()]);
    assert_eq!(report.added, vec!["C".to_string()]);
    assert!(!table.contains("A"));
    assert_eq!(table.get("B").unwrap(), &b_before);
    assert_eq!(table.get("C").unwrap(), &GroupMappings::default());
    assert_eq!(table.get("C").unwrap().x.mode, AxisMode::None);
}

#[test]
fn add_rejects_blank_and_duplicate_names() {
    let mut table = GroupTable::new();
    assert!(table.add("Smile"));
    assert!(!table.add("Smile"));
    assert!(!table.add("   "));
    assert_eq!(table.len(), 1);
}

#[test]
fn set_axis_requires_existing_group() {
    let mut table = GroupTable::new();
    assert!(!table.set_axis("Nope", Axis::X, AxisMapping::default()));
    table.add("Yes");
    assert!(table.set_axis("Yes", Axis::Y, AxisMapping::one_point(1, 4, 0.0, 1.0)));
    assert_eq!(table.get("Yes").unwrap().y.mode, AxisMode::OnePointProjection);
}

#[test]
fn session_selection_survives_edits() {
    let mut session = Session::default();
    assert!(session.add_group("Mouth"));
    assert!(session.add_group("Brow"));
    assert_eq!(session.selected(), Some("Brow"));

    assert!(session.select("Mouth"));
    assert!(!session.select("Missing"));
    assert_eq!(session.selected(), Some("Mouth"));

    session.remove_group("Mouth");
    assert_eq!(session.selected(), Some("Brow"));

    session.reconcile(&["Eyes".to_string()]);
    assert_eq!(session.selected(), Some("Eyes"));

    session.reconcile(&[]);
    assert_eq!(session.selected(), None);
}

#[test]
fn preset_keeps_smoothing_choice() {
    let mut session = Session::default();
    session.add_group("Gaze");
    session.config.groups.get_mut("Gaze").unwrap().x.lerp_enabled = true;

    let mapping = session.apply_iris_preset("Gaze", Axis::X, EyeSide::Left).unwrap();
    assert_eq!(mapping.mode, AxisMode::Iris);
    assert_eq!(mapping.point_a, Some(api::EYE_LEFT.iris));
    assert_eq!(mapping.point_b, Some(api::EYE_LEFT.outer));
    assert!(mapping.lerp_enabled);

    let y = session.apply_iris_preset("Gaze", Axis::Y, EyeSide::Left).unwrap();
    assert_eq!(EyeSide::resolve(y.point_b.unwrap()), EyeSide::Left);
}

#[test]
fn frame_settings_are_a_detached_copy() {
    let mut session = Session::default();
    session.add_group("Mouth");
    let settings = session.frame_settings();
    session.remove_group("Mouth");
    assert!(settings.groups.contains("Mouth"));
    assert_eq!(settings.selected.as_deref(), Some("Mouth"));
}
