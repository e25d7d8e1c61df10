use clip_viewer::viewer::{
    catalog::{self, ASSETS},
    input::{asset_for_key, dispatch_key, legacy_key_code, KEY_BINDINGS},
};
use winit::keyboard::KeyCode;

#[test]
fn every_binding_dispatches_once() {
    let expected = [
        (49, "Offensive Idle"),
        (50, "Boxing"),
        (51, "Roundhouse Kick"),
        (52, "Walking"),
        (53, "Dancing Twerk"),
        (54, "Fast Run"),
        (55, "Punching Bag"),
    ];
    for (code, asset) in expected {
        let mut calls = Vec::new();
        let dispatched = dispatch_key(code, |name| calls.push(name));
        assert_eq!(dispatched, Some(asset));
        assert_eq!(calls, vec![asset], "key {code}");
    }
}

#[test]
fn unbound_keys_do_nothing() {
    for code in [0, 48, 56, 57, 65, 97] {
        let mut called = false;
        assert_eq!(dispatch_key(code, |_| called = true), None);
        assert!(!called, "key {code}");
    }
}

#[test]
fn boxing_is_the_only_unlisted_binding() {
    let unlisted: Vec<_> = KEY_BINDINGS
        .into_iter()
        .filter(|(_, asset)| !catalog::is_listed(asset))
        .collect();
    assert_eq!(unlisted, vec![(50, "Boxing")]);
    // The listed "Reaction" has no key.
    assert!(ASSETS.contains(&"Reaction"));
    assert!(KEY_BINDINGS.iter().all(|(_, asset)| *asset != "Reaction"));
}

#[test]
fn top_row_digits_map_to_legacy_codes() {
    assert_eq!(legacy_key_code(KeyCode::Digit0), Some(48));
    assert_eq!(legacy_key_code(KeyCode::Digit1), Some(49));
    assert_eq!(legacy_key_code(KeyCode::Digit7), Some(55));
    assert_eq!(legacy_key_code(KeyCode::KeyA), None);
    assert_eq!(legacy_key_code(KeyCode::Numpad1), None);

    let via_keyboard = legacy_key_code(KeyCode::Digit3).and_then(asset_for_key);
    assert_eq!(via_keyboard, Some("Roundhouse Kick"));
}
