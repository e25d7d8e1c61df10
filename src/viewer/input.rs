//! Number-key shortcuts.
//!
//! Bindings use the legacy DOM key codes (`'1'` is 49). winit reports
//! physical keys, so [`legacy_key_code`] translates the top-row digits first.

use winit::{
    event::{ElementState, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// Key code → asset name. `50` names an asset outside the shipped list and
/// always fails to load.
pub const KEY_BINDINGS: [(u32, &str); 7] = [
    (49, "Offensive Idle"),
    (50, "Boxing"),
    (51, "Roundhouse Kick"),
    (52, "Walking"),
    (53, "Dancing Twerk"),
    (54, "Fast Run"),
    (55, "Punching Bag"),
];

pub fn asset_for_key(code: u32) -> Option<&'static str> {
    KEY_BINDINGS
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, asset)| *asset)
}

pub fn legacy_key_code(key: KeyCode) -> Option<u32> {
    let digit = match key {
        KeyCode::Digit0 => 0,
        KeyCode::Digit1 => 1,
        KeyCode::Digit2 => 2,
        KeyCode::Digit3 => 3,
        KeyCode::Digit4 => 4,
        KeyCode::Digit5 => 5,
        KeyCode::Digit6 => 6,
        KeyCode::Digit7 => 7,
        KeyCode::Digit8 => 8,
        KeyCode::Digit9 => 9,
        _ => return None,
    };
    Some(48 + digit)
}

/// Calls `load` once with the bound asset if `code` is bound. Returns the
/// asset name that was dispatched.
pub fn dispatch_key(code: u32, load: impl FnOnce(&'static str)) -> Option<&'static str> {
    let asset = asset_for_key(code)?;
    load(asset);
    Some(asset)
}

/// The legacy key code of a key press, if `event` is one. Repeats count as presses.
pub fn pressed_key_code(event: &WindowEvent) -> Option<u32> {
    match event {
        WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
            match event.physical_key {
                PhysicalKey::Code(code) => legacy_key_code(code),
                PhysicalKey::Unidentified(_) => None,
            }
        }
        _ => None,
    }
}
