use clip_viewer::{
    data_structures::instance::Instance,
    resources::animation::{Channel, Clip, Keyframes, Track},
    viewer::mixer::Mixer,
};
use cgmath::{Deg, InnerSpace, Quaternion, Rotation3, Vector3};

use crate::common::test_utils::slide_clip;
mod common;

#[test]
fn no_clips_no_mixer() {
    assert!(Mixer::from_clips(vec![]).is_none());
}

#[test]
fn playback_wraps_at_duration() {
    let mut mixer = Mixer::from_clips(vec![slide_clip("walk", 2.0)]).expect("mixer");
    // The slide clip's x offset equals the playhead.
    let playhead = |mixer: &Mixer| mixer.pose()[&0].position.x;
    mixer.update(0.75);
    assert!((playhead(&mixer) - 0.75).abs() < 1e-6);
    mixer.update(1.75);
    assert!((playhead(&mixer) - 0.5).abs() < 1e-5);
    mixer.update(4.0);
    assert!((playhead(&mixer) - 0.5).abs() < 1e-4);
}

#[test]
fn zero_length_clip_holds_first_frame() {
    let clip = Clip::new(
        "pose",
        vec![Track {
            node: 3,
            rest: Instance::new(),
            channels: vec![Channel {
                timestamps: vec![0.0],
                keyframes: Keyframes::Scale(vec![Vector3::new(2.0, 2.0, 2.0)]),
            }],
        }],
    );
    let mut mixer = Mixer::from_clips(vec![clip]).expect("mixer");
    assert_eq!(mixer.duration(), 0.0);
    mixer.update(1.0);
    assert_eq!(mixer.pose()[&3].scale, Vector3::new(2.0, 2.0, 2.0));
}

#[test]
fn channels_sample_independently() {
    let rest = Instance {
        position: Vector3::new(1.0, 2.0, 3.0),
        ..Instance::new()
    };
    let quarter = Quaternion::from_angle_y(Deg(90.0));
    let clip = Clip::new(
        "turn",
        vec![Track {
            node: 1,
            rest,
            channels: vec![Channel {
                timestamps: vec![0.0, 1.0],
                keyframes: Keyframes::Rotation(vec![Quaternion::from_angle_y(Deg(0.0)), quarter]),
            }],
        }],
    );
    assert_eq!(clip.duration, 1.0);

    let end = clip.sample(1.0)[&1];
    assert_eq!(end.position, rest.position);
    assert!((end.rotation.dot(quarter).abs() - 1.0).abs() < 1e-5);

    let mid = clip.sample(0.5)[&1];
    let eighth = Quaternion::from_angle_y(Deg(45.0));
    assert!((mid.rotation.dot(eighth).abs() - 1.0).abs() < 1e-4);
}
