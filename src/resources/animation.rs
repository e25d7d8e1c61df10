//! Keyframe clips and their sampling.
//!
//! A [`Clip`] is a set of [`Track`]s, one per animated node. Each track carries
//! up to three channels (translation, rotation, scale) with their own
//! timestamps. Sampling a clip at a time yields a [`Pose`]: the local
//! transform of every animated node.

use std::collections::HashMap;

use cgmath::{InnerSpace, VectorSpace};

use crate::data_structures::instance::Instance;

/// Local transforms keyed by asset node index.
pub type Pose = HashMap<usize, Instance>;

#[derive(Clone, Debug, PartialEq)]
pub enum Keyframes {
    Translation(Vec<cgmath::Vector3<f32>>),
    Rotation(Vec<cgmath::Quaternion<f32>>),
    Scale(Vec<cgmath::Vector3<f32>>),
}

impl Keyframes {
    pub fn len(&self) -> usize {
        match self {
            Keyframes::Translation(v) => v.len(),
            Keyframes::Rotation(v) => v.len(),
            Keyframes::Scale(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One animated property of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    /// Seconds, ascending. Same length as the keyframes.
    pub timestamps: Vec<f32>,
    pub keyframes: Keyframes,
}

impl Channel {
    /// Index of the keyframe at or before `t` and the blend factor towards the next one.
    fn segment(&self, t: f32) -> (usize, usize, f32) {
        let last = self.timestamps.len() - 1;
        let next = self.timestamps.partition_point(|&ts| ts <= t);
        if next == 0 {
            return (0, 0, 0.0);
        }
        if next > last {
            return (last, last, 0.0);
        }
        let prev = next - 1;
        let span = self.timestamps[next] - self.timestamps[prev];
        let alpha = if span > 0.0 {
            (t - self.timestamps[prev]) / span
        } else {
            0.0
        };
        (prev, next, alpha)
    }

    /// Writes this channel's value at `t` into `target`.
    pub fn apply(&self, t: f32, target: &mut Instance) {
        if self.timestamps.is_empty() || self.keyframes.len() != self.timestamps.len() {
            return;
        }
        let (a, b, alpha) = self.segment(t);
        match &self.keyframes {
            Keyframes::Translation(values) => {
                target.position = values[a].lerp(values[b], alpha);
            }
            Keyframes::Rotation(values) => {
                target.rotation = nlerp(values[a], values[b], alpha);
            }
            Keyframes::Scale(values) => {
                target.scale = values[a].lerp(values[b], alpha);
            }
        }
    }

    pub fn end_time(&self) -> f32 {
        self.timestamps.last().copied().unwrap_or(0.0)
    }
}

/// Shortest-path normalized lerp; close enough to slerp at keyframe density.
fn nlerp(
    a: cgmath::Quaternion<f32>,
    b: cgmath::Quaternion<f32>,
    alpha: f32,
) -> cgmath::Quaternion<f32> {
    let b = if a.dot(b) < 0.0 { -b } else { b };
    (a * (1.0 - alpha) + b * alpha).normalize()
}

/// All channels driving a single node. `rest` is the node's unanimated local
/// transform, used for the properties no channel covers.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub node: usize,
    pub rest: Instance,
    pub channels: Vec<Channel>,
}

impl Track {
    pub fn sample(&self, t: f32) -> Instance {
        let mut local = self.rest;
        for channel in &self.channels {
            channel.apply(t, &mut local);
        }
        local
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Clip {
    pub name: String,
    /// Seconds. Playback wraps at this point.
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl Clip {
    /// Builds a clip whose duration is the last keyframe of any channel.
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .flat_map(|track| track.channels.iter())
            .map(Channel::end_time)
            .fold(0.0_f32, f32::max);
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }

    pub fn sample(&self, t: f32) -> Pose {
        self.tracks
            .iter()
            .map(|track| (track.node, track.sample(t)))
            .collect()
    }
}
