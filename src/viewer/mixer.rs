//! Playback of a single looping clip.

use crate::resources::animation::{Clip, Pose};

#[derive(Debug)]
pub struct Mixer {
    clip: Clip,
    time: f32,
}

impl Mixer {
    /// Plays the first clip and ignores the rest. `None` without clips.
    pub fn from_clips(clips: Vec<Clip>) -> Option<Self> {
        let mut clips = clips.into_iter();
        let clip = clips.next()?;
        for ignored in clips {
            log::debug!("ignoring clip {} (only the first clip plays)", ignored.name);
        }
        Some(Self { clip, time: 0.0 })
    }

    /// Advances playback by `dt` seconds, wrapping at the clip's end.
    pub fn update(&mut self, dt: f32) {
        if self.clip.duration > 0.0 {
            self.time = (self.time + dt).rem_euclid(self.clip.duration);
        }
    }

    pub fn pose(&self) -> Pose {
        self.clip.sample(self.time)
    }

    pub fn clip_name(&self) -> &str {
        &self.clip.name
    }

    pub fn duration(&self) -> f32 {
        self.clip.duration
    }
}
