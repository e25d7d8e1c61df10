//! The viewer session: which model is displayed and what it is playing.
//!
//! Loads are asynchronous and may overlap. Every request is numbered; a
//! result is applied only if it belongs to the most recent request, so the
//! last asset asked for is the one that ends up on screen regardless of the
//! order in which loads finish.

use std::path::PathBuf;

use log::{debug, error, info};

use crate::{
    data_structures::scene_graph::SceneNode,
    error::AssetLoadFailure,
    resources::animation::{Clip, Pose},
    viewer::{catalog, mixer::Mixer},
};

/// A model the session can own.
pub trait Resident {
    /// Releases every GPU resource the model holds.
    fn dispose(&mut self);

    fn apply_pose(&mut self, pose: &Pose);
}

impl Resident for Box<dyn SceneNode> {
    fn dispose(&mut self) {
        SceneNode::dispose(self.as_mut());
    }

    fn apply_pose(&mut self, pose: &Pose) {
        SceneNode::apply_pose(self.as_mut(), pose);
        self.update_world_transform_all();
    }
}

/// One load request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub seq: u64,
    pub asset: String,
    pub path: PathBuf,
}

/// A model ready to be attached, with the clips it was authored with.
pub struct Loaded<M> {
    pub model: M,
    pub clips: Vec<Clip>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapOutcome {
    Attached { animated: bool },
    Failed,
    Superseded,
}

struct Current<M> {
    asset: String,
    model: M,
}

pub struct Session<M: Resident> {
    asset_root: PathBuf,
    latest: u64,
    current: Option<Current<M>>,
    mixer: Option<Mixer>,
}

impl<M: Resident> Session<M> {
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
            latest: 0,
            current: None,
            mixer: None,
        }
    }

    /// Starts a load of `asset`. The name is not validated.
    pub fn request(&mut self, asset: &str) -> LoadTicket {
        info!("Loading asset: {}", asset);
        self.latest += 1;
        LoadTicket {
            seq: self.latest,
            asset: asset.to_string(),
            path: catalog::resolve(&self.asset_root, asset),
        }
    }

    pub fn is_latest(&self, ticket: &LoadTicket) -> bool {
        ticket.seq == self.latest
    }

    /// Drops the result of a superseded request without looking at it.
    pub fn discard(&self, ticket: &LoadTicket) -> SwapOutcome {
        debug!(
            "discarding result for {} (request {} superseded by {})",
            ticket.asset, ticket.seq, self.latest
        );
        SwapOutcome::Superseded
    }

    /// Applies the result of `ticket`.
    ///
    /// Failures are logged and leave the session untouched. A successful load
    /// for a superseded ticket is disposed instead of attached.
    pub fn complete(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Loaded<M>, AssetLoadFailure>,
    ) -> SwapOutcome {
        let loaded = match result {
            Err(failure) => {
                error!("{}", failure);
                return SwapOutcome::Failed;
            }
            Ok(loaded) => loaded,
        };
        if !self.is_latest(ticket) {
            let mut model = loaded.model;
            model.dispose();
            return self.discard(ticket);
        }

        if let Some(mut previous) = self.current.take() {
            previous.model.dispose();
        }

        let mut model = loaded.model;
        self.mixer = Mixer::from_clips(loaded.clips);
        let animated = match &self.mixer {
            Some(mixer) => {
                model.apply_pose(&mixer.pose());
                info!("Animation loaded: {}", ticket.asset);
                debug!("playing {} ({:.2}s)", mixer.clip_name(), mixer.duration());
                true
            }
            None => {
                info!("No animations found for asset: {}", ticket.asset);
                false
            }
        };
        self.current = Some(Current {
            asset: ticket.asset.clone(),
            model,
        });
        SwapOutcome::Attached { animated }
    }

    /// Advances the mixer by `dt` seconds and poses the current model. No-op without a mixer.
    pub fn advance(&mut self, dt: f32) {
        let (Some(mixer), Some(current)) = (&mut self.mixer, &mut self.current) else {
            return;
        };
        mixer.update(dt);
        current.model.apply_pose(&mixer.pose());
    }

    pub fn current(&self) -> Option<&M> {
        self.current.as_ref().map(|current| &current.model)
    }

    pub fn current_mut(&mut self) -> Option<&mut M> {
        self.current.as_mut().map(|current| &mut current.model)
    }

    pub fn current_asset(&self) -> Option<&str> {
        self.current.as_ref().map(|current| current.asset.as_str())
    }

    pub fn mixer(&self) -> Option<&Mixer> {
        self.mixer.as_ref()
    }
}
