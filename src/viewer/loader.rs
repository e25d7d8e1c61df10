//! Off-thread half of an asset swap.

use futures::{future::BoxFuture, FutureExt};

use crate::{
    error::AssetLoadFailure,
    resources::{
        import::{MaterialData, ModelAsset},
        read_asset,
    },
    viewer::session::LoadTicket,
};

/// Result of a load request, delivered back to the UI thread.
#[derive(Debug)]
pub enum ViewerEvent {
    Decoded {
        ticket: LoadTicket,
        result: Result<ModelAsset, AssetLoadFailure>,
    },
}

/// Reads and decodes the ticket's file. Needs a tokio runtime to be polled on.
pub fn load(ticket: LoadTicket) -> BoxFuture<'static, ViewerEvent> {
    async move {
        let result = read_asset(&ticket.asset, ticket.path.clone()).await;
        ViewerEvent::Decoded { ticket, result }
    }
    .boxed()
}

/// Every mesh casts and receives shadows and is shaded with a fresh default
/// Phong material. Authored materials are dropped.
pub fn prepare_asset(mut asset: ModelAsset) -> ModelAsset {
    for mesh in &mut asset.meshes {
        mesh.cast_shadow = true;
        mesh.receive_shadow = true;
        mesh.material = MaterialData::phong();
    }
    asset
}
