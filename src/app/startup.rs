use std::path::Path;

use tracing::{info, warn};

use crate::engine::Engine;
use crate::error::{PockerError, Result};
use crate::model::{ContainerRecord, ImageRecord};

/// What the dashboard needs before it can render its first frame.
#[derive(Debug, Default)]
pub struct InitialState {
    pub containers: Vec<ContainerRecord>,
    pub images: Vec<ImageRecord>,
}

/// Load the container and image lists.
///
/// Fails with [`PockerError::EngineUnavailable`] if the engine cannot be listed
/// at all, and with [`PockerError::NoVisibleContainers`] if nothing passes the
/// visibility filter. An image listing failure only costs the image panel.
pub async fn load_initial(engine: &dyn Engine, show_all: bool, config_path: &Path) -> Result<InitialState> {
    let containers = engine.list_containers(show_all).await.map_err(|e| match e {
        PockerError::EngineUnavailable(_) => e,
        other => PockerError::EngineUnavailable(other.reason()),
    })?;

    if containers.is_empty() {
        let hidden = if show_all {
            0
        } else {
            engine.list_containers(true).await.map(|all| all.len()).unwrap_or(0)
        };
        return Err(PockerError::NoVisibleContainers {
            hidden,
            config_path: config_path.to_path_buf(),
        });
    }

    let images = match engine.list_images().await {
        Ok(images) => images,
        Err(e) => {
            warn!(error = %e, "image listing failed");
            Vec::new()
        }
    };

    info!(containers = containers.len(), images = images.len(), "initial state loaded");
    Ok(InitialState { containers, images })
}
