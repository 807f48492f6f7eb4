//! Scene configuration and key resolution

mod keys;
mod provider;

pub use keys::SceneKeys;
pub use provider::{Scene, SceneConfigProvider, StaticSceneProvider};
