//! Scene resolution

use std::collections::HashMap;
use std::sync::Arc;

use sg_shared::config::{SceneConfig, ScenesConfig};
use tracing::info;

use super::keys::SceneKeys;
use crate::errors::DomainError;

/// A resolved scene: its name, configuration and compiled keys
#[derive(Debug, Clone)]
pub struct Scene {
    pub name: String,
    pub config: SceneConfig,
    pub keys: SceneKeys,
}

impl Scene {
    /// Validate a scene configuration and compile its keys
    pub fn new(name: impl Into<String>, config: SceneConfig) -> Result<Self, DomainError> {
        let name = name.into();
        validate(&name, &config)?;
        let keys = SceneKeys::from_config(&config)?;
        Ok(Self { name, config, keys })
    }

    /// Cache key of the revocation record for a token id
    pub fn record_key(&self, jti: &str) -> String {
        format!("{}_{}", self.config.blacklist_prefix, jti)
    }

    /// Prefix shared by all revocation records of this scene
    ///
    /// Token ids start with the scene name. [`StaticSceneProvider`] rejects
    /// scene sets where one scene's prefix begins another's, so the prefix
    /// never matches a record of a different scene.
    pub fn record_prefix(&self) -> String {
        format!("{}_{}_", self.config.blacklist_prefix, self.name)
    }
}

fn validate(name: &str, config: &SceneConfig) -> Result<(), DomainError> {
    let invalid = |message: String| DomainError::Configuration {
        message: format!("scene '{}': {}", name, message),
    };

    if name.is_empty() {
        return Err(DomainError::Configuration {
            message: "scene name must not be empty".to_string(),
        });
    }
    if config.ttl <= 0 {
        return Err(invalid(format!("ttl must be positive, got {}", config.ttl)));
    }
    if config.blacklist_cache_ttl < 0 || config.blacklist_grace_period < 0 {
        return Err(invalid("blacklist durations must not be negative".to_string()));
    }
    if config.login_type.is_single_session() && config.sso_key.is_empty() {
        return Err(invalid("single-session login requires sso_key".to_string()));
    }
    if config.scene_claim.is_empty() {
        return Err(invalid("scene_claim must not be empty".to_string()));
    }
    Ok(())
}

/// Resolves scene names to their configuration
pub trait SceneConfigProvider: Send + Sync {
    /// Resolve a scene by name, failing with `UnknownScene` if absent
    fn resolve(&self, scene: &str) -> Result<Arc<Scene>, DomainError>;

    /// Scene used when the caller names none
    fn default_scene(&self) -> &str;
}

/// Provider over a fixed set of scenes compiled at startup
#[derive(Debug, Clone)]
pub struct StaticSceneProvider {
    default_scene: String,
    scenes: HashMap<String, Arc<Scene>>,
}

impl StaticSceneProvider {
    /// Build the provider, validating every scene and loading its keys
    pub fn from_config(config: &ScenesConfig) -> Result<Self, DomainError> {
        let mut scenes = HashMap::with_capacity(config.scenes.len());
        for (name, scene_config) in &config.scenes {
            let scene = Scene::new(name.clone(), scene_config.clone())?;
            info!(
                scene = %name,
                algorithm = %scene_config.algorithm,
                login_type = %scene_config.login_type,
                "Scene loaded"
            );
            scenes.insert(name.clone(), Arc::new(scene));
        }
        ensure_disjoint_prefixes(&scenes)?;

        Ok(Self {
            default_scene: config.default_scene.clone(),
            scenes,
        })
    }

}

/// Reject scene sets whose record keys could overlap
///
/// Two record keys can only be equal, and a bulk clear can only reach another
/// scene, when one scene's record prefix starts with the other's. Scene `svc`
/// next to `svc_admin` under the same `blacklist_prefix` is such a pair.
fn ensure_disjoint_prefixes(scenes: &HashMap<String, Arc<Scene>>) -> Result<(), DomainError> {
    for (name, scene) in scenes {
        let prefix = scene.record_prefix();
        for (other_name, other) in scenes {
            if other_name != name && other.record_prefix().starts_with(&prefix) {
                return Err(DomainError::Configuration {
                    message: format!(
                        "scene '{}': revocation keys overlap with scene '{}' ('{}')",
                        other_name, name, prefix
                    ),
                });
            }
        }
    }
    Ok(())
}

impl SceneConfigProvider for StaticSceneProvider {
    fn resolve(&self, scene: &str) -> Result<Arc<Scene>, DomainError> {
        self.scenes
            .get(scene)
            .cloned()
            .ok_or_else(|| DomainError::UnknownScene {
                scene: scene.to_string(),
            })
    }

    fn default_scene(&self) -> &str {
        &self.default_scene
    }
}
