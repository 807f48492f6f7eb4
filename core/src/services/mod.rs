//! Services implementing the token lifecycle and its revocation rules.

pub mod clock;
pub mod revocation;
pub mod scene;
pub mod token;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use revocation::RevocationStore;
pub use scene::{Scene, SceneConfigProvider, SceneKeys, StaticSceneProvider};
pub use token::{IssuedToken, TokenCodec, TokenManager, VerifyOptions};
