//! `frost_client`
//!
//! Client-side systems:
//! - Entity snapshot store and the merge engine that feeds it (room + world
//!   channels)
//! - Camera solver (letterbox or pan, per axis)
//! - Minimap projector
//! - Frame renderer over the `Canvas` abstraction, with deterministic
//!   animation helpers and a sprite cache
//! - Frame-loop owner (sessions, throttling, notices)
//! - Replay reader for headless runs

pub mod anim;
pub mod assets;
pub mod camera;
pub mod merge;
pub mod minimap;
pub mod renderer;
pub mod replay;
pub mod session;
pub mod store;

pub use merge::Ingest;
pub use session::{FrameLoop, SessionNotice};
pub use store::EntityStore;
