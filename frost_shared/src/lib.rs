//! `frost_shared`
//!
//! Shared libraries used by the client runtime and its tests.
//!
//! Design goals:
//! - Wire types decode leniently: missing optional data becomes a default.
//! - Rendering goes through a backend-agnostic `Canvas` trait.
//! - Plain data, no `unsafe`, no async.

pub mod color;
pub mod config;
pub mod math;
pub mod net;
pub mod render;
pub mod round;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::color::*;
    pub use crate::config::*;
    pub use crate::math::*;
    pub use crate::net::*;
    pub use crate::render::*;
    pub use crate::round::*;
}
