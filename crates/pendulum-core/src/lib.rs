//! Platform-free pendulum wave engine.
//!
//! The frontends supply an [`AudioBackend`], a [`Surface`] and a [`FrameClock`];
//! everything else (configuration, arc motion, crossing detection, envelopes,
//! rebuilds) lives here and is exercised by the offline backends in [`offline`].

pub mod audio;
pub mod automation;
pub mod color;
pub mod config;
pub mod constants;
pub mod ensemble;
pub mod error;
pub mod marker;
pub mod offline;
pub mod oscillator;
pub mod params;
pub mod render_loop;
pub mod simulation;
pub mod surface;
pub mod voice;

pub use audio::*;
pub use automation::*;
pub use color::*;
pub use config::*;
pub use ensemble::*;
pub use error::*;
pub use marker::*;
pub use oscillator::*;
pub use params::*;
pub use render_loop::*;
pub use simulation::*;
pub use surface::*;
pub use voice::*;
