//! Tideholm client render core.
//!
//! Turns the server-authoritative entity stream into a depth-ordered,
//! temporally smooth draw list, once per display refresh. The drawing API,
//! asset pipeline, audio, and UI panels live in the host; this crate owns
//! culling, depth compositing, prediction/interpolation, and the terrain
//! tile cache.

pub mod classify;
pub mod config;
pub mod frame;
pub mod interpolation;
pub mod prediction;
pub mod store;
pub mod tile_cache;
pub mod viewport;
pub mod visual_fx;
pub mod ysort;

pub use classify::{RenderCandidate, RenderPlane, SpriteSlice, Submersion};
pub use config::RenderConfig;
pub use frame::{Frame, FrameDriver, FramePhase};
pub use interpolation::RemoteInterpolator;
pub use prediction::PredictionEngine;
pub use store::EntityStore;
pub use tile_cache::{TerrainWindow, TileCache, TileInfo};
pub use viewport::Viewport;
pub use visual_fx::VisualFxTable;
