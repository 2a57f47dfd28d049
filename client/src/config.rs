//! Render tuning configuration.
//!
//! Every knob the host can turn lives here: culling margin, remote render
//! delay, extrapolation clamp, interpolation capacity, tile window sizing,
//! and the per-kind visual-foot offsets. Values persist as a versioned JSON
//! profile next to the executable.

use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use tide_core::constants::{
    DEFAULT_CAMERA_RECOMPUTE_THRESHOLD_TILES, DEFAULT_CULL_MARGIN_PX,
    DEFAULT_EXTRAPOLATION_CLAMP_MS, DEFAULT_INTERP_BUFFER_CAPACITY, DEFAULT_RENDER_DELAY_MS,
    DEFAULT_TILE_EDGE_BUFFER, DEFAULT_VISUAL_FOOT_OFFSET_PX,
};

pub const CONFIG_FILE_NAME: &str = "render_profile.json";

/// Runtime render configuration, shared read-only by the frame pipeline.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Extra margin around the viewport for culling, in world units.
    pub cull_margin_px: f64,
    /// How far in the past remote actors are rendered.
    pub render_delay_ms: u64,
    /// Hard bound on extrapolation past the newest remote sample.
    pub extrapolation_clamp_ms: u64,
    /// Samples held per remote actor.
    pub interp_buffer_capacity: usize,
    /// Extra ring of tiles around the visible tile window.
    pub tile_edge_buffer: i32,
    /// Camera movement (in tiles) required before the terrain window is
    /// recomputed.
    pub camera_recompute_threshold_tiles: i32,
    /// Anchor-to-visible-foot distance for tall sprites, keyed by the kind's
    /// stable name. Kinds not listed use `default_foot_offset_px`.
    pub foot_offsets_px: BTreeMap<String, f64>,
    pub default_foot_offset_px: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            cull_margin_px: DEFAULT_CULL_MARGIN_PX,
            render_delay_ms: DEFAULT_RENDER_DELAY_MS,
            extrapolation_clamp_ms: DEFAULT_EXTRAPOLATION_CLAMP_MS,
            interp_buffer_capacity: DEFAULT_INTERP_BUFFER_CAPACITY,
            tile_edge_buffer: DEFAULT_TILE_EDGE_BUFFER,
            camera_recompute_threshold_tiles: DEFAULT_CAMERA_RECOMPUTE_THRESHOLD_TILES,
            foot_offsets_px: BTreeMap::new(),
            default_foot_offset_px: DEFAULT_VISUAL_FOOT_OFFSET_PX,
        }
    }
}

impl RenderConfig {
    /// Visual-foot offset for a tall sprite kind.
    pub fn foot_offset_px(&self, kind_key: &str) -> f64 {
        self.foot_offsets_px
            .get(kind_key)
            .copied()
            .unwrap_or(self.default_foot_offset_px)
    }
}

/// On-disk representation. Kept separate from [`RenderConfig`] so the file
/// format can evolve without touching the runtime struct.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct ConfigStorage {
    version: u32,
    cull_margin_px: f64,
    render_delay_ms: u64,
    extrapolation_clamp_ms: u64,
    interp_buffer_capacity: usize,
    tile_edge_buffer: i32,
    camera_recompute_threshold_tiles: i32,
    foot_offsets_px: BTreeMap<String, f64>,
    default_foot_offset_px: f64,
}

impl From<&RenderConfig> for ConfigStorage {
    fn from(config: &RenderConfig) -> Self {
        ConfigStorage {
            version: 1,
            cull_margin_px: config.cull_margin_px,
            render_delay_ms: config.render_delay_ms,
            extrapolation_clamp_ms: config.extrapolation_clamp_ms,
            interp_buffer_capacity: config.interp_buffer_capacity,
            tile_edge_buffer: config.tile_edge_buffer,
            camera_recompute_threshold_tiles: config.camera_recompute_threshold_tiles,
            foot_offsets_px: config.foot_offsets_px.clone(),
            default_foot_offset_px: config.default_foot_offset_px,
        }
    }
}

impl From<ConfigStorage> for RenderConfig {
    fn from(storage: ConfigStorage) -> Self {
        RenderConfig {
            cull_margin_px: storage.cull_margin_px,
            render_delay_ms: storage.render_delay_ms,
            extrapolation_clamp_ms: storage.extrapolation_clamp_ms,
            interp_buffer_capacity: storage.interp_buffer_capacity.max(1),
            tile_edge_buffer: storage.tile_edge_buffer.max(0),
            camera_recompute_threshold_tiles: storage.camera_recompute_threshold_tiles.max(0),
            foot_offsets_px: storage.foot_offsets_px,
            default_foot_offset_px: storage.default_foot_offset_px,
        }
    }
}

/// Loads the profile from `path`, falling back to defaults when the file is
/// missing or unreadable. A broken profile is logged and ignored, never
/// fatal.
pub fn load_or_default(path: &Path) -> RenderConfig {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return RenderConfig::default(),
    };

    match serde_json::from_str::<ConfigStorage>(&contents) {
        Ok(storage) => storage.into(),
        Err(e) => {
            log::warn!(
                "Ignoring malformed render profile at {}: {e}",
                path.display()
            );
            RenderConfig::default()
        }
    }
}

/// Writes the profile to `path` as pretty-printed JSON.
pub fn save(config: &RenderConfig, path: &Path) -> std::io::Result<()> {
    let storage = ConfigStorage::from(config);
    let json = serde_json::to_string_pretty(&storage)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_core_constants() {
        let config = RenderConfig::default();
        assert_eq!(config.render_delay_ms, DEFAULT_RENDER_DELAY_MS);
        assert_eq!(config.interp_buffer_capacity, DEFAULT_INTERP_BUFFER_CAPACITY);
        assert_eq!(config.default_foot_offset_px, DEFAULT_VISUAL_FOOT_OFFSET_PX);
    }

    #[test]
    fn unknown_kind_falls_back_to_the_default_offset() {
        let mut config = RenderConfig::default();
        config.foot_offsets_px.insert("tree".to_string(), 210.0);
        assert_eq!(config.foot_offset_px("tree"), 210.0);
        assert_eq!(
            config.foot_offset_px("furnace"),
            config.default_foot_offset_px
        );
    }

    #[test]
    fn storage_round_trip_preserves_knobs() {
        let mut config = RenderConfig::default();
        config.render_delay_ms = 80;
        config.foot_offsets_px.insert("shelter".to_string(), 140.0);

        let json = serde_json::to_string(&ConfigStorage::from(&config)).unwrap();
        let back: RenderConfig = serde_json::from_str::<ConfigStorage>(&json).unwrap().into();
        assert_eq!(back.render_delay_ms, 80);
        assert_eq!(back.foot_offset_px("shelter"), 140.0);
    }

    #[test]
    fn degenerate_stored_values_are_clamped() {
        let storage = ConfigStorage {
            version: 1,
            cull_margin_px: 64.0,
            render_delay_ms: 100,
            extrapolation_clamp_ms: 250,
            interp_buffer_capacity: 0,
            tile_edge_buffer: -3,
            camera_recompute_threshold_tiles: -1,
            foot_offsets_px: BTreeMap::new(),
            default_foot_offset_px: 170.0,
        };
        let config: RenderConfig = storage.into();
        assert_eq!(config.interp_buffer_capacity, 1);
        assert_eq!(config.tile_edge_buffer, 0);
        assert_eq!(config.camera_recompute_threshold_tiles, 0);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_or_default(Path::new("/nonexistent/render_profile.json"));
        assert_eq!(config.cull_margin_px, DEFAULT_CULL_MARGIN_PX);
    }
}
