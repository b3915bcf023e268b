//! Tunable parameters for tiling, tile physics and animation jobs.
//!
//! The defaults ship embedded as `assets/hexfold.json`. Every struct is
//! `#[serde(default)]`, so a partial JSON document only overrides the keys
//! it names:
//!
//! ```json
//! { "tiling": { "orientation": "flat_top" }, "physics": { "drag": 5.0 } }
//! ```

use std::fmt;

use bevy::color::Hsla;
use serde::Deserialize;

use crate::hex::Orientation;

const DEFAULT_CONFIG_JSON: &str = include_str!("../assets/hexfold.json");

/// Error raised when a configuration document cannot be parsed
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "Invalid hexfold configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Top-level configuration
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct HexConfig {
    pub tiling: TilingConfig,
    pub physics: PhysicsConfig,
    pub animation: AnimationConfig,
}

impl HexConfig {
    /// Parse a (possibly partial) configuration document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The configuration embedded in the binary
    pub fn embedded() -> Self {
        Self::from_json(DEFAULT_CONFIG_JSON).expect("Failed to parse embedded hexfold.json")
    }
}

/// Hue (degrees), saturation, lightness triple as written in JSON
pub type HslTriple = [f32; 3];

pub fn hsl(triple: HslTriple) -> Hsla {
    Hsla::hsl(triple[0], triple[1], triple[2])
}

/// Layout of the tessellation
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TilingConfig {
    /// Centre-to-vertex radius of one hex
    pub outer_radius: f32,
    /// Empty space between the edges of adjacent tiles
    pub gap: f32,
    pub orientation: Orientation,
    /// Fraction of content-column slots that receive content (0 disables content)
    pub content_density: f32,
    /// Width of the central content column, in tiles of a larger row
    pub content_column_tiles: usize,
    /// Off-screen tiles kept on every edge so panning never exposes empty space
    pub margin_tiles: usize,
    /// How many tile-steps each sector is pushed outward when the grid expands
    pub expansion_depth: usize,
    /// Width of the ring between the outer and inner hex of content tiles
    pub content_border_width: f32,
    pub base_color: HslTriple,
    pub content_color: HslTriple,
    /// Lightness added to highlighted tiles by the colour reset job
    pub highlight_lightness: f32,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            outer_radius: 48.0,
            gap: 6.0,
            orientation: Orientation::PointyTop,
            content_density: 0.4,
            content_column_tiles: 5,
            margin_tiles: 2,
            expansion_depth: 3,
            content_border_width: 5.0,
            base_color: [214.0, 0.32, 0.18],
            content_color: [32.0, 0.7, 0.46],
            highlight_lightness: 0.12,
        }
    }
}

/// Spring-mass coefficients shared by every tile particle
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub mass: f32,
    /// Drag force per unit velocity
    pub drag: f32,
    pub neighbor_spring: f32,
    pub neighbor_damping: f32,
    /// Anchor spring for interior tiles
    pub anchor_spring: f32,
    pub anchor_damping: f32,
    /// Anchor spring for border tiles (stiffer so the silhouette stays put)
    pub border_anchor_spring: f32,
    pub border_anchor_damping: f32,
    /// Force components smaller than this snap to zero
    pub force_epsilon: f32,
    /// Velocity components smaller than this snap to zero
    pub velocity_epsilon: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        presets::GENTLE
    }
}

impl PhysicsConfig {
    /// Drag only: every spring coefficient zeroed
    pub fn drag_only(drag: f32) -> Self {
        Self {
            drag,
            neighbor_spring: 0.0,
            neighbor_damping: 0.0,
            anchor_spring: 0.0,
            anchor_damping: 0.0,
            border_anchor_spring: 0.0,
            border_anchor_damping: 0.0,
            ..presets::GENTLE
        }
    }
}

/// Preset physics configurations
pub mod presets {
    use super::PhysicsConfig;

    /// Lightly damped wobble (default)
    pub const GENTLE: PhysicsConfig = PhysicsConfig {
        mass: 1.0,
        drag: 3.0,
        neighbor_spring: 20.0,
        neighbor_damping: 2.0,
        anchor_spring: 60.0,
        anchor_damping: 6.0,
        border_anchor_spring: 300.0,
        border_anchor_damping: 30.0,
        force_epsilon: 1e-3,
        velocity_epsilon: 1e-3,
    };

    /// Bouncy energetic movement
    pub const BOUNCY: PhysicsConfig = PhysicsConfig {
        mass: 1.0,
        drag: 1.0,
        neighbor_spring: 45.0,
        neighbor_damping: 1.0,
        anchor_spring: 90.0,
        anchor_damping: 2.5,
        border_anchor_spring: 400.0,
        border_anchor_damping: 25.0,
        force_epsilon: 1e-3,
        velocity_epsilon: 1e-3,
    };

    /// Sluggish heavy movement
    pub const SLUGGISH: PhysicsConfig = PhysicsConfig {
        mass: 2.5,
        drag: 6.0,
        neighbor_spring: 10.0,
        neighbor_damping: 3.0,
        anchor_spring: 30.0,
        anchor_damping: 9.0,
        border_anchor_spring: 200.0,
        border_anchor_damping: 40.0,
        force_epsilon: 1e-3,
        velocity_epsilon: 1e-3,
    };
}

/// Scheduler and per-job parameters
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Upper bound on the elapsed time fed to a single frame, in seconds
    pub max_frame_delta: f32,
    pub wave: WaveConfig,
    pub highlight: HighlightConfig,
    pub line: LineConfig,
    /// Seconds for the six sectors to open or close
    pub dilation_duration: f32,
    /// Seconds for a pan to reach its target
    pub pan_duration: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            max_frame_delta: 0.05,
            wave: WaveConfig::default(),
            highlight: HighlightConfig::default(),
            line: LineConfig::default(),
            dilation_duration: 0.5,
            pan_duration: 0.4,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct WaveConfig {
    /// Seconds for one full oscillation
    pub period: f32,
    /// Distance between two tiles in the same phase
    pub wavelength: f32,
    pub hue_amplitude: f32,
    pub lightness_amplitude: f32,
    pub displacement_amplitude: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            period: 2.5,
            wavelength: 600.0,
            hue_amplitude: 12.0,
            lightness_amplitude: 0.05,
            displacement_amplitude: 6.0,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct HighlightConfig {
    /// Distance the annulus travels per second
    pub speed: f32,
    /// Radial thickness of the annulus
    pub width: f32,
    /// Hard cap on the job's lifetime in seconds
    pub duration: f32,
    /// Peak lightness added to tiles inside the annulus
    pub lightness: f32,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            speed: 900.0,
            width: 180.0,
            duration: 1.2,
            lightness: 0.25,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct LineConfig {
    /// Corner-to-corner segments travelled per second
    pub speed: f32,
    /// Length of the visible window, in segments
    pub length: f32,
    pub width: f32,
    /// Weight of a step by its deviation from the line's heading,
    /// indexed by 0°, 60°, 120° and 180°
    pub turn_weights: [f32; 4],
    pub color: HslTriple,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            speed: 12.0,
            length: 8.0,
            width: 3.0,
            turn_weights: [1.0, 0.6, 0.15, 0.0],
            color: [190.0, 0.8, 0.7],
        }
    }
}
