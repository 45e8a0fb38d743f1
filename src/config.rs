//! Slider configuration model (YAML, kebab-case).

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{Result, ensure};
use serde::Deserialize;
use serde::de::{self, Deserializer};

use crate::error::Error;
use crate::slide::Slide;

/// The transition style to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    Cube,
    Cascade,
    Glitch,
}

impl StyleKind {
    const ALL: &'static [Self] = &[Self::Cube, Self::Cascade, Self::Glitch];
    const NAMES: &'static [&'static str] = &["cube", "cascade", "glitch"];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Cube => "cube",
            Self::Cascade => "cascade",
            Self::Glitch => "glitch",
        }
    }
}

impl Default for StyleKind {
    fn default() -> Self {
        Self::Glitch
    }
}

impl fmt::Display for StyleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StyleKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        for kind in Self::ALL {
            if raw == kind.as_str() {
                return Ok(*kind);
            }
        }
        Err(de::Error::unknown_variant(&raw, Self::NAMES))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SliderConfig {
    #[serde(default)]
    pub style: StyleKind,

    /// Duration of one single-slide step.
    #[serde(
        default = "SliderConfig::default_transition_duration",
        with = "humantime_serde"
    )]
    pub transition_duration: Duration,

    /// Target display aspect ratio (width / height).
    #[serde(default = "SliderConfig::default_aspect_ratio")]
    pub aspect_ratio: f32,

    /// Glitch knobs, each in `0..=1`.
    #[serde(default = "SliderConfig::default_intensity")]
    pub aberration_intensity: f32,
    #[serde(default = "SliderConfig::default_intensity")]
    pub scanline_intensity: f32,
    #[serde(default = "SliderConfig::default_intensity")]
    pub grain_intensity: f32,

    /// Cascade: tile count along the shorter screen dimension.
    #[serde(default = "SliderConfig::default_min_tiles")]
    pub min_tiles: u32,

    /// Wrap around at the deck boundaries.
    #[serde(default = "SliderConfig::default_looping", rename = "loop")]
    pub looping: bool,

    /// Present with the 2D crossfade fallback even when a GPU is available
    /// (the fallback-override knob; the capability gate forces this on its
    /// own when no GPU exists).
    #[serde(default)]
    pub force_fallback: bool,

    #[serde(default)]
    pub auto_play: bool,
    #[serde(
        default = "SliderConfig::default_auto_play_interval",
        with = "humantime_serde"
    )]
    pub auto_play_interval: Duration,

    /// Optional explicit slide list; the demo binary scans a directory when
    /// this is empty.
    #[serde(default)]
    pub slides: Vec<Slide>,
}

impl SliderConfig {
    fn default_transition_duration() -> Duration {
        Duration::from_millis(800)
    }

    fn default_aspect_ratio() -> f32 {
        1.5
    }

    fn default_intensity() -> f32 {
        0.5
    }

    fn default_min_tiles() -> u32 {
        10
    }

    fn default_looping() -> bool {
        true
    }

    fn default_auto_play_interval() -> Duration {
        Duration::from_secs(3)
    }

    /// Step duration in milliseconds, as the engine consumes it.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_ms(&self) -> f32 {
        (self.transition_duration.as_millis() as f32).max(1.0)
    }

    /// Validate ranges that serde cannot express.
    ///
    /// # Errors
    /// Returns a descriptive error for any out-of-range knob.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.transition_duration.is_zero(),
            "transition-duration must be positive"
        );
        ensure!(
            self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0,
            "aspect-ratio must be a positive number, got {}",
            self.aspect_ratio
        );
        for (name, value) in [
            ("aberration-intensity", self.aberration_intensity),
            ("scanline-intensity", self.scanline_intensity),
            ("grain-intensity", self.grain_intensity),
        ] {
            ensure!(
                (0.0..=1.0).contains(&value),
                "{name} must be in 0..=1, got {value}"
            );
        }
        ensure!(
            self.min_tiles >= 2,
            "min-tiles must be at least 2, got {}",
            self.min_tiles
        );
        ensure!(
            !self.auto_play || !self.auto_play_interval.is_zero(),
            "auto-play-interval must be positive when auto-play is on"
        );
        Ok(())
    }
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            style: StyleKind::default(),
            transition_duration: Self::default_transition_duration(),
            aspect_ratio: Self::default_aspect_ratio(),
            aberration_intensity: Self::default_intensity(),
            scanline_intensity: Self::default_intensity(),
            grain_intensity: Self::default_intensity(),
            min_tiles: Self::default_min_tiles(),
            looping: Self::default_looping(),
            force_fallback: false,
            auto_play: false,
            auto_play_interval: Self::default_auto_play_interval(),
            slides: Vec::new(),
        }
    }
}

/// Load a [`SliderConfig`] from a YAML file.
///
/// # Errors
/// Returns [`Error::Io`] or [`Error::Config`] on read/parse failure.
pub fn from_yaml_file(path: &Path) -> Result<SliderConfig, Error> {
    let raw = std::fs::read_to_string(path)?;
    let cfg: SliderConfig = serde_yaml::from_str(&raw)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = SliderConfig::default();
        assert_eq!(cfg.style, StyleKind::Glitch);
        assert_eq!(cfg.transition_duration, Duration::from_millis(800));
        assert_eq!(cfg.aspect_ratio, 1.5);
        assert_eq!(cfg.min_tiles, 10);
        assert!(cfg.looping);
        cfg.validate().unwrap();
    }

    #[test]
    fn yaml_round_trip_with_knobs() {
        let cfg: SliderConfig = serde_yaml::from_str(
            "style: cascade\ntransition-duration: 1s 200ms\nmin-tiles: 4\nloop: false\n",
        )
        .unwrap();
        assert_eq!(cfg.style, StyleKind::Cascade);
        assert_eq!(cfg.transition_duration, Duration::from_millis(1200));
        assert_eq!(cfg.min_tiles, 4);
        assert!(!cfg.looping);
    }

    #[test]
    fn unknown_style_is_rejected() {
        let err = serde_yaml::from_str::<SliderConfig>("style: wipe\n").unwrap_err();
        assert!(err.to_string().contains("wipe"));
    }

    #[test]
    fn out_of_range_knob_fails_validation() {
        let mut cfg = SliderConfig::default();
        cfg.grain_intensity = 1.5;
        assert!(cfg.validate().is_err());
        cfg.grain_intensity = 0.5;
        cfg.min_tiles = 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn yaml_parse_failure_maps_to_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "style: [not, a, string]").unwrap();
        match from_yaml_file(&path) {
            Err(Error::Config(_)) => {}
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
