//! Configuration loading for the shield verifier.
//!
//! The TOML file is deserialized into private raw structs where every field
//! is optional, then resolved into validated [`SweepSettings`] and
//! [`DemoSettings`]. Nothing downstream sees an unvalidated value.

use std::env;
use std::fs;
use std::io;
use std::num::{NonZeroU32, NonZeroU64};
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use shield_types::{ActionSpace, ShieldDepth, SweepPlan};
use thiserror::Error;
use toml::de;

/// Environment variable naming a config file to use instead of the default.
pub const CONFIG_ENV: &str = "SHIELD_CONFIG";

const DEFAULT_MIN_NOOPS: u32 = 0;
const DEFAULT_MAX_NOOPS: u32 = 30;
const DEFAULT_SHIELD_DEPTH: u32 = 4;
const DEFAULT_MAX_FRAMES: u64 = 10_000;

const DEFAULT_LANES: NonZeroU32 = NonZeroU32::new(3).unwrap();
const DEFAULT_ROAD_LENGTH: NonZeroU64 = NonZeroU64::new(200).unwrap();
const DEFAULT_OBSTACLE_DENSITY: f64 = 0.2;
const DEFAULT_SEED: u64 = 7;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: de::Error,
    },
    #[error("invalid [demo] settings in {}: {reason}", path.display())]
    InvalidDemo { path: PathBuf, reason: &'static str },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::InvalidDemo { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    sweep: Option<RawSweep>,
    demo: Option<RawDemo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSweep {
    min_noops: Option<u32>,
    max_noops: Option<u32>,
    shield_depth: Option<u32>,
    max_frames: Option<u64>,
    #[serde(default)]
    demand_full_safety: bool,
    #[serde(default)]
    render: bool,
    action_repeat: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDemo {
    lanes: Option<u32>,
    road_length: Option<u64>,
    obstacle_density: Option<f64>,
    seed: Option<u64>,
}

/// Resolved `[sweep]` section. Independent of any particular environment;
/// combine with its action space through [`SweepSettings::plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepSettings {
    noops: Range<u32>,
    shield_depth: ShieldDepth,
    max_frames: u64,
    demand_full_safety: bool,
    render: bool,
    action_repeat: u32,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            noops: DEFAULT_MIN_NOOPS..DEFAULT_MAX_NOOPS,
            shield_depth: ShieldDepth::new(DEFAULT_SHIELD_DEPTH),
            max_frames: DEFAULT_MAX_FRAMES,
            demand_full_safety: false,
            render: false,
            action_repeat: 0,
        }
    }
}

impl SweepSettings {
    /// Every combination is runnable: `min_noops >= max_noops` is an empty
    /// sweep and `max_frames = 0` still lets each run take one step.
    fn resolve(raw: RawSweep) -> Self {
        let min = raw.min_noops.unwrap_or(DEFAULT_MIN_NOOPS);
        let max = raw.max_noops.unwrap_or(DEFAULT_MAX_NOOPS);
        if min >= max {
            tracing::warn!(min, max, "noop range is empty; the sweep will run nothing");
        }
        Self {
            noops: min..max,
            shield_depth: ShieldDepth::new(raw.shield_depth.unwrap_or(DEFAULT_SHIELD_DEPTH)),
            max_frames: raw.max_frames.unwrap_or(DEFAULT_MAX_FRAMES),
            demand_full_safety: raw.demand_full_safety,
            render: raw.render,
            action_repeat: raw.action_repeat.unwrap_or(0),
        }
    }

    #[must_use]
    pub fn noops(&self) -> Range<u32> {
        self.noops.clone()
    }

    #[must_use]
    pub const fn shield_depth(&self) -> ShieldDepth {
        self.shield_depth
    }

    #[must_use]
    pub const fn max_frames(&self) -> u64 {
        self.max_frames
    }

    #[must_use]
    pub const fn demand_full_safety(&self) -> bool {
        self.demand_full_safety
    }

    #[must_use]
    pub const fn render(&self) -> bool {
        self.render
    }

    #[must_use]
    pub const fn action_repeat(&self) -> u32 {
        self.action_repeat
    }

    /// Builds the sweep for an environment with `action_space` actions.
    #[must_use]
    pub fn plan(&self, action_space: ActionSpace) -> SweepPlan {
        SweepPlan::new(action_space, self.noops(), self.max_frames)
            .with_shield_depth(self.shield_depth)
            .with_demand_full_safety(self.demand_full_safety)
            .with_render(self.render)
            .with_action_repeat(self.action_repeat)
    }
}

/// Resolved `[demo]` section for the built-in lane-runner process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoSettings {
    lanes: NonZeroU32,
    road_length: NonZeroU64,
    obstacle_density: f64,
    seed: u64,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            lanes: DEFAULT_LANES,
            road_length: DEFAULT_ROAD_LENGTH,
            obstacle_density: DEFAULT_OBSTACLE_DENSITY,
            seed: DEFAULT_SEED,
        }
    }
}

impl DemoSettings {
    fn resolve(raw: RawDemo) -> Result<Self, &'static str> {
        let defaults = Self::default();
        let lanes = match raw.lanes {
            Some(lanes) => NonZeroU32::new(lanes).ok_or("lanes must be at least 1")?,
            None => defaults.lanes,
        };
        let road_length = match raw.road_length {
            Some(len) => NonZeroU64::new(len).ok_or("road_length must be at least 1")?,
            None => defaults.road_length,
        };
        let obstacle_density = raw.obstacle_density.unwrap_or(defaults.obstacle_density);
        if !(0.0..=1.0).contains(&obstacle_density) {
            return Err("obstacle_density must be within [0, 1]");
        }
        Ok(Self {
            lanes,
            road_length,
            obstacle_density,
            seed: raw.seed.unwrap_or(defaults.seed),
        })
    }

    /// Builds settings without a config file. Used by tests and embedders.
    pub fn new(
        lanes: u32,
        road_length: u64,
        obstacle_density: f64,
        seed: u64,
    ) -> Result<Self, &'static str> {
        Self::resolve(RawDemo {
            lanes: Some(lanes),
            road_length: Some(road_length),
            obstacle_density: Some(obstacle_density),
            seed: Some(seed),
        })
    }

    #[must_use]
    pub const fn lanes(&self) -> u32 {
        self.lanes.get()
    }

    #[must_use]
    pub const fn road_length(&self) -> u64 {
        self.road_length.get()
    }

    #[must_use]
    pub const fn obstacle_density(&self) -> f64 {
        self.obstacle_density
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShieldConfig {
    pub sweep: SweepSettings,
    pub demo: DemoSettings,
}

impl ShieldConfig {
    /// Loads configuration from `explicit`, else `$SHIELD_CONFIG`, else
    /// `~/.shield/config.toml`.
    ///
    /// A missing default file yields [`ShieldConfig::default`]. A path that
    /// was asked for explicitly, by argument or environment, must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let requested = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
        if let Some(path) = requested {
            return Self::from_path(&path);
        }

        let Some(path) = config_path() else {
            tracing::debug!("no home directory; using default config");
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }
        Self::from_path(&path)
    }

    /// Reads and resolves the file at `path`.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| {
            tracing::warn!(path = %path.display(), %source, "failed to read config");
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let config = Self::parse(&content, path)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let sweep = SweepSettings::resolve(raw.sweep.unwrap_or_default());
        let demo = DemoSettings::resolve(raw.demo.unwrap_or_default()).map_err(|reason| {
            ConfigError::InvalidDemo {
                path: path.to_path_buf(),
                reason,
            }
        })?;
        Ok(Self { sweep, demo })
    }
}

/// Default config file location, `~/.shield/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".shield").join("config.toml"))
}
