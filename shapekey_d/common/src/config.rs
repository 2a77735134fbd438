use anyhow::{bail, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::axis::{AxisMapping, DEFAULT_EXP_POWER, DEFAULT_LERP_FACTOR};
use crate::group::GroupTable;
use crate::iris::DEFAULT_BLINK_RATIO;

pub const CONFIG_FILENAME: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum OutputMode {
    /// JSON record per frame over UDP.
    #[default]
    #[serde(alias = "udp", alias = "UDP")]
    Udp,
    /// JSON record per frame on stdout, one line each.
    #[serde(alias = "stdout")]
    Stdout,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    #[serde(alias = "blender_ip")]
    pub target_ip: String,
    #[serde(alias = "blender_port")]
    pub target_port: u16,
    pub output_mode: OutputMode,
    pub send_enabled: bool,

    /// Passed through to the landmark source.
    pub camera_index: i32,
    pub active_source: String,

    /// HTTP control surface port, 0 for an OS-assigned port.
    pub control_port: u16,
    pub max_fps: Option<f32>,
    pub peer_timeout_ms: u64,
    pub blink_ratio: f32,

    pub groups: GroupTable,
}

fn default_target_ip() -> String {
    "127.0.0.1".to_string()
}

fn default_target_port() -> u16 {
    5000
}

fn default_active_source() -> String {
    "synthetic_source.dll".to_string()
}

fn default_max_fps() -> Option<f32> {
    Some(60.0)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target_ip: default_target_ip(),
            target_port: default_target_port(),
            output_mode: OutputMode::default(),
            send_enabled: true,
            camera_index: 0,
            active_source: default_active_source(),
            control_port: 0,
            max_fps: default_max_fps(),
            peer_timeout_ms: 2000,
            blink_ratio: DEFAULT_BLINK_RATIO,
            groups: GroupTable::default(),
        }
    }
}

impl AppConfig {
    pub fn target_address(&self) -> String {
        format!("{}:{}", self.target_ip, self.target_port)
    }

    /// Minimum time between produced frames, or `None` for no cap.
    ///
    /// A rate too small to express as a `Duration` also disables the cap.
    pub fn frame_interval(&self) -> Option<Duration> {
        let fps = self.max_fps.filter(|fps| fps.is_finite() && *fps > 0.0)?;
        Duration::try_from_secs_f32(1.0 / fps).ok()
    }

    /// Copy with non-finite numbers replaced by their defaults, fit for writing.
    pub fn sanitized(&self) -> AppConfig {
        let mut config = self.clone();
        if !config.blink_ratio.is_finite() {
            config.blink_ratio = DEFAULT_BLINK_RATIO;
        }
        if config.max_fps.is_some_and(|fps| !fps.is_finite() || fps <= 0.0) {
            config.max_fps = default_max_fps();
        }

        let names: Vec<String> = config.groups.names().map(str::to_string).collect();
        for name in names {
            if let Some(group) = config.groups.get_mut(&name) {
                sanitize_mapping(&mut group.x);
                sanitize_mapping(&mut group.y);
            }
        }
        config
    }
}

fn sanitize_mapping(mapping: &mut AxisMapping) {
    let defaults = AxisMapping::default();
    let fields = [
        (&mut mapping.radius_min, defaults.radius_min),
        (&mut mapping.radius_max, defaults.radius_max),
        (&mut mapping.out_min, defaults.out_min),
        (&mut mapping.out_max, defaults.out_max),
        (&mut mapping.sens, defaults.sens),
        (&mut mapping.exp_power, DEFAULT_EXP_POWER),
        (&mut mapping.lerp_factor, DEFAULT_LERP_FACTOR),
    ];
    for (field, default) in fields {
        if !field.is_finite() {
            *field = default;
        }
    }
}

/// Reads and writes the config file.
///
/// A file that fails to parse is moved to `<path>.bak` before anything can
/// be saved over it. If it cannot be moved, saving stays disabled.
pub struct ConfigStore {
    path: PathBuf,
    write_blocked: AtomicBool,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_blocked: AtomicBool::new(false),
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CONFIG_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }

    pub fn is_write_blocked(&self) -> bool {
        self.write_blocked.load(Ordering::SeqCst)
    }

    /// Loads the config, writing a default one first if none exists.
    pub fn load_or_create(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            info!("Config not found. Creating default at {:?}", self.path);
            let config = AppConfig::default();
            self.save(&config)?;
            return Ok(config);
        }

        info!("Loading config from {:?}", self.path);
        let parsed = File::open(&self.path)
            .with_context(|| format!("Failed to open config file {:?}", self.path))
            .and_then(|file| {
                serde_json::from_reader::<_, AppConfig>(BufReader::new(file))
                    .with_context(|| format!("Failed to parse config file {:?}", self.path))
            });

        match parsed {
            Ok(config) => {
                self.write_blocked.store(false, Ordering::SeqCst);
                Ok(config)
            }
            Err(e) => {
                self.set_aside();
                Err(e)
            }
        }
    }

    fn set_aside(&self) {
        let backup = self.backup_path();
        match std::fs::rename(&self.path, &backup) {
            Ok(()) => warn!("Unreadable config moved to {:?}", backup),
            Err(e) => {
                warn!(
                    "Could not move unreadable config {:?} aside ({}); saving is disabled",
                    self.path, e
                );
                self.write_blocked.store(true, Ordering::SeqCst);
            }
        }
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if self.is_write_blocked() {
            bail!("Refusing to overwrite unreadable config file {:?}", self.path);
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config dir: {:?}", parent))?;
            }
        }
        let file = File::create(&self.path).context("Failed to create config file")?;
        serde_json::to_writer_pretty(BufWriter::new(file), &config.sanitized())
            .context("Failed to serialize config")?;
        info!("Saved config to {:?}", self.path);
        Ok(())
    }
}
