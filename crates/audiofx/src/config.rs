use crate::events::AppEvent;
use async_channel::Sender;
use directories::ProjectDirs;
use knob::{Easing, KnobId};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use palette::{Srgb, Srgba, WithAlpha};
use serde::Deserialize;
use serde_with::DeserializeFromStr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// An opaque `#rrggbb` (or `#rgb`) colour from the config file.
#[derive(Debug, Clone, Copy, PartialEq, DeserializeFromStr)]
pub struct HexColor(Srgb<u8>);

#[derive(Error, Debug)]
pub enum ColorError {
    #[error("Invalid colour '{0}', expected #rrggbb")]
    Invalid(String),
}

impl FromStr for HexColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Srgb<u8>>()
            .map(Self)
            .map_err(|_| ColorError::Invalid(s.to_string()))
    }
}

impl HexColor {
    pub fn to_srgba(self, alpha: f64) -> Srgba<f64> {
        self.0.into_format::<f64>().with_alpha(alpha)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnobConfig {
    pub id: KnobId,
    pub label: String,
    #[serde(default = "default_max")]
    pub max: i32,
    #[serde(default)]
    pub value: i32,
    #[serde(default = "default_true")]
    pub on: bool,
    /// Taps on a locked knob are refused.
    #[serde(default)]
    pub locked: bool,
    /// Image painted as the knob body instead of the plain disc.
    #[serde(default)]
    pub foreground: Option<PathBuf>,
}

impl KnobConfig {
    fn new(id: &str, label: &str, max: i32, value: i32) -> Self {
        Self {
            id: KnobId::from(id),
            label: label.to_string(),
            max,
            value,
            on: true,
            locked: false,
            foreground: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ThemeConfig {
    pub highlight: Option<HexColor>,
    pub lowlight: Option<HexColor>,
    pub disabled: Option<HexColor>,
    /// Indicator dot diameter in pixels. Scales with the knob when unset.
    pub indicator_size: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_knobs")]
    pub knobs: Vec<KnobConfig>,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default = "default_animation_ms")]
    pub animation_ms: u64,
    #[serde(default)]
    pub easing: Easing,
    /// Master switch for all effects.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            knobs: default_knobs(),
            theme: ThemeConfig::default(),
            animation_ms: default_animation_ms(),
            easing: Easing::default(),
            enabled: true,
        }
    }
}

fn default_knobs() -> Vec<KnobConfig> {
    vec![
        KnobConfig::new("bass", "Bass", 1000, 500),
        KnobConfig::new("treble", "Treble", 100, 30),
        KnobConfig::new("virtualizer", "Virtualizer", 1000, 250),
    ]
}

fn default_max() -> i32 {
    knob::knob::DEFAULT_MAX
}

fn default_animation_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no home directory to keep the config in")]
    NoConfigDir,
    #[error("invalid config: {0}")]
    Load(#[from] config::ConfigError),
    #[error("cannot watch config: {0}")]
    Watch(#[from] notify::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "audiofx", "audiofx").ok_or(ConfigError::NoConfigDir)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config(config_path: &Path) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("AUDIOFX"))
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Loads the config, falling back to the built-in knobs when it is unreadable.
pub fn load_or_default(config_path: &Path) -> Config {
    match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Using default settings, {}: {}", config_path.display(), e);
            Config::default()
        }
    }
}

/// Writes the commented default settings to `path` unless a file is already there.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        log::info!("Keeping existing config {}", path.display());
        return Ok(());
    }
    if let Some(dir) = path.parent() {
        fs_err::create_dir_all(dir)?;
    }
    fs_err::write(path, DEFAULT_CONFIG)?;
    Ok(())
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Editors often save in several steps (truncate, write, rename).
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(200);

/// Whether a file event should reload the config. A removed file is ignored:
/// the knobs on screen stay until a new file is written.
fn triggers_reload(event: &notify::Event, config_path: &Path) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event.paths.iter().any(|p| p == config_path)
}

/// Watches the config directory and sends one [`AppEvent::ConfigReload`] per
/// burst of changes to `config_path`.
pub async fn run_async_watcher(tx: Sender<AppEvent>, config_path: PathBuf) {
    if let Err(e) = watch_config(&tx, &config_path).await {
        log::error!("Config reload disabled for {}: {}", config_path.display(), e);
    }
}

async fn watch_config(tx: &Sender<AppEvent>, config_path: &Path) -> Result<(), ConfigError> {
    // watching the directory catches files replaced by rename
    let Some(dir) = config_path.parent() else {
        return Ok(());
    };
    fs_err::create_dir_all(dir)?;

    let (events_tx, events) = async_channel::unbounded();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = events_tx.send_blocking(res);
        },
        notify::Config::default(),
    )?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    log::debug!("Watching {} for changes", config_path.display());

    while let Ok(res) = events.recv().await {
        match res {
            Ok(event) if triggers_reload(&event, config_path) => {
                // swallow the rest of the burst
                while let Ok(Ok(_)) = tokio::time::timeout(RELOAD_DEBOUNCE, events.recv()).await {}
                if tx.send(AppEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => log::warn!("Config watch error: {}", e),
        }
    }
    Ok(())
}
