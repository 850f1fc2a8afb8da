use std::path::PathBuf;

use log::LevelFilter;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} needs a value")]
    MissingValue(&'static str),
    #[error("bad value `{value}` for {flag}")]
    BadValue { flag: &'static str, value: String },
    #[error("unknown argument `{0}`")]
    Unknown(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModelSource {
    /// The built-in cube.
    Cube,
    Obj(PathBuf),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    pub model: ModelSource,
    pub texture: Option<PathBuf>,
    /// Cycle the tint colour every frame.
    pub cycle: bool,
    pub log_level: LevelFilter,
    // units per second
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
    pub window_size: (u32, u32),
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model: ModelSource::Cube,
            texture: None,
            cycle: false,
            log_level: LevelFilter::Warn,
            move_speed: 3.0,
            mouse_sensitivity: 0.05,
            window_size: (1024, 768),
        }
    }
}

pub const USAGE: &str = "usage: obj-viewer [MODEL.obj|cube] [--texture PATH] [--cycle] \
[--log-level LEVEL] [--speed F] [--sensitivity F]";

impl ViewerConfig {
    /// Parses everything after the program name.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--texture" => {
                    cfg.texture = Some(value(&mut args, "--texture")?.into());
                }
                "--cycle" => cfg.cycle = true,
                "--log-level" => cfg.log_level = parsed(&mut args, "--log-level")?,
                "--speed" => cfg.move_speed = parsed(&mut args, "--speed")?,
                "--sensitivity" => cfg.mouse_sensitivity = parsed(&mut args, "--sensitivity")?,
                "cube" => cfg.model = ModelSource::Cube,
                a if a.starts_with("--") => return Err(ConfigError::Unknown(a.to_owned())),
                path => cfg.model = ModelSource::Obj(path.into()),
            }
        }
        Ok(cfg)
    }

    /// DDS rows are stored top-down, so obj uvs get their V flipped to match.
    pub fn flip_v(&self) -> bool {
        self.texture
            .as_ref()
            .and_then(|t| t.extension())
            .map_or(false, |e| e.eq_ignore_ascii_case("dds"))
    }
}

fn value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ConfigError> {
    args.next().ok_or(ConfigError::MissingValue(flag))
}

fn parsed<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ConfigError> {
    let v = value(args, flag)?;
    v.parse().map_err(|_| ConfigError::BadValue { flag, value: v })
}
