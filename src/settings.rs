use std::env;
use std::fmt;
use std::path::PathBuf;

use anyhow::{anyhow, ensure, Context, Result};
use clap::{Parser, ValueEnum};
use config::{Config, Environment, File};
use log::{info, LevelFilter};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::config as constants;
use crate::dimension::{Offset2D, Size2D};
use crate::viewpoint::{ViewAngles, ViewPoint3D};


/// Format of the rendered output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Svg,
    Json,
}

/// Verbosity for the `env_logger` backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Runtime configuration for the renderer and viewer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Settings {
    /// Canvas size in pixels.
    pub width: f64,
    pub height: f64,
    /// Starting camera: azimuth and elevation in radians, distance in world units.
    pub theta: f64,
    pub phi: f64,
    pub rho: f64,
    /// Clockwise turn of the image, in radians.
    #[serde(default)]
    pub roll: f64,
    pub projection_distance: f64,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
    #[serde(default = "default_dot_radius")]
    pub dot_radius: f64,
    #[serde(default)]
    pub cull_back_faces: bool,
    pub background: Color,
    /// Replace `rho` with the distance that fits the scene in the canvas.
    #[serde(default)]
    pub zoom_to_fit: bool,
    /// Fraction of the canvas left free around the scene when zooming to fit.
    #[serde(default = "default_fit_margin")]
    pub fit_margin: f64,
    #[serde(default = "default_rotate_increment")]
    pub rotate_increment: f64,
    #[serde(default = "default_roll_increment")]
    pub roll_increment: f64,
    pub zoom_increment: f64,
    pub min_distance: f64,
    /// Scene file to render. The built-in demo chart is used when unset.
    #[serde(default)]
    pub scene: Option<String>,
    pub output: String,
    pub format: OutputFormat,
}

fn default_dot_radius() -> f64 {
    constants::DEFAULT_DOT_RADIUS
}

fn default_fit_margin() -> f64 {
    0.1
}

fn default_rotate_increment() -> f64 {
    constants::DEFAULT_ROTATE_INCREMENT
}

fn default_roll_increment() -> f64 {
    constants::DEFAULT_ROLL_INCREMENT
}

impl Settings {
    pub fn view_angles(&self) -> ViewAngles {
        ViewAngles {
            theta: self.theta,
            phi: self.phi,
            rho: self.rho,
            roll: self.roll,
        }
    }

    pub fn viewpoint(&self) -> ViewPoint3D {
        self.view_angles().into()
    }

    /// The starting camera. A view stored in the scene replaces the configured
    /// one, and angles given on the command line replace either.
    pub fn resolve_viewpoint(&self, args: &CliArgs, scene_view: Option<ViewAngles>) -> ViewPoint3D {
        let mut angles = scene_view.unwrap_or_else(|| self.view_angles());
        if let Some(theta) = args.theta {
            angles.theta = theta;
        }
        if let Some(phi) = args.phi {
            angles.phi = phi;
        }
        if let Some(rho) = args.rho {
            angles.rho = rho;
        }
        if let Some(roll) = args.roll {
            angles.roll = roll;
        }
        angles.into()
    }

    pub fn canvas(&self) -> Size2D {
        Size2D::new(self.width, self.height)
    }

    pub fn offset(&self) -> Offset2D {
        Offset2D::new(self.offset_x, self.offset_y)
    }
}

pub fn load_default_config() -> Result<Settings> {
    let root = retrieve_project_root()?;
    let default_config_file = root.join("config/default.toml");

    let settings = Config::builder()
        .add_source(File::from(default_config_file).required(true))
        .build()
        .context("failed to load configuration")?;

    let config: Settings = settings
        .try_deserialize()
        .context("failed to deserialize configuration")?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads the configuration and applies the process's command-line arguments.
pub fn load_config() -> Result<Settings> {
    load_config_with(&CliArgs::parse())
}

/// Layers `config/default.toml`, `config/local.toml` (if present), `CHART3D_*`
/// environment variables and finally `args`.
pub fn load_config_with(args: &CliArgs) -> Result<Settings> {
    let root = retrieve_project_root()?;

    let default_config_file = root.join("config/default.toml");
    let local_config = root.join("config/local.toml");

    let mut builder = Config::builder().add_source(File::from(default_config_file).required(true));
    if local_config.exists() {
        info!("using local configuration: {:?}", local_config);
        builder = builder.add_source(File::from(local_config).required(true));
    }

    let settings = builder
        .add_source(Environment::with_prefix("chart3d"))
        .build()
        .context("failed to load configuration")?;

    let mut config: Settings = settings
        .try_deserialize()
        .context("failed to deserialize configuration")?;

    apply_overrides(&mut config, args);
    validate_config(&config)?;

    info!("{}", config);

    Ok(config)
}

fn apply_overrides(config: &mut Settings, args: &CliArgs) {
    if let Some(scene) = &args.scene {
        config.scene = Some(scene.clone());
    }
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(theta) = args.theta {
        config.theta = theta;
    }
    if let Some(phi) = args.phi {
        config.phi = phi;
    }
    if let Some(rho) = args.rho {
        config.rho = rho;
    }
    if let Some(roll) = args.roll {
        config.roll = roll;
    }
    if let Some(distance) = args.distance {
        config.projection_distance = distance;
    }
    if args.fit {
        config.zoom_to_fit = true;
    }
    if args.cull {
        config.cull_back_faces = true;
    }
}

/// Retrieve the project root directory.
/// This function tries to find the project root directory in different ways:
/// 1. If the CARGO_MANIFEST_DIR environment variable is set, use it.
/// 2. If the CHART3D_ROOT_DIR environment variable is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or any of its parents, use it.
pub fn retrieve_project_root() -> Result<PathBuf> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        // When running through cargo (e.g. cargo run, cargo test)
        return Ok(PathBuf::from(manifest_dir));
    }
    if let Ok(path) = env::var("CHART3D_ROOT_DIR") {
        return Ok(PathBuf::from(path));
    }

    let exe_path = env::current_exe().context("failed to get current executable path")?;
    exe_path
        .ancestors()
        .skip(1)
        .find(|dir| dir.join("config").is_dir())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("could not find project root directory"))
}

pub fn validate_config(config: &Settings) -> Result<()> {
    ensure!(
        config.width > 0.0 && config.height > 0.0,
        "Canvas size must be positive"
    );
    config
        .view_angles()
        .validate()
        .context("invalid starting view")?;
    ensure!(
        config.projection_distance > 0.0,
        "Projection distance must be greater than 0"
    );
    ensure!(
        config.min_distance > 0.0,
        "Minimum viewing distance must be greater than 0"
    );
    ensure!(
        (0.0..1.0).contains(&config.fit_margin),
        "Fit margin must be in [0, 1)"
    );
    ensure!(config.dot_radius >= 0.0, "Dot radius must not be negative");
    Ok(())
}

#[derive(Parser, Debug, Default)]
#[command(version, about = "chart3d - flat-shaded 3D charts projected to 2D")]
pub struct CliArgs {
    /// Scene file (.json or .toml). Renders the built-in demo chart if omitted.
    #[arg(short, long)]
    pub scene: Option<String>,

    /// Output file path.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Canvas width in pixels.
    #[arg(long)]
    pub width: Option<f64>,

    /// Canvas height in pixels.
    #[arg(long)]
    pub height: Option<f64>,

    /// Camera azimuth in radians.
    #[arg(long, allow_negative_numbers = true)]
    pub theta: Option<f64>,

    /// Camera elevation in radians.
    #[arg(long, allow_negative_numbers = true)]
    pub phi: Option<f64>,

    /// Camera distance from the origin.
    #[arg(long)]
    pub rho: Option<f64>,

    /// Clockwise turn of the image in radians.
    #[arg(long, allow_negative_numbers = true)]
    pub roll: Option<f64>,

    /// Distance from the eye to the projection plane.
    #[arg(short, long)]
    pub distance: Option<f64>,

    /// Choose the camera distance so the whole scene fits the canvas.
    #[arg(long)]
    pub fit: bool,

    /// Drop faces turned away from the camera.
    #[arg(long)]
    pub cull: bool,

    /// Logging verbosity. `RUST_LOG` is used when omitted.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// Initialises `env_logger` at the requested level.
    pub fn init_logging(&self) {
        let mut builder = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("warn"),
        );
        if let Some(level) = self.log_level {
            builder.filter_level(level.into());
        }
        // a logger may already be installed, e.g. by a test harness
        let _ = builder.try_init();
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings:
  - Canvas: {} x {}
  - View: theta {:.4}, phi {:.4}, rho {:.4}, roll {:.4}
  - Projection Distance: {}
  - Offset: ({}, {})
  - Cull Back Faces: {}
  - Zoom To Fit: {} (margin {})
  - Scene: {}
  - Output: {} ({:?})",
            self.width,
            self.height,
            self.theta,
            self.phi,
            self.rho,
            self.roll,
            self.projection_distance,
            self.offset_x,
            self.offset_y,
            self.cull_back_faces,
            self.zoom_to_fit,
            self.fit_margin,
            self.scene.as_deref().unwrap_or("<demo>"),
            self.output,
            self.format
        )
    }
}
