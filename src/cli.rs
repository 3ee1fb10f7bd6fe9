// cli.rs - Command-line interface configuration
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::config::SceneConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "point-scene")]
#[command(about = "Event-driven 3D viewer for point datasets", long_about = None)]
pub struct Cli {
    /// Point data file: one record per line, whitespace or comma separated
    pub data: Option<PathBuf>,

    /// JSON scene configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Render one frame without a window and print its stats
    #[arg(long, default_value = "false")]
    pub headless: bool,

    /// Window width, overrides the config
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height, overrides the config
    #[arg(long)]
    pub height: Option<u32>,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied
    pub fn scene_config(&self) -> Result<SceneConfig> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::load(path)?,
            None => SceneConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["point-scene"]).unwrap();
        assert!(cli.data.is_none());
        assert!(!cli.headless);
        assert_eq!(cli.scene_config().unwrap(), SceneConfig::default());
    }

    #[test]
    fn test_parse_data_and_overrides() {
        let cli = Cli::try_parse_from([
            "point-scene",
            "points.txt",
            "--headless",
            "--width",
            "1024",
        ])
        .unwrap();

        assert_eq!(cli.data, Some(PathBuf::from("points.txt")));
        assert!(cli.headless);
        let config = cli.scene_config().unwrap();
        assert_eq!(config.width, 1024);
        assert_eq!(config.height, 600);
    }

    #[test]
    fn test_missing_config_file_errors() {
        let cli = Cli::try_parse_from(["point-scene", "--config", "/no/such/scene.json"]).unwrap();
        assert!(cli.scene_config().is_err());
    }
}
