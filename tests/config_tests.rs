use std::io::Write;

use emu_present::cli::Cli;
use emu_present::core::{RasterMode, ScalingPolicy};
use emu_present::{Config, ConfigError};

fn write_temp_config(name: &str, contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("emu-present-{}-{}.toml", name, std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::resolve(&Cli::default()).unwrap();
        assert_eq!(config.video.mode, RasterMode::Indexed);
        assert_eq!(config.video.scaling, ScalingPolicy::AspectFit);
        assert_eq!(config.video.magnification, 2);
        assert_eq!((config.window.width, config.window.height), (640, 480));
    }

    #[test]
    fn test_file_then_cli_override() {
        let path = write_temp_config(
            "override",
            "[video]\nscaling = \"integer-fit\"\nmagnification = 4\n\n[window]\ntitle = \"Test\"\n",
        );
        let cli = Cli {
            config: Some(path.clone()),
            mode: Some(RasterMode::TrueColor),
            scaling: None,
            magnification: Some(1),
        };

        let config = Config::resolve(&cli).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.video.mode, RasterMode::TrueColor);
        assert_eq!(config.video.scaling, ScalingPolicy::IntegerFit);
        assert_eq!(config.video.magnification, 1);
        assert_eq!(config.window.title, "Test");
    }

    #[test]
    fn test_cli_override_is_validated() {
        let cli = Cli {
            magnification: Some(0),
            ..Cli::default()
        };
        assert!(matches!(Config::resolve(&cli), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let cli = Cli {
            config: Some("/nonexistent/emu-present.toml".into()),
            ..Cli::default()
        };
        assert!(matches!(Config::resolve(&cli), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let path = write_temp_config("malformed", "[video\nmode = ");
        let result = Config::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_clear_color_out_of_range() {
        let result = Config::from_toml("[video]\nclear_color = [0.0, 2.0, 0.0]\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
