// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::core::{RasterMode, ScalingPolicy};

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "emu-present")]
#[command(about = "Presents an emulated raster display in a scalable window", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Raster encoding, overrides the config file
    #[arg(long, value_enum)]
    pub mode: Option<RasterMode>,

    /// Scaling policy, overrides the config file
    #[arg(long, value_enum)]
    pub scaling: Option<ScalingPolicy>,

    /// Intermediate target magnification (indexed mode)
    #[arg(long)]
    pub magnification: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let cli = Cli::try_parse_from(["emu-present"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.mode.is_none());
        assert!(cli.scaling.is_none());
    }

    #[test]
    fn test_value_enums() {
        let cli = Cli::try_parse_from([
            "emu-present",
            "--mode",
            "true-color",
            "--scaling",
            "integer-fit",
            "--magnification",
            "4",
        ])
        .unwrap();
        assert_eq!(cli.mode, Some(RasterMode::TrueColor));
        assert_eq!(cli.scaling, Some(ScalingPolicy::IntegerFit));
        assert_eq!(cli.magnification, Some(4));
    }

    #[test]
    fn test_bad_policy_rejected() {
        assert!(Cli::try_parse_from(["emu-present", "--scaling", "stretch"]).is_err());
    }
}
