use std::{path::PathBuf, time::Duration};

use crate::gesture::SwipeConfig;

const DEFAULT_BACKGROUNDS_DIR: &str = "backgrounds";
const DEFAULT_OUTPUT_DIR: &str = "out";
// Matches the 30 fps the depth and color streams run at.
const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(33);
const DEFAULT_CUTOUT_SIZE: (u32, u32) = (640, 480);
pub const PLACEHOLDER_BACKGROUNDS: usize = 8;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub swipe: SwipeConfig,
    pub backgrounds_dir: PathBuf,
    pub output_dir: PathBuf,
    pub frame_interval: Duration,
    pub cutout_size: (u32, u32),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            swipe: SwipeConfig::default(),
            backgrounds_dir: PathBuf::from(DEFAULT_BACKGROUNDS_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            cutout_size: DEFAULT_CUTOUT_SIZE,
        }
    }
}

impl AppConfig {
    /// `[BACKGROUND_DIR] [OUTPUT_DIR]`, both optional.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();
        if let Some(dir) = args.next() {
            config.backgrounds_dir = PathBuf::from(dir);
        }
        if let Some(dir) = args.next() {
            config.output_dir = PathBuf::from(dir);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_args_override_directories() {
        let config = AppConfig::from_args(["scenes".to_string(), "/tmp/render".to_string()]);

        assert_eq!(config.backgrounds_dir, PathBuf::from("scenes"));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/render"));
        assert_eq!(config.swipe, SwipeConfig::default());
    }

    #[test]
    fn no_args_keeps_defaults() {
        assert_eq!(AppConfig::from_args(Vec::new()), AppConfig::default());
    }
}
