use std::path::PathBuf;

use yuletree::app::{self, GestureMode};
use yuletree::{AppError, SceneConfig};

const USAGE: &str = "usage: yuletree [CONFIG.json] [--demo-gestures | --no-gestures]";

fn main() -> Result<(), AppError> {
    env_logger::init();

    let mut config_path: Option<PathBuf> = None;
    let mut gestures = GestureMode::Camera;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--demo-gestures" => gestures = GestureMode::Demo,
            "--no-gestures" => gestures = GestureMode::Off,
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            flag if flag.starts_with('-') => {
                log::warn!("ignoring unknown option {flag}");
                eprintln!("{USAGE}");
            }
            path => config_path = Some(PathBuf::from(path)),
        }
    }

    let config = match config_path {
        Some(path) => {
            log::info!("loading config from {}", path.display());
            SceneConfig::load(path)?
        }
        None => SceneConfig::default(),
    };

    app::run(config, gestures)
}
