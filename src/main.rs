//! # Voxel Streamer Demo Entry Point
//!
//! This is the entry point for the headless demo driver. It loads the
//! streamer configuration (from a JSON file given as the first argument, or
//! the built-in defaults) and calls into the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release [config.json]
//! ```

use voxel_streamer::config::StreamerConfig;

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match StreamerConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("failed to load config {}: {}", path, err);
                std::process::exit(1);
            }
        },
        None => StreamerConfig::default(),
    };

    voxel_streamer::run(config);
}
