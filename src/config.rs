//! # Streamer Configuration
//!
//! Runtime configuration for the world streamer. The defaults carry the
//! reference tuning; a JSON file with any subset of the fields can override
//! them for the demo binary.

use serde::Deserialize;

/// Configuration for a [`WorldStreamer`](crate::world::streamer::WorldStreamer).
///
/// All fields have defaults, so a JSON config file only needs to name the
/// values it wants to change:
///
/// ```json
/// { "seed": 7, "load_radius": 6 }
/// ```
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct StreamerConfig {
    /// Seed for the procedural terrain field and decoration placement.
    pub seed: u32,

    /// Streaming radius: chunks within this L1 distance of the observer's
    /// chunk are kept resident.
    pub load_radius: i32,

    /// How many chunk layers below the observer's chunk are kept resident.
    /// The band above uses the full `load_radius`; the band below is shallow
    /// to avoid generating unreachable deep underground volume.
    pub depth_below: i32,

    /// Total number of pooled chunk slots. The working set never grows past
    /// this; a load request against an empty pool is logged and skipped.
    pub max_chunks: usize,

    /// Number of background worker threads. `0` selects one per available
    /// core, leaving one for the main thread.
    pub workers: usize,

    /// Minimum squared distance (in chunk units) the observer's chunk must
    /// move from the last reload point before chunks are reloaded again.
    pub min_reload_distance_sq: i32,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        StreamerConfig {
            seed: 0,
            load_radius: 5,
            depth_below: 2,
            max_chunks: 512,
            workers: 0,
            min_reload_distance_sq: 16,
        }
    }
}

impl StreamerConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Arguments
    /// * `path` - Path to the JSON file
    ///
    /// # Returns
    /// The parsed configuration, or an I/O error (malformed JSON is reported
    /// as `InvalidData`).
    pub fn from_json_file(path: &str) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_carries_reference_tuning() {
        let config = StreamerConfig::default();
        assert_eq!(config.load_radius, 5);
        assert_eq!(config.min_reload_distance_sq, 16);
        assert_eq!(config.max_chunks, 512);
    }

    #[test]
    fn partial_json_overrides_defaults() {
        let config: StreamerConfig =
            serde_json::from_str(r#"{ "seed": 42, "load_radius": 3 }"#).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.load_radius, 3);
        assert_eq!(config.max_chunks, StreamerConfig::default().max_chunks);
    }
}
