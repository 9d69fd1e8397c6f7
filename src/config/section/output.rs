//! `[output]` section configuration.
//!
//! Mirrors the live results to disk so other tools (diff viewers, editors
//! with auto-reload) can follow along.
//!
//! # Example
//!
//! ```toml
//! [output]
//! structure_map = "out/map.json"   # Compiled StructureMap
//! result = "out/result.json"       # Transformed resource
//! pretty = true
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Output file settings. Both paths are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where to write the compiled StructureMap JSON.
    pub structure_map: Option<PathBuf>,

    /// Where to write the transformed resource JSON.
    pub result: Option<PathBuf>,

    /// Pretty-print written JSON.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            structure_map: None,
            result: None,
            pretty: true,
        }
    }
}

impl OutputConfig {
    /// Resolve relative paths against the config file's directory.
    pub(crate) fn normalize_paths(&mut self, root: &std::path::Path) {
        for path in [&mut self.structure_map, &mut self.result].into_iter().flatten() {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use crate::config::test_parse_config;

    #[test]
    fn test_output_config_defaults() {
        let config = test_parse_config("");
        assert!(config.output.structure_map.is_none());
        assert!(config.output.result.is_none());
        assert!(config.output.pretty);
    }

    #[test]
    fn test_output_paths_resolved_against_root() {
        let mut config = test_parse_config(
            "[output]\nstructure_map = \"out/map.json\"\nresult = \"/abs/result.json\"",
        );
        config.output.normalize_paths(Path::new("/project"));
        assert_eq!(
            config.output.structure_map,
            Some(PathBuf::from("/project/out/map.json"))
        );
        assert_eq!(config.output.result, Some(PathBuf::from("/abs/result.json")));
    }
}
