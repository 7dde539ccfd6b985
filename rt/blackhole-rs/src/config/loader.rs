use std::path::Path;

use super::{ConfigError, SceneConfig};

/// Load a scene configuration from a YAML file. Missing sections and
/// fields fall back to their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SceneConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: SceneConfig = serde_yaml::from_str(&content)?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_config() {
        let result = load_config("/nonexistent/blackhole.yaml");
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_config_invalid_yaml() {
        let temp_file = std::env::temp_dir().join("blackhole_invalid_config.yaml");
        std::fs::write(&temp_file, "warp: [strength: ").unwrap();

        let result = load_config(&temp_file);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        let _ = std::fs::remove_file(&temp_file);
    }

    #[test]
    fn test_load_config_partial_overrides() {
        let temp_file = std::env::temp_dir().join("blackhole_partial_config.yaml");
        let content = r#"
black_hole:
  resolution: 256
warp:
  strength: 0.3
  ring_sharpness: 12.0
"#;
        std::fs::write(&temp_file, content).unwrap();

        let config = load_config(&temp_file).unwrap();
        assert_eq!(config.black_hole.resolution, 256);
        assert_eq!(config.black_hole.point_size, 6.0);
        assert_eq!(config.warp.strength, 0.3);
        assert_eq!(config.warp.ring_sharpness, 12.0);
        assert_eq!(config.warp.falloff, 2.0);
        assert_eq!(config.disk.angular_steps, 360);

        let _ = std::fs::remove_file(&temp_file);
    }

    #[test]
    fn test_load_config_out_of_range() {
        let temp_file = std::env::temp_dir().join("blackhole_out_of_range_config.yaml");
        std::fs::write(&temp_file, "black_hole:\n  point_size: 200.0\n").unwrap();

        let result = load_config(&temp_file);
        assert!(matches!(result, Err(ConfigError::Validation(_))));

        let _ = std::fs::remove_file(&temp_file);
    }

    #[test]
    fn test_load_config_oversized_grid() {
        let temp_file = std::env::temp_dir().join("blackhole_oversized_grid_config.yaml");
        std::fs::write(&temp_file, "grid:\n  half_extent: 40000\n").unwrap();

        let result = load_config(&temp_file);
        assert!(matches!(result, Err(ConfigError::Validation(_))));

        let _ = std::fs::remove_file(&temp_file);
    }
}
