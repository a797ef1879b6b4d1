use super::config::NodeopsConfig;
use std::path::Path;

/// Write a commented default config file
pub fn execute(config_path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    NodeopsConfig::create_default(config_path, force)?;
    println!("Wrote default configuration to {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_config_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nodeops").join("config.toml");

        execute(&path, false).unwrap();
        assert!(path.exists());
        assert!(execute(&path, false).is_err());
        execute(&path, true).unwrap();
    }
}
