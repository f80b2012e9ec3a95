use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::Path;

use super::schema::Config;

const HEADER: &str = "# paddock configuration\n# strategy: performance | form, session: race | sprint\n";

/// Write the default configuration to `path`.
///
/// Refuses to replace an existing file unless `force` is set. The file is
/// written atomically, so an interrupted write never leaves a partial config.
pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    let yaml = serde_saphyr::to_string(&Config::default())
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    // Create parent directories
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(HEADER.as_bytes())
        .and_then(|_| file.write_all(yaml.as_bytes()))
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit().context("Failed to save config")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use std::env;

    #[test]
    fn test_written_config_loads_back() {
        let dir = env::temp_dir().join("paddock_test_init");
        let path = dir.join("config.yaml");
        let _ = std::fs::remove_dir_all(&dir);

        write_default_config(&path, false).unwrap();
        let loaded = load_config(Some(path.clone())).unwrap();
        assert_eq!(loaded, Config::default());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_refuses_overwrite_without_force() {
        let dir = env::temp_dir().join("paddock_test_init_overwrite");
        let path = dir.join("config.yaml");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, "top_n: 3\n").unwrap();

        assert!(write_default_config(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "top_n: 3\n");

        write_default_config(&path, true).unwrap();
        assert_eq!(load_config(Some(path.clone())).unwrap().top_n, 10);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
