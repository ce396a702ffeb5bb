use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, Config};
use crate::scoring::ScoringConfig;

const HEADER: &str = "\
# site-score configuration
#
# weights: percent weights of the base score, must sum to 100
# density.buckets: business-count ranges (\"<N\", \"N-M\", \">=N\", \"N\") and factor values
# real_estate.mode: average | price_band | neutral
# tailoring: thresholds for the +15 audience-fit bonus and -15 saturation penalty
";

/// Write the default configuration to `path` (or the default location).
///
/// Refuses to replace an existing file unless `force` is set. The file is
/// written atomically so an interrupted write never leaves half a config.
pub fn write_default_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = match path {
        Some(p) => p,
        None => get_config_path()?,
    };

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Pass --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config {
        default_category: None,
        scoring: Some(ScoringConfig::default()),
    };
    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    write_atomically(&config_path, &format!("{}\n{}", HEADER, yaml))?;
    Ok(config_path)
}

fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save config to {}", path.display()))?;
    Ok(())
}
