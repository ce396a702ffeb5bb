use anyhow::{Context, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// A raw bundle together with where it came from.
#[derive(Debug, Clone)]
pub struct SourcedBundle {
    /// File path, or "-" for stdin
    pub source: String,
    pub value: Value,
}

/// Read one JSON bundle from a file path, or from stdin when `source` is "-".
///
/// Only I/O and JSON syntax errors are reported here. A bundle that parses but
/// has the wrong shape is left for the engine to degrade gracefully.
pub fn read_bundle(source: &str) -> Result<SourcedBundle> {
    let value = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .lock()
            .read_to_string(&mut buf)
            .context("Failed to read bundle from stdin")?;
        serde_json::from_str(&buf).context("Failed to parse bundle from stdin: invalid JSON")?
    } else {
        let path = Path::new(source);
        let file = File::open(path)
            .with_context(|| format!("Failed to open bundle at {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse bundle at {}: invalid JSON", path.display()))?
    };

    Ok(SourcedBundle {
        source: source.to_string(),
        value,
    })
}

/// Read several bundles, stopping at the first one that cannot be read.
pub fn read_bundles(sources: &[String]) -> Result<Vec<SourcedBundle>> {
    sources.iter().map(|s| read_bundle(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_read_bundle_from_file() {
        let temp_path = env::temp_dir().join("site_score_test_bundle.json");
        std::fs::write(&temp_path, r#"{"businessCounts": {"totalCount": 3}}"#).unwrap();

        let bundle = read_bundle(temp_path.to_str().unwrap()).unwrap();
        assert_eq!(bundle.value["businessCounts"]["totalCount"], 3);

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_read_bundle_missing_file() {
        let temp_path = env::temp_dir().join("site_score_test_missing_bundle.json");
        let _ = std::fs::remove_file(&temp_path);

        let err = read_bundle(temp_path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Failed to open bundle"));
    }

    #[test]
    fn test_read_bundle_invalid_json() {
        let temp_path = env::temp_dir().join("site_score_test_invalid_bundle.json");
        std::fs::write(&temp_path, "{ not json").unwrap();

        let err = read_bundle(temp_path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_non_object_json_still_loads() {
        let temp_path = env::temp_dir().join("site_score_test_array_bundle.json");
        std::fs::write(&temp_path, "[1, 2]").unwrap();

        let bundle = read_bundle(temp_path.to_str().unwrap()).unwrap();
        assert!(bundle.value.is_array());

        let _ = std::fs::remove_file(&temp_path);
    }
}
