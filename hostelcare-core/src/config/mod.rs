//! Layered settings loading shared by hostelcare crates.
//!
//! Sources, lowest precedence first: `<crate>/config/base.yaml`, then
//! `APP_`-prefixed environment variables using `__` as the nesting separator
//! (`APP_API__BASE_URL=https://...`). A `.env` file is loaded beforehand.

use crate::error::CoreError;
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "APP";

/// Locate `config/` for `crate_dir`, whether we run from the workspace root
/// or from inside the crate directory.
pub fn configuration_directory(crate_dir: &str) -> Result<PathBuf, CoreError> {
    let base_path = std::env::current_dir()?;

    let directory = if base_path.ends_with(crate_dir) {
        base_path.join("config")
    } else {
        base_path.join(crate_dir).join("config")
    };

    Ok(directory)
}

/// Load settings for `crate_dir` from its `config/base.yaml` plus environment.
pub fn load_settings<T: DeserializeOwned>(crate_dir: &str) -> Result<T, CoreError> {
    dotenvy::dotenv().ok();

    let directory = configuration_directory(crate_dir)?;
    load_settings_from(&directory, &[])
}

/// Load settings from an explicit directory, applying `overrides` last.
///
/// Overrides use the dotted key form (`api.timeout_secs`).
pub fn load_settings_from<T: DeserializeOwned>(
    directory: &Path,
    overrides: &[(&str, &str)],
) -> Result<T, CoreError> {
    let mut builder = Config::builder()
        .add_source(File::from(directory.join("base.yaml")).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

    for (key, value) in overrides {
        builder = builder.set_override(*key, *value)?;
    }

    let settings = builder.build()?;
    Ok(settings.try_deserialize::<T>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        name: String,
        nested: Nested,
    }

    #[derive(Debug, Deserialize)]
    struct Nested {
        port: u16,
    }

    #[test]
    fn loads_yaml_and_applies_overrides() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("base.yaml"),
            "name: hostel\nnested:\n  port: 8000\n",
        )
        .unwrap();

        let sample: Sample = load_settings_from(dir.path(), &[("nested.port", "9000")]).unwrap();
        assert_eq!(sample.name, "hostel");
        assert_eq!(sample.nested.port, 9000);
    }

    #[test]
    fn missing_base_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<Sample, _> = load_settings_from(dir.path(), &[]);
        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
