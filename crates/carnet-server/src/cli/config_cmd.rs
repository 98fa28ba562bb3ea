use crate::cli::ConfigCommands;
use crate::config::CarnetConfig;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

pub fn run(cmd: ConfigCommands, config_path: &Path, data_dir: Option<PathBuf>) -> Result<()> {
    match cmd {
        ConfigCommands::Validate => {
            let config = checked(config_path, data_dir)?;
            println!("{} is valid.", config_path.display());
            println!("  database: {}", config.db_path().display());
            println!("  dangling links on delete: {:?}", config.links.dangling_policy);
            Ok(())
        }
        ConfigCommands::Show => {
            print!("{}", effective_toml(config_path, data_dir)?);
            Ok(())
        }
    }
}

/// Load the file strictly and fail with every problem it has.
fn checked(config_path: &Path, data_dir: Option<PathBuf>) -> Result<CarnetConfig> {
    let config = CarnetConfig::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?
        .with_data_dir(data_dir);

    let errors = config.validate();
    if !errors.is_empty() {
        bail!(
            "{} has {} problem(s):\n  - {}",
            config_path.display(),
            errors.len(),
            errors.join("\n  - ")
        );
    }
    Ok(config)
}

/// The configuration `serve` would run with, as TOML.
fn effective_toml(config_path: &Path, data_dir: Option<PathBuf>) -> Result<String> {
    let source = if config_path.exists() {
        config_path.display().to_string()
    } else {
        "built-in defaults".to_string()
    };
    let config = CarnetConfig::load_or_default(config_path).with_data_dir(data_dir);
    let body = toml::to_string_pretty(&config).context("Failed to serialize config")?;
    Ok(format!("# effective configuration from {}\n{}", source, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_validate_reports_every_problem() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("carnet.toml");
        std::fs::write(
            &path,
            r##"
            [server]
            http_addr = "nowhere"

            [graph]
            colors = { lumiere = "#fff" }
            "##,
        )
        .unwrap();

        let err = checked(&path, None).unwrap_err().to_string();
        assert!(err.contains("2 problem(s)"), "{}", err);
        assert!(err.contains("http_addr 'nowhere'"));
        assert!(err.contains("unknown entry type 'lumiere'"));
    }

    #[test]
    fn test_validate_requires_the_file() {
        let dir = tempdir().unwrap();
        let err = checked(&dir.path().join("absent.toml"), None).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load"));
    }

    #[test]
    fn test_show_applies_data_dir_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("carnet.toml");
        std::fs::write(&path, "[links]\ndangling_policy = \"cascade\"\n").unwrap();

        let shown = effective_toml(&path, Some(PathBuf::from("/srv/carnet"))).unwrap();
        assert!(shown.starts_with(&format!("# effective configuration from {}", path.display())));
        assert!(shown.contains("data_dir = \"/srv/carnet\""));
        assert!(shown.contains("dangling_policy = \"cascade\""));

        let defaults = effective_toml(&dir.path().join("absent.toml"), None).unwrap();
        assert!(defaults.contains("built-in defaults"));
        assert!(defaults.contains("data_dir = \"./data\""));
    }
}
