//! Configuration: optional speed-docs.toml merged with command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use speed_docs_content::OUTPUT_DIR;
use speed_docs_dev::PackageManager;
use speed_docs_template::{DEFAULT_TEMPLATE_SUBDIR, DEFAULT_TEMPLATE_URL};

use crate::Cli;

/// Configuration file structure (speed-docs.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    template: TemplateConfig,
    #[serde(default)]
    cache: CacheConfig,
    #[serde(default)]
    tools: ToolsConfig,
    #[serde(default)]
    build: BuildSettings,
}

#[derive(Debug, Deserialize, Default)]
struct TemplateConfig {
    url: Option<String>,
    subdir: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct CacheConfig {
    dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ToolsConfig {
    #[serde(default = "default_package_manager")]
    package_manager: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            package_manager: default_package_manager(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BuildSettings {
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_package_manager() -> String {
    "npm".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(OUTPUT_DIR)
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

/// Default cache root: `~/.speed-docs/cache`.
pub fn default_cache_root() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".speed-docs").join("cache"))
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub origin: PathBuf,
    pub dev: bool,
    pub force: bool,
    pub template_url: String,
    pub template_subdir: String,
    pub cache_root: PathBuf,
    pub package_manager: PackageManager,
    pub output_dir: PathBuf,
}

impl Settings {
    /// Merge flags over file values over built-in defaults. Relative paths
    /// resolve against `cwd`.
    pub fn resolve(cli: &Cli, file: ConfigFile, cwd: &Path) -> Result<Self> {
        let cache_root = match cli.download_dir.clone().or(file.cache.dir) {
            Some(dir) => cwd.join(dir),
            None => default_cache_root()?,
        };

        Ok(Self {
            origin: cwd.join(&cli.origin),
            dev: cli.dev,
            force: cli.force,
            template_url: cli
                .template
                .clone()
                .or(file.template.url)
                .unwrap_or_else(|| DEFAULT_TEMPLATE_URL.to_string()),
            template_subdir: file
                .template
                .subdir
                .unwrap_or_else(|| DEFAULT_TEMPLATE_SUBDIR.to_string()),
            cache_root,
            package_manager: PackageManager::new(file.tools.package_manager),
            output_dir: cwd.join(file.build.output_dir),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn defaults_without_config_file() {
        let temp = tempdir().unwrap();
        let config = load_config(&temp.path().join("speed-docs.toml")).unwrap();

        let cli = Cli::parse_from(["speed-docs", "content", "--download-dir", "cache"]);
        let settings = Settings::resolve(&cli, config, temp.path()).unwrap();

        assert_eq!(settings.origin, temp.path().join("content"));
        assert_eq!(settings.cache_root, temp.path().join("cache"));
        assert_eq!(settings.template_url, DEFAULT_TEMPLATE_URL);
        assert_eq!(settings.template_subdir, DEFAULT_TEMPLATE_SUBDIR);
        assert_eq!(settings.package_manager.program(), "npm");
        assert_eq!(settings.output_dir, temp.path().join("docs-output"));
        assert!(!settings.dev);
        assert!(!settings.force);
    }

    #[test]
    fn flags_override_config_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("speed-docs.toml");
        fs::write(
            &path,
            r#"
[template]
url = "https://example.com/file.tar.gz"
subdir = "repo-main/site"

[cache]
dir = "from-file"

[tools]
package_manager = "pnpm"

[build]
output_dir = "public-site"
"#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();

        let cli = Cli::parse_from([
            "speed-docs",
            "/abs/content",
            "--dev",
            "--force",
            "--template",
            "https://example.com/flag.tar.gz",
        ]);
        let settings = Settings::resolve(&cli, config, temp.path()).unwrap();

        assert_eq!(settings.origin, PathBuf::from("/abs/content"));
        assert_eq!(settings.template_url, "https://example.com/flag.tar.gz");
        assert_eq!(settings.template_subdir, "repo-main/site");
        assert_eq!(settings.cache_root, temp.path().join("from-file"));
        assert_eq!(settings.package_manager.program(), "pnpm");
        assert_eq!(settings.output_dir, temp.path().join("public-site"));
        assert!(settings.dev);
        assert!(settings.force);
    }

    #[test]
    fn rejects_malformed_config_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("speed-docs.toml");
        fs::write(&path, "[template\nurl = ").unwrap();

        assert!(load_config(&path).is_err());
    }
}
