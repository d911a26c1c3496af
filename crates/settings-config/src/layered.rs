//! Layered configurer built on the `config` crate.
//!
//! Sources are merged in the order they were added; later sources override
//! earlier ones key by key. The merged result is an immutable snapshot held
//! in an [`ArcSwap`], so lookups never block and [`LayeredConfigurer::reload`]
//! replaces the snapshot atomically.

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use config::{Config, Environment, File, FileFormat};
use tracing::{debug, info, warn};

use crate::{ConfigError, Configurer, Result};

#[derive(Debug, Clone)]
enum Source {
    File { path: PathBuf, required: bool },
    Inline { content: String, format: FileFormat },
    Env { prefix: String, separator: String },
}

/// Builder for [`LayeredConfigurer`].
#[derive(Debug, Default)]
pub struct LayeredConfigurerBuilder {
    sources: Vec<Source>,
}

impl LayeredConfigurerBuilder {
    /// Add a configuration file; its format is inferred from the extension.
    /// A missing file is skipped.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(Source::File {
            path: path.into(),
            required: false,
        });
        self
    }

    /// Add a configuration file that must exist.
    pub fn with_required_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(Source::File {
            path: path.into(),
            required: true,
        });
        self
    }

    /// Add an inline document in the given format.
    pub fn with_str(mut self, content: impl Into<String>, format: FileFormat) -> Self {
        self.sources.push(Source::Inline {
            content: content.into(),
            format,
        });
        self
    }

    /// Add an inline TOML document.
    pub fn with_toml_str(self, content: impl Into<String>) -> Self {
        self.with_str(content, FileFormat::Toml)
    }

    /// Add a JSON value as a source. It must be an object.
    pub fn with_json(self, value: &serde_json::Value) -> Self {
        self.with_str(value.to_string(), FileFormat::Json)
    }

    /// Add environment variables, e.g. `SETTINGS__BILLING__PLAN=pro` for
    /// prefix `SETTINGS`. Values are parsed into numbers and booleans when
    /// possible.
    pub fn with_env(mut self, prefix: impl Into<String>) -> Self {
        self.sources.push(Source::Env {
            prefix: prefix.into(),
            separator: "__".to_string(),
        });
        self
    }

    /// Merge all sources into a configurer.
    pub fn build(self) -> Result<LayeredConfigurer> {
        let snapshot = assemble(&self.sources)?;
        debug!(sources = self.sources.len(), "Configurer built");
        Ok(LayeredConfigurer {
            sources: self.sources,
            snapshot: ArcSwap::from_pointee(snapshot),
        })
    }
}

fn assemble(sources: &[Source]) -> Result<Config> {
    let mut builder = Config::builder();
    for source in sources {
        builder = match source {
            Source::File { path, required } => {
                builder.add_source(File::from(path.as_path()).required(*required))
            }
            Source::Inline { content, format } => {
                builder.add_source(File::from_str(content, *format))
            }
            Source::Env { prefix, separator } => builder.add_source(
                Environment::with_prefix(prefix)
                    .separator(separator)
                    .try_parsing(true),
            ),
        };
    }
    Ok(builder.build()?)
}

/// A [`Configurer`] merging files, inline documents and environment variables.
pub struct LayeredConfigurer {
    sources: Vec<Source>,
    snapshot: ArcSwap<Config>,
}

impl LayeredConfigurer {
    /// Create a new builder.
    pub fn builder() -> LayeredConfigurerBuilder {
        LayeredConfigurerBuilder::default()
    }

    /// Configurer over a single JSON object.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        Self::builder().with_json(value).build()
    }

    /// Re-read every source and swap in the new snapshot.
    ///
    /// # Errors
    ///
    /// If any source fails, the previous snapshot stays in place and the
    /// error is returned.
    pub fn reload(&self) -> Result<()> {
        match assemble(&self.sources) {
            Ok(config) => {
                self.snapshot.store(Arc::new(config));
                info!("Configuration reloaded");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Configuration reload failed, keeping previous snapshot");
                Err(e)
            }
        }
    }
}

impl Configurer for LayeredConfigurer {
    fn has(&self, name: &str) -> bool {
        !name.is_empty() && self.snapshot.load().get::<config::Value>(name).is_ok()
    }

    fn lookup(&self, name: &str) -> Result<serde_json::Value> {
        if name.is_empty() {
            return Err(ConfigError::not_found(name));
        }
        self.snapshot
            .load()
            .get::<serde_json::Value>(name)
            .map_err(|e| match e {
                config::ConfigError::NotFound(_) => ConfigError::not_found(name),
                other => ConfigError::Source(other),
            })
    }
}

impl std::fmt::Debug for LayeredConfigurer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredConfigurer")
            .field("sources", &self.sources.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigurerExt;
    use serde::Deserialize;
    use serde_json::json;
    use tempfile::TempDir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Billing {
        plan: String,
        seats: u32,
    }

    #[test]
    fn test_has_and_unmarshal() {
        let configurer = LayeredConfigurer::from_json(&json!({
            "feature-x": "tenant-42",
            "billing": { "plan": "pro", "seats": 5 }
        }))
        .unwrap();

        assert!(configurer.has("feature-x"));
        assert!(configurer.has("billing"));
        assert!(configurer.has("billing.plan"));
        assert!(!configurer.has("missing"));
        assert!(!configurer.has(""));

        let tenant: String = configurer.unmarshal_key("feature-x").unwrap();
        assert_eq!(tenant, "tenant-42");

        let billing: Billing = configurer.unmarshal_key("billing").unwrap();
        assert_eq!(
            billing,
            Billing {
                plan: "pro".into(),
                seats: 5
            }
        );
    }

    #[test]
    fn test_missing_key_and_bad_shape() {
        let configurer = LayeredConfigurer::from_json(&json!({ "billing": "not a table" })).unwrap();

        let err = configurer.unmarshal_key::<String>("missing").unwrap_err();
        assert!(err.is_not_found());

        let err = configurer.unmarshal_key::<Billing>("billing").unwrap_err();
        assert!(matches!(err, ConfigError::Decode { .. }));
    }

    #[test]
    fn test_later_sources_override() {
        let configurer = LayeredConfigurer::builder()
            .with_toml_str(
                r#"
[billing]
plan = "free"
seats = 1
"#,
            )
            .with_json(&json!({ "billing": { "plan": "pro" } }))
            .build()
            .unwrap();

        let billing: Billing = configurer.unmarshal_key("billing").unwrap();
        assert_eq!(billing.plan, "pro");
        assert_eq!(billing.seats, 1);
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        std::fs::write(
            &path,
            r#"
[billing]
plan = "free"
seats = 1
"#,
        )
        .unwrap();

        unsafe {
            std::env::set_var("SETTINGS_LAYERED_TEST__BILLING__SEATS", "9");
        }
        let configurer = LayeredConfigurer::builder()
            .with_file(&path)
            .with_env("SETTINGS_LAYERED_TEST")
            .build()
            .unwrap();
        unsafe {
            std::env::remove_var("SETTINGS_LAYERED_TEST__BILLING__SEATS");
        }

        let billing: Billing = configurer.unmarshal_key("billing").unwrap();
        assert_eq!(billing.plan, "free");
        assert_eq!(billing.seats, 9);
    }

    #[test]
    fn test_missing_optional_file_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let configurer = LayeredConfigurer::builder()
            .with_file(temp_dir.path().join("absent.toml"))
            .build()
            .unwrap();
        assert!(!configurer.has("billing"));

        let err = LayeredConfigurer::builder()
            .with_required_file(temp_dir.path().join("absent.toml"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Source(_)));
    }

    #[test]
    fn test_reload_swaps_snapshot_and_keeps_it_on_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        std::fs::write(&path, "feature-x = \"tenant-1\"\n").unwrap();

        let configurer = LayeredConfigurer::builder()
            .with_required_file(&path)
            .build()
            .unwrap();
        assert_eq!(
            configurer.unmarshal_key::<String>("feature-x").unwrap(),
            "tenant-1"
        );

        std::fs::write(&path, "feature-x = \"tenant-2\"\n").unwrap();
        configurer.reload().unwrap();
        assert_eq!(
            configurer.unmarshal_key::<String>("feature-x").unwrap(),
            "tenant-2"
        );

        std::fs::write(&path, "feature-x = [unterminated\n").unwrap();
        assert!(configurer.reload().is_err());
        assert_eq!(
            configurer.unmarshal_key::<String>("feature-x").unwrap(),
            "tenant-2"
        );
    }
}
