use std::path::PathBuf;

use anyhow::{bail, Context};
use wxr_core::ImportDefaults;

/// Default `BLOG_ID` when unset.
const DEFAULT_BLOG_ID: i64 = 22;

/// Default `BLOG_SLUG` when unset.
const DEFAULT_BLOG_SLUG: &str = "multi-american";

/// Default `AUTHOR_ID` when unset.
const DEFAULT_AUTHOR_ID: i64 = 1;

/// Default pool size.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Importer configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ImporterConfig {
    /// Path of the WXR export to import.
    pub export_path: PathBuf,
    /// Postgres URL; `None` only for dry runs.
    pub database_url: Option<String>,
    /// Constants seeded into every imported blog entry.
    pub defaults: ImportDefaults,
    /// Import into an in-memory store instead of the database.
    pub dry_run: bool,
    /// Print the run report as JSON on stdout.
    pub report_json: bool,
    pub max_connections: u32,
    pub log_format: LogFormat,
}

impl ImporterConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var              | Default            |
    /// |----------------------|--------------------|
    /// | `EXPORT_PATH`        | required           |
    /// | `DATABASE_URL`       | required unless dry run |
    /// | `BLOG_ID`            | `22`               |
    /// | `BLOG_SLUG`          | `multi-american`   |
    /// | `AUTHOR_ID`          | `1`                |
    /// | `IMPORT_DRY_RUN`     | `false`            |
    /// | `REPORT_JSON`        | `false`            |
    /// | `DB_MAX_CONNECTIONS` | `5`                |
    /// | `LOG_FORMAT`         | `text`             |
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let export_path = var("EXPORT_PATH")
            .map(PathBuf::from)
            .context("EXPORT_PATH must be set")?;

        let dry_run = parse_flag("IMPORT_DRY_RUN", var("IMPORT_DRY_RUN"))?;
        let database_url = var("DATABASE_URL");
        if database_url.is_none() && !dry_run {
            bail!("DATABASE_URL must be set unless IMPORT_DRY_RUN is enabled");
        }

        let defaults = ImportDefaults {
            blog_id: parse_or("BLOG_ID", var("BLOG_ID"), DEFAULT_BLOG_ID)?,
            blog_slug: var("BLOG_SLUG").unwrap_or_else(|| DEFAULT_BLOG_SLUG.to_string()),
            author_id: parse_or("AUTHOR_ID", var("AUTHOR_ID"), DEFAULT_AUTHOR_ID)?,
        };
        defaults.check()?;

        let log_format = match var("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("LOG_FORMAT must be 'text' or 'json', got '{other}'"),
        };

        Ok(Self {
            export_path,
            database_url,
            defaults,
            dry_run,
            report_json: parse_flag("REPORT_JSON", var("REPORT_JSON"))?,
            max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                var("DB_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            )?,
            log_format,
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid number, got '{value}'")),
        None => Ok(default),
    }
}

fn parse_flag(key: &str, raw: Option<String>) -> anyhow::Result<bool> {
    match raw.as_deref().map(str::trim) {
        None => Ok(false),
        Some("1" | "true" | "yes") => Ok(true),
        Some("0" | "false" | "no") => Ok(false),
        Some(other) => bail!("{key} must be a boolean, got '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<ImporterConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ImporterConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("EXPORT_PATH", "export.xml"), ("DATABASE_URL", "postgres://x")]).unwrap();
        assert_eq!(config.export_path, PathBuf::from("export.xml"));
        assert_eq!(config.defaults.blog_id, 22);
        assert_eq!(config.defaults.blog_slug, "multi-american");
        assert_eq!(config.max_connections, 5);
        assert!(!config.dry_run);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn export_path_is_required() {
        assert!(load(&[("DATABASE_URL", "postgres://x")]).is_err());
    }

    #[test]
    fn database_url_optional_for_dry_run() {
        assert!(load(&[("EXPORT_PATH", "e.xml")]).is_err());
        let config = load(&[("EXPORT_PATH", "e.xml"), ("IMPORT_DRY_RUN", "true")]).unwrap();
        assert!(config.dry_run);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let result = load(&[
            ("EXPORT_PATH", "e.xml"),
            ("IMPORT_DRY_RUN", "1"),
            ("BLOG_ID", "abc"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn non_positive_ids_fail_validation() {
        let result = load(&[
            ("EXPORT_PATH", "e.xml"),
            ("IMPORT_DRY_RUN", "1"),
            ("AUTHOR_ID", "0"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn overrides_and_json() {
        let config = load(&[
            ("EXPORT_PATH", "e.xml"),
            ("IMPORT_DRY_RUN", "yes"),
            ("BLOG_ID", "4"),
            ("BLOG_SLUG", "news"),
            ("REPORT_JSON", "1"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.defaults.blog_id, 4);
        assert_eq!(config.defaults.blog_slug, "news");
        assert!(config.report_json);
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
