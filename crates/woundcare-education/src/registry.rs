//! Locale bundle registry.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::error::LocaleError;

/// Bundles compiled into the binary.
const EMBEDDED: [(&str, &str); 2] = [
    ("en", include_str!("../locales/en.json")),
    ("ko", include_str!("../locales/ko.json")),
];

/// Validated catalogs keyed by locale tag.
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    default_locale: String,
    catalogs: BTreeMap<String, Arc<Catalog>>,
}

impl LocaleRegistry {
    /// Builds a registry from catalogs.
    ///
    /// # Errors
    ///
    /// Returns `LocaleError::UnknownDefault` if `default_locale` has no catalog.
    pub fn new(
        default_locale: impl Into<String>,
        catalogs: impl IntoIterator<Item = Catalog>,
    ) -> Result<Self, LocaleError> {
        let default_locale = normalize(&default_locale.into());
        let catalogs: BTreeMap<_, _> = catalogs
            .into_iter()
            .map(|c| (normalize(&c.locale), Arc::new(c)))
            .collect();
        if !catalogs.contains_key(&default_locale) {
            return Err(LocaleError::UnknownDefault(default_locale));
        }
        Ok(Self {
            default_locale,
            catalogs,
        })
    }

    /// Loads the embedded bundles.
    pub fn embedded(default_locale: &str) -> Result<Self, LocaleError> {
        let catalogs = EMBEDDED
            .iter()
            .map(|(locale, json)| Catalog::from_json(locale, json))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(default_locale, catalogs)
    }

    /// Loads the embedded bundles, then every `<locale>.json` in `dir`.
    /// Files in `dir` replace embedded bundles with the same tag.
    pub fn with_directory(default_locale: &str, dir: &Path) -> Result<Self, LocaleError> {
        let mut catalogs: BTreeMap<String, Catalog> = EMBEDDED
            .iter()
            .map(|(locale, json)| -> Result<(String, Catalog), LocaleError> {
                Ok((normalize(locale), Catalog::from_json(locale, json)?))
            })
            .collect::<Result<_, _>>()?;

        let entries = std::fs::read_dir(dir).map_err(|source| LocaleError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let path = entry
                .map_err(|source| LocaleError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(locale) = path.file_stem().and_then(|s| s.to_str()).map(normalize) else {
                continue;
            };
            let json = std::fs::read_to_string(&path).map_err(|source| LocaleError::Io {
                path: path.clone(),
                source,
            })?;
            let catalog = Catalog::from_json(&locale, &json)?;
            tracing::info!(locale = %locale, path = %path.display(), "Loaded locale bundle");
            catalogs.insert(locale, catalog);
        }

        Self::new(default_locale, catalogs.into_values())
    }

    /// Default locale tag.
    #[must_use]
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Available locale tags, sorted.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.catalogs.keys().map(String::as_str)
    }

    /// Exact lookup.
    #[must_use]
    pub fn get(&self, locale: &str) -> Option<Arc<Catalog>> {
        self.catalogs.get(&normalize(locale)).cloned()
    }

    /// Resolves a requested locale: exact tag, then its primary subtag
    /// (`ko-KR` → `ko`), then the default.
    #[must_use]
    pub fn resolve(&self, requested: Option<&str>) -> Arc<Catalog> {
        requested
            .and_then(|tag| {
                self.get(tag).or_else(|| {
                    let primary = tag.split(['-', '_']).next().unwrap_or(tag);
                    self.get(primary)
                })
            })
            .unwrap_or_else(|| Arc::clone(&self.catalogs[&self.default_locale]))
    }
}

fn normalize(tag: &str) -> String {
    tag.trim().to_ascii_lowercase().replace('_', "-")
}
