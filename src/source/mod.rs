// Source module: where catalogs come from and how a fresh one gets swapped in.

pub mod fetcher;
pub mod traits;

pub use fetcher::{FileSource, HttpSource};
pub use traits::CatalogSource;

use crate::catalog::ini_parser::{IniParser, Parser};
use crate::catalog::{Catalog, CatalogStore};
use crate::config::{AppConfig, CatalogFormat, Platform};
use crate::model::SourceError;
use std::sync::Arc;
use tracing::{info, warn};

/// Picks the source named by the configuration.
pub fn build_source(config: &AppConfig) -> Result<Box<dyn CatalogSource>, SourceError> {
    match (&config.catalog_path, &config.catalog_url) {
        (Some(path), _) => Ok(Box::new(FileSource::new(path))),
        (None, Some(url)) => Ok(Box::new(HttpSource::new(url.clone())?)),
        (None, None) => Err(SourceError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no catalog location configured",
        ))),
    }
}

pub fn parse_catalog(
    text: &str,
    format: CatalogFormat,
    platform: Platform,
) -> Result<Catalog, SourceError> {
    match format {
        CatalogFormat::Ini => Ok(IniParser::new(platform).parse(text)),
        CatalogFormat::Json => Ok(Catalog::from_json(text)?),
    }
}

/// Loads, parses and installs a new catalog. On failure the store keeps
/// serving the previous snapshot.
pub async fn reload(
    source: &dyn CatalogSource,
    store: &Arc<CatalogStore>,
    format: CatalogFormat,
    platform: Platform,
) -> Result<usize, SourceError> {
    let origin = source.describe();
    let result = match source.load().await {
        Ok(text) => parse_catalog(&text, format, platform),
        Err(e) => Err(e),
    };

    match result {
        Ok(catalog) => {
            let count = catalog.len();
            if catalog.is_empty() {
                warn!("Catalog from {} contains no profiles", origin);
            }
            store.replace(catalog, origin.clone());
            info!("Loaded {} profiles from {}", count, origin);
            Ok(count)
        }
        Err(e) => {
            warn!("Catalog reload from {} failed: {}", origin, e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::matcher::resolve;
    use crate::model::CatalogError;
    use std::io::Write;

    struct StaticSource(&'static str);

    #[async_trait::async_trait]
    impl CatalogSource for StaticSource {
        async fn load(&self) -> Result<String, SourceError> {
            Ok(self.0.to_string())
        }

        fn describe(&self) -> String {
            "static".into()
        }
    }

    struct BrokenSource;

    #[async_trait::async_trait]
    impl CatalogSource for BrokenSource {
        async fn load(&self) -> Result<String, SourceError> {
            Err(SourceError::InvalidResponse(503))
        }

        fn describe(&self) -> String {
            "broken".into()
        }
    }

    #[test]
    fn parses_both_formats() {
        let ini = parse_catalog("[Pad]\nplugged = True\n", CatalogFormat::Ini, Platform::Linux).unwrap();
        assert_eq!(ini.profiles()[0].name, "Pad");

        let json = parse_catalog(
            r#"[{ "name": "Pad", "patterns": ["usb pad"] }]"#,
            CatalogFormat::Json,
            Platform::Linux,
        )
        .unwrap();
        assert_eq!(json.profiles()[0].patterns, vec!["usb pad"]);

        assert!(matches!(
            parse_catalog("[Pad]", CatalogFormat::Json, Platform::Linux),
            Err(SourceError::Catalog(CatalogError::Json(_)))
        ));
    }

    #[tokio::test]
    async fn reload_replaces_snapshot() {
        let store = Arc::new(CatalogStore::empty());
        let source = StaticSource("[Xbox 360 Controller]\nplugged = True\n[Xbox One Controller]\nplugged = True\n");

        let count = reload(&source, &store, CatalogFormat::Ini, Platform::Linux).await.unwrap();
        assert_eq!(count, 2);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.source, "static");
        assert_eq!(resolve("XBOX ONE S CONTROLLER", &snapshot.catalog, 0.0).name(), "Xbox One Controller");
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_catalog() {
        let store = Arc::new(CatalogStore::empty());
        reload(&StaticSource("[Pad]\nplugged = True\n"), &store, CatalogFormat::Ini, Platform::Linux)
            .await
            .unwrap();

        let err = reload(&BrokenSource, &store, CatalogFormat::Ini, Platform::Linux).await;
        assert!(matches!(err, Err(SourceError::InvalidResponse(503))));

        let err = reload(&StaticSource("not json"), &store, CatalogFormat::Json, Platform::Linux).await;
        assert!(err.is_err());

        let snapshot = store.snapshot();
        assert_eq!(snapshot.catalog.len(), 1);
        assert_eq!(snapshot.catalog.profiles()[0].name, "Pad");
    }

    #[tokio::test]
    async fn configured_file_source_round_trip() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{ "name": "Xbox360", "patterns": ["xbox 360 controller"] }}]"#).unwrap();
        let config = parse_config(&format!(
            r#"{{ "catalog_path": {} }}"#,
            serde_json::to_string(file.path().to_str().unwrap()).unwrap()
        ))
        .unwrap();

        let source = build_source(&config).unwrap();
        let store = Arc::new(CatalogStore::empty());
        reload(source.as_ref(), &store, config.format(), config.platform).await.unwrap();
        assert_eq!(resolve("Microsoft X-Box 360 pad", &store.snapshot().catalog, 0.0).name(), "Xbox360");
    }
}
