// Catalog module: validated profiles and the swappable read-only snapshot.

pub mod ini_parser;

use crate::model::{CatalogError, ControllerSettings, Profile, ProfileEntry, MAX_SPECIFICITY};
use crate::normalizer::normalize;
use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock};

impl Profile {
    /// Builds a profile, normalizing its patterns once.
    /// Patterns that normalize to nothing and duplicates are dropped.
    pub fn new<'a>(
        name: &str,
        patterns: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, CatalogError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyName);
        }

        let mut normalized: Vec<String> = Vec::new();
        for pattern in patterns {
            let n = normalize(pattern);
            if !n.is_empty() && !normalized.contains(&n) {
                normalized.push(n);
            }
        }
        if normalized.is_empty() {
            return Err(CatalogError::NoPatterns(name.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            patterns: normalized,
            controllers: Vec::new(),
            specificity: 0,
        })
    }

    pub fn with_controllers(mut self, controllers: Vec<ControllerSettings>) -> Self {
        self.controllers = controllers;
        self
    }

    pub fn with_specificity(mut self, specificity: u8) -> Self {
        self.specificity = specificity.min(MAX_SPECIFICITY);
        self
    }
}

impl TryFrom<ProfileEntry> for Profile {
    type Error = CatalogError;

    fn try_from(entry: ProfileEntry) -> Result<Self, Self::Error> {
        let profile = Profile::new(&entry.name, entry.patterns.iter().map(String::as_str))?;
        Ok(profile
            .with_controllers(entry.controllers)
            .with_specificity(entry.specificity))
    }
}

/// Ordered collection of profiles. Order only matters for tie-breaks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    profiles: Vec<Profile>,
}

impl Catalog {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self { profiles }
    }

    /// Decodes a JSON array of `{ name, patterns, controllers }` entries.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let entries: Vec<ProfileEntry> = serde_json::from_str(text)?;
        let profiles = entries
            .into_iter()
            .map(Profile::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(profiles))
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// First profile with exactly this canonical name.
    pub fn find(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }
}

/// A catalog together with where and when it was loaded.
#[derive(Debug)]
pub struct CatalogSnapshot {
    pub catalog: Catalog,
    pub source: String,
    pub loaded_at: DateTime<Utc>,
}

/// Holds the current snapshot. Readers clone the `Arc` and keep using it
/// while a reload swaps in a new one.
#[derive(Debug)]
pub struct CatalogStore {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl CatalogStore {
    pub fn new(catalog: Catalog, source: impl Into<String>) -> Self {
        Self {
            current: RwLock::new(Arc::new(CatalogSnapshot {
                catalog,
                source: source.into(),
                loaded_at: Utc::now(),
            })),
        }
    }

    pub fn empty() -> Self {
        Self::new(Catalog::default(), "<empty>")
    }

    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        // the guarded value is a single Arc, so a poisoned lock still holds a whole snapshot
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the whole snapshot and returns the previous one.
    pub fn replace(&self, catalog: Catalog, source: impl Into<String>) -> Arc<CatalogSnapshot> {
        let next = Arc::new(CatalogSnapshot {
            catalog,
            source: source.into(),
            loaded_at: Utc::now(),
        });
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::resolve;
    use crate::model::SettingValue;

    #[test]
    fn profile_patterns_are_normalized_once() {
        let p = Profile::new("  Xbox360 ", ["Xbox 360 Controller", "XBOX-360 controller", "--"]).unwrap();
        assert_eq!(p.name, "Xbox360");
        assert_eq!(p.patterns, vec!["xbox 360 controller".to_string()]);
        assert!(p.controllers.is_empty());
    }

    #[test]
    fn profile_requires_name_and_patterns() {
        assert!(matches!(Profile::new("  ", ["pad"]), Err(CatalogError::EmptyName)));
        assert!(matches!(
            Profile::new("Pad", std::iter::empty::<&str>()),
            Err(CatalogError::NoPatterns(name)) if name == "Pad"
        ));
        assert!(matches!(Profile::new("Pad", ["™", " . "]), Err(CatalogError::NoPatterns(_))));
    }

    #[test]
    fn json_catalog_keeps_order_and_settings() {
        let text = r#"[
            { "name": "Xbox360", "patterns": ["Xbox 360 Controller"],
              "controllers": [{ "plugged": true, "device": 1, "A Button": "button(0)" }] },
            { "name": "XboxOne", "patterns": ["Xbox One Controller", "Xbox Wireless Controller"],
              "specificity": 9 }
        ]"#;
        let catalog = Catalog::from_json(text).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.profiles()[0].name, "Xbox360");
        let xbox360 = catalog.find("Xbox360").unwrap();
        let slot = &xbox360.controllers[0];
        assert_eq!(slot["A Button"], SettingValue::Text("button(0)".into()));
        assert_eq!(slot["plugged"], SettingValue::Bool(true));
        assert_eq!(slot["device"], SettingValue::Int(1));
        assert_eq!(xbox360.specificity, 0);
        let xbox_one = catalog.find("XboxOne").unwrap();
        assert_eq!(xbox_one.patterns.len(), 2);
        assert_eq!(xbox_one.specificity, MAX_SPECIFICITY);
        assert!(catalog.find("xbox360").is_none());
    }

    #[test]
    fn json_catalog_rejects_invalid_profiles() {
        assert!(matches!(Catalog::from_json("{}"), Err(CatalogError::Json(_))));
        let text = r#"[{ "name": "", "patterns": ["pad"] }]"#;
        assert!(matches!(Catalog::from_json(text), Err(CatalogError::EmptyName)));
    }

    #[test]
    fn replace_swaps_whole_snapshot() {
        let store = CatalogStore::empty();
        let before = store.snapshot();
        assert!(before.catalog.is_empty());

        let catalog = Catalog::new(vec![Profile::new("Xbox360", ["xbox 360 controller"]).unwrap()]);
        let previous = store.replace(catalog, "test");
        assert!(Arc::ptr_eq(&before, &previous));

        // a query that grabbed the old snapshot keeps seeing it in full
        assert!(resolve("xbox 360 controller", &before.catalog, 0.0).name().is_empty());
        let after = store.snapshot();
        assert_eq!(after.source, "test");
        assert_eq!(resolve("xbox 360 controller", &after.catalog, 0.0).name(), "Xbox360");
    }

    #[test]
    fn concurrent_readers_see_complete_catalogs() {
        let store = Arc::new(CatalogStore::empty());
        let small = Catalog::new(vec![Profile::new("A", ["alpha"]).unwrap()]);
        let large = Catalog::new(vec![
            Profile::new("A", ["alpha"]).unwrap(),
            Profile::new("B", ["beta"]).unwrap(),
            Profile::new("C", ["gamma"]).unwrap(),
        ]);

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let len = store.snapshot().catalog.len();
                        assert!(len == 0 || len == 1 || len == 3, "partial catalog of {len}");
                    }
                })
            })
            .collect();

        for i in 0..200 {
            let next = if i % 2 == 0 { small.clone() } else { large.clone() };
            store.replace(next, format!("round {i}"));
        }
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
