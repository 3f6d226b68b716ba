use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Named WHERE clauses for layers, loaded from YAML.
///
/// ```yaml
/// layers:
///   large_cities:
///     where: "pop > 100000 AND prov IN ('ON', 'QC')"
///   parcels:
///     where: "zone LIKE 'R%'"
///     attributes_as_property: true
/// ```
#[derive(Debug, Deserialize, Serialize)]
pub struct FiltersConfig {
    pub layers: HashMap<String, LayerFilter>,
}

impl FiltersConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()
            .with_context(|| format!("Config: Failed to read {}", path.display()))?;
        Ok(settings.try_deserialize()?)
    }

    pub fn layer(&self, name: &str) -> anyhow::Result<&LayerFilter> {
        self.layers.get(name).ok_or_else(|| {
            let mut known: Vec<_> = self.layers.keys().map(String::as_str).collect();
            known.sort_unstable();
            anyhow!(
                "Config: No layer named '{}' (known: {})",
                name,
                known.join(", ")
            )
        })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LayerFilter {
    /// Empty shows every feature.
    #[serde(rename = "where", default)]
    pub where_clause: String,
    /// Read fields from each record's `attributes` object.
    #[serde(default)]
    pub attributes_as_property: bool,
}
