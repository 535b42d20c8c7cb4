use std::{
    collections::{BTreeMap, HashMap},
    path::PathBuf,
    sync::Arc,
};

use anyhow::Context as _;

use crate::animation::track::{Params, TimeOffset};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Descriptor published by an animation plugin.
pub struct PluginManifest {
    pub name: String,
    pub version: String,
    /// Default offset applied to the word timing when a track is added.
    #[serde(default, alias = "timeOffset", skip_serializing_if = "Option::is_none")]
    pub time_offset: Option<TimeOffset>,
    /// Parameter schema keyed by parameter name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<BTreeMap<String, SchemaProperty>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// One parameter of a plugin schema. Only `default` is interpreted here.
pub struct SchemaProperty {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Everything else the plugin declares (labels, bounds, ui hints).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PluginManifest {
    /// Copy each schema property's `default` into a parameter map.
    pub fn default_params(&self) -> Params {
        let mut out = Params::new();
        if let Some(schema) = &self.schema {
            for (key, prop) in schema {
                if let Some(v) = &prop.default {
                    out.insert(key.clone(), v.clone());
                }
            }
        }
        out
    }

    /// Declared time offset, or `[0, 0]`.
    pub fn time_offset_or_zero(&self) -> TimeOffset {
        self.time_offset.clone().unwrap_or_default()
    }
}

/// Where manifests come from. Fetching may fail; the loader turns failures into misses.
pub trait ManifestSource {
    fn fetch(&self, plugin_key: &str) -> anyhow::Result<PluginManifest>;
}

impl<S: ManifestSource + ?Sized> ManifestSource for Box<S> {
    fn fetch(&self, plugin_key: &str) -> anyhow::Result<PluginManifest> {
        (**self).fetch(plugin_key)
    }
}

/// Manifests registered up front, keyed by plugin key.
#[derive(Clone, Debug, Default)]
pub struct InMemoryManifestSource {
    manifests: HashMap<String, PluginManifest>,
}

impl InMemoryManifestSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, plugin_key: impl Into<String>, manifest: PluginManifest) -> Self {
        self.insert(plugin_key, manifest);
        self
    }

    pub fn insert(&mut self, plugin_key: impl Into<String>, manifest: PluginManifest) {
        self.manifests.insert(plugin_key.into(), manifest);
    }
}

impl ManifestSource for InMemoryManifestSource {
    fn fetch(&self, plugin_key: &str) -> anyhow::Result<PluginManifest> {
        self.manifests
            .get(plugin_key)
            .cloned()
            .with_context(|| format!("no manifest registered for plugin '{plugin_key}'"))
    }
}

/// Reads `<root>/<plugin_key>/manifest.json`.
#[derive(Clone, Debug)]
pub struct DirManifestSource {
    root: PathBuf,
}

impl DirManifestSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ManifestSource for DirManifestSource {
    fn fetch(&self, plugin_key: &str) -> anyhow::Result<PluginManifest> {
        if plugin_key.is_empty() || plugin_key.contains(['/', '\\']) || plugin_key == ".." {
            anyhow::bail!("invalid plugin key '{plugin_key}'");
        }
        let path = self.root.join(plugin_key).join("manifest.json");
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("read manifest '{}'", path.display()))?;
        let manifest = serde_json::from_str(&raw)
            .with_context(|| format!("parse manifest '{}'", path.display()))?;
        Ok(manifest)
    }
}

/// Request-deduplicating manifest cache scoped to its own lifetime.
///
/// Each plugin key is fetched at most once; failures are remembered as misses until
/// [`ManifestLoader::invalidate`] or [`ManifestLoader::clear`].
pub struct ManifestLoader<S = Box<dyn ManifestSource>> {
    source: S,
    cache: HashMap<String, Option<Arc<PluginManifest>>>,
}

impl<S: ManifestSource> ManifestLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: HashMap::new(),
        }
    }

    /// Resolve a manifest; `None` when the key is unknown or the source fails.
    pub fn load(&mut self, plugin_key: &str) -> Option<Arc<PluginManifest>> {
        if let Some(hit) = self.cache.get(plugin_key) {
            return hit.clone();
        }
        let fetched = match self.source.fetch(plugin_key) {
            Ok(m) => Some(Arc::new(m)),
            Err(err) => {
                tracing::warn!(plugin_key, error = %err, "manifest unavailable");
                None
            }
        };
        self.cache.insert(plugin_key.to_string(), fetched.clone());
        fetched
    }

    /// Default parameters for a plugin, `{}` when unavailable.
    pub fn default_params(&mut self, plugin_key: &str) -> Params {
        self.load(plugin_key)
            .map(|m| m.default_params())
            .unwrap_or_default()
    }

    /// Declared time offset for a plugin, `[0, 0]` when unavailable.
    pub fn time_offset(&mut self, plugin_key: &str) -> TimeOffset {
        self.load(plugin_key)
            .map(|m| m.time_offset_or_zero())
            .unwrap_or_default()
    }

    pub fn invalidate(&mut self, plugin_key: &str) {
        self.cache.remove(plugin_key);
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

impl Default for ManifestLoader {
    fn default() -> Self {
        Self::new(Box::new(InMemoryManifestSource::new()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/loader.rs"]
mod tests;
