//! Component catalog
//!
//! The catalog is the externally-sourced registry of component builds that can
//! be installed. Every section keeps the order its source declared, which is
//! the preference order used when picking a build to install (earliest wins).

use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, DiscoveryError};
use crate::paths::ComponentPaths;

/// Component types the discovery service knows about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    Runner,
    Runtime,
    WineBridge,
    Dxvk,
    Vkd3d,
    Nvapi,
    LatencyFlex,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 7] = [
        ComponentKind::Dxvk,
        ComponentKind::Vkd3d,
        ComponentKind::Nvapi,
        ComponentKind::LatencyFlex,
        ComponentKind::Runtime,
        ComponentKind::WineBridge,
        ComponentKind::Runner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Runner => "runner",
            ComponentKind::Runtime => "runtime",
            ComponentKind::WineBridge => "winebridge",
            ComponentKind::Dxvk => "dxvk",
            ComponentKind::Vkd3d => "vkd3d",
            ComponentKind::Nvapi => "nvapi",
            ComponentKind::LatencyFlex => "latencyflex",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "runner" => Ok(ComponentKind::Runner),
            "runtime" => Ok(ComponentKind::Runtime),
            "winebridge" => Ok(ComponentKind::WineBridge),
            "dxvk" => Ok(ComponentKind::Dxvk),
            "vkd3d" => Ok(ComponentKind::Vkd3d),
            "nvapi" => Ok(ComponentKind::Nvapi),
            "latencyflex" => Ok(ComponentKind::LatencyFlex),
            other => Err(DiscoveryError::ComponentTypeUnsupported(other.to_string())),
        }
    }
}

/// Release maturity of a catalog entry
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Stable,
    Rc,
    Unstable,
}

impl Channel {
    /// `rc` and `unstable` builds are only picked when pre-releases are allowed
    pub fn is_prerelease(&self) -> bool {
        matches!(self, Channel::Rc | Channel::Unstable)
    }
}

/// One installable build listed in the catalog
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentDescriptor {
    pub identifier: String,
    pub channel: Channel,
    pub category: Option<String>,
    /// Where the build lands once installed; empty until
    /// [`Catalog::with_install_paths`] ran.
    pub install_path: PathBuf,
}

impl ComponentDescriptor {
    pub fn new(identifier: &str, channel: Channel) -> Self {
        Self {
            identifier: identifier.to_string(),
            channel,
            category: None,
            install_path: PathBuf::new(),
        }
    }
}

#[derive(Deserialize)]
struct RawDescriptor {
    #[serde(rename = "Channel", alias = "channel")]
    channel: Channel,
    #[serde(rename = "Category", alias = "category", default)]
    category: Option<String>,
}

/// Ordered identifier -> descriptor mapping for one component type
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogSection {
    entries: Vec<ComponentDescriptor>,
}

impl CatalogSection {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, Channel)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(id, channel)| ComponentDescriptor::new(id, channel))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.entries.iter()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.identifier.as_str())
    }

    pub fn get(&self, identifier: &str) -> Option<&ComponentDescriptor> {
        self.entries.iter().find(|e| e.identifier == identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the source-declared order with an explicit preference.
    ///
    /// The sort is stable, so entries the comparator considers equal keep
    /// their declared order.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&ComponentDescriptor, &ComponentDescriptor) -> Ordering,
    {
        self.entries.sort_by(compare);
    }

    fn set_install_root(&mut self, root: &Path) {
        for entry in &mut self.entries {
            entry.install_path = root.join(&entry.identifier);
        }
    }
}

impl<'de> Deserialize<'de> for CatalogSection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SectionVisitor;

        impl<'de> Visitor<'de> for SectionVisitor {
            type Value = CatalogSection;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of component identifiers to descriptors")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(CatalogSection::default())
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some((identifier, raw)) = map.next_entry::<String, RawDescriptor>()? {
                    entries.push(ComponentDescriptor {
                        identifier,
                        channel: raw.channel,
                        category: raw.category,
                        install_path: PathBuf::new(),
                    });
                }
                Ok(CatalogSection { entries })
            }
        }

        deserializer.deserialize_map(SectionVisitor)
    }
}

/// Every catalog section, one per component type
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub wine: CatalogSection,
    #[serde(default)]
    pub proton: CatalogSection,
    #[serde(default)]
    pub runtimes: CatalogSection,
    #[serde(default)]
    pub winebridge: CatalogSection,
    #[serde(default)]
    pub dxvk: CatalogSection,
    #[serde(default)]
    pub vkd3d: CatalogSection,
    #[serde(default)]
    pub nvapi: CatalogSection,
    #[serde(default)]
    pub latencyflex: CatalogSection,
}

impl Catalog {
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn is_empty(&self) -> bool {
        self.wine.is_empty()
            && self.proton.is_empty()
            && self.runtimes.is_empty()
            && self.winebridge.is_empty()
            && self.dxvk.is_empty()
            && self.vkd3d.is_empty()
            && self.nvapi.is_empty()
            && self.latencyflex.is_empty()
    }

    /// Section a component type installs from; runners install wine builds
    pub fn section(&self, kind: ComponentKind) -> &CatalogSection {
        match kind {
            ComponentKind::Runner => &self.wine,
            ComponentKind::Runtime => &self.runtimes,
            ComponentKind::WineBridge => &self.winebridge,
            ComponentKind::Dxvk => &self.dxvk,
            ComponentKind::Vkd3d => &self.vkd3d,
            ComponentKind::Nvapi => &self.nvapi,
            ComponentKind::LatencyFlex => &self.latencyflex,
        }
    }

    pub fn with_install_paths(mut self, paths: &ComponentPaths) -> Self {
        self.wine.set_install_root(&paths.runners);
        self.proton.set_install_root(&paths.runners);
        self.runtimes.set_install_root(&paths.runtimes);
        self.winebridge.set_install_root(&paths.winebridge);
        self.dxvk.set_install_root(&paths.dxvk);
        self.vkd3d.set_install_root(&paths.vkd3d);
        self.nvapi.set_install_root(&paths.nvapi);
        self.latencyflex.set_install_root(&paths.latencyflex);
        self
    }
}

/// Where organized catalogs come from once their fetch completed
pub trait CatalogSource: Send + Sync {
    fn fetch_catalog(&self) -> Catalog;

    fn fetch_dependencies(&self) -> serde_yaml::Mapping {
        serde_yaml::Mapping::new()
    }

    fn fetch_installers(&self) -> serde_yaml::Mapping {
        serde_yaml::Mapping::new()
    }
}

/// Catalog source backed by index files already present on disk
#[derive(Clone, Debug, Default)]
pub struct FileCatalogSource {
    pub components: Option<PathBuf>,
    pub dependencies: Option<PathBuf>,
    pub installers: Option<PathBuf>,
}

impl FileCatalogSource {
    pub fn components(path: impl Into<PathBuf>) -> Self {
        Self {
            components: Some(path.into()),
            ..Default::default()
        }
    }

    fn load_mapping(path: Option<&PathBuf>) -> serde_yaml::Mapping {
        let Some(path) = path else {
            return serde_yaml::Mapping::new();
        };
        match fs::read_to_string(path)
            .map_err(ConfigError::from)
            .and_then(|s| serde_yaml::from_str(&s).map_err(ConfigError::from))
        {
            Ok(mapping) => mapping,
            Err(e) => {
                tracing::warn!("catalog - failed to read {}: {}", path.display(), e);
                serde_yaml::Mapping::new()
            }
        }
    }
}

impl CatalogSource for FileCatalogSource {
    fn fetch_catalog(&self) -> Catalog {
        let Some(path) = &self.components else {
            return Catalog::default();
        };
        match Catalog::load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!("catalog - failed to read {}: {}", path.display(), e);
                Catalog::default()
            }
        }
    }

    fn fetch_dependencies(&self) -> serde_yaml::Mapping {
        Self::load_mapping(self.dependencies.as_ref())
    }

    fn fetch_installers(&self) -> serde_yaml::Mapping {
        Self::load_mapping(self.installers.as_ref())
    }
}
