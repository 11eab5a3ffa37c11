//! Component discovery service
//!
//! Holds, per component type, the identifiers installed on disk and the
//! organized catalog. Each check only writes its own type's list, so
//! checks for different types can run concurrently.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::catalog::{Catalog, CatalogSection, CatalogSource, ComponentKind};
use crate::config::{BottleConfig, Settings};
use crate::connection::Connectivity;
use crate::discovery::operations::{
    list_entries, list_subdirs, lock_winemenubuilders, read_bridge_marker,
    read_runtime_manifest, scan_bottles, scan_compat_tools, system_wine_identifier,
};
use crate::discovery::pure::{SYSTEM_RUNNER_PREFIX, group_runners, offline_identifiers};
use crate::discovery::types::{BridgeStatus, CheckOutcome, Installer, OfflineQuery};
use crate::error::DiscoveryError;
use crate::events::{Event, EventBus};
use crate::paths::ComponentPaths;
use crate::steam;
use crate::version::{is_newer, latest, select_candidate, sort_descending};

/// Where the system wine probe looks
#[derive(Clone, Debug, Default)]
pub enum SystemWineSource {
    /// `which` + the usual WineHQ prefixes
    #[default]
    Detect,
    Binary(PathBuf),
    Disabled,
}

pub struct ComponentDiscoveryService {
    paths: ComponentPaths,
    settings: Settings,
    connectivity: Box<dyn Connectivity>,
    installer: Box<dyn Installer>,
    events: Arc<EventBus>,
    compat_tool_roots: Vec<PathBuf>,
    system_wine: SystemWineSource,

    available: BTreeMap<ComponentKind, RwLock<Vec<String>>>,
    supported: RwLock<Catalog>,
    dependencies: RwLock<serde_yaml::Mapping>,
    installers: RwLock<serde_yaml::Mapping>,
    bottles: RwLock<BTreeMap<String, BottleConfig>>,
}

fn read_lock<T: Clone>(lock: &RwLock<T>) -> T {
    lock.read().unwrap_or_else(|e| e.into_inner()).clone()
}

fn write_lock<T>(lock: &RwLock<T>, value: T) {
    *lock.write().unwrap_or_else(|e| e.into_inner()) = value;
}

impl ComponentDiscoveryService {
    pub fn new(
        paths: ComponentPaths,
        settings: Settings,
        connectivity: Box<dyn Connectivity>,
        installer: Box<dyn Installer>,
        events: Arc<EventBus>,
    ) -> Self {
        let compat_tool_roots = if settings.steam_proton_support {
            steam::compatibility_tools_paths()
        } else {
            Vec::new()
        };

        Self {
            paths,
            settings,
            connectivity,
            installer,
            events,
            compat_tool_roots,
            system_wine: SystemWineSource::Detect,
            available: ComponentKind::ALL
                .into_iter()
                .map(|kind| (kind, RwLock::new(Vec::new())))
                .collect(),
            supported: RwLock::new(Catalog::default()),
            dependencies: RwLock::new(serde_yaml::Mapping::new()),
            installers: RwLock::new(serde_yaml::Mapping::new()),
            bottles: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn with_compat_tool_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.compat_tool_roots = roots;
        self
    }

    pub fn with_system_wine(mut self, source: SystemWineSource) -> Self {
        self.system_wine = source;
        self
    }

    pub fn paths(&self) -> &ComponentPaths {
        &self.paths
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    // Published state

    pub fn available(&self, kind: ComponentKind) -> Vec<String> {
        self.available.get(&kind).map(read_lock).unwrap_or_default()
    }

    fn set_available(&self, kind: ComponentKind, identifiers: Vec<String>) {
        if let Some(lock) = self.available.get(&kind) {
            write_lock(lock, identifiers);
        }
    }

    pub fn supported(&self) -> Catalog {
        read_lock(&self.supported)
    }

    pub fn set_catalog(&self, catalog: Catalog) {
        write_lock(&self.supported, catalog.with_install_paths(&self.paths));
    }

    pub fn dependencies(&self) -> serde_yaml::Mapping {
        read_lock(&self.dependencies)
    }

    pub fn installers(&self) -> serde_yaml::Mapping {
        read_lock(&self.installers)
    }

    pub fn local_bottles(&self) -> BTreeMap<String, BottleConfig> {
        read_lock(&self.bottles)
    }

    // Catalog organization

    /// Wait for the components fetch, then publish the catalog
    pub fn organize_components(&self, source: &dyn CatalogSource) {
        self.events.wait(Event::ComponentsFetching);
        let catalog = source.fetch_catalog();
        if catalog.is_empty() {
            tracing::info!("catalog - no components found");
            self.events.done(Event::ComponentsOrganizing);
            return;
        }
        self.set_catalog(catalog);
        self.events.done(Event::ComponentsOrganizing);
    }

    pub fn organize_dependencies(&self, source: &dyn CatalogSource) {
        self.events.wait(Event::DependenciesFetching);
        let catalog = source.fetch_dependencies();
        if catalog.is_empty() {
            tracing::info!("catalog - no dependencies found");
        } else {
            write_lock(&self.dependencies, catalog);
        }
        self.events.done(Event::DependenciesOrganizing);
    }

    pub fn organize_installers(&self, source: &dyn CatalogSource) {
        self.events.wait(Event::InstallersFetching);
        let catalog = source.fetch_installers();
        if catalog.is_empty() {
            tracing::info!("catalog - no installers found");
        } else {
            write_lock(&self.installers, catalog);
        }
        self.events.done(Event::InstallersOrganizing);
    }

    // Installation

    /// Pick a catalog candidate for `kind` and hand it to the installer
    fn install_candidate(
        &self,
        kind: ComponentKind,
        section: &CatalogSection,
    ) -> Result<String, DiscoveryError> {
        if !self.connectivity.check_connection() {
            return Err(DiscoveryError::NetworkUnavailable);
        }
        let candidate = select_candidate(section, self.settings.release_candidate)?.to_string();
        self.install(kind, &candidate)?;
        Ok(candidate)
    }

    fn install(&self, kind: ComponentKind, identifier: &str) -> Result<(), DiscoveryError> {
        tracing::info!("installer - installing {} {}", kind, identifier);
        self.installer
            .install(kind, identifier)
            .map_err(|reason| DiscoveryError::InstallFailure {
                kind: kind.to_string(),
                identifier: identifier.to_string(),
                reason,
            })
    }

    // Checks

    /// Discover one component type, installing a build when none is present
    /// and `install_latest` is set
    pub fn check_component(
        &self,
        kind: ComponentKind,
        install_latest: bool,
    ) -> Result<CheckOutcome, DiscoveryError> {
        match kind {
            ComponentKind::Runner => self.check_runners(install_latest),
            ComponentKind::Runtime => self.check_runtimes(install_latest),
            ComponentKind::WineBridge => self.check_winebridge(install_latest, false),
            ComponentKind::Dxvk
            | ComponentKind::Vkd3d
            | ComponentKind::Nvapi
            | ComponentKind::LatencyFlex => self.check_generic(kind, install_latest),
        }
    }

    /// Like [`check_component`](Self::check_component), keyed by the type's name
    pub fn check_component_named(
        &self,
        name: &str,
        install_latest: bool,
    ) -> Result<CheckOutcome, DiscoveryError> {
        let kind = name.parse::<ComponentKind>().inspect_err(|_| {
            tracing::warn!("discovery - unknown component type found: {}", name);
        })?;
        self.check_component(kind, install_latest)
    }

    fn check_generic(
        &self,
        kind: ComponentKind,
        install_latest: bool,
    ) -> Result<CheckOutcome, DiscoveryError> {
        let mut installed = list_entries(self.paths.for_kind(kind))?;

        if !installed.is_empty() {
            tracing::info!("{} - found:\n - {}", kind, installed.join("\n - "));
        }

        if installed.is_empty() && install_latest {
            tracing::warn!("{} - none found", kind);
            let supported = self.supported();
            installed = vec![self.install_candidate(kind, supported.section(kind))?];
        }

        let sorted = sort_descending(&installed);
        self.set_available(kind, sorted.clone());
        Ok(CheckOutcome::from_list(sorted))
    }

    pub fn check_runtimes(&self, install_latest: bool) -> Result<CheckOutcome, DiscoveryError> {
        self.set_available(ComponentKind::Runtime, Vec::new());
        let runtimes = list_entries(&self.paths.runtimes)?;

        let Some(first) = runtimes.first() else {
            if !install_latest {
                return Ok(CheckOutcome::Missing);
            }
            tracing::warn!("runtime - none found");
            let supported = self.supported();
            let candidate = self.install_candidate(ComponentKind::Runtime, &supported.runtimes)?;
            self.set_available(ComponentKind::Runtime, vec![candidate.clone()]);
            return Ok(CheckOutcome::Available(vec![candidate]));
        };

        match read_runtime_manifest(&self.paths.runtimes.join(first))? {
            Some(identifier) => {
                self.set_available(ComponentKind::Runtime, vec![identifier.clone()]);
                Ok(CheckOutcome::Available(vec![identifier]))
            }
            None => Ok(CheckOutcome::Missing),
        }
    }

    /// Installed vs latest bridge, without installing anything
    pub fn winebridge_status(&self) -> Result<BridgeStatus, DiscoveryError> {
        let entries = list_entries(&self.paths.winebridge)?;
        let supported = self.supported();
        let identifiers: Vec<&str> = supported.winebridge.identifiers().collect();
        let latest_supported = latest(&identifiers);

        let installed_identifier = read_bridge_marker(&self.paths.winebridge);
        self.set_available(
            ComponentKind::WineBridge,
            installed_identifier.iter().cloned().collect(),
        );

        Ok(bridge_status(
            latest_supported,
            installed_identifier,
            entries.is_empty(),
        ))
    }

    /// Bridge check; installs or updates when allowed and needed
    pub fn check_winebridge(
        &self,
        install_latest: bool,
        update: bool,
    ) -> Result<CheckOutcome, DiscoveryError> {
        let status = self.winebridge_status()?;
        let can_install = install_latest || update;

        if status.needs_latest
            && let Some(latest) = status.latest_supported
        {
            if !can_install {
                return Ok(CheckOutcome::UpdateRequired {
                    installed: status.installed_identifier,
                    latest,
                });
            }
            if !self.connectivity.check_connection() {
                return Err(DiscoveryError::NetworkUnavailable);
            }
            tracing::warn!("winebridge - installation or update required");
            self.install(ComponentKind::WineBridge, &latest)?;
            self.set_available(ComponentKind::WineBridge, vec![latest.clone()]);
            return Ok(CheckOutcome::Available(vec![latest]));
        }

        match status.installed_identifier {
            Some(identifier) => Ok(CheckOutcome::Available(vec![identifier])),
            None => Ok(CheckOutcome::Missing),
        }
    }

    pub fn check_runners(&self, install_latest: bool) -> Result<CheckOutcome, DiscoveryError> {
        let runner_dirs = list_subdirs(&self.paths.runners)?;

        let locked = lock_winemenubuilders(&runner_dirs);
        if locked > 0 {
            tracing::info!("runners - locked {} winemenubuilder helpers", locked);
        }

        let mut found = Vec::new();
        if let Some(identifier) = self.system_wine_identifier() {
            found.push(identifier);
        }
        for dir in &runner_dirs {
            if let Some(name) = dir.file_name() {
                found.push(name.to_string_lossy().into_owned());
            }
        }
        for proton in scan_compat_tools(&self.compat_tool_roots) {
            if !found.contains(&proton) {
                found.push(proton);
            }
        }

        let mut runners = group_runners(sort_descending(&found));
        if !runners.is_empty() {
            tracing::info!("runners - found:\n - {}", runners.join("\n - "));
        }

        let has_managed = runners.iter().any(|r| !r.starts_with(SYSTEM_RUNNER_PREFIX));
        if !has_managed && install_latest {
            tracing::warn!("runners - no managed runners found");
            let supported = self.supported();
            let candidate = self.install_candidate(ComponentKind::Runner, &supported.wine)?;
            runners.push(candidate);
            runners = group_runners(sort_descending(&runners));
        }

        self.set_available(ComponentKind::Runner, runners.clone());
        Ok(CheckOutcome::from_list(runners))
    }

    fn system_wine_identifier(&self) -> Option<String> {
        let wine = match &self.system_wine {
            SystemWineSource::Detect => crate::discovery::operations::find_system_wine()?,
            SystemWineSource::Binary(path) => path.clone(),
            SystemWineSource::Disabled => return None,
        };
        system_wine_identifier(&wine)
    }

    /// Scan the bottles dir and publish the inventory
    pub fn check_bottles(&self) -> usize {
        let bottles = scan_bottles(&self.paths.bottles);
        let count = bottles.len();
        write_lock(&self.bottles, bottles);
        count
    }

    // Queries

    /// Installed builds the catalog does not know about
    ///
    /// `runner` lists plain wine builds, `runner:proton` Proton builds.
    /// `extra_name_check` is appended when neither side knows it.
    pub fn get_offline_components(
        &self,
        component_type: &str,
        extra_name_check: &str,
    ) -> Result<Vec<String>, DiscoveryError> {
        let query: OfflineQuery = component_type.parse()?;
        let catalog = self.supported();

        let (available, supported) = match query {
            OfflineQuery::Component(kind) => (self.available(kind), catalog.section(kind)),
            OfflineQuery::ProtonRunners => (self.available(ComponentKind::Runner), &catalog.proton),
        };

        let mut offline = offline_identifiers(&available, supported);
        match query {
            OfflineQuery::Component(ComponentKind::Runner) => offline.retain(|runner| {
                !runner.starts_with(SYSTEM_RUNNER_PREFIX)
                    && !steam::is_proton(&self.runner_path(runner))
            }),
            OfflineQuery::ProtonRunners => {
                offline.retain(|runner| steam::is_proton(&self.runner_path(runner)))
            }
            OfflineQuery::Component(_) => {}
        }

        if !extra_name_check.is_empty()
            && !available.iter().any(|a| a == extra_name_check)
            && !supported.contains(extra_name_check)
        {
            offline.push(extra_name_check.to_string());
        }

        Ok(sort_descending(&offline))
    }

    /// Newest available runner starting with `prefix`
    pub fn get_latest_runner(&self, prefix: &str) -> Option<String> {
        self.available(ComponentKind::Runner)
            .into_iter()
            .find(|runner| runner.starts_with(prefix))
    }

    /// Install directory of a runner: managed dir first, then Steam tool roots
    pub fn runner_path(&self, runner: &str) -> PathBuf {
        let managed = self.paths.runners.join(runner);
        if managed.exists() {
            return managed;
        }
        self.compat_tool_roots
            .iter()
            .map(|root| root.join(runner))
            .find(|candidate| candidate.exists())
            .unwrap_or(managed)
    }

    pub fn component_path(&self, kind: ComponentKind, identifier: &str) -> PathBuf {
        self.paths.component_path(kind, identifier)
    }

    pub fn compat_tool_roots(&self) -> &[PathBuf] {
        &self.compat_tool_roots
    }

    pub fn temp_dir(&self) -> &Path {
        &self.paths.temp
    }
}

/// Combine bridge facts into a status
///
/// A missing installation needs the latest build whenever the catalog has
/// one; an installed build needs it when the catalog's latest is newer.
pub fn bridge_status(
    latest_supported: Option<String>,
    installed_identifier: Option<String>,
    dir_empty: bool,
) -> BridgeStatus {
    let missing = installed_identifier.is_none();
    let needs_latest = match (&latest_supported, &installed_identifier) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(_), Some(_)) if dir_empty => true,
        (Some(latest), Some(installed)) => is_newer(latest, installed),
    };

    BridgeStatus {
        latest_supported,
        installed_identifier,
        needs_latest,
        missing,
    }
}
