//! Startup checks pipeline
//!
//! Three phases: the component directories are created serially, every
//! component check then runs on its own thread, and the catalog
//! organization steps run serially once all checks have finished.
//! Installing requires the components catalog during the checks, so with
//! `install_latest` it is organized in the serial prep phase instead.

use crate::catalog::{CatalogSource, ComponentKind};
use crate::discovery::operations::{check_app_dirs, clear_temp};
use crate::discovery::service::ComponentDiscoveryService;
use crate::discovery::types::{CheckProgress, ChecksReport};

#[derive(Clone, Copy, Debug, Default)]
pub struct ChecksOptions {
    /// Install a catalog build for every empty component type
    pub install_latest: bool,
    /// Also organize the components catalog and clean the temp dir
    pub first_run: bool,
}

pub type ProgressFn<'p> = &'p (dyn Fn(CheckProgress<'_>) + Sync);

#[derive(Clone, Copy)]
enum ParallelCheck {
    Component(ComponentKind),
    Bottles,
}

const PARALLEL_STEPS: [(&str, &str, ParallelCheck); 8] = [
    ("check_dxvk", "Setting up DXVK...", ParallelCheck::Component(ComponentKind::Dxvk)),
    ("check_vkd3d", "Setting up VKD3D...", ParallelCheck::Component(ComponentKind::Vkd3d)),
    ("check_nvapi", "Setting up NVAPI...", ParallelCheck::Component(ComponentKind::Nvapi)),
    (
        "check_latencyflex",
        "Setting up LatencyFleX...",
        ParallelCheck::Component(ComponentKind::LatencyFlex),
    ),
    ("check_runtimes", "Preparing runtimes...", ParallelCheck::Component(ComponentKind::Runtime)),
    (
        "check_winebridge",
        "Preparing WineBridge...",
        ParallelCheck::Component(ComponentKind::WineBridge),
    ),
    ("check_runners", "Preparing runners...", ParallelCheck::Component(ComponentKind::Runner)),
    ("check_bottles", "Loading bottles...", ParallelCheck::Bottles),
];

fn run_step<R>(
    progress: Option<ProgressFn<'_>>,
    description: &str,
    current_step: usize,
    total_steps: usize,
    step: impl FnOnce() -> R,
) -> R {
    let notify = |completed| {
        if let Some(progress) = progress {
            progress(CheckProgress {
                description,
                current_step,
                total_steps,
                completed,
            });
        }
    };
    notify(false);
    let result = step();
    notify(true);
    result
}

fn run_parallel_check(
    service: &ComponentDiscoveryService,
    check: ParallelCheck,
    install_latest: bool,
) -> Result<bool, String> {
    match check {
        ParallelCheck::Component(kind) => service
            .check_component(kind, install_latest)
            .map(|outcome| {
                if !outcome.passed() {
                    tracing::warn!("{} - check did not pass: {:?}", kind, outcome);
                }
                outcome.passed()
            })
            .map_err(|e| {
                tracing::error!("{} - check failed: {}", kind, e);
                e.to_string()
            }),
        ParallelCheck::Bottles => {
            let count = service.check_bottles();
            tracing::info!("bottles - {} local bottles loaded", count);
            Ok(true)
        }
    }
}

/// Run every discovery check and the catalog organization
///
/// The catalog fetch events must be signalled by whoever fetches the
/// catalogs; organization blocks until they are.
pub fn run_checks(
    service: &ComponentDiscoveryService,
    source: &dyn CatalogSource,
    options: ChecksOptions,
    progress: Option<ProgressFn<'_>>,
) -> ChecksReport {
    tracing::info!("checks - performing checks");

    let mut report = ChecksReport {
        status: true,
        steps: Vec::new(),
    };
    let organize_early = options.install_latest;
    let organize_components = options.install_latest || options.first_run;
    let mut total = 1 + PARALLEL_STEPS.len() + 2;
    if organize_components {
        total += 1;
    }
    if options.first_run {
        total += 1;
    }

    // 1. Essential prep
    let mut step = 1;
    let prepared = run_step(progress, "Preparing folders...", step, total, || {
        check_app_dirs(service.paths(), service.settings().steam_proton_support)
    });
    report.record("check_app_dirs", prepared.map(|_| true).map_err(|e| e.to_string()));
    step += 1;

    if organize_early {
        run_step(progress, "Organizing components...", step, total, || {
            service.organize_components(source)
        });
        report.record("organize_components", Ok(true));
        step += 1;
    }

    // 2. Independent component checks
    let results: Vec<Result<bool, String>> = std::thread::scope(|s| {
        let handles: Vec<_> = PARALLEL_STEPS
            .iter()
            .enumerate()
            .map(|(idx, &(_, description, check))| {
                s.spawn(move || {
                    run_step(progress, description, step + idx, total, || {
                        run_parallel_check(service, check, options.install_latest)
                    })
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| {
                h.join()
                    .unwrap_or_else(|_| Err("check thread panicked".to_string()))
            })
            .collect()
    });
    for (&(key, _, _), result) in PARALLEL_STEPS.iter().zip(results) {
        report.record(key, result);
    }

    // 3. Catalog organization
    step += PARALLEL_STEPS.len();
    if organize_components && !organize_early {
        run_step(progress, "Organizing components...", step, total, || {
            service.organize_components(source)
        });
        report.record("organize_components", Ok(true));
        step += 1;
    }
    if options.first_run {
        let cleaned = run_step(progress, "Cleaning temporary files...", step, total, || {
            if service.settings().temp_cleanup {
                clear_temp(service.paths())
            } else {
                Ok(())
            }
        });
        report.record("clear_temp", cleaned.map(|_| true).map_err(|e| e.to_string()));
        step += 1;
    }

    run_step(progress, "Organizing dependencies...", step, total, || {
        service.organize_dependencies(source)
    });
    report.record("organize_dependencies", Ok(true));
    step += 1;

    run_step(progress, "Organizing installers...", step, total, || {
        service.organize_installers(source)
    });
    report.record("organize_installers", Ok(true));

    tracing::info!("checks - {}", report.describe());
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CatalogSection, Channel};
    use crate::config::Settings;
    use crate::connection::StaticConnectivity;
    use crate::discovery::service::SystemWineSource;
    use crate::discovery::types::{Installer, UnavailableInstaller};
    use crate::events::{Event, EventBus};
    use crate::paths::ComponentPaths;
    use std::fs;
    use std::sync::{Arc, Mutex};

    struct StaticSource;

    impl CatalogSource for StaticSource {
        fn fetch_catalog(&self) -> Catalog {
            Catalog {
                dxvk: CatalogSection::from_entries([("dxvk-2.3", Channel::Stable)]),
                ..Default::default()
            }
        }
    }

    #[derive(Default)]
    struct RecordingInstaller {
        calls: Arc<Mutex<Vec<(ComponentKind, String)>>>,
    }

    impl Installer for RecordingInstaller {
        fn install(&self, kind: ComponentKind, identifier: &str) -> Result<(), String> {
            self.calls.lock().unwrap().push((kind, identifier.to_string()));
            Ok(())
        }
    }

    fn service(root: &std::path::Path, online: bool) -> ComponentDiscoveryService {
        service_with(root, online, Box::new(UnavailableInstaller))
    }

    fn service_with(
        root: &std::path::Path,
        online: bool,
        installer: Box<dyn Installer>,
    ) -> ComponentDiscoveryService {
        let events = Arc::new(EventBus::new());
        events.done(Event::ComponentsFetching);
        events.done(Event::DependenciesFetching);
        events.done(Event::InstallersFetching);
        ComponentDiscoveryService::new(
            ComponentPaths::under(root),
            Settings::default(),
            Box::new(StaticConnectivity(online)),
            installer,
            events,
        )
        .with_system_wine(SystemWineSource::Disabled)
    }

    #[test]
    fn first_run_reports_every_step() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), true);

        let seen = Mutex::new(Vec::new());
        let progress = |p: CheckProgress<'_>| {
            seen.lock()
                .unwrap()
                .push((p.current_step, p.total_steps, p.completed));
        };
        let report = run_checks(
            &service,
            &StaticSource,
            ChecksOptions {
                install_latest: false,
                first_run: true,
            },
            Some(&progress),
        );

        // Runtime and bridge are required; with an empty data dir they are missing
        assert!(!report.status);
        assert!(report.step("check_dxvk").unwrap().passed);
        assert!(report.step("check_runners").unwrap().passed);
        assert!(!report.step("check_runtimes").unwrap().passed);
        assert!(!report.step("check_winebridge").unwrap().passed);
        assert!(report.describe().contains("check_runtimes"));

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 13 * 2);
        assert!(seen.iter().all(|&(_, total, _)| total == 13));
        assert_eq!(seen.iter().filter(|(_, _, done)| *done).count(), 13);

        assert!(service.events().is_done(Event::ComponentsOrganizing));
        assert!(service.events().is_done(Event::InstallersOrganizing));
        assert_eq!(service.supported().dxvk.len(), 1);
    }

    #[test]
    fn populated_data_dir_passes() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), true);
        let paths = service.paths().clone();
        check_app_dirs(&paths, false).unwrap();

        fs::create_dir_all(paths.dxvk.join("dxvk-2.3")).unwrap();
        fs::create_dir_all(paths.runners.join("soda-9.0-1")).unwrap();
        fs::create_dir_all(paths.runtimes.join("runtime")).unwrap();
        fs::write(paths.runtimes.join("runtime/manifest.yml"), "version: 0.5\n").unwrap();
        fs::write(paths.winebridge.join("VERSION"), "1.0\n").unwrap();
        let bottle = paths.bottles.join("Games");
        fs::create_dir_all(&bottle).unwrap();
        fs::write(bottle.join("bottle.yml"), "Name: Games\n").unwrap();

        let report = run_checks(&service, &StaticSource, ChecksOptions::default(), None);
        assert!(report.status, "{}", report.describe());
        assert_eq!(service.available(ComponentKind::Runner), vec!["soda-9.0-1"]);
        assert_eq!(service.available(ComponentKind::Runtime), vec!["runtime-0.5"]);
        assert_eq!(service.local_bottles().len(), 1);
        // Components catalog is only organized on first run or when installing
        assert!(service.supported().dxvk.is_empty());
    }

    #[test]
    fn offline_install_fails_aggregate() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), false);

        let report = run_checks(
            &service,
            &StaticSource,
            ChecksOptions {
                install_latest: true,
                first_run: false,
            },
            None,
        );
        assert!(!report.status);
        let dxvk = report.step("check_dxvk").unwrap();
        assert!(!dxvk.passed);
        assert!(dxvk.message.as_deref().unwrap().contains("Network"));
    }

    #[test]
    fn install_latest_installs_from_the_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let installer = RecordingInstaller::default();
        let calls = Arc::clone(&installer.calls);
        let service = service_with(dir.path(), true, Box::new(installer));

        let seen = Mutex::new(Vec::new());
        let progress = |p: CheckProgress<'_>| {
            if !p.completed {
                seen.lock().unwrap().push((p.current_step, p.total_steps));
            }
        };
        let report = run_checks(
            &service,
            &StaticSource,
            ChecksOptions {
                install_latest: true,
                first_run: false,
            },
            Some(&progress),
        );

        assert!(report.step("check_dxvk").unwrap().passed, "{}", report.describe());
        assert_eq!(service.available(ComponentKind::Dxvk), vec!["dxvk-2.3"]);
        assert!(
            calls
                .lock()
                .unwrap()
                .contains(&(ComponentKind::Dxvk, "dxvk-2.3".to_string()))
        );

        // Organized once, ahead of the component checks
        let keys: Vec<&str> = report.steps.iter().map(|s| s.key).collect();
        assert_eq!(keys[..2], ["check_app_dirs", "organize_components"]);
        assert_eq!(keys.iter().filter(|k| **k == "organize_components").count(), 1);

        let mut seen = seen.into_inner().unwrap();
        seen.sort();
        let expected: Vec<(usize, usize)> = (1..=12).map(|step| (step, 12)).collect();
        assert_eq!(seen, expected);
    }
}
