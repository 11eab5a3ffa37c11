use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use bottlerun::catalog::{ComponentKind, FileCatalogSource};
use bottlerun::config::{load_bottle_config, load_settings};
use bottlerun::connection::HttpConnectivity;
use bottlerun::discovery::{
    CheckProgress, ChecksOptions, CommandInstaller, ComponentDiscoveryService, Installer,
    UnavailableInstaller, run_checks,
};
use bottlerun::events::{Event, EventBus};
use bottlerun::execution::LaunchFlags;
use bottlerun::host::LaunchHost;
use bottlerun::launch::{cleanup, format_launch, prepare, program_command, spawn};
use bottlerun::paths::ComponentPaths;
use bottlerun::winepath::PathTranslator;

/// bottlerun - resolve and launch programs inside Wine bottles
#[derive(Parser)]
#[command(name = "bottlerun")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Data directory (default: $XDG_DATA_HOME/bottles)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the environment and command that launch a program in a bottle
    Env {
        /// Path to the bottle's bottle.yml
        bottle: PathBuf,

        /// Program to run, as the guest sees it
        program: String,

        /// Arguments passed to the program
        #[arg(last = true)]
        args: Vec<String>,

        #[command(flatten)]
        flags: FlagArgs,

        /// Start the program after printing
        #[arg(long)]
        run: bool,
    },

    /// Run the discovery checks
    Check {
        /// Install a catalog build for every empty component type
        #[arg(long, requires = "installer")]
        install_latest: bool,

        /// Installer command, run as `<command> <kind> <identifier> <destination>`
        #[arg(long, value_name = "COMMAND")]
        installer: Option<String>,

        /// Components index to organize (YAML)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Also organize the components catalog and clean the temp dir
        #[arg(long)]
        first_run: bool,
    },

    /// Translate a path between host and guest form
    Winepath {
        /// Bottle (prefix) directory
        bottle_root: PathBuf,

        /// Print the guest (Windows) form of a host path
        #[arg(long, conflicts_with = "unix")]
        windows: bool,

        /// Print the host form of a guest path
        #[arg(long)]
        unix: bool,

        path: String,
    },
}

#[derive(Args)]
struct FlagArgs {
    /// No overlays, anti-cheat runtimes, compositor or tool wrappers
    #[arg(long)]
    minimal: bool,

    /// Launch meant for a terminal
    #[arg(long)]
    terminal: bool,

    /// Environment for a Steam launch option
    #[arg(long)]
    steam_env: bool,

    /// Leave the runner out of the command
    #[arg(long)]
    clean_env: bool,
}

impl From<FlagArgs> for LaunchFlags {
    fn from(args: FlagArgs) -> Self {
        LaunchFlags {
            return_steam_env: args.steam_env,
            return_clean_env: args.clean_env,
            is_terminal: args.terminal,
            is_minimal: args.minimal,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let paths = match &cli.data_dir {
        Some(dir) => ComponentPaths::under(dir),
        None => ComponentPaths::default(),
    };

    match cli.command {
        Commands::Env {
            bottle,
            program,
            args,
            flags,
            run,
        } => cmd_env(paths, &bottle, &program, &args, flags.into(), run),
        Commands::Check {
            install_latest,
            installer,
            catalog,
            first_run,
        } => cmd_check(
            paths,
            catalog,
            installer.as_deref(),
            ChecksOptions {
                install_latest,
                first_run,
            },
        ),
        Commands::Winepath {
            bottle_root,
            windows,
            unix,
            path,
        } => cmd_winepath(&bottle_root, windows, unix, &path),
    }
}

fn cmd_env(
    paths: ComponentPaths,
    bottle: &Path,
    program: &str,
    args: &[String],
    flags: LaunchFlags,
    run: bool,
) -> Result<()> {
    let config = load_bottle_config(bottle)
        .with_context(|| format!("failed to load {}", bottle.display()))?;
    let host = LaunchHost::detect(paths);

    let launch = prepare(&host, &config, &program_command(program, args), flags)
        .context("failed to prepare launch")?;
    println!("{}", format_launch(&launch, &config.name));

    if run {
        let cwd = config.bottle_path(&host.paths);
        let child = spawn(&launch, Some(&cwd)).context("failed to spawn")?;
        let output = child.wait_with_output();
        cleanup(&launch);
        let output = output?;
        print!("{}", String::from_utf8_lossy(&output.stdout));
        eprint!("{}", String::from_utf8_lossy(&output.stderr));
        if !output.status.success() {
            anyhow::bail!("{} exited with {}", program, output.status);
        }
    } else {
        for script in &launch.scripts {
            tracing::info!("launch - {} is kept for the printed command", script.display());
        }
    }
    Ok(())
}

fn cmd_check(
    paths: ComponentPaths,
    catalog: Option<PathBuf>,
    installer: Option<&str>,
    options: ChecksOptions,
) -> Result<()> {
    let settings = load_settings(&paths.root.join("settings.json"));
    let installer: Box<dyn Installer> = match installer {
        Some(command) => Box::new(
            CommandInstaller::new(command, paths.clone())
                .with_context(|| format!("invalid installer command: {}", command))?,
        ),
        None => Box::new(UnavailableInstaller),
    };
    let events = Arc::new(EventBus::new());
    let service = ComponentDiscoveryService::new(
        paths,
        settings.clone(),
        Box::new(HttpConnectivity::new(settings.force_offline)),
        installer,
        Arc::clone(&events),
    );

    // Index files are read from disk, so fetching is already complete
    let source = catalog.map(FileCatalogSource::components).unwrap_or_default();
    events.done(Event::ComponentsFetching);
    events.done(Event::DependenciesFetching);
    events.done(Event::InstallersFetching);

    let progress = |p: CheckProgress<'_>| {
        if !p.completed {
            eprintln!("[{}/{}] {}", p.current_step, p.total_steps, p.description);
        }
    };
    let report = run_checks(&service, &source, options, Some(&progress));

    for kind in ComponentKind::ALL {
        println!("{}: {}", kind, service.available(kind).join(", "));
    }
    println!("bottles: {}", service.local_bottles().len());
    println!("{}", report.describe());

    if !report.status {
        anyhow::bail!("checks failed");
    }
    Ok(())
}

fn cmd_winepath(bottle_root: &Path, windows: bool, unix: bool, path: &str) -> Result<()> {
    let translator = PathTranslator::new(bottle_root);
    let translated = match (windows, unix) {
        (true, _) => translator.to_guest_path(Path::new(path)),
        (_, true) => translator.to_host_path(path),
        _ => anyhow::bail!("pass --windows or --unix"),
    };
    println!("{}", translated);
    Ok(())
}
