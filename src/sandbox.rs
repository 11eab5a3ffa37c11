//! Bubblewrap sandbox for bottle processes
//!
//! The host root is bound read-only by default and every namespace except
//! network and user is always unshared. Device nodes are globbed when the
//! command is built, so hot-plugged GPUs and cameras are picked up.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::config::BottleConfig;

fn quote(path: &Path) -> String {
    shell_words::quote(&path.to_string_lossy()).into_owned()
}

#[derive(Clone, Debug)]
pub struct SandboxBuilder {
    /// Set inside the sandbox with `--setenv`
    pub envs: BTreeMap<String, String>,
    /// Dropped inside the sandbox with `--unsetenv`
    pub unset_envs: BTreeSet<String>,
    pub chdir: Option<PathBuf>,
    pub clear_env: bool,
    pub share_paths_ro: Vec<PathBuf>,
    pub share_paths_rw: Vec<PathBuf>,
    pub share_net: bool,
    pub share_user: bool,
    pub share_host_ro: bool,
    pub share_display: bool,
    pub share_sound: bool,
    pub share_gpu: bool,
    dev_root: PathBuf,
    runtime_dir: PathBuf,
}

impl Default for SandboxBuilder {
    fn default() -> Self {
        // SAFETY: getuid has no preconditions and cannot fail
        let uid = unsafe { libc::getuid() };
        Self {
            envs: BTreeMap::new(),
            unset_envs: BTreeSet::new(),
            chdir: None,
            clear_env: false,
            share_paths_ro: Vec::new(),
            share_paths_rw: Vec::new(),
            share_net: false,
            share_user: false,
            share_host_ro: true,
            share_display: true,
            share_sound: true,
            share_gpu: true,
            dev_root: PathBuf::from("/dev"),
            runtime_dir: PathBuf::from(format!("/run/user/{}", uid)),
        }
    }
}

impl SandboxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sandbox described by a bottle's `Sandbox` section
    ///
    /// The bottle itself is always bound read-write.
    pub fn for_bottle(config: &BottleConfig, bottle_path: &Path) -> Self {
        let sandbox = &config.sandbox;
        let mut share_paths_rw: Vec<PathBuf> = vec![bottle_path.to_path_buf()];
        share_paths_rw.extend(sandbox.share_paths_rw.iter().map(PathBuf::from));

        Self {
            share_paths_ro: sandbox.share_paths_ro.iter().map(PathBuf::from).collect(),
            share_paths_rw,
            share_net: sandbox.share_net,
            share_user: sandbox.share_user,
            share_host_ro: sandbox.share_host_ro,
            share_display: sandbox.share_display,
            share_sound: sandbox.share_sound,
            share_gpu: sandbox.share_gpu,
            ..Self::default()
        }
    }

    pub fn with_envs(mut self, envs: BTreeMap<String, String>) -> Self {
        self.envs = envs;
        self
    }

    pub fn with_unset_envs(mut self, keys: BTreeSet<String>) -> Self {
        self.unset_envs = keys;
        self
    }

    pub fn with_chdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chdir = Some(dir.into());
        self
    }

    /// Directory globbed for device nodes instead of `/dev`
    pub fn with_dev_root(mut self, dev_root: impl Into<PathBuf>) -> Self {
        self.dev_root = dev_root.into();
        self
    }

    /// User runtime dir holding the pulse socket instead of `/run/user/<uid>`
    pub fn with_runtime_dir(mut self, runtime_dir: impl Into<PathBuf>) -> Self {
        self.runtime_dir = runtime_dir.into();
        self
    }

    fn glob_devices(&self, pattern: &str) -> Vec<PathBuf> {
        let pattern = self.dev_root.join(pattern);
        let Ok(entries) = glob::glob(&pattern.to_string_lossy()) else {
            return Vec::new();
        };
        let mut devices: Vec<PathBuf> = entries.flatten().collect();
        devices.sort();
        devices
    }

    /// bwrap arguments wrapping `cmd`, already shell-quoted
    pub fn args(&self, cmd: &str) -> Vec<String> {
        let mut args = vec!["bwrap".to_string()];
        let bind = |args: &mut Vec<String>, flag: &str, path: &Path| {
            args.extend([flag.to_string(), quote(path), quote(path)]);
        };

        // Must precede --setenv, bwrap only keeps variables set after it
        if self.clear_env {
            args.push("--clearenv".into());
        }
        for (key, value) in &self.envs {
            args.extend([
                "--setenv".to_string(),
                shell_words::quote(key).into_owned(),
                shell_words::quote(value).into_owned(),
            ]);
        }
        for key in &self.unset_envs {
            args.extend(["--unsetenv".to_string(), shell_words::quote(key).into_owned()]);
        }

        if self.share_host_ro {
            args.extend(["--ro-bind".into(), "/".into(), "/".into()]);
        }

        if let Some(dir) = &self.chdir {
            args.extend(["--chdir".to_string(), quote(dir)]);
            bind(&mut args, "--bind", dir);
        }

        for path in &self.share_paths_ro {
            bind(&mut args, "--ro-bind", path);
        }
        for path in &self.share_paths_rw {
            bind(&mut args, "--bind", path);
        }

        if self.share_sound {
            let pulse = self.runtime_dir.join("pulse");
            if pulse.exists() {
                bind(&mut args, "--ro-bind", &pulse);
            }
        }

        if self.share_gpu {
            for device in self.glob_devices("dri/*").into_iter().chain(self.glob_devices("nvidia*")) {
                bind(&mut args, "--dev-bind", &device);
            }
        }
        if self.share_display {
            for device in self.glob_devices("video*") {
                bind(&mut args, "--dev-bind", &device);
            }
        }

        let ntsync = self.dev_root.join("ntsync");
        if ntsync.exists() {
            bind(&mut args, "--dev-bind", &ntsync);
        }

        args.push(if self.share_net { "--share-net" } else { "--unshare-net" }.into());
        // bwrap shares the user namespace unless told otherwise
        if !self.share_user {
            args.push("--unshare-user".into());
        }
        for namespace in ["--unshare-pid", "--unshare-uts", "--unshare-ipc", "--unshare-cgroup"] {
            args.push(namespace.into());
        }

        args.push(cmd.to_string());
        args
    }

    pub fn build_command(&self, cmd: &str) -> String {
        self.args(cmd).join(" ")
    }

    /// Spawn the sandboxed command through `sh -c`, with piped output
    pub fn run(&self, cmd: &str) -> io::Result<Child> {
        let command = self.build_command(cmd);
        tracing::info!("sandbox - running {}", command);
        Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
    }
}
