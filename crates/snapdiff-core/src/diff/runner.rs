use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::diff::counter::InstanceCounter;
use crate::diff::definitions::ToolKind;
use crate::diff::finder::Finder;
use crate::diff::position;
use crate::diff::process::ProcessRegistry;
use crate::diff::tools::{ResolvedTool, Tools};
use crate::diff::DiffLauncher;
use crate::env::{self, EnvReader, TARGET_ON_LEFT_VAR};
use crate::error::{Error, Result};
use crate::files;
use crate::tray::TrayClient;

const LAUNCH_WAIT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchResult {
    NoEmptyFileForExtension,
    AlreadyRunningAndSupportsRefresh,
    StartedNewInstance,
    TooManyRunningDiffTools,
    NoDiffToolFound,
    Disabled,
}

impl fmt::Display for LaunchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Decides whether and how to open a diff tool for a received/verified pair.
pub struct DiffRunner {
    disabled: bool,
    tools: Tools,
    counter: InstanceCounter,
    processes: ProcessRegistry,
    tray: TrayClient,
    launch_wait: Duration,
}

impl DiffRunner {
    pub fn new(tools: Tools, counter: InstanceCounter, processes: ProcessRegistry, tray: TrayClient) -> Self {
        Self {
            disabled: false,
            tools,
            counter,
            processes,
            tray,
            launch_wait: LAUNCH_WAIT,
        }
    }

    pub fn from_env(env: Arc<dyn EnvReader>) -> Result<Self> {
        Self::from_config(env, &AppConfig::default())
    }

    /// Builds a runner from the environment. A disabled runner never resolves tools.
    ///
    /// An explicit `DiffEngine_TargetOnLeft` in `env` replaces the process-wide placement.
    pub fn from_config(env: Arc<dyn EnvReader>, config: &AppConfig) -> Result<Self> {
        if let Some(target_on_left) = env::read_bool(env.as_ref(), TARGET_ON_LEFT_VAR)? {
            position::set_target_on_left(target_on_left);
        }

        if env::is_disabled(env.as_ref()) {
            debug!("Diff launching is disabled");
            return Ok(Self::new(
                Tools::empty(),
                InstanceCounter::default(),
                ProcessRegistry::default(),
                TrayClient::new(),
            )
            .disable());
        }

        let finder = Finder::new(Arc::clone(&env));
        let tools = Tools::from_env(env.as_ref(), &finder, &config.tool_order)?;
        let counter = InstanceCounter::from_env(env.as_ref(), config.max_instances)?;
        Ok(Self::new(tools, counter, ProcessRegistry::snapshot(), TrayClient::new()))
    }

    pub fn disable(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn with_launch_wait(mut self, wait: Duration) -> Self {
        self.launch_wait = wait;
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn tools(&self) -> &Tools {
        &self.tools
    }

    /// Launches the tool registered for the temp file's extension.
    pub fn launch(&self, temp: &Path, target: &Path) -> Result<LaunchResult> {
        if self.disabled {
            return Ok(self.exit(temp, target, LaunchResult::Disabled));
        }
        guard_files(temp, target)?;
        let extension = files::file_extension(&temp.to_string_lossy());
        let tool = self.tools.find_for_extension(&extension);
        self.inner_launch(tool, temp, target)
    }

    pub fn launch_tool(&self, kind: ToolKind, temp: &Path, target: &Path) -> Result<LaunchResult> {
        if self.disabled {
            return Ok(self.exit(temp, target, LaunchResult::Disabled));
        }
        guard_files(temp, target)?;
        self.inner_launch(self.tools.find_by_kind(kind), temp, target)
    }

    fn inner_launch(&self, tool: Option<Arc<ResolvedTool>>, temp: &Path, target: &Path) -> Result<LaunchResult> {
        let Some(tool) = tool else {
            return Ok(self.exit(temp, target, LaunchResult::NoDiffToolFound));
        };

        if tool.requires_target && !target.exists() && !files::try_create_file(target, true)? {
            return Ok(self.exit(temp, target, LaunchResult::NoEmptyFileForExtension));
        }

        let temp_str = temp.to_string_lossy();
        let target_str = target.to_string_lossy();
        let arguments = tool.arguments(&temp_str, &target_str);
        let command = tool.build_command(&temp_str, &target_str);
        let exe = tool.exe_path.to_string_lossy();
        let can_kill = !tool.is_mdi;

        if let Some(existing) = self.processes.find(&command) {
            if tool.auto_refresh {
                self.tray
                    .send_move(temp, target, &exe, &arguments, can_kill, i64::from(existing.pid));
                return Ok(LaunchResult::AlreadyRunningAndSupportsRefresh);
            }
            if !tool.is_mdi {
                self.processes.kill(&command);
            }
        }

        if self.counter.reached_max() {
            self.tray.send_move(temp, target, &exe, &arguments, can_kill, 0);
            return Ok(LaunchResult::TooManyRunningDiffTools);
        }

        let pid = self.launch_process(&tool, &arguments);
        self.tray
            .send_move(temp, target, &exe, &arguments, can_kill, i64::from(pid));
        Ok(LaunchResult::StartedNewInstance)
    }

    fn exit(&self, temp: &Path, target: &Path, result: LaunchResult) -> LaunchResult {
        self.tray.send_move(temp, target, "", &[], false, -1);
        result
    }

    /// Spawns the tool detached and waits a bounded time for its pid. Returns 0 on failure.
    fn launch_process(&self, tool: &ResolvedTool, arguments: &[String]) -> u32 {
        let (tx, rx) = mpsc::channel();
        let exe = tool.exe_path.clone();
        let args = arguments.to_vec();
        thread::spawn(move || {
            let spawned = Command::new(&exe)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .map(|child| child.id());
            let _ = tx.send(spawned);
        });

        match rx.recv_timeout(self.launch_wait) {
            Ok(Ok(pid)) => {
                info!("Launched {} (pid {})", tool.name, pid);
                pid
            }
            Ok(Err(e)) => {
                warn!(
                    "Failed to launch diff tool. {} {}: {}",
                    tool.exe_path.display(),
                    arguments.join(" "),
                    e
                );
                0
            }
            Err(_) => {
                warn!("Timed out waiting for {} to start", tool.exe_path.display());
                0
            }
        }
    }

    /// Closes a non-MDI tool previously opened for this pair.
    pub fn kill(&self, temp: &Path, target: &Path) {
        if self.disabled {
            return;
        }
        let temp_str = temp.to_string_lossy();
        let extension = files::file_extension(&temp_str);
        let Some(tool) = self.tools.find_for_extension(&extension) else {
            info!("Extension not found. {}", extension);
            return;
        };
        if tool.is_mdi {
            info!("DiffTool is Mdi so not killing. diffTool: {}", tool.exe_path.display());
            return;
        }
        let command = tool.build_command(&temp_str, &target.to_string_lossy());
        self.processes.kill(&command);
    }
}

impl DiffLauncher for DiffRunner {
    fn launch(&self, temp: &Path, target: &Path) -> Result<LaunchResult> {
        DiffRunner::launch(self, temp, target)
    }

    fn kill(&self, temp: &Path, target: &Path) {
        DiffRunner::kill(self, temp, target)
    }

    fn notify_delete(&self, file: &Path) {
        self.tray.send_delete(file);
    }
}

fn guard_files(temp: &Path, target: &Path) -> Result<()> {
    if !temp.exists() {
        return Err(Error::MissingFile(temp.to_path_buf()));
    }
    if target.as_os_str().is_empty() {
        return Err(Error::Other("Target file path must not be empty".to_string()));
    }
    Ok(())
}
