use tracing::{debug, info};

use crate::platform;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    pub pid: u32,
    pub command: String,
}

/// One-time snapshot of running processes and their command lines.
///
/// The snapshot is taken when the registry is created and never refreshed; liveness is
/// re-checked against the OS whenever an entry is used.
#[derive(Debug, Clone, Default)]
pub struct ProcessRegistry {
    commands: Vec<ProcessCommand>,
}

impl ProcessRegistry {
    pub fn snapshot() -> Self {
        let commands: Vec<ProcessCommand> = platform::list_processes()
            .into_iter()
            .map(|(pid, command)| ProcessCommand { pid, command })
            .collect();
        debug!("Captured {} process command lines", commands.len());
        Self { commands }
    }

    pub fn with_commands(commands: Vec<ProcessCommand>) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &[ProcessCommand] {
        &self.commands
    }

    /// Live process whose command line equals `command`.
    pub fn find(&self, command: &str) -> Option<&ProcessCommand> {
        let command = normalize_command(command);
        self.commands
            .iter()
            .find(|entry| entry.command == command && platform::is_pid_alive(entry.pid))
    }

    /// Terminates every process whose command line equals `command`.
    pub fn kill(&self, command: &str) -> usize {
        let command = normalize_command(command);
        let matching: Vec<&ProcessCommand> = self
            .commands
            .iter()
            .filter(|entry| entry.command == command)
            .collect();
        info!("Kill: {}. Matching count: {}", command, matching.len());

        matching
            .into_iter()
            .filter(|entry| terminate_if_exists(entry.pid))
            .count()
    }

    pub fn is_running(&self, pid: u32) -> bool {
        platform::is_pid_alive(pid)
    }
}

pub fn terminate_if_exists(pid: u32) -> bool {
    if !platform::is_pid_alive(pid) {
        info!("Process not valid. Id: {}.", pid);
        return false;
    }
    let terminated = platform::terminate_pid(pid);
    if terminated {
        info!("TerminateProcess. Id: {}.", pid);
    } else {
        info!("Failed to kill process with id {}", pid);
    }
    terminated
}

/// Process tables outside Windows report arguments without the quoting used to build them.
pub fn normalize_command(command: &str) -> String {
    if cfg!(target_os = "windows") {
        command.to_string()
    } else {
        command.replace('"', "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn own_process(command: &str) -> ProcessCommand {
        ProcessCommand {
            pid: std::process::id(),
            command: command.to_string(),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_find_strips_quotes() {
        let registry = ProcessRegistry::with_commands(vec![own_process("/usr/bin/tool a b")]);
        let found = registry.find("\"/usr/bin/tool\" a b").unwrap();
        assert_eq!(found.pid, std::process::id());
    }

    #[test]
    fn test_find_requires_exact_command() {
        let registry = ProcessRegistry::with_commands(vec![own_process("tool a b")]);
        assert!(registry.find("tool a").is_none());
        assert!(registry.find("tool a b c").is_none());
    }

    #[test]
    fn test_find_skips_dead_pids() {
        let registry = ProcessRegistry::with_commands(vec![ProcessCommand {
            pid: u32::MAX - 1,
            command: "tool".to_string(),
        }]);
        assert!(registry.find("tool").is_none());
    }

    #[test]
    fn test_kill_without_match_is_noop() {
        let registry = ProcessRegistry::with_commands(vec![own_process("tool a b")]);
        assert_eq!(registry.kill("other"), 0);
    }
}
