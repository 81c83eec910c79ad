#[cfg(target_os = "windows")]
pub mod windows;

use std::process::{Command, Stdio};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Windows,
    Linux,
    MacOs,
}

impl Os {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Os::Windows
        } else if cfg!(target_os = "macos") {
            Os::MacOs
        } else {
            Os::Linux
        }
    }

    /// Name used in snapshot file names when verification is unique per OS.
    pub fn name(&self) -> &'static str {
        match self {
            Os::Windows => "windows",
            Os::Linux => "linux",
            Os::MacOs => "macos",
        }
    }
}

/// Host name of this machine, or an empty string when it cannot be read.
#[cfg(unix)]
pub fn machine_name() -> String {
    let mut buf = [0u8; 256];
    // SAFETY: buf is a valid writable buffer and its length is passed alongside it.
    let result = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if result != 0 {
        return String::new();
    }
    let end = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

#[cfg(not(unix))]
pub fn machine_name() -> String {
    std::env::var("COMPUTERNAME").unwrap_or_default()
}

/// Liveness check that never signals the target.
#[cfg(unix)]
pub fn is_pid_alive(pid: u32) -> bool {
    let Ok(pid_i32) = i32::try_from(pid) else {
        return false;
    };
    if pid_i32 <= 0 {
        return false;
    }
    // SAFETY: signal 0 only checks for process existence.
    let result = unsafe { libc::kill(pid_i32, 0) };
    if result == 0 {
        return true;
    }
    // EPERM: exists, owned by someone else.
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(target_os = "windows")]
pub fn is_pid_alive(pid: u32) -> bool {
    windows::is_pid_alive(pid)
}

#[cfg(unix)]
pub fn terminate_pid(pid: u32) -> bool {
    let Ok(pid_i32) = i32::try_from(pid) else {
        return false;
    };
    if pid_i32 <= 0 {
        return false;
    }
    // SAFETY: plain SIGTERM to a pid that was validated as positive.
    unsafe { libc::kill(pid_i32, libc::SIGTERM) == 0 }
}

#[cfg(target_os = "windows")]
pub fn terminate_pid(pid: u32) -> bool {
    windows::terminate_pid(pid)
}

/// `(pid, command line)` for every process visible to this user.
#[cfg(unix)]
pub fn list_processes() -> Vec<(u32, String)> {
    let output = Command::new("ps")
        .args(["-axww", "-o", "pid=,args="])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output();

    let Ok(output) = output else {
        debug!("Unable to run ps");
        return Vec::new();
    };
    if !output.status.success() {
        return Vec::new();
    }
    parse_ps_output(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(target_os = "windows")]
pub fn list_processes() -> Vec<(u32, String)> {
    let output = Command::new("wmic")
        .args(["process", "get", "ProcessId,CommandLine", "/format:csv"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output();

    let Ok(output) = output else {
        debug!("Unable to run wmic");
        return Vec::new();
    };
    windows::parse_wmic_output(&String::from_utf8_lossy(&output.stdout))
}

pub fn parse_ps_output(stdout: &str) -> Vec<(u32, String)> {
    stdout
        .lines()
        .filter_map(|line| {
            let line = line.trim_start();
            let (pid, command) = line.split_once(char::is_whitespace)?;
            let pid = pid.parse::<u32>().ok()?;
            let command = command.trim();
            if command.is_empty() {
                return None;
            }
            Some((pid, command.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ps_output() {
        let out = "    1 /sbin/init splash\n  42 /usr/bin/meld /tmp/a.txt /tmp/b.txt\n  77 \nbogus line\n";
        let parsed = parse_ps_output(out);
        assert_eq!(
            parsed,
            vec![
                (1, "/sbin/init splash".to_string()),
                (42, "/usr/bin/meld /tmp/a.txt /tmp/b.txt".to_string()),
            ]
        );
    }

    #[test]
    fn test_own_pid_is_alive() {
        assert!(is_pid_alive(std::process::id()));
    }

    #[test]
    fn test_os_name() {
        let name = Os::current().name();
        assert!(["windows", "linux", "macos"].contains(&name));
    }
}
