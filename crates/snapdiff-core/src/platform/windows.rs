use winapi::shared::minwindef::{DWORD, FALSE};
use winapi::um::handleapi::CloseHandle;
use winapi::um::processthreadsapi::{GetExitCodeProcess, OpenProcess, TerminateProcess};
use winapi::um::winnt::{PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_TERMINATE};

const STILL_ACTIVE: DWORD = 259;

pub fn is_pid_alive(pid: u32) -> bool {
    // SAFETY: the handle is checked for null and closed before returning.
    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, FALSE, pid);
        if handle.is_null() {
            return false;
        }
        let mut code: DWORD = 0;
        let ok = GetExitCodeProcess(handle, &mut code) != 0;
        CloseHandle(handle);
        ok && code == STILL_ACTIVE
    }
}

pub fn terminate_pid(pid: u32) -> bool {
    // SAFETY: the handle is checked for null and closed before returning.
    unsafe {
        let handle = OpenProcess(PROCESS_TERMINATE, FALSE, pid);
        if handle.is_null() {
            return false;
        }
        let ok = TerminateProcess(handle, 1) != 0;
        CloseHandle(handle);
        ok
    }
}

/// Rows look like `Node,CommandLine,ProcessId`; the command line may itself contain commas.
pub fn parse_wmic_output(stdout: &str) -> Vec<(u32, String)> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("Node,"))
        .filter_map(|line| {
            let (rest, pid) = line.rsplit_once(',')?;
            let pid = pid.trim().parse::<u32>().ok()?;
            let (_node, command) = rest.split_once(',')?;
            if command.is_empty() {
                return None;
            }
            Some((pid, command.to_string()))
        })
        .collect()
}
