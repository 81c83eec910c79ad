//! Fire-and-forget notifications to a companion tray application on localhost.

use std::io::Write;
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

pub const SERVER_PORT: u16 = 3492;

const CONNECT_TIMEOUT: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MovePayload {
    #[serde(rename = "Type")]
    pub kind: &'static str,
    pub temp: String,
    pub target: String,
    pub exe: String,
    pub arguments: Vec<String>,
    pub can_kill: bool,
    pub process_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeletePayload {
    #[serde(rename = "Type")]
    pub kind: &'static str,
    pub file: String,
}

#[derive(Debug, Clone)]
pub struct TrayClient {
    address: Option<SocketAddr>,
}

impl Default for TrayClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TrayClient {
    pub fn new() -> Self {
        Self::with_address(SocketAddr::from((Ipv4Addr::LOCALHOST, SERVER_PORT)))
    }

    pub fn with_address(address: SocketAddr) -> Self {
        Self {
            address: Some(address),
        }
    }

    /// A client that never sends anything.
    pub fn disabled() -> Self {
        Self { address: None }
    }

    pub fn connects(&self) -> bool {
        self.address
            .map(|address| TcpStream::connect_timeout(&address, CONNECT_TIMEOUT).is_ok())
            .unwrap_or(false)
    }

    pub fn send_move(
        &self,
        temp: &Path,
        target: &Path,
        exe: &str,
        arguments: &[String],
        can_kill: bool,
        process_id: i64,
    ) {
        let payload = MovePayload {
            kind: "Move",
            temp: full_path(temp),
            target: full_path(target),
            exe: exe.to_string(),
            arguments: arguments.to_vec(),
            can_kill,
            process_id,
        };
        self.send(&payload);
    }

    pub fn send_delete(&self, file: &Path) {
        let payload = DeletePayload {
            kind: "Delete",
            file: full_path(file),
        };
        self.send(&payload);
    }

    fn send<T: Serialize>(&self, payload: &T) {
        let Some(address) = self.address else {
            return;
        };
        let data = match serde_json::to_vec(payload) {
            Ok(data) => data,
            Err(e) => {
                debug!("Failed to serialize tray payload: {}", e);
                return;
            }
        };
        let mut stream = match TcpStream::connect_timeout(&address, CONNECT_TIMEOUT) {
            Ok(stream) => stream,
            Err(e) => {
                debug!("Could not get a connection to the tray app: {}", e);
                return;
            }
        };
        if let Err(e) = stream.write_all(&data) {
            debug!("Failed to write data to the tray app: {}", e);
        }
    }
}

fn full_path(path: &Path) -> String {
    let absolute: PathBuf = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    absolute.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    fn receive_one(listener: TcpListener) -> thread::JoinHandle<serde_json::Value> {
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = String::new();
            stream.read_to_string(&mut buf).unwrap();
            serde_json::from_str(&buf).unwrap()
        })
    }

    #[cfg(unix)]
    #[test]
    fn test_send_move_payload() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TrayClient::with_address(listener.local_addr().unwrap());
        let handle = receive_one(listener);

        client.send_move(
            Path::new("/tmp/a.received.txt"),
            Path::new("/tmp/a.verified.txt"),
            "/usr/bin/meld",
            &["x".to_string()],
            true,
            42,
        );

        let value = handle.join().unwrap();
        assert_eq!(value["Type"], "Move");
        assert_eq!(value["Temp"], "/tmp/a.received.txt");
        assert_eq!(value["Target"], "/tmp/a.verified.txt");
        assert_eq!(value["Exe"], "/usr/bin/meld");
        assert_eq!(value["Arguments"][0], "x");
        assert_eq!(value["CanKill"], true);
        assert_eq!(value["ProcessId"], 42);
    }

    #[cfg(unix)]
    #[test]
    fn test_send_delete_payload() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TrayClient::with_address(listener.local_addr().unwrap());
        let handle = receive_one(listener);

        client.send_delete(Path::new("/tmp/old.verified.txt"));

        let value = handle.join().unwrap();
        assert_eq!(value["Type"], "Delete");
        assert_eq!(value["File"], "/tmp/old.verified.txt");
    }

    #[test]
    fn test_unreachable_tray_is_ignored() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);
        let client = TrayClient::with_address(address);
        assert!(!client.connects());
        client.send_delete(Path::new("/tmp/x"));
        TrayClient::disabled().send_delete(Path::new("/tmp/x"));
    }
}
