use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

use chrono::{TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use snapdiff_core::{
    DiffLauncher, Error, LaunchResult, MapEnv, Result, TestIdentity, VerifySettings, Verifier,
};

#[derive(Default)]
struct RecordingLauncher {
    launches: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl DiffLauncher for RecordingLauncher {
    fn launch(&self, temp: &Path, target: &Path) -> Result<LaunchResult> {
        self.launches
            .lock()
            .unwrap()
            .push((temp.to_path_buf(), target.to_path_buf()));
        Ok(LaunchResult::StartedNewInstance)
    }
}

fn settings(dir: &Path, launcher: &Arc<RecordingLauncher>) -> VerifySettings {
    VerifySettings::with_env(Arc::new(MapEnv::new()))
        .with_launcher(launcher.clone())
        .use_directory(dir)
        .disable_unique_prefix()
}

fn identity(name: &str) -> TestIdentity {
    TestIdentity::new("tests/lifecycle.rs", name)
}

#[test]
fn test_new_snapshot_writes_received_and_launches() {
    let dir = tempdir().unwrap();
    let launcher = Arc::new(RecordingLauncher::default());

    let verifier = Verifier::new(identity("test_new"), settings(dir.path(), &launcher)).unwrap();
    let Err(Error::Mismatch(report)) = verifier.verify("hello") else {
        panic!("a new snapshot must fail");
    };

    let received = dir.path().join("lifecycle.new.received.txt");
    let verified = dir.path().join("lifecycle.new.verified.txt");
    assert_eq!(fs::read_to_string(&received).unwrap(), "hello");
    assert!(!verified.exists());
    assert!(report.contains("New:\n  - Received: lifecycle.new.received.txt\n"));
    assert!(report.contains("FileContent:\n\nNew:\n\nReceived: lifecycle.new.received.txt\nhello\n"));
    assert_eq!(*launcher.launches.lock().unwrap(), vec![(received, verified)]);
}

#[test]
fn test_equal_snapshot_passes_without_received_file() {
    let dir = tempdir().unwrap();
    let launcher = Arc::new(RecordingLauncher::default());
    fs::write(dir.path().join("lifecycle.equal.verified.txt"), "hello").unwrap();

    let result = Verifier::new(identity("test_equal"), settings(dir.path(), &launcher))
        .unwrap()
        .verify("hello")
        .unwrap();

    assert_eq!(result.equal_files.len(), 1);
    assert!(!result.has_changes());
    assert!(!dir.path().join("lifecycle.equal.received.txt").exists());
    assert!(launcher.launches.lock().unwrap().is_empty());
}

#[test]
fn test_changed_snapshot_reports_both_sides() {
    let dir = tempdir().unwrap();
    let launcher = Arc::new(RecordingLauncher::default());
    fs::write(dir.path().join("lifecycle.changed.verified.txt"), "before").unwrap();

    let Err(Error::Mismatch(report)) = Verifier::new(identity("test_changed"), settings(dir.path(), &launcher))
        .unwrap()
        .verify("after")
    else {
        panic!("a changed snapshot must fail");
    };

    assert!(report.contains("NotEqual:\n  - Received: lifecycle.changed.received.txt\n"));
    assert!(report.contains(
        "Received: lifecycle.changed.received.txt\nafter\nVerified: lifecycle.changed.verified.txt\nbefore\n"
    ));
    assert_eq!(
        fs::read_to_string(dir.path().join("lifecycle.changed.received.txt")).unwrap(),
        "after"
    );
    assert_eq!(launcher.launches.lock().unwrap().len(), 1);
}

#[test]
fn test_classification_is_idempotent() {
    let dir = tempdir().unwrap();
    let launcher = Arc::new(RecordingLauncher::default());

    for _ in 0..2 {
        let result = Verifier::new(identity("test_twice"), settings(dir.path(), &launcher))
            .unwrap()
            .verify("same output");
        assert!(matches!(result, Err(Error::Mismatch(_))));
        assert_eq!(
            fs::read_to_string(dir.path().join("lifecycle.twice.received.txt")).unwrap(),
            "same output"
        );
    }

    fs::rename(
        dir.path().join("lifecycle.twice.received.txt"),
        dir.path().join("lifecycle.twice.verified.txt"),
    )
    .unwrap();
    for _ in 0..2 {
        let result = Verifier::new(identity("test_twice"), settings(dir.path(), &launcher))
            .unwrap()
            .verify("same output")
            .unwrap();
        assert_eq!(result.equal_files.len(), 1);
    }
}

#[test]
fn test_prefix_reuse_is_rejected_by_default() {
    let dir = tempdir().unwrap();
    let launcher = Arc::new(RecordingLauncher::default());
    let strict = || {
        VerifySettings::with_env(Arc::new(MapEnv::new()))
            .with_launcher(launcher.clone())
            .use_directory(dir.path())
    };

    let _first = Verifier::new(identity("test_reused"), strict()).unwrap();
    assert!(matches!(
        Verifier::new(identity("test_reused"), strict()),
        Err(Error::PrefixInUse(_))
    ));
    assert!(Verifier::new(identity("test_reused"), strict().test_case("other")).is_ok());
}

#[derive(Serialize)]
struct Order {
    id: Uuid,
    parent: Uuid,
    customer: Uuid,
    placed: chrono::DateTime<Utc>,
    total: f64,
}

#[test]
fn test_structured_values_get_stable_placeholders() {
    let dir = tempdir().unwrap();
    let launcher = Arc::new(RecordingLauncher::default());
    let id = Uuid::new_v4();
    let order = Order {
        id,
        parent: id,
        customer: Uuid::new_v4(),
        placed: Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap(),
        total: 12.5,
    };

    let result = Verifier::new(
        identity("test_order"),
        settings(dir.path(), &launcher).auto_verify(),
    )
    .unwrap()
    .verify_json(&order)
    .unwrap();

    assert_eq!(result.new_files[0].verified_name, "lifecycle.order.verified.txt");
    assert_eq!(
        fs::read_to_string(dir.path().join("lifecycle.order.verified.txt")).unwrap(),
        "{\n    \"customer\": \"Guid_1\",\n    \"id\": \"Guid_2\",\n    \"parent\": \"Guid_2\",\n    \"placed\": \"Time_1\",\n    \"total\": 12.5\n}"
    );
}

#[test]
fn test_scrubbers_replace_directories_and_lines() {
    let dir = tempdir().unwrap();
    let launcher = Arc::new(RecordingLauncher::default());
    let home = dirs::home_dir().unwrap_or_else(env::temp_dir);
    let text = format!(
        "path: {}\nElapsed: 15ms\nid: 0f8fad5b-d9cb-469f-a165-70867728950e\n\n",
        home.join("project").display()
    );

    let result = Verifier::new(
        identity("test_scrubbed"),
        settings(dir.path(), &launcher)
            .auto_verify()
            .scrub_lines_containing(&["elapsed"])
            .scrub_lines_containing_any_case(&["ELAPSED"])
            .scrub_inline_guids()
            .scrub_empty_lines(),
    )
    .unwrap()
    .verify(text)
    .unwrap();

    assert_eq!(result.new_files.len(), 1);
    let written = fs::read_to_string(dir.path().join("lifecycle.scrubbed.verified.txt")).unwrap();
    assert!(written.starts_with("path: {"));
    assert!(written.contains("project\n"));
    assert!(!written.contains("Elapsed"));
    assert!(written.ends_with("id: Guid_1\n"));
}

#[test]
fn test_binary_snapshot_round() {
    let dir = tempdir().unwrap();
    let launcher = Arc::new(RecordingLauncher::default());
    fs::write(dir.path().join("lifecycle.image.verified.png"), [1u8, 2, 3]).unwrap();

    let result = Verifier::new(identity("test_image"), settings(dir.path(), &launcher))
        .unwrap()
        .verify_bytes("png", &[1, 2, 3])
        .unwrap();
    assert_eq!(result.equal_files[0].extension, "png");

    let changed = Verifier::new(identity("test_image"), settings(dir.path(), &launcher))
        .unwrap()
        .verify_bytes("png", &[9, 9]);
    let Err(Error::Mismatch(report)) = changed else {
        panic!("changed bytes must fail");
    };
    assert!(report.contains("NotEqual:\n  - Received: lifecycle.image.received.png\n"));
    assert!(!report.contains("FileContent"));
}

#[test]
fn test_mismatch_callback_sees_comparer_message() {
    let dir = tempdir().unwrap();
    let launcher = Arc::new(RecordingLauncher::default());
    fs::write(dir.path().join("lifecycle.callback.verified.txt"), "expected").unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let result = Verifier::new(
        identity("test_callback"),
        settings(dir.path(), &launcher)
            .use_string_comparer(|_, _| {
                snapdiff_core::verify::CompareResult::not_equal(Some("lengths differ".to_string()))
            })
            .on_verify_mismatch(move |pair, message| {
                sink.lock()
                    .unwrap()
                    .push((pair.verified_name.clone(), message.map(str::to_string)));
            }),
    )
    .unwrap()
    .verify("actual");

    let Err(Error::Mismatch(report)) = result else {
        panic!("comparer said not equal");
    };
    assert!(report.contains("Compare Result: lengths differ\n"));
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(
            "lifecycle.callback.verified.txt".to_string(),
            Some("lengths differ".to_string())
        )]
    );
}
