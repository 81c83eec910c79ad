use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::diff::{self, DiffLauncher};
use crate::error::{Error, Result};
use crate::files;
use crate::verify::comparer::{self, Equality, EqualityResult};
use crate::verify::file_pair::FilePair;
use crate::verify::namer::TestIdentity;
use crate::verify::report::FailureReport;
use crate::verify::settings::VerifySettings;
use crate::verify::target::Target;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotEqualFile {
    pub file: FilePair,
    pub message: Option<String>,
}

/// How each target of a verification was classified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyResult {
    pub new_files: Vec<FilePair>,
    pub not_equal_files: Vec<NotEqualFile>,
    pub equal_files: Vec<FilePair>,
    /// Verified files no target produced this run.
    pub deleted_files: Vec<PathBuf>,
}

impl VerifyResult {
    pub fn has_changes(&self) -> bool {
        !self.new_files.is_empty() || !self.not_equal_files.is_empty() || !self.deleted_files.is_empty()
    }
}

/// Classifies targets against the files on disk, then accepts, launches or fails.
pub struct Engine<'a> {
    identity: &'a TestIdentity,
    settings: &'a VerifySettings,
    directory: &'a Path,
    prefix: &'a Path,
    launcher: Option<Arc<dyn DiffLauncher>>,
    result: VerifyResult,
}

impl<'a> Engine<'a> {
    pub fn new(
        identity: &'a TestIdentity,
        settings: &'a VerifySettings,
        directory: &'a Path,
        prefix: &'a Path,
        verified_files: Vec<PathBuf>,
    ) -> Self {
        Self {
            identity,
            settings,
            directory,
            prefix,
            launcher: settings.launcher.clone(),
            result: VerifyResult {
                deleted_files: verified_files,
                ..VerifyResult::default()
            },
        }
    }

    /// One target uses the plain prefix; several get `.NN` indices.
    pub fn handle_results(&mut self, targets: &[Target]) -> Result<()> {
        if let [target] = targets {
            let pair = FilePair::new(target.extension(), self.prefix);
            let result = self.get_result(&pair, target, false)?;
            self.handle_compare_result(result, pair);
            return Ok(());
        }

        let mut text_has_failed = false;
        for (index, target) in targets.iter().enumerate() {
            let pair = FilePair::indexed(target.extension(), self.prefix, index);
            let result = self.get_result(&pair, target, text_has_failed)?;
            if pair.is_text && result.equality != Equality::Equal {
                text_has_failed = true;
            }
            self.handle_compare_result(result, pair);
        }
        Ok(())
    }

    fn get_result(&self, pair: &FilePair, target: &Target, previous_text_failed: bool) -> Result<EqualityResult> {
        match target {
            Target::Text { extension, data } => {
                let mut scrubbed = data.clone();
                self.settings
                    .scrubber()
                    .apply(extension, &mut scrubbed, self.settings);
                comparer::compare_text(pair, &scrubbed, self.settings)
            }
            Target::Binary { data, .. } => {
                comparer::compare_binary(pair, data, self.settings, previous_text_failed)
            }
        }
    }

    fn handle_compare_result(&mut self, result: EqualityResult, pair: FilePair) {
        self.result.deleted_files.retain(|path| path != &pair.verified_path);
        match result.equality {
            Equality::New => self.result.new_files.push(pair),
            Equality::NotEqual => self.result.not_equal_files.push(NotEqualFile {
                file: pair,
                message: result.message,
            }),
            Equality::Equal => self.result.equal_files.push(pair),
        }
    }

    /// Applies the outcome and fails with a report unless everything matched or was accepted.
    pub fn finalize(mut self) -> Result<VerifyResult> {
        self.process_equals()?;

        if !self.result.has_changes() {
            return Ok(self.result);
        }

        self.process_deletes()?;
        self.process_new()?;
        self.process_not_equals()?;

        if self.settings.auto_verify {
            info!("Auto verified {}", self.prefix.display());
            return Ok(self.result);
        }

        let report = FailureReport {
            test_name: Some(self.identity.test_name.as_str()),
            test_case: self.settings.test_case.as_deref(),
            directory: self.directory,
            new_files: &self.result.new_files,
            not_equal_files: &self.result.not_equal_files,
            deleted_files: &self.result.deleted_files,
            equal_files: &self.result.equal_files,
            omit_content: self.settings.omit_content_from_error,
        }
        .build();
        Err(Error::Mismatch(report))
    }

    fn process_equals(&mut self) -> Result<()> {
        if !self.settings.diff_disabled || self.result.equal_files.is_empty() {
            return Ok(());
        }
        let launcher = self.launcher()?;
        for pair in &self.result.equal_files {
            launcher.kill(&pair.received_path, &pair.verified_path);
        }
        Ok(())
    }

    fn process_deletes(&mut self) -> Result<()> {
        let deleted = self.result.deleted_files.clone();
        for file in &deleted {
            self.settings.run_verify_delete(file);
            if self.settings.ci_detected && !self.settings.auto_verify {
                continue;
            }
            debug!("Deleting orphaned {}", file.display());
            files::delete_if_exists(file)?;
            if !self.settings.auto_verify {
                self.launcher()?.notify_delete(file);
            }
        }
        Ok(())
    }

    fn process_new(&mut self) -> Result<()> {
        let new_files = self.result.new_files.clone();
        for pair in &new_files {
            self.settings.run_first_verify(pair);
            self.run_diff_auto_check(pair)?;
        }
        Ok(())
    }

    fn process_not_equals(&mut self) -> Result<()> {
        let not_equal = self.result.not_equal_files.clone();
        for item in &not_equal {
            self.settings
                .run_verify_mismatch(&item.file, item.message.as_deref());
            self.run_diff_auto_check(&item.file)?;
        }
        Ok(())
    }

    fn run_diff_auto_check(&mut self, pair: &FilePair) -> Result<()> {
        if self.settings.auto_verify {
            files::delete_if_exists(&pair.verified_path)?;
            files::move_file(&pair.received_path, &pair.verified_path)?;
            return Ok(());
        }
        if self.settings.ci_detected || self.settings.diff_disabled {
            return Ok(());
        }
        match self
            .launcher()?
            .launch(&pair.received_path, &pair.verified_path)
        {
            Ok(result) => debug!("Diff launch for {}: {}", pair.received_name, result),
            Err(e) => warn!("Failed to launch diff for {}: {}", pair.received_name, e),
        }
        Ok(())
    }

    /// The process-wide launcher unless the settings supply one.
    fn launcher(&mut self) -> Result<Arc<dyn DiffLauncher>> {
        if let Some(launcher) = &self.launcher {
            return Ok(Arc::clone(launcher));
        }
        let runner = diff::shared_launcher(Arc::clone(&self.settings.env), &self.settings.config)?;
        self.launcher = Some(Arc::clone(&runner));
        Ok(runner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::LaunchResult;
    use crate::env::MapEnv;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct Recorder {
        launched: Mutex<Vec<PathBuf>>,
        killed: Mutex<Vec<PathBuf>>,
        deleted: Mutex<Vec<PathBuf>>,
    }

    impl DiffLauncher for Recorder {
        fn launch(&self, temp: &Path, _target: &Path) -> Result<LaunchResult> {
            self.launched.lock().unwrap().push(temp.to_path_buf());
            Ok(LaunchResult::StartedNewInstance)
        }

        fn kill(&self, temp: &Path, _target: &Path) {
            self.killed.lock().unwrap().push(temp.to_path_buf());
        }

        fn notify_delete(&self, file: &Path) {
            self.deleted.lock().unwrap().push(file.to_path_buf());
        }
    }

    fn settings_with(recorder: &Arc<Recorder>) -> VerifySettings {
        VerifySettings::with_env(Arc::new(MapEnv::new())).with_launcher(recorder.clone())
    }

    #[test]
    fn test_multiple_targets_use_indexed_names() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("lib.many");
        let identity = TestIdentity::new("lib.rs", "test_many");
        let recorder = Arc::new(Recorder::default());
        let settings = settings_with(&recorder);

        let targets = vec![
            Target::text("txt", "first").unwrap(),
            Target::binary("png", vec![1u8, 2]).unwrap(),
        ];
        let mut engine = Engine::new(&identity, &settings, dir.path(), &prefix, Vec::new());
        engine.handle_results(&targets).unwrap();
        let err = engine.finalize().unwrap_err();

        assert!(dir.path().join("lib.many.00.received.txt").exists());
        assert!(dir.path().join("lib.many.01.received.png").exists());
        assert!(matches!(err, Error::Mismatch(_)));
        assert_eq!(recorder.launched.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_orphans_are_deleted_reported_and_sent_to_tray() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("lib.orphan");
        let stale = dir.path().join("lib.orphan.01.verified.txt");
        let kept = dir.path().join("lib.orphan.verified.txt");
        fs::write(&stale, "old").unwrap();
        fs::write(&kept, "same").unwrap();

        let identity = TestIdentity::new("lib.rs", "test_orphan");
        let recorder = Arc::new(Recorder::default());
        let settings = settings_with(&recorder);
        let mut engine = Engine::new(&identity, &settings, dir.path(), &prefix, vec![stale.clone(), kept]);
        engine
            .handle_results(&[Target::text("txt", "same").unwrap()])
            .unwrap();

        let Err(Error::Mismatch(report)) = engine.finalize() else {
            panic!("orphan should fail the verification");
        };
        assert!(report.contains("Delete:\n  - lib.orphan.01.verified.txt\n"));
        assert!(report.contains("Equal:\n"));
        assert_eq!(*recorder.deleted.lock().unwrap(), vec![stale.clone()]);
        assert!(!stale.exists());
    }

    #[test]
    fn test_orphans_are_kept_on_build_server() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("lib.ci");
        let stale = dir.path().join("lib.ci.01.verified.txt");
        fs::write(&stale, "old").unwrap();

        let identity = TestIdentity::new("lib.rs", "test_ci");
        let recorder = Arc::new(Recorder::default());
        let settings = VerifySettings::with_env(Arc::new(MapEnv::new().with("CI", "true")))
            .with_launcher(recorder.clone());
        let mut engine = Engine::new(&identity, &settings, dir.path(), &prefix, vec![stale.clone()]);
        engine
            .handle_results(&[Target::text("txt", "new").unwrap()])
            .unwrap();

        assert!(matches!(engine.finalize(), Err(Error::Mismatch(_))));
        assert!(stale.exists());
        assert!(recorder.deleted.lock().unwrap().is_empty());
        assert!(recorder.launched.lock().unwrap().is_empty());
    }

    #[test]
    fn test_auto_verify_accepts_and_removes_orphans() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("lib.auto");
        let stale = dir.path().join("lib.auto.03.verified.txt");
        fs::write(&stale, "old").unwrap();

        let identity = TestIdentity::new("lib.rs", "test_auto");
        let recorder = Arc::new(Recorder::default());
        let settings = settings_with(&recorder).auto_verify();
        let mut engine = Engine::new(&identity, &settings, dir.path(), &prefix, vec![stale.clone()]);
        engine
            .handle_results(&[Target::text("txt", "value").unwrap()])
            .unwrap();
        let result = engine.finalize().unwrap();

        assert_eq!(result.new_files.len(), 1);
        assert!(!stale.exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("lib.auto.verified.txt")).unwrap(),
            "value"
        );
        assert!(!dir.path().join("lib.auto.received.txt").exists());
        assert!(recorder.launched.lock().unwrap().is_empty());
    }

    #[test]
    fn test_ci_skips_launch() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("lib.ci");
        let identity = TestIdentity::new("lib.rs", "test_ci");
        let recorder = Arc::new(Recorder::default());
        let settings = VerifySettings::with_env(Arc::new(MapEnv::new().with("GITLAB_CI", "1")))
            .with_launcher(recorder.clone());
        let mut engine = Engine::new(&identity, &settings, dir.path(), &prefix, Vec::new());
        engine
            .handle_results(&[Target::text("txt", "value").unwrap()])
            .unwrap();

        assert!(engine.finalize().is_err());
        assert!(recorder.launched.lock().unwrap().is_empty());
    }

    #[test]
    fn test_disabled_diff_kills_tools_for_equal_files() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("lib.kill");
        fs::write(dir.path().join("lib.kill.verified.txt"), "same").unwrap();
        let identity = TestIdentity::new("lib.rs", "test_kill");
        let recorder = Arc::new(Recorder::default());
        let settings = settings_with(&recorder).disable_diff();
        let mut engine = Engine::new(
            &identity,
            &settings,
            dir.path(),
            &prefix,
            vec![dir.path().join("lib.kill.verified.txt")],
        );
        engine
            .handle_results(&[Target::text("txt", "same").unwrap()])
            .unwrap();

        let result = engine.finalize().unwrap();
        assert_eq!(result.equal_files.len(), 1);
        assert_eq!(
            *recorder.killed.lock().unwrap(),
            vec![dir.path().join("lib.kill.received.txt")]
        );
    }
}
