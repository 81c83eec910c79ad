use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::files;
use crate::verify::engine::{Engine, VerifyResult};
use crate::verify::namer::{self, SnapshotLocation, TestIdentity};
use crate::verify::scrubber::fix_newlines;
use crate::verify::settings::VerifySettings;
use crate::verify::target::{self, Snapshot, Target};

/// Verifies one value (plus any appended files) for one test.
///
/// Creating a verifier claims the file prefix and deletes received files left by earlier runs.
pub struct Verifier {
    identity: TestIdentity,
    settings: VerifySettings,
    location: SnapshotLocation,
    verified_files: Vec<PathBuf>,
}

impl Verifier {
    pub fn new(identity: TestIdentity, settings: VerifySettings) -> Result<Self> {
        if let Some(extension) = &settings.extension {
            files::guard_extension(extension)?;
        }

        let location = SnapshotLocation::resolve(&identity, &settings)?;
        if !settings.unique_prefix_disabled {
            namer::claim_prefix(&location.prefix)?;
        }

        let verified_files = location.verified_files();
        for received in location.received_files() {
            debug!("Deleting stale {}", received.display());
            files::delete_if_exists(&received)?;
        }

        settings.run_before_verify();
        Ok(Self {
            identity,
            settings,
            location,
            verified_files,
        })
    }

    pub fn location(&self) -> &SnapshotLocation {
        &self.location
    }

    pub fn verify(self, value: impl Into<Snapshot>) -> Result<VerifyResult> {
        match self.render(value.into()) {
            Ok(target) => self.verify_targets(vec![target]),
            Err(e) => {
                self.settings.run_after_verify();
                Err(e)
            }
        }
    }

    /// Serializes with serde and verifies the indented JSON.
    pub fn verify_json<T: Serialize + ?Sized>(self, value: &T) -> Result<VerifyResult> {
        let snapshot = Snapshot::json(value)?;
        self.verify(snapshot)
    }

    pub fn verify_bytes(self, extension: &str, bytes: &[u8]) -> Result<VerifyResult> {
        let target = Target::binary(extension, bytes)?;
        self.verify_targets(vec![target])
    }

    pub fn verify_targets(self, mut targets: Vec<Target>) -> Result<VerifyResult> {
        targets.extend(self.settings.appended.iter().cloned());
        let outcome = self.run(&targets);
        self.settings.run_after_verify();
        outcome
    }

    fn run(&self, targets: &[Target]) -> Result<VerifyResult> {
        let mut engine = Engine::new(
            &self.identity,
            &self.settings,
            &self.location.directory,
            &self.location.prefix,
            self.verified_files.clone(),
        );
        engine.handle_results(targets)?;
        engine.finalize()
    }

    fn render(&self, snapshot: Snapshot) -> Result<Target> {
        match snapshot {
            Snapshot::Primitive(value) | Snapshot::Text(value) | Snapshot::Display(value) => {
                Target::text(self.settings.extension_or_txt(), text_or_placeholder(value))
            }
            Snapshot::Custom { value, extension } => {
                Target::text(&extension, text_or_placeholder(value))
            }
            Snapshot::Structured(value) => {
                if self.settings.extension.is_some() {
                    return Err(Error::Other(
                        "use_extension only applies to text and custom snapshots. \
                         Structured values are written as txt, or json with strict_json."
                            .to_string(),
                    ));
                }
                let extension = if self.settings.strict_json { "json" } else { "txt" };
                let scrubbed = target::scrub_value(
                    value,
                    self.settings.scrubber(),
                    self.settings.scrub_guids,
                    self.settings.scrub_times,
                );
                Target::text(extension, target::to_pretty_json(&scrubbed)?)
            }
        }
    }
}

fn text_or_placeholder(value: String) -> String {
    if value.is_empty() {
        return "emptyString".to_string();
    }
    fix_newlines(&value)
}

/// Verifies `value` and panics with the failure report on any error.
#[track_caller]
pub fn assert_verified(
    identity: TestIdentity,
    settings: VerifySettings,
    value: impl Into<Snapshot>,
) -> VerifyResult {
    match Verifier::new(identity, settings).and_then(|verifier| verifier.verify(value)) {
        Ok(result) => result,
        Err(e) => panic!("{}", e),
    }
}
