//! Snapshot verification: naming, scrubbing, comparison and the received/verified lifecycle.

pub mod comparer;
pub mod counter;
pub mod engine;
pub mod file_pair;
pub mod namer;
pub mod report;
pub mod scrubber;
pub mod settings;
pub mod target;
pub mod verifier;

pub use comparer::{CompareResult, Equality, EqualityResult};
pub use counter::CountHolder;
pub use engine::{NotEqualFile, VerifyResult};
pub use file_pair::FilePair;
pub use namer::{SnapshotLocation, TestIdentity};
pub use scrubber::Scrubber;
pub use settings::VerifySettings;
pub use target::{Snapshot, Target};
pub use verifier::{assert_verified, Verifier};
