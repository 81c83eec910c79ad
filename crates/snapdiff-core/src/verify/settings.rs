use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::diff::DiffLauncher;
use crate::env::{self, EnvReader, SystemEnv};
use crate::verify::comparer::CompareResult;
use crate::verify::counter::CountHolder;
use crate::verify::file_pair::FilePair;
use crate::verify::scrubber::{InstanceScrubber, Scrubber};
use crate::verify::target::Target;

pub type StringComparer = Arc<dyn Fn(&str, &str) -> CompareResult + Send + Sync>;
pub type StreamComparer = Arc<dyn Fn(&[u8], &[u8]) -> CompareResult + Send + Sync>;

type Hook = Arc<dyn Fn() + Send + Sync>;
type FileHook = Arc<dyn Fn(&FilePair) + Send + Sync>;
type MismatchHook = Arc<dyn Fn(&FilePair, Option<&str>) + Send + Sync>;
type DeleteHook = Arc<dyn Fn(&Path) + Send + Sync>;

/// Per-verification options, built with chained calls:
///
/// ```no_run
/// use snapdiff_core::VerifySettings;
///
/// let settings = VerifySettings::new()
///     .use_directory("snapshots")
///     .scrub_inline_guids()
///     .scrub_lines_containing(&["Elapsed"]);
/// ```
#[derive(Clone)]
pub struct VerifySettings {
    pub(crate) directory: Option<PathBuf>,
    pub(crate) test_case: Option<String>,
    pub(crate) extension: Option<String>,
    pub(crate) auto_verify: bool,
    pub(crate) diff_disabled: bool,
    pub(crate) ci_detected: bool,
    pub(crate) strict_json: bool,
    pub(crate) scrub_guids: bool,
    pub(crate) scrub_times: bool,
    pub(crate) omit_content_from_error: bool,
    pub(crate) unique_for_arch: bool,
    pub(crate) unique_for_os: bool,
    pub(crate) unique_prefix_disabled: bool,
    instance_scrubbers: Vec<InstanceScrubber>,
    extension_scrubbers: HashMap<String, Vec<InstanceScrubber>>,
    string_comparer: Option<StringComparer>,
    string_comparers: HashMap<String, StringComparer>,
    stream_comparer: Option<StreamComparer>,
    stream_comparers: HashMap<String, StreamComparer>,
    before_verify: Option<Hook>,
    after_verify: Option<Hook>,
    first_verify: Option<FileHook>,
    verify_mismatch: Option<MismatchHook>,
    verify_delete: Option<DeleteHook>,
    pub(crate) appended: Vec<Target>,
    scrubber: Scrubber,
    pub(crate) launcher: Option<Arc<dyn DiffLauncher>>,
    pub(crate) env: Arc<dyn EnvReader>,
    pub(crate) config: AppConfig,
}

impl Default for VerifySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl VerifySettings {
    pub fn new() -> Self {
        Self::with_env(Arc::new(SystemEnv))
    }

    /// CI and disabled detection read from `env` instead of the process environment.
    pub fn with_env(env: Arc<dyn EnvReader>) -> Self {
        let ci_detected = env::is_ci(env.as_ref());
        let diff_disabled = env::is_disabled(env.as_ref());
        Self {
            directory: None,
            test_case: None,
            extension: None,
            auto_verify: false,
            diff_disabled,
            ci_detected,
            strict_json: false,
            scrub_guids: true,
            scrub_times: true,
            omit_content_from_error: false,
            unique_for_arch: false,
            unique_for_os: false,
            unique_prefix_disabled: false,
            instance_scrubbers: Vec::new(),
            extension_scrubbers: HashMap::new(),
            string_comparer: None,
            string_comparers: HashMap::new(),
            stream_comparer: None,
            stream_comparers: HashMap::new(),
            before_verify: None,
            after_verify: None,
            first_verify: None,
            verify_mismatch: None,
            verify_delete: None,
            appended: Vec::new(),
            scrubber: Scrubber::new(Arc::new(CountHolder::new())),
            launcher: None,
            env,
            config: AppConfig::default(),
        }
    }

    /// Seeds defaults from the project configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new().apply_config(config)
    }

    pub fn apply_config(mut self, config: &AppConfig) -> Self {
        if let Some(directory) = &config.directory {
            self.directory = Some(PathBuf::from(directory));
        }
        self.auto_verify |= config.auto_verify;
        self.omit_content_from_error |= config.omit_content_from_error;
        self.unique_for_os |= config.unique_for_os;
        self.unique_for_arch |= config.unique_for_arch;
        self.config = config.clone();
        self
    }

    pub fn use_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn test_case(mut self, name: &str) -> Self {
        self.test_case = Some(name.to_string());
        self
    }

    /// Extension for text and custom targets. Checked when the verifier is created.
    pub fn use_extension(mut self, extension: &str) -> Self {
        self.extension = Some(extension.to_string());
        self
    }

    /// Accepts every received file instead of failing.
    pub fn auto_verify(mut self) -> Self {
        self.auto_verify = true;
        self
    }

    pub fn disable_diff(mut self) -> Self {
        self.diff_disabled = true;
        self
    }

    /// Structured snapshots are written as `.json` instead of `.txt`.
    pub fn strict_json(mut self) -> Self {
        self.strict_json = true;
        self
    }

    pub fn dont_scrub_guids(mut self) -> Self {
        self.scrub_guids = false;
        self
    }

    pub fn dont_scrub_times(mut self) -> Self {
        self.scrub_times = false;
        self
    }

    pub fn omit_content_from_error(mut self) -> Self {
        self.omit_content_from_error = true;
        self
    }

    pub fn unique_for_arch(mut self) -> Self {
        self.unique_for_arch = true;
        self
    }

    pub fn unique_for_os(mut self) -> Self {
        self.unique_for_os = true;
        self
    }

    /// Allows two verifiers in one process to share a file prefix.
    pub fn disable_unique_prefix(mut self) -> Self {
        self.unique_prefix_disabled = true;
        self
    }

    pub fn use_string_comparer<F>(mut self, comparer: F) -> Self
    where
        F: Fn(&str, &str) -> CompareResult + Send + Sync + 'static,
    {
        self.string_comparer = Some(Arc::new(comparer));
        self
    }

    pub fn use_string_comparer_for_extension<F>(mut self, extension: &str, comparer: F) -> Self
    where
        F: Fn(&str, &str) -> CompareResult + Send + Sync + 'static,
    {
        self.string_comparers
            .insert(extension.to_string(), Arc::new(comparer));
        self
    }

    pub fn use_stream_comparer<F>(mut self, comparer: F) -> Self
    where
        F: Fn(&[u8], &[u8]) -> CompareResult + Send + Sync + 'static,
    {
        self.stream_comparer = Some(Arc::new(comparer));
        self
    }

    pub fn use_stream_comparer_for_extension<F>(mut self, extension: &str, comparer: F) -> Self
    where
        F: Fn(&[u8], &[u8]) -> CompareResult + Send + Sync + 'static,
    {
        self.stream_comparers
            .insert(extension.to_string(), Arc::new(comparer));
        self
    }

    pub fn add_scrubber<F>(mut self, scrubber: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.instance_scrubbers.push(Arc::new(scrubber));
        self
    }

    pub fn add_scrubber_for_extension<F>(mut self, extension: &str, scrubber: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.extension_scrubbers
            .entry(extension.to_string())
            .or_default()
            .push(Arc::new(scrubber));
        self
    }

    pub fn scrub_machine_name(self) -> Self {
        let scrubber = self.scrubber.clone();
        self.add_scrubber(move |input| scrubber.scrub_machine_name(input))
    }

    pub fn scrub_lines_containing(self, matches: &[&str]) -> Self {
        self.remove_lines_containing(false, matches)
    }

    pub fn scrub_lines_containing_any_case(self, matches: &[&str]) -> Self {
        self.remove_lines_containing(true, matches)
    }

    fn remove_lines_containing(self, ignore_case: bool, matches: &[&str]) -> Self {
        let scrubber = self.scrubber.clone();
        let matches: Vec<String> = matches.iter().map(|m| m.to_string()).collect();
        self.add_scrubber(move |input| scrubber.remove_lines_containing(input, ignore_case, &matches))
    }

    pub fn scrub_inline_guids(self) -> Self {
        let scrubber = self.scrubber.clone();
        self.add_scrubber(move |input| scrubber.replace_guids(input))
    }

    /// `format` is a chrono format string, e.g. `%Y-%m-%d %H:%M:%S`.
    pub fn scrub_inline_time(self, format: &str) -> Self {
        let scrubber = self.scrubber.clone();
        let format = format.to_string();
        self.add_scrubber(move |input| scrubber.replace_time(&format, input))
    }

    /// Removes every line for which `remove` returns true.
    pub fn scrub_lines<F>(self, remove: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let scrubber = self.scrubber.clone();
        self.add_scrubber(move |input| scrubber.filter_lines(input, &remove))
    }

    pub fn scrub_lines_with_replace<F>(self, replace: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let scrubber = self.scrubber.clone();
        self.add_scrubber(move |input| scrubber.replace_lines(input, &replace))
    }

    pub fn scrub_empty_lines(self) -> Self {
        self.scrub_lines(|line| line.trim().is_empty())
    }

    pub fn on_before_verify<F: Fn() + Send + Sync + 'static>(mut self, hook: F) -> Self {
        self.before_verify = Some(Arc::new(hook));
        self
    }

    pub fn on_after_verify<F: Fn() + Send + Sync + 'static>(mut self, hook: F) -> Self {
        self.after_verify = Some(Arc::new(hook));
        self
    }

    pub fn on_first_verify<F: Fn(&FilePair) + Send + Sync + 'static>(mut self, hook: F) -> Self {
        self.first_verify = Some(Arc::new(hook));
        self
    }

    pub fn on_verify_mismatch<F>(mut self, hook: F) -> Self
    where
        F: Fn(&FilePair, Option<&str>) + Send + Sync + 'static,
    {
        self.verify_mismatch = Some(Arc::new(hook));
        self
    }

    pub fn on_verify_delete<F: Fn(&Path) + Send + Sync + 'static>(mut self, hook: F) -> Self {
        self.verify_delete = Some(Arc::new(hook));
        self
    }

    /// Extra target verified after the main one, e.g. a rendered image.
    pub fn append_file(mut self, target: Target) -> Self {
        self.appended.push(target);
        self
    }

    /// Replaces the diff runner that would otherwise be built from the environment.
    pub fn with_launcher(mut self, launcher: Arc<dyn DiffLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub fn is_auto_verify(&self) -> bool {
        self.auto_verify
    }

    pub fn is_ci(&self) -> bool {
        self.ci_detected
    }

    pub fn is_diff_disabled(&self) -> bool {
        self.diff_disabled
    }

    pub fn scrubber(&self) -> &Scrubber {
        &self.scrubber
    }

    pub fn instance_scrubbers(&self) -> &[InstanceScrubber] {
        &self.instance_scrubbers
    }

    pub fn extension_scrubbers(&self, extension: &str) -> &[InstanceScrubber] {
        self.extension_scrubbers
            .get(extension)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn string_comparer_for(&self, extension: &str) -> Option<&StringComparer> {
        self.string_comparers
            .get(extension)
            .or(self.string_comparer.as_ref())
    }

    pub(crate) fn stream_comparer_for(&self, extension: &str) -> Option<&StreamComparer> {
        self.stream_comparers
            .get(extension)
            .or(self.stream_comparer.as_ref())
    }

    pub(crate) fn extension_or_txt(&self) -> &str {
        self.extension.as_deref().unwrap_or("txt")
    }

    pub(crate) fn run_before_verify(&self) {
        if let Some(hook) = &self.before_verify {
            hook();
        }
    }

    pub(crate) fn run_after_verify(&self) {
        if let Some(hook) = &self.after_verify {
            hook();
        }
    }

    pub(crate) fn run_first_verify(&self, file: &FilePair) {
        if let Some(hook) = &self.first_verify {
            hook(file);
        }
    }

    pub(crate) fn run_verify_mismatch(&self, file: &FilePair, message: Option<&str>) {
        if let Some(hook) = &self.verify_mismatch {
            hook(file, message);
        }
    }

    pub(crate) fn run_verify_delete(&self, file: &Path) {
        if let Some(hook) = &self.verify_delete {
            hook(file);
        }
    }
}
