//! Text normalization applied to every text target before comparison.

use std::env;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::platform;
use crate::verify::counter::CountHolder;
use crate::verify::settings::VerifySettings;

const MACHINE_NAME_PLACEHOLDER: &str = "TheMachineName";

lazy_static! {
    static ref GUID_PATTERN: Regex = Regex::new(
        "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}"
    )
    .expect("GUID pattern must compile");
    static ref DIRECTORY_REPLACEMENTS: Vec<(String, &'static str)> = directory_replacements();
}

fn directory_replacements() -> Vec<(String, &'static str)> {
    let candidates: Vec<(Option<PathBuf>, &'static str)> = vec![
        (env::current_dir().ok(), "{CurrentDirectory}"),
        (dirs::config_dir(), "{ConfigDir}"),
        (dirs::cache_dir(), "{CacheDir}"),
        (
            env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf)),
            "{ExeDir}",
        ),
        (Some(env::temp_dir()), "{TempDir}"),
        (dirs::home_dir(), "{HomeDir}"),
    ];

    let mut replacements: Vec<(String, &'static str)> = candidates
        .into_iter()
        .filter_map(|(dir, mask)| {
            let dir = dir?.to_string_lossy().into_owned();
            let trimmed = dir.trim_end_matches(['/', '\\', MAIN_SEPARATOR]).to_string();
            (!trimmed.is_empty()).then_some((trimmed, mask))
        })
        .collect();

    // Longest first so a nested directory wins over its parent.
    replacements.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    replacements
}

pub type InstanceScrubber = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Normalizes received text and pseudonymizes volatile values.
#[derive(Clone, Default)]
pub struct Scrubber {
    counter: Arc<CountHolder>,
}

impl Scrubber {
    pub fn new(counter: Arc<CountHolder>) -> Self {
        Self { counter }
    }

    /// Directory placeholders, then global scrubbers, then extension scrubbers, then newlines.
    pub fn apply(&self, extension: &str, target: &mut String, settings: &VerifySettings) {
        let mut data = std::mem::take(target);

        for (directory, mask) in DIRECTORY_REPLACEMENTS.iter() {
            if data.contains(directory.as_str()) {
                data = data.replace(directory.as_str(), mask);
            }
        }

        for scrubber in settings.instance_scrubbers() {
            data = scrubber(&data);
        }

        for scrubber in settings.extension_scrubbers(extension) {
            data = scrubber(&data);
        }

        *target = fix_newlines(&data);
    }

    pub fn scrub_time(&self, time: DateTime<Utc>) -> String {
        if time == DateTime::<Utc>::default() {
            return "Time_Zero".to_string();
        }
        format!("Time_{}", self.counter.next_time(time))
    }

    pub fn scrub_guid(&self, guid: Uuid) -> String {
        if guid.is_nil() {
            return "Guid_Zero".to_string();
        }
        format!("Guid_{}", self.counter.next_guid(guid))
    }

    pub fn scrub_machine_name(&self, input: &str) -> String {
        let host = platform::machine_name();
        if host.is_empty() || !input.contains(&host) {
            return input.to_string();
        }
        input.replace(&host, MACHINE_NAME_PLACEHOLDER)
    }

    /// Replaces every GUID found in the text.
    pub fn replace_guids(&self, input: &str) -> String {
        if let Ok(guid) = Uuid::parse_str(input) {
            return self.scrub_guid(guid);
        }
        GUID_PATTERN
            .replace_all(input, |caps: &regex::Captures| match Uuid::parse_str(&caps[0]) {
                Ok(guid) => self.scrub_guid(guid),
                Err(_) => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Replaces the whole input, or each whole line, that parses with the chrono `format`.
    pub fn replace_time(&self, format: &str, input: &str) -> String {
        if let Some(time) = parse_time(format, input) {
            return self.scrub_time(time);
        }
        self.replace_lines(input, |line| match parse_time(format, line.trim()) {
            Some(time) => self.scrub_time(time),
            None => line.to_string(),
        })
    }

    pub fn remove_lines_containing(&self, input: &str, ignore_case: bool, matches: &[String]) -> String {
        let lowered: Vec<String> = matches.iter().map(|m| m.to_lowercase()).collect();
        self.filter_lines(input, |line| {
            if ignore_case {
                let line = line.to_lowercase();
                lowered.iter().any(|m| line.contains(m.as_str()))
            } else {
                matches.iter().any(|m| line.contains(m.as_str()))
            }
        })
    }

    /// Drops every line for which `remove` returns true.
    pub fn filter_lines<F>(&self, input: &str, remove: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        rebuild_lines(input, |line| (!remove(line)).then(|| line.to_string()))
    }

    /// Lines mapped to an empty string are dropped.
    pub fn replace_lines<F>(&self, input: &str, replace: F) -> String
    where
        F: Fn(&str) -> String,
    {
        rebuild_lines(input, |line| Some(replace(line)).filter(|value| !value.is_empty()))
    }
}

fn rebuild_lines<F>(input: &str, map: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let lines: Vec<&str> = input.lines().collect();
    let trailing_newline = input.ends_with('\n');
    let mut result = String::with_capacity(input.len());
    for (i, line) in lines.iter().enumerate() {
        if let Some(value) = map(line) {
            result.push_str(&value);
            if i != lines.len() - 1 || trailing_newline {
                result.push('\n');
            }
        }
    }
    result
}

fn parse_time(format: &str, value: &str) -> Option<DateTime<Utc>> {
    if value.is_empty() {
        return None;
    }
    if let Ok(time) = DateTime::parse_from_str(value, format) {
        return Some(time.with_timezone(&Utc));
    }
    if let Ok(time) = NaiveDateTime::parse_from_str(value, format) {
        return Some(time.and_utc());
    }
    NaiveDate::parse_from_str(value, format)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|time| time.and_utc())
}

pub fn fix_newlines(value: &str) -> String {
    value.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scrubber() -> Scrubber {
        Scrubber::new(Arc::new(CountHolder::new()))
    }

    #[test]
    fn test_scrub_guid_is_deterministic() {
        let scrubber = scrubber();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        assert_eq!(scrubber.scrub_guid(first), "Guid_1");
        assert_eq!(scrubber.scrub_guid(second), "Guid_2");
        assert_eq!(scrubber.scrub_guid(first), "Guid_1");
        assert_eq!(scrubber.scrub_guid(Uuid::nil()), "Guid_Zero");
    }

    #[test]
    fn test_scrub_time_is_deterministic() {
        let scrubber = scrubber();
        let time = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(scrubber.scrub_time(time), "Time_1");
        assert_eq!(scrubber.scrub_time(time), "Time_1");
        assert_eq!(scrubber.scrub_time(DateTime::<Utc>::default()), "Time_Zero");
    }

    #[test]
    fn test_replace_inline_guids() {
        let scrubber = scrubber();
        let guid = "c6c5ac5c-f3b8-4b8e-9f4a-2a7e7c0f3a11";
        let input = format!("id={} again={}", guid, guid);
        assert_eq!(scrubber.replace_guids(&input), "id=Guid_1 again=Guid_1");
        assert_eq!(scrubber.replace_guids(guid), "Guid_1");
        assert_eq!(scrubber.replace_guids("no guid here"), "no guid here");
    }

    #[test]
    fn test_replace_time_whole_value_and_lines() {
        let scrubber = scrubber();
        assert_eq!(scrubber.replace_time("%Y-%m-%d", "2020-01-02"), "Time_1");
        assert_eq!(
            scrubber.replace_time("%Y-%m-%d %H:%M", "start\n2020-01-02 10:00\nend\n"),
            "start\nTime_2\nend\n"
        );
        assert_eq!(scrubber.replace_time("%Y-%m-%d", "not a date"), "not a date");
    }

    #[test]
    fn test_remove_lines_containing() {
        let scrubber = scrubber();
        let input = "keep\nDrop me\nkeep too\n";
        let matches = vec!["drop".to_string()];
        assert_eq!(
            scrubber.remove_lines_containing(input, true, &matches),
            "keep\nkeep too\n"
        );
        assert_eq!(scrubber.remove_lines_containing(input, false, &matches), input);
    }

    #[test]
    fn test_filter_lines_keeps_missing_trailing_newline() {
        let scrubber = scrubber();
        assert_eq!(scrubber.filter_lines("a\nb\nc", |line| line == "b"), "a\nc");
        assert_eq!(scrubber.filter_lines("a\nb\n", |line| line == "a"), "b\n");
    }

    #[test]
    fn test_replace_lines_drops_empty_results() {
        let scrubber = scrubber();
        let result = scrubber.replace_lines("one\ntwo\nthree", |line| {
            if line == "two" {
                String::new()
            } else {
                line.to_uppercase()
            }
        });
        assert_eq!(result, "ONE\nTHREE");
    }

    #[test]
    fn test_scrub_machine_name() {
        let scrubber = scrubber();
        let host = platform::machine_name();
        if host.is_empty() {
            return;
        }
        let input = format!("built on {}", host);
        assert_eq!(scrubber.scrub_machine_name(&input), "built on TheMachineName");
    }

    #[test]
    fn test_fix_newlines() {
        assert_eq!(fix_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn test_apply_replaces_directories_and_runs_scrubbers_in_order() {
        let scrubber = scrubber();
        let temp = env::temp_dir().to_string_lossy().trim_end_matches(['/', '\\']).to_string();
        let settings = VerifySettings::new()
            .add_scrubber(|s| s.replace("alpha", "beta"))
            .add_scrubber(|s| s.replace("beta", "gamma"))
            .add_scrubber_for_extension("txt", |s| s.replace("gamma", "delta"));

        let mut target = format!("alpha in {}{}file\r\n", temp, MAIN_SEPARATOR);
        scrubber.apply("txt", &mut target, &settings);
        assert!(target.starts_with("delta in {"));
        assert!(!target.contains(&temp));
        assert!(target.ends_with("file\n"));

        let mut other = "alpha".to_string();
        scrubber.apply("json", &mut other, &settings);
        assert_eq!(other, "gamma");
    }

    #[test]
    fn test_current_and_temp_directories_become_placeholders() {
        let trimmed = |dir: PathBuf| {
            dir.to_string_lossy()
                .trim_end_matches(['/', '\\'])
                .to_string()
        };
        let current = trimmed(env::current_dir().unwrap());
        let temp = trimmed(env::temp_dir());

        let mut target = format!(
            "{current}{sep}a\r\n{temp}{sep}b\n",
            sep = MAIN_SEPARATOR
        );
        scrubber().apply("txt", &mut target, &VerifySettings::new());
        assert_eq!(
            target,
            format!("{{CurrentDirectory}}{sep}a\n{{TempDir}}{sep}b\n", sep = MAIN_SEPARATOR)
        );
    }
}
