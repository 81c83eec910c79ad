use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::diff::definitions::{all_definitions, BuildArguments, OsSettings, ToolDefinition, ToolKind};
use crate::diff::finder::Finder;
use crate::diff::position;
use crate::env::{EnvReader, TOOL_ORDER_VAR};
use crate::error::{Error, Result};
use crate::files;
use crate::platform::Os;

/// A tool whose executable was found on this machine.
#[derive(Clone)]
pub struct ResolvedTool {
    pub name: String,
    pub kind: Option<ToolKind>,
    pub exe_path: PathBuf,
    pub target_left: BuildArguments,
    pub target_right: BuildArguments,
    pub is_mdi: bool,
    pub auto_refresh: bool,
    pub supports_text: bool,
    pub requires_target: bool,
    pub binary_extensions: Vec<String>,
}

impl fmt::Debug for ResolvedTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedTool")
            .field("name", &self.name)
            .field("exe_path", &self.exe_path)
            .field("is_mdi", &self.is_mdi)
            .field("auto_refresh", &self.auto_refresh)
            .field("supports_text", &self.supports_text)
            .field("requires_target", &self.requires_target)
            .finish_non_exhaustive()
    }
}

impl ResolvedTool {
    pub fn arguments(&self, temp: &str, target: &str) -> Vec<String> {
        self.arguments_with(temp, target, position::target_on_left())
    }

    pub fn arguments_with(&self, temp: &str, target: &str, target_on_left: bool) -> Vec<String> {
        if target_on_left {
            (self.target_left)(temp, target)
        } else {
            (self.target_right)(temp, target)
        }
    }

    /// The command line the launched process is expected to show in the process table.
    pub fn build_command(&self, temp: &str, target: &str) -> String {
        command_line(&self.exe_path, &self.arguments(temp, target))
    }
}

pub fn command_line(exe: &Path, arguments: &[String]) -> String {
    let mut command = format!("\"{}\"", exe.display());
    for argument in arguments {
        command.push(' ');
        command.push_str(argument);
    }
    command
}

/// A user-supplied tool not in the built-in catalog.
#[derive(Clone)]
pub struct CustomTool {
    pub name: String,
    pub exe_path: String,
    pub target_left: BuildArguments,
    pub target_right: BuildArguments,
    pub auto_refresh: bool,
    pub is_mdi: bool,
    pub supports_text: bool,
    pub requires_target: bool,
    pub binary_extensions: Vec<String>,
}

/// Resolved tools in priority order, with lookups by path and binary extension.
#[derive(Debug, Default)]
pub struct Tools {
    resolved: Vec<Arc<ResolvedTool>>,
    path_lookup: HashMap<PathBuf, Arc<ResolvedTool>>,
    extension_lookup: HashMap<String, Arc<ResolvedTool>>,
}

/// Splits a tool order on `,`, `|` or spaces.
pub fn parse_tool_order(value: &str) -> Vec<String> {
    value
        .split([',', '|', ' '])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Tools {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolves tools using `DiffEngine_ToolOrder`, then `configured_order`, then the catalog order.
    ///
    /// An explicitly requested order is strict: a requested tool that is unknown or not
    /// installed is an error.
    pub fn from_env(env: &dyn EnvReader, finder: &Finder, configured_order: &[String]) -> Result<Self> {
        if let Some(value) = env.lookup(TOOL_ORDER_VAR) {
            return Self::resolve(&parse_tool_order(&value), true, finder);
        }
        if !configured_order.is_empty() {
            return Self::resolve(configured_order, true, finder);
        }
        Self::resolve(&[], false, finder)
    }

    pub fn resolve(order: &[String], strict: bool, finder: &Finder) -> Result<Self> {
        let mut remaining = all_definitions();
        let mut sorted: Vec<ToolDefinition> = Vec::new();
        let mut requested = HashSet::new();

        for name in order {
            let kind = match name.parse::<ToolKind>() {
                Ok(kind) => kind,
                Err(e) if strict => return Err(e),
                Err(_) => {
                    debug!("Ignoring unknown tool in order: {}", name);
                    continue;
                }
            };
            if let Some(index) = remaining.iter().position(|d| d.kind == kind) {
                requested.insert(kind);
                sorted.push(remaining.remove(index));
            }
        }
        sorted.extend(remaining);

        // Prepending in reverse leaves the first entry at the front.
        let mut tools = Self::empty();
        for definition in sorted.iter().rev() {
            let added = tools.add_definition(definition, finder)?;
            if added.is_none() && strict && requested.contains(&definition.kind) {
                return Err(Error::ToolNotInstalled(definition.kind.to_string()));
            }
        }

        info!(
            "Resolved diff tools: {:?}",
            tools.resolved.iter().map(|t| t.name.as_str()).collect::<Vec<_>>()
        );
        Ok(tools)
    }

    fn add_definition(&mut self, definition: &ToolDefinition, finder: &Finder) -> Result<Option<Arc<ResolvedTool>>> {
        let Some((exe_path, settings)) = resolve_os_settings(definition, finder)? else {
            return Ok(None);
        };
        let tool = ResolvedTool {
            name: definition.kind.to_string(),
            kind: Some(definition.kind),
            exe_path,
            target_left: settings.target_left.clone(),
            target_right: settings.target_right.clone(),
            is_mdi: definition.is_mdi,
            auto_refresh: definition.auto_refresh,
            supports_text: definition.supports_text,
            requires_target: definition.requires_target,
            binary_extensions: definition.binary_extensions.clone(),
        };
        self.add_resolved_tool_at_start(tool).map(Some)
    }

    /// Registers a custom tool ahead of everything resolved so far.
    pub fn add_tool(&mut self, custom: CustomTool, finder: &Finder) -> Result<Option<Arc<ResolvedTool>>> {
        if custom.name.trim().is_empty() {
            return Err(Error::Other("Tool name must not be empty".to_string()));
        }
        if self.tool_exists(&custom.name) {
            return Err(Error::DuplicateTool(custom.name));
        }
        let Some(exe_path) = finder.find(&custom.exe_path)? else {
            return Ok(None);
        };
        let tool = ResolvedTool {
            name: custom.name,
            kind: None,
            exe_path,
            target_left: custom.target_left,
            target_right: custom.target_right,
            is_mdi: custom.is_mdi,
            auto_refresh: custom.auto_refresh,
            supports_text: custom.supports_text,
            requires_target: custom.requires_target,
            binary_extensions: custom.binary_extensions,
        };
        self.add_resolved_tool_at_start(tool).map(Some)
    }

    pub fn add_resolved_tool_at_start(&mut self, tool: ResolvedTool) -> Result<Arc<ResolvedTool>> {
        if self.tool_exists(&tool.name) {
            return Err(Error::DuplicateTool(tool.name));
        }
        let tool = Arc::new(tool);
        self.resolved.insert(0, Arc::clone(&tool));
        for extension in &tool.binary_extensions {
            self.extension_lookup
                .insert(files::file_extension(extension), Arc::clone(&tool));
        }
        self.path_lookup
            .insert(tool.exe_path.clone(), Arc::clone(&tool));
        Ok(tool)
    }

    fn tool_exists(&self, name: &str) -> bool {
        self.resolved.iter().any(|t| t.name == name)
    }

    pub fn resolved(&self) -> &[Arc<ResolvedTool>] {
        &self.resolved
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    pub fn find_by_kind(&self, kind: ToolKind) -> Option<Arc<ResolvedTool>> {
        self.resolved.iter().find(|t| t.kind == Some(kind)).cloned()
    }

    pub fn find_by_name(&self, name: &str) -> Option<Arc<ResolvedTool>> {
        self.resolved.iter().find(|t| t.name == name).cloned()
    }

    pub fn find_by_path(&self, path: &Path) -> Option<Arc<ResolvedTool>> {
        self.path_lookup.get(path).cloned()
    }

    /// Text extensions go to the first text-capable tool; others to whichever tool claims them.
    pub fn find_for_extension(&self, extension_or_path: &str) -> Option<Arc<ResolvedTool>> {
        let extension = files::file_extension(extension_or_path);
        if files::is_text(&extension) {
            if let Some(tool) = self.resolved.iter().find(|t| t.supports_text) {
                return Some(Arc::clone(tool));
            }
        }
        self.extension_lookup.get(&extension).cloned()
    }
}

fn resolve_os_settings<'a>(
    definition: &'a ToolDefinition,
    finder: &Finder,
) -> Result<Option<(PathBuf, &'a OsSettings)>> {
    let (settings, paths) = match Os::current() {
        Os::Windows => match &definition.windows {
            Some(settings) => (settings, expand_program_files(&settings.exe_paths)),
            None => return Ok(None),
        },
        Os::Linux => match &definition.linux {
            Some(settings) => (settings, settings.exe_paths.clone()),
            None => return Ok(None),
        },
        Os::MacOs => match &definition.osx {
            Some(settings) => (settings, settings.exe_paths.clone()),
            None => return Ok(None),
        },
    };
    Ok(finder.find_any(&paths)?.map(|path| (path, settings)))
}

/// Also tries the 64-bit program files location for every `%ProgramFiles%` path.
pub fn expand_program_files(paths: &[String]) -> Vec<String> {
    let mut result = Vec::with_capacity(paths.len() * 2);
    for path in paths {
        result.push(path.clone());
        if path.contains("%ProgramFiles%") {
            result.push(path.replacen("%ProgramFiles%", "%ProgramW6432%", 1));
        }
    }
    result
}
