//! Catalog of known diff tools and how to launch them on each OS.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::Error;

/// Builds the argument list from `(temp, target)`.
pub type BuildArguments = Arc<dyn Fn(&str, &str) -> Vec<String> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    BeyondCompare,
    P4MergeText,
    P4MergeImage,
    AraxisMerge,
    Meld,
    SublimeMerge,
    Kaleidoscope,
    CodeCompare,
    DeltaWalker,
    WinMerge,
    DiffMerge,
    TortoiseMerge,
    TortoiseGitMerge,
    TortoiseIDiff,
    KDiff3,
    TkDiff,
    Guiffy,
    ExamDiff,
    Diffinity,
    VisualStudioCode,
    GoLand,
    Vim,
    Neovim,
}

impl ToolKind {
    /// Default resolution priority.
    pub const ALL: [ToolKind; 23] = [
        ToolKind::BeyondCompare,
        ToolKind::P4MergeText,
        ToolKind::P4MergeImage,
        ToolKind::AraxisMerge,
        ToolKind::Meld,
        ToolKind::SublimeMerge,
        ToolKind::Kaleidoscope,
        ToolKind::CodeCompare,
        ToolKind::DeltaWalker,
        ToolKind::WinMerge,
        ToolKind::DiffMerge,
        ToolKind::TortoiseMerge,
        ToolKind::TortoiseGitMerge,
        ToolKind::TortoiseIDiff,
        ToolKind::KDiff3,
        ToolKind::TkDiff,
        ToolKind::Guiffy,
        ToolKind::ExamDiff,
        ToolKind::Diffinity,
        ToolKind::VisualStudioCode,
        ToolKind::GoLand,
        ToolKind::Vim,
        ToolKind::Neovim,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::BeyondCompare => "BeyondCompare",
            ToolKind::P4MergeText => "P4MergeText",
            ToolKind::P4MergeImage => "P4MergeImage",
            ToolKind::AraxisMerge => "AraxisMerge",
            ToolKind::Meld => "Meld",
            ToolKind::SublimeMerge => "SublimeMerge",
            ToolKind::Kaleidoscope => "Kaleidoscope",
            ToolKind::CodeCompare => "CodeCompare",
            ToolKind::DeltaWalker => "DeltaWalker",
            ToolKind::WinMerge => "WinMerge",
            ToolKind::DiffMerge => "DiffMerge",
            ToolKind::TortoiseMerge => "TortoiseMerge",
            ToolKind::TortoiseGitMerge => "TortoiseGitMerge",
            ToolKind::TortoiseIDiff => "TortoiseIDiff",
            ToolKind::KDiff3 => "KDiff3",
            ToolKind::TkDiff => "TkDiff",
            ToolKind::Guiffy => "Guiffy",
            ToolKind::ExamDiff => "ExamDiff",
            ToolKind::Diffinity => "Diffinity",
            ToolKind::VisualStudioCode => "VisualStudioCode",
            ToolKind::GoLand => "GoLand",
            ToolKind::Vim => "Vim",
            ToolKind::Neovim => "Neovim",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::ToolNotInstalled(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceModel {
    Paid,
    Free,
    Donation,
    Sponsor,
}

impl fmt::Display for PriceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PriceModel::Paid => "Paid",
            PriceModel::Free => "Free",
            PriceModel::Donation => "Free with option to donate",
            PriceModel::Sponsor => "Free with option to sponsor",
        })
    }
}

#[derive(Clone)]
pub struct OsSettings {
    pub target_left: BuildArguments,
    pub target_right: BuildArguments,
    pub exe_paths: Vec<String>,
}

impl fmt::Debug for OsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OsSettings")
            .field("exe_paths", &self.exe_paths)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub kind: ToolKind,
    pub url: &'static str,
    pub cost: PriceModel,
    pub auto_refresh: bool,
    pub is_mdi: bool,
    pub supports_text: bool,
    pub requires_target: bool,
    pub binary_extensions: Vec<String>,
    pub windows: Option<OsSettings>,
    pub linux: Option<OsSettings>,
    pub osx: Option<OsSettings>,
}

impl ToolDefinition {
    fn new(kind: ToolKind, url: &'static str, cost: PriceModel) -> Self {
        Self {
            kind,
            url,
            cost,
            auto_refresh: false,
            is_mdi: false,
            supports_text: true,
            requires_target: true,
            binary_extensions: Vec::new(),
            windows: None,
            linux: None,
            osx: None,
        }
    }

    fn auto_refresh(mut self) -> Self {
        self.auto_refresh = true;
        self
    }

    fn mdi(mut self) -> Self {
        self.is_mdi = true;
        self
    }

    fn binary_only(mut self) -> Self {
        self.supports_text = false;
        self
    }

    fn optional_target(mut self) -> Self {
        self.requires_target = false;
        self
    }

    fn binaries(mut self, extensions: &[&str]) -> Self {
        self.binary_extensions = extensions.iter().map(|e| e.to_string()).collect();
        self
    }

    fn windows(mut self, settings: OsSettings) -> Self {
        self.windows = Some(settings);
        self
    }

    fn linux(mut self, settings: OsSettings) -> Self {
        self.linux = Some(settings);
        self
    }

    fn osx(mut self, settings: OsSettings) -> Self {
        self.osx = Some(settings);
        self
    }
}

fn os(left: BuildArguments, right: BuildArguments, paths: &[&str]) -> OsSettings {
    OsSettings {
        target_left: left,
        target_right: right,
        exe_paths: paths.iter().map(|p| p.to_string()).collect(),
    }
}

fn args<F>(build: F) -> BuildArguments
where
    F: Fn(&str, &str) -> Vec<String> + Send + Sync + 'static,
{
    Arc::new(build)
}

/// `prefix.. first second suffix..`
fn ordered(prefix: &'static [&'static str], suffix: &'static [&'static str], target_left: bool) -> BuildArguments {
    args(move |temp, target| {
        let (first, second) = if target_left { (target, temp) } else { (temp, target) };
        prefix
            .iter()
            .map(|s| s.to_string())
            .chain([first.to_string(), second.to_string()])
            .chain(suffix.iter().map(|s| s.to_string()))
            .collect()
    })
}

fn plain(target_left: bool) -> BuildArguments {
    ordered(&[], &[], target_left)
}

fn file_title(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

const IMAGE_EXTENSIONS: &[&str] = &["bmp", "gif", "jpg", "jpeg", "png", "tif", "tiff"];

fn beyond_compare() -> ToolDefinition {
    ToolDefinition::new(ToolKind::BeyondCompare, "https://www.scootersoftware.com", PriceModel::Paid)
        .auto_refresh()
        .binaries(&[
            "mp3", "xls", "xlsm", "xlsx", "doc", "docm", "docx", "dot", "dotm", "dotx", "pdf",
            "bmp", "gif", "ico", "jpg", "jpeg", "png", "tif", "tiff", "rtf",
        ])
        .windows(os(
            ordered(&["/solo", "/rightreadonly"], &[], true),
            ordered(&["/solo", "/leftreadonly"], &[], false),
            &[
                r"%ProgramFiles%\Beyond Compare *\BCompare.exe",
                r"%UserProfile%\scoop\apps\beyondcompare\current\BCompare.exe",
            ],
        ))
        .linux(os(
            ordered(&["-solo", "-rightreadonly"], &[], true),
            ordered(&["-solo", "-leftreadonly"], &[], false),
            &["/usr/lib/beyondcompare/bcomp"],
        ))
        .osx(os(
            ordered(&["-solo", "-rightreadonly"], &[], true),
            ordered(&["-solo", "-leftreadonly"], &[], false),
            &["/Applications/Beyond Compare.app/Contents/MacOS/bcomp"],
        ))
}

fn p4merge_text() -> ToolDefinition {
    let left = args(|temp, target| {
        ["-C", "utf8-bom", temp, target, target, target]
            .iter()
            .map(|s| s.to_string())
            .collect()
    });
    let right = args(|temp, target| {
        ["-C", "utf8-bom", target, temp, target, target]
            .iter()
            .map(|s| s.to_string())
            .collect()
    });
    let url = "https://www.perforce.com/products/helix-core-apps/merge-diff-tool-p4merge";
    ToolDefinition::new(ToolKind::P4MergeText, url, PriceModel::Free)
        .windows(os(left.clone(), right.clone(), &[r"%ProgramFiles%\Perforce\p4merge.exe"]))
        .linux(os(left.clone(), right.clone(), &["/usr/bin/p4merge"]))
        .osx(os(left, right, &["/Applications/p4merge.app/Contents/MacOS/p4merge"]))
}

fn p4merge_image() -> ToolDefinition {
    let url = "https://www.perforce.com/products/helix-core-apps/merge-diff-tool-p4merge";
    ToolDefinition::new(ToolKind::P4MergeImage, url, PriceModel::Free)
        .binary_only()
        .binaries(&[
            "bmp", "gif", "jpg", "jpeg", "png", "pbm", "pgm", "ppm", "tif", "tiff", "xbm", "xpm",
        ])
        .windows(os(plain(true), plain(false), &[r"%ProgramFiles%\Perforce\p4merge.exe"]))
        .linux(os(plain(true), plain(false), &["/usr/bin/p4merge"]))
        .osx(os(
            plain(true),
            plain(false),
            &["/Applications/p4merge.app/Contents/MacOS/p4merge"],
        ))
}

fn araxis_merge() -> ToolDefinition {
    ToolDefinition::new(ToolKind::AraxisMerge, "https://www.araxis.com/merge", PriceModel::Paid)
        .auto_refresh()
        .mdi()
        .binaries(&[
            "bmp", "dib", "emf", "gif", "jif", "j2c", "j2k", "jp2", "jpc", "jpeg", "jpg", "jpx",
            "pbm", "pcx", "pgm", "png", "ppm", "ras", "tif", "tiff", "tga", "wmf",
        ])
        .windows(os(
            ordered(&["/nowait"], &[], true),
            ordered(&["/nowait"], &[], false),
            &[r"%ProgramFiles%\Araxis\Araxis Merge\Compare.exe"],
        ))
        .osx(os(
            plain(true),
            plain(false),
            &["/Applications/Araxis Merge.app/Contents/Utilities/compare"],
        ))
}

fn meld() -> ToolDefinition {
    ToolDefinition::new(ToolKind::Meld, "https://meldmerge.org/", PriceModel::Free)
        .windows(os(
            plain(true),
            plain(false),
            &[r"%ProgramFiles%\Meld\meld.exe", r"%LocalAppData%\Programs\Meld\meld.exe"],
        ))
        .linux(os(plain(true), plain(false), &["/usr/bin/meld", "/usr/local/bin/meld"]))
        .osx(os(
            plain(true),
            plain(false),
            &["/Applications/Meld.app/Contents/MacOS/Meld"],
        ))
}

fn sublime_merge() -> ToolDefinition {
    ToolDefinition::new(ToolKind::SublimeMerge, "https://www.sublimemerge.com/", PriceModel::Paid)
        .mdi()
        .windows(os(
            ordered(&["mergetool"], &[], true),
            ordered(&["mergetool"], &[], false),
            &[r"%ProgramFiles%\Sublime Merge\smerge.exe"],
        ))
        .linux(os(
            ordered(&["mergetool"], &[], true),
            ordered(&["mergetool"], &[], false),
            &["/usr/bin/smerge"],
        ))
        .osx(os(
            ordered(&["mergetool"], &[], true),
            ordered(&["mergetool"], &[], false),
            &["/Applications/smerge.app/Contents/MacOS/smerge"],
        ))
}

fn kaleidoscope() -> ToolDefinition {
    ToolDefinition::new(ToolKind::Kaleidoscope, "https://www.kaleidoscopeapp.com/", PriceModel::Paid)
        .binaries(&["bmp", "gif", "ico", "jpg", "jpeg", "png", "tiff", "tif"])
        .osx(os(plain(true), plain(false), &["/usr/local/bin/ksdiff"]))
}

fn code_compare() -> ToolDefinition {
    ToolDefinition::new(
        ToolKind::CodeCompare,
        "https://www.devart.com/codecompare/",
        PriceModel::Paid,
    )
    .mdi()
    .windows(os(
        plain(true),
        plain(false),
        &[r"%ProgramFiles%\Devart\Code Compare\CodeCompare.exe"],
    ))
}

fn delta_walker() -> ToolDefinition {
    ToolDefinition::new(ToolKind::DeltaWalker, "https://www.deltawalker.com/", PriceModel::Paid)
        .optional_target()
        .binaries(&[
            "jpg", "jp2", "j2k", "png", "gif", "psd", "tif", "bmp", "pct", "pict", "pic", "ico",
            "ppm", "pgm", "pbm", "pnm", "zip", "jar", "ear", "tar", "tgz", "tbz2", "gz", "bz2",
            "doc", "docx", "xls", "xlsx", "ppt", "pdf", "rtf", "html", "htm",
        ])
        .windows(os(
            ordered(&["-mi"], &[], true),
            ordered(&["-mi"], &[], false),
            &[r"C:\Program Files\Deltopia\DeltaWalker\DeltaWalker.exe"],
        ))
        .osx(os(
            ordered(&["-mi"], &[], true),
            ordered(&["-mi"], &[], false),
            &["/Applications/DeltaWalker.app/Contents/MacOS/DeltaWalker"],
        ))
}

fn win_merge() -> ToolDefinition {
    let left = args(|temp, target| {
        vec![
            "/u".to_string(),
            "/wl".to_string(),
            "/e".to_string(),
            target.to_string(),
            temp.to_string(),
            "/dl".to_string(),
            file_title(target),
            "/dr".to_string(),
            file_title(temp),
        ]
    });
    let right = args(|temp, target| {
        vec![
            "/u".to_string(),
            "/wl".to_string(),
            "/e".to_string(),
            temp.to_string(),
            target.to_string(),
            "/dl".to_string(),
            file_title(temp),
            "/dr".to_string(),
            file_title(target),
        ]
    });
    ToolDefinition::new(ToolKind::WinMerge, "https://winmerge.org/", PriceModel::Donation)
        .auto_refresh()
        .binaries(&[
            "bmp", "cut", "dds", "exr", "g3", "gif", "hdr", "ico", "iff", "lbm", "j2k", "j2c",
            "jng", "jp2", "jpg", "jif", "jpeg", "jpe", "jxr", "wdp", "hdp", "koa", "mng", "pcd",
            "pcx", "pfm", "pct", "pict", "pic", "png", "pbm", "pgm", "ppm", "psd", "ras", "sgi",
            "rgb", "rgba", "bw", "tga", "targa", "tif", "tiff", "wap", "wbmp", "wbm", "webp",
            "xbm", "xpm",
        ])
        .windows(os(
            left,
            right,
            &[
                r"%ProgramFiles%\WinMerge\WinMergeU.exe",
                r"%LocalAppData%\Programs\WinMerge\WinMergeU.exe",
            ],
        ))
}

fn diff_merge() -> ToolDefinition {
    let left = ordered(&["--nosplash"], &[], true);
    let right = ordered(&["--nosplash"], &[], false);
    ToolDefinition::new(ToolKind::DiffMerge, "https://www.sourcegear.com/diffmerge/", PriceModel::Free)
        .windows(os(
            left.clone(),
            right.clone(),
            &[r"%ProgramFiles%\SourceGear\Common\DiffMerge\sgdm.exe"],
        ))
        .linux(os(left.clone(), right.clone(), &["/usr/bin/diffmerge"]))
        .osx(os(left, right, &["/Applications/DiffMerge.app/Contents/MacOS/DiffMerge"]))
}

fn tortoise_merge() -> ToolDefinition {
    ToolDefinition::new(ToolKind::TortoiseMerge, "https://tortoisesvn.net/TortoiseMerge.html", PriceModel::Free)
        .windows(os(
            plain(true),
            plain(false),
            &[r"%ProgramFiles%\TortoiseSVN\bin\TortoiseMerge.exe"],
        ))
}

fn tortoise_git_merge() -> ToolDefinition {
    ToolDefinition::new(
        ToolKind::TortoiseGitMerge,
        "https://tortoisegit.org/docs/tortoisegitmerge/",
        PriceModel::Free,
    )
    .windows(os(
        plain(true),
        plain(false),
        &[r"%ProgramFiles%\TortoiseGit\bin\TortoiseGitMerge.exe"],
    ))
}

fn tortoise_idiff() -> ToolDefinition {
    let left = args(|temp, target| vec![format!("/left:{target}"), format!("/right:{temp}")]);
    let right = args(|temp, target| vec![format!("/left:{temp}"), format!("/right:{target}")]);
    ToolDefinition::new(
        ToolKind::TortoiseIDiff,
        "https://tortoisesvn.net/TortoiseIDiff.html",
        PriceModel::Free,
    )
    .binary_only()
    .binaries(&["bmp", "gif", "jpg", "jpeg", "png", "ico", "tif", "tiff"])
    .windows(os(left, right, &[r"%ProgramFiles%\TortoiseSVN\bin\TortoiseIDiff.exe"]))
}

fn kdiff3() -> ToolDefinition {
    let left = ordered(&[], &["--cs", "CreateBakFiles=0"], true);
    let right = ordered(&[], &["--cs", "CreateBakFiles=0"], false);
    ToolDefinition::new(ToolKind::KDiff3, "https://github.com/KDE/kdiff3", PriceModel::Free)
        .windows(os(
            left.clone(),
            right.clone(),
            &[r"%ProgramFiles%\KDiff3\kdiff3.exe", r"%ProgramFiles%\KDiff3\bin\kdiff3.exe"],
        ))
        .osx(os(left, right, &["/Applications/kdiff3.app/Contents/MacOS/kdiff3"]))
}

fn tk_diff() -> ToolDefinition {
    ToolDefinition::new(ToolKind::TkDiff, "https://sourceforge.net/projects/tkdiff/", PriceModel::Free)
        .osx(os(
            plain(true),
            plain(false),
            &["/Applications/TkDiff.app/Contents/MacOS/tkdiff"],
        ))
}

fn guiffy() -> ToolDefinition {
    let left = ordered(&[], &["-ge2"], true);
    let right = ordered(&[], &["-ge1"], false);
    ToolDefinition::new(ToolKind::Guiffy, "https://www.guiffy.com/", PriceModel::Paid)
        .binaries(&["bmp", "gif", "jpeg", "jpg", "png", "wbmp"])
        .windows(os(left.clone(), right.clone(), &[r"%ProgramFiles%\Guiffy\guiffy.exe"]))
        .osx(os(left, right, &["/Applications/Guiffy/guiffyCL.command"]))
}

fn exam_diff() -> ToolDefinition {
    let build = |first: &str, second: &str| {
        vec![
            first.to_string(),
            second.to_string(),
            "/nh".to_string(),
            "/diffonly".to_string(),
            format!("/dn1:{}", file_title(first)),
            format!("/dn2:{}", file_title(second)),
        ]
    };
    ToolDefinition::new(
        ToolKind::ExamDiff,
        "https://www.prestosoft.com/edp_examdiffpro.asp",
        PriceModel::Paid,
    )
    .auto_refresh()
    .windows(os(
        args(move |temp, target| build(target, temp)),
        args(move |temp, target| build(temp, target)),
        &[r"%ProgramFiles%\ExamDiff Pro\ExamDiff.exe"],
    ))
}

fn diffinity() -> ToolDefinition {
    ToolDefinition::new(
        ToolKind::Diffinity,
        "https://truehumandesign.se/s_diffinity.php",
        PriceModel::Donation,
    )
    .windows(os(
        plain(true),
        plain(false),
        &[
            r"%ProgramFiles%\Diffinity\Diffinity.exe",
            r"%UserProfile%\scoop\apps\diffinity\current\Diffinity.exe",
        ],
    ))
}

fn visual_studio_code() -> ToolDefinition {
    let left = ordered(&["--diff"], &[], true);
    let right = ordered(&["--diff"], &[], false);
    ToolDefinition::new(ToolKind::VisualStudioCode, "https://code.visualstudio.com", PriceModel::Free)
        .auto_refresh()
        .mdi()
        .windows(os(
            left.clone(),
            right.clone(),
            &[
                r"%LocalAppData%\Programs\Microsoft VS Code\code.exe",
                r"%ProgramFiles%\Microsoft VS Code\bin\code.exe",
                r"%ProgramFiles%\Microsoft VS Code\code.exe",
                r"%UserProfile%\scoop\apps\vscode\current\bin\code.cmd",
                r"%UserProfile%\scoop\apps\vscode\current\code.exe",
            ],
        ))
        .linux(os(
            left.clone(),
            right.clone(),
            &["/usr/local/bin/code", "/usr/bin/code"],
        ))
        .osx(os(
            left,
            right,
            &[
                "/Applications/Visual Studio Code.app/Contents/MacOS/Electron",
                "/Applications/Visual Studio Code.app/Contents/Resources/app/bin/code",
            ],
        ))
}

fn go_land() -> ToolDefinition {
    let left = ordered(&["diff"], &[], true);
    let right = ordered(&["diff"], &[], false);
    ToolDefinition::new(ToolKind::GoLand, "https://www.jetbrains.com/go/", PriceModel::Paid)
        .mdi()
        .windows(os(
            left.clone(),
            right.clone(),
            &[
                r"%LOCALAPPDATA%\JetBrains\Installations\GoLand*\bin\goland64.exe",
                r"%ProgramFiles%\JetBrains\JetBrains GoLand *\bin\goland64.exe",
                r"%JetBrains GoLand%\goland64.exe",
                r"%LOCALAPPDATA%\JetBrains\Toolbox\apps\GoLand\*\*\bin\goland64.exe",
                r"%UserProfile%\scoop\apps\goland\current\IDE\bin\goland64.exe",
            ],
        ))
        .linux(os(
            left.clone(),
            right.clone(),
            &[
                "%HOME%/.local/share/JetBrains/Toolbox/apps/GoLand/*/*/bin/goland.sh",
                "/opt/jetbrains/goland/bin/goland.sh",
                "/usr/share/goland/bin/goland.sh",
            ],
        ))
        .osx(os(
            left,
            right,
            &[
                "%HOME%/Library/Application Support/JetBrains/Toolbox/apps/GoLand/*/*/GoLand EAP.app/Contents/MacOS/goland",
                "%HOME%/Library/Application Support/JetBrains/Toolbox/apps/GoLand/*/*/GoLand.app/Contents/MacOS/goland",
                "/Applications/GoLand EAP.app/Contents/MacOS/goland",
                "/Applications/GoLand.app/Contents/MacOS/goland",
            ],
        ))
}

const VIM_COMMANDS: &[&str] = &["-c", "setl autoread | setl nobackup | set noswapfile"];

fn vim() -> ToolDefinition {
    ToolDefinition::new(ToolKind::Vim, "https://www.vim.org/", PriceModel::Donation)
        .auto_refresh()
        .windows(os(
            ordered(&["-d"], VIM_COMMANDS, true),
            ordered(&["-d"], VIM_COMMANDS, false),
            &[r"%ProgramFiles%\Vim\*\vim.exe"],
        ))
        .osx(os(
            ordered(&["-d"], VIM_COMMANDS, true),
            ordered(&["-d"], VIM_COMMANDS, false),
            &["/Applications/MacVim.app/Contents/bin/mvim"],
        ))
}

fn neovim() -> ToolDefinition {
    ToolDefinition::new(ToolKind::Neovim, "https://neovim.io/", PriceModel::Sponsor)
        .windows(os(
            ordered(&["-d"], &[], true),
            ordered(&["-d"], &[], false),
            &[r"%ChocolateyToolsLocation%\neovim\*\nvim.exe"],
        ))
}

/// Every known tool, in default priority order.
pub fn all_definitions() -> Vec<ToolDefinition> {
    ToolKind::ALL.into_iter().map(definition).collect()
}

pub fn definition(kind: ToolKind) -> ToolDefinition {
    match kind {
        ToolKind::BeyondCompare => beyond_compare(),
        ToolKind::P4MergeText => p4merge_text(),
        ToolKind::P4MergeImage => p4merge_image(),
        ToolKind::AraxisMerge => araxis_merge(),
        ToolKind::Meld => meld(),
        ToolKind::SublimeMerge => sublime_merge(),
        ToolKind::Kaleidoscope => kaleidoscope(),
        ToolKind::CodeCompare => code_compare(),
        ToolKind::DeltaWalker => delta_walker(),
        ToolKind::WinMerge => win_merge(),
        ToolKind::DiffMerge => diff_merge(),
        ToolKind::TortoiseMerge => tortoise_merge(),
        ToolKind::TortoiseGitMerge => tortoise_git_merge(),
        ToolKind::TortoiseIDiff => tortoise_idiff(),
        ToolKind::KDiff3 => kdiff3(),
        ToolKind::TkDiff => tk_diff(),
        ToolKind::Guiffy => guiffy(),
        ToolKind::ExamDiff => exam_diff(),
        ToolKind::Diffinity => diffinity(),
        ToolKind::VisualStudioCode => visual_studio_code(),
        ToolKind::GoLand => go_land(),
        ToolKind::Vim => vim(),
        ToolKind::Neovim => neovim(),
    }
}
