use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::eol::LineTerminatorKind;

/// Terminators that can be chosen as a normalization target.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Crlf,
    Cr,
    Lf,
    Nel,
    Ls,
    Ps,
}

impl TargetKind {
    fn as_flag_value(self) -> &'static str {
        match self {
            Self::Crlf => "crlf",
            Self::Cr => "cr",
            Self::Lf => "lf",
            Self::Nel => "nel",
            Self::Ls => "ls",
            Self::Ps => "ps",
        }
    }
}

impl From<TargetKind> for LineTerminatorKind {
    fn from(kind: TargetKind) -> Self {
        match kind {
            TargetKind::Crlf => Self::Crlf,
            TargetKind::Cr => Self::Cr,
            TargetKind::Lf => Self::Lf,
            TargetKind::Nel => Self::Nel,
            TargetKind::Ls => Self::Ls,
            TargetKind::Ps => Self::Ps,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub fix: bool,
    pub json: bool,
    pub lines: bool,
    pub target: Option<TargetKind>,
    pub debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            fix: self.fix || other.fix,
            json: self.json || other.json,
            lines: self.lines || other.lines,
            target: other.target.or(self.target),
            debug_log: other.debug_log.clone().or_else(|| self.debug_log.clone()),
        }
    }

    /// The configured target, defaulting to CRLF.
    pub fn target_kind(&self) -> LineTerminatorKind {
        self.target.map_or(LineTerminatorKind::Crlf, Into::into)
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("linebreak").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("linebreak")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("linebreak").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("linebreak").join("config");
        }
    }

    PathBuf::from(".linebreakrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".linebreakrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# linebreak defaults (saved with --save)".to_string());
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.fix {
        lines.push("--fix".to_string());
    }
    if flags.json {
        lines.push("--json".to_string());
    }
    if flags.lines {
        lines.push("--lines".to_string());
    }
    if let Some(target) = flags.target {
        lines.push(format!("--target {}", target.as_flag_value()));
    }
    if let Some(path) = &flags.debug_log {
        lines.push(format!("--debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--watch" || token == "-w" {
            flags.watch = true;
        } else if token == "--fix" {
            flags.fix = true;
        } else if token == "--json" {
            flags.json = true;
        } else if token == "--lines" {
            flags.lines = true;
        } else if token == "--target" || token == "-t" {
            if let Some(next) = tokens.get(i + 1) {
                flags.target = parse_target(next);
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--target=") {
            flags.target = parse_target(value);
        } else if token == "--debug-log" {
            if let Some(next) = tokens.get(i + 1) {
                flags.debug_log = Some(PathBuf::from(next));
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--debug-log=") {
            flags.debug_log = Some(PathBuf::from(value));
        }
        i += 1;
    }
    flags
}

fn parse_target(s: &str) -> Option<TargetKind> {
    match s.parse::<LineTerminatorKind>().ok()? {
        LineTerminatorKind::Crlf => Some(TargetKind::Crlf),
        LineTerminatorKind::Cr => Some(TargetKind::Cr),
        LineTerminatorKind::Lf => Some(TargetKind::Lf),
        LineTerminatorKind::Nel => Some(TargetKind::Nel),
        LineTerminatorKind::Ls => Some(TargetKind::Ls),
        LineTerminatorKind::Ps => Some(TargetKind::Ps),
        LineTerminatorKind::None => None,
    }
}
