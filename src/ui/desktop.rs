//! Opening profiles in the browser and copying identifiers to the clipboard.

use crate::error::{FollowDiffError, Result};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;
use url::Url;

/// Build `https://www.<host>/<identifier>/`.
pub fn profile_url(host: &str, identifier: &str) -> Result<Url> {
    let invalid = || FollowDiffError::InvalidIdentifier {
        identifier: identifier.to_string(),
    };

    if identifier.is_empty()
        || identifier
            .chars()
            .any(|c| c == '/' || c == '?' || c == '#' || c.is_whitespace())
    {
        return Err(invalid());
    }

    Url::parse(&format!("https://www.{}/{}/", host, identifier)).map_err(|_| invalid())
}

/// Side effects that leave the terminal. Swapped out in tests.
pub trait Launcher: Send + Sync {
    fn open_url(&self, url: &Url) -> Result<()>;

    fn copy_text(&self, text: &str) -> Result<()>;
}

/// An external program that reads clipboard content from stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardTool {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

impl ClipboardTool {
    pub const fn new(program: &'static str, args: &'static [&'static str]) -> Self {
        Self { program, args }
    }

    pub fn is_available(&self) -> bool {
        tool_exists(self.program)
    }

    pub fn try_copy(&self, text: &str) -> Result<()> {
        let launch_error = |message: String| FollowDiffError::Launch {
            tool: self.program.to_string(),
            message,
        };

        let mut child = Command::new(self.program)
            .args(self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| launch_error(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| launch_error(e.to_string()))?;
        }

        let status = child.wait().map_err(|e| launch_error(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(launch_error(format!("exited with {}", status)))
        }
    }
}

/// Clipboard tools in the order they are tried.
pub fn clipboard_tools() -> Vec<ClipboardTool> {
    vec![
        ClipboardTool::new("pbcopy", &[]),
        ClipboardTool::new("wl-copy", &[]),
        ClipboardTool::new("xclip", &["-selection", "clipboard"]),
        ClipboardTool::new("xsel", &["--clipboard", "--input"]),
        ClipboardTool::new("clip", &[]),
    ]
}

/// Program and leading arguments used to open a URL on this platform.
pub fn opener_command() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(target_os = "windows") {
        ("cmd", &["/C", "start", ""])
    } else {
        ("xdg-open", &[])
    }
}

fn tool_exists(program: &str) -> bool {
    let finder = if cfg!(target_os = "windows") { "where" } else { "which" };
    Command::new(finder)
        .arg(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Launcher backed by the operating system's own tools.
pub struct SystemLauncher {
    clipboard: Vec<ClipboardTool>,
}

impl SystemLauncher {
    pub fn new() -> Self {
        Self {
            clipboard: clipboard_tools(),
        }
    }

    pub fn with_tools(clipboard: Vec<ClipboardTool>) -> Self {
        Self { clipboard }
    }

    pub fn tools(&self) -> &[ClipboardTool] {
        &self.clipboard
    }
}

impl Default for SystemLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher for SystemLauncher {
    fn open_url(&self, url: &Url) -> Result<()> {
        let (program, args) = opener_command();
        debug!(action = "open", component = "desktop", url = %url, program, "Opening profile");

        let status = Command::new(program)
            .args(args)
            .arg(url.as_str())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| FollowDiffError::Launch {
                tool: program.to_string(),
                message: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(FollowDiffError::Launch {
                tool: program.to_string(),
                message: format!("exited with {}", status),
            })
        }
    }

    fn copy_text(&self, text: &str) -> Result<()> {
        let mut last_error = None;

        for tool in self.clipboard.iter().filter(|tool| tool.is_available()) {
            match tool.try_copy(text) {
                Ok(()) => {
                    debug!(action = "copy", component = "desktop", tool = tool.program, bytes = text.len(), "Copied to clipboard");
                    return Ok(());
                }
                Err(e) => {
                    debug!(action = "copy", component = "desktop", tool = tool.program, error = %e, "Clipboard tool failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FollowDiffError::Launch {
            tool: "clipboard".to_string(),
            message: "no clipboard tool available".to_string(),
        }))
    }
}
