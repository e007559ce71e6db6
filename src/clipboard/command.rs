//! Platform clipboard command selection.
//!
//! [`resolve`] is a pure function over an [`Environment`] snapshot, so the
//! decision table can be tested on any host without spawning anything.

use std::fmt;

use crate::error::DeliveryError;

/// Operating system family relevant to clipboard selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// macOS.
    MacOs,
    /// Windows.
    Windows,
    /// Linux and other Unix-likes with an X11/Wayland desktop.
    Unix,
    /// Anything else.
    Other,
}

impl Os {
    /// Returns the OS this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(windows) {
            Self::Windows
        } else if cfg!(unix) {
            Self::Unix
        } else {
            Self::Other
        }
    }
}

/// Snapshot of the inputs the decision table depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
    /// Host OS family.
    pub os: Os,
    /// `WSL_DISTRO_NAME` is set.
    pub wsl: bool,
    /// `WAYLAND_DISPLAY` is set.
    pub wayland: bool,
    /// `DISPLAY` is set.
    pub x11: bool,
}

impl Environment {
    /// Reads the current OS and display variables.
    #[must_use]
    pub fn detect() -> Self {
        let set = |key: &str| std::env::var_os(key).is_some_and(|v| !v.is_empty());
        Self {
            os: Os::current(),
            wsl: set("WSL_DISTRO_NAME"),
            wayland: set("WAYLAND_DISPLAY"),
            x11: set("DISPLAY"),
        }
    }
}

/// An external command that copies its stdin to the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipboardCommand {
    /// Program to execute.
    pub program: &'static str,
    /// Arguments passed to the program.
    pub args: &'static [&'static str],
    /// Human-readable name of the detected environment, for logs.
    pub environment: &'static str,
}

impl fmt::Display for ClipboardCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program)?;
        for arg in self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

const PBCOPY: ClipboardCommand = ClipboardCommand {
    program: "pbcopy",
    args: &[],
    environment: "macOS",
};

const CLIP_EXE: ClipboardCommand = ClipboardCommand {
    program: "clip.exe",
    args: &[],
    environment: "Windows",
};

const WSL_CLIP_EXE: ClipboardCommand = ClipboardCommand {
    program: "/mnt/c/Windows/System32/clip.exe",
    args: &[],
    environment: "WSL",
};

const WL_COPY: ClipboardCommand = ClipboardCommand {
    program: "wl-copy",
    args: &[],
    environment: "Wayland",
};

const XCLIP: ClipboardCommand = ClipboardCommand {
    program: "xclip",
    args: &["-sel", "clip", "-r", "-in"],
    environment: "Xorg",
};

/// Picks the clipboard command for `env`.
///
/// | Condition                      | Command                              |
/// |--------------------------------|--------------------------------------|
/// | macOS                          | `pbcopy`                             |
/// | Windows                        | `clip.exe`                           |
/// | Unix + `WSL_DISTRO_NAME`       | `/mnt/c/Windows/System32/clip.exe`   |
/// | Unix + `WAYLAND_DISPLAY`       | `wl-copy`                            |
/// | Unix + `DISPLAY`               | `xclip -sel clip -r -in`             |
///
/// # Errors
///
/// Returns [`DeliveryError::UnsupportedEnvironment`] when no row matches.
pub fn resolve(env: &Environment) -> Result<ClipboardCommand, DeliveryError> {
    match env.os {
        Os::MacOs => Ok(PBCOPY),
        Os::Windows => Ok(CLIP_EXE),
        Os::Unix if env.wsl => Ok(WSL_CLIP_EXE),
        Os::Unix if env.wayland => Ok(WL_COPY),
        Os::Unix if env.x11 => Ok(XCLIP),
        Os::Unix => Err(DeliveryError::UnsupportedEnvironment(
            "no WSL_DISTRO_NAME, WAYLAND_DISPLAY or DISPLAY set".to_string(),
        )),
        Os::Other => Err(DeliveryError::UnsupportedEnvironment(
            "unsupported operating system".to_string(),
        )),
    }
}
