//! Linux policy: freedesktop entries in a fixed applications directory

use super::{Candidate, IconSource, PlatformKind, PlatformPolicy, last_segment};
use crate::config::PlatformSettings;
use crate::exec::CommandSpec;
use std::path::{Path, PathBuf};

const DESKTOP_SUFFIX: &str = ".desktop";

/// Lists desktop entries with `ls` and opens them with `xdg-open`
#[derive(Debug, Clone)]
pub struct LinuxPolicy {
    applications_dir: PathBuf,
    icon_dir: PathBuf,
}

impl LinuxPolicy {
    /// Build the policy from platform settings
    pub fn new(settings: &PlatformSettings) -> Self {
        Self {
            applications_dir: PathBuf::from(&settings.linux_applications_dir),
            icon_dir: PathBuf::from(&settings.linux_icon_dir),
        }
    }
}

impl PlatformPolicy for LinuxPolicy {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Linux
    }

    fn list_command(&self) -> CommandSpec {
        CommandSpec::new("ls", [self.applications_dir.to_string_lossy()])
    }

    fn accepts_entry(&self, entry: &str) -> bool {
        entry.ends_with(DESKTOP_SUFFIX)
    }

    fn extract_name(&self, entry: &str) -> Option<String> {
        last_segment(entry)
            .strip_suffix(DESKTOP_SUFFIX)
            .map(str::to_string)
    }

    fn candidate_path(&self, entry: &str) -> String {
        if Path::new(entry).is_absolute() {
            entry.to_string()
        } else {
            self.applications_dir.join(entry).to_string_lossy().into_owned()
        }
    }

    fn icon_source(&self, candidate: &Candidate) -> IconSource {
        IconSource::File(self.icon_dir.join(format!("{}.png", candidate.name)))
    }

    fn launch_command(&self, path: &str) -> CommandSpec {
        CommandSpec::new("xdg-open", [path])
    }
}
