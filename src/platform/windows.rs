//! Windows policy: top-level entries of a fixed program directory
//!
//! Discovery is best effort. Only entries directly under the program
//! directory whose names end in `.exe` are reported, and the icon is always
//! absent.

use super::{
    Candidate, IconSource, PlatformKind, PlatformPolicy, last_segment, strip_suffix_ignore_case,
};
use crate::config::PlatformSettings;
use crate::exec::CommandSpec;

const EXECUTABLE_SUFFIX: &str = ".exe";

/// Lists the program directory with PowerShell and opens entries with `start`
#[derive(Debug, Clone)]
pub struct WindowsPolicy {
    program_dir: String,
}

impl WindowsPolicy {
    /// Build the policy from platform settings
    pub fn new(settings: &PlatformSettings) -> Self {
        Self {
            program_dir: settings.windows_program_dir.clone(),
        }
    }

    /// Re-root an entry under the program directory
    fn rooted(&self, entry: &str) -> String {
        let dir = self.program_dir.trim_end_matches(['\\', '/']);
        let entry = entry.trim_start_matches(['\\', '/']);
        format!("{dir}\\{entry}")
    }
}

impl PlatformPolicy for WindowsPolicy {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Windows
    }

    fn list_command(&self) -> CommandSpec {
        let dir = self.program_dir.replace('\'', "''");
        CommandSpec::new(
            "powershell",
            [
                "-NoProfile".to_string(),
                "-Command".to_string(),
                format!("Get-ChildItem '{dir}' -Name -Directory"),
            ],
        )
    }

    fn accepts_entry(&self, entry: &str) -> bool {
        strip_suffix_ignore_case(entry, EXECUTABLE_SUFFIX).is_some()
    }

    fn extract_name(&self, entry: &str) -> Option<String> {
        strip_suffix_ignore_case(last_segment(entry), EXECUTABLE_SUFFIX).map(str::to_string)
    }

    fn icon_source(&self, _candidate: &Candidate) -> IconSource {
        IconSource::Absent
    }

    fn launch_command(&self, path: &str) -> CommandSpec {
        // The empty argument is the window title `start` expects before a quoted path
        CommandSpec::new("cmd", ["/C", "start", "", self.rooted(path).as_str()])
    }
}
