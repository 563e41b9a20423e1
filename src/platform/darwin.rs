//! macOS policy: application bundles found through Spotlight

use super::{Candidate, IconSource, PlatformKind, PlatformPolicy, last_segment};
use crate::config::PlatformSettings;
use crate::exec::CommandSpec;
use std::path::PathBuf;

const BUNDLE_SUFFIX: &str = ".app";

/// Enumerates `.app` bundles with `mdfind` and opens them with `open`
#[derive(Debug, Clone)]
pub struct DarwinPolicy {
    query: String,
    icon_resource: String,
}

impl DarwinPolicy {
    /// Build the policy from platform settings
    pub fn new(settings: &PlatformSettings) -> Self {
        Self {
            query: settings.darwin_query.clone(),
            icon_resource: settings.darwin_icon_resource.clone(),
        }
    }
}

impl PlatformPolicy for DarwinPolicy {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Darwin
    }

    fn list_command(&self) -> CommandSpec {
        CommandSpec::new("mdfind", [self.query.as_str()])
    }

    fn accepts_entry(&self, entry: &str) -> bool {
        entry.trim_end_matches('/').ends_with(BUNDLE_SUFFIX)
    }

    fn extract_name(&self, entry: &str) -> Option<String> {
        last_segment(entry)
            .strip_suffix(BUNDLE_SUFFIX)
            .map(str::to_string)
    }

    fn candidate_path(&self, entry: &str) -> String {
        entry.trim_end_matches('/').to_string()
    }

    fn icon_source(&self, candidate: &Candidate) -> IconSource {
        IconSource::Container(
            PathBuf::from(&candidate.path)
                .join("Contents")
                .join("Resources")
                .join(&self.icon_resource),
        )
    }

    fn launch_command(&self, path: &str) -> CommandSpec {
        CommandSpec::new("open", [path])
    }
}
