#![no_main]

use gotoapp::config::PlatformSettings;
use gotoapp::inventory::parse_listing;
use gotoapp::platform::{DarwinPolicy, LinuxPolicy, PlatformPolicy, WindowsPolicy};
use libfuzzer_sys::fuzz_target;
use std::collections::HashSet;

fuzz_target!(|data: &[u8]| {
    let Ok(stdout) = std::str::from_utf8(data) else {
        return;
    };

    let settings = PlatformSettings::default();
    let policies: [&dyn PlatformPolicy; 3] = [
        &DarwinPolicy::new(&settings),
        &WindowsPolicy::new(&settings),
        &LinuxPolicy::new(&settings),
    ];

    for policy in policies {
        let candidates = parse_listing(policy, stdout);
        let mut paths = HashSet::new();
        for candidate in &candidates {
            assert!(!candidate.name.is_empty());
            assert!(paths.insert(candidate.path.as_str()));
        }
    }
});
