//! UI bridge
//!
//! The operations the UI shell calls across its process boundary, plus a
//! JSON-lines server for them. Every request is one JSON object per line,
//! internally tagged by `"op"`; every response is one line tagged the same
//! way.
//!
//! ```text
//! -> {"op":"scanApplications"}
//! <- {"op":"scanApplications","records":[{"name":"firefox",...}]}
//! -> {"op":"filterApplications","term":"fire"}
//! -> {"op":"launchApplication","path":"/Applications/Safari.app"}
//! <- {"op":"launchApplication","ok":true}
//! -> {"op":"resolveIconDataUri","path":"/Applications/Safari.app/Contents/Resources/appIcon.icns"}
//! <- {"op":"resolveIconDataUri","dataUri":"data:image/png;base64,..."}
//! ```
//!
//! Icons only ever cross the boundary as data URIs or plain file paths. A line
//! that does not parse yields an `{"op":"error"}` response and the loop keeps
//! reading.

use crate::error::Result;
use crate::icon::{self, AppIcon, IconPayload};
use crate::inventory::{AppRecord, InventoryService};
use crate::launch::LaunchDispatcher;
use crate::session::Session;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Icon as transported to the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IconDto {
    /// Decoded raster encoded as a data URI
    DataUri {
        /// `data:<mime>;base64,<payload>`
        value: String,
    },
    /// File path the UI loads itself
    File {
        /// Icon path
        path: String,
    },
}

/// Application record as transported to the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRecordDto {
    /// Display name
    pub name: String,
    /// Launch path
    pub path: String,
    /// Icon, omitted when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconDto>,
    /// Description line
    pub description: String,
}

impl From<&AppRecord> for AppRecordDto {
    fn from(record: &AppRecord) -> Self {
        let icon = record.icon.as_ref().map(|icon| match icon {
            AppIcon::Raster(raster) => IconDto::DataUri {
                value: icon::to_data_uri(raster),
            },
            AppIcon::File(path) => IconDto::File {
                path: path.to_string_lossy().into_owned(),
            },
        });
        Self {
            name: record.name.clone(),
            path: record.path.clone(),
            icon,
            description: record.description.clone(),
        }
    }
}

/// Result of `scanApplications`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Records in display order, empty on failure
    pub records: Vec<AppRecordDto>,
    /// Enumeration failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of `launchApplication`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchResult {
    /// Whether the open command succeeded
    pub ok: bool,
    /// Launch failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A request line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BridgeRequest {
    /// Run a scan and return its records
    ScanApplications,
    /// Filter the published snapshot
    FilterApplications {
        /// Case-insensitive substring
        term: String,
    },
    /// Open an application
    LaunchApplication {
        /// Launch path from a record
        path: String,
    },
    /// Encode an icon file or base64 bytes as a data URI
    ResolveIconDataUri {
        /// Icon file to read
        #[serde(default)]
        path: Option<String>,
        /// Base64-encoded icon bytes
        #[serde(default)]
        bytes: Option<String>,
    },
    /// The default icon as a data URI
    DefaultIconDataUri,
}

/// A response line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BridgeResponse {
    /// Scan outcome
    ScanApplications {
        /// Records in display order
        records: Vec<AppRecordDto>,
        /// Enumeration failure message
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Filter outcome
    FilterApplications {
        /// Matching records in snapshot order
        records: Vec<AppRecordDto>,
    },
    /// Launch outcome
    LaunchApplication {
        /// Whether the open command succeeded
        ok: bool,
        /// Launch failure message
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Encoded icon, empty when none could be produced
    ResolveIconDataUri {
        /// Data URI or `""`
        data_uri: String,
    },
    /// Encoded default icon
    DefaultIconDataUri {
        /// Data URI
        data_uri: String,
    },
    /// The request could not be handled
    Error {
        /// What went wrong
        message: String,
    },
}

/// Boundary operations over one session
#[derive(Debug)]
pub struct UiBridge {
    session: Arc<Session>,
    inventory: Arc<InventoryService>,
    launcher: LaunchDispatcher,
}

impl UiBridge {
    /// Create the bridge and its inventory service
    ///
    /// # Errors
    ///
    /// Returns an error if the icon worker pool cannot be created.
    pub fn new(session: Arc<Session>) -> Result<Self> {
        let inventory = Arc::new(InventoryService::new(Arc::clone(&session))?);
        let launcher = LaunchDispatcher::new(Arc::clone(&session));
        Ok(Self {
            session,
            inventory,
            launcher,
        })
    }

    /// Inventory service behind the bridge
    pub fn inventory(&self) -> &Arc<InventoryService> {
        &self.inventory
    }

    /// Run a scan and return its records and any enumeration error
    pub fn scan_applications(&self) -> ScanResult {
        let report = self.inventory.scan();
        ScanResult {
            records: report.records().iter().map(AppRecordDto::from).collect(),
            error: report.error().map(ToString::to_string),
        }
    }

    /// Filter the last published snapshot
    pub fn filter_applications(&self, term: &str) -> Vec<AppRecordDto> {
        self.inventory
            .filter(term)
            .iter()
            .map(AppRecordDto::from)
            .collect()
    }

    /// Open an application
    pub fn launch_application(&self, path: &str) -> LaunchResult {
        let outcome = self.launcher.launch(path);
        LaunchResult {
            ok: outcome.ok,
            error: outcome.error.map(|e| e.to_string()),
        }
    }

    /// Encode an icon payload as a data URI, `""` on any failure
    pub fn resolve_icon_data_uri(&self, payload: IconPayload) -> String {
        icon::resolve_icon_data_uri(payload, self.session.files.as_ref())
    }

    /// The default icon as a data URI
    pub fn default_icon_data_uri(&self) -> String {
        icon::placeholder_data_uri()
    }

    /// Dispatch one request
    pub fn handle(&self, request: BridgeRequest) -> BridgeResponse {
        match request {
            BridgeRequest::ScanApplications => {
                let ScanResult { records, error } = self.scan_applications();
                BridgeResponse::ScanApplications { records, error }
            }
            BridgeRequest::FilterApplications { term } => BridgeResponse::FilterApplications {
                records: self.filter_applications(&term),
            },
            BridgeRequest::LaunchApplication { path } => {
                let LaunchResult { ok, error } = self.launch_application(&path);
                BridgeResponse::LaunchApplication { ok, error }
            }
            BridgeRequest::ResolveIconDataUri { path, bytes } => {
                let payload = match (path, bytes) {
                    (Some(path), _) => IconPayload::Path(PathBuf::from(path)),
                    (None, Some(encoded)) => match STANDARD.decode(encoded.as_bytes()) {
                        Ok(bytes) => IconPayload::Bytes(bytes),
                        Err(e) => {
                            warn!("Icon bytes are not valid base64: {e}");
                            return BridgeResponse::ResolveIconDataUri {
                                data_uri: String::new(),
                            };
                        }
                    },
                    (None, None) => {
                        return BridgeResponse::Error {
                            message: "resolveIconDataUri needs `path` or `bytes`".to_string(),
                        };
                    }
                };
                BridgeResponse::ResolveIconDataUri {
                    data_uri: self.resolve_icon_data_uri(payload),
                }
            }
            BridgeRequest::DefaultIconDataUri => BridgeResponse::DefaultIconDataUri {
                data_uri: self.default_icon_data_uri(),
            },
        }
    }

    /// Serve JSON-lines requests until `reader` is exhausted
    ///
    /// # Errors
    ///
    /// Returns an error only when reading or writing the stream fails;
    /// malformed requests are answered and skipped.
    pub fn serve<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<()> {
        info!("UI bridge serving JSON lines");
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<BridgeRequest>(&line) {
                Ok(request) => {
                    debug!("Bridge request: {:?}", request);
                    self.handle(request)
                }
                Err(e) => {
                    warn!("Malformed bridge request: {e}");
                    BridgeResponse::Error {
                        message: format!("malformed request: {e}"),
                    }
                }
            };

            serde_json::to_writer(&mut writer, &response)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        info!("UI bridge input closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, PlatformSettings};
    use crate::platform::LinuxPolicy;
    use crate::test_utils::{MemoryFiles, ScriptedRunner, tiny_png};
    use std::io::Cursor;

    fn linux_bridge(stdout: &str) -> UiBridge {
        let session = Session::new(
            Arc::new(LinuxPolicy::new(&PlatformSettings::default())),
            Arc::new(ScriptedRunner::stdout(stdout)),
            Arc::new(MemoryFiles::default().with_file("/icons/a.png", tiny_png(1))),
            AppConfig::default(),
        );
        UiBridge::new(Arc::new(session)).unwrap()
    }

    fn serve_lines(bridge: &UiBridge, input: &str) -> Vec<serde_json::Value> {
        let mut output = Vec::new();
        bridge.serve(Cursor::new(input), &mut output).unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_request_wire_format() {
        let request: BridgeRequest =
            serde_json::from_str(r#"{"op":"filterApplications","term":"fire"}"#).unwrap();
        assert_eq!(
            request,
            BridgeRequest::FilterApplications {
                term: "fire".to_string()
            }
        );
        let request: BridgeRequest = serde_json::from_str(r#"{"op":"scanApplications"}"#).unwrap();
        assert_eq!(request, BridgeRequest::ScanApplications);
    }

    #[test]
    fn test_response_wire_format() {
        let json = serde_json::to_value(BridgeResponse::ResolveIconDataUri {
            data_uri: "data:image/png;base64,AA==".to_string(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"op": "resolveIconDataUri", "dataUri": "data:image/png;base64,AA=="})
        );
    }

    #[test]
    fn test_record_dto_icon_kinds() {
        let record = AppRecord {
            name: "slack".to_string(),
            path: "/usr/share/applications/slack.desktop".to_string(),
            icon: Some(AppIcon::File(PathBuf::from("/icons/slack.png"))),
            description: "Description of slack".to_string(),
        };
        let json = serde_json::to_value(AppRecordDto::from(&record)).unwrap();
        assert_eq!(json["icon"], serde_json::json!({"kind": "file", "path": "/icons/slack.png"}));

        let bare = AppRecord {
            icon: None,
            ..record
        };
        let json = serde_json::to_value(AppRecordDto::from(&bare)).unwrap();
        assert!(json.get("icon").is_none());
    }

    #[test]
    fn test_serve_scan_then_filter() {
        let bridge = linux_bridge("firefox.desktop\nslack.desktop\n");
        let responses = serve_lines(
            &bridge,
            "{\"op\":\"scanApplications\"}\n{\"op\":\"filterApplications\",\"term\":\"fire\"}\n",
        );
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["records"].as_array().unwrap().len(), 2);
        let filtered = responses[1]["records"].as_array().unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0]["name"], "firefox");
    }

    #[test]
    fn test_serve_malformed_line_continues() {
        let bridge = linux_bridge("");
        let responses = serve_lines(&bridge, "not json\n\n{\"op\":\"defaultIconDataUri\"}\n");
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["op"], "error");
        assert_eq!(responses[1]["op"], "defaultIconDataUri");
        assert!(
            responses[1]["dataUri"]
                .as_str()
                .unwrap()
                .starts_with("data:image/png;base64,")
        );
    }

    #[test]
    fn test_resolve_icon_by_path_and_bytes() {
        let bridge = linux_bridge("");
        let by_path = bridge.handle(BridgeRequest::ResolveIconDataUri {
            path: Some("/icons/a.png".to_string()),
            bytes: None,
        });
        let by_bytes = bridge.handle(BridgeRequest::ResolveIconDataUri {
            path: None,
            bytes: Some(STANDARD.encode(tiny_png(1))),
        });
        assert_eq!(by_path, by_bytes);

        let missing = bridge.handle(BridgeRequest::ResolveIconDataUri {
            path: Some("/icons/none.png".to_string()),
            bytes: None,
        });
        assert_eq!(
            missing,
            BridgeResponse::ResolveIconDataUri {
                data_uri: String::new()
            }
        );
    }

    #[test]
    fn test_resolve_icon_without_payload_is_error() {
        let bridge = linux_bridge("");
        let response = bridge.handle(BridgeRequest::ResolveIconDataUri {
            path: None,
            bytes: None,
        });
        assert!(matches!(response, BridgeResponse::Error { .. }));
    }

    #[test]
    fn test_launch_result() {
        let bridge = linux_bridge("");
        let result = bridge.launch_application("/usr/share/applications/firefox.desktop");
        assert_eq!(
            result,
            LaunchResult {
                ok: true,
                error: None
            }
        );
    }
}
