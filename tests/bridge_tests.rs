//! Integration tests for the JSON-lines UI bridge

mod common;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use common::{
    MemFiles, QueueRunner, build_container, darwin_icon_path, failed, ok, session, settings,
    tiny_png,
};
use gotoapp::bridge::UiBridge;
use gotoapp::platform::{DarwinPolicy, LinuxPolicy};
use serde_json::{Value, json};
use std::io::Cursor;
use std::sync::Arc;

fn serve(bridge: &UiBridge, lines: &[Value]) -> Vec<Value> {
    let input: String = lines.iter().map(|line| format!("{line}\n")).collect();
    let mut output = Vec::new();
    bridge.serve(Cursor::new(input), &mut output).unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_darwin_scan_sends_icons_as_data_uris() {
    let png = tiny_png(2);
    let files = MemFiles::default()
        .with_file(
            darwin_icon_path("/Applications/Safari.app"),
            build_container(&[(*b"ic07", png.as_slice())]),
        );
    let bridge = UiBridge::new(session(
        Arc::new(DarwinPolicy::new(&settings())),
        Arc::new(QueueRunner::stdout(
            "/Applications/Notes.app\n/Applications/Safari.app\n",
        )),
        Arc::new(files),
        2,
    ))
    .unwrap();

    let responses = serve(&bridge, &[json!({"op": "scanApplications"})]);
    let records = responses[0]["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "Safari");
    assert_eq!(records[0]["icon"]["kind"], "dataUri");
    let uri = records[0]["icon"]["value"].as_str().unwrap();
    let encoded = uri.strip_prefix("data:image/png;base64,").unwrap();
    assert_eq!(STANDARD.decode(encoded).unwrap(), png);
    assert_eq!(records[1]["name"], "Notes");
    assert!(records[1].get("icon").is_none());
    assert!(responses[0].get("error").is_none());
}

#[test]
fn test_scan_error_crosses_boundary() {
    let bridge = UiBridge::new(session(
        Arc::new(LinuxPolicy::new(&settings())),
        Arc::new(QueueRunner::new([failed(2, "no such directory")])),
        Arc::new(MemFiles::default()),
        2,
    ))
    .unwrap();

    let responses = serve(&bridge, &[json!({"op": "scanApplications"})]);
    assert_eq!(responses[0]["records"], json!([]));
    assert!(
        responses[0]["error"]
            .as_str()
            .unwrap()
            .contains("no such directory")
    );
}

#[test]
fn test_full_session() {
    let bridge = UiBridge::new(session(
        Arc::new(LinuxPolicy::new(&settings())),
        Arc::new(QueueRunner::new([
            ok("firefox.desktop\nslack.desktop\n"),
            ok(""),
            failed(4, "xdg-open: no method available"),
        ])),
        Arc::new(MemFiles::default()),
        2,
    ))
    .unwrap();

    let responses = serve(
        &bridge,
        &[
            json!({"op": "scanApplications"}),
            json!({"op": "filterApplications", "term": "SLA"}),
            json!({"op": "launchApplication", "path": "/usr/share/applications/slack.desktop"}),
            json!({"op": "launchApplication", "path": "/usr/share/applications/gone.desktop"}),
            json!({"op": "bogus"}),
            json!({"op": "defaultIconDataUri"}),
        ],
    );

    assert_eq!(responses.len(), 6);
    assert_eq!(responses[1]["records"][0]["name"], "slack");
    assert_eq!(
        responses[1]["records"][0]["icon"],
        json!({"kind": "file", "path": "/usr/share/icons/hicolor/256x256/apps/slack.png"})
    );
    assert_eq!(responses[2], json!({"op": "launchApplication", "ok": true}));
    assert_eq!(responses[3]["ok"], false);
    assert!(
        responses[3]["error"]
            .as_str()
            .unwrap()
            .contains("exited with code 4")
    );
    assert_eq!(responses[4]["op"], "error");
    assert_eq!(responses[5]["op"], "defaultIconDataUri");
}

#[test]
fn test_resolve_icon_data_uri_requests() {
    let png = tiny_png(1);
    let files = MemFiles::default()
        .with_file("/icons/app.icns", build_container(&[(*b"ic11", png.as_slice())]))
        .with_file("/icons/plain.png", png.clone());
    let bridge = UiBridge::new(session(
        Arc::new(LinuxPolicy::new(&settings())),
        Arc::new(QueueRunner::stdout("")),
        Arc::new(files),
        1,
    ))
    .unwrap();

    let responses = serve(
        &bridge,
        &[
            json!({"op": "resolveIconDataUri", "path": "/icons/app.icns"}),
            json!({"op": "resolveIconDataUri", "path": "/icons/plain.png"}),
            json!({"op": "resolveIconDataUri", "bytes": STANDARD.encode(&png)}),
            json!({"op": "resolveIconDataUri", "path": "/icons/missing.icns"}),
            json!({"op": "resolveIconDataUri", "bytes": "%%%"}),
        ],
    );

    let expected = format!("data:image/png;base64,{}", STANDARD.encode(&png));
    assert_eq!(responses[0]["dataUri"], expected.as_str());
    assert_eq!(responses[1]["dataUri"], expected.as_str());
    assert_eq!(responses[2]["dataUri"], expected.as_str());
    assert_eq!(responses[3]["dataUri"], "");
    assert_eq!(responses[4]["dataUri"], "");
}
