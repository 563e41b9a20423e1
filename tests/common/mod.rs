//! Shared fakes and fixtures for integration tests

#![allow(dead_code)]

use gotoapp::Session;
use gotoapp::config::{AppConfig, PlatformSettings};
use gotoapp::error::{ExecutionError, FileReadError};
use gotoapp::exec::{CommandOutput, CommandRunner, CommandSpec, FileReader};
use gotoapp::platform::PlatformPolicy;
use parking_lot::{Condvar, Mutex};
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::time::Duration;

/// Runner replaying queued outputs in call order, repeating the last one
#[derive(Debug, Default)]
pub struct QueueRunner {
    queue: Mutex<VecDeque<CommandOutput>>,
    last: Mutex<Option<CommandOutput>>,
    calls: Mutex<Vec<String>>,
}

impl QueueRunner {
    pub fn new(outputs: impl IntoIterator<Item = CommandOutput>) -> Self {
        Self {
            queue: Mutex::new(outputs.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn stdout(stdout: &str) -> Self {
        Self::new([ok(stdout)])
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl CommandRunner for QueueRunner {
    fn execute(
        &self,
        command: &CommandSpec,
        _timeout: Duration,
    ) -> Result<CommandOutput, ExecutionError> {
        self.calls.lock().push(command.to_string());
        let next = self.queue.lock().pop_front();
        let mut last = self.last.lock();
        if let Some(output) = next {
            *last = Some(output);
        }
        Ok(last.clone().unwrap_or_else(|| ok("")))
    }
}

/// Runner failing every command
pub struct FailingRunner(pub fn(&CommandSpec, Duration) -> ExecutionError);

impl CommandRunner for FailingRunner {
    fn execute(
        &self,
        command: &CommandSpec,
        timeout: Duration,
    ) -> Result<CommandOutput, ExecutionError> {
        Err((self.0)(command, timeout))
    }
}

pub fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        stdout: stdout.to_string(),
        stderr: String::new(),
        exit_code: Some(0),
    }
}

pub fn failed(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        stdout: String::new(),
        stderr: stderr.to_string(),
        exit_code: Some(code),
    }
}

/// A latch a test opens to let blocked reads continue
#[derive(Debug, Default)]
pub struct Gate {
    open: Mutex<bool>,
    cond: Condvar,
}

impl Gate {
    pub fn open(&self) {
        *self.open.lock() = true;
        self.cond.notify_all();
    }

    fn wait(&self) {
        let mut open = self.open.lock();
        while !*open {
            self.cond.wait(&mut open);
        }
    }
}

/// In-memory files; reads of gated paths announce themselves and block
#[derive(Default)]
pub struct MemFiles {
    files: HashMap<PathBuf, Vec<u8>>,
    gates: HashMap<PathBuf, (Arc<Gate>, Sender<PathBuf>)>,
}

impl MemFiles {
    pub fn with_file(mut self, path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        self.files.insert(path.into(), bytes);
        self
    }

    pub fn with_gate(
        mut self,
        path: impl Into<PathBuf>,
        gate: Arc<Gate>,
        entered: Sender<PathBuf>,
    ) -> Self {
        self.gates.insert(path.into(), (gate, entered));
        self
    }
}

impl FileReader for MemFiles {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, FileReadError> {
        if let Some((gate, entered)) = self.gates.get(path) {
            let _ = entered.send(path.to_path_buf());
            gate.wait();
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FileReadError::NotFound(path.to_path_buf()))
    }
}

/// Files that are never found; tracks how many reads overlap
#[derive(Debug, Default)]
pub struct CountingFiles {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    reads: AtomicUsize,
}

impl CountingFiles {
    /// Most reads observed running at the same time
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Total reads so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl FileReader for CountingFiles {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, FileReadError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.reads.fetch_add(1, Ordering::SeqCst);
        Err(FileReadError::NotFound(path.to_path_buf()))
    }
}

pub fn session(
    policy: Arc<dyn PlatformPolicy>,
    runner: Arc<dyn CommandRunner>,
    files: Arc<dyn FileReader>,
    worker_limit: usize,
) -> Arc<Session> {
    let mut config = AppConfig::default();
    config.inventory.worker_limit = worker_limit;
    Arc::new(Session::new(policy, runner, files, config))
}

pub fn settings() -> PlatformSettings {
    PlatformSettings::default()
}

pub fn darwin_icon_path(bundle: &str) -> PathBuf {
    PathBuf::from(bundle)
        .join("Contents")
        .join("Resources")
        .join("appIcon.icns")
}

/// Assemble an icon container from `(tag, payload)` pairs
pub fn build_container(chunks: &[([u8; 4], &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (tag, payload) in chunks {
        body.extend_from_slice(tag);
        body.extend_from_slice(&u32::try_from(payload.len() + 8).unwrap().to_be_bytes());
        body.extend_from_slice(payload);
    }
    let mut bytes = b"icns".to_vec();
    bytes.extend_from_slice(&u32::try_from(body.len() + 8).unwrap().to_be_bytes());
    bytes.extend_from_slice(&body);
    bytes
}

/// Encode a `side`×`side` opaque PNG
pub fn tiny_png(side: u32) -> Vec<u8> {
    let pixels = vec![90u8; (side * side * 4) as usize];
    let mut png = Vec::new();
    image::write_buffer_with_format(
        &mut Cursor::new(&mut png),
        &pixels,
        side,
        side,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .unwrap();
    png
}
