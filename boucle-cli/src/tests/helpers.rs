//! Test helpers for writing request files into a scratch directory.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tempfile::TempDir;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test file");
}

/// A temporary directory holding one request file.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn request_path(&self) -> Utf8PathBuf {
        self.root.join("request.json")
    }

    pub(super) fn write_request<T: Serialize>(&self, request: &T) {
        let payload = serde_json::to_string_pretty(request).expect("serialize request");
        write_utf8(&self.request_path(), payload.as_bytes());
    }

    pub(super) fn write_raw_request(&self, contents: &[u8]) {
        write_utf8(&self.request_path(), contents);
    }
}
