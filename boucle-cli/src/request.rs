//! JSON request loading and response writing shared by every command.

use std::io::{BufReader, Write};

use camino::Utf8Path;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CliError;
use crate::fs::open_utf8_file;

/// Load a JSON-encoded request from disk.
pub(crate) fn load_request<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenRequest {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseRequest {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `response` as pretty JSON followed by a newline.
pub(crate) fn write_response<T: Serialize>(
    writer: &mut dyn Write,
    response: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(response).map_err(CliError::SerializeResponse)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}
