//! Reading sound resources from disk or over HTTP.

use std::io::ErrorKind;

use advsound_core::{Error, Result};
use tracing::debug;
use url::Url;

/// Read the bytes behind a resource location.
pub fn fetch(location: &Url) -> Result<Vec<u8>> {
    match location.scheme() {
        "file" => read_file(location),
        "http" | "https" => fetch_http(location),
        scheme => Err(Error::MalformedResource(format!(
            "cannot read '{location}': unsupported scheme '{scheme}'"
        ))),
    }
}

fn read_file(location: &Url) -> Result<Vec<u8>> {
    let path = location
        .to_file_path()
        .map_err(|()| Error::MalformedResource(format!("'{location}' is not a local path")))?;

    match std::fs::read(&path) {
        Ok(data) => {
            debug!("Read {} bytes from {}", data.len(), path.display());
            Ok(data)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::MalformedResource(format!(
            "{} does not exist",
            path.display()
        ))),
        Err(e) => Err(Error::Fetch(format!("{}: {e}", path.display()))),
    }
}

fn fetch_http(location: &Url) -> Result<Vec<u8>> {
    let mut body = ureq::get(location.as_str())
        .header("Accept", "audio/*, */*")
        .call()
        .map_err(|e| Error::Fetch(format!("HTTP request failed: {e}")))?
        .into_body();

    let data = body
        .read_to_vec()
        .map_err(|e| Error::Fetch(format!("Failed to read response: {e}")))?;

    debug!("Fetched {} bytes from {location}", data.len());
    Ok(data)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

    use super::*;

    #[test]
    fn test_read_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blip.raw");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let url = Url::from_file_path(&path).unwrap();
        assert_eq!(fetch(&url).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::from_file_path(dir.path().join("missing.wav")).unwrap();
        assert!(matches!(fetch(&url), Err(Error::MalformedResource(_))));
    }

    #[test]
    fn test_unsupported_scheme() {
        let url = Url::parse("data:audio/wav;base64,AAAA").unwrap();
        assert!(matches!(fetch(&url), Err(Error::MalformedResource(_))));
    }
}
