//! Sound resources: where audio comes from and what it is called.

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// URL schemes the backends know how to read.
const SUPPORTED_SCHEMES: &[&str] = &["file", "http", "https"];

/// A resolved sound resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SoundResource {
    /// Identifier supplied by the caller, usually a file name.
    pub filename: String,
    /// Location the audio bytes are read from.
    pub location: Url,
    /// Lowercase format tag (file extension) used to pick a codec.
    pub format: Option<String>,
}

impl SoundResource {
    /// Resolve a caller-supplied URI and filename.
    ///
    /// `uri` may be a URL or a filesystem path. When it names a directory
    /// (a URL ending in `/`), `filename` is joined onto it.
    pub fn resolve(uri: &str, filename: &str) -> Result<Self> {
        if filename.trim().is_empty() {
            return Err(Error::MalformedResource("empty filename".to_string()));
        }
        if uri.trim().is_empty() {
            return Err(Error::MalformedResource(format!(
                "empty location for '{filename}'"
            )));
        }

        let mut location = parse_location(uri)?;
        if location.path().ends_with('/') {
            location = location.join(filename).map_err(|e| {
                Error::MalformedResource(format!("cannot join '{filename}' onto '{uri}': {e}"))
            })?;
        }

        let format = format_tag(filename).or_else(|| {
            location
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .and_then(format_tag)
        });

        Ok(Self {
            filename: filename.to_string(),
            location,
            format,
        })
    }

    /// Whether the location points at the local filesystem.
    pub fn is_local(&self) -> bool {
        self.location.scheme() == "file"
    }
}

fn parse_location(uri: &str) -> Result<Url> {
    match Url::parse(uri) {
        // Single-letter schemes are Windows drive letters, not URLs.
        Ok(url) if url.scheme().len() > 1 => {
            if SUPPORTED_SCHEMES.contains(&url.scheme()) {
                Ok(url)
            } else {
                Err(Error::MalformedResource(format!(
                    "unsupported scheme '{}' in '{uri}'",
                    url.scheme()
                )))
            }
        }
        Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => path_location(uri),
        Err(e) => Err(Error::MalformedResource(format!("'{uri}': {e}"))),
    }
}

fn path_location(uri: &str) -> Result<Url> {
    let path = std::path::absolute(Path::new(uri))
        .map_err(|e| Error::MalformedResource(format!("'{uri}': {e}")))?;
    let is_dir = uri.ends_with('/') || uri.ends_with(std::path::MAIN_SEPARATOR);
    let url = if is_dir {
        Url::from_directory_path(&path)
    } else {
        Url::from_file_path(&path)
    };
    url.map_err(|()| Error::MalformedResource(format!("'{uri}' is not a usable path")))
}

fn format_tag(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

    use super::*;

    #[test]
    fn test_resolve_file_url() {
        let resource = SoundResource::resolve("file:///tmp/sfx/boom.wav", "boom.wav").unwrap();
        assert_eq!(resource.location.as_str(), "file:///tmp/sfx/boom.wav");
        assert_eq!(resource.format.as_deref(), Some("wav"));
        assert!(resource.is_local());
    }

    #[test]
    fn test_resolve_directory_joins_filename() {
        let resource =
            SoundResource::resolve("https://cdn.example.com/music/", "Theme.OGG").unwrap();
        assert_eq!(
            resource.location.as_str(),
            "https://cdn.example.com/music/Theme.OGG"
        );
        assert_eq!(resource.format.as_deref(), Some("ogg"));
        assert!(!resource.is_local());
    }

    #[test]
    fn test_resolve_plain_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hit.flac");
        let resource = SoundResource::resolve(path.to_str().unwrap(), "hit").unwrap();
        assert!(resource.is_local());
        assert_eq!(resource.location.to_file_path().unwrap(), path);
        // No extension on the filename, so the location supplies it.
        assert_eq!(resource.format.as_deref(), Some("flac"));
    }

    #[test]
    fn test_resolve_rejects_bad_input() {
        assert!(matches!(
            SoundResource::resolve("ftp://example.com/a.wav", "a.wav"),
            Err(Error::MalformedResource(_))
        ));
        assert!(matches!(
            SoundResource::resolve("file:///a.wav", "  "),
            Err(Error::MalformedResource(_))
        ));
        assert!(matches!(
            SoundResource::resolve("", "a.wav"),
            Err(Error::MalformedResource(_))
        ));
        assert!(matches!(
            SoundResource::resolve("http://[::1", "a.wav"),
            Err(Error::MalformedResource(_))
        ));
    }
}
