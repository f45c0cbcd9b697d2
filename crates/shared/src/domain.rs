use std::fmt;

use serde::{Deserialize, Serialize};

/// Hash of the contract whose source is being verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressHash(pub String);

impl AddressHash {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Channel subject the explorer publishes verification results on.
    pub fn channel_topic(&self) -> String {
        format!("addresses:{}", self.0)
    }
}

impl fmt::Display for AddressHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-file size ceiling enforced by the upload widget (10 MiB).
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadMode {
    /// A single standard-JSON input file.
    Standard,
    /// Many metadata / source files.
    Metadata,
}

impl UploadMode {
    pub fn max_files(self) -> usize {
        match self {
            Self::Standard => 1,
            Self::Metadata => 100,
        }
    }

    pub fn accepted_types(self) -> &'static [&'static str] {
        match self {
            Self::Standard => &["text/plain", "application/json", ".json"],
            Self::Metadata => &["text/plain", "application/json", ".sol", ".json"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Metadata => "metadata",
        }
    }
}

impl std::str::FromStr for UploadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "standard_json" | "standard-json" => Ok(Self::Standard),
            "metadata" | "multi" | "multi_file" | "multi-file" => Ok(Self::Metadata),
            other => Err(format!("unknown upload mode '{other}'")),
        }
    }
}

/// A file the user picked, as the upload widget sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    #[serde(skip)]
    pub contents: Vec<u8>,
}

impl FileDescriptor {
    /// Builds a descriptor for in-memory contents, guessing the declared
    /// type from the file extension the way a browser would.
    pub fn from_bytes(name: impl Into<String>, contents: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = mime_guess::from_path(&name)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();
        Self {
            size_bytes: contents.len() as u64,
            name,
            mime_type,
            contents,
        }
    }

    /// Descriptor without contents; used where only the widget metadata matters.
    pub fn metadata(name: impl Into<String>, size_bytes: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            mime_type: mime_type.into(),
            contents: Vec::new(),
        }
    }

    /// Whether this file satisfies one entry of an upload allow-list.
    ///
    /// `.ext` entries compare the file name suffix case-insensitively,
    /// `type/*` entries compare the MIME base type and anything else must
    /// equal the declared MIME type.
    pub fn matches_accepted(&self, accepted: &str) -> bool {
        let accepted = accepted.trim();
        if accepted.is_empty() {
            return false;
        }
        if accepted.starts_with('.') {
            return self
                .name
                .to_ascii_lowercase()
                .ends_with(&accepted.to_ascii_lowercase());
        }
        if let Some(base) = accepted.strip_suffix("/*") {
            return self
                .mime_type
                .split('/')
                .next()
                .is_some_and(|file_base| file_base.eq_ignore_ascii_case(base));
        }
        self.mime_type.eq_ignore_ascii_case(accepted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    FlattenedCode,
    Sourcify,
    VyperContract,
    StandardJsonInput,
}

impl VerificationMethod {
    pub const ALL: [Self; 4] = [
        Self::FlattenedCode,
        Self::Sourcify,
        Self::VyperContract,
        Self::StandardJsonInput,
    ];

    /// Selected on page entry when the user has not chosen yet.
    pub const DEFAULT: Self = Self::FlattenedCode;
}
