//! Batched submission of staged verification files.

use std::path::Path;

use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::domain::{AddressHash, FileDescriptor, UploadMode};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid declared type '{mime_type}' for {file}: {source}")]
    InvalidMime {
        file: String,
        mime_type: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("verification upload failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Everything one click of a submit button sends to the explorer.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSubmission {
    pub address_hash: AddressHash,
    pub mode: UploadMode,
    pub files: Vec<FileDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted { status: u16 },
    Failed(String),
}

/// Hands a batch to the submission transport. Implementations must return
/// without waiting for the response.
pub trait UploadSubmitter {
    fn submit(&self, batch: BatchSubmission);
}

pub struct HttpUploadSubmitter {
    http: Client,
    endpoint: String,
    outcomes: mpsc::UnboundedSender<SubmissionOutcome>,
}

impl HttpUploadSubmitter {
    pub fn new(endpoint: impl Into<String>, outcomes: mpsc::UnboundedSender<SubmissionOutcome>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            outcomes,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn send(http: &Client, endpoint: &str, batch: BatchSubmission) -> Result<u16, SubmitError> {
        let form = multipart_form(batch)?;
        let res = http
            .post(endpoint)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.status().as_u16())
    }
}

impl UploadSubmitter for HttpUploadSubmitter {
    fn submit(&self, batch: BatchSubmission) {
        let http = self.http.clone();
        let endpoint = self.endpoint.clone();
        let outcomes = self.outcomes.clone();
        info!(
            endpoint = %endpoint,
            files = batch.files.len(),
            mode = batch.mode.as_str(),
            "upload: submitting batch"
        );
        tokio::spawn(async move {
            let outcome = match Self::send(&http, &endpoint, batch).await {
                Ok(status) => SubmissionOutcome::Accepted { status },
                Err(err) => {
                    warn!("upload: {err}");
                    SubmissionOutcome::Failed(err.to_string())
                }
            };
            let _ = outcomes.send(outcome);
        });
    }
}

/// `address_hash` plus one `file[i]` part per staged file, in queue order.
pub fn multipart_form(batch: BatchSubmission) -> Result<Form, SubmitError> {
    let mut form = Form::new().text("address_hash", batch.address_hash.0);
    for (index, file) in batch.files.into_iter().enumerate() {
        let part = Part::bytes(file.contents)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|source| SubmitError::InvalidMime {
                file: file.name,
                mime_type: file.mime_type,
                source,
            })?;
        form = form.part(format!("file[{index}]"), part);
    }
    Ok(form)
}

/// Reads a file from disk into a descriptor, guessing its declared type
/// from the extension.
pub async fn load_file(path: &Path) -> std::io::Result<FileDescriptor> {
    let contents = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload.bin")
        .to_string();
    Ok(FileDescriptor::from_bytes(name, contents))
}
