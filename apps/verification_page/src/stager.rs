//! Client-side staging of verification files before submission.

use client_core::{BatchSubmission, UploadSubmitter};
use shared::domain::{AddressHash, FileDescriptor, UploadMode, MAX_FILE_SIZE_BYTES};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dom::{Behavior, PageDom, Region, CLICKABLE_CLASS, HIDDEN_CLASS, QUEUE_STARTED_CLASS};

const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Why the widget declined to stage a file. Shown to the user, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("File is too big ({}MiB). Max filesize: {}MiB.", mib(.size_bytes), .max_bytes / BYTES_PER_MIB)]
    TooLarge { size_bytes: u64, max_bytes: u64 },
    #[error("You can't upload files of this type.")]
    UnsupportedType { name: String, mime_type: String },
    #[error("You can not upload any more files.")]
    QueueFull { max_files: usize },
}

fn mib(bytes: &u64) -> String {
    format!("{:.2}", *bytes as f64 / BYTES_PER_MIB as f64)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub mode: UploadMode,
    pub max_files: usize,
    pub accepted_types: Vec<String>,
    pub max_file_size: u64,
}

impl UploadPolicy {
    pub fn for_mode(mode: UploadMode) -> Self {
        Self {
            mode,
            max_files: mode.max_files(),
            accepted_types: mode
                .accepted_types()
                .iter()
                .map(|accepted| accepted.to_string())
                .collect(),
            max_file_size: MAX_FILE_SIZE_BYTES,
        }
    }

    pub fn check(&self, queued: usize, file: &FileDescriptor) -> Result<(), UploadRejection> {
        if file.size_bytes > self.max_file_size {
            return Err(UploadRejection::TooLarge {
                size_bytes: file.size_bytes,
                max_bytes: self.max_file_size,
            });
        }
        if !self
            .accepted_types
            .iter()
            .any(|accepted| file.matches_accepted(accepted))
        {
            return Err(UploadRejection::UnsupportedType {
                name: file.name.clone(),
                mime_type: file.mime_type.clone(),
            });
        }
        if queued >= self.max_files {
            return Err(UploadRejection::QueueFull {
                max_files: self.max_files,
            });
        }
        Ok(())
    }
}

pub struct UploadStager {
    policy: UploadPolicy,
    address_hash: AddressHash,
    files: Vec<FileDescriptor>,
    submitter: Box<dyn UploadSubmitter>,
}

impl UploadStager {
    pub fn new(
        mode: UploadMode,
        address_hash: AddressHash,
        submitter: Box<dyn UploadSubmitter>,
    ) -> Self {
        Self::with_policy(UploadPolicy::for_mode(mode), address_hash, submitter)
    }

    pub fn with_policy(
        policy: UploadPolicy,
        address_hash: AddressHash,
        submitter: Box<dyn UploadSubmitter>,
    ) -> Self {
        Self {
            policy,
            address_hash,
            files: Vec::new(),
            submitter,
        }
    }

    pub fn mode(&self) -> UploadMode {
        self.policy.mode
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn queue_length(&self) -> usize {
        self.files.len()
    }

    pub fn submit_enabled(&self) -> bool {
        !self.files.is_empty()
    }

    /// Mounts the widget on its container and mirrors the queue into the
    /// (possibly freshly rendered) form.
    pub fn attach(&self, dom: &mut dyn PageDom) {
        let mode = self.mode();
        if mode == UploadMode::Standard {
            dom.set_class(Region::dropzone(mode), CLICKABLE_CLASS, false);
        }
        dom.set_class(
            Region::queue_indicator(mode),
            QUEUE_STARTED_CLASS,
            self.submit_enabled(),
        );
        self.sync_submit(dom);
        dom.bind(Behavior::Upload);
    }

    pub fn add_file(
        &mut self,
        dom: &mut dyn PageDom,
        file: FileDescriptor,
    ) -> Result<(), UploadRejection> {
        if let Err(rejection) = self.policy.check(self.files.len(), &file) {
            warn!(file = %file.name, %rejection, "upload: file rejected");
            dom.set_text(Region::FileHelpBlock, &rejection.to_string());
            return Err(rejection);
        }

        debug!(file = %file.name, size = file.size_bytes, "upload: file staged");
        self.files.push(file);
        self.sync_submit(dom);
        dom.set_text(Region::FileHelpBlock, "");
        dom.set_class(Region::queue_indicator(self.mode()), QUEUE_STARTED_CLASS, true);
        Ok(())
    }

    /// Unstages the first file equal to `file`. Remaining files keep their
    /// order.
    pub fn remove_file(&mut self, dom: &mut dyn PageDom, file: &FileDescriptor) -> bool {
        let Some(index) = self.files.iter().position(|staged| staged == file) else {
            return false;
        };
        self.files.remove(index);
        self.sync_submit(dom);
        if self.files.is_empty() {
            dom.set_class(Region::queue_indicator(self.mode()), QUEUE_STARTED_CLASS, false);
        }
        true
    }

    /// Hands every staged file to the submitter in one batch. With nothing
    /// staged, hides the loading indicator instead. Returns whether a batch
    /// was submitted.
    pub fn process_queue(&mut self, dom: &mut dyn PageDom) -> bool {
        if self.files.is_empty() {
            debug!("upload: nothing to submit");
            dom.set_class(Region::LoadingIndicator, HIDDEN_CLASS, true);
            return false;
        }

        info!(files = self.files.len(), mode = self.mode().as_str(), "upload: processing queue");
        self.submitter.submit(BatchSubmission {
            address_hash: self.address_hash.clone(),
            mode: self.mode(),
            files: self.files.clone(),
        });
        true
    }

    fn sync_submit(&self, dom: &mut dyn PageDom) {
        dom.set_disabled(Region::submit_button(self.mode()), !self.submit_enabled());
    }
}

#[cfg(test)]
#[path = "tests/stager_tests.rs"]
mod tests;
