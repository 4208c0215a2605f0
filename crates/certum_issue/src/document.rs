//! Supporting document upload.

use crate::classifier::ErrorClassifier;
use crate::error::DocumentError;
use crate::form::DocumentState;
use certum_ledger::StorageClient;
use std::sync::Arc;

/// Uploads a draft's supporting document to decentralized storage
pub struct DocumentUploader<S: StorageClient + ?Sized> {
    storage: Arc<S>,
    classifier: ErrorClassifier,
}

impl<S: StorageClient + ?Sized> DocumentUploader<S> {
    /// Create an uploader
    #[must_use]
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            classifier: ErrorClassifier::new(),
        }
    }

    /// Upload `bytes` and record the result on `document`
    ///
    /// The document is marked as uploading for the duration of the call,
    /// which keeps the validator from accepting a submission meanwhile.
    ///
    /// # Errors
    ///
    /// Returns error if the document is empty, another upload is running,
    /// or storage rejects the upload
    pub async fn upload(
        &self,
        document: &mut DocumentState,
        bytes: Vec<u8>,
    ) -> Result<String, DocumentError> {
        if bytes.is_empty() {
            return Err(DocumentError::Empty);
        }
        if document.uploading {
            return Err(DocumentError::AlreadyUploading);
        }

        document.begin_upload();
        let size = bytes.len();
        match self.storage.upload_file(bytes).await {
            Ok(hash) => {
                let url = self.storage.gateway_url(&hash);
                tracing::info!(%hash, size, "document uploaded");
                document.finish_upload(hash, url.clone());
                Ok(url)
            }
            Err(err) => {
                document.abort_upload();
                tracing::warn!(error = %err, "document upload failed");
                Err(DocumentError::Failed(self.classifier.classify_error(&err)))
            }
        }
    }
}
