//! Binary contract documents and their download file names.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ApiError;

/// Raw document payload as returned by `contracts/{id}/document`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractDocument {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl ContractDocument {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the document into `dir` under `filename` and return the path.
    pub fn save(&self, dir: &Path, filename: &str) -> Result<PathBuf, ApiError> {
        let path = dir.join(filename);
        fs::write(&path, &self.bytes).map_err(|e| ApiError::Io(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), bytes = self.bytes.len(), "saved contract document");
        Ok(path)
    }
}

/// `contract-<tenant-name>.pdf`
pub fn document_filename(tenant_name: &str) -> String {
    format!("contract-{}.pdf", sanitize(tenant_name))
}

/// `contract-<id>-v<version>.pdf`
pub fn version_document_filename(contract_id: &str, version_number: u32) -> String {
    format!("contract-{}-v{version_number}.pdf", sanitize(contract_id))
}

fn sanitize(part: &str) -> String {
    part.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect()
}
