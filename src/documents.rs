//! Pre-published pay-request documents served under `/.well-known/lnurlp/`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::protocol::{PayRequest, address::is_valid_username};

#[async_trait]
pub trait DocumentProvider: Send + Sync {
    async fn lookup(&self, identifier: &str) -> Result<Option<PayRequest>>;
}

#[derive(Default)]
pub struct InMemoryDocuments {
    documents: HashMap<String, PayRequest>,
}

impl InMemoryDocuments {
    pub fn with(mut self, identifier: &str, document: PayRequest) -> Self {
        self.documents.insert(identifier.to_string(), document);
        self
    }
}

#[async_trait]
impl DocumentProvider for InMemoryDocuments {
    async fn lookup(&self, identifier: &str) -> Result<Option<PayRequest>> {
        Ok(self.documents.get(identifier).cloned())
    }
}

/// One JSON file per identifier, `<root>/<identifier>`.
pub struct DirectoryDocuments {
    root: PathBuf,
}

impl DirectoryDocuments {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentProvider for DirectoryDocuments {
    async fn lookup(&self, identifier: &str) -> Result<Option<PayRequest>> {
        if !is_valid_username(identifier) {
            return Ok(None);
        }

        let path = self.root.join(identifier);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };

        let document: PayRequest = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        document
            .validate()
            .with_context(|| format!("validating {}", path.display()))?;
        Ok(Some(document))
    }
}
