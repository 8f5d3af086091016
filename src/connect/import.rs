//! Import suggestions from an external paste source
//!
//! A candidate is captured once when an edit session opens. Accepting it
//! parses the string and clears the paste source; rejecting only drops it.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::Result;

use super::parser::{self, ParsedConnection};

/// Characters shown in an import preview
const PREVIEW_CHARS: usize = 100;

/// External clipboard-like source
#[async_trait]
pub trait PasteSource: Send + Sync {
    /// Read current contents
    async fn read(&self) -> Result<Option<String>>;

    /// Clear contents after consumption
    async fn clear(&self) -> Result<()>;
}

/// In-memory paste source
#[derive(Debug, Default)]
pub struct MemoryPasteSource {
    content: RwLock<Option<String>>,
}

impl MemoryPasteSource {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: RwLock::new(Some(content.into())),
        }
    }

    pub async fn set(&self, content: impl Into<String>) {
        *self.content.write().await = Some(content.into());
    }
}

#[async_trait]
impl PasteSource for MemoryPasteSource {
    async fn read(&self) -> Result<Option<String>> {
        Ok(self.content.read().await.clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.content.write().await = Some(String::new());
        Ok(())
    }
}

/// Connection string offered for import; never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportCandidate {
    text: String,
}

impl ImportCandidate {
    /// Wrap text if it starts with a recognized scheme
    pub fn from_text(text: &str) -> Option<Self> {
        if parser::has_known_scheme(text) {
            Some(Self {
                text: text.trim().to_string(),
            })
        } else {
            None
        }
    }

    /// Capture a candidate from the paste source, if suggestions are enabled
    pub async fn capture(source: &dyn PasteSource, enabled: bool) -> Result<Option<Self>> {
        if !enabled {
            return Ok(None);
        }

        let candidate = source
            .read()
            .await?
            .and_then(|text| Self::from_text(&text));

        if candidate.is_some() {
            debug!("Paste source holds a connection string");
        }

        Ok(candidate)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Truncated text for display
    pub fn preview(&self) -> String {
        if self.text.chars().count() > PREVIEW_CHARS {
            let head: String = self.text.chars().take(PREVIEW_CHARS).collect();
            format!("{}...", head)
        } else {
            self.text.clone()
        }
    }

    /// Parse the candidate; on a match the paste source is cleared
    pub async fn accept(self, source: &dyn PasteSource) -> Result<Option<ParsedConnection>> {
        let parsed = parser::parse(&self.text);

        if let Some(p) = &parsed {
            source.clear().await?;
            info!("Imported {} connection string", p.kind());
        }

        Ok(parsed)
    }

    /// Discard the candidate
    pub fn reject(self) {
        debug!("Import suggestion dismissed");
    }
}
