//! Prompt selection between subject and background tiles

use crate::services::PromptRewriter;
use tracing::{info, warn};

/// Guidance texts for the two tile classes of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    /// Used for tiles overlapping a subject box
    pub primary: String,
    /// Used for every other tile
    pub fallback: String,
}

impl PromptSet {
    /// Use `primary` for every tile
    pub fn uniform(primary: impl Into<String>) -> Self {
        let primary = primary.into();
        Self {
            fallback: primary.clone(),
            primary,
        }
    }

    /// Derive the fallback for a run
    ///
    /// An explicit fallback always wins. Otherwise the rewriter is consulted
    /// only when subjects were found; an empty rewrite keeps the primary.
    pub fn resolve(
        primary: String,
        explicit_fallback: Option<&str>,
        subjects_found: bool,
        rewriter: &dyn PromptRewriter,
    ) -> Self {
        if let Some(fallback) = explicit_fallback.filter(|f| !f.trim().is_empty()) {
            return Self {
                primary,
                fallback: fallback.to_string(),
            };
        }
        if !subjects_found {
            return Self::uniform(primary);
        }

        let rewritten = rewriter.rewrite_fallback(&primary);
        if rewritten.trim().is_empty() {
            warn!("Fallback rewrite produced nothing, using the primary prompt");
            return Self::uniform(primary);
        }
        info!(fallback = %rewritten, "Rewrote fallback prompt");
        Self {
            primary,
            fallback: rewritten,
        }
    }

    /// Prompt for a tile given whether it overlaps a subject
    pub fn select(&self, overlaps_subject: bool) -> &str {
        if overlaps_subject {
            &self.primary
        } else {
            &self.fallback
        }
    }
}
