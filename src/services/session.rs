use chrono::Local;

use crate::engine::Engine;
use crate::error::CoreError;
use crate::model::pair::{LanguagePair, TranslationRecord};
use crate::services::directory::PackageDirectory;

pub const HISTORY_LIMIT: usize = 10;

/// One user's translation state: the bounded history plus the queries that
/// populate the language selectors. Created on session start, dropped on
/// session end; nothing persists.
pub struct TranslationSession<'e> {
    engine: &'e dyn Engine,
    history: Vec<TranslationRecord>,
}

impl<'e> TranslationSession<'e> {
    pub fn new(engine: &'e dyn Engine) -> Self {
        Self {
            engine,
            history: Vec::new(),
        }
    }

    /// Always-fresh read: forces the directory to re-query the engine before
    /// listing, so a pair installed elsewhere shows up immediately.
    pub fn available_pairs(
        &self,
        directory: &mut PackageDirectory,
    ) -> Result<Vec<LanguagePair>, CoreError> {
        Ok(directory.refresh_installed()?.to_vec())
    }

    /// Whether anything is installed at all; drives the "install packages
    /// first" state in the UI.
    pub fn has_pairs(&self, directory: &mut PackageDirectory) -> Result<bool, CoreError> {
        Ok(!self.available_pairs(directory)?.is_empty())
    }

    /// Distinct source languages across the installed pairs, sorted by code.
    pub fn source_languages(
        &self,
        directory: &mut PackageDirectory,
    ) -> Result<Vec<(String, String)>, CoreError> {
        let mut sources: Vec<(String, String)> = self
            .available_pairs(directory)?
            .into_iter()
            .map(|p| (p.from_code, p.from_name))
            .collect();

        sources.sort();
        sources.dedup();
        Ok(sources)
    }

    /// Installed pairs whose source matches, sorted by target code. An empty
    /// filter result is an explicit error, never a silently empty selector:
    /// the installed set may have changed since the source was picked.
    pub fn targets_for(
        &self,
        directory: &mut PackageDirectory,
        from_code: &str,
    ) -> Result<Vec<LanguagePair>, CoreError> {
        let mut targets: Vec<LanguagePair> = self
            .available_pairs(directory)?
            .into_iter()
            .filter(|p| p.from_code == from_code)
            .collect();

        if targets.is_empty() {
            return Err(CoreError::NoTargetsAvailable(from_code.to_string()));
        }

        targets.sort_by(|a, b| a.to_code.cmp(&b.to_code));
        Ok(targets)
    }

    /// Sends the text to the engine exactly as typed. Blank input is
    /// rejected before the engine is touched; engine failures come back
    /// with the engine's own message and are never retried here.
    pub fn translate(
        &self,
        text: &str,
        from_code: &str,
        to_code: &str,
    ) -> Result<String, CoreError> {
        if text.trim().is_empty() {
            return Err(CoreError::EmptyInput);
        }

        self.engine
            .translate(text, from_code, to_code)
            .map_err(|e| CoreError::Translation(e.to_string()))
    }

    /// Prepends one record and truncates to the most recent ten. Strictly
    /// recency-based; repeated translations are kept as-is.
    pub fn record(
        &mut self,
        from_name: &str,
        to_name: &str,
        original: &str,
        translated: &str,
    ) -> &TranslationRecord {
        self.history.insert(
            0,
            TranslationRecord {
                timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                from_lang: from_name.to_string(),
                to_lang: to_name.to_string(),
                original: original.to_string(),
                translated: translated.to_string(),
            },
        );
        self.history.truncate(HISTORY_LIMIT);

        &self.history[0]
    }

    /// Most recent records first, at most `limit` of them.
    pub fn history(&self, limit: usize) -> &[TranslationRecord] {
        &self.history[..self.history.len().min(limit)]
    }
}
