use serde::{Deserialize, Serialize};

/// One directed translation capability: from one language to another.
/// `(from_code, to_code)` is the natural key inside any single list.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub from_code: String,
    pub from_name: String,
    pub to_code: String,
    pub to_name: String,
}

impl LanguagePair {
    pub fn key(&self) -> (&str, &str) {
        (&self.from_code, &self.to_code)
    }
}

/// Opaque artifact token issued by the engine's package index. Only valid
/// for the index snapshot it was listed under; a new refresh invalidates it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct PackageHandle(pub String);

/// A remote package that can be downloaded and installed.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AvailablePackage {
    #[serde(flatten)]
    pub pair: LanguagePair,
    pub handle: PackageHandle,
}

/// One completed translation, as shown in the history view.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationRecord {
    pub timestamp: String,
    pub from_lang: String,
    pub to_lang: String,
    pub original: String,
    pub translated: String,
}
