use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::pair::PackageHandle;

pub mod bridge;

/// A language another language can be translated to.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LanguageRef {
    pub code: String,
    pub name: String,
}

/// One installed language together with every target it can translate to,
/// as the engine enumerates them.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InstalledLanguage {
    pub code: String,
    pub name: String,

    #[serde(default)]
    pub targets: Vec<LanguageRef>,
}

/// A package listed in the engine's remote index.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RemotePackage {
    pub from_code: String,
    pub from_name: String,
    pub to_code: String,
    pub to_name: String,
    pub handle: PackageHandle,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("network error: {0}")]
    Network(String),

    #[error("{0}")]
    Api(String),

    #[error("invalid engine response: {0}")]
    Decode(String),
}

/// The boundary to the external translation library. Model loading,
/// inference, downloading and artifact verification all live behind it.
pub trait Engine {
    fn installed_languages(&self) -> Result<Vec<InstalledLanguage>, EngineError>;

    fn translate(&self, text: &str, from_code: &str, to_code: &str)
        -> Result<String, EngineError>;

    fn available_packages(&self) -> Result<Vec<RemotePackage>, EngineError>;

    fn update_index(&self) -> Result<(), EngineError>;

    fn install(&self, handle: &PackageHandle) -> Result<(), EngineError>;
}

#[cfg(test)]
pub(crate) mod mock {
    use std::cell::{Cell, RefCell};

    use super::*;

    /// In-memory engine for service and protocol tests. Interior mutability
    /// lets tests reshape the installed set mid-scenario through `&self`.
    #[derive(Default)]
    pub struct MockEngine {
        pub installed: RefCell<Vec<InstalledLanguage>>,
        pub remote: RefCell<Vec<RemotePackage>>,
        pub installed_handles: RefCell<Vec<String>>,
        pub translate_calls: Cell<usize>,
        pub fail_languages: Cell<bool>,
        pub fail_index: Cell<bool>,
        pub fail_install: Cell<bool>,
        pub fail_translate: Cell<bool>,
    }

    impl MockEngine {
        pub fn add_installed(&self, from: (&str, &str), to: (&str, &str)) {
            let mut langs = self.installed.borrow_mut();
            let target = LanguageRef {
                code: to.0.to_string(),
                name: to.1.to_string(),
            };
            if let Some(lang) = langs.iter_mut().find(|l| l.code == from.0) {
                lang.targets.push(target);
            } else {
                langs.push(InstalledLanguage {
                    code: from.0.to_string(),
                    name: from.1.to_string(),
                    targets: vec![target],
                });
            }
        }

        pub fn add_remote(&self, from: (&str, &str), to: (&str, &str), handle: &str) {
            self.remote.borrow_mut().push(RemotePackage {
                from_code: from.0.to_string(),
                from_name: from.1.to_string(),
                to_code: to.0.to_string(),
                to_name: to.1.to_string(),
                handle: PackageHandle(handle.to_string()),
            });
        }
    }

    impl Engine for MockEngine {
        fn installed_languages(&self) -> Result<Vec<InstalledLanguage>, EngineError> {
            if self.fail_languages.get() {
                return Err(EngineError::Api("engine offline".into()));
            }
            Ok(self.installed.borrow().clone())
        }

        fn translate(
            &self,
            text: &str,
            _from_code: &str,
            to_code: &str,
        ) -> Result<String, EngineError> {
            self.translate_calls.set(self.translate_calls.get() + 1);
            if self.fail_translate.get() {
                return Err(EngineError::Api("no model installed".into()));
            }
            Ok(format!("[{to_code}] {text}"))
        }

        fn available_packages(&self) -> Result<Vec<RemotePackage>, EngineError> {
            if self.fail_index.get() {
                return Err(EngineError::Api("index unreachable".into()));
            }
            Ok(self.remote.borrow().clone())
        }

        fn update_index(&self) -> Result<(), EngineError> {
            if self.fail_index.get() {
                return Err(EngineError::Api("index unreachable".into()));
            }
            Ok(())
        }

        fn install(&self, handle: &PackageHandle) -> Result<(), EngineError> {
            if self.fail_install.get() {
                return Err(EngineError::Api("download failed".into()));
            }
            let pkg = self
                .remote
                .borrow()
                .iter()
                .find(|p| p.handle == *handle)
                .cloned()
                .ok_or_else(|| EngineError::Api("stale package handle".into()))?;

            self.installed_handles.borrow_mut().push(handle.0.clone());
            self.add_installed(
                (&pkg.from_code, &pkg.from_name),
                (&pkg.to_code, &pkg.to_name),
            );
            Ok(())
        }
    }
}
