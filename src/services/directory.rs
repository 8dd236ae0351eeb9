use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::engine::Engine;
use crate::error::CoreError;
use crate::model::pair::{AvailablePackage, LanguagePair};

/// Process-wide set of installs currently in flight, keyed by
/// `(from_code, to_code)`. Sessions are otherwise isolated, but they share
/// the engine's local package store, so a second install of the same pair
/// must not start while the first one is still downloading.
#[derive(Clone, Default)]
pub struct InstallGuard {
    in_flight: Arc<Mutex<HashSet<(String, String)>>>,
}

impl InstallGuard {
    fn begin(&self, from_code: &str, to_code: &str) -> bool {
        let mut set = match self.in_flight.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        set.insert((from_code.to_string(), to_code.to_string()))
    }

    fn finish(&self, from_code: &str, to_code: &str) {
        let mut set = match self.in_flight.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        set.remove(&(from_code.to_string(), to_code.to_string()));
    }

    #[cfg(test)]
    pub(crate) fn hold(&self, from_code: &str, to_code: &str) -> bool {
        self.begin(from_code, to_code)
    }
}

/// Mirrors the engine's installed set and remote index on demand. Never
/// refreshes on its own; every network trip is driven by a user action.
pub struct PackageDirectory<'e> {
    engine: &'e dyn Engine,
    guard: InstallGuard,
    installed: Vec<LanguagePair>,
    available: Vec<AvailablePackage>,
}

impl<'e> PackageDirectory<'e> {
    pub fn new(engine: &'e dyn Engine, guard: InstallGuard) -> Self {
        Self {
            engine,
            guard,
            installed: Vec::new(),
            available: Vec::new(),
        }
    }

    pub fn installed(&self) -> &[LanguagePair] {
        &self.installed
    }

    pub fn available(&self) -> &[AvailablePackage] {
        &self.available
    }

    /// Re-queries the engine and flattens its installed languages into
    /// directed pairs, deduped by `(from_code, to_code)` keeping the first
    /// occurrence. On engine failure the previous list is kept as-is.
    pub fn refresh_installed(&mut self) -> Result<&[LanguagePair], CoreError> {
        let languages = self
            .engine
            .installed_languages()
            .map_err(|e| CoreError::Refresh(format!("installed packages: {e}")))?;

        let mut pairs = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for lang in languages {
            for target in lang.targets {
                if seen.insert((lang.code.clone(), target.code.clone())) {
                    pairs.push(LanguagePair {
                        from_code: lang.code.clone(),
                        from_name: lang.name.clone(),
                        to_code: target.code,
                        to_name: target.name,
                    });
                }
            }
        }

        self.installed = pairs;
        Ok(&self.installed)
    }

    /// Updates the remote index, then replaces the available list wholesale:
    /// handles from the previous snapshot are stale once the index moves.
    /// Blocking for the duration of the network trip; a failure keeps the
    /// previous list intact.
    pub fn refresh_available(&mut self) -> Result<&[AvailablePackage], CoreError> {
        self.engine
            .update_index()
            .map_err(|e| CoreError::Refresh(format!("package index: {e}")))?;

        let remote = self
            .engine
            .available_packages()
            .map_err(|e| CoreError::Refresh(format!("package index: {e}")))?;

        self.available = remote
            .into_iter()
            .map(|p| AvailablePackage {
                pair: LanguagePair {
                    from_code: p.from_code,
                    from_name: p.from_name,
                    to_code: p.to_code,
                    to_name: p.to_name,
                },
                handle: p.handle,
            })
            .collect();

        Ok(&self.available)
    }

    /// Downloads and installs the first package in index order matching the
    /// requested pair. A failed install leaves the installed list untouched;
    /// a duplicate request for a pair still in flight is refused.
    pub fn install(&mut self, from_code: &str, to_code: &str) -> Result<LanguagePair, CoreError> {
        if !self.guard.begin(from_code, to_code) {
            return Err(CoreError::Install(format!(
                "{from_code} -> {to_code} is already being installed"
            )));
        }

        let result = self.install_inner(from_code, to_code);
        self.guard.finish(from_code, to_code);
        result
    }

    fn install_inner(&self, from_code: &str, to_code: &str) -> Result<LanguagePair, CoreError> {
        let pkg = self
            .available
            .iter()
            .find(|p| p.pair.key() == (from_code, to_code))
            .ok_or_else(|| {
                CoreError::Install(format!("no package for {from_code} -> {to_code}"))
            })?;

        self.engine
            .install(&pkg.handle)
            .map_err(|e| CoreError::Install(e.to_string()))?;

        Ok(pkg.pair.clone())
    }
}
