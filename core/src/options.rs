//! Verifier configuration.

use crate::{key::KeyChecks, list_proof::MAX_LIST_DEPTH};

/// Options of the proof verifiers.
#[derive(Debug, Clone)]
pub struct Options {
    pub(crate) key_checks: KeyChecks,
    pub(crate) max_list_depth: u8,
}

impl Options {
    /// Create a new `Options` instance with the default values: strict key checks and the
    /// full depth of the 64-bit list index domain.
    pub fn new() -> Self {
        Self {
            key_checks: KeyChecks::Strict,
            max_list_depth: MAX_LIST_DEPTH,
        }
    }

    /// Set how branch keys of map proofs are validated.
    ///
    /// [`KeyChecks::Relaxed`] skips the scan for set bits after the significant bits of every
    /// branch key. The range of the significant bits is checked regardless.
    ///
    /// Default: strict.
    pub fn key_checks(&mut self, key_checks: KeyChecks) {
        self.key_checks = key_checks;
    }

    /// Set the maximum depth at which list proof nodes may appear. Callers which know an upper
    /// bound on the size of the list may tighten it. Values over 64 are clamped to 64.
    ///
    /// Default: 64.
    pub fn max_list_depth(&mut self, max_list_depth: u8) {
        self.max_list_depth = core::cmp::min(max_list_depth, MAX_LIST_DEPTH);
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}
