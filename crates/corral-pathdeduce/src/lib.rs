//! Maps an import path to a [`ProjectRoot`] and an ordered list of
//! maybe-sources for the source manager to probe.
//!
//! Deduction runs an ordered set of rules (spec §4.1) and stops at the
//! first that matches or rejects outright; a rule that has nothing to say
//! about a path "passes" to the next one. The slow path — an HTTP
//! meta-tag fetch for hosts the other rules don't recognize — is the only
//! one that needs network access, and is the only one gated by
//! [`PathDeducer`]'s per-host cache.

mod error;
mod hosts;
mod meta;
mod vanity;

use corral_types::ProjectRoot;
use corral_vcs::VcsKind;

pub use error::Error;

/// One plausible (scheme, VCS) combination for a deduced `ProjectRoot`. The
/// source manager probes these in order and accepts the first that
/// succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaybeSource {
    pub url: String,
    pub vcs: VcsKind,
}

/// The result of deducing an import path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduction {
    pub root: ProjectRoot,
    pub candidates: Vec<MaybeSource>,
}

/// Deduce a `ProjectRoot` and its maybe-sources from an import path,
/// without touching the network. Rules 1-4 of spec §4.1 are pure string
/// matching; this function never performs the rule-5 HTTP fallback — use
/// [`PathDeducer::deduce`] when you want that too.
pub fn deduce_offline(import_path: &str) -> Result<Option<Deduction>, Error> {
    if let Some(d) = hosts::well_known_host(import_path)? {
        return Ok(Some(d));
    }
    if let Some(d) = vanity::versioned_vanity(import_path)? {
        return Ok(Some(d));
    }
    if let Some(d) = vanity::vcs_extension_suffix(import_path)? {
        return Ok(Some(d));
    }
    if let Some(d) = vanity::explicit_scheme(import_path)? {
        return Ok(Some(d));
    }
    Ok(None)
}

/// Stateful deducer that additionally runs the HTTP meta-tag fallback
/// (spec §4.1 rule 5) for paths the offline rules don't recognize, caching
/// results per host for the process lifetime.
pub struct PathDeducer {
    client: reqwest::Client,
    cache: meta::MetaCache,
}

impl PathDeducer {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            cache: meta::MetaCache::default(),
        }
    }

    pub async fn deduce(&self, import_path: &str) -> Result<Deduction, Error> {
        if let Some(d) = deduce_offline(import_path)? {
            return Ok(d);
        }
        self.cache.deduce(&self.client, import_path).await
    }
}

impl Default for PathDeducer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_rules_cover_well_known_and_vanity_paths() {
        assert!(deduce_offline("github.com/foo/bar").unwrap().is_some());
        assert!(deduce_offline("gopkg.in/yaml.v2").unwrap().is_some());
        assert!(deduce_offline("example.com/repo.git/sub").unwrap().is_some());
    }

    #[test]
    fn unrecognized_host_falls_through_to_none() {
        assert!(deduce_offline("example.net/some/pkg").unwrap().is_none());
    }
}
