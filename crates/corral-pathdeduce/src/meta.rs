use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use tokio::sync::Mutex as AsyncMutex;

use corral_types::ProjectRoot;
use corral_vcs::VcsKind;

use crate::{Deduction, Error, MaybeSource};

/// Minimum spacing between two meta-tag fetches issued to the same host
/// (spec §4.1 rule 5: "this is the slow path and must be rate-limited").
const MIN_HOST_INTERVAL: Duration = Duration::from_millis(500);

/// The last-resort rule (spec §4.1 rule 5): fetch the import path over
/// HTTPS with `?go-get=1`-style interrogation and scan the response body
/// for a `<meta name="source-import" content="<root> <vcs> <repo-url>">`
/// tag. We don't pull in an HTML parser for this: the tag is always a
/// self-contained `<meta ...>` element, so a small hand-rolled scanner is
/// enough and keeps the dependency list aligned with what the rest of the
/// crate already needs.
///
/// Requests are gated per host: concurrent lookups against the same host
/// serialize on that host's [`AsyncMutex`] (so two tasks racing to deduce
/// two import paths on the same host never fire two requests at once),
/// and the lock's own guard doubles as the last-request clock the
/// `MIN_HOST_INTERVAL` throttle sleeps against before issuing the next
/// one. Distinct hosts proceed fully in parallel.
#[derive(Default)]
pub(crate) struct MetaCache {
    entries: Mutex<FxHashMap<String, Deduction>>,
    host_gates: Mutex<FxHashMap<String, Arc<AsyncMutex<Option<Instant>>>>>,
}

impl MetaCache {
    fn gate_for(&self, host: &str) -> Arc<AsyncMutex<Option<Instant>>> {
        let mut gates = self.host_gates.lock().unwrap();
        gates
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(None)))
            .clone()
    }

    pub(crate) async fn deduce(
        &self,
        client: &reqwest::Client,
        import_path: &str,
    ) -> Result<Deduction, Error> {
        if let Some(cached) = self.entries.lock().unwrap().get(import_path) {
            return Ok(cached.clone());
        }

        let host = import_path.split('/').next().unwrap_or(import_path).to_string();
        let gate = self.gate_for(&host);
        let mut last_request = gate.lock().await;

        // Another task may have filled the cache while we waited for the
        // host gate; re-check before spending a request.
        if let Some(cached) = self.entries.lock().unwrap().get(import_path) {
            return Ok(cached.clone());
        }

        if let Some(last) = *last_request {
            let elapsed = last.elapsed();
            if elapsed < MIN_HOST_INTERVAL {
                tokio::time::sleep(MIN_HOST_INTERVAL - elapsed).await;
            }
        }

        let url = format!("https://{import_path}?corral-get=1");
        let result = client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| Error::MetaFetch { host: host.clone(), source })?
            .text()
            .await
            .map_err(|source| Error::MetaFetch { host: host.clone(), source });
        *last_request = Some(Instant::now());

        let body = result?;
        let deduction = parse_source_import_tag(&body)
            .ok_or_else(|| Error::NoMetaTag(import_path.to_string()))?;
        self.entries
            .lock()
            .unwrap()
            .insert(import_path.to_string(), deduction.clone());
        Ok(deduction)
    }
}

/// Scans for `<meta name="source-import" content="root vcs repo-url">`,
/// tolerating attribute-order variation but not malformed HTML in general.
fn parse_source_import_tag(body: &str) -> Option<Deduction> {
    for tag in find_meta_tags(body) {
        if attr(&tag, "name").as_deref() != Some("source-import") {
            continue;
        }
        let content = attr(&tag, "content")?;
        let mut parts = content.split_whitespace();
        let root = parts.next()?;
        let vcs = parts.next()?;
        let repo_url = parts.next()?;
        let kind = match vcs {
            "git" => VcsKind::Git,
            "hg" => VcsKind::Hg,
            "bzr" => VcsKind::Bzr,
            "svn" => VcsKind::Svn,
            _ => continue,
        };
        return Some(Deduction {
            root: ProjectRoot::new(root.to_string()),
            candidates: vec![MaybeSource {
                url: repo_url.to_string(),
                vcs: kind,
            }],
        });
    }
    None
}

fn find_meta_tags(body: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let bytes = body.as_bytes();
    let mut i = 0;
    while let Some(start) = body[i..].find("<meta") {
        let abs_start = i + start;
        if let Some(end) = body[abs_start..].find('>') {
            let abs_end = abs_start + end;
            tags.push(body[abs_start..=abs_end].to_string());
            i = abs_end + 1;
        } else {
            break;
        }
        if i >= bytes.len() {
            break;
        }
    }
    tags
}

fn attr(tag: &str, name: &str) -> Option<String> {
    let needle = format!("{name}=\"");
    let start = tag.find(&needle)? + needle.len();
    let end = tag[start..].find('"')? + start;
    Some(html_unescape(&tag[start..end]))
}

fn html_unescape(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_source_import_meta_tag() {
        let body = r#"<html><head><meta name="source-import" content="example.com/foo git https://example.com/foo.git"></head></html>"#;
        let d = parse_source_import_tag(body).unwrap();
        assert_eq!(d.root.as_str(), "example.com/foo");
        assert_eq!(d.candidates[0].vcs, VcsKind::Git);
        assert_eq!(d.candidates[0].url, "https://example.com/foo.git");
    }

    #[test]
    fn ignores_unrelated_meta_tags() {
        let body = r#"<meta charset="utf-8"><meta name="description" content="nothing to see">"#;
        assert!(parse_source_import_tag(body).is_none());
    }

    #[test]
    fn skips_unrecognized_vcs_kind_and_keeps_scanning() {
        let body = r#"<meta name="source-import" content="example.com/foo cvs https://example.com/foo">
                      <meta name="source-import" content="example.com/foo hg https://example.com/foo">"#;
        let d = parse_source_import_tag(body).unwrap();
        assert_eq!(d.candidates[0].vcs, VcsKind::Hg);
    }

    #[tokio::test]
    async fn host_gate_is_shared_per_host_and_independent_across_hosts() {
        let cache = MetaCache::default();
        let a = cache.gate_for("example.com");
        let b = cache.gate_for("example.com");
        let c = cache.gate_for("other.com");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[tokio::test]
    async fn second_request_to_same_host_waits_out_the_minimum_interval() {
        let cache = MetaCache::default();
        let gate = cache.gate_for("example.com");
        *gate.lock().await = Some(Instant::now());

        let started = Instant::now();
        let mut last_request = gate.lock().await;
        if let Some(last) = *last_request {
            let elapsed = last.elapsed();
            if elapsed < MIN_HOST_INTERVAL {
                tokio::time::sleep(MIN_HOST_INTERVAL - elapsed).await;
            }
        }
        *last_request = Some(Instant::now());
        drop(last_request);

        assert!(started.elapsed() >= MIN_HOST_INTERVAL - Duration::from_millis(50));
    }
}
