use corral_types::{Lock, Manifest};

/// Parses a dependency's own manifest and lock files out of its exported
/// source tree. The concrete on-disk format is a CLI-level concern (spec
/// §6); the source manager only needs *something* that can turn bytes
/// into the shared domain types, so it depends on this trait rather than
/// a serialization crate directly.
pub trait ManifestParser: Send + Sync {
    fn parse_manifest(&self, bytes: &[u8]) -> Option<Manifest>;
    fn parse_lock(&self, bytes: &[u8]) -> Option<Lock>;
}
