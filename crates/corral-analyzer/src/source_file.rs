//! Parses one source file's package name and import declarations.
//!
//! Source files use a small, ecosystem-wide declaration syntax: an optional
//! leading `package <name>` line, then zero or more `import "path"`
//! statements either standalone or grouped in an `import ( ... )` block. A
//! file named `*_test.src` contributes to a package's test-only imports
//! rather than its main imports. A line-comment `// +ignore` anywhere in
//! the file marks it with the "ignore" build tag tolerated by the
//! multiple-package rule.

use regex::Regex;
use std::sync::LazyLock;

static PACKAGE_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*package\s+([A-Za-z_][A-Za-z0-9_]*)\s*$").unwrap());
static IMPORT_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]+)""#).unwrap());
static IMPORT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)import\s*\(([^)]*)\)").unwrap());
static IMPORT_SINGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s*import\s+"([^"]+)"\s*$"#).unwrap());

pub(crate) struct ParsedFile {
    pub package_name: Option<String>,
    pub imports: Vec<String>,
    pub ignore_tagged: bool,
}

/// Parses a source file's content. Returns `None` if the file isn't a
/// recognized source file at all (no `package` declaration and no
/// imports) rather than treating every unreadable text file as an error —
/// an empty or unrelated file is simply not a contribution to the
/// package, not a parse failure.
pub(crate) fn parse(content: &str) -> Option<ParsedFile> {
    let package_name = PACKAGE_DECL
        .captures(content)
        .map(|c| c[1].to_string());

    let mut imports = Vec::new();
    for block in IMPORT_BLOCK.captures_iter(content) {
        for import in IMPORT_LINE.captures_iter(&block[1]) {
            imports.push(import[1].to_string());
        }
    }
    for import in IMPORT_SINGLE.captures_iter(content) {
        imports.push(import[1].to_string());
    }

    if package_name.is_none() && imports.is_empty() {
        return None;
    }

    let ignore_tagged = content.lines().any(|l| l.trim_start().starts_with("// +ignore"));

    Some(ParsedFile {
        package_name,
        imports,
        ignore_tagged,
    })
}

/// An import is local (relative) rather than a full import path.
pub(crate) fn is_local_import(path: &str) -> bool {
    path == ".." || path.starts_with("./") || path.starts_with("../")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_package_and_single_imports() {
        let src = "package widget\n\nimport \"example.com/a\"\nimport \"example.com/b\"\n";
        let p = parse(src).unwrap();
        assert_eq!(p.package_name.as_deref(), Some("widget"));
        assert_eq!(p.imports, vec!["example.com/a", "example.com/b"]);
    }

    #[test]
    fn parses_import_block() {
        let src = "package widget\n\nimport (\n\t\"example.com/a\"\n\t\"example.com/b\"\n)\n";
        let p = parse(src).unwrap();
        assert_eq!(p.imports, vec!["example.com/a", "example.com/b"]);
    }

    #[test]
    fn detects_ignore_tag() {
        let src = "// +ignore\npackage widget\n";
        assert!(parse(src).unwrap().ignore_tagged);
    }

    #[test]
    fn unrelated_text_is_not_a_source_file() {
        assert!(parse("just some notes\n").is_none());
    }

    #[test]
    fn local_import_detection() {
        assert!(is_local_import(".."));
        assert!(is_local_import("./sibling"));
        assert!(is_local_import("../other"));
        assert!(!is_local_import("example.com/pkg"));
    }
}
