use std::sync::LazyLock;

use regex::Regex;

static IMPORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^import .*\n?").expect("import pattern is valid")
});

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// Removes `import` lines and `<...>` tags, then trims.
///
/// Tags are matched non-greedily with no notion of nesting, so malformed
/// markup can leave fragments behind. The passes repeat until nothing
/// changes, which makes the function idempotent.
pub fn clean_content(content: &str) -> String {
    let mut current = clean_once(content);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Converts CRLF and lone CR line endings to LF.
pub fn normalize_newlines(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

fn clean_once(content: &str) -> String {
    let without_imports = IMPORT_LINE.replace_all(content, "");
    let without_tags = MARKUP_TAG.replace_all(&without_imports, "");
    without_tags.trim().to_string()
}
