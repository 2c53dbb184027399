//! Environment variable presence checks over job script prologue lines.

use regex::Regex;

/// Report whether `name` is exported by any of the prologue `lines`.
///
/// A line counts when it starts (after optional non-word characters) with
/// `export NAME`, optional whitespace and `=`. The leading non-word run means a
/// commented-out `# export NAME=...` line also counts.
pub fn is_set(name: &str, lines: Option<&[String]>) -> bool {
    let Some(lines) = lines.filter(|lines| !lines.is_empty()) else {
        return false;
    };

    let re = export_pattern(name);
    lines.iter().any(|line| re.is_match(line))
}

/// Append `export NAME=VALUE` for every pair whose name the prologue does not
/// already export. Skipped names are logged.
pub fn with_exports(mut lines: Vec<String>, exports: &[(String, String)]) -> Vec<String> {
    for (name, value) in exports {
        if is_set(name, Some(lines.as_slice())) {
            tracing::warn!(name = name.as_str(), "variable already exported in the prologue; skipping");
            continue;
        }
        lines.push(format!("export {}={}", name, value));
    }
    lines
}

fn export_pattern(name: &str) -> Regex {
    // an escaped name always forms a valid pattern
    Regex::new(&format!(r"^\W*export {}\s*=", regex::escape(name)))
        .expect("escaped export pattern is valid")
}
