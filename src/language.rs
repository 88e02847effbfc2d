//! Language detection from file paths.

use std::path::Path;

/// Detect the language tag for a path.
///
/// Files named `Makefile`/`makefile` are matched by name before the
/// extension table is consulted. Extensions are compared case-insensitively.
/// Returns an empty string when the language is unknown.
pub fn detect_language(path: &str) -> &'static str {
    let path = Path::new(path);

    match path.file_name().and_then(|n| n.to_str()) {
        Some("Makefile") | Some("makefile") => return "makefile",
        _ => {}
    }

    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_lowercase(),
        None => return "",
    };

    match ext.as_str() {
        "go" => "go",
        "py" => "python",
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "css" => "css",
        "toml" => "toml",
        "md" => "markdown",
        "rs" => "rust",
        "c" | "h" => "c",
        "cpp" | "hpp" => "cpp",
        "java" => "java",
        "rb" => "ruby",
        "php" => "php",
        "sh" | "bash" | "zsh" => "shell",
        "yaml" | "yml" => "yaml",
        "json" => "json",
        "xml" => "xml",
        "html" | "htm" => "html",
        _ => "",
    }
}
