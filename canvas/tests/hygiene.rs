//! Hygiene: enforces coding standards at test time
//!
//! Scans the canvas crate's production sources for patterns that either crash
//! the page (panics in WASM abort the whole engine) or silently lose errors.
//! Each pattern has a budget of zero; the budget never grows.

use std::fs;
use std::path::Path;

struct Rule {
    pattern: &'static str,
    budget: usize,
    why: &'static str,
}

const RULES: &[Rule] = &[
    Rule { pattern: ".unwrap()", budget: 0, why: "panics abort the engine" },
    Rule { pattern: ".expect(", budget: 0, why: "panics abort the engine" },
    Rule { pattern: "panic!(", budget: 0, why: "panics abort the engine" },
    Rule { pattern: "unreachable!(", budget: 0, why: "panics abort the engine" },
    Rule { pattern: "todo!(", budget: 0, why: "stubs must not ship" },
    Rule { pattern: "unimplemented!(", budget: 0, why: "stubs must not ship" },
    Rule { pattern: "let _ =", budget: 0, why: "discards a result without looking" },
    Rule { pattern: ".ok()", budget: 0, why: "discards an error without looking" },
    Rule { pattern: "#[allow(dead_code)]", budget: 0, why: "delete it instead" },
];

struct SourceFile {
    path: String,
    content: String,
}

/// Production `.rs` files under `canvas/src/`, excluding `*_test.rs`.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if path.extension().is_none_or(|e| e != "rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

#[test]
fn sources_were_found() {
    let files = source_files();
    assert!(
        files.iter().any(|f| f.path.ends_with("engine.rs")),
        "hygiene scan found no sources; run from the crate root"
    );
}

#[test]
fn budgets_hold() {
    let files = source_files();
    let mut failures = Vec::new();
    for rule in RULES {
        let found = hits(&files, rule.pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > rule.budget {
            let detail = found
                .iter()
                .map(|(path, c)| format!("    {path}: {c}"))
                .collect::<Vec<_>>()
                .join("\n");
            failures.push(format!(
                "{} budget exceeded ({}): found {count}, max {}\n{detail}",
                rule.pattern, rule.why, rule.budget
            ));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}
