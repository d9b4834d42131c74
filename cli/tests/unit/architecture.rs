//! Structural tests for layer boundary enforcement.
//!
//! These tests scan source files so the domain / application / infra /
//! presentation split cannot erode silently.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

fn src_dir(sub: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(sub)
}

fn relative(file: &Path) -> String {
    file.strip_prefix(env!("CARGO_MANIFEST_DIR"))
        .unwrap_or(file)
        .display()
        .to_string()
        .replace('\\', "/")
}

/// Non-comment lines outside `#[cfg(test)]` blocks, with 1-based line numbers.
fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let mut tracker = CfgTestTracker::default();
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !tracker.process_line(line))
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.starts_with("//") && !trimmed.starts_with("/*") && !trimmed.starts_with('*')
        })
        .map(|(i, line)| (i + 1, line.to_string()))
        .collect()
}

/// Track brace depth and report whether a line is inside a `#[cfg(test)]` block.
#[derive(Default)]
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn process_line(&mut self, line: &str) -> bool {
        if line.trim().starts_with("#[cfg(") && line.contains("test") {
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

/// Every production line under `dir` containing one of `needles`.
fn scan(dir: &Path, needles: &[&str]) -> Vec<String> {
    let mut violations = Vec::new();
    for file in collect_rs_files(dir) {
        let rel = relative(&file);
        for (lineno, line) in production_lines(&file) {
            if let Some(needle) = needles.iter().find(|n| line.contains(*n)) {
                violations.push(format!("{rel}:{lineno}: `{needle}`: {}", line.trim()));
            }
        }
    }
    violations
}

// ── Layer imports ────────────────────────────────────────────────────────────

#[test]
fn domain_is_pure() {
    let violations = scan(
        &src_dir("domain"),
        &[
            "crate::infra",
            "crate::application",
            "crate::commands",
            "crate::output",
            "tokio",
            "std::fs",
            "std::process",
            "std::net",
        ],
    );
    assert!(
        violations.is_empty(),
        "domain/ must not perform or import I/O:\n{}",
        violations.join("\n")
    );
}

#[test]
fn application_depends_only_on_domain() {
    let violations = scan(
        &src_dir("application"),
        &["crate::infra", "crate::commands", "crate::output"],
    );
    assert!(
        violations.is_empty(),
        "application/ must only import from domain/ and its own ports:\n{}",
        violations.join("\n")
    );
}

#[test]
fn infra_has_no_imports_from_commands_or_output() {
    let violations = scan(&src_dir("infra"), &["crate::commands", "crate::output"]);
    assert!(
        violations.is_empty(),
        "infra/ must not import from commands/ or output/:\n{}",
        violations.join("\n")
    );
}

#[test]
fn infra_and_services_do_not_print() {
    let mut violations = scan(&src_dir("infra"), &["println!", "eprintln!"]);
    violations.extend(scan(
        &src_dir("application"),
        &["println!", "eprintln!"],
    ));
    assert!(
        violations.is_empty(),
        "progress goes through ProgressReporter, diagnostics through tracing:\n{}",
        violations.join("\n")
    );
}

// ── Presentation ─────────────────────────────────────────────────────────────

#[test]
fn no_inline_json_branching_in_commands() {
    let violations = scan(
        &src_dir("commands"),
        &["json: bool", "if json", "if !json", "app.is_json()"],
    );
    assert!(
        violations.is_empty(),
        "Found inline JSON branching in commands/: use app.renderer() instead:\n{}",
        violations.join("\n")
    );
}

#[test]
fn command_runner_is_only_built_in_infra() {
    let mut violations = Vec::new();
    for sub in ["application", "commands", "domain", "output"] {
        violations.extend(scan(&src_dir(sub), &["TokioCommandRunner"]));
    }
    assert!(
        violations.is_empty(),
        "Host commands must go through SystemHost and the port traits:\n{}",
        violations.join("\n")
    );
}

#[test]
fn services_take_trait_bounds_not_concrete_hosts() {
    let violations: Vec<String> = scan(
        &src_dir("application").join("services"),
        &["SystemHost", "NginxSites", "TcpPortProbe", "YamlConfigStore"],
    );
    assert!(
        violations.is_empty(),
        "Services must accept port traits:\n{}",
        violations.join("\n")
    );
}

#[test]
fn command_handlers_accept_app_context() {
    for file in collect_rs_files(&src_dir("commands")) {
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        if content.contains("fn run(") {
            assert!(
                content.contains("app: &AppContext"),
                "{}: run() must take &AppContext",
                relative(&file)
            );
        }
    }
}

#[test]
fn command_handlers_are_reasonably_sized() {
    for file in collect_rs_files(&src_dir("commands")) {
        let count = production_lines(&file)
            .iter()
            .filter(|(_, l)| !l.trim().is_empty())
            .count();
        assert!(
            count <= 100,
            "{}: {count} non-test lines, move logic into application services",
            relative(&file)
        );
    }
}
