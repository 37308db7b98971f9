//! Schema linting - static analysis of schema files.
//!
//! Checks schema files for:
//! - JSON syntax errors
//! - Keywords with the wrong shape (checked against the bundled dialect meta-schema)
//! - Patterns that do not compile
//! - Incorrect usage the validator would only report at runtime: missing or
//!   unknown `type`, `format` on non-strings, unknown formats

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::loader::load_document;
use crate::pattern::compile_pattern;
use crate::types::{SchemaType, TypeSpec, BUILT_IN_TYPES, KNOWN_FORMATS};

/// Meta-schema describing the keywords this crate understands.
const DIALECT_META_SCHEMA: &str = include_str!("dialect.json");

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic message from linting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub file: PathBuf,
    /// JSON path to the issue (e.g., "/properties/id/type")
    pub path: String,
    pub message: String,
}

/// Result of linting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Status of a linted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

/// Result of linting a directory or set of files.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true if all files passed (no errors).
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

/// Lint a file or directory.
///
/// If path is a directory, recursively finds all .json files.
/// If `strict` is true, files with warnings count as failed.
pub fn lint(path: &Path, strict: bool) -> LintResult {
    let files = collect_schema_files(path);
    let mut results = Vec::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        let file_result = lint_file(file, path);
        total_errors += file_result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        total_warnings += file_result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        results.push(file_result);
    }

    let failed = results
        .iter()
        .filter(|r| {
            if strict {
                r.status != FileStatus::Ok
            } else {
                r.status == FileStatus::Error
            }
        })
        .count();

    tracing::debug!(files = files.len(), failed, "lint finished");

    LintResult {
        path: path.to_path_buf(),
        files_checked: files.len(),
        passed: files.len() - failed,
        failed,
        errors: total_errors,
        warnings: total_warnings,
        results,
    }
}

/// Lint a single schema file.
pub fn lint_file(file: &Path, base_path: &Path) -> FileResult {
    let display = file.strip_prefix(base_path).unwrap_or(file).to_path_buf();

    let diagnostics = match load_document(file) {
        Ok(schema) => lint_value(&schema, file),
        Err(e) => vec![Diagnostic {
            severity: Severity::Error,
            code: "E001".to_string(),
            file: file.to_path_buf(),
            path: "/".to_string(),
            message: format!("syntax error: {}", e),
        }],
    };

    let has_errors = diagnostics.iter().any(|d| d.severity == Severity::Error);
    let has_warnings = diagnostics.iter().any(|d| d.severity == Severity::Warning);
    let status = if has_errors {
        FileStatus::Error
    } else if has_warnings {
        FileStatus::Warning
    } else {
        FileStatus::Ok
    };

    FileResult {
        file: display,
        status,
        diagnostics,
    }
}

/// Lint an in-memory schema. `file` is only used to label diagnostics.
pub fn lint_value(schema: &Value, file: &Path) -> Vec<Diagnostic> {
    let mut sink = Sink {
        file,
        diagnostics: Vec::new(),
    };
    check_dialect(schema, &mut sink);
    check_node(schema, "", None, &mut sink);
    sink.diagnostics
}

struct Sink<'a> {
    file: &'a Path,
    diagnostics: Vec<Diagnostic>,
}

impl Sink<'_> {
    fn push(&mut self, severity: Severity, code: &str, path: &str, message: String) {
        self.diagnostics.push(Diagnostic {
            severity,
            code: code.to_string(),
            file: self.file.to_path_buf(),
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            message,
        });
    }
}

/// Check keyword shapes against the dialect meta-schema.
fn check_dialect(schema: &Value, sink: &mut Sink<'_>) {
    let meta = match serde_json::from_str::<Value>(DIALECT_META_SCHEMA) {
        Ok(meta) => meta,
        Err(e) => {
            sink.push(Severity::Error, "E002", "", format!("dialect meta-schema unreadable: {}", e));
            return;
        }
    };
    let validator = match jsonschema::validator_for(&meta) {
        Ok(validator) => validator,
        Err(e) => {
            sink.push(Severity::Error, "E002", "", format!("dialect meta-schema invalid: {}", e));
            return;
        }
    };
    for error in validator.iter_errors(schema) {
        let path = error.instance_path.to_string();
        sink.push(Severity::Error, "E002", &path, format!("malformed keyword: {}", error));
    }
}

/// Recursively check one schema node and its children.
///
/// `inherited` is the parent's type for `anyOf`/`oneOf` branches, which
/// take it over when they have no `type` of their own.
fn check_node(node: &Value, path: &str, inherited: Option<&TypeSpec>, sink: &mut Sink<'_>) {
    let Value::Object(map) = node else {
        return;
    };

    let spec = match (TypeSpec::of(node), inherited) {
        (TypeSpec::Missing, Some(parent)) => parent.clone(),
        (own, _) => {
            check_type(node, &own, path, sink);
            own
        }
    };

    if let Some(format) = map.get("format").and_then(Value::as_str) {
        if !KNOWN_FORMATS.contains(&format) {
            sink.push(
                Severity::Warning,
                "W004",
                &format!("{}/format", path),
                format!("unknown format \"{}\": expected {}", format, KNOWN_FORMATS.join(", ")),
            );
        }
        if let TypeSpec::Single(ty) = &spec {
            if *ty != SchemaType::String {
                sink.push(
                    Severity::Warning,
                    "W003",
                    &format!("{}/format", path),
                    format!("format \"{}\" is ignored on type {}", format, ty),
                );
            }
        }
    }

    if let Some(pattern) = map.get("pattern").and_then(Value::as_str) {
        check_pattern(pattern, &format!("{}/pattern", path), sink);
    }

    for (key, child) in map {
        let child_path = format!("{}/{}", path, escape_pointer(key));
        match key.as_str() {
            "items" => check_node(child, &child_path, None, sink),
            "additionalProperties" => check_node(child, &child_path, None, sink),
            "properties" | "patternProperties" => {
                if let Value::Object(children) = child {
                    for (name, schema) in children {
                        let name_path = format!("{}/{}", child_path, escape_pointer(name));
                        if key == "patternProperties" {
                            check_pattern(name, &name_path, sink);
                        }
                        check_node(schema, &name_path, None, sink);
                    }
                }
            }
            "anyOf" | "oneOf" => {
                if let Value::Array(branches) = child {
                    let parent = (spec != TypeSpec::Missing).then_some(&spec);
                    for (i, branch) in branches.iter().enumerate() {
                        check_node(branch, &format!("{}/{}", child_path, i), parent, sink);
                    }
                }
            }
            _ => {}
        }
    }
}

fn check_type(node: &Value, spec: &TypeSpec, path: &str, sink: &mut Sink<'_>) {
    let type_path = format!("{}/type", path);
    match spec {
        TypeSpec::Missing => {
            // A combinator whose branches all carry a type supplies one.
            let typed_by_branches = ["anyOf", "oneOf"].iter().any(|key| {
                node.get(*key)
                    .and_then(Value::as_array)
                    .map_or(false, |b| !b.is_empty() && b.iter().all(|s| s.get("type").is_some()))
            });
            if !typed_by_branches {
                sink.push(
                    Severity::Warning,
                    "W001",
                    path,
                    "schema node has no \"type\" and accepts any value".to_string(),
                );
            }
        }
        TypeSpec::Unknown(name) => sink.push(
            Severity::Warning,
            "W002",
            &type_path,
            format!("unknown type {}: expected {}", name, BUILT_IN_TYPES.join(", ")),
        ),
        TypeSpec::Multi(list) => {
            for (i, entry) in list.iter().enumerate() {
                if let Err(name) = entry {
                    sink.push(
                        Severity::Warning,
                        "W002",
                        &format!("{}/{}", type_path, i),
                        format!("unknown type {}: expected {}", name, BUILT_IN_TYPES.join(", ")),
                    );
                }
            }
        }
        TypeSpec::Single(_) => {}
    }
}

fn check_pattern(pattern: &str, path: &str, sink: &mut Sink<'_>) {
    if let Err(reason) = compile_pattern(pattern) {
        sink.push(
            Severity::Error,
            "E003",
            path,
            format!("invalid pattern {}: {}", pattern, reason),
        );
    }
}

/// Escape a key for use in a JSON Pointer (~ becomes ~0, / becomes ~1).
fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Collect all .json files in a path (file or directory).
fn collect_schema_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            return vec![path.to_path_buf()];
        }
        return vec![];
    }

    let mut files = Vec::new();
    collect_files_recursive(path, &mut files);
    files.sort();
    files
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files);
        } else if path.extension().map(|e| e == "json").unwrap_or(false) {
            files.push(path);
        }
    }
}
