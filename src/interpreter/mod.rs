//! Python interpreter bridge.
//!
//! Imports a module in a Python subprocess and reads back a snapshot of its
//! namespace. The subprocess runs an embedded inspection script that tags
//! every binding as a module, callable, type or other object and prints a
//! single JSON reply on stdout, on a line of its own after a marker:
//!
//! ```text
//! tooldev-snapshot:{"module": {"name": "pkg", "entries": {"<binding>": <value>, ...}}}
//! tooldev-snapshot:{"error": {"type": "ModuleNotFoundError", "message": "..."}}
//! ```
//!
//! Anything the imported code prints is redirected to stderr by the script.
//! Strings that are not valid UTF-8 (lone surrogates) arrive backslash-escaped.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::namespace::NamespaceSource;
use crate::value::Value;

const SNAPSHOT_SCRIPT: &str = include_str!("snapshot.py");

/// Prefix of the reply line written by the snapshot script.
pub const REPLY_MARKER: &str = "tooldev-snapshot:";

/// Interpreter used when none is configured.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Errors from the interpreter bridge.
#[derive(Debug, Error)]
pub enum InterpreterError {
    #[error("python interpreter `{program}` not found: {source}")]
    NotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The target module could not be imported.
    #[error("cannot import `{target}`: {kind}: {message}")]
    ModuleResolution {
        target: String,
        kind: String,
        message: String,
    },

    #[error("invalid reply from {program} ({status}): {detail}")]
    Protocol {
        program: PathBuf,
        status: String,
        detail: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Reply {
    Module(ModuleSnapshot),
    Error(ImportFailure),
}

#[derive(Debug, Deserialize)]
struct ImportFailure {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// Bindings of an imported module, captured once.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleSnapshot {
    /// The module's `__name__`.
    pub name: String,
    entries: BTreeMap<String, Value>,
}

impl ModuleSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NamespaceSource for ModuleSnapshot {
    fn list_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.entries.get(name).cloned()
    }
}

/// A located Python interpreter.
#[derive(Debug, Clone)]
pub struct Interpreter {
    program: PathBuf,
    search_path: Vec<PathBuf>,
}

impl Interpreter {
    /// Locate `program` on `PATH`. Paths containing a separator are used as given.
    pub fn locate(program: &str) -> Result<Self, InterpreterError> {
        let candidate = Path::new(program);
        let program_path = if candidate.components().count() > 1 {
            candidate.to_path_buf()
        } else {
            which::which(program).map_err(|source| InterpreterError::NotFound {
                program: program.to_string(),
                source,
            })?
        };
        debug!(program = %program_path.display(), "located python interpreter");
        Ok(Self::at(program_path))
    }

    /// Use `program` without searching `PATH`.
    pub fn at(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            search_path: Vec::new(),
        }
    }

    /// Put `dir` ahead of `PYTHONPATH` when importing.
    pub fn with_search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_path.push(dir.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn python_path(&self) -> Option<OsString> {
        if self.search_path.is_empty() {
            return None;
        }
        let inherited = std::env::var_os("PYTHONPATH").unwrap_or_default();
        let dirs = self
            .search_path
            .iter()
            .cloned()
            .chain(std::env::split_paths(&inherited));
        std::env::join_paths(dirs).ok()
    }

    /// Import `target` and capture its namespace.
    pub fn snapshot(&self, target: &str) -> Result<ModuleSnapshot, InterpreterError> {
        debug!(program = %self.program.display(), module = target, "importing module");
        let mut command = Command::new(&self.program);
        command.arg("-c").arg(SNAPSHOT_SCRIPT).arg(target);
        if let Some(python_path) = self.python_path() {
            command.env("PYTHONPATH", python_path);
        }
        let output = command
            .output()
            .map_err(|source| InterpreterError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!(module = target, stderr = %stderr.trim(), "interpreter stderr");
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let reply_line = stdout
            .lines()
            .rev()
            .find_map(|line| line.trim_end().strip_prefix(REPLY_MARKER));
        let reply: Reply = match reply_line.map(serde_json::from_str::<Reply>) {
            Some(Ok(reply)) => reply,
            Some(Err(e)) => return Err(self.protocol_error(&output.status, e.to_string(), &stderr)),
            None => {
                return Err(self.protocol_error(&output.status, "no reply".to_string(), &stderr))
            }
        };

        match reply {
            Reply::Module(snapshot) => {
                if !output.status.success() {
                    warn!(module = target, status = %output.status, "interpreter exited with failure after replying");
                }
                debug!(module = target, entries = snapshot.len(), "captured module namespace");
                Ok(snapshot)
            }
            Reply::Error(failure) => Err(InterpreterError::ModuleResolution {
                target: target.to_string(),
                kind: failure.kind,
                message: failure.message,
            }),
        }
    }

    fn protocol_error(
        &self,
        status: &std::process::ExitStatus,
        detail: String,
        stderr: &str,
    ) -> InterpreterError {
        let excerpt: String = stderr.trim().chars().take(500).collect();
        let detail = if excerpt.is_empty() {
            detail
        } else {
            format!("{detail}; stderr: {excerpt}")
        };
        InterpreterError::Protocol {
            program: self.program.clone(),
            status: status.to_string(),
            detail,
        }
    }
}
