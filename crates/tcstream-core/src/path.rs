//! Path rewriting between the local workspace and the runner's filesystem.
//!
//! A test process may run inside a container or on a remote host where the
//! project lives under a different root. Outbound arguments are rewritten
//! local → remote, paths in parsed events remote → local.

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

use crate::classifier::compile;
use crate::event::ParsedEvent;

/// Tokens replaced with the working directory.
const WORKSPACE_PLACEHOLDER_PATTERN: &str = r"\$\{?(?:PWD|workspaceFolder)\}?";

/// A drive-letter path segment, up to the next colon.
const WINDOWS_PATH_PATTERN: &str = r"\w:[\\/][^:]+";

const LOCATION_SCHEME: &str = "php_qn://";
const LOCATION_SCHEME_GUARD: &str = "php_qn:||";
const VFS_COMPOSER_SCHEME: &str = "phpvfscomposer://";

/// One `local → remote` prefix pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMapping {
    pub local: String,
    pub remote: String,
}

impl PathMapping {
    pub fn new(local: impl Into<String>, remote: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            remote: remote.into(),
        }
    }
}

/// Bidirectional path rewriter for one command execution.
///
/// Mapping entries are applied in insertion order and every entry is
/// applied, so a later entry can rewrite the result of an earlier one. With
/// no entries only placeholder substitution and separator normalization
/// happen.
#[derive(Debug, Clone)]
pub struct PathTranslator {
    cwd: String,
    mapping: Vec<PathMapping>,
    placeholders: Option<Regex>,
    windows_path: Option<Regex>,
}

impl PathTranslator {
    /// Translator without any mapping entry.
    pub fn new(cwd: impl Into<String>) -> Self {
        Self {
            cwd: cwd.into(),
            mapping: Vec::new(),
            placeholders: compile(WORKSPACE_PLACEHOLDER_PATTERN),
            windows_path: compile(WINDOWS_PATH_PATTERN),
        }
    }

    /// Translator with mapping entries; placeholders in both ends are
    /// resolved against `cwd` once, here.
    pub fn with_mapping(cwd: impl Into<String>, mapping: &[PathMapping]) -> Self {
        let mut translator = Self::new(cwd);
        translator.mapping = mapping
            .iter()
            .map(|entry| PathMapping {
                local: translator.replace_workspace_folder(&entry.local),
                remote: translator.replace_workspace_folder(&entry.remote),
            })
            .collect();
        translator
    }

    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// Resolved mapping entries in application order.
    pub fn mapping(&self) -> &[PathMapping] {
        &self.mapping
    }

    /// Substitute `${PWD}` / `${workspaceFolder}` (braces optional).
    pub fn replace_workspace_folder(&self, path: &str) -> String {
        match self.placeholders.as_ref() {
            Some(re) => re.replace_all(path, NoExpand(&self.cwd)).into_owned(),
            None => path.to_string(),
        }
    }

    /// Rewrite a local path for use on the runner's side.
    pub fn local_to_remote(&self, path: &str) -> String {
        let mut path = self.replace_workspace_folder(path);

        for entry in &self.mapping {
            if entry.local.is_empty() {
                continue;
            }
            path = path.replacen(&entry.local, &entry.remote, 1);
        }

        self.to_windows_path(&to_posix_path(&path))
    }

    /// Rewrite a path reported by the runner into the local workspace.
    pub fn remote_to_local(&self, path: &str) -> String {
        let mut path = path.to_string();

        for entry in &self.mapping {
            let remote = format!("{}/", entry.remote);
            let local = format!("{}/", entry.local);
            path = path.replace(&remote, &local);
        }

        self.to_windows_path(&path.replace(VFS_COMPOSER_SCHEME, ""))
    }

    /// Strip the working directory from an absolute path.
    pub fn absolute_to_relative(&self, path: &str) -> String {
        path.replacen(&format!("{}/", self.cwd), "", 1)
    }

    /// Rewrite every path carried by a lifecycle event into the local workspace.
    pub fn translate_event(&self, event: &mut ParsedEvent) {
        let Some(test) = event.as_lifecycle_mut() else {
            return;
        };

        if let Some(hint) = test.location_hint.as_mut() {
            *hint = self.remote_to_local(hint);
        }
        if let Some(file) = test.file.as_mut() {
            *file = self.remote_to_local(file);
        }
        if let Some(details) = test.details.as_mut() {
            for detail in details.iter_mut() {
                detail.file = self.remote_to_local(&detail.file);
            }
        }
    }

    /// Backslashes for drive-letter paths, leaving the location-hint scheme intact.
    fn to_windows_path(&self, path: &str) -> String {
        let Some(re) = self.windows_path.as_ref() else {
            return path.to_string();
        };

        let guarded = path.replace(LOCATION_SCHEME, LOCATION_SCHEME_GUARD);
        let converted = re.replace_all(&guarded, |cap: &regex::Captures<'_>| cap[0].replace('/', "\\"));
        converted.replace(LOCATION_SCHEME_GUARD, LOCATION_SCHEME)
    }
}

fn to_posix_path(path: &str) -> String {
    path.replace('\\', "/")
}
