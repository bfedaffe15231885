//! Declaration manifests.
//!
//! A manifest lists the arguments a program declares, in order, so that
//! the fleet tool can run the engine without compiling a program around it.
//!
//! ```yaml
//! program: macsio
//! groups:
//!   mesh: Mesh decomposition options
//! args:
//!   - format: "--interface %s"
//!     help: I/O library to use
//!     default: miftmpl
//!   - format: "--part_size %d"
//!     help: Bytes per mesh part
//!     group: mesh
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use clargs_core::Declarations;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Program name used when the manifest does not name one.
pub const DEFAULT_PROGRAM: &str = "clargs-fleet";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One declared argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestArg {
    pub format: String,
    #[serde(default)]
    pub help: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Help section this argument is listed under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Ordered argument declarations for one program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    /// Help text per group name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub groups: BTreeMap<String, String>,
    #[serde(default)]
    pub args: Vec<ManifestArg>,
}

impl DeclarationManifest {
    /// Loads a manifest, as JSON when the extension is `.json` and as YAML
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Io`] if the file cannot be read, or a parse
    /// error for the detected format.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let manifest = if is_json {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        Ok(manifest)
    }

    pub fn program(&self) -> &str {
        self.program.as_deref().unwrap_or(DEFAULT_PROGRAM)
    }

    /// Builds document-mode declarations.
    ///
    /// Consecutive arguments with the same group are wrapped in one group
    /// section.
    pub fn declarations(&self) -> Declarations<'static> {
        let mut decls = Declarations::new();
        let mut open: Option<&str> = None;

        for arg in &self.args {
            let group = arg.group.as_deref();
            if group != open {
                if let Some(name) = open {
                    decls = decls.end_group(name);
                }
                if let Some(name) = group {
                    let help = self.groups.get(name).cloned().unwrap_or_default();
                    decls = decls.group(name, help);
                }
                open = group;
            }
            decls = decls.doc_arg(arg.format.as_str(), arg.help.as_str());
            if let Some(default) = &arg.default {
                decls = decls.with_default(default.as_str());
            }
        }
        if let Some(name) = open {
            decls = decls.end_group(name);
        }
        decls
    }
}
