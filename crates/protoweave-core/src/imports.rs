//! # Import Tracking
//!
//! Builders that reference message types record the file each referenced
//! message is declared in. The emitter turns the collected set into
//! `import` statements; nothing here resolves or loads those files.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Non-owning reference to a message type declared elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    /// Short message name, e.g. `User`.
    pub name: String,
    /// Package the message lives in, e.g. `acme.users.v1`. Empty for the root package.
    pub package: String,
    /// File that declares the message, e.g. `acme/users/v1/user.proto`.
    pub file: String,
}

impl MessageRef {
    /// Create a reference.
    pub fn new(
        name: impl Into<String>,
        package: impl Into<String>,
        file: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            file: file.into(),
        }
    }

    /// Fully qualified name, `package.Name`, or just `Name` in the root package.
    pub fn full_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

/// Ordered set of import paths referenced by the fields of a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSet {
    paths: BTreeSet<String>,
}

impl ImportSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an import path. Returns true if the path was not yet present.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.paths.insert(path.into())
    }

    /// Record the declaring file of a message reference.
    pub fn insert_ref(&mut self, message: &MessageRef) -> bool {
        self.insert(message.file.clone())
    }

    /// Move every path of `other` into this set.
    pub fn merge(&mut self, other: ImportSet) {
        self.paths.extend(other.paths);
    }

    /// Whether `path` has been recorded.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Returns the number of distinct paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true if no path has been recorded.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterate over the paths in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}
