//! Named resources held by the store.

use std::fmt;

/// One of the two whole-blob resources the node persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Serialized list of blocks.
    Chain,
    /// Serialized list of pending pool entries.
    PendingPool,
}

impl Resource {
    /// Stable resource name.
    pub fn name(self) -> &'static str {
        match self {
            Resource::Chain => "chain",
            Resource::PendingPool => "pending-pool",
        }
    }

    /// File name used by file-backed stores.
    pub fn file_name(self) -> String {
        format!("{}.json", self.name())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
