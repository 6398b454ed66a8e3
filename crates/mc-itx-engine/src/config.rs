//! Engine configuration, loaded from TOML.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use mc_itx_proto::ContainerId;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Logical operation kinds a transaction can queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Move,
    Swap,
    Drop,
    CreativeFetch,
    AnvilRename,
    LoomCombine,
}

/// Decides which operation kinds need a request of their own.
///
/// Dedicated kinds use filter strings or session-wide UI slots and cannot
/// share a request with unrelated work. Everything else is inlined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePolicy {
    dedicated: HashSet<OperationKind>,
}

impl InlinePolicy {
    pub fn new(dedicated: impl IntoIterator<Item = OperationKind>) -> Self {
        Self {
            dedicated: dedicated.into_iter().collect(),
        }
    }

    pub fn is_dedicated(&self, kind: OperationKind) -> bool {
        self.dedicated.contains(&kind)
    }

    pub fn is_inlineable(&self, kind: OperationKind) -> bool {
        !self.is_dedicated(kind)
    }

    pub fn set_dedicated(&mut self, kind: OperationKind, dedicated: bool) {
        if dedicated {
            self.dedicated.insert(kind);
        } else {
            self.dedicated.remove(&kind);
        }
    }
}

impl Default for InlinePolicy {
    fn default() -> Self {
        Self::new(default_dedicated())
    }
}

fn default_dedicated() -> Vec<OperationKind> {
    vec![
        OperationKind::CreativeFetch,
        OperationKind::AnvilRename,
        OperationKind::LoomCombine,
    ]
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub transaction: TransactionSection,
    #[serde(default)]
    pub containers: ContainersSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionSection {
    /// Operation kinds compiled into a request of their own.
    #[serde(default = "default_dedicated")]
    pub dedicated: Vec<OperationKind>,
    /// Value of the `randomly` flag on drop actions.
    #[serde(default)]
    pub drop_randomly: bool,
}

impl Default for TransactionSection {
    fn default() -> Self {
        Self {
            dedicated: default_dedicated(),
            drop_randomly: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainersSection {
    /// Per container type role overrides for opened containers.
    #[serde(default)]
    pub roles: Vec<RoleOverride>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleOverride {
    pub container_type: u8,
    pub role: ContainerId,
}

impl EngineConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        toml::from_str(contents).map_err(|e| EngineError::Config(e.to_string()))
    }

    pub fn inline_policy(&self) -> InlinePolicy {
        InlinePolicy::new(self.transaction.dedicated.iter().copied())
    }

    /// Role overrides keyed by container type. Later entries win.
    pub fn role_overrides(&self) -> HashMap<u8, ContainerId> {
        self.containers
            .roles
            .iter()
            .map(|r| (r.container_type, r.role))
            .collect()
    }
}
