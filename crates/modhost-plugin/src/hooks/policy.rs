//! Combination policies for multi-subscriber hook channels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the outputs of several subscribers are merged into one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinePolicy {
    /// Every subscriber runs; outputs are ignored and the default is returned.
    SideEffect,
    /// The output of each subscriber is the input of the next.
    Chain,
    /// The first output that differs from the default wins; later
    /// differing outputs are ignored, but every subscriber still runs.
    OverrideOnce,
    /// Boolean outputs are OR-ed together without short-circuiting.
    LogicalOr,
}

impl CombinePolicy {
    /// Returns the string name of this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SideEffect => "side_effect",
            Self::Chain => "chain",
            Self::OverrideOnce => "override_once",
            Self::LogicalOr => "logical_or",
        }
    }
}

impl fmt::Display for CombinePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values that can flow through a hook channel.
///
/// `disjoin` is only consulted by [`CombinePolicy::LogicalOr`] channels,
/// which can only be constructed for `bool`.
pub trait HookValue: Clone + PartialEq + Send + Sync + 'static {
    /// Combines two outputs of a logical-or channel.
    fn disjoin(self, other: Self) -> Self {
        let _ = other;
        self
    }
}

impl HookValue for bool {
    fn disjoin(self, other: Self) -> Self {
        self || other
    }
}

impl HookValue for () {}
impl HookValue for i32 {}
impl HookValue for f32 {}
impl HookValue for String {}
impl HookValue for Option<String> {}
