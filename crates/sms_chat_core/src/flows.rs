//! Selection of the outbound flow among listed flows.
//!
//! Flows are matched by friendly name, not id, so concurrent first requests
//! can both see "no flow" and both create one. The policy decides how that
//! race resolves.

use std::str::FromStr;

use thiserror::Error;

use crate::resources::FlexFlow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlowCreationPolicy {
    /// Use the last matching flow in listing order; a freshly created flow is
    /// used as-is even if a concurrent request created another.
    #[default]
    LastWriteWins,
    /// Converge on the canonical flow (earliest created, then lowest sid),
    /// re-checking the listing after creating.
    CompareAndCreate,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown flow creation policy '{0}' (expected 'last-write-wins' or 'compare-and-create')")]
pub struct UnknownFlowPolicy(pub String);

impl FromStr for FlowCreationPolicy {
    type Err = UnknownFlowPolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "last-write-wins" => Ok(Self::LastWriteWins),
            "compare-and-create" => Ok(Self::CompareAndCreate),
            other => Err(UnknownFlowPolicy(other.to_string())),
        }
    }
}

impl FlowCreationPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LastWriteWins => "last-write-wins",
            Self::CompareAndCreate => "compare-and-create",
        }
    }

    pub fn select<'a>(self, flows: &'a [FlexFlow], name: &str) -> Option<&'a FlexFlow> {
        match self {
            Self::LastWriteWins => last_named_flow(flows, name),
            Self::CompareAndCreate => canonical_named_flow(flows, name),
        }
    }
}

pub fn last_named_flow<'a>(flows: &'a [FlexFlow], name: &str) -> Option<&'a FlexFlow> {
    flows.iter().rev().find(|flow| flow.has_name(name))
}

/// Earliest `date_created` wins; flows without a creation date sort last.
pub fn canonical_named_flow<'a>(flows: &'a [FlexFlow], name: &str) -> Option<&'a FlexFlow> {
    flows
        .iter()
        .filter(|flow| flow.has_name(name))
        .min_by(|left, right| {
            (left.date_created.is_none(), &left.date_created, &left.sid).cmp(&(
                right.date_created.is_none(),
                &right.date_created,
                &right.sid,
            ))
        })
}
