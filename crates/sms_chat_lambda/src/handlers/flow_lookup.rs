//! Find-or-create lookup of the outbound flow.
//!
//! Listing, fetch and create failures are logged and swallowed here: the
//! caller only sees whether a flow came out. A listing failure therefore
//! surfaces as "no matching flow" rather than its real cause.

use sms_chat_core::contract::OUTBOUND_FLOW_NAME;
use sms_chat_core::flows::{canonical_named_flow, FlowCreationPolicy};
use sms_chat_core::outbound::{outbound_flow_spec, FlowTarget};
use sms_chat_core::resources::FlexFlow;
use tracing::{info, warn};

use crate::adapters::platform::CommsPlatform;

const COMPONENT: &str = "flow_lookup";

pub async fn resolve_outbound_flow(
    platform: &impl CommsPlatform,
    target: &FlowTarget,
    contact_identity: &str,
    policy: FlowCreationPolicy,
) -> Option<FlexFlow> {
    let flows = match platform.list_flex_flows().await {
        Ok(flows) => flows,
        Err(error) => {
            warn!(component = COMPONENT, event = "flow_listing_failed", error = %error);
            return None;
        }
    };

    if let Some(listed) = policy.select(&flows, OUTBOUND_FLOW_NAME) {
        // The listed summary is not reused; the flow is always re-fetched.
        match platform.fetch_flex_flow(&listed.sid).await {
            Ok(flow) => {
                info!(component = COMPONENT, event = "flow_found", flex_flow_sid = %flow.sid);
                return Some(flow);
            }
            Err(error) => {
                warn!(
                    component = COMPONENT,
                    event = "flow_fetch_failed",
                    flex_flow_sid = %listed.sid,
                    error = %error
                );
            }
        }
    }

    let spec = outbound_flow_spec(target, contact_identity);
    let created = match platform.create_flex_flow(&spec).await {
        Ok(flow) => flow,
        Err(error) => {
            warn!(component = COMPONENT, event = "flow_create_failed", error = %error);
            return None;
        }
    };
    info!(
        component = COMPONENT,
        event = "flow_created",
        flex_flow_sid = %created.sid,
        policy = policy.as_str()
    );

    match policy {
        FlowCreationPolicy::LastWriteWins => Some(created),
        FlowCreationPolicy::CompareAndCreate => {
            Some(converge_on_canonical(platform, created).await)
        }
    }
}

/// Re-reads the listing after a create and switches to the canonical flow
/// when a concurrent request created an earlier one.
async fn converge_on_canonical(platform: &impl CommsPlatform, created: FlexFlow) -> FlexFlow {
    let flows = match platform.list_flex_flows().await {
        Ok(flows) => flows,
        Err(error) => {
            warn!(component = COMPONENT, event = "flow_recheck_failed", error = %error);
            return created;
        }
    };

    let Some(canonical) = canonical_named_flow(&flows, OUTBOUND_FLOW_NAME) else {
        return created;
    };
    if canonical.sid == created.sid {
        return created;
    }

    warn!(
        component = COMPONENT,
        event = "flow_creation_race_detected",
        created_sid = %created.sid,
        canonical_sid = %canonical.sid
    );
    match platform.fetch_flex_flow(&canonical.sid).await {
        Ok(flow) => flow,
        Err(error) => {
            warn!(
                component = COMPONENT,
                event = "flow_fetch_failed",
                flex_flow_sid = %canonical.sid,
                error = %error
            );
            created
        }
    }
}
