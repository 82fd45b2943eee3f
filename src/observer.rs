//! Events emitted by the client flows.

use std::fmt;
use tracing::{info, warn};

use crate::{
    client::pay::PayFlowState,
    error::LnurlError,
    lightning::PaymentResult,
    protocol::VerificationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Pay,
    Channel,
    Withdraw,
    Auth,
    Static,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Flow::Pay => "pay",
            Flow::Channel => "channel",
            Flow::Withdraw => "withdraw",
            Flow::Auth => "auth",
            Flow::Static => "static",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
pub enum FlowEvent<'a> {
    Started {
        flow: Flow,
        target: &'a str,
        amount_msat: Option<u64>,
    },
    PayState {
        from: PayFlowState,
        to: PayFlowState,
    },
    Verification {
        result: Result<(), &'a VerificationError>,
    },
    Payment {
        result: &'a PaymentResult,
    },
    Completed {
        flow: Flow,
    },
    Aborted {
        flow: Flow,
        error: &'a LnurlError,
    },
}

pub trait FlowObserver: Send + Sync {
    fn on_event(&self, event: &FlowEvent<'_>);
}

/// Forwards flow events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FlowObserver for TracingObserver {
    fn on_event(&self, event: &FlowEvent<'_>) {
        match event {
            FlowEvent::Started {
                flow,
                target,
                amount_msat,
            } => info!(%flow, target, ?amount_msat, "flow started"),
            FlowEvent::PayState { from, to } => info!(?from, ?to, "pay flow state"),
            FlowEvent::Verification { result: Ok(()) } => info!("invoice verified"),
            FlowEvent::Verification { result: Err(e) } => warn!(error = %e, "invoice verification failed"),
            FlowEvent::Payment { result } => info!(
                status = %result.status,
                payment_hash = %result.payment_hash,
                "payment result"
            ),
            FlowEvent::Completed { flow } => info!(%flow, "flow completed"),
            FlowEvent::Aborted { flow, error } => warn!(%flow, %error, "flow aborted"),
        }
    }
}
