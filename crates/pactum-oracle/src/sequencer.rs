//! L2 sequencer uptime gate
//!
//! On rollups, feed answers written while the sequencer was down look fresh
//! the moment it comes back. Acceptance is therefore rejected while the
//! sequencer is reported down and for a grace period after a reported
//! restart, so no pricing happens off stale post-outage data.

use pactum_common::error::OracleError;
use pactum_common::Result;

/// Reported sequencer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerStatus {
    pub up: bool,
    /// Unix seconds at which the current status began
    pub since: u64,
}

/// Uptime feed for the chain's sequencer
pub trait SequencerOracle: Send + Sync {
    fn status(&self) -> Result<SequencerStatus>;
}

/// Reject while the sequencer is down or freshly restarted
pub fn check_sequencer(
    oracle: &dyn SequencerOracle,
    now: u64,
    grace_period: u64,
) -> Result<()> {
    let status = oracle.status()?;

    if !status.up {
        return Err(OracleError::SequencerDown.into());
    }

    let since_restart = now.saturating_sub(status.since);
    if since_restart < grace_period {
        return Err(OracleError::GracePeriodNotOver {
            since_restart,
            grace: grace_period,
        }
        .into());
    }

    Ok(())
}
