//! The daily tally loop.
//!
//! Works off the engine's persisted schedule: tallies once when nothing is
//! pending, then sleeps until the earliest pending action is due and runs it.
//! The schedule is re-read before every wait, so a `count` from another
//! process that replaced the pending recount is honoured. Loop time is
//! virtual: it starts at the wall clock and advances to each due time,
//! while the real sleep is that gap scaled by `seconds_per_day`.

use std::time::Duration;

use referendum_governance::{
    Authorizer, ReferendumEngine, ReferendumError, ReferendumState, StakeOracle,
    TALLY_INTERVAL_SECS,
};
use referendum_store::ReferendumStore;
use referendum_types::{AccountName, Timestamp};
use referendum_utils::format_duration;
use tokio::sync::broadcast;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Tallies performed during this run.
    pub tallies: u64,
    pub final_state: ReferendumState,
    /// Whether the run stopped on a shutdown signal rather than on close.
    pub interrupted: bool,
}

/// Real time to wait for a delay of `delay_secs` referendum seconds.
///
/// Saturates at `Duration::MAX` when the product does not fit.
fn scaled_delay(delay_secs: u64, seconds_per_day: u64) -> Duration {
    let secs = delay_secs as f64 * seconds_per_day as f64 / TALLY_INTERVAL_SECS as f64;
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Drive the referendum until it closes or `shutdown` fires.
///
/// With no action pending, the first tally runs immediately as `publisher`,
/// signed by `caller`. Otherwise the run resumes at the pending due time.
/// Every later tally is whatever the engine scheduled, run under that
/// action's own authorization; one that fails is logged and dropped. With
/// nothing left in the schedule the loop ends.
pub async fn run_daily_tally<S, O, A>(
    engine: &ReferendumEngine<S, O, A>,
    caller: &AccountName,
    publisher: &AccountName,
    seconds_per_day: u64,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<RunSummary, ReferendumError>
where
    S: ReferendumStore,
    O: StakeOracle,
    A: Authorizer,
{
    let mut now = Timestamp::now();
    let mut tallies = 0;

    if engine.deferred()?.is_empty() {
        engine.count_votes_and_arm(caller, publisher, now)?;
        tallies += 1;
    } else {
        tracing::info!("resuming from the persisted schedule");
    }

    while let Some(due) = engine.deferred()?.next_due() {
        let wait = scaled_delay(now.elapsed_since(due), seconds_per_day);
        tracing::debug!(
            %due,
            wait = %format_duration(wait.as_secs()),
            "waiting for next scheduled tally"
        );

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = shutdown.recv() => {
                tracing::info!(tallies, "tally loop stopped by shutdown signal");
                return Ok(RunSummary {
                    tallies,
                    final_state: engine.state()?,
                    interrupted: true,
                });
            }
        }

        now = now.max(due);
        tallies += engine.run_due(now)?;
    }

    let final_state = engine.state()?;
    tracing::info!(
        tallies,
        total_days = final_state.total_days,
        "no tally pending, referendum closed"
    );
    Ok(RunSummary {
        tallies,
        final_state,
        interrupted: false,
    })
}
