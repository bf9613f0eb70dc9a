use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use muni_common::models::reservation::{AvailabilityResult, ReservationSlot};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::Result;

/// Message shown when the availability check itself failed.
pub const CHECK_FAILED_MESSAGE: &str = "Error al verificar disponibilidad";

/// Answers whether a slot can still be booked.
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    async fn check(&self, slot: &ReservationSlot, exclude: Option<i64>) -> Result<AvailabilityResult>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityState {
    /// Some slot field is empty; nothing was asked
    Unknown,
    /// Waiting for the input to settle or for the server to answer
    Checking,
    Known(AvailabilityResult),
}

impl AvailabilityState {
    pub fn is_checking(&self) -> bool {
        matches!(self, AvailabilityState::Checking)
    }

    /// True while submission must wait or is refused
    pub fn blocks_submission(&self) -> bool {
        match self {
            AvailabilityState::Checking => true,
            AvailabilityState::Known(result) => !result.available,
            AvailabilityState::Unknown => false,
        }
    }
}

#[derive(Debug, Clone)]
struct Probe {
    seq: u64,
    slot: ReservationSlot,
    exclude: Option<i64>,
}

struct Shared {
    state: watch::Sender<AvailabilityState>,
    latest: AtomicU64,
}

impl Shared {
    /// Publish a result only if no newer probe was issued since `seq`.
    fn apply(&self, seq: u64, result: AvailabilityResult) -> bool {
        self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) != seq {
                return false;
            }
            *state = AvailabilityState::Known(result);
            true
        })
    }
}

/// Debounced availability checker for the reservation form.
///
/// Every [`update`](Self::update) restarts the settle timer. Once the input
/// has been quiet for the debounce delay one check is issued, tagged with
/// the sequence number of the update that produced it. Results for any
/// older sequence number are dropped, so a slow reply can never overwrite
/// the answer for what the user typed last.
pub struct AvailabilityProber {
    shared: Arc<Shared>,
    params: watch::Sender<Option<Probe>>,
    worker: JoinHandle<()>,
}

impl AvailabilityProber {
    /// Must be called inside a tokio runtime.
    pub fn new(source: Arc<dyn AvailabilitySource>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(AvailabilityState::Unknown);
        let shared = Arc::new(Shared {
            state,
            latest: AtomicU64::new(0),
        });
        let (params, params_rx) = watch::channel(None);
        let worker = tokio::spawn(run_prober(source, shared.clone(), params_rx, debounce));
        Self {
            shared,
            params,
            worker,
        }
    }

    /// Feed the latest form values. Returns the sequence number assigned.
    pub fn update(&self, slot: ReservationSlot, exclude: Option<i64>) -> u64 {
        let complete = slot.is_complete();
        let mut seq = 0;
        self.shared.state.send_modify(|state| {
            seq = self.shared.latest.fetch_add(1, Ordering::SeqCst) + 1;
            *state = if complete {
                AvailabilityState::Checking
            } else {
                AvailabilityState::Unknown
            };
        });

        let probe = complete.then_some(Probe { seq, slot, exclude });
        self.params.send_replace(probe);
        seq
    }

    /// Drop any pending or in-flight check and go back to `Unknown`.
    pub fn reset(&self) {
        self.update(ReservationSlot::default(), None);
    }

    pub fn state(&self) -> AvailabilityState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AvailabilityState> {
        self.shared.state.subscribe()
    }

    pub fn blocks_submission(&self) -> bool {
        self.shared.state.borrow().blocks_submission()
    }

    /// Wait until no check is pending and return the settled state.
    pub async fn settled(&self) -> AvailabilityState {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(|state| !state.is_checking()).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }
}

impl Drop for AvailabilityProber {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

/// Ask `source` once; a failed check reports the slot as unavailable.
pub async fn check_fail_closed(
    source: &dyn AvailabilitySource,
    slot: &ReservationSlot,
    exclude: Option<i64>,
) -> AvailabilityResult {
    match source.check(slot, exclude).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("Availability check failed: {}", e);
            AvailabilityResult::unavailable(CHECK_FAILED_MESSAGE)
        }
    }
}

async fn run_prober(
    source: Arc<dyn AvailabilitySource>,
    shared: Arc<Shared>,
    mut params: watch::Receiver<Option<Probe>>,
    debounce: Duration,
) {
    loop {
        if params.changed().await.is_err() {
            return;
        }

        // Settle: any change restarts the timer
        loop {
            tokio::select! {
                changed = params.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = tokio::time::sleep(debounce) => break,
            }
        }

        let Some(probe) = params.borrow_and_update().clone() else {
            continue;
        };
        if shared.latest.load(Ordering::SeqCst) != probe.seq {
            continue;
        }

        tracing::debug!(
            "Checking availability for {} {} ({}), seq {}",
            probe.slot.date,
            probe.slot.time,
            probe.slot.service_type,
            probe.seq
        );
        let source = source.clone();
        let shared = shared.clone();
        tokio::spawn(async move {
            let result = check_fail_closed(source.as_ref(), &probe.slot, probe.exclude).await;
            if !shared.apply(probe.seq, result) {
                tracing::debug!("Discarding stale availability result, seq {}", probe.seq);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSource {
        calls: Mutex<Vec<ReservationSlot>>,
        fail: bool,
    }

    impl FakeSource {
        fn calls(&self) -> Vec<ReservationSlot> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AvailabilitySource for FakeSource {
        async fn check(
            &self,
            slot: &ReservationSlot,
            _exclude: Option<i64>,
        ) -> Result<AvailabilityResult> {
            self.calls.lock().unwrap().push(slot.clone());
            if self.fail {
                return Err(ClientError::Server {
                    status: 503,
                    detail: None,
                });
            }
            // 14:30 is busy and slow to answer
            if slot.time == "14:30" {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Ok(AvailabilityResult::unavailable("Horario ocupado"))
            } else {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(AvailabilityResult::available("Horario disponible"))
            }
        }
    }

    fn prober(source: &Arc<FakeSource>) -> AvailabilityProber {
        AvailabilityProber::new(source.clone(), Duration::from_millis(500))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_issues_single_check() {
        let source = Arc::new(FakeSource::default());
        let prober = prober(&source);

        for time in ["15", "15:", "15:0", "15:00"] {
            prober.update(ReservationSlot::new("2025-03-10", time, "licencia"), None);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(prober.state().is_checking());

        let state = prober.settled().await;
        assert_eq!(
            state,
            AvailabilityState::Known(AvailabilityResult::available("Horario disponible"))
        );
        assert_eq!(
            source.calls(),
            vec![ReservationSlot::new("2025-03-10", "15:00", "licencia")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_result_is_discarded() {
        let source = Arc::new(FakeSource::default());
        let prober = prober(&source);

        prober.update(ReservationSlot::new("2025-03-10", "14:30", "licencia"), None);
        // Let the 14:30 check start, then change the time while it is in flight
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(source.calls().len(), 1);
        prober.update(ReservationSlot::new("2025-03-10", "15:00", "licencia"), None);

        let state = prober.settled().await;
        assert_eq!(
            state,
            AvailabilityState::Known(AvailabilityResult::available("Horario disponible"))
        );

        // The slow 14:30 reply lands afterwards and must not win
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(source.calls().len(), 2);
        assert_eq!(
            prober.state(),
            AvailabilityState::Known(AvailabilityResult::available("Horario disponible"))
        );
        assert!(!prober.blocks_submission());
    }

    #[tokio::test(start_paused = true)]
    async fn test_incomplete_slot_resets_without_request() {
        let source = Arc::new(FakeSource::default());
        let prober = prober(&source);

        prober.update(ReservationSlot::new("2025-03-10", "", "licencia"), None);
        assert_eq!(prober.state(), AvailabilityState::Unknown);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(source.calls().is_empty());
        assert_eq!(prober.settled().await, AvailabilityState::Unknown);
        assert!(!prober.blocks_submission());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_field_cancels_pending_check() {
        let source = Arc::new(FakeSource::default());
        let prober = prober(&source);

        prober.update(ReservationSlot::new("2025-03-10", "15:00", "licencia"), None);
        tokio::time::sleep(Duration::from_millis(200)).await;
        prober.reset();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(source.calls().is_empty());
        assert_eq!(prober.state(), AvailabilityState::Unknown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_error_fails_closed() {
        let source = Arc::new(FakeSource {
            fail: true,
            ..Default::default()
        });
        let prober = prober(&source);

        prober.update(ReservationSlot::new("2025-03-10", "15:00", "licencia"), None);
        let state = prober.settled().await;

        assert_eq!(
            state,
            AvailabilityState::Known(AvailabilityResult::unavailable(CHECK_FAILED_MESSAGE))
        );
        assert!(prober.blocks_submission());
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_slot_blocks_then_free_slot_unblocks() {
        let source = Arc::new(FakeSource::default());
        let prober = prober(&source);

        prober.update(ReservationSlot::new("2025-03-10", "14:30", "licencia"), None);
        assert_eq!(
            prober.settled().await,
            AvailabilityState::Known(AvailabilityResult::unavailable("Horario ocupado"))
        );
        assert!(prober.blocks_submission());

        prober.update(ReservationSlot::new("2025-03-10", "15:00", "licencia"), None);
        assert!(prober.blocks_submission());
        prober.settled().await;
        assert!(!prober.blocks_submission());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_check_fails_closed() {
        let failing = FakeSource {
            fail: true,
            ..Default::default()
        };
        let slot = ReservationSlot::new("2025-11-10", "10:00", "licencia");
        let result = check_fail_closed(&failing, &slot, None).await;
        assert_eq!(result, AvailabilityResult::unavailable(CHECK_FAILED_MESSAGE));

        let healthy = FakeSource::default();
        let result = check_fail_closed(&healthy, &slot, Some(3)).await;
        assert!(result.available);
        assert_eq!(healthy.calls(), vec![slot]);
    }

    #[test]
    fn test_state_blocking_rules() {
        assert!(!AvailabilityState::Unknown.blocks_submission());
        assert!(AvailabilityState::Checking.blocks_submission());
        assert!(AvailabilityState::Known(AvailabilityResult::unavailable("x")).blocks_submission());
        assert!(!AvailabilityState::Known(AvailabilityResult::available("")).blocks_submission());
    }
}
