use pf_core::Tick;

/// Per-tick counters handed to [`SimObserver::on_tick_end`][crate::SimObserver::on_tick_end].
///
/// `active`, `queued` and `in_service` are levels measured at the end of the
/// tick; everything else counts what happened during it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub tick:       Tick,
    pub spawned:    usize,
    pub admitted:   usize,
    pub completed:  usize,
    pub finished:   usize,
    pub dropped:    usize,
    pub attempts:   usize,
    pub successes:  usize,
    pub active:     usize,
    pub queued:     usize,
    pub in_service: usize,
}
