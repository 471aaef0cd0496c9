//! FernSim: a deterministic single-threaded actor scheduler.
//!
//! Time is virtual and only moves when the caller advances it or when
//! `step` delivers an event scheduled in the future. Ordering is fully
//! determined by the seed and the sequence of `schedule_actor` calls:
//! the earliest deadline wins, and ties are broken by reservoir
//! selection driven by the simulator's own xorshift64* generator.

use tracing::debug;

use crate::arena::Arena;
use crate::error::SimError;
use crate::vec::ArenaVec;

/// Seed substituted for zero; an all-zero xorshift state never changes.
pub const DEFAULT_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

const XORSHIFT_MULTIPLIER: u64 = 2_685_821_657_736_338_717;

pub type ActorId = u32;

/// An event handed out by [`FernSim::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimEvent {
    actor_id: ActorId,
    deliver_at_ms: u64,
    sequence: u64,
}

impl SimEvent {
    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    pub fn deliver_at_ms(&self) -> u64 {
        self.deliver_at_ms
    }

    /// Order in which the event was scheduled. Informational only.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Map a zero seed to [`DEFAULT_SEED`]; other seeds pass through.
pub fn normalize_seed(seed: u64) -> u64 {
    if seed == 0 { DEFAULT_SEED } else { seed }
}

#[derive(Debug)]
pub struct FernSim<'a> {
    rng_state: u64,
    now_ms: u64,
    next_sequence: u64,
    queue: ArenaVec<'a, SimEvent>,
}

impl<'a> FernSim<'a> {
    pub fn new(arena: &'a Arena, seed: u64) -> Result<FernSim<'a>, SimError> {
        Ok(FernSim {
            rng_state: normalize_seed(seed),
            now_ms: 0,
            next_sequence: 0,
            queue: ArenaVec::new(arena)?,
        })
    }

    /// Advance xorshift64* and return the next raw value.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.rng_state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.rng_state = x;
        x.wrapping_mul(XORSHIFT_MULTIPLIER)
    }

    /// A value in `[0, limit)`. A zero limit returns 0 and still
    /// advances the generator.
    pub fn next_u32(&mut self, limit: u32) -> u32 {
        let value = self.next_u64();
        match value.checked_rem(u64::from(limit)) {
            Some(bounded) => bounded as u32,
            None => 0,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Move the clock forward. Returns false, leaving the clock alone,
    /// when the sum would overflow.
    pub fn advance_ms(&mut self, delta_ms: u64) -> bool {
        self.try_advance_ms(delta_ms).is_ok()
    }

    pub fn try_advance_ms(&mut self, delta_ms: u64) -> Result<u64, SimError> {
        self.now_ms = self
            .now_ms
            .checked_add(delta_ms)
            .ok_or(SimError::ClockOverflow {
                now_ms: self.now_ms,
                delta_ms,
            })?;
        Ok(self.now_ms)
    }

    /// Enqueue `actor_id` for delivery at `now + delay_ms`.
    pub fn schedule_actor(&mut self, actor_id: ActorId, delay_ms: u64) -> bool {
        self.try_schedule_actor(actor_id, delay_ms).is_ok()
    }

    /// Like [`schedule_actor`](Self::schedule_actor), but says why it
    /// failed. The sequence counter only moves when the event is queued.
    pub fn try_schedule_actor(
        &mut self,
        actor_id: ActorId,
        delay_ms: u64,
    ) -> Result<SimEvent, SimError> {
        let deliver_at_ms = self
            .now_ms
            .checked_add(delay_ms)
            .ok_or(SimError::DeadlineOverflow {
                now_ms: self.now_ms,
                delay_ms,
            })?;
        let event = SimEvent {
            actor_id,
            deliver_at_ms,
            sequence: self.next_sequence,
        };
        self.queue.push(event)?;
        self.next_sequence += 1;
        Ok(event)
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Deliver the next event, or `None` when the queue is empty.
    pub fn step(&mut self) -> Option<SimEvent> {
        let chosen = self.select_next_index()?;
        let event = self.queue.swap_remove(chosen)?;
        self.now_ms = self.now_ms.max(event.deliver_at_ms);
        debug!(
            actor = event.actor_id,
            deliver_at_ms = event.deliver_at_ms,
            sequence = event.sequence,
            now_ms = self.now_ms,
            remaining = self.queue.len(),
            "fernsim step"
        );
        Some(event)
    }

    /// Step until the queue is empty, handing every event and the clock
    /// after its delivery to `on_event`. Returns the number of events
    /// delivered.
    pub fn run_until_idle(&mut self, mut on_event: impl FnMut(&SimEvent, u64)) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.step() {
            on_event(&event, self.now_ms);
            delivered += 1;
        }
        delivered
    }

    /// Earliest deadline wins; among equal deadlines the k-th candidate
    /// replaces the current choice with probability 1/k.
    fn select_next_index(&mut self) -> Option<usize> {
        let mut best_deadline = self.queue.get(0)?.deliver_at_ms;
        let mut chosen = 0;
        let mut tie_count: u32 = 1;

        for index in 1..self.queue.len() {
            let Some(deadline) = self.queue.get(index).map(|e| e.deliver_at_ms) else {
                break;
            };
            if deadline < best_deadline {
                best_deadline = deadline;
                chosen = index;
                tie_count = 1;
            } else if deadline == best_deadline {
                tie_count = tie_count.saturating_add(1);
                if self.next_u32(tie_count) == 0 {
                    chosen = index;
                }
            }
        }
        Some(chosen)
    }
}
