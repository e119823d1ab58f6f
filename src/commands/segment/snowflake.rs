use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use crate::error::IdError;

/// Epoch the 41-bit timestamp delta is measured from (2010-11-04T01:42:54Z).
const EPOCH_MS: i64 = 1_288_834_974_657;

const DATACENTER_ID_BITS: u32 = 5;
const WORKER_ID_BITS: u32 = 5;
const SEQUENCE_BITS: u32 = 12;

const MAX_NODE_IDENTITY: u64 = (1u64 << DATACENTER_ID_BITS) - 1;
const SEQUENCE_MASK: u64 = (1u64 << SEQUENCE_BITS) - 1;

const WORKER_ID_SHIFT: u32 = SEQUENCE_BITS;
const DATACENTER_ID_SHIFT: u32 = SEQUENCE_BITS + WORKER_ID_BITS;
const TIMESTAMP_SHIFT: u32 = SEQUENCE_BITS + WORKER_ID_BITS + DATACENTER_ID_BITS;

#[derive(Debug)]
struct SnowflakeState {
    last_timestamp_ms: i64,
    sequence: u64,
}

/// Issues 64-bit identifiers composed of a millisecond timestamp delta,
/// fixed datacenter/worker identity bits, and a per-millisecond sequence.
/// One instance per process; every call serializes on the internal lock.
#[derive(Debug)]
pub struct SnowflakeAllocator {
    datacenter_id: u64,
    worker_id: u64,
    state: Mutex<SnowflakeState>,
}

impl SnowflakeAllocator {
    pub fn new(datacenter_id: u64, worker_id: u64) -> Result<Self, IdError> {
        if datacenter_id > MAX_NODE_IDENTITY {
            return Err(IdError::IdentityOutOfRange {
                field: "datacenter id",
                value: datacenter_id,
            });
        }
        if worker_id > MAX_NODE_IDENTITY {
            return Err(IdError::IdentityOutOfRange {
                field: "worker id",
                value: worker_id,
            });
        }

        Ok(Self {
            datacenter_id,
            worker_id,
            state: Mutex::new(SnowflakeState {
                last_timestamp_ms: -1,
                sequence: 0,
            }),
        })
    }

    /// Allocates the next identifier. A clock that moved backward since the
    /// last successful allocation fails the call; it is never masked by
    /// reusing the stale timestamp. Sequence exhaustion within a millisecond
    /// spin-waits for the clock to advance.
    pub fn next_id(&self) -> Result<u64, IdError> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut now = current_millis();
        if now < state.last_timestamp_ms {
            return Err(IdError::ClockRegression {
                last_ms: state.last_timestamp_ms,
                observed_ms: now,
            });
        }

        if now == state.last_timestamp_ms {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                now = wait_for_next_millis(state.last_timestamp_ms);
            }
        } else {
            state.sequence = 0;
        }

        state.last_timestamp_ms = now;

        let timestamp_delta = (now - EPOCH_MS) as u64;
        Ok((timestamp_delta << TIMESTAMP_SHIFT)
            | (self.datacenter_id << DATACENTER_ID_SHIFT)
            | (self.worker_id << WORKER_ID_SHIFT)
            | state.sequence)
    }

    #[cfg(test)]
    pub fn force_last_timestamp(&self, millis: i64) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        state.last_timestamp_ms = millis;
    }
}

fn current_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn wait_for_next_millis(last_timestamp_ms: i64) -> i64 {
    let mut now = current_millis();
    while now <= last_timestamp_ms {
        std::hint::spin_loop();
        now = current_millis();
    }
    now
}

pub fn decode_timestamp_millis(id: u64) -> i64 {
    (id >> TIMESTAMP_SHIFT) as i64 + EPOCH_MS
}

pub fn decode_datacenter_id(id: u64) -> u64 {
    (id >> DATACENTER_ID_SHIFT) & MAX_NODE_IDENTITY
}

pub fn decode_worker_id(id: u64) -> u64 {
    (id >> WORKER_ID_SHIFT) & MAX_NODE_IDENTITY
}

pub fn decode_sequence(id: u64) -> u64 {
    id & SEQUENCE_MASK
}
