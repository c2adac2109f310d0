//! Index-based thread-local storage.
//!
//! A fixed table of [`TLS_SLOTS`] indexes shared by the whole process. Each
//! index carries a generation: odd while allocated, even while free, bumped on
//! every allocate and free. Per-thread values are tagged with the generation
//! they were stored under, so a value left behind by a freed index is never
//! visible through a later allocation of the same index.
//!
//! Only allocation and release take [`ALLOC_LOCK`]; get and set read the
//! generation atomically and touch nothing but the calling thread's values.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;

use super::NativeError;

/// 64 guaranteed indexes plus 1024 expansion slots.
pub const TLS_SLOTS: usize = 1088;

static GENERATIONS: [AtomicU32; TLS_SLOTS] = [const { AtomicU32::new(0) }; TLS_SLOTS];
static ALLOC_LOCK: Mutex<()> = parking_lot::const_mutex(());

#[derive(Debug, Clone, Copy, Default)]
struct TlsCell {
    generation: u32,
    value: usize,
}

thread_local! {
    static VALUES: RefCell<Vec<TlsCell>> = const { RefCell::new(Vec::new()) };
}

#[inline]
const fn is_live(generation: u32) -> bool {
    generation & 1 == 1
}

fn live_generation(index: u32) -> Option<u32> {
    let slot = GENERATIONS.get(index as usize)?;
    let generation = slot.load(Ordering::Acquire);
    is_live(generation).then_some(generation)
}

/// Allocate a free index. Fails closed when the table is full.
pub fn tls_alloc() -> Result<u32, NativeError> {
    let _guard = ALLOC_LOCK.lock();
    for (index, slot) in GENERATIONS.iter().enumerate() {
        let generation = slot.load(Ordering::Relaxed);
        if !is_live(generation) {
            slot.store(generation.wrapping_add(1), Ordering::Release);
            return u32::try_from(index).map_err(|_| NativeError::OutOfIndexes);
        }
    }
    Err(NativeError::OutOfIndexes)
}

/// Release an allocated index. Values stored under it become unreachable on
/// every thread.
pub fn tls_free(index: u32) -> Result<(), NativeError> {
    let _guard = ALLOC_LOCK.lock();
    let slot = GENERATIONS
        .get(index as usize)
        .ok_or(NativeError::InvalidIndex(index))?;
    let generation = slot.load(Ordering::Relaxed);
    if !is_live(generation) {
        return Err(NativeError::InvalidIndex(index));
    }
    slot.store(generation.wrapping_add(1), Ordering::Release);
    Ok(())
}

pub fn tls_is_allocated(index: u32) -> bool {
    live_generation(index).is_some()
}

/// The calling thread's value for `index`, or 0 when unset, stale, or the
/// index is not allocated.
pub fn tls_get(index: u32) -> usize {
    let Some(generation) = live_generation(index) else {
        return 0;
    };
    VALUES
        .try_with(|values| {
            values
                .borrow()
                .get(index as usize)
                .filter(|cell| cell.generation == generation)
                .map_or(0, |cell| cell.value)
        })
        .unwrap_or(0)
}

/// Store the calling thread's value for `index`.
pub fn tls_set(index: u32, value: usize) -> Result<(), NativeError> {
    let generation = live_generation(index).ok_or(NativeError::InvalidIndex(index))?;
    let slot = index as usize;
    VALUES
        .try_with(|values| {
            let mut values = values.borrow_mut();
            if values.len() <= slot {
                values.resize(slot + 1, TlsCell::default());
            }
            values[slot] = TlsCell { generation, value };
        })
        .map_err(|_| NativeError::InvalidIndex(index))
}
