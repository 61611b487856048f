use std::sync::atomic::AtomicU32;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering::SeqCst;
use time::OffsetDateTime;

static SESSION_ID_COUNTER: AtomicU32 = AtomicU32::new(0);
static INPUT_SOURCE_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

// Generates a unique identifier for any Session
pub fn new_id() -> u32 {
    SESSION_ID_COUNTER.fetch_add(1, SeqCst)
}

// Input source ids live for the whole process and are never handed out twice
pub fn new_input_source_id() -> u64 {
    INPUT_SOURCE_ID_COUNTER.fetch_add(1, SeqCst)
}

// Returns the current time in milliseconds
pub fn timestamp() -> f64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    nanos as f64 * 1e-6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_source_ids_increase() {
        let first = new_input_source_id();
        let second = new_input_source_id();
        assert!(second > first);
    }

    #[test]
    fn timestamp_is_in_milliseconds() {
        // Any date after 2001 is past 1e12 ms since the epoch.
        assert!(timestamp() > 1e12);
    }
}
