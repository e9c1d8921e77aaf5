use chrono::NaiveTime;

use crate::api::types::{minutes_of, time_from_minutes, Block};

use super::schedule::Schedule;

pub const SLOT_MINUTES: u32 = 15;

pub fn round_up(now: NaiveTime) -> u32 {
    minutes_of(now).div_ceil(SLOT_MINUTES) * SLOT_MINUTES
}

/// Default start for a block of `duration` minutes placed between `prev` and `next`.
pub fn suggest(
    prev: Option<&Block>,
    next: Option<&Block>,
    duration: u32,
    now: NaiveTime,
) -> NaiveTime {
    let floor = round_up(now);
    let minutes = match (prev, next) {
        (Some(p), _) => p.end_minutes(),
        (None, Some(n)) => n.start_minutes().saturating_sub(duration),
        (None, None) => floor,
    };
    time_from_minutes(minutes.max(floor))
}

/// Suggestion for the between-slot after the block at `after` (`None` = before the first).
pub fn for_slot(
    schedule: &Schedule,
    after: Option<usize>,
    duration: u32,
    now: NaiveTime,
) -> NaiveTime {
    let (prev, next) = match after {
        Some(i) => (schedule.at(i), schedule.at(i + 1)),
        None => (None, schedule.at(0)),
    };
    suggest(prev, next, duration, now)
}

/// Suggestion for a block that now sits at `index`, ignoring the block itself.
pub fn for_moved_block(
    schedule: &Schedule,
    index: usize,
    duration: u32,
    now: NaiveTime,
) -> NaiveTime {
    let prev = index.checked_sub(1).and_then(|i| schedule.at(i));
    let next = schedule.at(index + 1);
    suggest(prev, next, duration, now)
}
