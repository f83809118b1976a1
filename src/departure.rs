/// # Departures
///
/// Times in a route list are often written on a 12-hour clock without am/pm, e.g.
/// `9:00, 10:00, 11:00, 12:15, 1:30`. Within one list departures are assumed to only move
/// forward, so the first time that is smaller than the one before it is taken to be past
/// midday and gets 12 hours added. This happens at most once per list and is recomputed on
/// every call.
use std::fmt;

use chrono::{NaiveTime, Timelike};
use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer};

use crate::{
    models::RouteTimes,
    parsing::parse_time_token,
    utils::{MINUTES_PER_HALF_DAY, minutes_since_midnight},
};

/// One time of a route list with the minutes it stands for after the midday rollover.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProcessedTime {
    index: usize,
    time: String,
    minutes: u32,
}

impl ProcessedTime {
    // Getters/Setters

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }
}

/// Minutes since midnight for every readable time of `times`, in stored order. `index` is the
/// position in `times`; unreadable entries are left out.
pub fn process_route_times(times: &[String]) -> Vec<ProcessedTime> {
    let mut rolled_over = false;
    let mut previous: Option<u32> = None;
    let mut processed = Vec::with_capacity(times.len());

    for (index, time) in times.iter().enumerate() {
        let base = match parse_time_token(time) {
            Ok(value) => minutes_since_midnight(value),
            Err(e) => {
                log::debug!("Ignoring departure: {e}");
                continue;
            }
        };

        let mut minutes = base + if rolled_over { MINUTES_PER_HALF_DAY } else { 0 };
        if !rolled_over && previous.is_some_and(|previous| minutes < previous) {
            rolled_over = true;
            minutes += MINUTES_PER_HALF_DAY;
        }
        previous = Some(minutes);
        processed.push(ProcessedTime {
            index,
            time: time.clone(),
            minutes,
        });
    }
    processed
}

// ------------------------------------------------------------------------------------------------
// --- Countdown
// ------------------------------------------------------------------------------------------------

/// Time left until a departure. Displays as `42 s`, `17 min`, `2h 5m` or `3h`.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Countdown {
    seconds: u32,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self { seconds }
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.seconds / 60;
        if minutes < 1 {
            write!(f, "{} s", self.seconds)
        } else if minutes < 60 {
            write!(f, "{minutes} min")
        } else if minutes % 60 == 0 {
            write!(f, "{}h", minutes / 60)
        } else {
            write!(f, "{}h {}m", minutes / 60, minutes % 60)
        }
    }
}

impl Serialize for Countdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ------------------------------------------------------------------------------------------------
// --- NextDeparture
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NextDeparture {
    route: String,
    time: String,
    minutes: u32,
    index: usize,
    countdown: Countdown,
}

impl NextDeparture {
    // Getters/Setters

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    fn is_slot(&self, route: &str, index: usize) -> bool {
        self.route == route && self.index == index
    }
}

/// The earliest departure strictly after the current minute, across all routes. Equal times
/// go to the earlier route, then to the earlier position in the list.
pub fn resolve_next_departure(routes: &[RouteTimes], now: NaiveTime) -> Option<NextDeparture> {
    let now_minutes = minutes_since_midnight(now);
    let (route_index, route, next) = routes
        .iter()
        .enumerate()
        .flat_map(|(route_index, route)| {
            process_route_times(route.times())
                .into_iter()
                .map(move |processed| (route_index, route, processed))
        })
        .filter(|(_, _, processed)| processed.minutes > now_minutes)
        .min_by_key(|(route_index, _, processed)| (processed.minutes, *route_index, processed.index))?;
    log::debug!("Next departure on route {route_index}: {}", next.time);

    let seconds = next.minutes * 60 - (now_minutes * 60 + now.second());
    Some(NextDeparture {
        route: route.route().to_string(),
        time: next.time,
        minutes: next.minutes,
        index: next.index,
        countdown: Countdown::new(seconds),
    })
}

// ------------------------------------------------------------------------------------------------
// --- Departure board
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BoardSlot {
    time: String,
    minutes: u32,
    /// At or before the current minute.
    past: bool,
    next: bool,
    /// Another slot of the same route leaves at the same time.
    duplicate: bool,
}

impl BoardSlot {
    // Getters/Setters

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn is_past(&self) -> bool {
        self.past
    }

    pub fn is_next(&self) -> bool {
        self.next
    }

    pub fn is_duplicate(&self) -> bool {
        self.duplicate
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RouteBoard {
    route: String,
    upcoming: Vec<BoardSlot>,
    past: Vec<BoardSlot>,
}

impl RouteBoard {
    // Getters/Setters

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn upcoming(&self) -> &[BoardSlot] {
        &self.upcoming
    }

    pub fn past(&self) -> &[BoardSlot] {
        &self.past
    }

    /// Drops the departures that already left.
    pub fn without_past(&self) -> Self {
        Self {
            route: self.route.clone(),
            upcoming: self.upcoming.clone(),
            past: Vec::new(),
        }
    }
}

/// Every route's slots, split into upcoming and past and sorted by time.
pub fn departure_board(routes: &[RouteTimes], now: NaiveTime) -> Vec<RouteBoard> {
    let now_minutes = minutes_since_midnight(now);
    let next = resolve_next_departure(routes, now);

    routes
        .iter()
        .map(|route| {
            let processed = process_route_times(route.times());
            let mut counts: FxHashMap<u32, usize> = FxHashMap::default();
            for slot in &processed {
                *counts.entry(slot.minutes).or_default() += 1;
            }

            let (mut past, mut upcoming): (Vec<_>, Vec<_>) = processed
                .into_iter()
                .map(|slot| BoardSlot {
                    past: slot.minutes <= now_minutes,
                    next: next
                        .as_ref()
                        .is_some_and(|next| next.is_slot(route.route(), slot.index)),
                    duplicate: counts[&slot.minutes] > 1,
                    minutes: slot.minutes,
                    time: slot.time,
                })
                .partition(|slot| slot.past);
            past.sort_by_key(|slot| slot.minutes);
            upcoming.sort_by_key(|slot| slot.minutes);

            RouteBoard {
                route: route.route().to_string(),
                upcoming,
                past,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    fn route(name: &str, times: &[&str]) -> RouteTimes {
        RouteTimes::new(
            name.to_string(),
            times.iter().map(|t| t.to_string()).collect(),
        )
    }

    fn at(hour: u32, minute: u32, second: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, second).unwrap()
    }

    fn minutes(times: &[&str]) -> Vec<u32> {
        let times: Vec<String> = times.iter().map(|t| t.to_string()).collect();
        process_route_times(&times)
            .iter()
            .map(ProcessedTime::minutes)
            .collect()
    }

    #[test]
    fn midday_rollover() {
        assert_eq!(
            minutes(&["9:00", "10:00", "11:00", "12:15", "1:30"]),
            [540, 600, 660, 735, 810]
        );
        // Only once per list.
        assert_eq!(minutes(&["11:00", "1:00", "12:30", "2:00"]), [660, 780, 1470, 840]);
        assert_eq!(minutes(&["08:00", "13:00", "17:30"]), [480, 780, 1050]);
    }

    #[test]
    fn unreadable_times_are_skipped() {
        let times: Vec<String> = ["9:00", "soon", "10:00"].iter().map(|t| t.to_string()).collect();
        let processed = process_route_times(&times);
        assert_eq!(processed.len(), 2);
        assert_eq!(processed[1].index(), 2);
        assert_eq!(processed[1].time(), "10:00");
    }

    #[test]
    fn countdown_display() {
        assert_eq!(Countdown::new(42).to_string(), "42 s");
        assert_eq!(Countdown::new(60).to_string(), "1 min");
        assert_eq!(Countdown::new(59 * 60 + 59).to_string(), "59 min");
        assert_eq!(Countdown::new(3600).to_string(), "1h");
        assert_eq!(Countdown::new(2 * 3600 + 5 * 60 + 30).to_string(), "2h 5m");
    }

    #[test]
    fn next_departure() {
        let routes = [
            route("Nila → Sahyadri", &["9:00", "10:00", "11:00", "12:15", "1:30"]),
            route("Sahyadri → Nila", &["9:30", "12:15"]),
        ];

        let next = resolve_next_departure(&routes, at(8, 59, 30)).unwrap();
        assert_eq!(next.route(), "Nila → Sahyadri");
        assert_eq!(next.time(), "9:00");
        assert_eq!(next.countdown().to_string(), "30 s");

        // 12:15 on both routes: the first route wins.
        let next = resolve_next_departure(&routes, at(11, 0, 0)).unwrap();
        assert_eq!((next.route(), next.index()), ("Nila → Sahyadri", 3));
        assert_eq!(next.countdown().to_string(), "1h 15m");

        let next = resolve_next_departure(&routes, at(12, 15, 0)).unwrap();
        assert_eq!(next.time(), "1:30");
        assert_eq!(next.minutes(), 810);

        assert!(resolve_next_departure(&routes, at(13, 30, 0)).is_none());
        assert!(resolve_next_departure(&[], at(0, 0, 0)).is_none());
    }

    #[test]
    fn board_flags() {
        let routes = [route("A → B", &["08:00", "09:00", "09:00", "10:00"])];
        let board = departure_board(&routes, at(8, 30, 0));
        assert_eq!(board.len(), 1);
        let board = &board[0];

        assert_eq!(board.past().len(), 1);
        assert!(board.past()[0].is_past());
        let upcoming: Vec<(&str, bool, bool)> = board
            .upcoming()
            .iter()
            .map(|slot| (slot.time(), slot.is_next(), slot.is_duplicate()))
            .collect();
        assert_eq!(
            upcoming,
            [
                ("09:00", true, true),
                ("09:00", false, true),
                ("10:00", false, false)
            ]
        );
        assert!(board.without_past().past().is_empty());
    }
}
