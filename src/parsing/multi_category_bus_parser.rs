/// # Multi-category bus timetable parsing
///
/// Timetables pasted from the transport office notice have no block markers. The text is a
/// sequence of sections:
///
/// * category headings: `Working Days`, `Saturdays and M–F Holidays` (or just `Saturdays`),
///   `Sundays`
/// * route headings: `Nila → Sahyadri:` / `Sahyadri → Nila:` followed by times, which may
///   continue on the next lines
/// * special location headings: `Palakkad Town`, `Wise Park Junction`, each followed by
///   free-text (usually numbered) lines
///
/// ## Example
///
/// `
/// Bus Times
/// Working Days
/// Nila → Sahyadri: 8:00, 8:30, 9:00
/// 9:30 10:00 12:15
/// 1:30 2:30
/// * Buses may leave 5 minutes early
/// Sahyadri → Nila: 8:15, 8:45
///
/// Saturdays and M–F Holidays
/// Nila to Sahyadri: 9, 11, 1
///
/// Palakkad Town
/// 1. Saturday 2 pm from main gate
/// 2. Sunday 9 am return
/// `
use std::{mem, sync::LazyLock};

use nom::{
    IResult, Parser,
    character::complete::{char, space0},
    combinator::{map, rest},
};
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::{
    models::{BusCategory, MultiCategorySchedule, RouteDirection, RouteSet, SpecialLocation},
    parsing::{helpers::route_direction_parser, time_parser::normalize_time},
};

static WORKING_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^working\s+days").expect("valid regex"));

static SATURDAY_HEADINGS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)^saturdays?\s*(?:[:(]|$)").expect("valid regex"),
        Regex::new(r"(?i)saturdays?\s+(?:and|&)\s+m\W?\s*f\s+holidays").expect("valid regex"),
    ]
});

static SUNDAY_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^sundays?\s*(?:[:(]|$)").expect("valid regex"));

static PALAKKAD_TOWN_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^palakkad\s+town").expect("valid regex"));

static WISE_PARK_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)wise\s+park\s+junction").expect("valid regex"));

static TIME_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d{1,2}(?:[:.]\d{2})?(?:\s?[ap]m)?\b").expect("valid regex")
});

static ORDINAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*[.)]\s*").expect("valid regex"));

fn category_heading(line: &str) -> Option<BusCategory> {
    if WORKING_HEADING.is_match(line) {
        Some(BusCategory::Working)
    } else if SATURDAY_HEADINGS.iter().any(|re| re.is_match(line)) {
        Some(BusCategory::Saturday)
    } else if SUNDAY_HEADING.is_match(line) {
        Some(BusCategory::Sunday)
    } else {
        None
    }
}

fn specials_heading(line: &str) -> Option<SpecialLocation> {
    if PALAKKAD_TOWN_HEADING.is_match(line) {
        Some(SpecialLocation::PalakkadTown)
    } else if WISE_PARK_HEADING.is_match(line) {
        Some(SpecialLocation::WisePark)
    } else {
        None
    }
}

/// `<route>:` and whatever follows the colon on the same line.
fn route_heading_combinator(input: &str) -> IResult<&str, (RouteDirection, &str)> {
    map(
        (route_direction_parser, space0, char(':'), rest),
        |(direction, _, _, inline)| (direction, inline),
    )
    .parse(input)
}

fn scan_times(text: &str) -> Vec<String> {
    TIME_TOKEN
        .find_iter(text)
        .filter_map(|token| match normalize_time(token.as_str()) {
            Ok(time) => Some(time),
            Err(e) => {
                log::debug!("Dropping token: {e}");
                None
            }
        })
        .collect()
}

/// A colon that is not part of a time means the line is prose, e.g. `Note: last bus may vary`.
fn is_prose(line: &str) -> bool {
    TIME_TOKEN.replace_all(line, "").contains(':')
}

/// True when all three category headings are present.
pub fn has_category_headings(lines: &[&str]) -> bool {
    [
        BusCategory::Working,
        BusCategory::Saturday,
        BusCategory::Sunday,
    ]
    .iter()
    .all(|category| lines.iter().any(|line| category_heading(line) == Some(*category)))
}

#[derive(Debug, Default, Eq, PartialEq)]
enum ScanState {
    #[default]
    Idle,
    InCategory,
    InRoute {
        category: BusCategory,
        direction: RouteDirection,
        times: Vec<String>,
    },
    InSpecials(SpecialLocation),
}

#[derive(Default)]
struct Scanner {
    state: ScanState,
    current_category: Option<BusCategory>,
    categories: FxHashMap<BusCategory, RouteSet>,
    specials: FxHashMap<SpecialLocation, Vec<String>>,
}

impl Scanner {
    fn scan_line(&mut self, line: &str) {
        if let Some(category) = category_heading(line) {
            self.finish_route();
            self.current_category = Some(category);
            self.categories.entry(category).or_default();
            self.state = ScanState::InCategory;
            return;
        }

        if let Ok((_, (direction, inline))) = route_heading_combinator(line) {
            self.finish_route();
            let category = *self.current_category.get_or_insert(BusCategory::Working);
            self.categories.entry(category).or_default();
            self.state = ScanState::InRoute {
                category,
                direction,
                times: scan_times(inline),
            };
            return;
        }

        if let Some(location) = specials_heading(line) {
            self.finish_route();
            self.state = ScanState::InSpecials(location);
            return;
        }

        let mut route_ended = false;
        match &mut self.state {
            ScanState::InRoute { times, .. } => {
                if line.is_empty() {
                    route_ended = true;
                } else if line.starts_with('*') {
                    log::debug!("Skipping annotation {line:?}");
                } else if is_prose(line) {
                    route_ended = true;
                } else {
                    times.extend(scan_times(line));
                }
            }
            ScanState::InSpecials(location) => {
                let entry = ORDINAL_PREFIX.replace(line, "");
                let entry = entry.trim();
                if !entry.is_empty() {
                    self.specials
                        .entry(*location)
                        .or_default()
                        .push(entry.to_string());
                }
            }
            ScanState::Idle | ScanState::InCategory => {}
        }
        if route_ended {
            self.finish_route();
        }
    }

    /// Stores the route being collected, replacing any earlier list for the same route.
    fn finish_route(&mut self) {
        match mem::take(&mut self.state) {
            ScanState::InRoute {
                category,
                direction,
                times,
            } => {
                let set = self.categories.entry(category).or_default();
                *set = set.with_times(direction, times);
                self.state = ScanState::InCategory;
            }
            other => self.state = other,
        }
    }

    fn finish(mut self) -> MultiCategorySchedule {
        self.finish_route();
        MultiCategorySchedule::new(self.categories, self.specials)
    }
}

pub fn parse(lines: &[&str]) -> MultiCategorySchedule {
    log::info!("Parsing multi-category bus timetable...");
    let mut scanner = Scanner::default();
    for line in lines {
        scanner.scan_line(line.trim());
    }
    scanner.finish()
}
