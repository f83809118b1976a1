// Decides which parsers a paste goes through and merges what they produce into a record.
use std::mem;

use serde_json::{Map, Value, json};
use strum_macros::Display;

use crate::{
    error::{SResult, ScheduleError},
    models::{BlockKind, BusSchedule, MenuCycle, Meals, ScheduleRecord},
    parsing::{
        has_category_headings,
        helpers::{contains_marker, split_lines},
        load_bus_week, load_four_week_menu, load_menu_cycle, load_multi_category_buses,
        load_simple_routes, load_single_day_meals,
    },
};

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[strum(serialize_all = "kebab-case")]
pub enum Format {
    StructuredPayload,
    FourWeekMenu,
    MenuCycle,
    BusWeek,
    MultiCategoryBuses,
    SingleDay,
}

impl Format {
    fn block(self) -> Option<BlockKind> {
        match self {
            Self::FourWeekMenu => Some(BlockKind::FourWeekMenu),
            Self::MenuCycle => Some(BlockKind::MenuCycle),
            Self::BusWeek => Some(BlockKind::BusWeek),
            _ => None,
        }
    }
}

/// The record built from a paste, the formats that were recognised and the blocks that failed.
#[derive(Debug)]
pub struct ParseOutcome {
    record: ScheduleRecord,
    formats: Vec<Format>,
    failures: Vec<ScheduleError>,
}

impl ParseOutcome {
    // Getters/Setters

    pub fn record(&self) -> &ScheduleRecord {
        &self.record
    }

    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    pub fn failures(&self) -> &[ScheduleError] {
        &self.failures
    }

    pub fn into_record(self) -> ScheduleRecord {
        self.record
    }
}

fn is_structured_payload(text: &str) -> bool {
    text.starts_with('{') || text.starts_with('[')
}

fn has_block(lines: &[&str], kind: BlockKind) -> bool {
    let (start, end) = (kind.start_marker(), kind.end_marker());
    lines
        .iter()
        .any(|line| contains_marker(line, &start) || contains_marker(line, &end))
}

/// Every format whose markers appear in `text`. `SingleDay` is listed when the menu side or the
/// bus side has no marker and falls back to the single-day grammar.
pub fn classify(text: &str) -> Vec<Format> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if is_structured_payload(text) {
        return vec![Format::StructuredPayload];
    }

    let lines = split_lines(text);
    let mut formats: Vec<Format> = [Format::FourWeekMenu, Format::MenuCycle, Format::BusWeek]
        .into_iter()
        .filter(|format| format.block().is_some_and(|kind| has_block(&lines, kind)))
        .collect();

    if has_category_headings(&lines) {
        formats.push(Format::MultiCategoryBuses);
    }

    let has_menu = formats.contains(&Format::FourWeekMenu) || formats.contains(&Format::MenuCycle);
    let has_buses =
        formats.contains(&Format::BusWeek) || formats.contains(&Format::MultiCategoryBuses);
    if !has_menu || !has_buses {
        formats.push(Format::SingleDay);
    }
    formats
}

/// A 14-day cycle saved without its `type` tag. A cycle that does not deserialize is dropped
/// and the plain `menu` is used instead.
fn legacy_menu_cycle(mut cycle: Value) -> Option<Value> {
    let fields = cycle.as_object_mut()?;
    if !fields.contains_key("type") && fields.get("days").is_some_and(Value::is_array) {
        fields.insert("type".to_string(), Value::from("fourteen-day"));
    }
    match serde_json::from_value::<MenuCycle>(cycle.clone()) {
        Ok(_) => Some(cycle),
        Err(e) => {
            log::warn!("Ignoring menu cycle: {e}");
            None
        }
    }
}

/// Rewrites a record saved in the older layout into the current one:
///
/// * `menu` holds plain meals without a `type` tag, and a non-null `menuCycle` next to it
///   replaces it
/// * `buses.multi` is the bare category map, with `buses.specials` beside it
/// * `buses.week` has a null `startDate` when no bus week was loaded
///
/// Fields already in the current layout are left alone.
fn upgrade_legacy_layout(object: &mut Map<String, Value>) {
    if let Some(Value::Object(menu)) = object.get_mut("menu") {
        if !menu.contains_key("type") {
            menu.insert("type".to_string(), Value::from("single-day"));
        }
    }
    if let Some(cycle) = object.remove("menuCycle").and_then(legacy_menu_cycle) {
        object.insert("menu".to_string(), cycle);
    }

    let Some(Value::Object(buses)) = object.get_mut("buses") else {
        return;
    };
    let specials = buses.remove("specials").filter(|specials| !specials.is_null());
    match buses.get_mut("multi") {
        Some(Value::Object(multi)) => {
            if !multi.contains_key("categories") && !multi.contains_key("specials") {
                let categories = mem::take(multi);
                multi.insert("categories".to_string(), Value::Object(categories));
            }
            if let Some(specials) = specials {
                multi.entry("specials").or_insert(specials);
            }
        }
        _ => {
            if let Some(specials) = specials {
                buses.insert("multi".to_string(), json!({ "specials": specials }));
            }
        }
    }
    if buses
        .get("week")
        .is_some_and(|week| week.get("startDate").is_none_or(Value::is_null))
    {
        buses.insert("week".to_string(), Value::Null);
    }
}

fn parse_payload(text: &str, previous: &ScheduleRecord) -> SResult<ScheduleRecord> {
    log::info!("Parsing structured payload...");
    let invalid = |e: serde_json::Error| ScheduleError::InvalidPayload(e.to_string());

    let mut value: Value = serde_json::from_str(text).map_err(invalid)?;
    let Some(object) = value.as_object_mut() else {
        return Err(ScheduleError::InvalidPayload(
            "expected an object with `menu` and `buses`".to_string(),
        ));
    };
    if let Some(field) = ["menu", "buses"]
        .into_iter()
        .find(|field| !object.contains_key(*field))
    {
        return Err(ScheduleError::InvalidPayload(format!(
            "missing field `{field}`"
        )));
    }
    let has_preferences = object.contains_key("preferences");
    upgrade_legacy_layout(object);

    let record: ScheduleRecord = serde_json::from_value(value).map_err(invalid)?;
    if has_preferences {
        Ok(record)
    } else {
        Ok(record.with_preferences(*previous.preferences()))
    }
}

fn record_failure<T>(result: SResult<T>, failures: &mut Vec<ScheduleError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("{e}");
            failures.push(e);
            None
        }
    }
}

fn parse_menu(
    lines: &[&str],
    formats: &[Format],
    previous: &ScheduleRecord,
    failures: &mut Vec<ScheduleError>,
) -> Option<MenuCycle> {
    let four_week = formats
        .contains(&Format::FourWeekMenu)
        .then(|| record_failure(load_four_week_menu(lines), failures))
        .flatten()
        .map(MenuCycle::FourWeek);
    let fourteen_day = formats
        .contains(&Format::MenuCycle)
        .then(|| record_failure(load_menu_cycle(lines), failures))
        .flatten()
        .map(MenuCycle::FourteenDay);
    if four_week.is_some() || fourteen_day.is_some() {
        return four_week.or(fourteen_day);
    }
    if formats.contains(&Format::FourWeekMenu) || formats.contains(&Format::MenuCycle) {
        return None;
    }

    let meals = load_single_day_meals(lines);
    if meals.is_empty() {
        return None;
    }
    let previous_meals = match previous.menu() {
        MenuCycle::SingleDay(meals) => meals.clone(),
        _ => Meals::default(),
    };
    Some(MenuCycle::SingleDay(meals.or(&previous_meals)))
}

fn parse_buses(
    lines: &[&str],
    formats: &[Format],
    failures: &mut Vec<ScheduleError>,
) -> Option<BusSchedule> {
    // A bus week that fails gives way to the category headings, if the paste has them.
    if formats.contains(&Format::BusWeek) {
        if let Some(week) = record_failure(load_bus_week(lines), failures) {
            return Some(BusSchedule::Week(week));
        }
        if !formats.contains(&Format::MultiCategoryBuses) {
            return None;
        }
    }
    if formats.contains(&Format::MultiCategoryBuses) {
        return Some(BusSchedule::MultiCategory(load_multi_category_buses(lines)));
    }

    let routes = load_simple_routes(lines);
    (!routes.is_empty()).then_some(BusSchedule::Simple(routes))
}

/// Parses a paste on top of `previous`.
///
/// A structured payload replaces the record and fails with `InvalidPayload` when it is not an
/// object carrying `menu` and `buses`. For marker text, each recognised block is parsed on its
/// own: a block that fails is reported in `failures` while its siblings still land in the
/// record. Whatever the paste does not provide is kept from `previous`.
pub fn parse_all(text: &str, previous: &ScheduleRecord) -> SResult<ParseOutcome> {
    let text = text.trim();
    let formats = classify(text);
    if formats.contains(&Format::StructuredPayload) {
        return Ok(ParseOutcome {
            record: parse_payload(text, previous)?,
            formats,
            failures: Vec::new(),
        });
    }

    let lines = split_lines(text);
    let mut failures = Vec::new();
    let mut record = previous.clone();
    if let Some(menu) = parse_menu(&lines, &formats, previous, &mut failures) {
        record = record.with_menu(menu);
    }
    if let Some(schedule) = parse_buses(&lines, &formats, &mut failures) {
        record = record.with_buses(record.buses().with_schedule(schedule));
    }

    Ok(ParseOutcome {
        record,
        formats,
        failures,
    })
}
