/// # Single-day fallback parsing
///
/// Pastes without any block marker or category heading are read line by line:
///
/// * `<Meal>: <text>` sets that meal for the day. Besides the four meal names, `bf`, `tiffin`,
///   `snack` and `supper` are understood.
/// * `<From> (→|->|to) <To>: <time list>` is a simple bus route. The label is rewritten as
///   `From → To`; a route whose list holds no valid time is dropped.
///
/// ## Example
///
/// `
/// Breakfast: Poori, Masala
/// Tiffin: Tea, Biscuits
/// Nila to Main Gate: 8:00, 9:00 12:30
/// `
use std::sync::LazyLock;

use nom::{IResult, Parser, character::complete::alpha1, combinator::map_opt};
use regex::Regex;

use crate::{
    models::{Meal, Meals, RouteTimes},
    parsing::{helpers::entry_value_parser, time_parser::parse_time_list},
};

static SIMPLE_ROUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([^:]+?)\s*(?:→|->|\bto\b)\s*([^:]+?)\s*:\s*(.*)$").expect("valid regex")
});

fn meal_alias_parser(input: &str) -> IResult<&str, Meal> {
    map_opt(alpha1, Meal::from_alias).parse(input)
}

fn meal_row_combinator(input: &str) -> IResult<&str, (Meal, String)> {
    (meal_alias_parser, entry_value_parser).parse(input)
}

/// Meals found in the paste. Meals that are not mentioned stay empty.
pub fn parse_meals(lines: &[&str]) -> Meals {
    log::info!("Parsing single-day menu...");
    lines
        .iter()
        .filter_map(|line| meal_row_combinator(line).ok())
        .fold(Meals::default(), |meals, (_, (meal, value))| {
            meals.with(meal, &value)
        })
}

/// Simple `From → To: times` routes in order of first appearance. A repeated route replaces
/// the earlier list.
pub fn parse_routes(lines: &[&str]) -> Vec<RouteTimes> {
    log::info!("Parsing simple bus routes...");
    let mut routes: Vec<RouteTimes> = Vec::new();
    for line in lines {
        if meal_row_combinator(line).is_ok() {
            continue;
        }
        let Some(captures) = SIMPLE_ROUTE.captures(line) else {
            continue;
        };
        let times = parse_time_list(&captures[3]);
        if times.is_empty() {
            log::debug!("Skipping route without times {line:?}");
            continue;
        }

        let route = RouteTimes::new(format!("{} → {}", &captures[1], &captures[2]), times);
        match routes.iter_mut().find(|r| r.route() == route.route()) {
            Some(existing) => *existing = route,
            None => routes.push(route),
        }
    }
    routes
}
