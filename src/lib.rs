//! Turns pasted canteen menus and campus bus timetables into typed schedule records, and
//! resolves those records against a date and time.
//!
//! ```no_run
//! use campus_schedule::{CategoryOverride, Dashboard, ScheduleRecord, parse_all};
//! use chrono::NaiveDate;
//!
//! let text = std::fs::read_to_string("paste.txt")?;
//! let outcome = parse_all(&text, &ScheduleRecord::default())?;
//! let at = NaiveDate::from_ymd_opt(2025, 10, 9).unwrap().and_hms_opt(12, 30, 0).unwrap();
//! let dashboard = Dashboard::resolve(outcome.record(), at, CategoryOverride::Auto);
//! println!("{}", dashboard.to_json()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
mod classifier;
mod dashboard;
mod departure;
mod error;
mod models;
mod parsing;
mod resolution;
mod utils;

pub use classifier::{Format, ParseOutcome, classify, parse_all};
pub use dashboard::Dashboard;
pub use departure::{
    BoardSlot, Countdown, NextDeparture, ProcessedTime, RouteBoard, departure_board,
    process_route_times, resolve_next_departure,
};
pub use error::{SResult, ScheduleError};
pub use models::*;
pub use parsing::error::ParsingError;
pub use parsing::{
    has_category_headings, load_bus_week, load_four_week_menu, load_menu_cycle,
    load_multi_category_buses, load_simple_routes, load_single_day_meals, normalize_time,
    parse_time_list, parse_time_token,
};
pub use resolution::{
    CyclePosition, Resolved, ResolvedBuses, ResolvedMenu, resolve_bus_category,
    resolve_bus_routes, resolve_bus_week, resolve_menu,
};
