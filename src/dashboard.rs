use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::{
    departure::{Countdown, NextDeparture, RouteBoard, departure_board, resolve_next_departure},
    models::{BusCategory, CategoryOverride, ScheduleRecord, SpecialLocation},
    resolution::{ResolvedBuses, ResolvedMenu, Resolved, resolve_bus_routes, resolve_menu},
};

/// Everything that applies at one moment: the menu, the buses and the next departure.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    date: NaiveDate,
    time: NaiveTime,
    menu: Resolved<ResolvedMenu>,
    category_label: Option<&'static str>,
    buses: ResolvedBuses,
    board: Vec<RouteBoard>,
    next_departure: Option<NextDeparture>,
    countdown: Option<Countdown>,
    /// In `SpecialLocation` declaration order.
    specials: BTreeMap<SpecialLocation, Vec<String>>,
}

impl Dashboard {
    /// Resolves `record` at `at`. `manual_override` is the category picked on screen, which
    /// wins over the stored holiday override.
    pub fn resolve(
        record: &ScheduleRecord,
        at: NaiveDateTime,
        manual_override: CategoryOverride,
    ) -> Self {
        let (date, time) = (at.date(), at.time());
        let preferences = record.preferences();

        let buses = resolve_bus_routes(
            record.buses(),
            date,
            preferences.holiday_override(),
            manual_override,
        );
        let next_departure = resolve_next_departure(buses.routes(), time);
        let countdown = next_departure
            .as_ref()
            .filter(|_| preferences.countdown())
            .map(NextDeparture::countdown);
        let board = departure_board(buses.routes(), time)
            .iter()
            .map(|route| {
                if preferences.hide_past_times() {
                    route.without_past()
                } else {
                    route.clone()
                }
            })
            .collect();
        let specials: BTreeMap<SpecialLocation, Vec<String>> = record
            .buses()
            .multi()
            .map(|multi| {
                SpecialLocation::iter()
                    .map(|location| (location, multi.specials(location).to_vec()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            date,
            time,
            menu: resolve_menu(record.menu(), date),
            category_label: buses.category().map(BusCategory::label),
            buses,
            board,
            next_departure,
            countdown,
            specials,
        }
    }

    // Getters/Setters

    pub fn menu(&self) -> &Resolved<ResolvedMenu> {
        &self.menu
    }

    pub fn buses(&self) -> &ResolvedBuses {
        &self.buses
    }

    pub fn board(&self) -> &[RouteBoard] {
        &self.board
    }

    pub fn next_departure(&self) -> Option<&NextDeparture> {
        self.next_departure.as_ref()
    }

    pub fn countdown(&self) -> Option<Countdown> {
        self.countdown
    }

    pub fn specials(&self, location: SpecialLocation) -> &[String] {
        self.specials
            .get(&location)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
