// Resolution of stored cycles against a calendar date. Nothing here reads the clock.
use chrono::NaiveDate;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::{
    models::{
        BusCategory, BusWeek, Buses, CategoryOverride, DayOfWeek, FourWeekCycle,
        FourteenDayCycle, Meal, Meals, MenuCycle, RouteTimes, WeekVariant,
    },
    utils::days_since,
};

/// A cycle either applies to the date or only starts later.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Resolved<T> {
    Active(T),
    NotYetActive {
        #[serde(rename = "startsOn")]
        starts_on: NaiveDate,
    },
}

impl<T> Resolved<T> {
    pub fn active(self) -> Option<T> {
        match self {
            Self::Active(value) => Some(value),
            Self::NotYetActive { .. } => None,
        }
    }
}

/// Where in its cycle a resolved menu comes from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CyclePosition {
    Fixed,
    FourteenDay {
        /// 1-based.
        day: usize,
    },
    FourWeek {
        variant: WeekVariant,
        /// 1-based position in the 4-week rotation.
        #[serde(rename = "weekNumber")]
        week_number: u32,
        weekday: DayOfWeek,
    },
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResolvedMenu {
    meals: Meals,
    position: CyclePosition,
}

impl ResolvedMenu {
    pub fn new(meals: Meals, position: CyclePosition) -> Self {
        Self { meals, position }
    }

    // Getters/Setters

    pub fn meals(&self) -> &Meals {
        &self.meals
    }

    pub fn position(&self) -> CyclePosition {
        self.position
    }
}

// ------------------------------------------------------------------------------------------------
// --- Menu
// ------------------------------------------------------------------------------------------------

/// The meals that apply on `date`.
pub fn resolve_menu(menu: &MenuCycle, date: NaiveDate) -> Resolved<ResolvedMenu> {
    match menu {
        MenuCycle::SingleDay(meals) => {
            Resolved::Active(ResolvedMenu::new(meals.clone(), CyclePosition::Fixed))
        }
        MenuCycle::FourteenDay(cycle) => resolve_fourteen_day(cycle, date),
        MenuCycle::FourWeek(cycle) => resolve_four_week(cycle, date),
    }
}

fn resolve_fourteen_day(cycle: &FourteenDayCycle, date: NaiveDate) -> Resolved<ResolvedMenu> {
    let offset = days_since(cycle.start_date(), date);
    if offset < 0 {
        return Resolved::NotYetActive {
            starts_on: cycle.start_date(),
        };
    }

    let index = offset.unsigned_abs() as usize % FourteenDayCycle::LENGTH;
    Resolved::Active(ResolvedMenu::new(
        cycle.days()[index].clone(),
        CyclePosition::FourteenDay { day: index + 1 },
    ))
}

fn resolve_four_week(cycle: &FourWeekCycle, date: NaiveDate) -> Resolved<ResolvedMenu> {
    let offset = days_since(cycle.start_date(), date);
    if offset < 0 {
        return Resolved::NotYetActive {
            starts_on: cycle.start_date(),
        };
    }

    let rotation = (offset.unsigned_abs() / 7 % 4) as u32;
    let variant = WeekVariant::for_rotation(rotation);
    let weekday = DayOfWeek::from_date(date);
    let week = cycle.week(variant);
    let meals = Meal::iter().fold(Meals::default(), |meals, meal| {
        meals.with(meal, week.meal_for(weekday, meal).unwrap_or_default())
    });

    Resolved::Active(ResolvedMenu::new(
        meals,
        CyclePosition::FourWeek {
            variant,
            week_number: rotation + 1,
            weekday,
        },
    ))
}

// ------------------------------------------------------------------------------------------------
// --- Buses
// ------------------------------------------------------------------------------------------------

fn representative_weekday(category: BusCategory) -> DayOfWeek {
    match category {
        BusCategory::Working => DayOfWeek::Wednesday,
        BusCategory::Saturday => DayOfWeek::Saturday,
        BusCategory::Sunday => DayOfWeek::Sunday,
    }
}

/// A manual override wins, then the stored holiday override, then the weekday of `date`.
pub fn resolve_bus_category(
    date: NaiveDate,
    holiday_override: CategoryOverride,
    manual_override: CategoryOverride,
) -> BusCategory {
    if let Some(category) = manual_override.category() {
        return category;
    }
    let weekday = match holiday_override.category() {
        Some(category) => representative_weekday(category),
        None => DayOfWeek::from_date(date),
    };
    BusCategory::from_weekday(weekday)
}

/// Both directions for the bus-week day matching `date`. Dates before the week starts, or a
/// missing week, give `fallback`.
pub fn resolve_bus_week(
    week: Option<&BusWeek>,
    fallback: &[RouteTimes],
    date: NaiveDate,
) -> Vec<RouteTimes> {
    let Some(week) = week else {
        return fallback.to_vec();
    };
    let offset = days_since(week.start_date(), date);
    if offset < 0 {
        log::debug!("Bus week starts on {}, using fallback routes", week.start_date());
        return fallback.to_vec();
    }

    let index = offset.unsigned_abs() as usize % BusWeek::LENGTH;
    week.days()[index].to_route_times()
}

/// The routes that run on a date, with the category used to pick them when the
/// multi-category schedule applied.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResolvedBuses {
    category: Option<BusCategory>,
    routes: Vec<RouteTimes>,
}

impl ResolvedBuses {
    // Getters/Setters

    pub fn category(&self) -> Option<BusCategory> {
        self.category
    }

    pub fn routes(&self) -> &[RouteTimes] {
        &self.routes
    }
}

/// Multi-category schedule first, then the bus week, then the legacy routes. A category the
/// schedule does not have falls back to working days.
pub fn resolve_bus_routes(
    buses: &Buses,
    date: NaiveDate,
    holiday_override: CategoryOverride,
    manual_override: CategoryOverride,
) -> ResolvedBuses {
    if let Some(multi) = buses.multi() {
        let category = resolve_bus_category(date, holiday_override, manual_override);
        let set = multi
            .category(category)
            .map(|set| (category, set))
            .or_else(|| {
                multi
                    .category(BusCategory::Working)
                    .map(|set| (BusCategory::Working, set))
            });
        if let Some((category, set)) = set {
            return ResolvedBuses {
                category: Some(category),
                routes: set.to_route_times(),
            };
        }
        log::debug!("No {category} timetable, using fallback routes");
        return ResolvedBuses {
            category: None,
            routes: buses.routes().to_vec(),
        };
    }

    ResolvedBuses {
        category: None,
        routes: resolve_bus_week(buses.week(), buses.routes(), date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BusSchedule, MultiCategorySchedule, RouteDirection, RouteSet, WeekVariants,
    };
    use pretty_assertions::assert_eq;
    use rustc_hash::FxHashMap;
    use test_log::test;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn start() -> NaiveDate {
        date(2025, 10, 6)
    }

    fn four_week() -> MenuCycle {
        MenuCycle::FourWeek(
            FourWeekCycle::new(start(), WeekVariants::default())
                .with_common(WeekVariant::Week13, Meal::Lunch, "Rice, Dal")
                .with_common(WeekVariant::Week24, Meal::Lunch, "Pulao")
                .with_override(WeekVariant::Week24, DayOfWeek::Sunday, Meal::Lunch, "Biryani"),
        )
    }

    fn times(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn single_day_is_always_active() {
        let menu = MenuCycle::SingleDay(Meals::new("Idly", "", "", ""));
        let resolved = resolve_menu(&menu, date(1999, 1, 1)).active().unwrap();
        assert_eq!(resolved.meals().get(Meal::Breakfast), Some("Idly"));
        assert_eq!(resolved.position(), CyclePosition::Fixed);
    }

    #[test]
    fn four_week_rotation() {
        let menu = four_week();

        // Offset 13: second week of the rotation, a Sunday.
        let resolved = resolve_menu(&menu, date(2025, 10, 19)).active().unwrap();
        assert_eq!(
            resolved.position(),
            CyclePosition::FourWeek {
                variant: WeekVariant::Week24,
                week_number: 2,
                weekday: DayOfWeek::Sunday,
            }
        );
        assert_eq!(resolved.meals().get(Meal::Lunch), Some("Biryani"));

        // Offset 14: third week, back to week13.
        let resolved = resolve_menu(&menu, date(2025, 10, 20)).active().unwrap();
        assert_eq!(
            resolved.position(),
            CyclePosition::FourWeek {
                variant: WeekVariant::Week13,
                week_number: 3,
                weekday: DayOfWeek::Monday,
            }
        );
        assert_eq!(resolved.meals().get(Meal::Lunch), Some("Rice, Dal"));
        assert_eq!(resolved.meals().get(Meal::Dinner), None);

        // Offset 28 wraps around to the first week.
        let resolved = resolve_menu(&menu, date(2025, 11, 3)).active().unwrap();
        assert!(matches!(
            resolved.position(),
            CyclePosition::FourWeek { week_number: 1, .. }
        ));
    }

    #[test]
    fn cycles_before_their_start_are_not_active() {
        assert_eq!(
            resolve_menu(&four_week(), date(2025, 10, 5)),
            Resolved::NotYetActive { starts_on: start() }
        );

        let days: [Meals; 14] = Default::default();
        let menu = MenuCycle::FourteenDay(FourteenDayCycle::new(start(), days));
        assert_eq!(
            resolve_menu(&menu, date(2024, 1, 1)),
            Resolved::NotYetActive { starts_on: start() }
        );
    }

    #[test]
    fn fourteen_day_index() {
        let mut days: [Meals; 14] = Default::default();
        days[0] = Meals::new("", "Day one", "", "");
        days[13] = Meals::new("", "Day fourteen", "", "");
        let menu = MenuCycle::FourteenDay(FourteenDayCycle::new(start(), days));

        let resolved = resolve_menu(&menu, date(2025, 10, 19)).active().unwrap();
        assert_eq!(resolved.position(), CyclePosition::FourteenDay { day: 14 });
        assert_eq!(resolved.meals().get(Meal::Lunch), Some("Day fourteen"));

        let resolved = resolve_menu(&menu, date(2025, 10, 20)).active().unwrap();
        assert_eq!(resolved.position(), CyclePosition::FourteenDay { day: 1 });
        assert_eq!(resolved.meals().get(Meal::Lunch), Some("Day one"));
    }

    #[test]
    fn bus_category() {
        let saturday = date(2025, 10, 11);
        let auto = CategoryOverride::Auto;
        assert_eq!(resolve_bus_category(saturday, auto, auto), BusCategory::Saturday);
        assert_eq!(
            resolve_bus_category(date(2025, 10, 12), auto, auto),
            BusCategory::Sunday
        );
        assert_eq!(
            resolve_bus_category(start(), CategoryOverride::Sunday, auto),
            BusCategory::Sunday
        );
        assert_eq!(
            resolve_bus_category(saturday, CategoryOverride::Working, auto),
            BusCategory::Working
        );
        assert_eq!(
            resolve_bus_category(saturday, CategoryOverride::Sunday, CategoryOverride::Working),
            BusCategory::Working
        );
    }

    #[test]
    fn bus_week_days() {
        let mut days: [RouteSet; 7] = Default::default();
        days[2] = RouteSet::new(times(&["08:00"]), times(&["08:30"]));
        let week = BusWeek::new(start(), days);
        let fallback = [RouteTimes::new("A → B".to_string(), times(&["07:00"]))];

        let routes = resolve_bus_week(Some(&week), &fallback, date(2025, 10, 15));
        assert_eq!(
            routes,
            [
                RouteTimes::new("Nila → Sahyadri".to_string(), times(&["08:00"])),
                RouteTimes::new("Sahyadri → Nila".to_string(), times(&["08:30"])),
            ]
        );
        assert_eq!(resolve_bus_week(Some(&week), &fallback, date(2025, 10, 1)), fallback);
        assert_eq!(resolve_bus_week(None, &fallback, start()), fallback);
    }

    #[test]
    fn bus_routes_precedence() {
        let legacy = vec![RouteTimes::new("A → B".to_string(), times(&["07:00"]))];
        let mut categories = FxHashMap::default();
        categories.insert(
            BusCategory::Working,
            RouteSet::new(times(&["08:00"]), Vec::new()),
        );
        let multi = MultiCategorySchedule::new(categories, FxHashMap::default());
        let buses = Buses::default()
            .with_schedule(BusSchedule::Simple(legacy.clone()))
            .with_schedule(BusSchedule::MultiCategory(multi));
        let auto = CategoryOverride::Auto;

        // No sunday timetable: working days are used instead.
        let resolved = resolve_bus_routes(&buses, date(2025, 10, 12), auto, auto);
        assert_eq!(resolved.category(), Some(BusCategory::Working));
        assert_eq!(
            resolved.routes()[0].times(),
            ["08:00"]
        );
        assert_eq!(
            resolved.routes()[0].route(),
            RouteDirection::NilaToSahyadri.to_string()
        );

        let resolved = resolve_bus_routes(
            &Buses::default().with_schedule(BusSchedule::Simple(legacy.clone())),
            start(),
            auto,
            auto,
        );
        assert_eq!(resolved.category(), None);
        assert_eq!(resolved.routes(), legacy);

        let empty_multi = Buses::default()
            .with_schedule(BusSchedule::Simple(legacy.clone()))
            .with_schedule(BusSchedule::MultiCategory(MultiCategorySchedule::default()));
        let resolved = resolve_bus_routes(&empty_multi, start(), auto, auto);
        assert_eq!(resolved.routes(), legacy);
    }
}
