use chrono::{Datelike, NaiveDate};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{self, Display, EnumIter, EnumString};

use crate::{
    error::{SResult, ScheduleError},
    parsing::normalize_time,
};

// ------------------------------------------------------------------------------------------------
// --- BlockKind
// ------------------------------------------------------------------------------------------------

/// The START/END delimited formats. The display form is the marker text shared by both lines.
#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq)]
pub enum BlockKind {
    #[strum(to_string = "4-WEEK MENU")]
    FourWeekMenu,

    #[strum(to_string = "MENU CYCLE")]
    MenuCycle,

    #[strum(to_string = "BUS WEEK")]
    BusWeek,
}

impl BlockKind {
    pub fn start_marker(self) -> String {
        format!("START {self}")
    }

    pub fn end_marker(self) -> String {
        format!("END {self}")
    }
}

// ------------------------------------------------------------------------------------------------
// --- BusCategory
// ------------------------------------------------------------------------------------------------

#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum BusCategory {
    Working,
    Saturday,
    Sunday,
}

impl BusCategory {
    /// Sunday runs the sunday timetable, Saturday the saturday one, every other day is a working day.
    pub fn from_weekday(day: DayOfWeek) -> Self {
        match day {
            DayOfWeek::Sunday => Self::Sunday,
            DayOfWeek::Saturday => Self::Saturday,
            _ => Self::Working,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Working => "Working Days",
            Self::Saturday => "Sat / MF Holidays",
            Self::Sunday => "Sundays",
        }
    }
}

// ------------------------------------------------------------------------------------------------
// --- CategoryOverride
// ------------------------------------------------------------------------------------------------

#[derive(
    Clone, Copy, Debug, Default, Display, EnumString, Eq, Hash, PartialEq, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum CategoryOverride {
    #[default]
    Auto,
    Working,
    Saturday,
    Sunday,
}

impl CategoryOverride {
    /// `None` for `Auto`.
    pub fn category(self) -> Option<BusCategory> {
        match self {
            Self::Auto => None,
            Self::Working => Some(BusCategory::Working),
            Self::Saturday => Some(BusCategory::Saturday),
            Self::Sunday => Some(BusCategory::Sunday),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// --- DayOfWeek
// ------------------------------------------------------------------------------------------------

#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub fn from_date(date: NaiveDate) -> Self {
        Self::from(date.weekday())
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Monday => "Mon",
            Self::Tuesday => "Tue",
            Self::Wednesday => "Wed",
            Self::Thursday => "Thu",
            Self::Friday => "Fri",
            Self::Saturday => "Sat",
            Self::Sunday => "Sun",
        }
    }

    pub fn from_abbreviation(value: &str) -> Option<Self> {
        Self::iter().find(|day| day.abbreviation().eq_ignore_ascii_case(value))
    }

    /// Position in a Monday-first week.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// --- Meal
// ------------------------------------------------------------------------------------------------

#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Meal {
    Breakfast,
    Lunch,
    Snacks,
    Dinner,
}

impl Meal {
    pub fn label(self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Snacks => "Snacks",
            Self::Dinner => "Dinner",
        }
    }

    /// Meal names plus the short forms people use in single-day pastes.
    pub fn from_alias(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "breakfast" | "bf" => Some(Self::Breakfast),
            "lunch" => Some(Self::Lunch),
            "snacks" | "snack" | "tiffin" => Some(Self::Snacks),
            "dinner" | "supper" => Some(Self::Dinner),
            _ => None,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// --- Meals
// ------------------------------------------------------------------------------------------------

/// The four meal texts of one day. `None` means no data for that meal.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Meals {
    #[serde(default, with = "blank_as_none")]
    breakfast: Option<String>,
    #[serde(default, with = "blank_as_none")]
    lunch: Option<String>,
    #[serde(default, with = "blank_as_none")]
    snacks: Option<String>,
    #[serde(default, with = "blank_as_none")]
    dinner: Option<String>,
}

impl Meals {
    pub fn new(breakfast: &str, lunch: &str, snacks: &str, dinner: &str) -> Self {
        Self {
            breakfast: non_blank(breakfast),
            lunch: non_blank(lunch),
            snacks: non_blank(snacks),
            dinner: non_blank(dinner),
        }
    }

    // Getters/Setters

    pub fn get(&self, meal: Meal) -> Option<&str> {
        match meal {
            Meal::Breakfast => self.breakfast.as_deref(),
            Meal::Lunch => self.lunch.as_deref(),
            Meal::Snacks => self.snacks.as_deref(),
            Meal::Dinner => self.dinner.as_deref(),
        }
    }

    /// Returns a copy with `meal` replaced. A blank value clears the meal.
    pub fn with(&self, meal: Meal, value: &str) -> Self {
        let mut meals = self.clone();
        meals.set(meal, non_blank(value));
        meals
    }

    pub fn is_empty(&self) -> bool {
        Meal::iter().all(|meal| self.get(meal).is_none())
    }

    /// Per meal: our value if present, otherwise the one from `fallback`.
    pub fn or(&self, fallback: &Meals) -> Self {
        let mut meals = self.clone();
        for meal in Meal::iter() {
            if meals.get(meal).is_none() {
                meals.set(meal, fallback.get(meal).map(String::from));
            }
        }
        meals
    }

    fn set(&mut self, meal: Meal, value: Option<String>) {
        match meal {
            Meal::Breakfast => self.breakfast = value,
            Meal::Lunch => self.lunch = value,
            Meal::Snacks => self.snacks = value,
            Meal::Dinner => self.dinner = value,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// --- MenuCycle
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MenuCycle {
    #[serde(rename = "single-day")]
    SingleDay(Meals),

    #[serde(rename = "fourteen-day")]
    FourteenDay(FourteenDayCycle),

    #[serde(rename = "four-week", alias = "4-week")]
    FourWeek(FourWeekCycle),
}

impl Default for MenuCycle {
    fn default() -> Self {
        Self::SingleDay(Meals::default())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FourteenDayCycle {
    start_date: NaiveDate,
    days: [Meals; 14],
}

impl FourteenDayCycle {
    pub const LENGTH: usize = 14;

    pub fn new(start_date: NaiveDate, days: [Meals; 14]) -> Self {
        Self { start_date, days }
    }

    // Getters/Setters

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn days(&self) -> &[Meals; 14] {
        &self.days
    }
}

#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WeekVariant {
    Week13,
    Week24,
}

impl WeekVariant {
    /// Weeks 1 and 3 of the rotation (0 and 2 zero-based) share a menu, as do weeks 2 and 4.
    pub fn for_rotation(rotation: u32) -> Self {
        if rotation % 2 == 0 {
            Self::Week13
        } else {
            Self::Week24
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Week13 => "Week 1 & 3",
            Self::Week24 => "Week 2 & 4",
        }
    }
}

/// One week variant: a `common` menu plus per-day overrides.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WeekMenu {
    #[serde(default)]
    common: Meals,
    #[serde(default = "empty_days", deserialize_with = "complete_days")]
    days: FxHashMap<DayOfWeek, Meals>,
}

impl Default for WeekMenu {
    fn default() -> Self {
        Self {
            common: Meals::default(),
            days: empty_days(),
        }
    }
}

impl WeekMenu {
    pub fn new(common: Meals, mut days: FxHashMap<DayOfWeek, Meals>) -> Self {
        for day in DayOfWeek::iter() {
            days.entry(day).or_default();
        }
        Self { common, days }
    }

    // Getters/Setters

    pub fn common(&self) -> &Meals {
        &self.common
    }

    pub fn day(&self, day: DayOfWeek) -> &Meals {
        // Every weekday is filled at construction.
        &self.days[&day]
    }

    /// Override first, then common, then nothing.
    pub fn meal_for(&self, day: DayOfWeek, meal: Meal) -> Option<&str> {
        self.day(day).get(meal).or_else(|| self.common.get(meal))
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct WeekVariants {
    #[serde(default)]
    week13: WeekMenu,
    #[serde(default)]
    week24: WeekMenu,
}

impl WeekVariants {
    pub fn new(week13: WeekMenu, week24: WeekMenu) -> Self {
        Self { week13, week24 }
    }

    pub fn get(&self, variant: WeekVariant) -> &WeekMenu {
        match variant {
            WeekVariant::Week13 => &self.week13,
            WeekVariant::Week24 => &self.week24,
        }
    }

    fn get_mut(&mut self, variant: WeekVariant) -> &mut WeekMenu {
        match variant {
            WeekVariant::Week13 => &mut self.week13,
            WeekVariant::Week24 => &mut self.week24,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FourWeekCycle {
    start_date: NaiveDate,
    weeks: WeekVariants,
}

impl FourWeekCycle {
    pub fn new(start_date: NaiveDate, weeks: WeekVariants) -> Self {
        Self { start_date, weeks }
    }

    // Getters/Setters

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn week(&self, variant: WeekVariant) -> &WeekMenu {
        self.weeks.get(variant)
    }

    // Edits

    pub fn with_start_date(&self, start_date: NaiveDate) -> Self {
        Self {
            start_date,
            weeks: self.weeks.clone(),
        }
    }

    pub fn with_common(&self, variant: WeekVariant, meal: Meal, value: &str) -> Self {
        let mut cycle = self.clone();
        let week = cycle.weeks.get_mut(variant);
        week.common = week.common.with(meal, value);
        cycle
    }

    /// A blank value removes the override so the day inherits the common menu again.
    pub fn with_override(&self, variant: WeekVariant, day: DayOfWeek, meal: Meal, value: &str) -> Self {
        let mut cycle = self.clone();
        let meals = cycle.weeks.get_mut(variant).days.entry(day).or_default();
        *meals = meals.with(meal, value);
        cycle
    }

    pub fn with_common_applied_to_all_days(&self, variant: WeekVariant, meal: Meal) -> Self {
        let mut cycle = self.clone();
        let week = cycle.weeks.get_mut(variant);
        let common = week.common.get(meal).unwrap_or_default().to_string();
        for meals in week.days.values_mut() {
            *meals = meals.with(meal, &common);
        }
        cycle
    }
}

// ------------------------------------------------------------------------------------------------
// --- RouteDirection
// ------------------------------------------------------------------------------------------------

/// The two canonical campus directions.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
)]
pub enum RouteDirection {
    #[strum(to_string = "Nila → Sahyadri")]
    #[serde(rename = "Nila → Sahyadri")]
    NilaToSahyadri,

    #[strum(to_string = "Sahyadri → Nila")]
    #[serde(rename = "Sahyadri → Nila")]
    SahyadriToNila,
}

// ------------------------------------------------------------------------------------------------
// --- RouteTimes
// ------------------------------------------------------------------------------------------------

/// A named route with its departures in stored order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RouteTimes {
    route: String,
    #[serde(default)]
    times: Vec<String>,
}

impl RouteTimes {
    pub fn new(route: String, times: Vec<String>) -> Self {
        Self { route, times }
    }

    // Getters/Setters

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn times(&self) -> &[String] {
        &self.times
    }
}

// ------------------------------------------------------------------------------------------------
// --- RouteSet
// ------------------------------------------------------------------------------------------------

/// Time lists for both canonical directions. Both keys are always present.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RouteSet {
    #[serde(default = "empty_routes", deserialize_with = "complete_routes")]
    routes: FxHashMap<RouteDirection, Vec<String>>,
}

impl Default for RouteSet {
    fn default() -> Self {
        Self {
            routes: empty_routes(),
        }
    }
}

impl RouteSet {
    pub fn new(nila_to_sahyadri: Vec<String>, sahyadri_to_nila: Vec<String>) -> Self {
        let mut routes = FxHashMap::default();
        routes.insert(RouteDirection::NilaToSahyadri, nila_to_sahyadri);
        routes.insert(RouteDirection::SahyadriToNila, sahyadri_to_nila);
        Self { routes }
    }

    // Getters/Setters

    pub fn times(&self, direction: RouteDirection) -> &[String] {
        self.routes.get(&direction).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn with_times(&self, direction: RouteDirection, times: Vec<String>) -> Self {
        let mut set = self.clone();
        set.routes.insert(direction, times);
        set
    }

    /// Both directions in canonical order.
    pub fn to_route_times(&self) -> Vec<RouteTimes> {
        RouteDirection::iter()
            .map(|direction| RouteTimes::new(direction.to_string(), self.times(direction).to_vec()))
            .collect()
    }
}

// ------------------------------------------------------------------------------------------------
// --- BusWeek
// ------------------------------------------------------------------------------------------------

/// Seven consecutive days starting at `start_date`, each with both directions.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusWeek {
    start_date: NaiveDate,
    days: [RouteSet; 7],
}

impl BusWeek {
    pub const LENGTH: usize = 7;

    pub fn new(start_date: NaiveDate, days: [RouteSet; 7]) -> Self {
        Self { start_date, days }
    }

    // Getters/Setters

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn days(&self) -> &[RouteSet; 7] {
        &self.days
    }
}

// ------------------------------------------------------------------------------------------------
// --- SpecialLocation
// ------------------------------------------------------------------------------------------------

#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum SpecialLocation {
    #[strum(to_string = "Palakkad Town")]
    PalakkadTown,

    #[strum(to_string = "Wise Park Junction")]
    WisePark,
}

// ------------------------------------------------------------------------------------------------
// --- MultiCategorySchedule
// ------------------------------------------------------------------------------------------------

/// Route sets per bus category plus free-text notes per special location.
///
/// A category that never appeared in the source text is absent from `categories`; both special
/// locations are always present.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MultiCategorySchedule {
    #[serde(default)]
    categories: FxHashMap<BusCategory, RouteSet>,
    #[serde(default = "empty_specials", deserialize_with = "complete_specials")]
    specials: FxHashMap<SpecialLocation, Vec<String>>,
}

impl Default for MultiCategorySchedule {
    fn default() -> Self {
        Self {
            categories: FxHashMap::default(),
            specials: empty_specials(),
        }
    }
}

impl MultiCategorySchedule {
    pub fn new(
        categories: FxHashMap<BusCategory, RouteSet>,
        mut specials: FxHashMap<SpecialLocation, Vec<String>>,
    ) -> Self {
        for location in SpecialLocation::iter() {
            specials.entry(location).or_default();
        }
        Self {
            categories,
            specials,
        }
    }

    // Getters/Setters

    pub fn category(&self, category: BusCategory) -> Option<&RouteSet> {
        self.categories.get(&category)
    }

    pub fn specials(&self, location: SpecialLocation) -> &[String] {
        self.specials
            .get(&location)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    // Edits

    /// Adds a departure typed by hand. The list stays sorted and free of duplicates.
    pub fn with_time_added(
        &self,
        category: BusCategory,
        direction: RouteDirection,
        raw: &str,
    ) -> SResult<Self> {
        let time = normalize_time(raw).map_err(ScheduleError::InvalidTime)?;
        let mut times = self.times(category, direction);
        if !times.contains(&time) {
            times.push(time);
            times.sort();
        }
        Ok(self.with_route(category, direction, times))
    }

    pub fn with_time_removed(
        &self,
        category: BusCategory,
        direction: RouteDirection,
        time: &str,
    ) -> Self {
        let times = self
            .times(category, direction)
            .into_iter()
            .filter(|t| t != time)
            .collect();
        self.with_route(category, direction, times)
    }

    /// Replaces a whole list from a pasted batch. Tokens that are not times are dropped.
    pub fn with_times_replaced(
        &self,
        category: BusCategory,
        direction: RouteDirection,
        text: &str,
    ) -> Self {
        let mut times: Vec<String> = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter_map(|token| normalize_time(token).ok())
            .collect();
        times.sort();
        times.dedup();
        self.with_route(category, direction, times)
    }

    pub fn with_special_added(&self, location: SpecialLocation, text: &str) -> Self {
        let mut schedule = self.clone();
        let text = text.trim();
        if !text.is_empty() {
            schedule
                .specials
                .entry(location)
                .or_default()
                .push(text.to_string());
        }
        schedule
    }

    pub fn with_special_removed(&self, location: SpecialLocation, index: usize) -> Self {
        let mut schedule = self.clone();
        let entries = schedule.specials.entry(location).or_default();
        if index < entries.len() {
            entries.remove(index);
        }
        schedule
    }

    fn times(&self, category: BusCategory, direction: RouteDirection) -> Vec<String> {
        self.category(category)
            .map(|set| set.times(direction).to_vec())
            .unwrap_or_default()
    }

    fn with_route(
        &self,
        category: BusCategory,
        direction: RouteDirection,
        times: Vec<String>,
    ) -> Self {
        let mut schedule = self.clone();
        let set = schedule.categories.entry(category).or_default();
        *set = set.with_times(direction, times);
        schedule
    }
}

// ------------------------------------------------------------------------------------------------
// --- BusSchedule
// ------------------------------------------------------------------------------------------------

/// What a single bus parser produced.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BusSchedule {
    Simple(Vec<RouteTimes>),
    Week(BusWeek),
    MultiCategory(MultiCategorySchedule),
}

// ------------------------------------------------------------------------------------------------
// --- Buses
// ------------------------------------------------------------------------------------------------

/// Every bus shape a record can hold. `routes` is the legacy fallback used when neither the
/// multi-category schedule nor the bus week applies.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Buses {
    #[serde(default)]
    routes: Vec<RouteTimes>,
    #[serde(default)]
    week: Option<BusWeek>,
    #[serde(default)]
    multi: Option<MultiCategorySchedule>,
}

impl Buses {
    pub fn new(
        routes: Vec<RouteTimes>,
        week: Option<BusWeek>,
        multi: Option<MultiCategorySchedule>,
    ) -> Self {
        Self {
            routes,
            week,
            multi,
        }
    }

    // Getters/Setters

    pub fn routes(&self) -> &[RouteTimes] {
        &self.routes
    }

    pub fn week(&self) -> Option<&BusWeek> {
        self.week.as_ref()
    }

    pub fn multi(&self) -> Option<&MultiCategorySchedule> {
        self.multi.as_ref()
    }

    /// Stores `schedule` in its slot, leaving the other shapes untouched.
    pub fn with_schedule(&self, schedule: BusSchedule) -> Self {
        let mut buses = self.clone();
        match schedule {
            BusSchedule::Simple(routes) => buses.routes = routes,
            BusSchedule::Week(week) => buses.week = Some(week),
            BusSchedule::MultiCategory(multi) => buses.multi = Some(multi),
        }
        buses
    }
}

// ------------------------------------------------------------------------------------------------
// --- Preferences
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    hide_past_times: bool,
    countdown: bool,
    holiday_override: CategoryOverride,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            hide_past_times: true,
            countdown: true,
            holiday_override: CategoryOverride::Auto,
        }
    }
}

impl Preferences {
    pub fn new(hide_past_times: bool, countdown: bool, holiday_override: CategoryOverride) -> Self {
        Self {
            hide_past_times,
            countdown,
            holiday_override,
        }
    }

    // Getters/Setters

    pub fn hide_past_times(&self) -> bool {
        self.hide_past_times
    }

    pub fn countdown(&self) -> bool {
        self.countdown
    }

    pub fn holiday_override(&self) -> CategoryOverride {
        self.holiday_override
    }
}

// ------------------------------------------------------------------------------------------------
// --- ScheduleRecord
// ------------------------------------------------------------------------------------------------

/// The whole stored state: a menu cycle, the bus shapes and the display preferences.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    menu: MenuCycle,
    buses: Buses,
    #[serde(default)]
    preferences: Preferences,
}

impl ScheduleRecord {
    pub fn new(menu: MenuCycle, buses: Buses, preferences: Preferences) -> Self {
        Self {
            menu,
            buses,
            preferences,
        }
    }

    // Getters/Setters

    pub fn menu(&self) -> &MenuCycle {
        &self.menu
    }

    pub fn buses(&self) -> &Buses {
        &self.buses
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn with_menu(&self, menu: MenuCycle) -> Self {
        Self {
            menu,
            ..self.clone()
        }
    }

    pub fn with_buses(&self, buses: Buses) -> Self {
        Self {
            buses,
            ..self.clone()
        }
    }

    pub fn with_preferences(&self, preferences: Preferences) -> Self {
        Self {
            preferences,
            ..self.clone()
        }
    }

    /// The blob handed to the persistence layer.
    pub fn to_json(&self) -> SResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(blob: &str) -> SResult<Self> {
        Ok(serde_json::from_str(blob)?)
    }
}

// ------------------------------------------------------------------------------------------------
// --- Serde helpers
// ------------------------------------------------------------------------------------------------

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

mod blank_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or_default())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.as_deref().and_then(super::non_blank))
    }
}

fn empty_days() -> FxHashMap<DayOfWeek, Meals> {
    DayOfWeek::iter().map(|day| (day, Meals::default())).collect()
}

fn complete_days<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<FxHashMap<DayOfWeek, Meals>, D::Error> {
    let mut days = FxHashMap::<DayOfWeek, Meals>::deserialize(deserializer)?;
    for day in DayOfWeek::iter() {
        days.entry(day).or_default();
    }
    Ok(days)
}

fn empty_routes() -> FxHashMap<RouteDirection, Vec<String>> {
    RouteDirection::iter().map(|direction| (direction, Vec::new())).collect()
}

fn complete_routes<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<FxHashMap<RouteDirection, Vec<String>>, D::Error> {
    let mut routes = FxHashMap::<RouteDirection, Vec<String>>::deserialize(deserializer)?;
    for direction in RouteDirection::iter() {
        routes.entry(direction).or_default();
    }
    Ok(routes)
}

fn empty_specials() -> FxHashMap<SpecialLocation, Vec<String>> {
    SpecialLocation::iter().map(|location| (location, Vec::new())).collect()
}

fn complete_specials<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<FxHashMap<SpecialLocation, Vec<String>>, D::Error> {
    let mut specials = FxHashMap::<SpecialLocation, Vec<String>>::deserialize(deserializer)?;
    for location in SpecialLocation::iter() {
        specials.entry(location).or_default();
    }
    Ok(specials)
}
