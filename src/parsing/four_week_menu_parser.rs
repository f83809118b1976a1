/// # 4-week menu parsing
///
/// A four-week menu rotates two week variants: `week13` serves weeks 1 and 3 of the rotation,
/// `week24` weeks 2 and 4. Each variant has a `COMMON` menu and optional per-day overrides.
///
/// ## Grammar (one entry per line, case-insensitive)
///
/// * `COMMON <week13|week24> <Meal>: <text>`
/// * `<Weekday> <week13|week24> <Meal>: <text>`
///
/// Lines that match neither form are skipped.
///
/// ## Example
///
/// `
/// START 4-WEEK MENU: 2025-10-06
/// COMMON week13 Breakfast: bread, butter, jam, milk, tea, coffee
/// COMMON week24 Breakfast: bread, butter
/// MONDAY week13 Breakfast: Aloo Paratha, Curd
/// TUESDAY week24 Lunch: Lemon Rice, Rasam
/// END 4-WEEK MENU
/// `
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::space1,
    combinator::{map, value},
};
use rustc_hash::FxHashMap;

use crate::{
    error::SResult,
    models::{BlockKind, DayOfWeek, FourWeekCycle, Meal, Meals, WeekMenu, WeekVariant, WeekVariants},
    parsing::helpers::{
        block_start_date, entry_value_parser, locate_block, meal_parser, week_variant_parser,
        weekday_parser,
    },
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Scope {
    Common,
    Day(DayOfWeek),
}

#[derive(Debug, Eq, PartialEq)]
struct FourWeekRow {
    scope: Scope,
    variant: WeekVariant,
    meal: Meal,
    value: String,
}

fn scope_parser(input: &str) -> IResult<&str, Scope> {
    alt((
        value(Scope::Common, tag_no_case("COMMON")),
        map(weekday_parser, Scope::Day),
    ))
    .parse(input)
}

fn row_combinator(input: &str) -> IResult<&str, FourWeekRow> {
    map(
        (
            scope_parser,
            space1,
            week_variant_parser,
            space1,
            meal_parser,
            entry_value_parser,
        ),
        |(scope, _, variant, _, meal, value)| FourWeekRow {
            scope,
            variant,
            meal,
            value,
        },
    )
    .parse(input)
}

#[derive(Default)]
struct WeekBuilder {
    common: Meals,
    days: FxHashMap<DayOfWeek, Meals>,
}

impl WeekBuilder {
    fn apply(&mut self, scope: Scope, meal: Meal, value: &str) {
        let meals = match scope {
            Scope::Common => &mut self.common,
            Scope::Day(day) => self.days.entry(day).or_default(),
        };
        *meals = meals.with(meal, value);
    }

    fn build(self) -> WeekMenu {
        WeekMenu::new(self.common, self.days)
    }
}

pub fn parse(lines: &[&str]) -> SResult<FourWeekCycle> {
    log::info!("Parsing {}...", BlockKind::FourWeekMenu);
    let block = locate_block(lines, BlockKind::FourWeekMenu)?;
    let start_date = block_start_date(block.header, BlockKind::FourWeekMenu)?;

    let mut week13 = WeekBuilder::default();
    let mut week24 = WeekBuilder::default();
    for line in block.lines {
        match row_combinator(line) {
            Ok((_, row)) => {
                let week = match row.variant {
                    WeekVariant::Week13 => &mut week13,
                    WeekVariant::Week24 => &mut week24,
                };
                week.apply(row.scope, row.meal, &row.value);
            }
            Err(e) => log::debug!("Skipping line {line:?}: {e}"),
        }
    }

    Ok(FourWeekCycle::new(
        start_date,
        WeekVariants::new(week13.build(), week24.build()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ScheduleError, parsing::helpers::split_lines, parsing::tests::get_json_values};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn row_parser() {
        let (_, row) = row_combinator("COMMON week13 Breakfast: bread, butter, jam").unwrap();
        assert_eq!(
            row,
            FourWeekRow {
                scope: Scope::Common,
                variant: WeekVariant::Week13,
                meal: Meal::Breakfast,
                value: "bread, butter, jam".to_string(),
            }
        );

        let (_, row) = row_combinator("tuesday WEEK24 lunch : Lemon Rice, Rasam").unwrap();
        assert_eq!(row.scope, Scope::Day(DayOfWeek::Tuesday));
        assert_eq!(row.variant, WeekVariant::Week24);
        assert_eq!(row.meal, Meal::Lunch);
        assert_eq!(row.value, "Lemon Rice, Rasam");

        assert!(row_combinator("MON week13 Lunch: Rice").is_err());
        assert!(row_combinator("MONDAY week5 Lunch: Rice").is_err());
        assert!(row_combinator("MONDAY week13 Brunch: Rice").is_err());
        assert!(row_combinator("MONDAY week13 Lunch:").is_err());
    }

    #[test]
    fn block_parser() {
        let text = "
            START 4-WEEK MENU: 2025-10-06
            COMMON week13 Breakfast: bread, butter, jam
            COMMON week24 Dinner: Chapati
            MONDAY week13 Breakfast: Aloo Paratha, Curd
            this line is noise
            SUNDAY week24 Dinner: Biryani
            END 4-WEEK MENU
        ";
        let cycle = parse(&split_lines(text)).unwrap();
        assert_eq!(
            cycle.start_date(),
            NaiveDate::from_ymd_opt(2025, 10, 6).unwrap()
        );
        let week13 = cycle.week(WeekVariant::Week13);
        assert_eq!(
            week13.meal_for(DayOfWeek::Monday, Meal::Breakfast),
            Some("Aloo Paratha, Curd")
        );
        assert_eq!(
            week13.meal_for(DayOfWeek::Tuesday, Meal::Breakfast),
            Some("bread, butter, jam")
        );
        let week24 = cycle.week(WeekVariant::Week24);
        assert_eq!(week24.meal_for(DayOfWeek::Sunday, Meal::Dinner), Some("Biryani"));
        assert_eq!(week24.meal_for(DayOfWeek::Monday, Meal::Dinner), Some("Chapati"));
        assert_eq!(week24.meal_for(DayOfWeek::Monday, Meal::Lunch), None);
    }

    #[test]
    fn serialized_shape() {
        let text = "START 4-WEEK MENU: 2025-10-06\nMONDAY week13 Lunch: Rice\nEND 4-WEEK MENU";
        let cycle = parse(&split_lines(text)).unwrap();
        let week = cycle.week(WeekVariant::Week13);
        let reference = r#"
            {
                "common": { "breakfast": "", "lunch": "", "snacks": "", "dinner": "" },
                "days": {
                    "monday": { "breakfast": "", "lunch": "Rice", "snacks": "", "dinner": "" },
                    "tuesday": { "breakfast": "", "lunch": "", "snacks": "", "dinner": "" },
                    "wednesday": { "breakfast": "", "lunch": "", "snacks": "", "dinner": "" },
                    "thursday": { "breakfast": "", "lunch": "", "snacks": "", "dinner": "" },
                    "friday": { "breakfast": "", "lunch": "", "snacks": "", "dinner": "" },
                    "saturday": { "breakfast": "", "lunch": "", "snacks": "", "dinner": "" },
                    "sunday": { "breakfast": "", "lunch": "", "snacks": "", "dinner": "" }
                }
            }"#;
        let (week, reference) = get_json_values(week, reference).unwrap();
        assert_eq!(week, reference);
    }

    #[test]
    fn missing_date() {
        let text = "START 4-WEEK MENU\nMONDAY week13 Lunch: Rice\nEND 4-WEEK MENU";
        let err = parse(&split_lines(text)).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::MissingStartDate {
                block: BlockKind::FourWeekMenu
            }
        ));
    }
}
