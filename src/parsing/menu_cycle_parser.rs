/// # 14-day menu cycle parsing
///
/// `Day<N> <Meal>: <text>` lines, N from 1 to 14. Entries outside that range and lines that do
/// not follow the grammar are skipped; meals never mentioned stay empty.
///
/// ## Example
///
/// `
/// START MENU CYCLE: 2025-10-06
/// Day1 Breakfast: Idly, Vada
/// Day1 Lunch: Rice, Dal
/// Day14 Dinner: Chapati, Kurma
/// END MENU CYCLE
/// `
use nom::{
    IResult, Parser,
    bytes::complete::tag_no_case,
    character::complete::{digit1, space0, space1},
    combinator::{map, map_res},
};

use crate::{
    error::SResult,
    models::{BlockKind, FourteenDayCycle, Meal, Meals},
    parsing::helpers::{block_start_date, entry_value_parser, locate_block, meal_parser},
};

fn row_combinator(input: &str) -> IResult<&str, (usize, Meal, String)> {
    map(
        (
            tag_no_case("Day"),
            space0,
            map_res(digit1, |n: &str| n.parse::<usize>()),
            space1,
            meal_parser,
            entry_value_parser,
        ),
        |(_, _, day, _, meal, value)| (day, meal, value),
    )
    .parse(input)
}

pub fn parse(lines: &[&str]) -> SResult<FourteenDayCycle> {
    log::info!("Parsing {}...", BlockKind::MenuCycle);
    let block = locate_block(lines, BlockKind::MenuCycle)?;
    let start_date = block_start_date(block.header, BlockKind::MenuCycle)?;

    let mut days: [Meals; FourteenDayCycle::LENGTH] = Default::default();
    for line in block.lines {
        match row_combinator(line) {
            Ok((_, (day @ 1..=FourteenDayCycle::LENGTH, meal, value))) => {
                days[day - 1] = days[day - 1].with(meal, &value);
            }
            Ok((_, (day, ..))) => log::debug!("Skipping day {day} outside the cycle: {line:?}"),
            Err(e) => log::debug!("Skipping line {line:?}: {e}"),
        }
    }

    Ok(FourteenDayCycle::new(start_date, days))
}
