/// # 7-day bus week parsing
///
/// One line per day and direction: `<Mon..Sun> <Route>: <time, time, ...>`. The route is one of
/// the two canonical directions, written with `→`, `->`, `to` or nothing between the stop
/// names. Time tokens that do not parse are dropped; a day/direction pair that never appears
/// keeps an empty list.
///
/// ## Example
///
/// `
/// START BUS WEEK: 2025-10-06
/// Mon Nila → Sahyadri: 08:00,09:00,10:00
/// Mon Sahyadri → Nila: 08:15,09:15,10:15
/// Sun Sahyadri to Nila: 10:15
/// END BUS WEEK
/// `
use nom::{IResult, Parser, character::complete::space1, combinator::map};

use crate::{
    error::SResult,
    models::{BlockKind, BusWeek, DayOfWeek, RouteDirection, RouteSet},
    parsing::{
        helpers::{
            block_start_date, entry_value_parser, locate_block, route_direction_parser,
            weekday_abbreviation_parser,
        },
        time_parser::parse_time_list,
    },
};

fn row_combinator(input: &str) -> IResult<&str, (DayOfWeek, RouteDirection, String)> {
    map(
        (
            weekday_abbreviation_parser,
            space1,
            route_direction_parser,
            entry_value_parser,
        ),
        |(day, _, direction, times)| (day, direction, times),
    )
    .parse(input)
}

pub fn parse(lines: &[&str]) -> SResult<BusWeek> {
    log::info!("Parsing {}...", BlockKind::BusWeek);
    let block = locate_block(lines, BlockKind::BusWeek)?;
    let start_date = block_start_date(block.header, BlockKind::BusWeek)?;

    let mut days: [RouteSet; BusWeek::LENGTH] = Default::default();
    for line in block.lines {
        match row_combinator(line) {
            Ok((_, (day, direction, times))) => {
                let index = day.index();
                days[index] = days[index].with_times(direction, parse_time_list(&times));
            }
            Err(e) => log::debug!("Skipping line {line:?}: {e}"),
        }
    }

    Ok(BusWeek::new(start_date, days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::helpers::split_lines;
    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn row_parser() {
        let (_, (day, direction, times)) =
            row_combinator("Mon Nila → Sahyadri: 08:00,09:00,10:00").unwrap();
        assert_eq!(day, DayOfWeek::Monday);
        assert_eq!(direction, RouteDirection::NilaToSahyadri);
        assert_eq!(times, "08:00,09:00,10:00");

        let (_, (day, direction, _)) = row_combinator("sun sahyadri TO nila : 9").unwrap();
        assert_eq!(day, DayOfWeek::Sunday);
        assert_eq!(direction, RouteDirection::SahyadriToNila);

        assert!(row_combinator("Monday Nila → Sahyadri: 08:00").is_err());
        assert!(row_combinator("Mon Nila → Town: 08:00").is_err());
    }

    #[test]
    fn block_parser() {
        let text = "
            START BUS WEEK: 2025-10-06
            Mon Nila → Sahyadri: 08:00,09:00,10:00
            Mon Sahyadri→Nila: 8:15, 9.15 bogus 10:15
            Sat Nila to Sahyadri: 11
            Xyz Nila → Sahyadri: 07:00
            END BUS WEEK
        ";
        let week = parse(&split_lines(text)).unwrap();
        let monday = &week.days()[0];
        assert_eq!(
            monday.times(RouteDirection::NilaToSahyadri),
            ["08:00", "09:00", "10:00"]
        );
        assert_eq!(
            monday.times(RouteDirection::SahyadriToNila),
            ["08:15", "09:15", "10:15"]
        );
        assert_eq!(
            week.days()[5].times(RouteDirection::NilaToSahyadri),
            ["11:00"]
        );
        assert!(week.days()[6].times(RouteDirection::NilaToSahyadri).is_empty());
        assert!(week.days()[6].times(RouteDirection::SahyadriToNila).is_empty());
    }
}
