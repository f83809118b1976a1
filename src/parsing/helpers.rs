// Primitive parsers shared by the line grammars, and the START/END block locator.
use std::str::FromStr;

use chrono::NaiveDate;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while_m_n},
    character::complete::{alpha1, char, space0},
    combinator::{map_opt, map_res, opt, rest, value},
    sequence::preceded,
};

use crate::{
    error::{SResult, ScheduleError},
    models::{BlockKind, DayOfWeek, Meal, RouteDirection, WeekVariant},
};

pub(crate) fn meal_parser(input: &str) -> IResult<&str, Meal> {
    map_res(alpha1, Meal::from_str).parse(input)
}

pub(crate) fn weekday_parser(input: &str) -> IResult<&str, DayOfWeek> {
    map_res(alpha1, DayOfWeek::from_str).parse(input)
}

pub(crate) fn weekday_abbreviation_parser(input: &str) -> IResult<&str, DayOfWeek> {
    map_opt(alpha1, DayOfWeek::from_abbreviation).parse(input)
}

pub(crate) fn week_variant_parser(input: &str) -> IResult<&str, WeekVariant> {
    alt((
        value(WeekVariant::Week13, tag_no_case("week13")),
        value(WeekVariant::Week24, tag_no_case("week24")),
    ))
    .parse(input)
}

fn route_separator_parser(input: &str) -> IResult<&str, &str> {
    alt((tag("→"), tag("->"), tag_no_case("to"))).parse(input)
}

fn route_between<'a>(
    from: &'static str,
    to: &'static str,
) -> impl Parser<&'a str, Output = (), Error = nom::error::Error<&'a str>> {
    value(
        (),
        (
            tag_no_case(from),
            space0,
            opt(route_separator_parser),
            space0,
            tag_no_case(to),
        ),
    )
}

/// `Nila → Sahyadri` or `Sahyadri → Nila`, with `→`, `->`, `to` or nothing in between.
pub(crate) fn route_direction_parser(input: &str) -> IResult<&str, RouteDirection> {
    alt((
        value(
            RouteDirection::NilaToSahyadri,
            route_between("nila", "sahyadri"),
        ),
        value(
            RouteDirection::SahyadriToNila,
            route_between("sahyadri", "nila"),
        ),
    ))
    .parse(input)
}

/// `: value` up to the end of the line. The value must not be blank.
pub(crate) fn entry_value_parser(input: &str) -> IResult<&str, String> {
    preceded(
        (space0, char(':'), space0),
        map_opt(rest, |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        }),
    )
    .parse(input)
}

fn u32_from_n_digits_parser(n_digits: usize) -> impl FnMut(&str) -> IResult<&str, u32> {
    move |input: &str| {
        map_res(
            take_while_m_n(n_digits, n_digits, |c: char| c.is_ascii_digit()),
            |digits: &str| digits.parse::<u32>(),
        )
        .parse(input)
    }
}

fn iso_date_combinator(input: &str) -> IResult<&str, (i32, u32, u32)> {
    (
        map_res(u32_from_n_digits_parser(4), i32::try_from),
        preceded(char('-'), u32_from_n_digits_parser(2)),
        preceded(char('-'), u32_from_n_digits_parser(2)),
    )
        .parse(input)
}

// ------------------------------------------------------------------------------------------------
// --- Blocks
// ------------------------------------------------------------------------------------------------

/// The lines strictly between a START and an END marker, plus the START line itself.
#[derive(Debug)]
pub(crate) struct Block<'a> {
    pub header: &'a str,
    pub lines: Vec<&'a str>,
}

pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).collect()
}

pub(crate) fn contains_marker(line: &str, marker: &str) -> bool {
    line.to_ascii_uppercase().contains(marker)
}

fn find_marker(lines: &[&str], marker: &str) -> Option<usize> {
    lines.iter().position(|line| contains_marker(line, marker))
}

pub(crate) fn locate_block<'a>(lines: &[&'a str], kind: BlockKind) -> SResult<Block<'a>> {
    let malformed = |reason| ScheduleError::MalformedBlock {
        block: kind,
        reason,
    };
    let start = find_marker(lines, &kind.start_marker()).ok_or(malformed("START marker missing"))?;
    let end = find_marker(lines, &kind.end_marker()).ok_or(malformed("END marker missing"))?;
    if end <= start {
        return Err(malformed("END marker does not follow START marker"));
    }
    Ok(Block {
        header: lines[start],
        lines: lines[start + 1..end]
            .iter()
            .copied()
            .filter(|line| !line.is_empty())
            .collect(),
    })
}

/// Reads the `YYYY-MM-DD` that follows the START marker of `kind`.
pub(crate) fn block_start_date(header: &str, kind: BlockKind) -> SResult<NaiveDate> {
    let marker = kind.start_marker();
    // ASCII upper-casing keeps byte offsets, so the index is valid in `header` too.
    let after_marker = header
        .to_ascii_uppercase()
        .find(&marker)
        .map_or(header, |index| &header[index + marker.len()..]);
    let candidate = after_marker.trim_start().trim_start_matches(':').trim_start();

    let (_, (year, month, day)) = iso_date_combinator(candidate)
        .map_err(|_| ScheduleError::MissingStartDate { block: kind })?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| ScheduleError::InvalidStartDate {
        block: kind,
        value: format!("{year:04}-{month:02}-{day:02}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn route_directions() {
        let cases = [
            ("Nila → Sahyadri", RouteDirection::NilaToSahyadri),
            ("nila->sahyadri", RouteDirection::NilaToSahyadri),
            ("NILA TO SAHYADRI", RouteDirection::NilaToSahyadri),
            ("Nila Sahyadri", RouteDirection::NilaToSahyadri),
            ("Sahyadri→Nila", RouteDirection::SahyadriToNila),
            ("sahyadri to nila", RouteDirection::SahyadriToNila),
        ];
        for (input, expected) in cases {
            let (_, direction) = route_direction_parser(input).unwrap();
            assert_eq!(direction, expected, "input {input:?}");
        }
        assert!(route_direction_parser("Nila → Town").is_err());
    }

    #[test]
    fn entry_values() {
        assert_eq!(
            entry_value_parser(" : Idly, Vada ").unwrap().1,
            "Idly, Vada"
        );
        assert!(entry_value_parser(":   ").is_err());
        assert!(entry_value_parser("Idly").is_err());
    }

    #[test]
    fn block_location() {
        let lines = split_lines("intro\nSTART BUS WEEK: 2025-10-06\n\nMon x\nend bus week\n");
        let block = locate_block(&lines, BlockKind::BusWeek).unwrap();
        assert_eq!(block.header, "START BUS WEEK: 2025-10-06");
        assert_eq!(block.lines, ["Mon x"]);
        assert_eq!(
            block_start_date(block.header, BlockKind::BusWeek).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 6).unwrap()
        );
    }

    #[test]
    fn block_errors() {
        let lines = split_lines("START MENU CYCLE: 2025-10-06\nDay1 Lunch: Rice");
        let err = locate_block(&lines, BlockKind::MenuCycle).unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedBlock { .. }));

        let lines = split_lines("END MENU CYCLE\nSTART MENU CYCLE: 2025-10-06");
        let err = locate_block(&lines, BlockKind::MenuCycle).unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedBlock { .. }));

        let err = block_start_date("START MENU CYCLE:", BlockKind::MenuCycle).unwrap_err();
        assert!(matches!(err, ScheduleError::MissingStartDate { .. }));

        let err =
            block_start_date("START MENU CYCLE: 2025-02-30", BlockKind::MenuCycle).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidStartDate { .. }));
    }
}
