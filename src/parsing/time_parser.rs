/// # Time token parsing
///
/// Turns one pasted time token into a canonical `HH:MM` value. The accepted forms are:
///
/// * `H:MM` / `HH:MM` on a 24-hour clock (`.` is accepted in place of `:`)
/// * the same followed by `am` / `pm`, with or without a space, in any letter case
/// * a lone hour, optionally followed by `am` / `pm`, read as `H:00`
///
/// `12 am` is `00:00` and `12 pm` is `12:00`. Nothing beyond the token itself is used: a
/// token without am/pm keeps its face value and the half-day is inferred later from the
/// surrounding list.
///
/// ## Examples
///
/// `
/// 8:30      -> 08:30
/// 8.45      -> 08:45
/// 12        -> 12:00
/// 1:30 PM   -> 13:30
/// 12am      -> 00:00
/// `
use chrono::NaiveTime;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag_no_case, take_while_m_n},
    character::complete::{one_of, space0},
    combinator::{all_consuming, map_res, opt, value},
    sequence::preceded,
};

use crate::{
    parsing::error::{PResult, ParsingError},
    utils::create_time,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Meridiem {
    Am,
    Pm,
}

fn number_parser(min_digits: usize, max_digits: usize) -> impl FnMut(&str) -> IResult<&str, u32> {
    move |input: &str| {
        map_res(
            take_while_m_n(min_digits, max_digits, |c: char| c.is_ascii_digit()),
            |digits: &str| digits.parse::<u32>(),
        )
        .parse(input)
    }
}

fn meridiem_parser(input: &str) -> IResult<&str, Meridiem> {
    alt((
        value(Meridiem::Am, tag_no_case("am")),
        value(Meridiem::Pm, tag_no_case("pm")),
    ))
    .parse(input)
}

fn time_token_combinator(input: &str) -> IResult<&str, (u32, Option<u32>, Option<Meridiem>)> {
    (
        number_parser(1, 2),
        opt(preceded(one_of(":."), number_parser(2, 2))),
        opt(preceded(space0, meridiem_parser)),
    )
        .parse(input)
}

fn to_24_hour(hour: u32, meridiem: Option<Meridiem>) -> Option<u32> {
    match meridiem {
        None if hour <= 23 => Some(hour),
        Some(meridiem) if (1..=12).contains(&hour) => Some(match meridiem {
            Meridiem::Am => hour % 12,
            Meridiem::Pm => hour % 12 + 12,
        }),
        _ => None,
    }
}

/// Parses a single token into a time of day.
pub fn parse_time_token(token: &str) -> PResult<NaiveTime> {
    let token = token.trim();
    let unparseable = || ParsingError::UnparseableTimeToken(token.to_string());

    let (_, (hour, minute, meridiem)) = all_consuming(time_token_combinator)
        .parse(token)
        .map_err(|_| unparseable())?;
    let hour = to_24_hour(hour, meridiem).ok_or_else(unparseable)?;
    create_time(hour, minute.unwrap_or(0)).map_err(|_| unparseable())
}

/// Canonical `HH:MM` form of a token, or `UnparseableTimeToken`.
pub fn normalize_time(token: &str) -> PResult<String> {
    Ok(parse_time_token(token)?.format("%H:%M").to_string())
}

/// Normalizes every token of a comma/whitespace separated list, dropping the ones that are not
/// times. A detached `am`/`pm` belongs to the token before it.
pub fn parse_time_list(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
    {
        let is_meridiem = token.eq_ignore_ascii_case("am") || token.eq_ignore_ascii_case("pm");
        match tokens.last_mut() {
            Some(last) if is_meridiem => last.push_str(token),
            _ => tokens.push(token.to_string()),
        }
    }

    tokens
        .iter()
        .filter_map(|token| match normalize_time(token) {
            Ok(time) => Some(time),
            Err(e) => {
                log::debug!("Dropping token: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn accepted_forms() {
        let cases = [
            ("8:30", "08:30"),
            ("08:30", "08:30"),
            ("23:59", "23:59"),
            ("0:05", "00:05"),
            ("8.45", "08:45"),
            ("9", "09:00"),
            ("17", "17:00"),
            ("1:30 PM", "13:30"),
            ("1:30pm", "13:30"),
            ("11:05 Am", "11:05"),
            ("12 am", "00:00"),
            ("12:40am", "00:40"),
            ("12 pm", "12:00"),
            ("9pm", "21:00"),
            ("  7:15  ", "07:15"),
        ];
        for (token, expected) in cases {
            assert_eq!(normalize_time(token).unwrap(), expected, "token {token:?}");
        }
    }

    #[test]
    fn rejected_forms() {
        let cases = [
            "", "24:00", "7:60", "13 pm", "0 am", "13:00pm", "123", "8:5", "8:300", "noon",
            "8:30 xm", "-1", "8:30,",
        ];
        for token in cases {
            let err = normalize_time(token).unwrap_err();
            assert!(
                matches!(err, ParsingError::UnparseableTimeToken(_)),
                "token {token:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn time_lists() {
        assert_eq!(
            parse_time_list("08:00,09:00, 10:00  11"),
            ["08:00", "09:00", "10:00", "11:00"]
        );
        assert_eq!(
            parse_time_list("8:00 PM, 9:15 pm,later, 25:00"),
            ["20:00", "21:15"]
        );
        assert!(parse_time_list(" , ").is_empty());
    }

    #[test]
    fn normalizing_is_idempotent() {
        for token in ["9", "8.45", "1:30 PM", "12 am", "23:59", "12:15"] {
            let once = normalize_time(token).unwrap();
            assert_eq!(normalize_time(&once).unwrap(), once);
        }
    }
}
