use std::{env, error::Error, fs, str::FromStr};

use campus_schedule::{CategoryOverride, Dashboard, ScheduleRecord, parse_all};
use chrono::{Local, NaiveDateTime};
use log::LevelFilter;
use simple_logger::SimpleLogger;

const USAGE: &str =
    "usage: campus-schedule <paste.txt> [YYYY-MM-DDTHH:MM] [auto|working|saturday|sunday]";

fn main() -> Result<(), Box<dyn Error>> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()?;

    let mut args = env::args().skip(1);
    let path = args.next().ok_or(USAGE)?;
    let at = match args.next() {
        Some(value) => NaiveDateTime::parse_from_str(&value, "%Y-%m-%dT%H:%M")?,
        None => Local::now().naive_local(),
    };
    let manual_override = match args.next() {
        Some(value) => CategoryOverride::from_str(&value)?,
        None => CategoryOverride::Auto,
    };

    let text = fs::read_to_string(&path)?;
    let outcome = parse_all(&text, &ScheduleRecord::default())?;
    log::info!(
        "Recognised: {}",
        outcome
            .formats()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    if !outcome.failures().is_empty() {
        log::warn!("{} block(s) could not be parsed", outcome.failures().len());
    }

    let dashboard = Dashboard::resolve(outcome.record(), at, manual_override);
    println!("{}", dashboard.to_json()?);
    Ok(())
}
