mod bus_week_parser;
pub(crate) mod error;
mod four_week_menu_parser;
pub(crate) mod helpers;
mod menu_cycle_parser;
mod multi_category_bus_parser;
mod single_day_parser;
mod time_parser;

pub use bus_week_parser::parse as load_bus_week;
pub use four_week_menu_parser::parse as load_four_week_menu;
pub use menu_cycle_parser::parse as load_menu_cycle;
pub use multi_category_bus_parser::has_category_headings;
pub use multi_category_bus_parser::parse as load_multi_category_buses;
pub use single_day_parser::parse_meals as load_single_day_meals;
pub use single_day_parser::parse_routes as load_simple_routes;
pub use time_parser::{normalize_time, parse_time_list, parse_time_token};

#[cfg(test)]
pub(crate) mod tests {
    use std::error::Error;

    use serde::{Deserialize, Serialize};

    pub(crate) fn get_json_values<F>(
        lhs: &F,
        rhs: &str,
    ) -> Result<(serde_json::Value, serde_json::Value), Box<dyn Error>>
    where
        for<'a> F: Serialize + Deserialize<'a>,
    {
        let serialized = serde_json::to_string(&lhs)?;
        println!("{serialized:#?}");
        let reference = serde_json::to_string(&serde_json::from_str::<F>(rhs)?)?;
        Ok((
            serialized.parse::<serde_json::Value>()?,
            reference.parse::<serde_json::Value>()?,
        ))
    }
}
