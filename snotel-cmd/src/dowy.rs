//! Water year lookup for a single date.

use chrono::NaiveDate;
use snotel_core::water_year::{day_of_water_year, days_in_water_year, water_year_for_date};

pub fn describe(date: NaiveDate) -> String {
    let water_year = water_year_for_date(date);
    format!(
        "{}: water year {}, day {} of {}",
        date,
        water_year,
        day_of_water_year(date),
        days_in_water_year(water_year)
    )
}

pub fn run_dowy(date: NaiveDate) {
    println!("{}", describe(date));
}
