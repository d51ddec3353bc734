#![allow(dead_code)]

use autotrends::record::{MANUFACTURER, MODEL_YEAR, REAL_WORLD_MPG, VEHICLE_TYPE};
use autotrends::FieldMap;

/// builds a field map from (name, value) pairs
pub fn row(pairs: &[(&str, &str)]) -> FieldMap {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// a complete vehicle row
pub fn vehicle(manufacturer: &str, year: &str, vehicle_type: &str, mpg: &str) -> FieldMap {
    row(&[
        (MANUFACTURER, manufacturer),
        (MODEL_YEAR, year),
        (VEHICLE_TYPE, vehicle_type),
        (REAL_WORLD_MPG, mpg),
    ])
}

/// the Ford / Honda / Toyota rows used across the tests
pub fn scenario_rows() -> Vec<FieldMap> {
    vec![
        vehicle("Ford", "2021", "Truck", "-"),
        vehicle("Honda", "2021", "Sedan", "34.5"),
        vehicle("Toyota", "2020", "Sedan", "30.0"),
    ]
}

/// the scenario rows as a CSV document, with an extra pass-through column
pub const SCENARIO_CSV: &str = "\
Manufacturer,Model Year,Vehicle Type,Real-World MPG,Production Share
Ford,2021,Truck,-,0.12
Honda,2021,Sedan,34.5,0.08
Toyota,2020,Sedan,30.0,0.10
";
