//! Vehicle records, their column names and composite key construction.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrendsError};

/// Column holding the vehicle manufacturer
pub const MANUFACTURER: &str = "Manufacturer";
/// Column holding the model year, kept as text
pub const MODEL_YEAR: &str = "Model Year";
/// Column holding the vehicle type
pub const VEHICLE_TYPE: &str = "Vehicle Type";
/// Column holding the real world fuel economy figure
pub const REAL_WORLD_MPG: &str = "Real-World MPG";

/// joins the three key fields of a composite key
pub const KEY_SEPARATOR: char = ':';

/// marks a numeric field as "data unavailable"
pub const SENTINEL: &str = "-";

/// One row's columns, name to raw string value
pub type FieldMap = BTreeMap<String, String>;

/// A single vehicle entry, as stored in the structured namespace.
///
/// Every column of the source row is carried verbatim, only the three key
/// columns get typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: FieldMap,
}

impl Record {
    /// wraps the given field map
    pub fn new(fields: FieldMap) -> Self {
        Record { fields }
    }

    /// returns the value of `field`, if present
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// the `Manufacturer` column
    pub fn manufacturer(&self) -> Option<&str> {
        self.get(MANUFACTURER)
    }

    /// the `Model Year` column
    pub fn model_year(&self) -> Option<&str> {
        self.get(MODEL_YEAR)
    }

    /// the `Vehicle Type` column
    pub fn vehicle_type(&self) -> Option<&str> {
        self.get(VEHICLE_TYPE)
    }

    /// borrows all fields
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// consumes the record, returning its fields
    pub fn into_fields(self) -> FieldMap {
        self.fields
    }
}

impl From<FieldMap> for Record {
    fn from(fields: FieldMap) -> Self {
        Record::new(fields)
    }
}

/// Builds the composite key `{Manufacturer}:{Model Year}:{Vehicle Type}` for a row.
///
/// Colons inside the key fields are not escaped, so two different triples can
/// collide on the same key.
///
/// # Errors
/// returns [`TrendsError::MalformedRow`] if any of the three key fields is missing.
/// `row` is only used to report the position of the bad row.
pub fn composite_key(row: usize, fields: &FieldMap) -> Result<String> {
    let part = |name: &str| {
        fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| TrendsError::MalformedRow {
                row,
                field: name.to_string(),
            })
    };

    Ok(format!(
        "{}{sep}{}{sep}{}",
        part(MANUFACTURER)?,
        part(MODEL_YEAR)?,
        part(VEHICLE_TYPE)?,
        sep = KEY_SEPARATOR
    ))
}
