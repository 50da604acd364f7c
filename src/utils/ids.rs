use crate::error::{Error, Result};

/// Parses an opaque string id from the API into its numeric key.
pub fn parse_id(raw: &str, field: &str) -> Result<i32> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| Error::BadRequest(format!("Invalid {}: '{}'", field, raw)))
}

pub fn parse_optional_id(raw: Option<&str>, field: &str) -> Result<Option<i32>> {
    raw.map(|r| parse_id(r, field)).transpose()
}

pub fn parse_ids(raw: &[String], field: &str) -> Result<Vec<i32>> {
    raw.iter().map(|r| parse_id(r, field)).collect()
}
