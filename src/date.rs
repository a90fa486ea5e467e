//! Query date normalization.

use crate::models::SearchDate;
use chrono::{Local, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

pub const DATE_FORMAT: &str = "%d-%m-%Y";

static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}-[0-9]{2}-[0-9]{4}$").expect("valid date regex"));

/// Pass a `DD-MM-YYYY` value through untouched, otherwise use today's local date.
///
/// Only the shape is checked, so `99-99-2024` is accepted as-is.
pub fn normalize(raw: Option<&str>) -> SearchDate {
    normalize_with_today(raw, Local::now().date_naive())
}

pub fn normalize_with_today(raw: Option<&str>, today: NaiveDate) -> SearchDate {
    match raw {
        Some(value) if DATE_SHAPE.is_match(value) => SearchDate::new(value.to_string()),
        _ => SearchDate::new(today.format(DATE_FORMAT).to_string()),
    }
}
