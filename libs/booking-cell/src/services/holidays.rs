// libs/booking-cell/src/services/holidays.rs
use chrono::{Datelike, Duration, NaiveDate};

/// French public holidays with a fixed calendar date (month, day).
const FIXED_HOLIDAYS: [(u32, u32); 8] = [
    (1, 1),   // Jour de l'an
    (5, 1),   // Fete du travail
    (5, 8),   // Victoire 1945
    (7, 14),  // Fete nationale
    (8, 15),  // Assomption
    (11, 1),  // Toussaint
    (11, 11), // Armistice 1918
    (12, 25), // Noel
];

/// Easter Sunday for a given year (Gregorian computus, Meeus/Jones/Butcher).
pub fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = ((h + l - 7 * m + 114) % 31) + 1;

    // The computus always yields a valid March or April date.
    NaiveDate::from_ymd_opt(year, month as u32, day as u32).unwrap_or(NaiveDate::MIN)
}

/// Whether the date is a French public holiday.
///
/// Covers the eight fixed dates plus the three Easter-relative holidays:
/// lundi de Paques (+1), Ascension (+39) and lundi de Pentecote (+50).
pub fn is_public_holiday(date: NaiveDate) -> bool {
    if FIXED_HOLIDAYS
        .iter()
        .any(|&(month, day)| date.month() == month && date.day() == day)
    {
        return true;
    }

    let easter = easter_sunday(date.year());
    let easter_monday = easter + Duration::days(1);
    let ascension = easter + Duration::days(39);
    let whit_monday = easter + Duration::days(50);

    date == easter_monday || date == ascension || date == whit_monday
}
