//! Opening-hours strings -> typed day windows.
//!
//! Accepted shapes:
//!   "11:00 AM - 10:00 PM"
//!   "5 PM - 2 AM"            (runs past midnight)
//!   "07:30-15:00"            (24-hour clock)
//!   "Closed"
//!   "Open 24 hours"

use anyhow::{anyhow, Result};
use chrono::{NaiveTime, Weekday};
use regex::Regex;
use std::collections::BTreeMap;
use vibemap_core::{DayWindow, OpeningHours};

fn to_time(hour: &str, minute: Option<&str>, meridiem: Option<&str>) -> Option<NaiveTime> {
    let mut h: u32 = hour.parse().ok()?;
    let m: u32 = minute.map(str::parse::<u32>).transpose().ok()?.unwrap_or(0);
    match meridiem.map(|s| s.to_ascii_uppercase()) {
        Some(mer) => {
            if !(1..=12).contains(&h) {
                return None;
            }
            if mer == "PM" && h != 12 {
                h += 12;
            } else if mer == "AM" && h == 12 {
                h = 0;
            }
        }
        None if h == 24 => h = 0,
        None => {}
    }
    NaiveTime::from_hms_opt(h, m, 0)
}

fn other_meridiem(mer: &str) -> &'static str {
    if mer.eq_ignore_ascii_case("pm") { "AM" } else { "PM" }
}

/// `Ok(None)` means closed that day.
pub fn parse_day_window(s: &str) -> Result<Option<DayWindow>> {
    let t = s.trim();
    if t.is_empty() || t.eq_ignore_ascii_case("closed") {
        return Ok(None);
    }
    if t.to_ascii_lowercase().contains("24 hours") {
        let midnight = NaiveTime::from_hms_opt(0, 0, 0).ok_or_else(|| anyhow!("midnight"))?;
        return Ok(Some(DayWindow::new(midnight, midnight)));
    }

    // OPEN [MERIDIEM] (-|to) CLOSE [MERIDIEM]
    let window_re = Regex::new(concat!(
        r"(?i)^\s*(?P<oh>\d{1,2})(?::(?P<om>\d{2}))?\s*(?P<omer>AM|PM)?\s*",
        r"(?:-|–|to)\s*",
        r"(?P<ch>\d{1,2})(?::(?P<cm>\d{2}))?\s*(?P<cmer>AM|PM)?\s*$"
    ))?;

    let caps = window_re
        .captures(t)
        .ok_or_else(|| anyhow!("unrecognized opening hours: {t:?}"))?;

    let (oh, om) = (&caps["oh"], caps.name("om").map(|m| m.as_str()));
    let close_mer = caps.name("cmer").map(|m| m.as_str());
    let close = to_time(&caps["ch"], caps.name("cm").map(|m| m.as_str()), close_mer)
        .ok_or_else(|| anyhow!("bad closing time in {t:?}"))?;

    let open = match (caps.name("omer"), close_mer) {
        (Some(mer), _) => to_time(oh, om, Some(mer.as_str())),
        // "9 - 11 PM" shares the closing meridiem; "10 - 2 PM" and
        // "11 - 1 AM" only read forward with the other one.
        (None, Some(mer)) => match to_time(oh, om, Some(mer)) {
            Some(open) if open <= close => Some(open),
            _ => to_time(oh, om, Some(other_meridiem(mer))),
        },
        (None, None) => to_time(oh, om, None),
    }
    .ok_or_else(|| anyhow!("bad opening time in {t:?}"))?;

    Ok(Some(DayWindow::new(open, close)))
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name.trim().to_ascii_lowercase().as_str() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Weekday-name -> hours-string table into [`OpeningHours`].
pub fn parse_opening_hours(table: &BTreeMap<String, String>) -> Result<OpeningHours> {
    let mut hours = OpeningHours::new();
    for (day, text) in table {
        let weekday = weekday_from_name(day).ok_or_else(|| anyhow!("unknown weekday: {day:?}"))?;
        if let Some(window) = parse_day_window(text)? {
            hours.set(weekday, window);
        }
    }
    Ok(hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parses_twelve_hour_ranges() {
        let w = parse_day_window("11:00 AM - 10:00 PM").unwrap().unwrap();
        assert_eq!(w.open, t(11, 0));
        assert_eq!(w.close, t(22, 0));

        let w = parse_day_window("5 PM - 2 AM").unwrap().unwrap();
        assert_eq!((w.open, w.close), (t(17, 0), t(2, 0)));
        assert!(w.contains(t(1, 0)));

        let w = parse_day_window("12:00 PM - 12:00 AM").unwrap().unwrap();
        assert_eq!((w.open, w.close), (t(12, 0), t(0, 0)));
    }

    #[test]
    fn shared_meridiem_and_24h_clock() {
        let w = parse_day_window("9 - 11 PM").unwrap().unwrap();
        assert_eq!((w.open, w.close), (t(21, 0), t(23, 0)));

        let w = parse_day_window("10 - 2 PM").unwrap().unwrap();
        assert_eq!((w.open, w.close), (t(10, 0), t(14, 0)));

        let w = parse_day_window("11 - 1 AM").unwrap().unwrap();
        assert_eq!((w.open, w.close), (t(23, 0), t(1, 0)));

        let w = parse_day_window("12 - 2 PM").unwrap().unwrap();
        assert_eq!((w.open, w.close), (t(12, 0), t(14, 0)));

        let w = parse_day_window("07:30-15:00").unwrap().unwrap();
        assert_eq!((w.open, w.close), (t(7, 30), t(15, 0)));
    }

    #[test]
    fn closed_and_all_day() {
        assert!(parse_day_window("Closed").unwrap().is_none());
        let w = parse_day_window("Open 24 hours").unwrap().unwrap();
        assert!(w.contains(t(3, 0)));
        assert!(w.contains(t(23, 59)));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_day_window("whenever").is_err());
        assert!(parse_day_window("13 PM - 2 AM").is_err());
    }

    #[test]
    fn table_parse_rejects_unknown_days() {
        let mut table = BTreeMap::new();
        table.insert("friday".to_string(), "11:00 AM - 10:00 PM".to_string());
        table.insert("sunday".to_string(), "Closed".to_string());
        let hours = parse_opening_hours(&table).unwrap();
        assert!(hours.get(Weekday::Fri).is_some());
        assert!(hours.get(Weekday::Sun).is_none());

        table.insert("funday".to_string(), "1 PM - 2 PM".to_string());
        assert!(parse_opening_hours(&table).is_err());
    }
}
