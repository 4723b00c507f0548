use std::ops::Index;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

// Post dates are free-form text. The formats below cover everything the
// content so far uses; anything else falls through to the regex salvage of
// a leading yyyy-mm-dd.
const DATE_FORMATS: [&str; 4] = ["%b %d, %Y", "%B %d, %Y", "%Y-%m-%d", "%m/%d/%Y"];

pub fn parse_post_date(buf: &str) -> Result<NaiveDate, String> {
    let buf = buf.trim();

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(buf, fmt) {
            return Ok(date);
        }
    }

    lazy_static! {
        static ref YMD_REGEX: Regex = Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})").unwrap();
    }

    let Some(caps) = YMD_REGEX.captures(buf) else {
        return Err(format!("Unable to parse date {}", buf));
    };

    let to_num = |num_str: &str| num_str.parse::<u32>()
        .map_err(|_| format!("Error parsing {} from the date {}", num_str, buf));

    let y = to_num(caps.index(1))? as i32;
    let m = to_num(caps.index(2))?;
    let d = to_num(caps.index(3))?;

    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or(format!("Date out of range: {}", buf))
}

pub fn format_post_date(date: &NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_month_format() {
        let date = parse_post_date("Jan 15, 2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_long_month_format() {
        let date = parse_post_date("January 8, 2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
    }

    #[test]
    fn test_parse_iso_format() {
        let date = parse_post_date("2024-01-10").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn test_parse_date_time_keeps_date_part() {
        let date = parse_post_date("2022-04-02 12:05:00.000").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2022, 4, 2).unwrap());
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_post_date("soon").is_err());
        assert!(parse_post_date("").is_err());
        assert!(parse_post_date("2024-13-45").is_err());
    }

    #[test]
    fn test_format_round_trip() {
        let date = parse_post_date("Jan 5, 2024").unwrap();
        assert_eq!(format_post_date(&date), "Jan 5, 2024");
    }
}
