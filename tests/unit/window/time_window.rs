use super::*;
use chrono::NaiveDate;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
    at(y, m, d, 12, 0)
}

#[test]
fn parses_both_grammars() {
    let d = TimeWindow::parse("03/15 - 06/30");
    assert_eq!(d.kind(), WindowKind::Dates);
    let r = d.as_dates().unwrap();
    assert_eq!(r.start(), MonthDay::new(3, 15).unwrap());
    assert_eq!(r.end_day_of_year(), 181);

    let h = TimeWindow::parse("08:05 - 17:45");
    assert_eq!(h.kind(), WindowKind::Hours);
    let r = h.as_hours().unwrap();
    assert_eq!(r.start_second_of_day(), 8 * 3600 + 5 * 60);
    assert_eq!(r.end(), (17, 45));
}

#[test]
fn malformed_input_becomes_none() {
    for raw in [
        "",
        "garbage",
        DATES_PLACEHOLDER,
        HOURS_PLACEHOLDER,
        "02/29 - 03/01",
        "04/31 - 05/01",
        "13/01 - 01/01",
        "00/10 - 01/01",
        "01/00 - 01/01",
        "24:00 - 01:00",
        "10:60 - 11:00",
        "1/1 - 2/2",
        "01/01-02/02",
        "01/01 - 02/02 ",
        " 01/01 - 02/02",
        "01:01 / 02:02",
    ] {
        assert!(TimeWindow::parse(raw).is_none(), "{raw:?} should not parse");
    }
}

#[test]
fn grammar_specific_parsers_reject_the_other_kind() {
    assert!(TimeWindow::parse_dates("08:00 - 09:00").is_none());
    assert!(TimeWindow::parse_hours("01/01 - 02/02").is_none());
}

#[test]
fn display_round_trips_canonical_form() {
    for raw in ["12/20 - 01/10", "22:00 - 02:00"] {
        assert_eq!(TimeWindow::parse(raw).to_string(), raw);
    }
    assert_eq!(TimeWindow::None.to_string(), "");
}

#[test]
fn start_day_matches_and_previous_day_does_not() {
    let w = TimeWindow::parse("03/10 - 04/20");
    assert!(w.matches(noon(2023, 3, 10)));
    assert!(!w.matches(noon(2023, 3, 9)));
    assert!(w.matches(noon(2023, 4, 20)));
    assert!(!w.matches(noon(2023, 4, 21)));
}

#[test]
fn dates_wrap_across_new_year() {
    let w = TimeWindow::parse("12/20 - 01/10");
    assert!(w.as_dates().unwrap().wraps());
    assert!(w.matches(noon(2023, 12, 25)));
    assert!(w.matches(noon(2024, 1, 5)));
    assert!(w.matches(noon(2023, 12, 31)));
    assert!(!w.matches(noon(2023, 6, 15)));
}

#[test]
fn leap_day_matches_like_feb_28() {
    let w = TimeWindow::parse("02/01 - 03/01");
    assert_eq!(w.matches(noon(2024, 2, 29)), w.matches(noon(2023, 2, 28)));
    assert!(w.matches(noon(2024, 2, 29)));

    // Feb 29 collapses onto Feb 28, which a window starting Mar 1 excludes.
    let spring = TimeWindow::parse("03/01 - 05/01");
    assert!(!spring.matches(noon(2024, 2, 29)));
    assert!(spring.matches(noon(2024, 3, 1)));

    // Every later leap-year day shifts back by one.
    let last = TimeWindow::parse("12/31 - 12/31");
    assert!(last.matches(noon(2024, 12, 31)));
}

#[test]
fn hours_wrap_across_midnight() {
    let w = TimeWindow::parse("22:00 - 02:00");
    assert!(w.matches(at(2023, 5, 1, 23, 30)));
    assert!(w.matches(at(2023, 5, 1, 1, 0)));
    assert!(w.matches(at(2023, 5, 1, 0, 0)));
    assert!(!w.matches(at(2023, 5, 1, 12, 0)));
}

#[test]
fn hour_bounds_are_inclusive_at_minute_resolution() {
    let w = TimeWindow::parse("08:00 - 17:00");
    assert!(w.matches(at(2023, 5, 1, 8, 0)));
    assert!(!w.matches(at(2023, 5, 1, 7, 59)));
    let late = NaiveDate::from_ymd_opt(2023, 5, 1)
        .unwrap()
        .and_hms_opt(17, 0, 59)
        .unwrap();
    assert!(w.matches(late));
    assert!(!w.matches(at(2023, 5, 1, 17, 1)));
}

#[test]
fn none_never_matches() {
    assert!(!TimeWindow::None.matches(noon(2023, 1, 1)));
}
