use std::fmt::Write as _;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::error::{Error, Result};
use crate::interpreter::Interpreter;
use crate::kind::Kind;
use crate::native::{expect_str, expect_time, take_args};
use crate::numeric::Decimal;
use crate::token::{Timestamp, Token};

use super::{builtin, define};

// ============================================================================
// Parsing and Formatting
// ============================================================================

/// Render `time` with a strftime layout. A bad layout is an error, not a panic.
pub(crate) fn format_time(time: &Timestamp, layout: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", time.format(layout))
        .map_err(|_| Error::invalid_argument(format!("invalid time layout `{layout}`")))?;
    Ok(out)
}

/// Parse `text` with a strftime layout. Layouts without an offset are read
/// as UTC; layouts without a time of day as midnight.
pub(crate) fn parse_time(text: &str, layout: &str) -> Result<Timestamp> {
    if let Ok(time) = DateTime::parse_from_str(text, layout) {
        return Ok(time);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
        return Ok(Utc.from_utc_datetime(&naive).fixed_offset());
    }
    let date = NaiveDate::parse_from_str(text, layout).map_err(|e| {
        Error::invalid_argument(format!("parseTime: `{text}` does not match `{layout}`: {e}"))
    })?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::invalid_argument(format!("parseTime: no midnight on {date}")))?;
    Ok(Utc.from_utc_datetime(&midnight).fixed_offset())
}

/// RFC 3339 parse
/// Usage: (parseTime "2024-03-01T10:00:00Z") => 2024-03-01T10:00:00Z
pub fn parse_rfc3339(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [text] = take_args("parseTime", args)?;
    let text = expect_str("parseTime", &text)?;
    DateTime::parse_from_rfc3339(text)
        .map(Token::Time)
        .map_err(|e| Error::invalid_argument(format!("parseTime: `{text}`: {e}")))
}

/// Usage: (parseTime "01/03/2024" "%d/%m/%Y") => 2024-03-01T00:00:00Z
pub fn parse_with_layout(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [text, layout] = take_args("parseTime", args)?;
    let text = expect_str("parseTime", &text)?;
    let layout = expect_str("parseTime", &layout)?;
    Ok(Token::Time(parse_time(text, layout)?))
}

/// Usage: (formatTime (. Created) "%Y-%m-%d") => "2024-03-01"
pub fn format(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [time, layout] = take_args("formatTime", args)?;
    let time = expect_time("formatTime", &time)?;
    let layout = expect_str("formatTime", &layout)?;
    Ok(Token::String(format_time(time, layout)?))
}

/// Whether the time, formatted with the layout, reads as expected
/// Usage: (matchTime (. Created) "%m" "03") => true
pub fn match_time(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [time, layout, expected] = take_args("matchTime", args)?;
    let time = expect_time("matchTime", &time)?;
    let layout = expect_str("matchTime", &layout)?;
    let expected = expect_str("matchTime", &expected)?;
    Ok(Token::Boolean(format_time(time, layout)? == expected))
}

// ============================================================================
// Comparison
// ============================================================================

fn two_times(name: &str, args: Vec<Token>) -> Result<(Timestamp, Timestamp)> {
    let [a, b] = take_args(name, args)?;
    Ok((*expect_time(name, &a)?, *expect_time(name, &b)?))
}

/// Usage: (after 2024-03-02T00:00:00Z 2024-03-01T00:00:00Z) => true
pub fn after(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let (a, b) = two_times("after", args)?;
    Ok(Token::Boolean(a > b))
}

/// Usage: (before 2024-03-01T00:00:00Z 2024-03-02T00:00:00Z) => true
pub fn before(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let (a, b) = two_times("before", args)?;
    Ok(Token::Boolean(a < b))
}

/// Inclusive range test on instants
/// Usage: (betweenTimes (. At) (. Open) (. Close)) => true
pub fn between_times(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [time, from, to] = take_args("betweenTimes", args)?;
    let time = expect_time("betweenTimes", &time)?;
    let from = expect_time("betweenTimes", &from)?;
    let to = expect_time("betweenTimes", &to)?;
    Ok(Token::Boolean(from <= time && time <= to))
}

/// Whole days from the first time to the second
/// Usage: (days 2024-03-01T00:00:00Z 2024-03-04T12:00:00Z) => 3
pub fn days(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let (from, to) = two_times("days", args)?;
    Ok(Token::Decimal(Decimal::from((to - from).num_days())))
}

// ============================================================================
// Components
// ============================================================================

/// One accessor per calendar or clock component.
fn component(
    name: &'static str,
    read: fn(&Timestamp) -> i64,
) -> impl Fn(&mut Interpreter<'_>, Vec<Token>) -> Result<Token> + 'static {
    move |_interp: &mut Interpreter<'_>, args: Vec<Token>| {
        let [time] = take_args(name, args)?;
        Ok(Token::Decimal(Decimal::from(read(expect_time(name, &time)?))))
    }
}

/// Midnight of the same day, in the same offset
/// Usage: (date 2024-03-01T10:30:00+02:00) => 2024-03-01T00:00:00+02:00
pub fn date(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [time] = take_args("date", args)?;
    let time = expect_time("date", &time)?;
    time.date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| time.offset().from_local_datetime(&midnight).single())
        .map(Token::Time)
        .ok_or_else(|| Error::invalid_argument(format!("date: no midnight for {time}")))
}

// ============================================================================
// Registration
// ============================================================================

pub(super) fn register(interp: &mut Interpreter<'_>) {
    const T: Kind = Kind::TIME;
    const S: Kind = Kind::STRING;
    const B: Kind = Kind::BOOLEAN;
    const D: Kind = Kind::DECIMAL;

    define(
        interp,
        builtin("after", &[T, T], B)
            .describe("Whether the first time is later than the second")
            .example("(after (. Shipped) (. Ordered))"),
        after,
    );
    define(
        interp,
        builtin("before", &[T, T], B)
            .describe("Whether the first time is earlier than the second")
            .example("(before (. Ordered) (. Shipped))"),
        before,
    );
    define(
        interp,
        builtin("betweenTimes", &[T, T, T], B)
            .describe("Whether the first time lies within the inclusive range of the other two")
            .example("(betweenTimes (. At) (. Open) (. Close))"),
        between_times,
    );
    define(
        interp,
        builtin("parseTime", &[S], T)
            .describe("Time from RFC 3339 text")
            .example("(parseTime \"2024-03-01T10:00:00Z\")"),
        parse_rfc3339,
    );
    define(
        interp,
        builtin("parseTime", &[S, S], T)
            .describe("Time from text in a strftime layout")
            .example("(parseTime \"01/03/2024\" \"%d/%m/%Y\")"),
        parse_with_layout,
    );
    define(
        interp,
        builtin("formatTime", &[T, S], S)
            .describe("Time rendered with a strftime layout")
            .example("(formatTime (. Created) \"%Y-%m-%d\")"),
        format,
    );
    define(
        interp,
        builtin("matchTime", &[T, S, S], B)
            .describe("Whether the time rendered with the layout equals the expected text")
            .example("(matchTime (. Created) \"%m\" \"03\")"),
        match_time,
    );
    define(
        interp,
        builtin("days", &[T, T], D)
            .describe("Whole days from the first time to the second")
            .example("(days (. Ordered) (. Shipped))"),
        days,
    );
    define(
        interp,
        builtin("date", &[T], T)
            .describe("Midnight of the same day in the same offset")
            .example("(date (. Created))"),
        date,
    );

    let components: [(&'static str, fn(&Timestamp) -> i64, &str); 6] = [
        ("hour", |t| i64::from(t.hour()), "Hour of the day, 0 to 23"),
        ("minute", |t| i64::from(t.minute()), "Minute of the hour"),
        ("month", |t| i64::from(t.month()), "Month of the year, 1 to 12"),
        ("monthDay", |t| i64::from(t.day()), "Day of the month"),
        (
            "weekDay",
            |t| i64::from(t.weekday().num_days_from_sunday()),
            "Day of the week, 0 for Sunday",
        ),
        ("year", |t| i64::from(t.year()), "Calendar year"),
    ];
    for (name, read, description) in components {
        define(
            interp,
            builtin(name, &[T], D)
                .describe(description)
                .example(format!("({name} (. Created))")),
            component(name, read),
        );
    }
}
