use crate::entry::FileEntry;
use chrono::{DateTime, Datelike, Local, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateReference {
    Now,
    FileMtime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Token {
    Literal {
        text: String,
    },
    Number {
        min_digits: usize,
        init: i64,
        gain: i64,
    },
    DateFormat {
        pattern: String,
        reference: DateReference,
    },
    OriginalName {
        strip_extension: bool,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("日付パターンが空です")]
    EmptyDatePattern,
    #[error("日付パターン末尾の % が不完全です")]
    TrailingPercent,
}

impl Token {
    pub fn validate(&self) -> Result<(), ParameterError> {
        match self {
            Token::DateFormat { pattern, .. } => parse_date_pattern(pattern).map(|_| ()),
            _ => Ok(()),
        }
    }
}

pub fn render(
    token: &Token,
    index: usize,
    reference_time: DateTime<Local>,
    entry: &FileEntry,
) -> Result<String, ParameterError> {
    match token {
        Token::Literal { text } => Ok(text.clone()),
        Token::Number {
            min_digits,
            init,
            gain,
        } => Ok(format_number(index, *min_digits, *init, *gain)),
        Token::DateFormat { pattern, reference } => {
            let parts = parse_date_pattern(pattern)?;
            let at = match reference {
                DateReference::Now => reference_time,
                DateReference::FileMtime => entry.modified.unwrap_or(reference_time),
            };
            Ok(render_date_parts(&parts, at))
        }
        Token::OriginalName { strip_extension } => Ok(if *strip_extension {
            entry.stem.clone()
        } else {
            entry.file_name.clone()
        }),
    }
}

fn format_number(index: usize, min_digits: usize, init: i64, gain: i64) -> String {
    let value = init + gain * index as i64;
    let digits = format!("{:0width$}", value.unsigned_abs(), width = min_digits);
    if value < 0 {
        format!("-{digits}")
    } else {
        digits
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DatePart {
    Text(String),
    Field(DateField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateField {
    YearFull,
    YearShort,
    MonthBare,
    MonthPadded,
    MonthName,
    MonthAbbrev,
    DayBare,
    DayPadded,
    Hour24,
    Hour12,
    Meridiem,
    Minute,
    Second,
    Epoch,
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn date_field(code: char) -> Option<DateField> {
    match code {
        'Y' => Some(DateField::YearFull),
        'y' => Some(DateField::YearShort),
        'f' => Some(DateField::MonthBare),
        'm' => Some(DateField::MonthPadded),
        'B' => Some(DateField::MonthName),
        'b' => Some(DateField::MonthAbbrev),
        'e' => Some(DateField::DayBare),
        'd' => Some(DateField::DayPadded),
        'H' => Some(DateField::Hour24),
        'I' => Some(DateField::Hour12),
        'p' => Some(DateField::Meridiem),
        'M' => Some(DateField::Minute),
        'S' => Some(DateField::Second),
        's' => Some(DateField::Epoch),
        _ => None,
    }
}

fn parse_date_pattern(pattern: &str) -> Result<Vec<DatePart>, ParameterError> {
    if pattern.is_empty() {
        return Err(ParameterError::EmptyDatePattern);
    }

    let mut parts = Vec::new();
    let mut text = String::new();
    let mut chars = pattern.chars();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            text.push(ch);
            continue;
        }
        let Some(code) = chars.next() else {
            return Err(ParameterError::TrailingPercent);
        };
        match date_field(code) {
            Some(field) => {
                if !text.is_empty() {
                    parts.push(DatePart::Text(std::mem::take(&mut text)));
                }
                parts.push(DatePart::Field(field));
            }
            None => {
                text.push('%');
                text.push(code);
            }
        }
    }

    if !text.is_empty() {
        parts.push(DatePart::Text(text));
    }

    Ok(parts)
}

fn render_date_parts(parts: &[DatePart], at: DateTime<Local>) -> String {
    let mut out = String::new();
    for part in parts {
        match part {
            DatePart::Text(s) => out.push_str(s),
            DatePart::Field(field) => {
                let value = match field {
                    DateField::YearFull => format!("{:04}", at.year()),
                    DateField::YearShort => format!("{:02}", at.year().rem_euclid(100)),
                    DateField::MonthBare => format!("{}", at.month()),
                    DateField::MonthPadded => format!("{:02}", at.month()),
                    DateField::MonthName => MONTH_NAMES[at.month0() as usize].to_string(),
                    DateField::MonthAbbrev => MONTH_ABBREVS[at.month0() as usize].to_string(),
                    DateField::DayBare => format!("{}", at.day()),
                    DateField::DayPadded => format!("{:02}", at.day()),
                    DateField::Hour24 => format!("{:02}", at.hour()),
                    DateField::Hour12 => format!("{:02}", at.hour12().1),
                    DateField::Meridiem => (if at.hour12().0 { "PM" } else { "AM" }).to_string(),
                    DateField::Minute => format!("{:02}", at.minute()),
                    DateField::Second => format!("{:02}", at.second()),
                    DateField::Epoch => format!("{}", at.timestamp()),
                };
                out.push_str(&value);
            }
        }
    }
    out
}
