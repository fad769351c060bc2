//! # toolkit/duration
//!
//! compact `NdNhNmNs` durations, e.g. `1d2h`, `15m`, `30s`.
//!
//! components must appear in the order days -> hours -> minutes -> seconds and each of
//! them is optional. [`parse_step`] is lenient: it reads the longest ordered prefix and
//! ignores out-of-order or unknown trailing components. [`parse_step_strict`] requires
//! the whole text to be consumed.

use std::sync::OnceLock;

use chrono::TimeDelta;
use regex::{Captures, Regex};

use crate::error::{PdError, Result};

const UNITS: [(char, i64); 4] = [('d', 86_400), ('h', 3_600), ('m', 60), ('s', 1)];

fn step_regex() -> &'static Regex {
    static STEP_REGEX: OnceLock<Regex> = OnceLock::new();
    STEP_REGEX.get_or_init(|| {
        Regex::new(r"^(?:(\d+)d)?(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?").expect("valid step regex")
    })
}

/// parse `text` into a duration, absent components count as zero
///
/// # Errors
///
/// [`PdError::Parse`] when a unit letter is preceded by something that is not an integer
/// (e.g. `1.5h`, `-3m`), or when the total overflows.
pub fn parse_step(text: &str) -> Result<TimeDelta> {
    let text = text.trim();
    let captures = step_regex()
        .captures(text)
        .ok_or_else(|| PdError::parse(format!("invalid step `{text}`")))?;
    let matched = captures.get(0).map_or(0, |m| m.end());
    check_remainder(&text[matched..])?;
    to_delta(text, &captures)
}

/// like [`parse_step`], but anything not consumed by the ordered pattern is an error
pub fn parse_step_strict(text: &str) -> Result<TimeDelta> {
    let text = text.trim();
    let captures = step_regex()
        .captures(text)
        .ok_or_else(|| PdError::parse(format!("invalid step `{text}`")))?;
    let matched = captures.get(0).map_or(0, |m| m.end());
    if matched != text.len() {
        return Err(PdError::parse(format!(
            "unexpected `{}` in step `{text}`",
            &text[matched..]
        )));
    }
    to_delta(text, &captures)
}

fn to_delta(text: &str, captures: &Captures) -> Result<TimeDelta> {
    let overflow = || PdError::parse(format!("step `{text}` is out of range"));
    let mut total: i64 = 0;
    for (group, (_, seconds)) in UNITS.iter().enumerate() {
        let Some(m) = captures.get(group + 1) else {
            continue;
        };
        let amount: i64 = m.as_str().parse().map_err(|_| overflow())?;
        total = amount
            .checked_mul(*seconds)
            .and_then(|s| total.checked_add(s))
            .ok_or_else(overflow)?;
    }
    TimeDelta::try_seconds(total).ok_or_else(overflow)
}

/// reject unit letters whose prefix is not a plain integer
fn check_remainder(remainder: &str) -> Result<()> {
    let mut start = 0;
    for (i, c) in remainder.char_indices() {
        if !c.is_ascii_alphabetic() {
            continue;
        }
        let prefix = &remainder[start..i];
        let is_unit = UNITS.iter().any(|(unit, _)| *unit == c);
        if is_unit && !prefix.is_empty() && !prefix.chars().all(|d| d.is_ascii_digit()) {
            return Err(PdError::parse(format!(
                "malformed component `{}{c}`",
                prefix
            )));
        }
        start = i + c.len_utf8();
    }
    Ok(())
}
