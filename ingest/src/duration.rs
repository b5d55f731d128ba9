use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::{calendar, Error, Result};

/// `h:mm:ss` or `m:ss`, the hour part is optional. Matched after NFKC, so
/// only ASCII digits are left to accept.
static CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([0-9]+):)?([0-9]{1,2}):([0-9]{2})$").expect("valid clock regex")
});

/// Parses an offset into a video into whole seconds.
///
/// Accepts, in order of precedence:
/// - `h:mm:ss` / `m:ss`, e.g. `"1:02:03"` is 3723
/// - a plain number of seconds, e.g. `"45"`
/// - anything [`calendar::parse`] understands, of which only the time of day
///   is used (`"1:5"` is read as 01:05, so 3900)
///
/// Full-width forms such as `"１：３０"` are folded to ASCII first.
pub fn parse_duration(text: &str) -> Result<i64> {
    let normalized: String = text.nfkc().collect();
    let trimmed = normalized.trim();
    let invalid = || Error::InvalidTimeLiteral(text.to_string());

    if let Some(captures) = CLOCK.captures(trimmed) {
        let field = |index: usize| -> Result<i64> {
            captures
                .get(index)
                .map_or(Ok(0), |m| m.as_str().parse::<i64>())
                .map_err(|_| invalid())
        };
        let (hours, minutes, seconds) = (field(1)?, field(2)?, field(3)?);

        return hours
            .checked_mul(3600)
            .and_then(|total| total.checked_add(minutes * 60 + seconds))
            .ok_or_else(invalid);
    }

    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed.parse::<i64>().map_err(|_| invalid());
    }

    let time = calendar::parse(trimmed).ok_or_else(invalid)?.time();
    let (hours, minutes, seconds) = time.as_hms();

    Ok(i64::from(hours) * 3600 + i64::from(minutes) * 60 + i64::from(seconds))
}
