use crate::config::TimeMode;
use time::format_description::{parse_owned, parse_strftime_owned, OwnedFormatItem};
use time::OffsetDateTime;

const DEFAULT_ABSOLUTE_FORMAT: &str = "[year]-[month]-[day] [hour]:[minute]";

/// Formats commit dates for the commit list and preview header
#[derive(Debug, Clone)]
pub struct TimeFormatter {
    mode: TimeMode,
    absolute_format: Option<OwnedFormatItem>,
    custom_format: Option<OwnedFormatItem>,
}

impl Default for TimeFormatter {
    fn default() -> Self {
        Self::new(TimeMode::default(), "")
    }
}

impl TimeFormatter {
    pub fn new(mode: TimeMode, format: &str) -> Self {
        let absolute_format = parse_owned::<2>(DEFAULT_ABSOLUTE_FORMAT)
            .or_else(|_| parse_strftime_owned("%Y-%m-%d %H:%M"))
            .ok();
        let custom_format = match mode {
            TimeMode::Custom => parse_format(format),
            _ => None,
        };
        Self {
            mode,
            absolute_format,
            custom_format,
        }
    }

    pub fn format(&self, epoch: Option<i64>, now: i64) -> String {
        let Some(epoch) = epoch else {
            return "Unknown".to_string();
        };
        let format = match self.mode {
            TimeMode::Relative => return format_relative_age(epoch, now),
            TimeMode::Absolute => self.absolute_format.as_ref(),
            TimeMode::Custom => self
                .custom_format
                .as_ref()
                .or(self.absolute_format.as_ref()),
        };
        format
            .and_then(|format| format_absolute(epoch, format))
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Current time as unix seconds
pub fn now_epoch() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

fn parse_format(format: &str) -> Option<OwnedFormatItem> {
    let trimmed = format.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains('%') {
        parse_strftime_owned(trimmed).ok()
    } else {
        parse_owned::<2>(trimmed).ok()
    }
}

fn format_absolute(epoch: i64, format: &OwnedFormatItem) -> Option<String> {
    let date_time = OffsetDateTime::from_unix_timestamp(epoch).ok()?;
    date_time.format(format).ok()
}

pub fn format_relative_age(epoch: i64, now: i64) -> String {
    let age_secs = now.saturating_sub(epoch);
    if age_secs < 60 {
        return "just now".to_string();
    }
    if age_secs < 3_600 {
        let minutes = age_secs / 60;
        return plural(minutes, "minute");
    }
    let age_days = age_secs / 86_400;
    if age_days <= 0 {
        return plural(age_secs / 3_600, "hour");
    }
    if age_days < 30 {
        return plural(age_days, "day");
    }
    if age_days < 365 {
        return plural((age_days / 30).max(1), "month");
    }
    plural(age_days / 365, "year")
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_ages() {
        let now = 1_700_000_000;
        assert_eq!(format_relative_age(now - 10, now), "just now");
        assert_eq!(format_relative_age(now - 120, now), "2 minutes ago");
        assert_eq!(format_relative_age(now - 3_600, now), "1 hour ago");
        assert_eq!(format_relative_age(now - 86_400 * 3, now), "3 days ago");
        assert_eq!(format_relative_age(now - 86_400 * 65, now), "2 months ago");
        assert_eq!(format_relative_age(now - 86_400 * 400, now), "1 year ago");
    }

    #[test]
    fn test_absolute_and_custom() {
        let absolute = TimeFormatter::new(TimeMode::Absolute, "");
        assert_eq!(absolute.format(Some(0), 0), "1970-01-01 00:00");

        let custom = TimeFormatter::new(TimeMode::Custom, "%Y/%m/%d");
        assert_eq!(custom.format(Some(86_400), 0), "1970/01/02");

        assert_eq!(absolute.format(None, 0), "Unknown");
    }
}
