// Copyright (C) 2024 Fred Clausen

// This program is free software; you can redistribute it and/or
// modify it under the terms of the GNU General Public License
// as published by the Free Software Foundation; either version 2
// of the License, or (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with this program; if not, write to the Free Software
// Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA  02110-1301, USA

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use custom_error::custom_error;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

custom_error! {pub TimeFormatError
    Pattern { pattern: String } = "Invalid time format pattern {pattern}",
}

/// Format `t` in local time using a strftime style `pattern`, followed by a `.` and the
/// nanoseconds within the second as exactly nine digits.
pub fn format_time(t: SystemTime, pattern: &str) -> Result<String, TimeFormatError> {
    let items: Vec<Item> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(TimeFormatError::Pattern {
            pattern: pattern.to_string(),
        });
    }

    let local: DateTime<Local> = DateTime::from(t);
    Ok(format!(
        "{}.{:09}",
        local.format_with_items(items.iter()),
        local.timestamp_subsec_nanos()
    ))
}

/// Round `t` up to a whole second. A time already on a whole second is returned unchanged.
pub fn ceil_to_second(t: SystemTime) -> SystemTime {
    match t.duration_since(UNIX_EPOCH) {
        Ok(since) if since.subsec_nanos() == 0 => t,
        Ok(since) => UNIX_EPOCH + Duration::from_secs(since.as_secs() + 1),
        // before the epoch the whole seconds are counted backwards, so truncation rounds up
        Err(before) => UNIX_EPOCH - Duration::from_secs(before.duration().as_secs()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nanoseconds_are_zero_padded() -> Result<(), TimeFormatError> {
        let t = UNIX_EPOCH + Duration::new(1_700_000_000, 5);
        assert_eq!(format_time(t, "")?, ".000000005");

        let t = UNIX_EPOCH + Duration::new(1_700_000_000, 0);
        assert_eq!(format_time(t, "")?, ".000000000");

        let t = UNIX_EPOCH + Duration::new(1_700_000_000, 999_999_999);
        assert_eq!(format_time(t, "")?, ".999999999");

        let t = UNIX_EPOCH + Duration::new(1_700_000_000, 120_000);
        assert_eq!(format_time(t, "")?, ".000120000");
        Ok(())
    }

    #[test]
    fn test_default_format_shape() -> Result<(), TimeFormatError> {
        // the middle of November, so the year is the same in every time zone
        let t = UNIX_EPOCH + Duration::new(1_700_000_000, 42);
        let formatted = format_time(t, DEFAULT_TIME_FORMAT)?;

        assert!(formatted.starts_with("2023-11-"), "{}", formatted);
        assert!(formatted.ends_with(".000000042"), "{}", formatted);
        // "YYYY-mm-dd HH:MM:SS" plus ".nnnnnnnnn"
        assert_eq!(formatted.len(), 19 + 10);
        Ok(())
    }

    #[test]
    fn test_bad_pattern() {
        let t = UNIX_EPOCH + Duration::new(1_700_000_000, 0);
        assert!(matches!(
            format_time(t, "%Y %"),
            Err(TimeFormatError::Pattern { .. })
        ));
    }

    #[test]
    fn test_ceil_to_second() {
        let whole = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert_eq!(ceil_to_second(whole), whole);
        assert_eq!(
            ceil_to_second(whole + Duration::from_nanos(1)),
            whole + Duration::from_secs(1)
        );
        assert_eq!(
            ceil_to_second(whole + Duration::from_millis(999)),
            whole + Duration::from_secs(1)
        );

        let before = UNIX_EPOCH - Duration::from_millis(1500);
        assert_eq!(ceil_to_second(before), UNIX_EPOCH - Duration::from_secs(1));
    }
}
