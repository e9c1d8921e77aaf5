use chrono::NaiveTime;

use crate::api::types::MINUTES_PER_DAY;

/// Compact time token: `9`, `14`, `930`, `0930`, `9:30`, each optionally followed by
/// `a`, `am`, `p` or `pm`.
pub fn parse_time(token: &str) -> Option<NaiveTime> {
    let lower = token.trim().to_lowercase();
    let (digits, meridiem) = split_meridiem(&lower);
    if digits.is_empty() {
        return None;
    }

    let (hour, minute) = if let Some((h, m)) = digits.split_once(':') {
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return None;
        }
        (parse_digits(h)?, parse_digits(m)?)
    } else {
        match digits.len() {
            1 | 2 => (parse_digits(digits)?, 0),
            3 => (parse_digits(&digits[..1])?, parse_digits(&digits[1..])?),
            4 => (parse_digits(&digits[..2])?, parse_digits(&digits[2..])?),
            _ => return None,
        }
    };

    if minute > 59 {
        return None;
    }
    let hour = match meridiem {
        Some(pm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match (hour, pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            }
        }
        None => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Duration token in minutes: `45m`, `45min`, `1h`, `2h30m`, `1.5h`.
pub fn parse_duration(token: &str) -> Option<u32> {
    let lower = token.trim().to_lowercase();
    let minutes = if let Some(rest) = lower.strip_suffix("min") {
        parse_digits(rest)?
    } else if let Some((hours, rest)) = lower.split_once('h') {
        let whole = if hours.contains('.') {
            let h: f32 = hours.parse().ok()?;
            if !h.is_finite() || h < 0.0 {
                return None;
            }
            (h * 60.0).round() as u32
        } else {
            parse_digits(hours)?.checked_mul(60)?
        };
        let extra = match rest {
            "" => 0,
            r => parse_digits(r.strip_suffix('m')?)?,
        };
        whole.checked_add(extra)?
    } else {
        parse_digits(lower.strip_suffix('m')?)?
    };

    if minutes == 0 || minutes > MINUTES_PER_DAY {
        return None;
    }
    Some(minutes)
}

fn split_meridiem(s: &str) -> (&str, Option<bool>) {
    for (suffix, pm) in [("am", false), ("pm", true), ("a", false), ("p", true)] {
        if let Some(rest) = s.strip_suffix(suffix) {
            return (rest, Some(pm));
        }
    }
    (s, None)
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    #[test]
    fn bare_hours() {
        assert_eq!(parse_time("9"), t(9, 0));
        assert_eq!(parse_time("14"), t(14, 0));
        assert_eq!(parse_time("0"), t(0, 0));
    }

    #[test]
    fn packed_hours_and_minutes() {
        assert_eq!(parse_time("930"), t(9, 30));
        assert_eq!(parse_time("0930"), t(9, 30));
        assert_eq!(parse_time("1745"), t(17, 45));
    }

    #[test]
    fn colon_form() {
        assert_eq!(parse_time("9:30"), t(9, 30));
        assert_eq!(parse_time("23:05"), t(23, 5));
        assert_eq!(parse_time("9:3"), None);
        assert_eq!(parse_time(":30"), None);
    }

    #[test]
    fn meridiem_suffixes() {
        assert_eq!(parse_time("2p"), t(14, 0));
        assert_eq!(parse_time("230pm"), t(14, 30));
        assert_eq!(parse_time("12am"), t(0, 0));
        assert_eq!(parse_time("12p"), t(12, 0));
        assert_eq!(parse_time("9:15a"), t(9, 15));
        assert_eq!(parse_time("13pm"), None);
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert_eq!(parse_time("24"), None);
        assert_eq!(parse_time("960"), None);
        assert_eq!(parse_time("12345"), None);
        assert_eq!(parse_time("noon"), None);
        assert_eq!(parse_time(""), None);
        assert_eq!(parse_time("pm"), None);
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("45m"), Some(45));
        assert_eq!(parse_duration("45min"), Some(45));
        assert_eq!(parse_duration("1h"), Some(60));
        assert_eq!(parse_duration("2h30m"), Some(150));
        assert_eq!(parse_duration("1.5h"), Some(90));
    }

    #[test]
    fn duration_rejects_bare_numbers_and_zero() {
        assert_eq!(parse_duration("45"), None);
        assert_eq!(parse_duration("0m"), None);
        assert_eq!(parse_duration("h"), None);
        assert_eq!(parse_duration("25h"), None);
        assert_eq!(parse_duration("2h30"), None);
    }

    #[test]
    fn duration_overflow_is_not_a_duration() {
        assert_eq!(parse_duration("100000000h"), None);
        assert_eq!(parse_duration("1h4294967295m"), None);
        assert_eq!(parse_duration("99999999999.5h30m"), None);
        assert_eq!(parse_duration("4294967296m"), None);
    }
}
