use chrono::{DateTime, Utc};

/// Format a listing price in human-readable form
/// Examples: "1.50 ETH", "0.30 ETH", "<0.01 ETH"
pub fn format_price(price: f64) -> String {
    if price > 0.0 && price < 0.01 {
        "<0.01 ETH".to_string()
    } else {
        format!("{price:.2} ETH")
    }
}

/// Relative age of a listing ("3d ago", "5h ago", "now")
pub fn format_when(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - created_at).num_seconds().max(0);
    const MIN: i64 = 60;
    const HOUR: i64 = 3600;
    const DAY: i64 = 86_400;

    if secs < MIN {
        "now".to_string()
    } else if secs < HOUR {
        format!("{}m ago", secs / MIN)
    } else if secs < DAY {
        format!("{}h ago", secs / HOUR)
    } else {
        format!("{}d ago", secs / DAY)
    }
}

/// Pad or truncate to a fixed display width for table rows
pub fn fit(s: &str, width: usize) -> String {
    let mut out: String = s.chars().take(width).collect();
    while out.chars().count() < width {
        out.push(' ');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1.5), "1.50 ETH");
        assert_eq!(format_price(0.005), "<0.01 ETH");
        assert_eq!(format_price(0.0), "0.00 ETH");
    }

    #[test]
    fn test_format_when() {
        let now = Utc::now();
        assert_eq!(format_when(now, now), "now");
        assert_eq!(format_when(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_when(now - Duration::hours(3), now), "3h ago");
        assert_eq!(format_when(now - Duration::days(2), now), "2d ago");
    }

    #[test]
    fn test_fit_pads_and_truncates() {
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("abcdef", 4), "abcd");
    }
}
