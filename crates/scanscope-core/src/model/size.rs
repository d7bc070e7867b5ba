/// Display formatting for byte counts, file counts, and scan durations.
///
/// All internal sizes are `u64` bytes and all durations are
/// `std::time::Duration`. Floating point only appears in the returned strings.
use std::time::Duration;

/// Format a byte count into a human-readable string with appropriate unit.
///
/// Binary units (1 KB = 1024 bytes), labelled with the short forms users
/// expect from a disk tool.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    // GB and above get an extra digit: 1.25 GB reads better than 1.3 GB.
    if unit >= 2 {
        format!("{value:.2} {}", UNITS[unit])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Format a file count with thousand separators.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a scan duration as `850 ms`, `12.4 s`, or `3m 07s`.
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1_000 {
        format!("{ms} ms")
    } else if ms < 60_000 {
        format!("{:.1} s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_below_one_kilobyte_are_plain_bytes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
    }

    #[test]
    fn larger_units_gain_a_digit_from_gigabytes() {
        assert_eq!(format_size(512 * 1024), "512.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024 + 300 * 1024), "3.3 MB");
        assert_eq!(format_size(2_684_354_560), "2.50 GB");
    }

    #[test]
    fn terabytes_is_the_largest_unit() {
        assert_eq!(format_size(1u64 << 50), "1024.00 TB");
    }

    #[test]
    fn counts_are_grouped_in_thousands() {
        assert_eq!(format_count(42), "42");
        assert_eq!(format_count(12_345), "12,345");
        assert_eq!(format_count(100_000_000), "100,000,000");
    }

    #[test]
    fn durations_pick_a_readable_unit() {
        assert_eq!(format_duration(Duration::from_millis(850)), "850 ms");
        assert_eq!(format_duration(Duration::from_millis(12_400)), "12.4 s");
        assert_eq!(format_duration(Duration::from_secs(187)), "3m 07s");
    }
}
