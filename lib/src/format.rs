use std::fmt;

const MILLION: u64 = 1_000_000;
const THOUSAND: u64 = 1_000;
const MEBIBYTE: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// `1.5M`, as on listing cards.
    Short,
    /// `1.5 Million`, as on the detail page.
    Long,
}

/// `value` with one decimal, rounded from its exact binary value with
/// ties going up. Only odd multiples of a quarter are exact ties.
fn one_decimal(value: f64) -> String {
    let tie = (value * 4.0).fract() == 0.0 && (value * 2.0).fract() != 0.0;
    if tie {
        let tenths = (value * 10.0).ceil();
        format!("{:.1}", tenths / 10.0)
    } else {
        format!("{:.1}", value)
    }
}

pub fn format_downloads(count: u64, style: Style) -> String {
    if count >= MILLION {
        let value = one_decimal(count as f64 / MILLION as f64);
        match style {
            Style::Short => format!("{}M", value),
            Style::Long => format!("{} Million", value),
        }
    } else if count >= THOUSAND {
        format!("{}K", one_decimal(count as f64 / THOUSAND as f64))
    } else {
        count.to_string()
    }
}

/// Megabytes rounded to tenths, half up; whole values drop the `.0`.
pub fn format_size(bytes: u64) -> String {
    let tenths = (bytes as f64 / MEBIBYTE as f64 * 10.0 + 0.5).floor() as u64;
    if tenths % 10 == 0 {
        format!("{} MB", tenths / 10)
    } else {
        format!("{}.{} MB", tenths / 10, tenths % 10)
    }
}

/// Strips a leading `http://` or `https://`, whatever its case.
pub fn strip_scheme(url: &str) -> &str {
    for scheme in &["https://", "http://"] {
        if url.len() >= scheme.len()
            && url.is_char_boundary(scheme.len())
            && url[..scheme.len()].eq_ignore_ascii_case(scheme)
        {
            return &url[scheme.len()..];
        }
    }
    url
}

/// Five-position star rating. A half star is drawn like a full one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stars {
    pub full: u8,
    pub half: bool,
    pub rating: f32,
}

impl Stars {
    pub const POSITIONS: u8 = 5;

    pub fn new(rating: f32) -> Stars {
        let rating = if rating.is_nan() {
            0.0
        } else {
            rating.max(0.0).min(f32::from(Stars::POSITIONS))
        };
        let full = rating.floor() as u8;
        let half = full < Stars::POSITIONS && rating - rating.floor() >= 0.5;
        Stars { full, half, rating }
    }

    pub fn filled(&self) -> u8 {
        self.full + if self.half { 1 } else { 0 }
    }

    pub fn empty(&self) -> u8 {
        Stars::POSITIONS - self.filled()
    }
}

impl fmt::Display for Stars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.filled() {
            write!(f, "★")?;
        }
        for _ in 0..self.empty() {
            write!(f, "☆")?;
        }
        write!(f, " {}", one_decimal(f64::from(self.rating)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn downloads() {
        assert_eq!(format_downloads(1_500_000, Style::Short), "1.5M");
        assert_eq!(format_downloads(1_500_000, Style::Long), "1.5 Million");
        assert_eq!(format_downloads(750_000, Style::Short), "750.0K");
        assert_eq!(format_downloads(1_000, Style::Long), "1.0K");
        assert_eq!(format_downloads(999, Style::Short), "999");
        assert_eq!(format_downloads(0, Style::Short), "0");
    }

    #[test]
    fn downloads_round_from_the_binary_value() {
        // 7.85 is stored as 7.8499999999999996447...
        assert_eq!(format_downloads(7_850_000, Style::Short), "7.8M");
        assert_eq!(format_downloads(1_050, Style::Short), "1.1K");
        assert_eq!(format_downloads(1_250_000, Style::Short), "1.3M");
        assert_eq!(format_downloads(2_750, Style::Short), "2.8K");
        assert_eq!(format_downloads(1_949_999, Style::Long), "1.9 Million");
    }

    #[test]
    fn huge_counts_do_not_overflow() {
        assert_eq!(format_downloads(u64::MAX, Style::Short), "18446744073709.6M");
        assert!(format_size(u64::MAX).ends_with(" MB"));
    }

    #[test]
    fn sizes() {
        assert_eq!(format_size(47_395_635), "45.2 MB");
        assert_eq!(format_size(2 * MEBIBYTE), "2 MB");
        assert_eq!(format_size(0), "0 MB");
        assert_eq!(format_size(MEBIBYTE / 20 + 1), "0.1 MB");
        assert_eq!(format_size(MEBIBYTE + MEBIBYTE / 4), "1.3 MB");
    }

    #[test]
    fn schemes() {
        assert_eq!(strip_scheme("https://example.com"), "example.com");
        assert_eq!(strip_scheme("HTTP://Example.com/x"), "Example.com/x");
        assert_eq!(strip_scheme("example.com"), "example.com");
        assert_eq!(strip_scheme("ftp://example.com"), "ftp://example.com");
        assert_eq!(strip_scheme("é"), "é");
    }

    #[test]
    fn stars() {
        let stars = Stars::new(4.5);
        assert_eq!((stars.full, stars.half, stars.empty()), (4, true, 0));
        assert_eq!(stars.to_string(), "★★★★★ 4.5");

        let stars = Stars::new(3.2);
        assert_eq!((stars.full, stars.half, stars.empty()), (3, false, 2));
        assert_eq!(stars.to_string(), "★★★☆☆ 3.2");

        assert_eq!(Stars::new(0.0).to_string(), "☆☆☆☆☆ 0.0");
        assert_eq!(Stars::new(7.0).filled(), 5);
    }
}
