use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Longest identity string put on the wire, in display columns.
pub const MAX_LABEL_WIDTH: usize = 127;

/// Cut `s` so it occupies at most `max_width` display columns. Unlike a
/// terminal cell there is no ellipsis: consumers match on these names.
pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

pub fn bounded_label(s: &str) -> String {
    truncate_unicode(s, MAX_LABEL_WIDTH)
}

/// "16 GB Memory" for whole-ish sizes, "15.6 GB Memory" otherwise.
pub fn memory_label(bytes: u64) -> String {
    const GB: f64 = 1024.0 * 1024.0 * 1024.0;

    let total_gb = bytes as f64 / GB;
    if total_gb - total_gb.trunc() < 0.1 {
        format!("{} GB Memory", total_gb.trunc() as u64)
    } else {
        format!("{total_gb:.1} GB Memory")
    }
}

pub fn round_2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_labels_pass_through() {
        assert_eq!(bounded_label("Intel i915"), "Intel i915");
    }

    #[test]
    fn long_labels_are_cut_to_width() {
        let long = "x".repeat(300);
        assert_eq!(bounded_label(&long).len(), MAX_LABEL_WIDTH);
    }

    #[test]
    fn wide_characters_count_double() {
        let cut = truncate_unicode("显卡显卡", 5);
        assert_eq!(cut, "显卡");
        assert!(cut.width() <= 5);
    }

    #[test]
    fn memory_label_rounds_near_whole_sizes() {
        assert_eq!(memory_label(16 * 1024 * 1024 * 1024), "16 GB Memory");
        assert_eq!(memory_label(16 * 1024 * 1024 * 1024 + 50 * 1024 * 1024), "16 GB Memory");
        assert_eq!(memory_label(15 * 1024 * 1024 * 1024 + 700 * 1024 * 1024), "15.7 GB Memory");
    }

    #[test]
    fn round_two_decimals() {
        assert_eq!(round_2(12.345_6), 12.35);
        assert_eq!(round_2(0.0), 0.0);
    }
}
