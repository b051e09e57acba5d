//! Dominant-script language detection.

use crate::language::Lang;

/// Default share of CJK characters above which text is treated as Chinese.
pub const DEFAULT_CJK_THRESHOLD: f64 = 0.3;

/// Classifies text as English or Chinese by the share of CJK ideographs among
/// its non-whitespace characters.
#[derive(Debug, Clone, Copy)]
pub struct LanguageDetector {
    threshold: f64,
}

impl LanguageDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Detect the language of `text`.
    ///
    /// Text without any non-whitespace character, and text whose CJK share is
    /// exactly at the threshold, is classified as English.
    pub fn detect(&self, text: &str) -> Lang {
        let mut total = 0usize;
        let mut cjk = 0usize;
        for ch in text.chars().filter(|c| !c.is_whitespace()) {
            total += 1;
            if is_cjk(ch) {
                cjk += 1;
            }
        }

        if total == 0 {
            return Lang::En;
        }

        let share = cjk as f64 / total as f64;
        if share > self.threshold {
            Lang::Zh
        } else {
            Lang::En
        }
    }
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new(DEFAULT_CJK_THRESHOLD)
    }
}

/// CJK unified ideographs, extensions A through F and compatibility ideographs.
fn is_cjk(ch: char) -> bool {
    matches!(ch as u32,
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0xF900..=0xFAFF
        | 0x20000..=0x2EBEF
        | 0x2F800..=0x2FA1F)
}
