//! Default label normalizer.
//!
//! A conservative stand-in for full ENSIP-15 normalization: lowercase, NFC,
//! and rejection of labels that can never be valid. Hosts needing the
//! confusable-resistant rules plug their own [`LabelNormalizer`] into the tree.

use unicode_normalization::UnicodeNormalization;

use enscribe_core::error::{EnscribeError, Result};
use enscribe_core::traits::LabelNormalizer;

/// Lowercasing, NFC-composing label normalizer.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicNormalizer;

impl LabelNormalizer for BasicNormalizer {
    fn normalize(&self, label: &str) -> Result<String> {
        let invalid = |reason: &str| EnscribeError::InvalidLabel {
            label: label.into(),
            reason: reason.into(),
        };

        if label.is_empty() {
            return Err(invalid("empty label"));
        }
        let normalized: String = label.to_lowercase().nfc().collect();
        if normalized.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(invalid("whitespace or control character"));
        }
        Ok(normalized)
    }
}
