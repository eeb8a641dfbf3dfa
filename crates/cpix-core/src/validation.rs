//! Model invariant checks, run by every mutating document operation.

use crate::content_key::ContentKey;
use crate::error::ValidationError;
use crate::types::KeyId;
use crate::usage_rule::UsageRule;

/// Validate a usage rule against the keys of its document.
///
/// This performs:
/// - Key reference check (the rule must not dangle)
/// - Filter parameter checks
pub fn validate_usage_rule(rule: &UsageRule, keys: &[ContentKey]) -> Result<(), ValidationError> {
    if !keys.iter().any(|k| k.id == rule.key_id) {
        return Err(ValidationError::UnknownKeyId(rule.key_id));
    }
    validate_filters(rule)
}

/// Validate filter parameters without checking the key reference.
pub fn validate_filters(rule: &UsageRule) -> Result<(), ValidationError> {
    if let Some(time) = &rule.time_filter {
        if !time.is_valid() {
            return Err(ValidationError::InvalidTimeWindow);
        }
    }

    if let Some(video) = &rule.video_filter {
        if let (Some(min), Some(max)) = (video.min_pixels, video.max_pixels) {
            if min > max {
                return Err(ValidationError::InvalidPixelRange { min, max });
            }
        }
    }

    if let Some(bitrate) = &rule.bitrate_filter {
        if let (Some(min), Some(max)) = (bitrate.min_bitrate, bitrate.max_bitrate) {
            if min > max {
                return Err(ValidationError::InvalidBitrateRange { min, max });
            }
        }
    }

    if let Some(label) = &rule.label_filter {
        if label.label.is_empty() {
            return Err(ValidationError::EmptyLabel);
        }
    }

    Ok(())
}

/// Check that `id` is not already used by a key in `keys`.
pub fn validate_unique_key(keys: &[ContentKey], id: &KeyId) -> Result<(), ValidationError> {
    if keys.iter().any(|k| &k.id == id) {
        return Err(ValidationError::DuplicateKeyId(*id));
    }
    Ok(())
}
