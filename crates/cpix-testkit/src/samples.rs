//! Reference documents covering each combination of encryption, signing
//! and usage rules.

use chrono::{Duration, TimeZone, Utc};

use cpix::{AudioFilter, CpixDocument, Result, TimeFilter, UsageRule, VideoFilter};

use crate::fixtures::{author1, author2, generate_content_key, recipient1, recipient2};

/// Pixel count of a 1280x720 frame, the boundary between low and high
/// quality keys.
pub const HD_PIXELS: u64 = 1280 * 720;

/// A named sample document.
#[derive(Debug, Clone)]
pub struct Sample {
    pub name: &'static str,
    pub document: CpixDocument,
}

impl Sample {
    /// File name the producer writes this sample to.
    pub fn file_name(&self) -> String {
        format!("{}.xml", self.name)
    }
}

/// Two clear content keys.
pub fn clear_keys() -> Result<CpixDocument> {
    let mut document = CpixDocument::new();
    document.add_content_key(generate_content_key())?;
    document.add_content_key(generate_content_key())?;
    Ok(document)
}

/// Clear keys, a content key signature and a document signature.
pub fn signed() -> Result<CpixDocument> {
    let mut document = clear_keys()?;
    document.add_content_key_signature(author1().certificate())?;
    document.set_document_signature(author1().certificate())?;
    Ok(document)
}

/// Two keys encrypted for both recipients.
pub fn encrypted() -> Result<CpixDocument> {
    let mut document = clear_keys()?;
    document.add_recipient(recipient1().certificate().clone())?;
    document.add_recipient(recipient2().certificate().clone())?;
    Ok(document)
}

/// Encrypted keys, a content key signature and a document signature.
pub fn encrypted_and_signed() -> Result<CpixDocument> {
    let mut document = encrypted()?;
    document.add_content_key_signature(author1().certificate())?;
    document.set_document_signature(author1().certificate())?;
    Ok(document)
}

/// Five keys selected by period and resolution, plus an audio key, all
/// encrypted, with signatures requested from two authors.
pub fn with_rules_encrypted_and_signed() -> Result<CpixDocument> {
    let mut document = CpixDocument::new();

    let low_period1 = generate_content_key();
    let high_period1 = generate_content_key();
    let low_period2 = generate_content_key();
    let high_period2 = generate_content_key();
    let audio = generate_content_key();

    let period1_start = Utc.with_ymd_and_hms(2016, 6, 6, 6, 10, 0).unwrap();
    let period1 = TimeFilter::between(period1_start, period1_start + Duration::hours(1));
    let period2 = TimeFilter::between(
        period1_start + Duration::hours(1),
        period1_start + Duration::hours(2),
    );
    let low = VideoFilter {
        min_pixels: None,
        max_pixels: Some(HD_PIXELS - 1),
    };
    let high = VideoFilter {
        min_pixels: Some(HD_PIXELS),
        max_pixels: None,
    };

    let rules = [
        UsageRule::new(low_period1.id)
            .with_time_filter(period1)
            .with_video_filter(low),
        UsageRule::new(high_period1.id)
            .with_time_filter(period1)
            .with_video_filter(high),
        UsageRule::new(low_period2.id)
            .with_time_filter(period2)
            .with_video_filter(low),
        UsageRule::new(high_period2.id)
            .with_time_filter(period2)
            .with_video_filter(high),
        UsageRule {
            audio_filter: Some(AudioFilter),
            ..UsageRule::new(audio.id)
        },
    ];

    for key in [low_period1, high_period1, low_period2, high_period2, audio] {
        document.add_content_key(key)?;
    }
    for rule in rules {
        document.add_usage_rule(rule)?;
    }

    document.add_recipient(recipient1().certificate().clone())?;
    document.add_recipient(recipient2().certificate().clone())?;

    document.add_content_key_signature(author1().certificate())?;
    document.add_usage_rule_signature(author2().certificate())?;
    document.set_document_signature(author2().certificate())?;
    Ok(document)
}

/// Every sample, in a stable order.
pub fn all_samples() -> Result<Vec<Sample>> {
    Ok(vec![
        Sample {
            name: "ClearKeys",
            document: clear_keys()?,
        },
        Sample {
            name: "Signed",
            document: signed()?,
        },
        Sample {
            name: "Encrypted",
            document: encrypted()?,
        },
        Sample {
            name: "EncryptedAndSigned",
            document: encrypted_and_signed()?,
        },
        Sample {
            name: "WithRulesAndEncryptedAndSigned",
            document: with_rules_encrypted_and_signed()?,
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::authors;

    #[test]
    fn test_samples_save_and_verify() {
        for mut sample in all_samples().unwrap() {
            let bytes = sample.document.save_signed(&authors()).unwrap();
            let loaded = CpixDocument::load(&bytes, &[recipient1()]).unwrap();
            assert!(
                loaded.verification_results().iter().all(|r| r.is_valid()),
                "{} has an invalid signature",
                sample.name
            );
            assert_eq!(
                loaded.content_keys().len(),
                sample.document.content_keys().len()
            );
            for key in loaded.content_keys() {
                assert!(key.value().is_ok(), "{} key not decrypted", sample.name);
            }
        }
    }

    #[test]
    fn test_rules_sample_layout() {
        let document = with_rules_encrypted_and_signed().unwrap();
        assert_eq!(document.content_keys().len(), 5);
        assert_eq!(document.usage_rules().len(), 5);
        assert_eq!(document.recipients().count(), 2);
        assert_eq!(document.signatures().count(), 3);

        let audio = &document.usage_rules()[4];
        assert!(audio.audio_filter.is_some());
        assert!(audio.video_filter.is_none());
        assert!(audio.time_filter.is_none());
    }
}
