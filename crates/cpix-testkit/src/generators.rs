//! Proptest generators for property-based testing.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use cpix::{
    AudioFilter, BitrateFilter, ContentKey, CpixDocument, KeyId, LabelFilter, Result, TimeFilter,
    UsageRule, VideoFilter,
};

use crate::fixtures::{author1, author2, recipient1, recipient2};

/// Generate a random KeyId.
pub fn key_id() -> impl Strategy<Value = KeyId> {
    any::<[u8; 16]>().prop_map(KeyId::from_bytes)
}

/// Generate a clear content key.
pub fn content_key() -> impl Strategy<Value = ContentKey> {
    (key_id(), any::<[u8; 16]>()).prop_map(|(id, value)| ContentKey::new(id, value))
}

/// An instant between 1970 and 2096, whole seconds.
pub fn instant() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_000_000_000).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

/// A valid time window: start strictly before end, either side may be open.
pub fn time_filter() -> impl Strategy<Value = TimeFilter> {
    (instant(), 1i64..10_000_000, any::<bool>(), any::<bool>()).prop_map(
        |(start, length, open_start, open_end)| TimeFilter {
            start: (!open_start).then_some(start),
            end: (!open_end).then(|| start + chrono::Duration::seconds(length)),
        },
    )
}

/// Valid pixel bounds.
pub fn video_filter() -> impl Strategy<Value = VideoFilter> {
    (
        prop::option::of(0u64..10_000_000),
        prop::option::of(0u64..10_000_000),
    )
        .prop_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => VideoFilter::between(a.min(b), a.max(b)),
            (min_pixels, max_pixels) => VideoFilter {
                min_pixels,
                max_pixels,
            },
        })
}

/// Valid bitrate bounds.
pub fn bitrate_filter() -> impl Strategy<Value = BitrateFilter> {
    (
        prop::option::of(0u64..100_000_000),
        prop::option::of(0u64..100_000_000),
    )
        .prop_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => BitrateFilter {
                min_bitrate: Some(a.min(b)),
                max_bitrate: Some(a.max(b)),
            },
            (min_bitrate, max_bitrate) => BitrateFilter {
                min_bitrate,
                max_bitrate,
            },
        })
}

/// A non-empty label, including characters that need escaping in XML.
pub fn label_filter() -> impl Strategy<Value = LabelFilter> {
    "[a-zA-Z0-9 &<>\"'-]{1,16}".prop_map(LabelFilter::new)
}

/// Filters of a usage rule, without the key binding.
#[derive(Debug, Clone)]
pub struct RuleShape {
    pub time_filter: Option<TimeFilter>,
    pub video_filter: Option<VideoFilter>,
    pub audio: bool,
    pub bitrate_filter: Option<BitrateFilter>,
    pub label_filter: Option<LabelFilter>,
}

impl RuleShape {
    pub fn bind(&self, key_id: KeyId) -> UsageRule {
        UsageRule {
            key_id,
            time_filter: self.time_filter,
            video_filter: self.video_filter,
            audio_filter: self.audio.then_some(AudioFilter),
            bitrate_filter: self.bitrate_filter,
            label_filter: self.label_filter.clone(),
        }
    }
}

pub fn rule_shape() -> impl Strategy<Value = RuleShape> {
    (
        prop::option::of(time_filter()),
        prop::option::of(video_filter()),
        any::<bool>(),
        prop::option::of(bitrate_filter()),
        prop::option::of(label_filter()),
    )
        .prop_map(
            |(time_filter, video_filter, audio, bitrate_filter, label_filter)| RuleShape {
                time_filter,
                video_filter,
                audio,
                bitrate_filter,
                label_filter,
            },
        )
}

/// Parameters for generating a document.
#[derive(Debug, Clone)]
pub struct DocumentParams {
    pub keys: Vec<ContentKey>,
    /// Each rule is bound to `keys[index % keys.len()]`; dropped without keys.
    pub rules: Vec<(usize, RuleShape)>,
    /// Number of fixture recipients, 0 to 2.
    pub recipients: usize,
    pub content_id: Option<String>,
    pub sign_keys: bool,
    pub sign_rules: bool,
    pub sign_document: bool,
}

impl Arbitrary for DocumentParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            prop::collection::vec(content_key(), 0..5),
            prop::collection::vec((any::<usize>(), rule_shape()), 0..4),
            0usize..=2,
            prop::option::of("[a-z0-9-]{1,12}"),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(
                |(keys, rules, recipients, content_id, sign_keys, sign_rules, sign_document)| {
                    DocumentParams {
                        keys,
                        rules,
                        recipients,
                        content_id,
                        sign_keys,
                        sign_rules,
                        sign_document,
                    }
                },
            )
            .boxed()
    }
}

impl DocumentParams {
    /// The rules as bound to the generated keys.
    pub fn bound_rules(&self) -> Vec<UsageRule> {
        if self.keys.is_empty() {
            return Vec::new();
        }
        self.rules
            .iter()
            .map(|(index, shape)| shape.bind(self.keys[index % self.keys.len()].id))
            .collect()
    }
}

/// Build a document from parameters, in the order a producer would:
/// keys, rules, recipients, then signatures.
pub fn document_from_params(params: &DocumentParams) -> Result<CpixDocument> {
    let mut document = CpixDocument::new();
    document.set_content_id(params.content_id.clone())?;

    for key in &params.keys {
        document.add_content_key(key.clone())?;
    }
    for rule in params.bound_rules() {
        document.add_usage_rule(rule)?;
    }
    for recipient in [recipient1(), recipient2()].iter().take(params.recipients) {
        document.add_recipient(recipient.certificate().clone())?;
    }

    if params.sign_keys {
        document.add_content_key_signature(author1().certificate())?;
    }
    if params.sign_rules {
        document.add_usage_rule_signature(author2().certificate())?;
    }
    if params.sign_document {
        document.set_document_signature(author1().certificate())?;
    }
    Ok(document)
}
