//! Usage rules: which content key applies under which conditions.
//!
//! A rule binds one content key to zero or more filters. The engine stores
//! and round-trips filters; choosing between overlapping rules is left to the
//! packager that consumes the document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::KeyId;

/// A time window, half-open: `[start, end)`. Either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeFilter {
    /// A window between two instants.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Whether `t` falls inside the window.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| t >= s) && self.end.map_or(true, |e| t < e)
    }

    /// A window is valid unless both bounds are set and `start >= end`.
    pub fn is_valid(&self) -> bool {
        match (self.start, self.end) {
            (Some(s), Some(e)) => s < e,
            _ => true,
        }
    }
}

/// Video pixel-count bounds, inclusive: `[min_pixels, max_pixels]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VideoFilter {
    pub min_pixels: Option<u64>,
    pub max_pixels: Option<u64>,
}

impl VideoFilter {
    /// Bounds on both sides.
    pub fn between(min_pixels: u64, max_pixels: u64) -> Self {
        Self {
            min_pixels: Some(min_pixels),
            max_pixels: Some(max_pixels),
        }
    }

    /// Whether a frame of `pixels` pixels is accepted.
    pub fn accepts(&self, pixels: u64) -> bool {
        self.min_pixels.map_or(true, |m| pixels >= m)
            && self.max_pixels.map_or(true, |m| pixels <= m)
    }
}

/// Marks a rule as applying to audio tracks. Carries no parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioFilter;

/// Bitrate bounds in bits per second, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BitrateFilter {
    pub min_bitrate: Option<u64>,
    pub max_bitrate: Option<u64>,
}

impl BitrateFilter {
    pub fn accepts(&self, bitrate: u64) -> bool {
        self.min_bitrate.map_or(true, |m| bitrate >= m)
            && self.max_bitrate.map_or(true, |m| bitrate <= m)
    }
}

/// Matches tracks carrying a given label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelFilter {
    pub label: String,
}

impl LabelFilter {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn accepts(&self, label: &str) -> bool {
        self.label == label
    }
}

/// Binds a content key to the conditions under which it is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRule {
    pub key_id: KeyId,
    pub time_filter: Option<TimeFilter>,
    pub video_filter: Option<VideoFilter>,
    pub audio_filter: Option<AudioFilter>,
    pub bitrate_filter: Option<BitrateFilter>,
    pub label_filter: Option<LabelFilter>,
}

/// CPIX calls usage rules "key assignment rules" in some profiles.
pub type AssignmentRule = UsageRule;

impl UsageRule {
    /// A rule without filters; it matches unconditionally.
    pub fn new(key_id: KeyId) -> Self {
        Self {
            key_id,
            time_filter: None,
            video_filter: None,
            audio_filter: None,
            bitrate_filter: None,
            label_filter: None,
        }
    }

    pub fn with_time_filter(mut self, filter: TimeFilter) -> Self {
        self.time_filter = Some(filter);
        self
    }

    pub fn with_video_filter(mut self, filter: VideoFilter) -> Self {
        self.video_filter = Some(filter);
        self
    }

    pub fn with_audio_filter(mut self) -> Self {
        self.audio_filter = Some(AudioFilter);
        self
    }

    pub fn with_bitrate_filter(mut self, filter: BitrateFilter) -> Self {
        self.bitrate_filter = Some(filter);
        self
    }

    pub fn with_label_filter(mut self, filter: LabelFilter) -> Self {
        self.label_filter = Some(filter);
        self
    }

    /// Whether any parameterised filter restricts this rule.
    ///
    /// The audio marker carries no parameters, so an audio-only rule has no
    /// constraints and matches unconditionally.
    pub fn has_constraints(&self) -> bool {
        self.time_filter.is_some()
            || self.video_filter.is_some()
            || self.bitrate_filter.is_some()
            || self.label_filter.is_some()
    }
}
