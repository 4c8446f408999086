use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Timestamp layout used for persisted records (ISO-8601, local time, microseconds).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Upper bound of the conflict scale.
pub const MAX_CONFLICT_SCORE: u8 = 100;

/// Score assumed for stored records whose score is missing or unusable.
pub const DEFAULT_CONFLICT_SCORE: u8 = 50;

/// Love language the partner responds best to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoveLanguage {
    /// Validating and appreciative language.
    #[default]
    WordsOfAffirmation,

    /// Helping or doing something for the partner.
    ActsOfService,

    /// Thoughtful gifts.
    ReceivingGifts,

    /// Undivided time together.
    QualityTime,

    /// Physical closeness.
    PhysicalTouch,
}

impl LoveLanguage {
    /// Every variant in selector order.
    pub const ALL: [LoveLanguage; 5] = [
        LoveLanguage::WordsOfAffirmation,
        LoveLanguage::ActsOfService,
        LoveLanguage::ReceivingGifts,
        LoveLanguage::QualityTime,
        LoveLanguage::PhysicalTouch,
    ];

    /// Display and storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoveLanguage::WordsOfAffirmation => "Words of Affirmation",
            LoveLanguage::ActsOfService => "Acts of Service",
            LoveLanguage::ReceivingGifts => "Receiving Gifts",
            LoveLanguage::QualityTime => "Quality Time",
            LoveLanguage::PhysicalTouch => "Physical Touch",
        }
    }

    /// Position inside [`LoveLanguage::ALL`].
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    /// Next value in selector order, wrapping around.
    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous value in selector order, wrapping around.
    pub fn previous(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for LoveLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoveLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown love language: {}", needle))
    }
}

impl Serialize for LoveLanguage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Unknown names fall back to the default instead of rejecting the whole document.
impl<'de> Deserialize<'de> for LoveLanguage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_else(|err| {
            tracing::warn!("{}; using {}", err, LoveLanguage::default());
            LoveLanguage::default()
        }))
    }
}

/// User-editable settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub love_language: LoveLanguage,
}

/// Output of the analysis step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub reframed_text: String,
    pub conflict_score: u8,
    pub hidden_need: String,
    pub peace_offering: String,
}

/// One analyzed inbound message. Never mutated after it is appended.
///
/// Older files stored the model output unvalidated, so every field tolerates
/// missing values and loose types rather than rejecting the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub original_text: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub sender: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub reframed_text: String,
    #[serde(default = "default_conflict_score", deserialize_with = "lenient_score")]
    pub conflict_score: u8,
    #[serde(default, deserialize_with = "lenient_text")]
    pub hidden_need: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub peace_offering: String,
}

fn default_conflict_score() -> u8 {
    DEFAULT_CONFLICT_SCORE
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

// Floats are rounded and clamped; anything unusable becomes the default.
fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let number = match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(match number.filter(|n| n.is_finite()) {
        Some(n) => n.round().clamp(0.0, f64::from(MAX_CONFLICT_SCORE)) as u8,
        None => {
            tracing::warn!("unusable conflict score {}; using {}", value, DEFAULT_CONFLICT_SCORE);
            DEFAULT_CONFLICT_SCORE
        }
    })
}

impl MessageRecord {
    /// Merge an analysis with the message it was produced from.
    pub fn from_analysis(
        timestamp: impl Into<String>,
        original_text: impl Into<String>,
        sender: impl Into<String>,
        analysis: Analysis,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            original_text: original_text.into(),
            sender: sender.into(),
            reframed_text: analysis.reframed_text,
            conflict_score: analysis.conflict_score.min(MAX_CONFLICT_SCORE),
            hidden_need: analysis.hidden_need,
            peace_offering: analysis.peace_offering,
        }
    }
}

/// Everything persisted in the shared state file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

impl StateDocument {
    /// Current preference, defaulting when no settings were ever stored.
    pub fn love_language(&self) -> LoveLanguage {
        self.settings
            .map(|s| s.love_language)
            .unwrap_or_default()
    }

    /// Most recent record, if any.
    pub fn latest(&self) -> Option<&MessageRecord> {
        self.messages.last()
    }
}

/// Current local time in the persisted timestamp layout.
pub fn now_timestamp() -> String {
    chrono::Local::now()
        .naive_local()
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn love_language_names_round_trip_through_from_str() {
        for lang in LoveLanguage::ALL {
            assert_eq!(lang.as_str().parse::<LoveLanguage>(), Ok(lang));
        }
        assert_eq!(
            "quality time".parse::<LoveLanguage>(),
            Ok(LoveLanguage::QualityTime)
        );
        assert!("Telepathy".parse::<LoveLanguage>().is_err());
    }

    #[test]
    fn love_language_selector_wraps() {
        assert_eq!(
            LoveLanguage::PhysicalTouch.next(),
            LoveLanguage::WordsOfAffirmation
        );
        assert_eq!(
            LoveLanguage::WordsOfAffirmation.previous(),
            LoveLanguage::PhysicalTouch
        );
    }

    #[test]
    fn unknown_stored_language_falls_back_to_default() {
        let doc: StateDocument =
            serde_json::from_str(r#"{"messages": [], "settings": {"love_language": "Telepathy"}}"#)
                .unwrap();
        assert_eq!(doc.love_language(), LoveLanguage::WordsOfAffirmation);
    }

    #[test]
    fn missing_settings_are_not_serialized() {
        let raw = serde_json::to_value(StateDocument::default()).unwrap();
        assert_eq!(raw, serde_json::json!({ "messages": [] }));
    }

    #[test]
    fn from_analysis_clamps_score() {
        let record = MessageRecord::from_analysis(
            "2026-10-19T10:00:00.000000",
            "hi",
            "whatsapp:+1",
            Analysis {
                reframed_text: "hello".to_string(),
                conflict_score: 250,
                hidden_need: "n".to_string(),
                peace_offering: "p".to_string(),
            },
        );
        assert_eq!(record.conflict_score, 100);
        assert_eq!(record.original_text, "hi");
        assert_eq!(record.sender, "whatsapp:+1");
    }

    #[test]
    fn legacy_shaped_records_are_kept() {
        let raw = r#"{
            "messages": [
                {
                    "timestamp": "2026-10-19T10:00:00.000000",
                    "original_text": "first",
                    "sender": "whatsapp:+1",
                    "reframed_text": "calm first",
                    "conflict_score": 40,
                    "hidden_need": "rest",
                    "peace_offering": "tea"
                },
                {
                    "timestamp": "2026-10-19T10:05:00.000000",
                    "original_text": "second",
                    "sender": "whatsapp:+1",
                    "reframed_text": "calm second",
                    "conflict_score": 72.5,
                    "hidden_need": null
                },
                { "original_text": "third", "conflict_score": "high" }
            ],
            "settings": { "love_language": "Quality Time" }
        }"#;

        let doc: StateDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.messages.len(), 3);
        assert_eq!(doc.love_language(), LoveLanguage::QualityTime);

        let second = &doc.messages[1];
        assert_eq!(second.conflict_score, 73);
        assert_eq!(second.hidden_need, "");
        assert_eq!(second.peace_offering, "");

        let third = &doc.messages[2];
        assert_eq!(third.conflict_score, DEFAULT_CONFLICT_SCORE);
        assert_eq!(third.sender, "");
    }

    #[test]
    fn out_of_range_stored_scores_are_clamped() {
        let record: MessageRecord =
            serde_json::from_str(r#"{"conflict_score": 180.2}"#).unwrap();
        assert_eq!(record.conflict_score, MAX_CONFLICT_SCORE);
        let record: MessageRecord = serde_json::from_str(r#"{"conflict_score": -3}"#).unwrap();
        assert_eq!(record.conflict_score, 0);
    }

    #[test]
    fn now_timestamp_is_parseable() {
        let ts = now_timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok());
    }
}
