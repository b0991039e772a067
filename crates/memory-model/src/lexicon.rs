//! Emotion and life-area enumerations with their static lookup tables.
//!
//! Keyword tables are ordered slices: the first matching keyword wins, which
//! keeps heuristic extraction deterministic. Concept tables are exhaustive
//! matches over the enums, so adding a variant without its concepts is a
//! compile error.

use serde::{Deserialize, Serialize};

/// Emotional states the model tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Anxiety,
    Sadness,
    Anger,
    Confusion,
    Fear,
    Grief,
    Frustration,
    Guilt,
    Loneliness,
    Stress,
    Overwhelm,
    Hopelessness,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Anxiety => "anxiety",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Confusion => "confusion",
            Emotion::Fear => "fear",
            Emotion::Grief => "grief",
            Emotion::Frustration => "frustration",
            Emotion::Guilt => "guilt",
            Emotion::Loneliness => "loneliness",
            Emotion::Stress => "stress",
            Emotion::Overwhelm => "overwhelm",
            Emotion::Hopelessness => "hopelessness",
        }
    }

    /// Parses a free-form tag (e.g. from generator output) into a variant.
    pub fn from_tag(tag: &str) -> Option<Emotion> {
        match tag.trim().to_lowercase().as_str() {
            "anxiety" | "anxious" | "worry" | "worried" => Some(Emotion::Anxiety),
            "sadness" | "sad" | "depressed" | "depression" => Some(Emotion::Sadness),
            "anger" | "angry" | "rage" => Some(Emotion::Anger),
            "confusion" | "confused" => Some(Emotion::Confusion),
            "fear" | "afraid" | "scared" => Some(Emotion::Fear),
            "grief" | "grieving" => Some(Emotion::Grief),
            "frustration" | "frustrated" => Some(Emotion::Frustration),
            "guilt" | "guilty" => Some(Emotion::Guilt),
            "loneliness" | "lonely" => Some(Emotion::Loneliness),
            "stress" | "stressed" => Some(Emotion::Stress),
            "overwhelm" | "overwhelmed" => Some(Emotion::Overwhelm),
            "hopelessness" | "hopeless" | "despair" => Some(Emotion::Hopelessness),
            _ => None,
        }
    }

    /// Emotions where guidance should lean extra gentle and keep quoted
    /// passages minimal.
    pub fn is_high_distress(&self) -> bool {
        matches!(
            self,
            Emotion::Hopelessness | Emotion::Grief | Emotion::Loneliness
        )
    }
}

/// Reported intensity of an emotion at one point in the arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    #[default]
    Moderate,
    High,
}

impl Intensity {
    pub fn from_tag(tag: &str) -> Option<Intensity> {
        match tag.trim().to_lowercase().as_str() {
            "low" | "mild" => Some(Intensity::Low),
            "moderate" | "medium" => Some(Intensity::Moderate),
            "high" | "severe" => Some(Intensity::High),
            _ => None,
        }
    }
}

/// Areas of life a concern can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifeArea {
    Work,
    Career,
    Family,
    Relationships,
    Health,
    Spiritual,
    Financial,
}

impl LifeArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifeArea::Work => "work",
            LifeArea::Career => "career",
            LifeArea::Family => "family",
            LifeArea::Relationships => "relationships",
            LifeArea::Health => "health",
            LifeArea::Spiritual => "spiritual",
            LifeArea::Financial => "financial",
        }
    }

    pub fn from_tag(tag: &str) -> Option<LifeArea> {
        match tag.trim().to_lowercase().as_str() {
            "work" | "job" => Some(LifeArea::Work),
            "career" => Some(LifeArea::Career),
            "family" => Some(LifeArea::Family),
            "relationships" | "relationship" => Some(LifeArea::Relationships),
            "health" => Some(LifeArea::Health),
            "spiritual" | "spirituality" => Some(LifeArea::Spiritual),
            "financial" | "money" => Some(LifeArea::Financial),
            _ => None,
        }
    }
}

/// Ordered emotion keyword table; first match wins.
pub const EMOTION_KEYWORDS: &[(&str, Emotion)] = &[
    ("anxious", Emotion::Anxiety),
    ("anxiety", Emotion::Anxiety),
    ("worried", Emotion::Anxiety),
    ("worry", Emotion::Anxiety),
    ("nervous", Emotion::Anxiety),
    ("panic", Emotion::Anxiety),
    ("uneasy", Emotion::Anxiety),
    ("afraid", Emotion::Fear),
    ("scared", Emotion::Fear),
    ("terrified", Emotion::Fear),
    ("frightened", Emotion::Fear),
    ("fear", Emotion::Fear),
    ("grieving", Emotion::Grief),
    ("grief", Emotion::Grief),
    ("heartbroken", Emotion::Sadness),
    ("devastated", Emotion::Sadness),
    ("depressed", Emotion::Sadness),
    ("depression", Emotion::Sadness),
    ("miserable", Emotion::Sadness),
    ("unhappy", Emotion::Sadness),
    ("sadness", Emotion::Sadness),
    ("sad", Emotion::Sadness),
    ("furious", Emotion::Anger),
    ("rage", Emotion::Anger),
    ("angry", Emotion::Anger),
    ("anger", Emotion::Anger),
    ("frustrated", Emotion::Frustration),
    ("frustration", Emotion::Frustration),
    ("irritated", Emotion::Frustration),
    ("annoyed", Emotion::Frustration),
    ("fed up", Emotion::Frustration),
    ("stuck", Emotion::Frustration),
    ("confused", Emotion::Confusion),
    ("confusion", Emotion::Confusion),
    ("unclear", Emotion::Confusion),
    ("don't know what", Emotion::Confusion),
    ("guilty", Emotion::Guilt),
    ("guilt", Emotion::Guilt),
    ("ashamed", Emotion::Guilt),
    ("hopeless", Emotion::Hopelessness),
    ("pointless", Emotion::Hopelessness),
    ("meaningless", Emotion::Hopelessness),
    ("worthless", Emotion::Hopelessness),
    ("give up", Emotion::Hopelessness),
    ("lonely", Emotion::Loneliness),
    ("loneliness", Emotion::Loneliness),
    ("isolated", Emotion::Loneliness),
    ("abandoned", Emotion::Loneliness),
    ("disconnected", Emotion::Loneliness),
    ("overwhelmed", Emotion::Overwhelm),
    ("overwhelm", Emotion::Overwhelm),
    ("too much", Emotion::Overwhelm),
    ("drowning", Emotion::Overwhelm),
    ("suffocating", Emotion::Overwhelm),
    ("stressed", Emotion::Stress),
    ("stress", Emotion::Stress),
    ("pressure", Emotion::Stress),
    ("burned out", Emotion::Stress),
    ("burnt out", Emotion::Stress),
];

/// Ordered life-area keyword table; first match wins.
pub const LIFE_AREA_KEYWORDS: &[(&str, LifeArea)] = &[
    ("workplace", LifeArea::Work),
    ("work", LifeArea::Work),
    ("job", LifeArea::Work),
    ("office", LifeArea::Work),
    ("boss", LifeArea::Work),
    ("manager", LifeArea::Work),
    ("colleague", LifeArea::Work),
    ("deadline", LifeArea::Work),
    ("promotion", LifeArea::Career),
    ("career", LifeArea::Career),
    ("profession", LifeArea::Career),
    ("family", LifeArea::Family),
    ("parents", LifeArea::Family),
    ("parent", LifeArea::Family),
    ("mother", LifeArea::Family),
    ("father", LifeArea::Family),
    ("brother", LifeArea::Family),
    ("sister", LifeArea::Family),
    ("relationship", LifeArea::Relationships),
    ("partner", LifeArea::Relationships),
    ("marriage", LifeArea::Relationships),
    ("husband", LifeArea::Relationships),
    ("wife", LifeArea::Relationships),
    ("girlfriend", LifeArea::Relationships),
    ("boyfriend", LifeArea::Relationships),
    ("breakup", LifeArea::Relationships),
    ("health", LifeArea::Health),
    ("illness", LifeArea::Health),
    ("sick", LifeArea::Health),
    ("pain", LifeArea::Health),
    ("sleep", LifeArea::Health),
    ("spiritual", LifeArea::Spiritual),
    ("faith", LifeArea::Spiritual),
    ("meditation", LifeArea::Spiritual),
    ("prayer", LifeArea::Spiritual),
    ("purpose", LifeArea::Spiritual),
    ("meaning", LifeArea::Spiritual),
    ("money", LifeArea::Financial),
    ("debt", LifeArea::Financial),
    ("financial", LifeArea::Financial),
    ("salary", LifeArea::Financial),
    ("broke", LifeArea::Financial),
];

/// Duration phrase table; first match wins.
pub const DURATION_PHRASES: &[(&str, &str)] = &[
    ("years", "for years"),
    ("year", "for about a year"),
    ("months", "for months"),
    ("month", "for about a month"),
    ("weeks", "for weeks"),
    ("week", "for about a week"),
    ("days", "for several days"),
    ("long time", "for a long time"),
    ("always", "for as long as they can remember"),
    ("recently", "recently"),
];

/// Concept tags associated with an emotion, used for retrieval boosting.
pub fn concepts_for_emotion(emotion: Emotion) -> &'static [&'static str] {
    match emotion {
        Emotion::Anxiety => &["surrender", "present moment", "trust", "breath"],
        Emotion::Sadness => &["impermanence", "acceptance", "compassion"],
        Emotion::Anger => &["patience", "forgiveness", "restraint", "calm"],
        Emotion::Confusion => &["discernment", "clarity", "guidance", "wisdom"],
        Emotion::Fear => &["courage", "faith", "protection", "strength"],
        Emotion::Grief => &["impermanence", "acceptance", "eternal", "compassion"],
        Emotion::Frustration => &["patience", "acceptance", "perseverance", "equanimity"],
        Emotion::Guilt => &["forgiveness", "redemption", "renewal"],
        Emotion::Loneliness => &["connection", "devotion", "love", "belonging"],
        Emotion::Stress => &["peace", "balance", "detachment", "breath"],
        Emotion::Overwhelm => &["surrender", "simplicity", "one step", "present moment"],
        Emotion::Hopelessness => &["hope", "grace", "perseverance", "faith"],
    }
}

/// Concept tags associated with a life area.
pub fn concepts_for_life_area(area: LifeArea) -> &'static [&'static str] {
    match area {
        LifeArea::Work => &["duty", "selfless action", "excellence", "balance"],
        LifeArea::Career => &["purpose", "growth", "patience", "calling"],
        LifeArea::Family => &["duty", "love", "patience", "forgiveness"],
        LifeArea::Relationships => &["love", "attachment", "boundaries", "understanding"],
        LifeArea::Health => &["balance", "healing", "acceptance", "body"],
        LifeArea::Spiritual => &["practice", "devotion", "self inquiry", "surrender"],
        LifeArea::Financial => &["contentment", "effort", "trust", "simplicity"],
    }
}
