use serde::{Deserialize, Deserializer, Serialize};

/// Facial features the analysis service comments on, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Jawline,
    Cheekbones,
    Eyes,
    Skin,
    Symmetry,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::Jawline,
        Feature::Cheekbones,
        Feature::Eyes,
        Feature::Skin,
        Feature::Symmetry,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Feature::Jawline => "jawline",
            Feature::Cheekbones => "cheekbones",
            Feature::Eyes => "eyes",
            Feature::Skin => "skin",
            Feature::Symmetry => "symmetry",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Feature::Jawline => "Jawline",
            Feature::Cheekbones => "Cheekbones",
            Feature::Eyes => "Eyes",
            Feature::Skin => "Skin",
            Feature::Symmetry => "Symmetry",
        }
    }
}

/// Per-feature notes. Any key may be omitted by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureReview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jawline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cheekbones: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eyes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symmetry: Option<String>,
}

impl FeatureReview {
    pub fn note(&self, feature: Feature) -> Option<&str> {
        let note = match feature {
            Feature::Jawline => &self.jawline,
            Feature::Cheekbones => &self.cheekbones,
            Feature::Eyes => &self.eyes,
            Feature::Skin => &self.skin,
            Feature::Symmetry => &self.symmetry,
        };
        note.as_deref()
    }

    /// Note for `feature`, or an empty string when the service omitted it.
    pub fn note_or_empty(&self, feature: Feature) -> &str {
        self.note(feature).unwrap_or_default()
    }
}

/// Critique returned by a successful analysis.
///
/// `score` is expected in 1..=10 but is not range-checked; it is displayed as
/// the service reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub review: FeatureReview,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tips: Vec<String>,
}

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
