//! Closed enumerations for the coded answers the recoder depends on.
//!
//! Source files store these as codes with display labels; the labels are the
//! stable part across survey rounds, so parsing goes through the label.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cigarette smoking behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmokingStatus {
    /// I smoke daily
    Daily,
    /// I smoke but not every day
    NotEveryDay,
    /// I don't smoke now but I used to
    Former,
    /// I have only smoked a few times
    FewTimes,
    /// I have never smoked
    Never,
}

impl SmokingStatus {
    pub const ALL: [SmokingStatus; 5] = [
        SmokingStatus::Daily,
        SmokingStatus::NotEveryDay,
        SmokingStatus::Former,
        SmokingStatus::FewTimes,
        SmokingStatus::Never,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SmokingStatus::Daily => "I smoke daily",
            SmokingStatus::NotEveryDay => "I smoke but not every day",
            SmokingStatus::Former => "I don't smoke now but I used to",
            SmokingStatus::FewTimes => "I have only smoked a few times",
            SmokingStatus::Never => "I have never smoked",
        }
    }

    /// Parse a display label. Labels outside the five categories yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = canonical_label(label);
        Self::ALL
            .into_iter()
            .find(|status| canonical_label(status.as_str()) == wanted)
    }

    pub fn is_current_smoker(&self) -> bool {
        matches!(self, SmokingStatus::Daily | SmokingStatus::NotEveryDay)
    }
}

impl fmt::Display for SmokingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How often the respondent drinks alcohol.
///
/// Exactly one value per unit. `Daily` is the baseline category the
/// questionnaire reports quantities for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlcoholFrequency {
    Daily,
    SeveralTimesAWeek,
    OnceAWeek,
    TwoToThreeTimesAMonth,
    OnceAMonth,
    LessThanOnceAMonth,
    Never,
}

impl AlcoholFrequency {
    const NAMED: [AlcoholFrequency; 6] = [
        AlcoholFrequency::SeveralTimesAWeek,
        AlcoholFrequency::OnceAWeek,
        AlcoholFrequency::TwoToThreeTimesAMonth,
        AlcoholFrequency::OnceAMonth,
        AlcoholFrequency::LessThanOnceAMonth,
        AlcoholFrequency::Never,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlcoholFrequency::Daily => "Every day",
            AlcoholFrequency::SeveralTimesAWeek => "Several times a week",
            AlcoholFrequency::OnceAWeek => "Once a week",
            AlcoholFrequency::TwoToThreeTimesAMonth => "2-3 times a month",
            AlcoholFrequency::OnceAMonth => "Once a month",
            AlcoholFrequency::LessThanOnceAMonth => "Less than once a month",
            AlcoholFrequency::Never => "Never",
        }
    }

    /// Parse a display label.
    ///
    /// Any present label other than the six named categories is the
    /// daily-implied baseline.
    pub fn from_label(label: &str) -> Self {
        let wanted = canonical_label(label);
        Self::NAMED
            .into_iter()
            .find(|frequency| canonical_label(frequency.as_str()) == wanted)
            .unwrap_or(AlcoholFrequency::Daily)
    }
}

impl fmt::Display for AlcoholFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a unit completed the interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Respondent,
    NonRespondent,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Respondent => "respondent",
            ResponseStatus::NonRespondent => "non-respondent",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Case-insensitive, whitespace-collapsed label with typographic apostrophes
/// folded to ASCII.
fn canonical_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(['\u{2019}', '\u{2018}'], "'")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoking_labels_round_trip() {
        for status in SmokingStatus::ALL {
            assert_eq!(SmokingStatus::from_label(status.as_str()), Some(status));
        }
    }

    #[test]
    fn smoking_label_matching_is_lenient_on_case_and_apostrophes() {
        assert_eq!(
            SmokingStatus::from_label("I don\u{2019}t smoke now but I used to"),
            Some(SmokingStatus::Former)
        );
        assert_eq!(
            SmokingStatus::from_label("  i have NEVER   smoked "),
            Some(SmokingStatus::Never)
        );
        assert_eq!(SmokingStatus::from_label("Refusal"), None);
    }

    #[test]
    fn current_smokers() {
        assert!(SmokingStatus::Daily.is_current_smoker());
        assert!(SmokingStatus::NotEveryDay.is_current_smoker());
        assert!(!SmokingStatus::Former.is_current_smoker());
        assert!(!SmokingStatus::FewTimes.is_current_smoker());
        assert!(!SmokingStatus::Never.is_current_smoker());
    }

    #[test]
    fn alcohol_frequency_labels() {
        assert_eq!(
            AlcoholFrequency::from_label("Several times a week"),
            AlcoholFrequency::SeveralTimesAWeek
        );
        assert_eq!(
            AlcoholFrequency::from_label("2-3 times a month"),
            AlcoholFrequency::TwoToThreeTimesAMonth
        );
        assert_eq!(AlcoholFrequency::from_label("never"), AlcoholFrequency::Never);
        assert_eq!(
            AlcoholFrequency::from_label("Every day"),
            AlcoholFrequency::Daily
        );
        assert_eq!(
            AlcoholFrequency::from_label("Almost every day"),
            AlcoholFrequency::Daily
        );
    }
}
