use crate::error::{CoachError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timeframe used when the user leaves the desired-state timeframe blank.
pub const DEFAULT_TIMEFRAME: &str = "3-6 місяців";

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// The five life domains described in both the current and desired state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Emotional,
    Mental,
    Career,
    Relationships,
    Physical,
}

impl Domain {
    pub fn all() -> &'static [Domain] {
        &[
            Domain::Emotional,
            Domain::Mental,
            Domain::Career,
            Domain::Relationships,
            Domain::Physical,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Emotional => "emotional",
            Domain::Mental => "mental",
            Domain::Career => "career",
            Domain::Relationships => "relationships",
            Domain::Physical => "physical",
        }
    }

    /// Label used inside prompts.
    pub fn label(self) -> &'static str {
        match self {
            Domain::Emotional => "Емоційний стан",
            Domain::Mental => "Ментальний стан",
            Domain::Career => "Кар'єра",
            Domain::Relationships => "Стосунки",
            Domain::Physical => "Фізичний стан",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "emotional" => Ok(Domain::Emotional),
            "mental" => Ok(Domain::Mental),
            "career" => Ok(Domain::Career),
            "relationships" => Ok(Domain::Relationships),
            "physical" => Ok(Domain::Physical),
            _ => Err(format!("unknown domain: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Current,
    Desired,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateKind::Current => f.write_str("current state"),
            StateKind::Desired => f.write_str("desired state"),
        }
    }
}

// ---------------------------------------------------------------------------
// CurrentState / DesiredState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentState {
    #[serde(default)]
    pub emotional: String,
    #[serde(default)]
    pub mental: String,
    #[serde(default)]
    pub career: String,
    #[serde(default)]
    pub relationships: String,
    #[serde(default)]
    pub physical: String,
    /// Free-form "what needs solving" note; optional.
    #[serde(default)]
    pub needs_to_solve: String,
}

impl CurrentState {
    pub fn domain(&self, domain: Domain) -> &str {
        match domain {
            Domain::Emotional => &self.emotional,
            Domain::Mental => &self.mental,
            Domain::Career => &self.career,
            Domain::Relationships => &self.relationships,
            Domain::Physical => &self.physical,
        }
    }

    pub fn domain_mut(&mut self, domain: Domain) -> &mut String {
        match domain {
            Domain::Emotional => &mut self.emotional,
            Domain::Mental => &mut self.mental,
            Domain::Career => &mut self.career,
            Domain::Relationships => &mut self.relationships,
            Domain::Physical => &mut self.physical,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredState {
    #[serde(default)]
    pub emotional: String,
    #[serde(default)]
    pub mental: String,
    #[serde(default)]
    pub career: String,
    #[serde(default)]
    pub relationships: String,
    #[serde(default)]
    pub physical: String,
    #[serde(default)]
    pub timeframe: String,
}

impl DesiredState {
    pub fn domain(&self, domain: Domain) -> &str {
        match domain {
            Domain::Emotional => &self.emotional,
            Domain::Mental => &self.mental,
            Domain::Career => &self.career,
            Domain::Relationships => &self.relationships,
            Domain::Physical => &self.physical,
        }
    }

    pub fn domain_mut(&mut self, domain: Domain) -> &mut String {
        match domain {
            Domain::Emotional => &mut self.emotional,
            Domain::Mental => &mut self.mental,
            Domain::Career => &mut self.career,
            Domain::Relationships => &mut self.relationships,
            Domain::Physical => &mut self.physical,
        }
    }

    /// The timeframe, or [`DEFAULT_TIMEFRAME`] when left blank.
    pub fn timeframe_or_default(&self) -> &str {
        let t = self.timeframe.trim();
        if t.is_empty() {
            DEFAULT_TIMEFRAME
        } else {
            t
        }
    }
}

// ---------------------------------------------------------------------------
// UserInfo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub age: String,
    pub gender: String,
}

impl UserInfo {
    pub fn new(
        name: impl Into<String>,
        age: impl Into<String>,
        gender: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age: age.into(),
            gender: gender.into(),
        }
    }

    /// True when the gender field reads as feminine ("жіноча", "female", "ж", "f").
    pub fn is_feminine(&self) -> bool {
        let g = self.gender.trim().to_lowercase();
        g.starts_with("жін") || g == "ж" || g.starts_with("fem") || g == "f"
    }
}

// ---------------------------------------------------------------------------
// GeneratedPlan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub title: String,
    pub description: String,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPlan {
    pub summary: String,
    pub reasoning: String,
    pub timeframe: String,
    pub steps: Vec<Step>,
}

impl GeneratedPlan {
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(CoachError::MalformedResponse(
                "plan contains no steps".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SongData
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongData {
    pub title: String,
    pub lyrics: String,
}

impl SongData {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() || self.lyrics.trim().is_empty() {
            return Err(CoachError::MalformedResponse(
                "song is missing a title or lyrics".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_state_uses_camel_case_keys() {
        let state = CurrentState {
            needs_to_solve: "sleep".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"needsToSolve\":\"sleep\""));
    }

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let state: CurrentState = serde_json::from_str(r#"{"emotional":"ok"}"#).unwrap();
        assert_eq!(state.emotional, "ok");
        assert!(state.needs_to_solve.is_empty());
    }

    #[test]
    fn domain_accessors_cover_every_field() {
        let mut desired = DesiredState::default();
        for d in Domain::all() {
            *desired.domain_mut(*d) = d.as_str().to_string();
        }
        assert_eq!(desired.career, "career");
        assert_eq!(desired.domain(Domain::Physical), "physical");
    }

    #[test]
    fn blank_timeframe_falls_back() {
        let desired = DesiredState {
            timeframe: "  ".into(),
            ..Default::default()
        };
        assert_eq!(desired.timeframe_or_default(), DEFAULT_TIMEFRAME);
    }

    #[test]
    fn plan_without_steps_is_rejected() {
        let plan = GeneratedPlan {
            summary: "s".into(),
            reasoning: "r".into(),
            timeframe: "t".into(),
            steps: vec![],
        };
        assert!(matches!(
            plan.validate(),
            Err(CoachError::MalformedResponse(_))
        ));
    }

    #[test]
    fn feminine_gender_detection() {
        assert!(UserInfo::new("Оля", "29", "жіноча").is_feminine());
        assert!(UserInfo::new("Ann", "30", "Female").is_feminine());
        assert!(!UserInfo::new("Олег", "31", "чоловіча").is_feminine());
    }
}
