use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Rule severity. Only these three levels are accepted by the detector.
///
/// # Examples
///
/// ```
/// use anomon_common::types::Severity;
///
/// let sev: Severity = "error".parse().unwrap();
/// assert_eq!(sev, Severity::Error);
/// assert_eq!(sev.to_string(), "error");
/// assert!("info".parse::<Severity>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// A stored detection rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Rule {
    pub id: i64,
    pub name: String,
    /// Metric query expression evaluated by the detector
    pub expression: String,
    pub subhealth_condition_type: Option<String>,
    pub subhealth_threshold: Option<f64>,
    pub fault_condition_type: Option<String>,
    pub fault_threshold: Option<f64>,
    pub severity: String,
    /// Duration string such as `5m` or `1h30m`
    pub duration: String,
    /// Epoch seconds
    pub created_at: i64,
    /// Epoch seconds
    pub updated_at: i64,
}

/// A rule as submitted for creation, before an id and timestamps exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RuleDraft {
    pub name: String,
    pub expression: String,
    #[serde(default)]
    pub subhealth_condition_type: Option<String>,
    /// Number or numeric string
    #[serde(default, deserialize_with = "deserialize_optional_threshold")]
    #[schema(value_type = Option<f64>)]
    pub subhealth_threshold: Option<f64>,
    #[serde(default)]
    pub fault_condition_type: Option<String>,
    /// Number or numeric string
    #[serde(default, deserialize_with = "deserialize_optional_threshold")]
    #[schema(value_type = Option<f64>)]
    pub fault_threshold: Option<f64>,
    pub severity: String,
    pub duration: String,
}

impl RuleDraft {
    /// Treats an empty condition type as "no condition" and drops the
    /// threshold paired with an absent condition.
    pub fn normalize(mut self) -> Self {
        (self.subhealth_condition_type, self.subhealth_threshold) =
            normalize_condition(self.subhealth_condition_type, self.subhealth_threshold);
        (self.fault_condition_type, self.fault_threshold) =
            normalize_condition(self.fault_condition_type, self.fault_threshold);
        self
    }
}

fn normalize_condition(kind: Option<String>, threshold: Option<f64>) -> (Option<String>, Option<f64>) {
    match kind {
        Some(kind) if !kind.is_empty() => (Some(kind), threshold),
        _ => (None, None),
    }
}

/// Partial update of a rule. Absent fields are left untouched; an empty
/// condition type clears that condition together with its threshold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RuleChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(default)]
    pub subhealth_condition_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_threshold")]
    #[schema(value_type = Option<f64>)]
    pub subhealth_threshold: Option<f64>,
    #[serde(default)]
    pub fault_condition_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_threshold")]
    #[schema(value_type = Option<f64>)]
    pub fault_threshold: Option<f64>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

impl Rule {
    /// The rule that results from applying `changes` on top of `self`.
    pub fn merged(&self, changes: &RuleChanges) -> RuleDraft {
        let (subhealth_condition_type, subhealth_threshold) = merge_condition(
            &self.subhealth_condition_type,
            self.subhealth_threshold,
            &changes.subhealth_condition_type,
            changes.subhealth_threshold,
        );
        let (fault_condition_type, fault_threshold) = merge_condition(
            &self.fault_condition_type,
            self.fault_threshold,
            &changes.fault_condition_type,
            changes.fault_threshold,
        );
        RuleDraft {
            name: changes.name.clone().unwrap_or_else(|| self.name.clone()),
            expression: changes
                .expression
                .clone()
                .unwrap_or_else(|| self.expression.clone()),
            subhealth_condition_type,
            subhealth_threshold,
            fault_condition_type,
            fault_threshold,
            severity: changes
                .severity
                .clone()
                .unwrap_or_else(|| self.severity.clone()),
            duration: changes
                .duration
                .clone()
                .unwrap_or_else(|| self.duration.clone()),
        }
    }
}

fn merge_condition(
    current_kind: &Option<String>,
    current_threshold: Option<f64>,
    new_kind: &Option<String>,
    new_threshold: Option<f64>,
) -> (Option<String>, Option<f64>) {
    let kind = match new_kind {
        Some(kind) => Some(kind.clone()),
        None => current_kind.clone(),
    };
    normalize_condition(kind, new_threshold.or(current_threshold))
}

/// A detected episode written by the detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResult {
    pub id: i64,
    /// Rule that produced the episode; the rule may have been deleted since
    pub rule_id: i64,
    /// Rule name at detection time
    pub rule_name: String,
    pub status: String,
    pub count: i64,
    /// Episode start, epoch seconds
    pub created_at: i64,
    /// Episode end, epoch seconds
    pub updated_at: i64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ThresholdInput {
    Number(f64),
    Text(String),
}

/// Accepts a threshold as a JSON number or a numeric string. Text that does
/// not parse becomes NaN so the validator reports it as an invalid rule.
pub fn deserialize_optional_threshold<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<ThresholdInput>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(ThresholdInput::Number(number)) => Ok(Some(number)),
        Some(ThresholdInput::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                Ok(None)
            } else {
                Ok(Some(text.parse::<f64>().unwrap_or(f64::NAN)))
            }
        }
    }
}

/// Accepts an integer id as a JSON number or a numeric string.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdInput {
        Number(i64),
        Text(String),
    }

    match IdInput::deserialize(deserializer)? {
        IdInput::Number(id) => Ok(id),
        IdInput::Text(text) => text.trim().parse::<i64>().map_err(DeError::custom),
    }
}
