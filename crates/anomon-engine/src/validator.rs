use anomon_common::types::{RuleDraft, Severity};
use anomon_detector::validate_expression;

use crate::duration::parse_positive_duration;
use crate::error::InvalidRule;

const MAX_NAME_LEN: usize = 64;

fn is_valid_name(name: &str) -> bool {
    (1..=MAX_NAME_LEN).contains(&name.len())
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// A set condition needs a finite threshold; an absent one counts as missing.
fn condition_ok(kind: &Option<String>, threshold: Option<f64>) -> bool {
    match kind.as_deref() {
        Some(k) if !k.is_empty() => threshold.is_some_and(f64::is_finite),
        _ => true,
    }
}

/// Checks a candidate rule, stopping at the first failure. Pure; never
/// touches the store or the network.
pub fn validate(rule: &RuleDraft) -> Result<(), InvalidRule> {
    if !is_valid_name(&rule.name) {
        return Err(InvalidRule::Name);
    }
    validate_expression(&rule.expression).map_err(InvalidRule::Expression)?;
    if !condition_ok(&rule.subhealth_condition_type, rule.subhealth_threshold) {
        return Err(InvalidRule::SubhealthThreshold);
    }
    if !condition_ok(&rule.fault_condition_type, rule.fault_threshold) {
        return Err(InvalidRule::FaultThreshold);
    }
    if rule.severity.parse::<Severity>().is_err() {
        return Err(InvalidRule::Severity);
    }
    parse_positive_duration(&rule.duration).map_err(InvalidRule::Duration)?;
    Ok(())
}
