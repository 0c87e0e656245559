//! Rule lifecycle and analysis read paths.
//!
//! [`RuleService`] runs every rule mutation through validate, persist and
//! notify, in that order. A notify failure never undoes the persisted change;
//! it surfaces as [`EngineError::NotifyFailed`] so the caller knows the
//! detector may be stale. [`AnalysisAccessor`] lists and deletes detection
//! results and rebuilds the metric window behind one of them.

pub mod analysis;
pub mod duration;
pub mod error;
pub mod service;
pub mod validator;


pub use analysis::AnalysisAccessor;
pub use error::{EngineError, InvalidRule, Result};
pub use service::RuleService;
pub use validator::validate;
