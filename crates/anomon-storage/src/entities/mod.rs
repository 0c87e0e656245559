pub mod analysis;
pub mod rule;
