//! CLI library components for `ess-prep`.

pub mod logging;
pub mod pipeline;
