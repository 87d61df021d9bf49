//! Optional extensions to the base camera controller.

pub mod look_to;
#[cfg(feature = "extension_target_indicator")]
pub mod target_indicator;
