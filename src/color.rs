//! Color conversions used by the effects
//!
//! All effect math is done on normalized [`ColorF`] values and converted to 8-bit channels
//! at the very end. The conversion truncates instead of rounding, so that frames are bit-exact
//! with what the keyboard has always been sent.

mod utils;
pub use utils::*;
