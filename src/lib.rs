//! `tuxedo_rgb` drives the RGB keyboard backlight of Tuxedo laptops.
//!
//! # Structure
//!
//! The keyboard is split in three zones (left, center, right), each controlled through an
//! LED class attribute. [device::ZoneWriter] writes colors to those attributes.
//! [effects] computes the frames of the available animations and runs looped ones on their
//! own task, and [effect_runner::EffectRunner] makes sure only one of them drives the
//! keyboard at a time.
//!
//! # License
//!
//! This source code is released under the [MIT-License](https://opensource.org/licenses/MIT)

#[macro_use]
extern crate tracing;

pub mod color;
pub mod device;
pub mod effect_runner;
pub mod effects;
pub mod models;
