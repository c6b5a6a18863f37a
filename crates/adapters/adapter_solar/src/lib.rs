//! # autotheme-adapter-solar
//!
//! [`AstronomicalClock`](autotheme_app::ports::AstronomicalClock) backed by
//! the NOAA general solar position approximation. Accurate to a couple of
//! minutes between the polar circles, which is plenty for theme switching.

mod noaa;

pub use noaa::NoaaSolarClock;
