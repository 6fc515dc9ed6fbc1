pub mod buffer;
#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod controller;
pub mod file;
pub mod recorder;
pub mod wav;
