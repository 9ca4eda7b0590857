//! Source image decoding and font discovery.

pub mod decode;
pub mod fonts;
