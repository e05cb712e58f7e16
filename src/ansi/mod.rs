//! ANSI-aware text primitives shared by search, hyperlinks and the viewport.
//!
//! A styled line interleaves control sequences (SGR style changes, OSC 8
//! hyperlink markers) with visible glyphs. Everything here measures and cuts
//! by visible codepoints and treats a control sequence as one atomic unit.

pub mod clip;
pub mod sgr;
pub mod strip;

pub use clip::{clip_line, composite};
pub use strip::{strip, strip_with_mapping, visible_len};
