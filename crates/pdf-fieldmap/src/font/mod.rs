//! Fonts: fetching, metrics, subsetting and embedding

mod embed;
mod program;
mod source;
mod subset;

pub use embed::{EmbeddedFont, embed_subset};
pub use program::{FontProgram, GlyphRun};
#[cfg(feature = "remote-font")]
pub use source::RemoteFont;
pub use source::{FileFont, FontLocation, FontSource, StaticFont};
pub use subset::{FontSubset, subset_font, subset_tag};
