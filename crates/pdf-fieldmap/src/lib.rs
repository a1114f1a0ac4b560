pub mod constants;
pub mod coords;
pub mod filename;
pub mod font;
pub mod mapping;
mod options;
pub mod pipeline;
mod rows;
pub mod session;
pub mod sink;
pub mod stamp;
pub mod template;
mod types;

pub use coords::{DocPoint, RasterScale, to_document, to_raster};
pub use filename::{FilenameSpec, compose, default_base};
pub use font::{FileFont, FontLocation, FontProgram, FontSource, StaticFont};
#[cfg(feature = "remote-font")]
pub use font::RemoteFont;
pub use mapping::{FieldMapping, MappingSet};
pub use options::*;
pub use pipeline::{BatchJob, CancelFlag, RunControl, generate_documents};
pub use rows::*;
pub use session::{MappingSession, PageRenderer, PlacementError, PlacementState, RenderedPage};
pub use sink::{DirectorySink, MemorySink, OutputSink, emit_paced};
pub use template::{PageSize, Template};
pub use types::*;
