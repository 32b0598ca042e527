//! labelmade - interactive class labeling for 2D seismic sections.
//!
//! Draw polygons over a rendered trace matrix, tag them with classes 1-9,
//! and export a per-cell label raster as a new SEG-Y file carrying the
//! source file's metadata verbatim.

pub mod annotation;
pub mod app;
pub mod cli;
pub mod controller;
pub mod data;
pub mod display;
pub mod export;
pub mod geometry;
pub mod pick;
pub mod raster;

pub use annotation::{AnnotationSet, PointBuffer, PolygonAnnotation};
pub use cli::{CliError, Options, USAGE};
pub use controller::{AnnotationController, EditCommand, SessionRequest};
pub use data::{Section, SegyError, read_section};
pub use display::{DisplaySurface, InputEvent, Key, MouseButton};
pub use export::{ExportError, export_labels, labeled_output_path};
pub use geometry::{Point, PolygonShape};
pub use pick::VertexLocator;
pub use raster::rasterize;
