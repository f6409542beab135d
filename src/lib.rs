//! A display-device abstraction for 2D rendering.
//!
//! An [`Lcd`] wraps a [`Backend`] (a software framebuffer, a GPU surface,
//! a simulated display, ...) and gives drawing code one interface for all
//! of them: a begin/end frame lifecycle, a small drawing state (global alpha
//! and three colors), raster primitives, and an optional [`VgCanvas`] for
//! path rendering.

mod bitmap;
mod color;
mod error;
mod frame;
mod lcd;
mod path;
mod state;
mod types;
mod vg;

pub mod backend;

pub use backend::{Backend, ErasedBackend};
pub use bitmap::{Bitmap, BitmapId, Glyph};
pub use color::Color;
pub use error::{DeviceState, Error, ErrorKind, Result};
pub use frame::Frame;
pub use lcd::Lcd;
pub use path::{Path, PathBuilder, PathSegment};
pub use state::DrawState;
pub use types::{FillRule, LineCap, LineJoin, Point, Rect, StrokeSettings};
pub use vg::VgCanvas;

pub extern crate glam;
