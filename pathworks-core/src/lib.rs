//! Device-context path recording and transformation for `PathWorks`.
//!
//! While a path is open on a [`DeviceContext`], every geometric drawing
//! operation is diverted into a growing buffer of `(point, kind)` entries
//! in device coordinates. A sealed path can then be flattened (Beziers to
//! polylines), widened (stroked outline under the current pen), converted
//! to a filled region, read back in logical coordinates, or handed to the
//! output backend as fill/stroke geometry.

pub mod backend;
pub mod dc;
pub mod error;
pub mod path;
pub mod pen;

mod driver;
mod flatten;
mod recorder;
mod region;
mod shapes;
mod text;
mod widen;

pub use backend::{Backend, ClipCombine, NullBackend};
pub use dc::{ArcDirection, DcAttributes, DeviceContext, GraphicsMode};
pub use error::{PathError, Result};
pub use path::{PathBuffer, PointKind};
pub use pen::{EndCap, LineJoin, Pen, PenKind};

pub use kurbo::Affine;
pub use pathworks_graphics::region::{FillMode, Region};
pub use pathworks_graphics::types::Point;
