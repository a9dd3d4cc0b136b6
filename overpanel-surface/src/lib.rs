//! Visual surface abstraction for the overpanel engine.
//!
//! The engine never talks to a concrete toolkit. Everything it draws goes
//! through the [`Surface`] trait: create and remove nodes, attach text and
//! attributes, flip visual state [`NodeFlags`] and apply a uniform scale.
//!
//! [`MemorySurface`] is a retained node tree implementing the trait. Headless
//! hosts can mirror it into their own renderer, and tests inspect it directly.

mod memory;
mod node;
mod surface;

pub use memory::{MemoryNode, MemorySurface};
pub use node::{NodeFlags, NodeId, NodeRole};
pub use surface::{Surface, SurfaceError};
