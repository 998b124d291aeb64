//! Run parameters and the layer compositor.

pub mod compositor;
pub mod model;
