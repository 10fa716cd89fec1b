mod host;
mod node;
mod registry;
mod tool;
mod value;

pub use crate::host::*;
pub use crate::node::*;
pub use crate::registry::*;
pub use crate::tool::*;
pub use crate::value::*;
