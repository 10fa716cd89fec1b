mod blocking;
mod collection;
mod config;
mod coordinator;
mod csrf;
mod error;
mod files;
mod icons;
mod model;
mod render;
mod request;
mod select;
mod services;
mod source;
mod tool;
mod transfer;

pub use crate::blocking::*;
pub use crate::collection::*;
pub use crate::config::*;
pub use crate::coordinator::*;
pub use crate::csrf::*;
pub use crate::error::*;
pub use crate::files::*;
pub use crate::icons::*;
pub use crate::model::*;
pub use crate::render::*;
pub use crate::request::*;
pub use crate::select::*;
pub use crate::services::*;
pub use crate::source::*;
pub use crate::tool::*;
pub use crate::transfer::*;
