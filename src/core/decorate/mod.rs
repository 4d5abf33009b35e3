//! Decorators
//!
//! - [`QueryStringDecorator`] rewrites stored query strings while a request
//!   is built
//! - [`ChunkDecorator`] rewrites delivered chunks for message lists that
//!   declare decorators

pub mod chunk;
pub mod query_string;

pub use chunk::{ChunkDecorator, ConfiguredChunkDecorator};
pub use query_string::{
    NoopQueryStringDecorator, ParameterQueryStringDecorator, QueryStringDecorator,
};
