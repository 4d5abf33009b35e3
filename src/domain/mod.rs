//! Domain models and types for msgexport.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Stored search definitions** ([`Search`], [`Query`], [`SearchType`], [`MessageList`])
//! - **Export requests** ([`MessagesRequest`], [`ResultFormat`], [`Sort`])
//! - **Export output** ([`SimpleMessage`], [`SimpleMessageChunk`])
//! - **Time ranges** ([`TimeRange`], [`DerivedTimeRange`], [`AbsoluteRange`])
//! - **Error types** ([`ExportError`], [`EngineError`]) and the [`Result`] alias
//!
//! # Building a request
//!
//! ```rust
//! use msgexport::domain::{MessagesRequest, TimeRange};
//!
//! # fn example() -> msgexport::domain::Result<()> {
//! let request = MessagesRequest::builder(TimeRange::relative(3600))
//!     .query_string("level:3")
//!     .chunk_size(500)
//!     .build()?;
//!
//! assert_eq!(request.fields_in_order(), ["timestamp", "source", "message"]);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod message;
pub mod request;
pub mod result;
pub mod search;
pub mod time_range;

// Re-export commonly used types for convenience
pub use errors::{EngineError, ExportError};
pub use message::{SimpleMessage, SimpleMessageChunk};
pub use request::{
    MessagesRequest, MessagesRequestBuilder, ResultFormat, Sort, SortOrder, DEFAULT_CHUNK_SIZE,
    DEFAULT_FIELDS,
};
pub use result::Result;
pub use search::{
    DecoratorConfig, DecoratorKind, MessageList, OtherSearchType, Parameter, Query, Search,
    SearchType,
};
pub use time_range::{AbsoluteRange, DerivedTimeRange, TimeRange};
