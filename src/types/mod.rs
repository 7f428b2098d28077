// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent name confusion at compile time.

mod id;
mod namespace_name;

pub use id::{BuildName, PodName};
pub use namespace_name::{NamespaceName, NamespaceNameError};
