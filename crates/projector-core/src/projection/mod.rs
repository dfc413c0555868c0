//! Projection specifications.
//!
//! A specification says, for each destination field, where its value comes
//! from: a member path on the source shape, a named parameter, or a literal
//! written into the specification itself. Specifications are immutable once
//! built and are shared through the registry for the process lifetime.

mod registry;
mod spec;


// re-exports
pub use registry::ProjectionRegistry;
pub use spec::{MemberMap, ProjectionBuilder, ProjectionSpec, SourceDesc, SourcePath};
