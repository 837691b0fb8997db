//! Shared pipeline steps for evaluate-style segments.
//!
//! Each step is a plain `fn(&mut Segment) -> MissionResult<()>` mutating
//! `segment.state` in place. Segment types assemble these into their
//! process pipelines; any entry can be replaced or removed per instance.

pub mod initialize;
pub mod iterate;
pub mod post;
