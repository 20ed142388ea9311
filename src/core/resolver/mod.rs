//! Destination folder resolution
//!
//! Maps a record's [`DestinationKey`](crate::domain::DestinationKey) to a
//! folder id: cache first, then a remote lookup, then a create.

pub mod cache;
pub mod destination;

pub use cache::ContainerCache;
pub use destination::{DestinationResolver, Resolution, ResolutionOrigin};
