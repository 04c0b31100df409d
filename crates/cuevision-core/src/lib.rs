//! Cuevision core
//!
//! Image-library-free building blocks for table rectification and ball
//! tracking: index selection, color bands, regions, table corners, trajectory
//! tracking and collision detection.

pub mod collision;
pub mod color;
pub mod corners;
pub mod error;
pub mod geometry;
pub mod indexer;
pub mod region;
pub mod tracker;

pub use collision::{CollisionDetector, CollisionEvent, CollisionState};
pub use color::{Channel, ColorRange};
pub use corners::{DestinationSize, TableCorners};
pub use error::VisionError;
pub use geometry::{Circle, Point};
pub use region::Region;
pub use tracker::{BallIdentity, Detection, LastKnownRule, TrackedObject, TrackerConfig};
