//! # Property Graph Model
//!
//! Clean DTOs describing one captured snapshot of a property graph.
//! These types cross every boundary: source ↔ identity ↔ planner ↔ statements.
//!
//! Design rule: this module is pure data — no I/O, no state, no async.

pub mod node;
pub mod relationship;
pub mod value;
pub mod property_map;
pub mod schema;
pub mod snapshot;

pub use node::{Node, NodeId};
pub use relationship::{Relationship, RelId};
pub use value::{IsoDuration, Value};
pub use property_map::PropertyMap;
pub use schema::{Constraint, ConstraintKind, ConstraintScope, Index};
pub use snapshot::GraphSnapshot;
