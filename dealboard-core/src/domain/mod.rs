//! Domain types: deals, owners, stages, and their resolved join.

pub mod deal;
pub mod owner;
pub mod resolved;
pub mod stage;

pub use deal::{Deal, Outcome};
pub use owner::Owner;
pub use resolved::ResolvedDeal;
pub use stage::{Stage, IN_FLIGHT_STAGES, STAGE_WINDOW_ROWS};
