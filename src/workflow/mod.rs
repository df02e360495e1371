//! Pure workflow core: the order status machine, the task stage model,
//! order-status propagation and the assignment scoring policy.
//!
//! Nothing in this module touches the database; services feed it
//! snapshots and apply its decisions.

pub mod propagation;
pub mod scoring;
pub mod stage;
pub mod status;

pub use propagation::{derive_order_status, TaskSnapshot};
pub use scoring::{
    rank_candidates, CandidateProfile, RankedCandidate, ScoringStrategy, TaskContext,
    WeightedScorer, WorkloadSnapshot,
};
pub use stage::{Priority, TaskStage, TaskStatus};
pub use status::OrderStatus;
