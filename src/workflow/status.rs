use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Lifecycle status of an order. Stored in the database as its
/// snake_case string form.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    Received,
    Cutting,
    Stitching,
    QualityCheck,
    Pressing,
    Ready,
    Delivered,
    Cancelled,
}

/// Exhaustive transition table. Adding a stage is a data change here,
/// not a code change in the engine.
static TRANSITIONS: &[(OrderStatus, &[OrderStatus])] = &[
    (
        OrderStatus::Received,
        &[OrderStatus::Cutting, OrderStatus::Cancelled],
    ),
    (
        OrderStatus::Cutting,
        &[OrderStatus::Stitching, OrderStatus::Cancelled],
    ),
    (
        OrderStatus::Stitching,
        &[OrderStatus::QualityCheck, OrderStatus::Cancelled],
    ),
    (
        OrderStatus::QualityCheck,
        &[OrderStatus::Pressing, OrderStatus::Cancelled],
    ),
    (
        OrderStatus::Pressing,
        &[OrderStatus::Ready, OrderStatus::Cancelled],
    ),
    (
        OrderStatus::Ready,
        &[OrderStatus::Delivered, OrderStatus::Cancelled],
    ),
    (OrderStatus::Delivered, &[]),
    (OrderStatus::Cancelled, &[]),
];

impl OrderStatus {
    /// The set of statuses this status may transition to.
    pub fn allowed_targets(self) -> &'static [OrderStatus] {
        TRANSITIONS
            .iter()
            .find(|(from, _)| *from == self)
            .map(|(_, targets)| *targets)
            .unwrap_or(&[])
    }

    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Terminal statuses have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }

    /// Statuses that count as "open" for overdue computation.
    pub fn is_open(self) -> bool {
        !matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}
