use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

use super::status::OrderStatus;

/// Workflow stage a task belongs to. Stages are totally ordered by
/// `rank()`; CANCELLED ranks below RECEIVED so it is never picked as the
/// highest or lowest active stage when comparing live work.
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
pub enum TaskStage {
    Received,
    Cutting,
    Stitching,
    QualityCheck,
    Pressing,
    Ready,
    Delivered,
    Cancelled,
}

impl TaskStage {
    /// Numeric rank: RECEIVED=1 .. DELIVERED=7, CANCELLED=0.
    pub fn rank(self) -> u8 {
        match self {
            TaskStage::Cancelled => 0,
            TaskStage::Received => 1,
            TaskStage::Cutting => 2,
            TaskStage::Stitching => 3,
            TaskStage::QualityCheck => 4,
            TaskStage::Pressing => 5,
            TaskStage::Ready => 6,
            TaskStage::Delivered => 7,
        }
    }

    /// Inverse of `rank()` for forward stages. Rank 0 (CANCELLED) has no
    /// forward mapping and returns `None`.
    pub fn from_rank(rank: u8) -> Option<TaskStage> {
        match rank {
            1 => Some(TaskStage::Received),
            2 => Some(TaskStage::Cutting),
            3 => Some(TaskStage::Stitching),
            4 => Some(TaskStage::QualityCheck),
            5 => Some(TaskStage::Pressing),
            6 => Some(TaskStage::Ready),
            7 => Some(TaskStage::Delivered),
            _ => None,
        }
    }

    /// The order status a stage corresponds to when propagation maps a
    /// task stage back onto the parent order.
    pub fn as_order_status(self) -> OrderStatus {
        match self {
            TaskStage::Received => OrderStatus::Received,
            TaskStage::Cutting => OrderStatus::Cutting,
            TaskStage::Stitching => OrderStatus::Stitching,
            TaskStage::QualityCheck => OrderStatus::QualityCheck,
            TaskStage::Pressing => OrderStatus::Pressing,
            TaskStage::Ready => OrderStatus::Ready,
            TaskStage::Delivered => OrderStatus::Delivered,
            TaskStage::Cancelled => OrderStatus::Cancelled,
        }
    }
}

/// Execution status of a task. OVERDUE exists as an explicit status for
/// manual flagging, but overdue-ness is primarily a computed read-time
/// predicate over (deadline, status, now).
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
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl TaskStatus {
    /// Pending and in-progress tasks count toward an employee's active
    /// workload.
    pub fn is_active(self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }
}

/// Priority shared by orders and tasks.
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
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}
