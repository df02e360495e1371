use super::stage::{TaskStage, TaskStatus};
use super::status::OrderStatus;

/// Minimal view of a task that propagation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub stage: TaskStage,
    pub status: TaskStatus,
}

/// Derives the order status implied by the aggregate state of its tasks.
///
/// Rules, in precedence order:
/// 1. no tasks -> RECEIVED
/// 2. every task completed -> READY
/// 3. any in-progress task -> status of the highest-ranked in-progress stage
/// 4. any pending task -> status of the lowest-ranked pending stage
/// 5. otherwise (e.g. everything cancelled) -> RECEIVED
///
/// Ranks never resolve through CANCELLED (rank 0): a cancelled-stage task
/// that is somehow pending or in progress is ignored when picking the
/// winning stage.
pub fn derive_order_status(tasks: &[TaskSnapshot]) -> OrderStatus {
    if tasks.is_empty() {
        return OrderStatus::Received;
    }

    if tasks.iter().all(|t| t.status == TaskStatus::Completed) {
        return OrderStatus::Ready;
    }

    let highest_in_progress = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::InProgress && t.stage != TaskStage::Cancelled)
        .max_by_key(|t| t.stage.rank());
    if let Some(task) = highest_in_progress {
        return task.stage.as_order_status();
    }

    let lowest_pending = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Pending && t.stage != TaskStage::Cancelled)
        .min_by_key(|t| t.stage.rank());
    if let Some(task) = lowest_pending {
        return task.stage.as_order_status();
    }

    OrderStatus::Received
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(stage: TaskStage, status: TaskStatus) -> TaskSnapshot {
        TaskSnapshot { stage, status }
    }

    #[test]
    fn empty_task_list_defaults_to_received() {
        assert_eq!(derive_order_status(&[]), OrderStatus::Received);
    }

    #[test]
    fn all_completed_means_ready() {
        let tasks = [
            task(TaskStage::Cutting, TaskStatus::Completed),
            task(TaskStage::Stitching, TaskStatus::Completed),
            task(TaskStage::Pressing, TaskStatus::Completed),
        ];
        assert_eq!(derive_order_status(&tasks), OrderStatus::Ready);
    }

    #[test]
    fn highest_in_progress_stage_wins_over_pending() {
        let tasks = [
            task(TaskStage::Cutting, TaskStatus::Pending),
            task(TaskStage::Stitching, TaskStatus::InProgress),
        ];
        assert_eq!(derive_order_status(&tasks), OrderStatus::Stitching);
    }

    #[test]
    fn highest_of_several_in_progress_stages_wins() {
        let tasks = [
            task(TaskStage::Cutting, TaskStatus::InProgress),
            task(TaskStage::Pressing, TaskStatus::InProgress),
            task(TaskStage::Received, TaskStatus::Completed),
        ];
        assert_eq!(derive_order_status(&tasks), OrderStatus::Pressing);
    }

    #[test]
    fn lowest_pending_stage_wins_when_nothing_in_progress() {
        let tasks = [
            task(TaskStage::QualityCheck, TaskStatus::Pending),
            task(TaskStage::Cutting, TaskStatus::Pending),
            task(TaskStage::Received, TaskStatus::Completed),
        ];
        assert_eq!(derive_order_status(&tasks), OrderStatus::Cutting);
    }

    #[test]
    fn all_cancelled_falls_back_to_received() {
        let tasks = [
            task(TaskStage::Cutting, TaskStatus::Overdue),
            task(TaskStage::Cancelled, TaskStatus::Overdue),
        ];
        assert_eq!(derive_order_status(&tasks), OrderStatus::Received);
    }

    #[test]
    fn cancelled_stage_never_selected_as_winner() {
        // A pending task parked on the cancelled stage must not drag the
        // order to CANCELLED.
        let tasks = [
            task(TaskStage::Cancelled, TaskStatus::Pending),
            task(TaskStage::Stitching, TaskStatus::Pending),
        ];
        assert_eq!(derive_order_status(&tasks), OrderStatus::Stitching);

        let tasks = [
            task(TaskStage::Cancelled, TaskStatus::InProgress),
            task(TaskStage::Cutting, TaskStatus::InProgress),
        ];
        assert_eq!(derive_order_status(&tasks), OrderStatus::Cutting);
    }

    #[test]
    fn mixed_completed_and_pending_uses_pending() {
        let tasks = [
            task(TaskStage::Cutting, TaskStatus::Completed),
            task(TaskStage::Stitching, TaskStatus::Pending),
        ];
        assert_eq!(derive_order_status(&tasks), OrderStatus::Stitching);
    }
}
