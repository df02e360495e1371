use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::order::{ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel},
    entities::order_history::ActiveModel as HistoryActiveModel,
    entities::task::{self, Entity as TaskEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    workflow::{derive_order_status, OrderStatus, TaskSnapshot, TaskStage, TaskStatus},
};

/// Result of a propagation pass over an order's tasks.
#[derive(Debug, Clone, Serialize)]
pub struct PropagationOutcome {
    pub order_id: Uuid,
    pub derived_status: OrderStatus,
    /// False when the derived status already matched the stored one.
    pub applied: bool,
}

/// The order workflow engine: the only code path that changes an order's
/// status or writes order history.
#[derive(Clone)]
pub struct OrderWorkflowService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderWorkflowService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Applies a status transition. Read-check-write runs inside one
    /// transaction: the current status is re-read immediately before the
    /// transition-table check, and the status update plus exactly one
    /// history row commit together or not at all.
    #[instrument(skip(self, notes, acting_user), fields(order_id = %order_id, new_status = %new_status))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
        notes: Option<String>,
        acting_user: Option<String>,
    ) -> Result<OrderModel, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "failed to begin transaction");
            ServiceError::DatabaseError(e)
        })?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        let current = OrderStatus::from_str(&order.status).map_err(|_| {
            error!(order_id = %order_id, status = %order.status, "order has unparseable status");
            ServiceError::InvalidStatus(format!("Order has unknown status '{}'", order.status))
        })?;

        if !current.can_transition_to(new_status) {
            warn!(order_id = %order_id, %current, %new_status, "rejected status transition");
            return Err(ServiceError::InvalidTransition {
                from: current,
                to: new_status,
            });
        }

        let now = Utc::now();
        let current_version = order.version;
        let mut active: OrderActiveModel = order.into();
        active.status = Set(new_status.to_string());
        active.updated_at = Set(Some(now));
        active.version = Set(current_version + 1);

        let updated = active.update(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "failed to update order status");
            ServiceError::DatabaseError(e)
        })?;

        let history = HistoryActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            status: Set(new_status.to_string()),
            notes: Set(notes),
            created_by: Set(acting_user),
            created_at: Set(now),
        };
        history.insert(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "failed to append order history");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "failed to commit status transition");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, from = %current, to = %new_status, "order status updated");

        if let Some(sender) = &self.event_sender {
            let event = Event::OrderStatusChanged {
                order_id,
                old_status: current.to_string(),
                new_status: new_status.to_string(),
            };
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, order_id = %order_id, "failed to send status change event");
            }
        }

        Ok(updated)
    }

    /// Current status of an order.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_status(&self, order_id: Uuid) -> Result<OrderStatus, ServiceError> {
        let db = &*self.db_pool;
        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;
        OrderStatus::from_str(&order.status)
            .map_err(|_| ServiceError::InvalidStatus(format!("Order has unknown status '{}'", order.status)))
    }

    /// Cancels an order through the normal transition path.
    #[instrument(skip(self, reason), fields(order_id = %order_id))]
    pub async fn cancel_order(
        &self,
        order_id: Uuid,
        reason: Option<String>,
        acting_user: Option<String>,
    ) -> Result<OrderModel, ServiceError> {
        let cancelled = self
            .update_status(order_id, OrderStatus::Cancelled, reason, acting_user)
            .await?;

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::OrderCancelled(order_id)).await {
                warn!(error = %e, order_id = %order_id, "failed to send order cancelled event");
            }
        }

        Ok(cancelled)
    }

    /// Derives the order's status from its tasks and applies it through
    /// the engine. When the derived status equals the stored one this is a
    /// no-op success; when the derived status is not a legal transition
    /// the conflict is logged and surfaced as `InconsistentDerivedStatus`
    /// rather than forcing the order into an illegal state.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn sync_from_tasks(
        &self,
        order_id: Uuid,
    ) -> Result<PropagationOutcome, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;
        let current = OrderStatus::from_str(&order.status).map_err(|_| {
            ServiceError::InvalidStatus(format!("Order has unknown status '{}'", order.status))
        })?;

        let tasks = TaskEntity::find()
            .filter(task::Column::OrderId.eq(order_id))
            .all(db)
            .await?;

        let snapshots: Vec<TaskSnapshot> = tasks
            .iter()
            .filter_map(|t| {
                let stage = TaskStage::from_str(&t.stage).ok();
                let status = TaskStatus::from_str(&t.status).ok();
                match (stage, status) {
                    (Some(stage), Some(status)) => Some(TaskSnapshot { stage, status }),
                    _ => {
                        warn!(task_id = %t.id, stage = %t.stage, status = %t.status,
                            "skipping task with unparseable stage/status");
                        None
                    }
                }
            })
            .collect();

        let derived = derive_order_status(&snapshots);

        if derived == current {
            return Ok(PropagationOutcome {
                order_id,
                derived_status: derived,
                applied: false,
            });
        }

        if !current.can_transition_to(derived) {
            warn!(
                order_id = %order_id, %current, %derived,
                "derived status conflicts with transition table; leaving order untouched"
            );
            return Err(ServiceError::InconsistentDerivedStatus { current, derived });
        }

        self.update_status(
            order_id,
            derived,
            Some("Derived from task states".to_string()),
            None,
        )
        .await?;

        Ok(PropagationOutcome {
            order_id,
            derived_status: derived,
            applied: true,
        })
    }
}
