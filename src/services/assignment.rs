use std::str::FromStr;
use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::Serialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::employee::{self, Entity as EmployeeEntity},
    entities::employee_skill::{self, Entity as SkillEntity},
    entities::employee_specialization::{self, Entity as SpecializationEntity},
    entities::task::{self, ActiveModel as TaskActiveModel, Entity as TaskEntity, Model as TaskModel},
    errors::ServiceError,
    events::{Event, EventSender},
    services::tasks::split_skills,
    workflow::{
        rank_candidates, CandidateProfile, Priority, ScoringStrategy, TaskContext, TaskStage,
        TaskStatus, WorkloadSnapshot,
    },
};

/// Soft result of an auto-assignment attempt. "No suitable employee" is a
/// handled outcome, not an error.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssignmentOutcome {
    pub success: bool,
    pub message: String,
    pub task_id: Uuid,
    pub employee_id: Option<Uuid>,
    pub score: Option<f64>,
}

/// Skill router: scores employees against a task and assigns the winner.
#[derive(Clone)]
pub struct AssignmentService {
    db_pool: Arc<DbPool>,
    scorer: Arc<dyn ScoringStrategy>,
    default_capacity: i64,
    event_sender: Option<Arc<EventSender>>,
}

impl AssignmentService {
    pub fn new(
        db_pool: Arc<DbPool>,
        scorer: Arc<dyn ScoringStrategy>,
        default_capacity: i64,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db_pool,
            scorer,
            default_capacity,
            event_sender,
        }
    }

    /// Loads every active employee with skills, specializations and a
    /// point-in-time workload snapshot.
    async fn load_candidates(
        &self,
    ) -> Result<Vec<(CandidateProfile, WorkloadSnapshot)>, ServiceError> {
        let db = &*self.db_pool;

        let employees = EmployeeEntity::find()
            .filter(employee::Column::IsActive.eq(true))
            .all(db)
            .await?;

        let mut candidates = Vec::with_capacity(employees.len());
        for emp in employees {
            let skills = SkillEntity::find()
                .filter(employee_skill::Column::EmployeeId.eq(emp.id))
                .all(db)
                .await?
                .into_iter()
                .map(|s| s.skill_name)
                .collect();

            let specializations = SpecializationEntity::find()
                .filter(employee_specialization::Column::EmployeeId.eq(emp.id))
                .all(db)
                .await?
                .into_iter()
                .filter_map(|s| TaskStage::from_str(&s.stage).ok())
                .collect();

            let active_tasks = TaskEntity::find()
                .filter(task::Column::AssignedEmployeeId.eq(emp.id))
                .filter(
                    task::Column::Status.is_in([
                        TaskStatus::Pending.to_string(),
                        TaskStatus::InProgress.to_string(),
                    ]),
                )
                .count(db)
                .await? as i64;

            let capacity = emp.capacity.map(i64::from).unwrap_or(self.default_capacity);

            candidates.push((
                CandidateProfile {
                    employee_id: emp.id,
                    skills,
                    specializations,
                },
                WorkloadSnapshot {
                    active_tasks,
                    capacity,
                },
            ));
        }

        Ok(candidates)
    }

    fn task_context(task: &TaskModel) -> Result<TaskContext, ServiceError> {
        let stage = TaskStage::from_str(&task.stage).map_err(|_| {
            ServiceError::InvalidStatus(format!("Task has unknown stage '{}'", task.stage))
        })?;
        let priority = Priority::from_str(&task.priority).map_err(|_| {
            ServiceError::InvalidStatus(format!("Task has unknown priority '{}'", task.priority))
        })?;
        Ok(TaskContext {
            stage,
            priority,
            required_skills: split_skills(task.required_skills.as_deref()),
        })
    }

    /// Scores all candidates for a task and returns the best, or `None`
    /// when no employees exist. Pure function of the loaded snapshot.
    #[instrument(skip(self, task), fields(task_id = %task.id))]
    pub async fn find_best_employee_for_task(
        &self,
        task: &TaskModel,
    ) -> Result<Option<(Uuid, f64)>, ServiceError> {
        let context = Self::task_context(task)?;
        let candidates = self.load_candidates().await?;
        if candidates.is_empty() {
            return Ok(None);
        }

        let ranked = rank_candidates(self.scorer.as_ref(), &candidates, &context);
        Ok(ranked.first().map(|c| (c.employee_id, c.score)))
    }

    /// Auto-assigns a task to the best-scoring employee. Fails hard only
    /// when the task id is unknown; an empty candidate pool is a soft
    /// `success: false` outcome.
    #[instrument(skip(self), fields(task_id = %task_id))]
    pub async fn auto_assign_task(&self, task_id: Uuid) -> Result<AssignmentOutcome, ServiceError> {
        let db = &*self.db_pool;

        let task = TaskEntity::find_by_id(task_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Task {task_id} not found")))?;

        let best = self.find_best_employee_for_task(&task).await?;
        let Some((employee_id, score)) = best else {
            warn!(task_id = %task_id, "no suitable employee for task");
            return Ok(AssignmentOutcome {
                success: false,
                message: "No suitable employee found for this task".to_string(),
                task_id,
                employee_id: None,
                score: None,
            });
        };

        let mut active: TaskActiveModel = task.into();
        active.assigned_employee_id = Set(Some(employee_id));
        active.updated_at = Set(Some(chrono::Utc::now()));
        active.update(db).await?;

        info!(task_id = %task_id, %employee_id, score, "task auto-assigned");

        if let Some(sender) = &self.event_sender {
            let event = Event::TaskAssigned {
                task_id,
                employee_id,
            };
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, task_id = %task_id, "failed to send task assigned event");
            }
        }

        Ok(AssignmentOutcome {
            success: true,
            message: format!("Task assigned to employee {employee_id}"),
            task_id,
            employee_id: Some(employee_id),
            score: Some(score),
        })
    }
}
