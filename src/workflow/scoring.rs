use uuid::Uuid;

use super::stage::{Priority, TaskStage};

/// What the router knows about a candidate employee.
#[derive(Debug, Clone)]
pub struct CandidateProfile {
    pub employee_id: Uuid,
    pub skills: Vec<String>,
    pub specializations: Vec<TaskStage>,
}

/// What the router knows about the task being routed.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub stage: TaskStage,
    pub priority: Priority,
    pub required_skills: Vec<String>,
}

/// Point-in-time workload of one employee.
#[derive(Debug, Clone, Copy)]
pub struct WorkloadSnapshot {
    pub active_tasks: i64,
    pub capacity: i64,
}

/// Scoring is a pluggable policy so the weights can be swapped without
/// touching candidate ranking or selection.
pub trait ScoringStrategy: Send + Sync {
    fn score(
        &self,
        candidate: &CandidateProfile,
        task: &TaskContext,
        workload: &WorkloadSnapshot,
    ) -> f64;
}

/// Default weighted heuristic:
/// - base score: free capacity, `max(0, capacity - active_tasks)`
/// - +2.0 per required skill the candidate possesses
/// - x1.5 when the task priority is HIGH; URGENT receives no extra boost
/// - x1.2 when the candidate specializes in the task's stage
#[derive(Debug, Clone, Default)]
pub struct WeightedScorer;

const SKILL_MATCH_BONUS: f64 = 2.0;
const HIGH_PRIORITY_MULTIPLIER: f64 = 1.5;
const SPECIALIZATION_MULTIPLIER: f64 = 1.2;

impl ScoringStrategy for WeightedScorer {
    fn score(
        &self,
        candidate: &CandidateProfile,
        task: &TaskContext,
        workload: &WorkloadSnapshot,
    ) -> f64 {
        let mut score = (workload.capacity - workload.active_tasks).max(0) as f64;

        let matched = task
            .required_skills
            .iter()
            .filter(|required| candidate.skills.iter().any(|s| s == *required))
            .count();
        score += matched as f64 * SKILL_MATCH_BONUS;

        if task.priority == Priority::High {
            score *= HIGH_PRIORITY_MULTIPLIER;
        }

        if candidate.specializations.contains(&task.stage) {
            score *= SPECIALIZATION_MULTIPLIER;
        }

        score
    }
}

/// A scored candidate, as returned by `rank_candidates`.
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub employee_id: Uuid,
    pub score: f64,
}

/// Scores every candidate and sorts descending. The sort is stable, so
/// ties keep input order.
pub fn rank_candidates(
    scorer: &dyn ScoringStrategy,
    candidates: &[(CandidateProfile, WorkloadSnapshot)],
    task: &TaskContext,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .map(|(candidate, workload)| RankedCandidate {
            employee_id: candidate.employee_id,
            score: scorer.score(candidate, task, workload),
        })
        .collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(skills: &[&str], specializations: &[TaskStage]) -> CandidateProfile {
        CandidateProfile {
            employee_id: Uuid::new_v4(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            specializations: specializations.to_vec(),
        }
    }

    fn stitching_task(priority: Priority, required: &[&str]) -> TaskContext {
        TaskContext {
            stage: TaskStage::Stitching,
            priority,
            required_skills: required.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn base_score_is_free_capacity_floored_at_zero() {
        let scorer = WeightedScorer;
        let c = candidate(&[], &[]);
        let task = stitching_task(Priority::Normal, &[]);

        let free = WorkloadSnapshot { active_tasks: 2, capacity: 5 };
        assert_eq!(scorer.score(&c, &task, &free), 3.0);

        let overloaded = WorkloadSnapshot { active_tasks: 9, capacity: 5 };
        assert_eq!(scorer.score(&c, &task, &overloaded), 0.0);
    }

    #[test]
    fn skill_matches_add_two_points_each() {
        let scorer = WeightedScorer;
        let c = candidate(&["embroidery", "lining"], &[]);
        let workload = WorkloadSnapshot { active_tasks: 5, capacity: 5 };

        let none = stitching_task(Priority::Normal, &["beading"]);
        assert_eq!(scorer.score(&c, &none, &workload), 0.0);

        let both = stitching_task(Priority::Normal, &["embroidery", "lining"]);
        assert_eq!(scorer.score(&c, &both, &workload), 4.0);
    }

    #[test]
    fn score_is_monotonic_in_skill_match_count() {
        let scorer = WeightedScorer;
        let workload = WorkloadSnapshot { active_tasks: 1, capacity: 5 };
        let c = candidate(&["a", "b", "c"], &[]);
        let mut last = -1.0;
        for n in 0..=3 {
            let required: Vec<&str> = ["a", "b", "c"][..n].to_vec();
            let score = scorer.score(&c, &stitching_task(Priority::Normal, &required), &workload);
            assert!(score >= last);
            last = score;
        }
    }

    #[test]
    fn high_priority_multiplies_but_urgent_does_not() {
        let scorer = WeightedScorer;
        let c = candidate(&["fitting"], &[]);
        let workload = WorkloadSnapshot { active_tasks: 3, capacity: 5 };
        let required = ["fitting"];

        let normal = scorer.score(&c, &stitching_task(Priority::Normal, &required), &workload);
        let high = scorer.score(&c, &stitching_task(Priority::High, &required), &workload);
        let urgent = scorer.score(&c, &stitching_task(Priority::Urgent, &required), &workload);

        assert_eq!(normal, 4.0);
        assert_eq!(high, 6.0);
        assert!(high > normal);
        // Urgent scores like normal: no extra boost beyond HIGH.
        assert_eq!(urgent, normal);
    }

    #[test]
    fn specialization_multiplies_by_1_2() {
        let scorer = WeightedScorer;
        let specialist = candidate(&[], &[TaskStage::Stitching]);
        let generalist = candidate(&[], &[TaskStage::Pressing]);
        let workload = WorkloadSnapshot { active_tasks: 0, capacity: 5 };
        let task = stitching_task(Priority::Normal, &[]);

        assert_eq!(scorer.score(&specialist, &task, &workload), 6.0);
        assert_eq!(scorer.score(&generalist, &task, &workload), 5.0);
    }

    #[test]
    fn skilled_but_loaded_candidate_beats_free_generalist() {
        // A has capacity 5, active 5, two matching skills
        // (score 4); B has capacity 5, active 2, no skills (score 3).
        let scorer = WeightedScorer;
        let a = candidate(&["embroidery", "beading"], &[]);
        let b = candidate(&[], &[]);
        let task = stitching_task(Priority::Normal, &["embroidery", "beading"]);

        let pool = vec![
            (a.clone(), WorkloadSnapshot { active_tasks: 5, capacity: 5 }),
            (b.clone(), WorkloadSnapshot { active_tasks: 2, capacity: 5 }),
        ];
        let ranked = rank_candidates(&scorer, &pool, &task);
        assert_eq!(ranked[0].employee_id, a.employee_id);
        assert_eq!(ranked[0].score, 4.0);
        assert_eq!(ranked[1].score, 3.0);
    }

    #[test]
    fn ties_keep_input_order() {
        let scorer = WeightedScorer;
        let first = candidate(&[], &[]);
        let second = candidate(&[], &[]);
        let task = stitching_task(Priority::Normal, &[]);
        let workload = WorkloadSnapshot { active_tasks: 1, capacity: 5 };

        let pool = vec![(first.clone(), workload), (second.clone(), workload)];
        let ranked = rank_candidates(&scorer, &pool, &task);
        assert_eq!(ranked[0].employee_id, first.employee_id);
        assert_eq!(ranked[1].employee_id, second.employee_id);
    }
}
