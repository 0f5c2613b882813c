use std::collections::{BTreeMap, HashMap, hash_map::Entry};

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::{PendingItem, Reminder, ReminderService};
use crate::models::evaluations::entities::Evaluation;
use crate::models::projects::responses::ReminderResponse;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{access, current_user, storage_error_response};

/// 按评价人分组，组内保持原顺序
fn group_by_evaluator(evaluations: Vec<Evaluation>) -> BTreeMap<i64, Vec<Evaluation>> {
    let mut grouped: BTreeMap<i64, Vec<Evaluation>> = BTreeMap::new();
    for evaluation in evaluations {
        grouped
            .entry(evaluation.evaluator_id)
            .or_default()
            .push(evaluation);
    }
    grouped
}

pub async fn send_project_reminders(
    service: &ReminderService,
    request: &HttpRequest,
    project_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);
    let notifier = service.get_notifier(request);

    let (project, _) = match access::owned_project(&storage, &user, project_id).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };

    let pending = match storage.list_pending_evaluations_by_project(project.id).await {
        Ok(pending) => pending,
        Err(e) => return Ok(storage_error_response(e, ErrorCode::ReminderFailed)),
    };
    let pending_total = pending.len() as i64;

    let mut users: HashMap<i64, Option<User>> = HashMap::new();
    let mut students_notified = 0i64;

    for (evaluator_id, evaluations) in group_by_evaluator(pending) {
        let mut ids: Vec<i64> = vec![evaluator_id];
        ids.extend(evaluations.iter().map(|e| e.evaluatee_id));
        for id in ids {
            if let Entry::Vacant(slot) = users.entry(id) {
                match storage.get_user_by_id(id).await {
                    Ok(found) => {
                        slot.insert(found);
                    }
                    Err(e) => return Ok(storage_error_response(e, ErrorCode::ReminderFailed)),
                }
            }
        }

        let Some(Some(student)) = users.get(&evaluator_id).cloned() else {
            continue;
        };
        let items = evaluations
            .iter()
            .map(|e| PendingItem {
                evaluation_id: e.id,
                evaluatee_name: users
                    .get(&e.evaluatee_id)
                    .and_then(|u| u.as_ref())
                    .map(|u| u.full_name())
                    .unwrap_or_else(|| format!("Student #{}", e.evaluatee_id)),
            })
            .collect();

        let reminder = Reminder {
            student,
            project: project.clone(),
            pending: items,
        };
        match notifier.notify(&reminder).await {
            Ok(()) => students_notified += 1,
            Err(e) => warn!(
                "Failed to notify student {} for project {}: {}",
                evaluator_id, project.id, e
            ),
        }
    }

    info!(
        "Sent reminders for project {} to {} students ({} pending evaluations)",
        project.id, students_notified, pending_total
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ReminderResponse {
            students_notified,
            pending_evaluations: pending_total,
        },
        "Reminders sent",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::evaluations::entities::EvaluationStatus;

    fn pending(id: i64, evaluator_id: i64, evaluatee_id: i64) -> Evaluation {
        let now = chrono::Utc::now();
        Evaluation {
            id,
            evaluator_id,
            evaluatee_id,
            team_id: 1,
            project_id: 1,
            status: EvaluationStatus::Pending,
            ratings: None,
            comment: None,
            date_completed: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_group_by_evaluator() {
        let grouped = group_by_evaluator(vec![
            pending(1, 5, 6),
            pending(2, 6, 5),
            pending(3, 5, 7),
        ]);
        assert_eq!(grouped.len(), 2);
        let ids: Vec<i64> = grouped[&5].iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(grouped[&6].len(), 1);
    }
}
