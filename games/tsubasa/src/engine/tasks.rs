use crate::client::models::{QuestTask, TaskStatus};
use crate::client::GameClient;
use crate::session::AccountSession;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTask {
    pub title: String,
    pub reward: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskReport {
    pub attempted: usize,
    pub executed: usize,
    pub completed: Vec<CompletedTask>,
}

pub struct TaskRunner<'a> {
    client: &'a GameClient,
}

impl<'a> TaskRunner<'a> {
    pub fn new(client: &'a GameClient) -> Self {
        Self { client }
    }

    /// Executes every task in order, then confirms it. A failure only
    /// affects the task it happened on.
    pub async fn run(&self, session: &AccountSession, tasks: &[QuestTask]) -> TaskReport {
        let mut report = TaskReport::default();
        if tasks.is_empty() {
            warn!("No tasks available.");
            return report;
        }

        for task in tasks {
            report.attempted += 1;

            if let Err(e) = self.client.execute_task(session, &task.id).await {
                warn!("Task | {} | Execution failed | {}", task.title, e.message);
                continue;
            }
            report.executed += 1;

            match self.client.check_task_achievement(session, &task.id).await {
                Ok(Some(updated)) if updated.status == TaskStatus::Completed => {
                    info!("Task | {} | Completed | {}", updated.title, updated.reward);
                    report.completed.push(CompletedTask {
                        title: updated.title,
                        reward: updated.reward,
                    });
                }
                Ok(_) => debug!("Task | {} | Not completed yet", task.title),
                Err(e) => warn!("Task | {} | Achievement check failed | {}", task.title, e.message),
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::WireId;
    use crate::client::{TASK_ACHIEVEMENT, TASK_EXECUTE};
    use crate::config::TimingConfig;
    use crate::test_support::{self, ScriptedTransport};
    use core_logic::JsonResponse;
    use serde_json::json;
    use std::sync::Arc;

    fn task(id: i64, title: &str) -> QuestTask {
        QuestTask {
            id: WireId::Num(id),
            title: title.to_string(),
            status: TaskStatus::Available,
            reward: 0,
        }
    }

    #[tokio::test]
    async fn test_every_task_is_attempted() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(TASK_EXECUTE, test_support::error(400, "Task unavailable"));
        transport.push(TASK_EXECUTE, JsonResponse::ok(json!({})));
        transport.push(
            TASK_ACHIEVEMENT,
            JsonResponse::ok(json!({
                "task_info": [
                    { "id": 1, "title": "Join", "status": 0, "reward": 100 },
                    { "id": 2, "title": "Follow", "status": 2, "reward": 500 }
                ]
            })),
        );
        transport.push(TASK_EXECUTE, JsonResponse::ok(json!({})));
        transport.push(TASK_ACHIEVEMENT, test_support::error(500, "boom"));

        let client = GameClient::new(transport.clone(), "en", TimingConfig::immediate());
        let tasks = vec![task(1, "Join"), task(2, "Follow"), task(3, "Share")];
        let report = TaskRunner::new(&client)
            .run(&test_support::session(), &tasks)
            .await;

        assert_eq!(report.attempted, 3);
        assert_eq!(report.executed, 2);
        assert_eq!(
            report.completed,
            vec![CompletedTask {
                title: "Follow".to_string(),
                reward: 500
            }]
        );
        assert_eq!(transport.requests()[0].body["task_id"], 1);
    }

    #[tokio::test]
    async fn test_unconfirmed_task_is_not_reported() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(TASK_EXECUTE, JsonResponse::ok(json!({})));
        transport.push(
            TASK_ACHIEVEMENT,
            JsonResponse::ok(json!({
                "task_info": [ { "id": 4, "title": "Invite", "status": 1, "reward": 50 } ]
            })),
        );

        let client = GameClient::new(transport.clone(), "en", TimingConfig::immediate());
        let report = TaskRunner::new(&client)
            .run(&test_support::session(), &[task(4, "Invite")])
            .await;

        assert_eq!(report.executed, 1);
        assert!(report.completed.is_empty());
    }

    #[tokio::test]
    async fn test_empty_list_makes_no_calls() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = GameClient::new(transport.clone(), "en", TimingConfig::immediate());
        let report = TaskRunner::new(&client)
            .run(&test_support::session(), &[])
            .await;

        assert_eq!(report, TaskReport::default());
        assert!(transport.requests().is_empty());
    }
}
