//! 催评提醒
//!
//! `ReminderNotifier` 是对外通知的接缝。内置实现只渲染邮件内容并写入日志，
//! 真正的投递（SMTP 等）不在本服务范围内。

use async_trait::async_trait;
use tracing::info;

use crate::config::NotificationConfig;
use crate::errors::Result;
use crate::models::{projects::entities::Project, users::entities::User};

/// 一条待完成的互评
#[derive(Debug, Clone)]
pub struct PendingItem {
    pub evaluation_id: i64,
    pub evaluatee_name: String,
}

/// 发给单个学生的提醒
#[derive(Debug, Clone)]
pub struct Reminder {
    pub student: User,
    pub project: Project,
    pub pending: Vec<PendingItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReminderMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl ReminderMessage {
    pub fn render(reminder: &Reminder, config: &NotificationConfig) -> Self {
        let mut body = format!(
            "Hi {},\n\nYou still have {} pending evaluation(s) for \"{}\", due {}:\n",
            reminder.student.first_name,
            reminder.pending.len(),
            reminder.project.title,
            reminder.project.due_date.format("%Y-%m-%d %H:%M UTC"),
        );
        for item in &reminder.pending {
            body.push_str(&format!("- {}\n", item.evaluatee_name));
        }
        body.push_str("\nPlease log in and complete them before the deadline.\n");

        Self {
            from: config.from_address.clone(),
            to: reminder.student.email.clone(),
            subject: config.reminder_subject.clone(),
            body,
        }
    }
}

#[async_trait]
pub trait ReminderNotifier: Send + Sync {
    async fn notify(&self, reminder: &Reminder) -> Result<()>;
}

/// 渲染后写入日志
pub struct TracingReminderNotifier {
    config: NotificationConfig,
}

impl TracingReminderNotifier {
    pub fn new(config: NotificationConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ReminderNotifier for TracingReminderNotifier {
    async fn notify(&self, reminder: &Reminder) -> Result<()> {
        let message = ReminderMessage::render(reminder, &self.config);
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "Evaluation reminder\n{}",
            message.body
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use chrono::TimeZone;

    fn reminder() -> Reminder {
        let now = chrono::Utc::now();
        Reminder {
            student: User {
                id: 7,
                email: "sam@example.com".to_string(),
                password_hash: String::new(),
                first_name: "Sam".to_string(),
                last_name: "Lee".to_string(),
                role: UserRole::Student,
                student_number: None,
                team_id: Some(1),
                created_at: now,
                updated_at: now,
            },
            project: Project {
                id: 3,
                course_id: 1,
                title: "Milestone 2".to_string(),
                description: None,
                due_date: chrono::Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 0).unwrap(),
                created_at: now,
                updated_at: now,
            },
            pending: vec![
                PendingItem {
                    evaluation_id: 10,
                    evaluatee_name: "Ana Diaz".to_string(),
                },
                PendingItem {
                    evaluation_id: 11,
                    evaluatee_name: "Bo Chen".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_render_lists_each_pending_teammate() {
        let config = NotificationConfig {
            from_address: "no-reply@real-ratings.com".to_string(),
            reminder_subject: "Reminder: You Have Pending Evaluation(s) Due Tomorrow".to_string(),
        };
        let message = ReminderMessage::render(&reminder(), &config);

        assert_eq!(message.to, "sam@example.com");
        assert_eq!(message.from, "no-reply@real-ratings.com");
        assert_eq!(
            message.subject,
            "Reminder: You Have Pending Evaluation(s) Due Tomorrow"
        );
        assert!(message.body.contains("2 pending evaluation(s) for \"Milestone 2\""));
        assert!(message.body.contains("2026-03-14 23:59 UTC"));
        assert!(message.body.contains("- Ana Diaz\n- Bo Chen\n"));
    }

    #[tokio::test]
    async fn test_tracing_notifier_accepts_reminder() {
        let notifier = TracingReminderNotifier::new(NotificationConfig {
            from_address: "no-reply@example.com".to_string(),
            reminder_subject: "Reminder".to_string(),
        });
        assert!(notifier.notify(&reminder()).await.is_ok());
    }
}
