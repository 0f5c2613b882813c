pub mod notifier;
pub mod send;

pub use notifier::{
    PendingItem, Reminder, ReminderMessage, ReminderNotifier, TracingReminderNotifier,
};

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::storage::Storage;

pub struct ReminderService {
    storage: Option<Arc<dyn Storage>>,
    notifier: Option<Arc<dyn ReminderNotifier>>,
}

impl ReminderService {
    pub fn new_lazy() -> Self {
        Self {
            storage: None,
            notifier: None,
        }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::storage_from_request(request),
        }
    }

    pub(crate) fn get_notifier(&self, request: &HttpRequest) -> Arc<dyn ReminderNotifier> {
        if let Some(notifier) = &self.notifier {
            notifier.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn ReminderNotifier>>>()
                .expect("ReminderNotifier not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 提醒项目中仍有待评记录的学生
    pub async fn send_project_reminders(
        &self,
        request: &HttpRequest,
        project_id: i64,
    ) -> ActixResult<HttpResponse> {
        send::send_project_reminders(self, request, project_id).await
    }
}
