use std::{
    collections::HashSet,
    sync::{Arc, Mutex as StdMutex, PoisonError},
};

use employee_client::{ClientError, ClientSettings, EmployeeApi};
use shared::domain::EmployeeId;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    error::ControllerError,
    events::{ActionOutcome, Notification, PageAction, PageEvent, SkipReason},
    view::{EmployeeRow, Field, FormKind, FormState, FormVisibility, ListView, PageLayout, ViewModel},
};

const EVENT_CAPACITY: usize = 256;

/// Controller for the employee page.
///
/// Owns the view-model and issues one API call per submission. Failures never
/// escape an operation: they come back as [`ActionOutcome::Failed`] and are
/// published as [`PageEvent::Notification`].
pub struct EmployeePage {
    api: Arc<dyn EmployeeApi>,
    settings: ClientSettings,
    view: Mutex<ViewModel>,
    inflight: StdMutex<HashSet<FormKind>>,
    events: broadcast::Sender<PageEvent>,
}

struct InflightGuard<'a> {
    inflight: &'a StdMutex<HashSet<FormKind>>,
    kind: FormKind,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.kind);
    }
}

impl EmployeePage {
    pub fn new(
        api: Arc<dyn EmployeeApi>,
        layout: PageLayout,
        settings: ClientSettings,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            api,
            settings,
            view: Mutex::new(ViewModel::new(layout)),
            inflight: StdMutex::new(HashSet::new()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PageEvent> {
        self.events.subscribe()
    }

    pub async fn view(&self) -> ViewModel {
        self.view.lock().await.clone()
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Page-ready hook: performs the initial list load.
    pub async fn init(&self) -> ListView {
        let layout = self.view.lock().await.layout();
        let present: Vec<&str> = FormKind::ALL
            .into_iter()
            .filter(|kind| layout.has(*kind))
            .map(FormKind::as_str)
            .collect();
        info!(forms = ?present, "employee page ready");
        self.load_employees().await
    }

    /// Replaces the list with a fresh snapshot, or a single placeholder.
    pub async fn load_employees(&self) -> ListView {
        let list = match self.api.list_employees().await {
            Ok(employees) => {
                debug!(count = employees.len(), "loaded employees");
                ListView::from_employees(employees, &self.settings)
            }
            Err(err) => {
                error!("error loading employees: {err}");
                ListView::load_error(&err)
            }
        };

        self.view.lock().await.list = list.clone();
        self.publish(PageEvent::ListRendered(list.clone()));
        list
    }

    pub async fn add_employee(&self) -> ActionOutcome {
        let kind = FormKind::Add;
        let action = PageAction::AddEmployee;
        let (_guard, form) = match self.begin_submission(kind).await {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };

        match self.api.create_employee(&form.employee_fields()).await {
            Ok(created) => {
                let message = match created {
                    Some(employee) => format!("Employee {} added", employee.id),
                    None => "Employee added".to_string(),
                };
                info!("{message}");
                self.load_employees().await;
                self.clear_form(kind).await;
                self.succeed(action, message)
            }
            Err(err) => self.fail(action, &err),
        }
    }

    pub async fn update_employee(&self) -> ActionOutcome {
        let kind = FormKind::Update;
        let action = PageAction::UpdateEmployee;
        let (_guard, form) = match self.begin_submission(kind).await {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };
        let id = match required_id(&form, action) {
            Ok(id) => id,
            Err(outcome) => return self.reject(outcome),
        };

        match self.api.update_employee(&id, &form.employee_fields()).await {
            Ok(_) => {
                info!(employee_id = %id, "employee updated");
                self.load_employees().await;
                self.clear_form(kind).await;
                self.show_default_view().await;
                self.succeed(action, format!("Employee {id} updated"))
            }
            Err(err) => self.fail(action, &err),
        }
    }

    /// Reviews do not change the list, so only the review form is reset.
    pub async fn add_performance_review(&self) -> ActionOutcome {
        let kind = FormKind::Review;
        let action = PageAction::AddReview;
        let (_guard, form) = match self.begin_submission(kind).await {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };
        let id = match required_id(&form, action) {
            Ok(id) => id,
            Err(outcome) => return self.reject(outcome),
        };

        match self.api.add_review(&id, form.value(Field::Review)).await {
            Ok(ack) => {
                info!(employee_id = %id, "performance review added");
                self.clear_form(kind).await;
                let message = ack
                    .message
                    .unwrap_or_else(|| format!("Review added for employee {id}"));
                self.succeed(action, message)
            }
            Err(err) => self.fail(action, &err),
        }
    }

    pub async fn deactivate_employee(&self) -> ActionOutcome {
        let kind = FormKind::Deactivate;
        let action = PageAction::DeactivateEmployee;
        let (_guard, form) = match self.begin_submission(kind).await {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };
        let id = match required_id(&form, action) {
            Ok(id) => id,
            Err(outcome) => return self.reject(outcome),
        };

        match self.api.deactivate_employee(&id).await {
            Ok(_) => {
                info!(employee_id = %id, "employee deactivated");
                self.load_employees().await;
                self.clear_form(kind).await;
                self.succeed(action, format!("Employee {id} deactivated"))
            }
            Err(err) => self.fail(action, &err),
        }
    }

    pub async fn delete_employee(&self, raw_id: &str) -> ActionOutcome {
        let action = PageAction::DeleteEmployee;
        let Some(id) = EmployeeId::parse(raw_id) else {
            return self.reject(Notification::validation(action, "Employee id is required"));
        };

        match self.api.delete_employee(&id).await {
            Ok(()) => {
                info!(employee_id = %id, "employee deleted");
                self.load_employees().await;
                self.succeed(action, format!("Employee {id} deleted"))
            }
            Err(err) => self.fail(action, &err),
        }
    }

    /// Fetches one employee into the details view.
    pub async fn open_details(&self, raw_id: &str) -> ActionOutcome {
        let action = PageAction::OpenDetails;
        let Some(id) = EmployeeId::parse(raw_id) else {
            return self.reject(Notification::validation(action, "Employee id is required"));
        };

        match self.api.get_employee(&id).await {
            Ok(employee) => {
                let row = EmployeeRow::new(employee, &self.settings);
                self.view.lock().await.details = Some(row.clone());
                self.publish(PageEvent::DetailsLoaded(row));
                ActionOutcome::Succeeded
            }
            Err(err) => self.fail(action, &err),
        }
    }

    /// Shows exactly one form section; absent forms simply stay hidden.
    pub async fn toggle_visibility(&self, kind: FormKind) {
        self.set_visibility(FormVisibility::Only(kind)).await;
    }

    pub async fn show_default_view(&self) {
        self.set_visibility(FormVisibility::Default).await;
    }

    /// Blanks every input of a form. Returns false when the form is absent.
    pub async fn clear_form(&self, kind: FormKind) -> bool {
        let cleared = match self.view.lock().await.form_mut(kind) {
            Some(form) => {
                form.clear();
                true
            }
            None => false,
        };
        if cleared {
            self.publish(PageEvent::FormCleared(kind));
        }
        cleared
    }

    pub async fn set_input(
        &self,
        kind: FormKind,
        field: Field,
        value: impl Into<String>,
    ) -> Result<(), ControllerError> {
        let mut view = self.view.lock().await;
        let form = view
            .form_mut(kind)
            .ok_or(ControllerError::FormMissing(kind))?;
        form.set(field, value.into())
    }

    pub async fn submit(&self, kind: FormKind) -> ActionOutcome {
        match kind {
            FormKind::Add => self.add_employee().await,
            FormKind::Update => self.update_employee().await,
            FormKind::Review => self.add_performance_review().await,
            FormKind::Deactivate => self.deactivate_employee().await,
        }
    }

    async fn set_visibility(&self, visibility: FormVisibility) {
        self.view.lock().await.set_visibility(visibility);
        self.publish(PageEvent::VisibilityChanged(visibility));
    }

    /// Claims the form's in-flight slot and snapshots its inputs.
    async fn begin_submission(
        &self,
        kind: FormKind,
    ) -> Result<(InflightGuard<'_>, FormState), ActionOutcome> {
        let form = self.view.lock().await.form(kind).cloned();
        let Some(form) = form else {
            debug!(form = %kind, "submit ignored: form not present");
            return Err(ActionOutcome::Skipped(SkipReason::FormMissing(kind)));
        };

        let claimed = self
            .inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind);
        if !claimed {
            debug!(form = %kind, "submit ignored: previous submission still in flight");
            return Err(ActionOutcome::Skipped(SkipReason::InFlight(kind)));
        }

        Ok((
            InflightGuard {
                inflight: &self.inflight,
                kind,
            },
            form,
        ))
    }

    fn publish(&self, event: PageEvent) {
        let _ = self.events.send(event);
    }

    fn succeed(&self, action: PageAction, message: String) -> ActionOutcome {
        self.publish(PageEvent::Notification(Notification::success(
            action, message,
        )));
        ActionOutcome::Succeeded
    }

    fn fail(&self, action: PageAction, err: &ClientError) -> ActionOutcome {
        warn!("error {}: {err}", action.describe());
        self.reject(Notification::from_client_error(action, err))
    }

    pub(crate) fn reject(&self, notification: Notification) -> ActionOutcome {
        self.publish(PageEvent::Notification(notification.clone()));
        ActionOutcome::Failed(notification)
    }
}

fn required_id(form: &FormState, action: PageAction) -> Result<EmployeeId, Notification> {
    EmployeeId::parse(form.value(Field::Id))
        .ok_or_else(|| Notification::validation(action, "Employee id is required"))
}

#[cfg(test)]
#[path = "tests/page_tests.rs"]
mod tests;
