//! Page events, notifications and action outcomes.

use employee_client::ClientError;

use crate::view::{EmployeeRow, FormKind, FormVisibility, ListView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    AddEmployee,
    UpdateEmployee,
    AddReview,
    DeactivateEmployee,
    DeleteEmployee,
    OpenDetails,
    EditForm,
}

impl PageAction {
    pub fn describe(self) -> &'static str {
        match self {
            PageAction::AddEmployee => "adding employee",
            PageAction::UpdateEmployee => "updating employee",
            PageAction::AddReview => "adding performance review",
            PageAction::DeactivateEmployee => "deactivating employee",
            PageAction::DeleteEmployee => "deleting employee",
            PageAction::OpenDetails => "loading employee details",
            PageAction::EditForm => "editing form",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    /// Network unreachable or an unreadable response body.
    Transport,
    /// The API answered with a non-2xx status.
    Rejected,
    /// Input was refused before any request was made.
    Validation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub action: PageAction,
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(action: PageAction, message: impl Into<String>) -> Self {
        Self {
            action,
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn validation(action: PageAction, message: impl Into<String>) -> Self {
        Self {
            action,
            kind: NotificationKind::Validation,
            message: message.into(),
        }
    }

    pub fn from_client_error(action: PageAction, err: &ClientError) -> Self {
        let kind = if err.is_rejection() {
            NotificationKind::Rejected
        } else {
            NotificationKind::Transport
        };
        Self {
            action,
            kind,
            message: err.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind != NotificationKind::Success
    }

    /// Text a host shows in its alert/toast.
    pub fn display_text(&self) -> String {
        if self.is_error() {
            format!("Error: {}", self.message)
        } else {
            self.message.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub enum PageEvent {
    ListRendered(ListView),
    DetailsLoaded(EmployeeRow),
    FormCleared(FormKind),
    VisibilityChanged(FormVisibility),
    Notification(Notification),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    FormMissing(FormKind),
    /// A submission from the same form has not finished yet.
    InFlight(FormKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Succeeded,
    Failed(Notification),
    Skipped(SkipReason),
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Succeeded)
    }
}
