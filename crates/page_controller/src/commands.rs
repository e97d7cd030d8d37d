//! Commands a host queues against the page, and their dispatch.

use tracing::debug;

use crate::{
    events::{ActionOutcome, Notification, PageAction},
    page::EmployeePage,
    view::{Field, FormKind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCommand {
    Reload,
    Toggle(FormKind),
    ShowDefault,
    SetInput {
        form: FormKind,
        field: Field,
        value: String,
    },
    Clear(FormKind),
    Submit(FormKind),
    OpenDetails {
        id: String,
    },
    Delete {
        id: String,
    },
}

impl PageCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PageCommand::Reload => "reload",
            PageCommand::Toggle(_) => "toggle",
            PageCommand::ShowDefault => "show_default",
            PageCommand::SetInput { .. } => "set_input",
            PageCommand::Clear(_) => "clear",
            PageCommand::Submit(_) => "submit",
            PageCommand::OpenDetails { .. } => "open_details",
            PageCommand::Delete { .. } => "delete",
        }
    }
}

pub async fn dispatch(page: &EmployeePage, command: PageCommand) -> ActionOutcome {
    debug!(command = command.name(), "dispatching page command");
    match command {
        PageCommand::Reload => {
            page.load_employees().await;
            ActionOutcome::Succeeded
        }
        PageCommand::Toggle(kind) => {
            page.toggle_visibility(kind).await;
            ActionOutcome::Succeeded
        }
        PageCommand::ShowDefault => {
            page.show_default_view().await;
            ActionOutcome::Succeeded
        }
        PageCommand::SetInput { form, field, value } => {
            match page.set_input(form, field, value).await {
                Ok(()) => ActionOutcome::Succeeded,
                Err(err) => page.reject(Notification::validation(
                    PageAction::EditForm,
                    err.to_string(),
                )),
            }
        }
        PageCommand::Clear(kind) => {
            page.clear_form(kind).await;
            ActionOutcome::Succeeded
        }
        PageCommand::Submit(kind) => page.submit(kind).await,
        PageCommand::OpenDetails { id } => page.open_details(&id).await,
        PageCommand::Delete { id } => page.delete_employee(&id).await,
    }
}

/// Dispatches commands in order. A rejected form input ends the batch so the
/// form is never submitted with the input missing.
pub async fn dispatch_batch(page: &EmployeePage, commands: Vec<PageCommand>) -> Vec<ActionOutcome> {
    let mut outcomes = Vec::with_capacity(commands.len());
    for command in commands {
        let editing = matches!(command, PageCommand::SetInput { .. });
        let outcome = dispatch(page, command).await;
        let stop = editing && !outcome.is_success();
        outcomes.push(outcome);
        if stop {
            debug!(dispatched = outcomes.len(), "form input rejected; dropping rest of batch");
            break;
        }
    }
    outcomes
}
