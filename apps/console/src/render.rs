//! Terminal rendering of page events.

use page_controller::{
    ActionOutcome, EmployeeRow, FormVisibility, ListView, PageEvent, SkipReason,
};
use tokio::sync::broadcast::{self, error::TryRecvError};

pub fn list_lines(list: &ListView) -> Vec<String> {
    match list {
        ListView::NotLoaded => vec!["(employee list not loaded)".to_string()],
        ListView::Rows(rows) => rows
            .iter()
            .map(|row| format!("  * {}  [{}]", row.summary, row.details_href))
            .collect(),
        other => other.items().iter().map(|item| format!("  * {item}")).collect(),
    }
}

pub fn details_lines(row: &EmployeeRow) -> Vec<String> {
    let employee = &row.employee;
    vec![
        format!("Employee {}", employee.id),
        format!("  name:       {}", employee.name),
        format!("  position:   {}", employee.position),
        format!("  department: {}", employee.department),
        format!("  contact:    {}", employee.contact),
        format!("  active:     {}", if employee.active { "yes" } else { "no" }),
        format!("  link:       {}", row.details_href),
    ]
}

pub fn event_lines(event: &PageEvent) -> Vec<String> {
    match event {
        PageEvent::ListRendered(list) => {
            let mut lines = vec!["Employees:".to_string()];
            lines.extend(list_lines(list));
            lines
        }
        PageEvent::DetailsLoaded(row) => details_lines(row),
        PageEvent::Notification(notification) => vec![notification.display_text()],
        PageEvent::VisibilityChanged(FormVisibility::Only(kind)) => {
            vec![format!("[{kind} form shown]")]
        }
        PageEvent::VisibilityChanged(FormVisibility::Default) => {
            vec!["[default view]".to_string()]
        }
        PageEvent::FormCleared(_) => Vec::new(),
    }
}

/// Feedback for outcomes that produce no page event.
pub fn outcome_line(outcome: &ActionOutcome) -> Option<String> {
    match outcome {
        ActionOutcome::Skipped(SkipReason::FormMissing(kind)) => {
            Some(format!("the {kind} form is not available"))
        }
        ActionOutcome::Skipped(SkipReason::InFlight(kind)) => {
            Some(format!("the {kind} form is still submitting"))
        }
        _ => None,
    }
}

/// Lines for every event queued on the receiver, without waiting for more.
pub fn pending_lines(events: &mut broadcast::Receiver<PageEvent>) -> Vec<String> {
    let mut lines = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => lines.extend(event_lines(&event)),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "console fell behind on page events");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    lines
}

pub fn drain(events: &mut broadcast::Receiver<PageEvent>) {
    for line in pending_lines(events) {
        println!("{line}");
    }
}
