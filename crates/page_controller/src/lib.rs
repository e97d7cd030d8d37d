//! Employee page controller: view-model, forms and the actions that drive the
//! employee REST API.

pub mod commands;
pub mod error;
pub mod events;
pub mod page;
pub mod view;

pub use commands::{dispatch, dispatch_batch, PageCommand};
pub use error::ControllerError;
pub use events::{ActionOutcome, Notification, NotificationKind, PageAction, PageEvent, SkipReason};
pub use page::EmployeePage;
pub use view::{EmployeeRow, Field, FormKind, FormState, FormVisibility, ListView, PageLayout, ViewModel};
