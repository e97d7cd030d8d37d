use thiserror::Error;

use crate::view::{Field, FormKind};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("unknown form '{0}'")]
    UnknownForm(String),
    #[error("unknown field '{0}'")]
    UnknownFieldName(String),
    #[error("the {form} form has no {field} field")]
    UnknownField { form: FormKind, field: Field },
    #[error("the {0} form is not present on this page")]
    FormMissing(FormKind),
}
