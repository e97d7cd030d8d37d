//! View-model for the employee page: list view, forms and form visibility.
//!
//! Hosts render from a [`ViewModel`] snapshot and write user input through the
//! controller; nothing here touches the network.

use std::{collections::BTreeMap, fmt, str::FromStr};

use employee_client::ClientSettings;
use shared::domain::{Employee, EmployeeFields};

use crate::error::ControllerError;

pub const EMPTY_LIST_PLACEHOLDER: &str = "No employees found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormKind {
    Add,
    Update,
    Review,
    Deactivate,
}

impl FormKind {
    pub const ALL: [FormKind; 4] = [
        FormKind::Add,
        FormKind::Update,
        FormKind::Review,
        FormKind::Deactivate,
    ];

    pub fn fields(self) -> &'static [Field] {
        match self {
            FormKind::Add => &[
                Field::Name,
                Field::Position,
                Field::Department,
                Field::Contact,
            ],
            FormKind::Update => &[
                Field::Id,
                Field::Name,
                Field::Position,
                Field::Department,
                Field::Contact,
            ],
            FormKind::Review => &[Field::Id, Field::Review],
            FormKind::Deactivate => &[Field::Id],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormKind::Add => "add",
            FormKind::Update => "update",
            FormKind::Review => "review",
            FormKind::Deactivate => "deactivate",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormKind {
    type Err = ControllerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        FormKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| ControllerError::UnknownForm(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Id,
    Name,
    Position,
    Department,
    Contact,
    Review,
}

impl Field {
    const ALL: [Field; 6] = [
        Field::Id,
        Field::Name,
        Field::Position,
        Field::Department,
        Field::Contact,
        Field::Review,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::Position => "position",
            Field::Department => "department",
            Field::Contact => "contact",
            Field::Review => "review",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = ControllerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| ControllerError::UnknownFieldName(raw.to_string()))
    }
}

/// Input values of one form, keyed by the fields that form declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    kind: FormKind,
    values: BTreeMap<Field, String>,
}

impl FormState {
    pub fn new(kind: FormKind) -> Self {
        Self {
            kind,
            values: kind
                .fields()
                .iter()
                .map(|field| (*field, String::new()))
                .collect(),
        }
    }

    pub fn value(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub(crate) fn set(&mut self, field: Field, value: String) -> Result<(), ControllerError> {
        match self.values.get_mut(&field) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(ControllerError::UnknownField {
                form: self.kind,
                field,
            }),
        }
    }

    pub fn clear(&mut self) {
        self.values.values_mut().for_each(String::clear);
    }

    pub fn is_blank(&self) -> bool {
        self.values.values().all(|value| value.is_empty())
    }

    pub(crate) fn employee_fields(&self) -> EmployeeFields {
        EmployeeFields {
            name: self.value(Field::Name).to_string(),
            position: self.value(Field::Position).to_string(),
            department: self.value(Field::Department).to_string(),
            contact: self.value(Field::Contact).to_string(),
        }
    }
}

/// Which form sections are shown. The default view shows none of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormVisibility {
    #[default]
    Default,
    Only(FormKind),
}

impl FormVisibility {
    pub fn shows(self, kind: FormKind) -> bool {
        matches!(self, FormVisibility::Only(shown) if shown == kind)
    }
}

/// Forms the hosting page actually provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub add_form: bool,
    pub update_form: bool,
    pub review_form: bool,
    pub deactivate_form: bool,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::full()
    }
}

impl PageLayout {
    pub fn full() -> Self {
        Self {
            add_form: true,
            update_form: true,
            review_form: true,
            deactivate_form: true,
        }
    }

    pub fn without(mut self, kind: FormKind) -> Self {
        *self.slot(kind) = false;
        self
    }

    pub fn has(&self, kind: FormKind) -> bool {
        match kind {
            FormKind::Add => self.add_form,
            FormKind::Update => self.update_form,
            FormKind::Review => self.review_form,
            FormKind::Deactivate => self.deactivate_form,
        }
    }

    fn slot(&mut self, kind: FormKind) -> &mut bool {
        match kind {
            FormKind::Add => &mut self.add_form,
            FormKind::Update => &mut self.update_form,
            FormKind::Review => &mut self.review_form,
            FormKind::Deactivate => &mut self.deactivate_form,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRow {
    pub employee: Employee,
    pub summary: String,
    pub details_href: String,
}

impl EmployeeRow {
    pub fn new(employee: Employee, settings: &ClientSettings) -> Self {
        let summary = format!(
            "ID: {}, Name: {}, Position: {}, Department: {}, Contact: {}, Active: {}",
            employee.id,
            employee.name,
            employee.position,
            employee.department,
            employee.contact,
            if employee.active { "Yes" } else { "No" },
        );
        let details_href = settings.details_href(employee.id.as_str());
        Self {
            employee,
            summary,
            details_href,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListView {
    #[default]
    NotLoaded,
    Rows(Vec<EmployeeRow>),
    Empty,
    Error(String),
}

impl ListView {
    pub fn from_employees(employees: Vec<Employee>, settings: &ClientSettings) -> Self {
        if employees.is_empty() {
            return ListView::Empty;
        }
        ListView::Rows(
            employees
                .into_iter()
                .map(|employee| EmployeeRow::new(employee, settings))
                .collect(),
        )
    }

    pub fn load_error(reason: impl fmt::Display) -> Self {
        ListView::Error(format!("Error loading employees: {reason}"))
    }

    /// Text of every list item, one per rendered entry.
    pub fn items(&self) -> Vec<&str> {
        match self {
            ListView::NotLoaded => Vec::new(),
            ListView::Rows(rows) => rows.iter().map(|row| row.summary.as_str()).collect(),
            ListView::Empty => vec![EMPTY_LIST_PLACEHOLDER],
            ListView::Error(message) => vec![message.as_str()],
        }
    }

    pub fn rows(&self) -> &[EmployeeRow] {
        match self {
            ListView::Rows(rows) => rows,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    layout: PageLayout,
    pub list: ListView,
    pub details: Option<EmployeeRow>,
    forms: BTreeMap<FormKind, FormState>,
    visibility: FormVisibility,
}

impl ViewModel {
    pub fn new(layout: PageLayout) -> Self {
        Self {
            layout,
            list: ListView::NotLoaded,
            details: None,
            forms: FormKind::ALL
                .into_iter()
                .filter(|kind| layout.has(*kind))
                .map(|kind| (kind, FormState::new(kind)))
                .collect(),
            visibility: FormVisibility::Default,
        }
    }

    pub fn layout(&self) -> PageLayout {
        self.layout
    }

    pub fn form(&self, kind: FormKind) -> Option<&FormState> {
        self.forms.get(&kind)
    }

    pub(crate) fn form_mut(&mut self, kind: FormKind) -> Option<&mut FormState> {
        self.forms.get_mut(&kind)
    }

    pub fn visibility(&self) -> FormVisibility {
        self.visibility
    }

    pub(crate) fn set_visibility(&mut self, visibility: FormVisibility) {
        self.visibility = visibility;
    }

    pub fn is_form_visible(&self, kind: FormKind) -> bool {
        self.forms.contains_key(&kind) && self.visibility.shows(kind)
    }
}
