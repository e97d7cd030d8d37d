use super::*;
use async_trait::async_trait;
use employee_client::Result as ClientResult;
use shared::{
    domain::{Employee, EmployeeFields},
    protocol::Ack,
};
use tokio::sync::Notify;

use crate::{
    commands::{dispatch, dispatch_batch},
    events::NotificationKind,
    PageCommand,
};

enum ListFailure {
    Rejected(u16),
    Unreadable,
}

struct Gate {
    entered: Notify,
    release: Notify,
}

#[derive(Default)]
struct FakeApi {
    employees: Mutex<Vec<Employee>>,
    list_failure: Mutex<Option<ListFailure>>,
    mutation_failure: Mutex<Option<(u16, String)>>,
    calls: Mutex<Vec<String>>,
    submitted_fields: Mutex<Vec<EmployeeFields>>,
    create_gate: Option<Gate>,
}

impl FakeApi {
    fn with_employees(employees: Vec<Employee>) -> Self {
        Self {
            employees: Mutex::new(employees),
            ..Self::default()
        }
    }

    fn gated() -> Self {
        Self {
            create_gate: Some(Gate {
                entered: Notify::new(),
                release: Notify::new(),
            }),
            ..Self::default()
        }
    }

    async fn reject_mutations(&self, status: u16, message: &str) {
        *self.mutation_failure.lock().await = Some((status, message.to_string()));
    }

    async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: impl Into<String>) -> ClientResult<()> {
        let call = call.into();
        self.calls.lock().await.push(call.clone());
        if call == "list" {
            return Ok(());
        }
        match &*self.mutation_failure.lock().await {
            Some((status, message)) => Err(ClientError::Rejected {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn unreadable_body() -> ClientError {
    ClientError::Decode {
        what: "employee list",
        source: serde_json::from_str::<serde_json::Value>("<html>").expect_err("not json"),
    }
}

#[async_trait]
impl EmployeeApi for FakeApi {
    async fn list_employees(&self) -> ClientResult<Vec<Employee>> {
        self.record("list").await?;
        match &*self.list_failure.lock().await {
            Some(ListFailure::Rejected(status)) => {
                return Err(ClientError::Rejected {
                    status: *status,
                    message: format!("request failed with status {status}"),
                })
            }
            Some(ListFailure::Unreadable) => return Err(unreadable_body()),
            None => {}
        }
        Ok(self.employees.lock().await.clone())
    }

    async fn get_employee(&self, id: &EmployeeId) -> ClientResult<Employee> {
        self.record(format!("get {id}")).await?;
        self.employees
            .lock()
            .await
            .iter()
            .find(|employee| &employee.id == id)
            .cloned()
            .ok_or_else(|| ClientError::Rejected {
                status: 404,
                message: "Employee not found".into(),
            })
    }

    async fn create_employee(&self, fields: &EmployeeFields) -> ClientResult<Option<Employee>> {
        if let Some(gate) = &self.create_gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.record("create").await?;
        self.submitted_fields.lock().await.push(fields.clone());
        let mut employees = self.employees.lock().await;
        let employee = Employee {
            id: EmployeeId::new((employees.len() + 1).to_string()),
            name: fields.name.clone(),
            position: fields.position.clone(),
            department: fields.department.clone(),
            contact: fields.contact.clone(),
            active: true,
        };
        employees.push(employee.clone());
        Ok(Some(employee))
    }

    async fn update_employee(
        &self,
        id: &EmployeeId,
        fields: &EmployeeFields,
    ) -> ClientResult<Option<Employee>> {
        self.record(format!("update {id}")).await?;
        self.submitted_fields.lock().await.push(fields.clone());
        Ok(None)
    }

    async fn add_review(&self, id: &EmployeeId, review: &str) -> ClientResult<Ack> {
        self.record(format!("review {id} {review}")).await?;
        Ok(Ack {
            message: Some("Review added".into()),
        })
    }

    async fn deactivate_employee(&self, id: &EmployeeId) -> ClientResult<Ack> {
        self.record(format!("deactivate {id}")).await?;
        for employee in self.employees.lock().await.iter_mut() {
            if &employee.id == id {
                employee.active = false;
            }
        }
        Ok(Ack::default())
    }

    async fn delete_employee(&self, id: &EmployeeId) -> ClientResult<()> {
        self.record(format!("delete {id}")).await?;
        self.employees
            .lock()
            .await
            .retain(|employee| &employee.id != id);
        Ok(())
    }
}

fn employee(id: &str, name: &str) -> Employee {
    Employee {
        id: EmployeeId::new(id),
        name: name.into(),
        position: "Engineer".into(),
        department: "R&D".into(),
        contact: format!("{}@example.com", name.to_lowercase()),
        active: true,
    }
}

fn page_with(api: Arc<FakeApi>) -> Arc<EmployeePage> {
    EmployeePage::new(api, PageLayout::full(), ClientSettings::default())
}

async fn fill(page: &EmployeePage, kind: FormKind, values: &[(Field, &str)]) {
    for (field, value) in values {
        page.set_input(kind, *field, *value).await.expect("set input");
    }
}

const NEW_HIRE: [(Field, &str); 4] = [
    (Field::Name, "Grace"),
    (Field::Position, "Admiral"),
    (Field::Department, "Navy"),
    (Field::Contact, "grace@example.com"),
];

#[tokio::test]
async fn init_renders_one_row_per_employee() {
    let api = Arc::new(FakeApi::with_employees(vec![
        employee("1", "Ada"),
        employee("2", "Linus"),
    ]));
    let page = page_with(api.clone());

    let list = page.init().await;

    assert_eq!(list.rows().len(), 2);
    let items = list.items();
    assert_eq!(items.len(), 2);
    for part in ["ID: 1", "Ada", "Engineer", "R&D", "ada@example.com", "Active: Yes"] {
        assert!(items[0].contains(part), "row missing {part}");
    }
    assert_eq!(list.rows()[1].details_href, "/employee-details.html?id=2");
    assert_eq!(page.view().await.list, list);
    assert_eq!(api.calls().await, vec!["list"]);
}

#[tokio::test]
async fn empty_list_renders_single_placeholder() {
    let page = page_with(Arc::new(FakeApi::default()));

    let list = page.load_employees().await;

    assert_eq!(list, ListView::Empty);
    assert_eq!(list.items(), vec![crate::view::EMPTY_LIST_PLACEHOLDER]);
    assert!(list.rows().is_empty());
}

#[tokio::test]
async fn failed_list_load_renders_single_error_item_without_notifying() {
    let api = Arc::new(FakeApi::with_employees(vec![employee("1", "Ada")]));
    let page = page_with(api.clone());
    page.load_employees().await;
    let mut events = page.subscribe_events();

    *api.list_failure.lock().await = Some(ListFailure::Rejected(503));
    let list = page.load_employees().await;

    assert!(list.rows().is_empty());
    assert_eq!(
        list.items(),
        vec!["Error loading employees: request failed with status 503"]
    );
    assert!(matches!(events.try_recv(), Ok(PageEvent::ListRendered(_))));
    assert!(events.try_recv().is_err());

    *api.list_failure.lock().await = Some(ListFailure::Unreadable);
    let list = page.load_employees().await;
    assert_eq!(list.items().len(), 1);
    assert!(matches!(list, ListView::Error(_)));
}

#[tokio::test]
async fn successful_add_reloads_and_clears_the_form() {
    let api = Arc::new(FakeApi::default());
    let page = page_with(api.clone());
    fill(&page, FormKind::Add, &NEW_HIRE).await;

    let outcome = page.add_employee().await;

    assert_eq!(outcome, ActionOutcome::Succeeded);
    assert_eq!(api.calls().await, vec!["create", "list"]);
    let view = page.view().await;
    assert!(view.form(FormKind::Add).expect("add form").is_blank());
    assert_eq!(view.list.rows().len(), 1);
    assert_eq!(
        api.submitted_fields.lock().await[0],
        EmployeeFields {
            name: "Grace".into(),
            position: "Admiral".into(),
            department: "Navy".into(),
            contact: "grace@example.com".into(),
        }
    );
}

#[tokio::test]
async fn rejected_add_keeps_form_and_notifies_with_server_message() {
    let api = Arc::new(FakeApi::default());
    api.reject_mutations(400, "Invalid employee data").await;
    let page = page_with(api.clone());
    fill(&page, FormKind::Add, &NEW_HIRE).await;
    let mut events = page.subscribe_events();

    let outcome = page.add_employee().await;

    let ActionOutcome::Failed(notification) = outcome else {
        panic!("expected failure");
    };
    assert_eq!(notification.kind, NotificationKind::Rejected);
    assert_eq!(notification.message, "Invalid employee data");
    assert_eq!(api.calls().await, vec!["create"]);
    let form = page.view().await.form(FormKind::Add).cloned().expect("form");
    assert_eq!(form.value(Field::Name), "Grace");
    match events.try_recv() {
        Ok(PageEvent::Notification(published)) => assert_eq!(published, notification),
        other => panic!("expected notification event, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_update_keeps_values_and_visibility() {
    let api = Arc::new(FakeApi::default());
    api.reject_mutations(404, "Employee not found").await;
    let page = page_with(api.clone());
    page.toggle_visibility(FormKind::Update).await;
    fill(&page, FormKind::Update, &[(Field::Id, "9"), (Field::Name, "Grace")]).await;

    let outcome = page.update_employee().await;

    assert!(matches!(outcome, ActionOutcome::Failed(_)));
    let view = page.view().await;
    assert_eq!(view.visibility(), FormVisibility::Only(FormKind::Update));
    let form = view.form(FormKind::Update).expect("form");
    assert_eq!(form.value(Field::Id), "9");
    assert_eq!(form.value(Field::Name), "Grace");
    assert_eq!(api.calls().await, vec!["update 9"]);
}

#[tokio::test]
async fn successful_update_restores_default_view() {
    let api = Arc::new(FakeApi::with_employees(vec![employee("9", "Grace")]));
    let page = page_with(api.clone());
    page.toggle_visibility(FormKind::Update).await;
    fill(&page, FormKind::Update, &[(Field::Id, " 9 ")]).await;
    fill(&page, FormKind::Update, &NEW_HIRE).await;

    let outcome = page.update_employee().await;

    assert!(outcome.is_success());
    assert_eq!(api.calls().await, vec!["update 9", "list"]);
    let view = page.view().await;
    assert_eq!(view.visibility(), FormVisibility::Default);
    assert!(!view.is_form_visible(FormKind::Update));
    assert!(view.form(FormKind::Update).expect("form").is_blank());
}

#[tokio::test]
async fn review_clears_only_its_form_and_skips_reload() {
    let api = Arc::new(FakeApi::with_employees(vec![employee("3", "Ada")]));
    let page = page_with(api.clone());
    fill(&page, FormKind::Add, &NEW_HIRE).await;
    fill(
        &page,
        FormKind::Review,
        &[(Field::Id, "3"), (Field::Review, "Excellent")],
    )
    .await;

    let outcome = page.add_performance_review().await;

    assert!(outcome.is_success());
    assert_eq!(api.calls().await, vec!["review 3 Excellent"]);
    let view = page.view().await;
    assert!(view.form(FormKind::Review).expect("review").is_blank());
    assert_eq!(
        view.form(FormKind::Add).expect("add").value(Field::Name),
        "Grace"
    );
}

#[tokio::test]
async fn deactivate_reloads_list_with_inactive_employee() {
    let api = Arc::new(FakeApi::with_employees(vec![employee("5", "Linus")]));
    let page = page_with(api.clone());
    fill(&page, FormKind::Deactivate, &[(Field::Id, "5")]).await;

    let outcome = page.deactivate_employee().await;

    assert!(outcome.is_success());
    assert_eq!(api.calls().await, vec!["deactivate 5", "list"]);
    let view = page.view().await;
    assert!(!view.list.rows()[0].employee.active);
    assert!(view.list.rows()[0].summary.contains("Active: No"));
    assert!(view.form(FormKind::Deactivate).expect("form").is_blank());
}

#[tokio::test]
async fn blank_id_fails_validation_without_a_request() {
    let api = Arc::new(FakeApi::default());
    let page = page_with(api.clone());
    fill(&page, FormKind::Deactivate, &[(Field::Id, "   ")]).await;

    let outcome = page.deactivate_employee().await;

    let ActionOutcome::Failed(notification) = outcome else {
        panic!("expected validation failure");
    };
    assert_eq!(notification.kind, NotificationKind::Validation);
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn missing_form_is_tolerated() {
    let api = Arc::new(FakeApi::default());
    let page = EmployeePage::new(
        api.clone(),
        PageLayout::full().without(FormKind::Review),
        ClientSettings::default(),
    );

    let outcome = page.add_performance_review().await;

    assert_eq!(
        outcome,
        ActionOutcome::Skipped(SkipReason::FormMissing(FormKind::Review))
    );
    assert!(!page.clear_form(FormKind::Review).await);
    assert!(matches!(
        page.set_input(FormKind::Review, Field::Id, "1").await,
        Err(ControllerError::FormMissing(FormKind::Review))
    ));
    page.toggle_visibility(FormKind::Review).await;
    assert!(!page.view().await.is_form_visible(FormKind::Review));
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn concurrent_submissions_of_one_form_issue_one_request() {
    let api = Arc::new(FakeApi::gated());
    let page = page_with(api.clone());
    fill(&page, FormKind::Add, &NEW_HIRE).await;

    let first = tokio::spawn({
        let page = Arc::clone(&page);
        async move { page.add_employee().await }
    });
    api.create_gate
        .as_ref()
        .expect("gate")
        .entered
        .notified()
        .await;

    let second = page.add_employee().await;
    assert_eq!(
        second,
        ActionOutcome::Skipped(SkipReason::InFlight(FormKind::Add))
    );

    // Other forms are not blocked by the add form's submission.
    fill(&page, FormKind::Deactivate, &[(Field::Id, "1")]).await;
    assert!(page.deactivate_employee().await.is_success());

    api.create_gate
        .as_ref()
        .expect("gate")
        .release
        .notify_one();
    assert!(first.await.expect("join").is_success());

    let creates = api
        .calls()
        .await
        .into_iter()
        .filter(|call| call == "create")
        .count();
    assert_eq!(creates, 1);
}

#[tokio::test]
async fn guard_is_released_after_a_failure() {
    let api = Arc::new(FakeApi::default());
    api.reject_mutations(500, "boom").await;
    let page = page_with(api.clone());
    fill(&page, FormKind::Add, &NEW_HIRE).await;

    assert!(matches!(page.add_employee().await, ActionOutcome::Failed(_)));
    *api.mutation_failure.lock().await = None;
    assert!(page.add_employee().await.is_success());
}

#[tokio::test]
async fn toggle_shows_exactly_one_form() {
    let page = page_with(Arc::new(FakeApi::default()));

    page.toggle_visibility(FormKind::Review).await;
    let view = page.view().await;
    let visible: Vec<FormKind> = FormKind::ALL
        .into_iter()
        .filter(|kind| view.is_form_visible(*kind))
        .collect();
    assert_eq!(visible, vec![FormKind::Review]);

    page.show_default_view().await;
    let view = page.view().await;
    assert!(FormKind::ALL
        .into_iter()
        .all(|kind| !view.is_form_visible(kind)));
}

#[tokio::test]
async fn open_details_populates_details_view() {
    let api = Arc::new(FakeApi::with_employees(vec![employee("7", "Ada")]));
    let page = page_with(api.clone());

    assert!(page.open_details("7").await.is_success());
    let details = page.view().await.details.expect("details");
    assert_eq!(details.employee.name, "Ada");
    assert_eq!(details.details_href, "/employee-details.html?id=7");

    let outcome = page.open_details("8").await;
    let ActionOutcome::Failed(notification) = outcome else {
        panic!("expected not found");
    };
    assert_eq!(notification.message, "Employee not found");
}

#[tokio::test]
async fn delete_reloads_the_list() {
    let api = Arc::new(FakeApi::with_employees(vec![
        employee("1", "Ada"),
        employee("2", "Linus"),
    ]));
    let page = page_with(api.clone());

    assert!(page.delete_employee("1").await.is_success());
    assert_eq!(api.calls().await, vec!["delete 1", "list"]);
    assert_eq!(page.view().await.list.rows().len(), 1);
}

#[tokio::test]
async fn dispatch_reports_invalid_input_as_validation_failure() {
    let page = page_with(Arc::new(FakeApi::default()));
    let mut events = page.subscribe_events();

    let outcome = dispatch(
        &page,
        PageCommand::SetInput {
            form: FormKind::Deactivate,
            field: Field::Review,
            value: "text".into(),
        },
    )
    .await;

    let ActionOutcome::Failed(notification) = outcome else {
        panic!("expected failure");
    };
    assert_eq!(notification.kind, NotificationKind::Validation);
    assert_eq!(notification.message, "the deactivate form has no review field");
    match events.try_recv() {
        Ok(PageEvent::Notification(published)) => assert_eq!(published, notification),
        other => panic!("expected notification event, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_input_stops_the_batch_before_submit() {
    let api = Arc::new(FakeApi::default());
    let page = page_with(api.clone());
    let mut events = page.subscribe_events();

    let outcomes = dispatch_batch(
        &page,
        vec![
            PageCommand::SetInput {
                form: FormKind::Add,
                field: Field::Name,
                value: "Grace".into(),
            },
            PageCommand::SetInput {
                form: FormKind::Add,
                field: Field::Id,
                value: "5".into(),
            },
            PageCommand::Submit(FormKind::Add),
        ],
    )
    .await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].is_success());
    assert!(matches!(
        &outcomes[1],
        ActionOutcome::Failed(notification) if notification.message == "the add form has no id field"
    ));
    assert!(api.calls().await.is_empty());
    assert!(matches!(events.try_recv(), Ok(PageEvent::Notification(_))));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn batch_runs_every_command_when_inputs_are_accepted() {
    let api = Arc::new(FakeApi::default());
    let page = page_with(api.clone());

    let outcomes = dispatch_batch(
        &page,
        vec![
            PageCommand::SetInput {
                form: FormKind::Deactivate,
                field: Field::Id,
                value: "7".into(),
            },
            PageCommand::Submit(FormKind::Deactivate),
        ],
    )
    .await;

    assert_eq!(outcomes.len(), 2);
    assert!(api.calls().await.contains(&"deactivate 7".to_string()));
}
