use super::*;
use anyhow::Result as AnyResult;
use shared::domain::AnswerValue;
use storage::{FileStore, MemoryStore};

/// Store whose writes always fail, for exercising the lenient
/// write-failure policy.
#[derive(Default)]
struct RefusingStore {
    entries: std::collections::HashMap<String, String>,
}

impl KeyValueStore for RefusingStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_string(&mut self, _key: &str, _value: String) -> AnyResult<()> {
        anyhow::bail!("store is full")
    }
}

fn controller() -> AppController<MemoryStore> {
    AppController::new(MemoryStore::default())
}

fn titled_form(id: &str, title: &str) -> Form {
    let mut form = Form::new(id);
    form.title = title.to_string();
    form.fields = vec![FormField::Text {
        id: format!("{id}-f1"),
        label: "Your name".to_string(),
        required: true,
    }];
    form
}

fn drain_notices<S: KeyValueStore>(app: &mut AppController<S>) -> Vec<Notice> {
    std::iter::from_fn(|| app.pop_notice()).collect()
}

#[test]
fn starts_on_the_list_view_with_empty_collections() {
    let app = controller();
    assert_eq!(app.view(), AppView::List);
    assert!(app.nav().active_form_id.is_none());
    assert!(app.forms().is_empty());
    assert!(app.responses().is_empty());
}

#[test]
fn rejects_blank_titles_without_touching_state() {
    let mut app = controller();
    let mut form = Form::new("form1");
    form.title = "   \t ".to_string();

    let err = app.save_form(form).expect_err("blank title must be rejected");
    assert_eq!(err.kind, shared::error::ErrorKind::Validation);
    assert!(app.forms().is_empty());

    let notices = drain_notices(&mut app);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, NoticeSeverity::Warning);
}

#[test]
fn saving_appends_then_replaces_by_id() {
    let mut app = controller();
    app.save_form(titled_form("form1", "Survey")).expect("save");
    app.save_form(titled_form("form2", "Quiz")).expect("save");

    let mut edited = titled_form("form1", "Survey v2");
    edited.fields.clear();
    app.save_form(edited).expect("resave");

    assert_eq!(app.forms().len(), 2);
    assert_eq!(app.forms()[0].title, "Survey v2");
    assert!(app.forms()[0].fields.is_empty());
    assert_eq!(app.forms()[1].title, "Quiz");
}

#[test]
fn saving_returns_to_the_list_view() {
    let mut app = controller();
    app.open_builder(None);
    let draft = app.draft_mut().expect("draft");
    draft.title = "Survey".to_string();

    app.save_draft().expect("save draft");
    assert_eq!(app.view(), AppView::List);
    assert!(app.draft().is_none());
    assert_eq!(app.forms().len(), 1);
}

#[test]
fn builder_edits_do_not_touch_the_saved_form_until_saved() {
    let mut app = controller();
    app.save_form(titled_form("form1", "Survey")).expect("save");

    app.open_builder(Some("form1"));
    let draft = app.draft_mut().expect("draft");
    draft.title = "Renamed".to_string();
    draft.fields.clear();

    // The authoritative copy is untouched while the draft diverges.
    assert_eq!(app.forms()[0].title, "Survey");
    assert_eq!(app.forms()[0].fields.len(), 1);

    app.save_draft().expect("save draft");
    assert_eq!(app.forms()[0].title, "Renamed");
    assert!(app.forms()[0].fields.is_empty());
}

#[test]
fn opening_the_builder_with_an_unknown_id_edits_a_fresh_form() {
    let mut app = controller();
    app.open_builder(Some("missing"));
    assert_eq!(app.view(), AppView::Builder);
    let draft = app.draft().expect("draft");
    assert_ne!(draft.id, "missing");
    assert!(draft.title.is_empty());
    assert!(draft.fields.is_empty());
}

#[test]
fn viewer_and_responses_fall_back_to_the_list_for_unknown_ids() {
    let mut app = controller();
    assert!(app.open_viewer("missing").is_err());
    assert_eq!(app.view(), AppView::List);

    assert!(app.open_responses("missing").is_err());
    assert_eq!(app.view(), AppView::List);

    let notices = drain_notices(&mut app);
    assert_eq!(notices.len(), 2);
    assert!(notices
        .iter()
        .all(|notice| notice.severity == NoticeSeverity::Error));
}

#[test]
fn delete_removes_exactly_the_form_and_its_responses() {
    let mut app = controller();
    app.save_form(titled_form("form1", "Survey")).expect("save");
    app.save_form(titled_form("form2", "Quiz")).expect("save");

    let mut answers = AnswerMap::new();
    answers.insert(
        "form1-f1".to_string(),
        AnswerValue::Single("hello".to_string()),
    );
    app.submit_response("form1", answers.clone()).expect("submit");
    app.submit_response("form2", answers.clone()).expect("submit");
    app.submit_response("form1", answers).expect("submit");

    app.delete_form("form1").expect("delete");

    assert_eq!(app.forms().len(), 1);
    assert_eq!(app.forms()[0].id, "form2");
    assert_eq!(app.responses().len(), 1);
    assert_eq!(app.responses()[0].form_id, "form2");
}

#[test]
fn deleting_an_unknown_form_reports_not_found() {
    let mut app = controller();
    app.save_form(titled_form("form1", "Survey")).expect("save");
    drain_notices(&mut app);

    let err = app.delete_form("missing").expect_err("unknown id");
    assert_eq!(err.kind, shared::error::ErrorKind::NotFound);
    assert_eq!(app.forms().len(), 1);

    let notices = drain_notices(&mut app);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, NoticeSeverity::Error);
}

#[test]
fn deleting_the_open_form_navigates_home() {
    let mut app = controller();
    app.save_form(titled_form("form1", "Survey")).expect("save");
    app.open_viewer("form1").expect("open viewer");
    assert_eq!(app.view(), AppView::Viewer);

    app.delete_form("form1").expect("delete");
    assert_eq!(app.view(), AppView::List);
    assert!(app.nav().active_form_id.is_none());
}

#[test]
fn submitting_to_a_deleted_form_is_rejected() {
    let mut app = controller();
    let err = app
        .submit_response("missing", AnswerMap::new())
        .expect_err("unknown form");
    assert_eq!(err.kind, shared::error::ErrorKind::NotFound);
    assert!(app.responses().is_empty());
}

#[test]
fn survey_scenario_submit_then_cascade_delete() {
    let mut app = controller();
    app.save_form(titled_form("form1", "Survey")).expect("save");

    let mut answers = AnswerMap::new();
    answers.insert(
        "form1-f1".to_string(),
        AnswerValue::Single("hello".to_string()),
    );
    app.submit_response("form1", answers).expect("submit");

    assert_eq!(app.responses().len(), 1);
    assert_eq!(
        app.responses()[0].responses.get("form1-f1"),
        Some(&AnswerValue::Single("hello".to_string()))
    );
    assert!(app.responses()[0].submitted_at > 0);

    app.delete_form("form1").expect("delete");
    assert!(app.forms().is_empty());
    assert!(app.responses().is_empty());
}

#[test]
fn collections_survive_a_controller_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let store = FileStore::open(dir.path()).expect("store");
        let mut app = AppController::new(store);
        app.save_form(titled_form("form1", "Survey")).expect("save");
        let mut answers = AnswerMap::new();
        answers.insert(
            "form1-f1".to_string(),
            AnswerValue::Single("hello".to_string()),
        );
        app.submit_response("form1", answers).expect("submit");
    }

    let store = FileStore::open(dir.path()).expect("store");
    let app = AppController::new(store);
    assert_eq!(app.forms().len(), 1);
    assert_eq!(app.forms()[0].title, "Survey");
    assert_eq!(app.responses().len(), 1);
    assert_eq!(app.responses()[0].form_id, "form1");
}

#[test]
fn write_failures_warn_but_keep_the_in_memory_change() {
    let mut app = AppController::new(RefusingStore::default());
    app.save_form(titled_form("form1", "Survey"))
        .expect("save keeps in-memory state");

    assert_eq!(app.forms().len(), 1);
    let notices = drain_notices(&mut app);
    // Write warning first, then the save confirmation.
    assert_eq!(notices[0].severity, NoticeSeverity::Warning);
    assert!(notices[0].message.contains("Could not save forms"));
    assert_eq!(notices[1].severity, NoticeSeverity::Info);
}

#[test]
fn flags_missing_required_answers() {
    let form = Form {
        id: "form1".to_string(),
        title: "Survey".to_string(),
        fields: vec![
            FormField::Text {
                id: "f1".to_string(),
                label: "Name".to_string(),
                required: true,
            },
            FormField::Radio {
                id: "f2".to_string(),
                label: "Pick one".to_string(),
                required: true,
                options: vec![new_option(1)],
            },
            FormField::Checkbox {
                id: "f3".to_string(),
                label: "Pick any".to_string(),
                required: true,
                options: vec![new_option(1)],
            },
            FormField::Text {
                id: "f4".to_string(),
                label: "Optional".to_string(),
                required: false,
            },
        ],
    };

    let mut answers = AnswerMap::new();
    answers.insert("f1".to_string(), AnswerValue::Single(String::new()));
    answers.insert("f3".to_string(), AnswerValue::Many(Vec::new()));
    assert_eq!(missing_required_fields(&form, &answers), vec!["f1", "f2", "f3"]);

    answers.insert("f1".to_string(), AnswerValue::Single("Ada".to_string()));
    answers.insert("f2".to_string(), AnswerValue::Single("option-1".to_string()));
    answers.insert(
        "f3".to_string(),
        AnswerValue::Many(vec!["option-1".to_string()]),
    );
    assert!(missing_required_fields(&form, &answers).is_empty());
}

#[test]
fn default_fields_start_with_one_option() {
    let radio = new_field(FieldKind::Radio);
    assert_eq!(radio.label(), "New Question (Radio)");
    assert_eq!(radio.options().expect("options").len(), 1);
    assert_eq!(radio.options().expect("options")[0].label, "Option 1");
    assert_eq!(radio.options().expect("options")[0].value, "option-1");

    let text = new_field(FieldKind::Text);
    assert!(text.options().is_none());
    assert!(!text.required());
}

#[test]
fn notices_drain_in_fifo_order() {
    let mut app = controller();
    app.push_notice(NoticeSeverity::Info, "first");
    app.push_notice(NoticeSeverity::Error, "second");
    assert_eq!(app.pop_notice().expect("first").message, "first");
    assert_eq!(app.pop_notice().expect("second").message, "second");
    assert!(app.pop_notice().is_none());
}
