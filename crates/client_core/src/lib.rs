//! Application controller: in-memory collections, navigation state, and the
//! mutations the renderer invokes. Everything here is renderer-independent;
//! the GUI observes state through accessors and drains the notice queue for
//! user-facing dialogs.

use std::collections::VecDeque;

use tracing::{error, info, warn};

use shared::{
    domain::{AnswerMap, FieldKind, FieldOption, Form, FormField, FormResponse},
    error::AppError,
};
use storage::{FormStore, KeyValueStore};

/// Which of the four screens is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    List,
    Builder,
    Viewer,
    Responses,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub view: AppView,
    pub active_form_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Info,
    Warning,
    Error,
}

/// A synchronous, user-acknowledged message. The renderer presents notices
/// one at a time as blocking dialogs, in the order they were raised.
#[derive(Debug, Clone)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub message: String,
}

pub struct AppController<S> {
    store: FormStore<S>,
    forms: Vec<Form>,
    responses: Vec<FormResponse>,
    nav: Navigation,
    draft: Option<Form>,
    notices: VecDeque<Notice>,
}

impl<S: KeyValueStore> AppController<S> {
    /// Loads both collections and starts on the form list.
    pub fn new(store: S) -> Self {
        let store = FormStore::new(store);
        let forms = store.load_forms();
        let responses = store.load_responses();
        info!(
            forms = forms.len(),
            responses = responses.len(),
            "loaded persisted collections"
        );
        Self {
            store,
            forms,
            responses,
            nav: Navigation {
                view: AppView::List,
                active_form_id: None,
            },
            draft: None,
            notices: VecDeque::new(),
        }
    }

    pub fn forms(&self) -> &[Form] {
        &self.forms
    }

    pub fn responses(&self) -> &[FormResponse] {
        &self.responses
    }

    pub fn nav(&self) -> &Navigation {
        &self.nav
    }

    pub fn view(&self) -> AppView {
        self.nav.view
    }

    /// The form the viewer/responses screens are focused on.
    pub fn active_form(&self) -> Option<&Form> {
        let id = self.nav.active_form_id.as_deref()?;
        storage::get_form_by_id(id, &self.forms)
    }

    pub fn responses_for_active_form(&self) -> Vec<&FormResponse> {
        match self.nav.active_form_id.as_deref() {
            Some(id) => storage::get_responses_by_form_id(id, &self.responses),
            None => Vec::new(),
        }
    }

    /// The builder's working copy. Edits here touch nothing authoritative
    /// until [`save_draft`](Self::save_draft).
    pub fn draft(&self) -> Option<&Form> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut Form> {
        self.draft.as_mut()
    }

    pub fn push_notice(&mut self, severity: NoticeSeverity, message: impl Into<String>) {
        self.notices.push_back(Notice {
            severity,
            message: message.into(),
        });
    }

    pub fn pop_notice(&mut self) -> Option<Notice> {
        self.notices.pop_front()
    }

    // ---------- Navigation ----------

    pub fn go_home(&mut self) {
        self.nav = Navigation {
            view: AppView::List,
            active_form_id: None,
        };
        self.draft = None;
    }

    /// Opens the builder. With an id, the draft is a detached clone of the
    /// stored form; an unknown id logs the fault and falls back to editing
    /// a fresh form. Without an id, a fresh empty form is created.
    pub fn open_builder(&mut self, form_id: Option<&str>) {
        let draft = match form_id {
            Some(id) => match storage::get_form_by_id(id, &self.forms) {
                Some(form) => form.clone(),
                None => {
                    error!(form_id = id, "form not found, editing a new form instead");
                    Form::new(storage::generate_id())
                }
            },
            None => Form::new(storage::generate_id()),
        };
        self.nav = Navigation {
            view: AppView::Builder,
            active_form_id: Some(draft.id.clone()),
        };
        self.draft = Some(draft);
    }

    pub fn open_viewer(&mut self, form_id: &str) -> Result<(), AppError> {
        if storage::get_form_by_id(form_id, &self.forms).is_none() {
            error!(form_id, "cannot view form, id not found");
            self.push_notice(
                NoticeSeverity::Error,
                "Error: Could not find the form to view.",
            );
            self.go_home();
            return Err(AppError::not_found(format!("form {form_id} not found")));
        }
        self.nav = Navigation {
            view: AppView::Viewer,
            active_form_id: Some(form_id.to_string()),
        };
        Ok(())
    }

    pub fn open_responses(&mut self, form_id: &str) -> Result<(), AppError> {
        if storage::get_form_by_id(form_id, &self.forms).is_none() {
            error!(form_id, "cannot view responses, form id not found");
            self.push_notice(NoticeSeverity::Error, "Error: Could not find the form.");
            self.go_home();
            return Err(AppError::not_found(format!("form {form_id} not found")));
        }
        self.nav = Navigation {
            view: AppView::Responses,
            active_form_id: Some(form_id.to_string()),
        };
        Ok(())
    }

    // ---------- Mutations ----------

    /// Saves the current builder draft.
    pub fn save_draft(&mut self) -> Result<(), AppError> {
        let Some(draft) = self.draft.clone() else {
            return Err(AppError::validation("no form is being edited"));
        };
        self.save_form(draft)
    }

    /// Upserts a form by id, persists the collection, and returns to the
    /// list. A blank title aborts with a validation notice and leaves both
    /// the collection and the stored blob untouched.
    pub fn save_form(&mut self, form: Form) -> Result<(), AppError> {
        if form.title.trim().is_empty() {
            self.push_notice(
                NoticeSeverity::Warning,
                "Please provide a title for the form.",
            );
            return Err(AppError::validation("form title must not be empty"));
        }

        match self.forms.iter_mut().find(|f| f.id == form.id) {
            Some(slot) => {
                *slot = form.clone();
                info!(form_id = %form.id, "form updated");
            }
            None => {
                info!(form_id = %form.id, "form added");
                self.forms.push(form.clone());
            }
        }
        self.persist_forms();
        self.push_notice(
            NoticeSeverity::Info,
            format!("Form \"{}\" saved successfully!", form.display_title()),
        );
        self.go_home();
        Ok(())
    }

    /// Removes a form and every response submitted to it. The cascade is
    /// two independent writes with no transaction: a crash between them
    /// can leave responses referencing a deleted form.
    pub fn delete_form(&mut self, form_id: &str) -> Result<(), AppError> {
        let forms_before = self.forms.len();
        self.forms.retain(|form| form.id != form_id);
        if self.forms.len() == forms_before {
            error!(form_id, "delete failed, form id not found");
            self.push_notice(
                NoticeSeverity::Error,
                "Error: Could not find the form to delete.",
            );
            return Err(AppError::not_found(format!("form {form_id} not found")));
        }
        self.persist_forms();

        let responses_before = self.responses.len();
        self.responses.retain(|response| response.form_id != form_id);
        if self.responses.len() < responses_before {
            self.persist_responses();
            info!(
                form_id,
                removed = responses_before - self.responses.len(),
                "deleted responses for form"
            );
        }

        info!(form_id, "form deleted");
        self.push_notice(NoticeSeverity::Info, "Form deleted successfully.");
        if self.nav.active_form_id.as_deref() == Some(form_id) {
            self.go_home();
        }
        Ok(())
    }

    /// Appends a response for `form_id` with a fresh id and the current
    /// timestamp. Submitting to a deleted form is rejected and appends
    /// nothing.
    pub fn submit_response(&mut self, form_id: &str, answers: AnswerMap) -> Result<(), AppError> {
        if storage::get_form_by_id(form_id, &self.forms).is_none() {
            error!(form_id, "submit failed, form id not found");
            self.push_notice(
                NoticeSeverity::Error,
                "Error: Cannot submit response, the form no longer exists.",
            );
            return Err(AppError::not_found(format!("form {form_id} not found")));
        }

        let response = FormResponse {
            id: storage::generate_id(),
            form_id: form_id.to_string(),
            submitted_at: chrono::Utc::now().timestamp_millis(),
            responses: answers,
        };
        info!(form_id, response_id = %response.id, "response submitted");
        self.responses.push(response);
        self.persist_responses();
        Ok(())
    }

    // A failed write keeps the in-memory change; it is simply not durable.
    fn persist_forms(&mut self) {
        if let Err(err) = self.store.save_forms(&self.forms) {
            warn!(error = %err, "failed to persist forms");
            self.push_notice(
                NoticeSeverity::Warning,
                "Could not save forms. The local store may be full or unavailable.",
            );
        }
    }

    fn persist_responses(&mut self) {
        if let Err(err) = self.store.save_responses(&self.responses) {
            warn!(error = %err, "failed to persist responses");
            self.push_notice(
                NoticeSeverity::Warning,
                "Could not save responses. The local store may be full or unavailable.",
            );
        }
    }
}

/// Ids of required fields whose answer is missing or empty: required
/// text/radio fields need a non-empty string, required checkbox groups need
/// at least one selection.
pub fn missing_required_fields(form: &Form, answers: &AnswerMap) -> Vec<String> {
    form.fields
        .iter()
        .filter(|field| field.required())
        .filter(|field| answers.get(field.id()).map_or(true, |answer| answer.is_empty()))
        .map(|field| field.id().to_string())
        .collect()
}

/// A freshly-defaulted field of the given kind, as appended by the
/// builder's "Add Field" control. Choice fields start with one option.
pub fn new_field(kind: FieldKind) -> FormField {
    let id = storage::generate_id();
    match kind {
        FieldKind::Text => FormField::Text {
            id,
            label: "New Question (Text)".to_string(),
            required: false,
        },
        FieldKind::Radio => FormField::Radio {
            id,
            label: "New Question (Radio)".to_string(),
            required: false,
            options: vec![new_option(1)],
        },
        FieldKind::Checkbox => FormField::Checkbox {
            id,
            label: "New Question (Checkbox)".to_string(),
            required: false,
            options: vec![new_option(1)],
        },
    }
}

/// A numbered default option ("Option N") with its derived value.
pub fn new_option(position: usize) -> FieldOption {
    FieldOption::new(storage::generate_id(), format!("Option {position}"))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
