use std::{
    collections::{BTreeSet, HashMap, HashSet},
    path::PathBuf,
};

use eframe::egui;

use client_core::{AppController, AppView, NoticeSeverity};
use shared::domain::{AnswerMap, AnswerValue, FieldKind, Form, FormField};
use storage::FileStore;

const ERROR_RED: egui::Color32 = egui::Color32::from_rgb(205, 92, 92);

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_root: PathBuf,
    pub store_dir: PathBuf,
}

impl AppPaths {
    /// Resolves the data root: explicit override, then FORMDESK_DATA_DIR,
    /// then the platform-local application data directory.
    pub fn resolve(data_dir_override: Option<PathBuf>) -> anyhow::Result<Self> {
        let root = if let Some(dir) = data_dir_override {
            dir
        } else if let Some(dir) = std::env::var("FORMDESK_DATA_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
        {
            PathBuf::from(dir)
        } else {
            let base = dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("unable to resolve local app data dir"))?;
            base.join("formdesk")
        };

        Ok(Self {
            store_dir: root.join("store"),
            data_root: root,
        })
    }
}

/// In-progress answers for the viewer, keyed by field id. Cleared when the
/// viewer is left or a submission succeeds.
#[derive(Debug, Default)]
struct AnswerDraft {
    text: HashMap<String, String>,
    radio: HashMap<String, String>,
    checks: HashMap<String, BTreeSet<String>>,
}

impl AnswerDraft {
    fn clear(&mut self) {
        self.text.clear();
        self.radio.clear();
        self.checks.clear();
    }

    /// Collects one answer per form field: text and radio become single
    /// strings (empty when unanswered, matching the stored format), checkbox
    /// selections become a list ordered by the field's option order.
    fn collect(&self, form: &Form) -> AnswerMap {
        let mut answers = AnswerMap::new();
        for field in &form.fields {
            let id = field.id();
            let value = match field.kind() {
                FieldKind::Text => {
                    AnswerValue::Single(self.text.get(id).cloned().unwrap_or_default())
                }
                FieldKind::Radio => {
                    AnswerValue::Single(self.radio.get(id).cloned().unwrap_or_default())
                }
                FieldKind::Checkbox => {
                    let selected = self.checks.get(id);
                    let values = field
                        .options()
                        .map(|options| {
                            options
                                .iter()
                                .filter(|option| {
                                    selected.is_some_and(|set| set.contains(&option.value))
                                })
                                .map(|option| option.value.clone())
                                .collect()
                        })
                        .unwrap_or_default();
                    AnswerValue::Many(values)
                }
            };
            answers.insert(id.to_string(), value);
        }
        answers
    }
}

struct PendingFormDelete {
    form_id: String,
    title: String,
}

struct PendingFieldDelete {
    index: usize,
    label: String,
}

enum ListAction {
    Create,
    View(String),
    Edit(String),
    Responses(String),
    ConfirmDelete { form_id: String, title: String },
}

enum BuilderAction {
    Save,
    Back,
    AddField,
    ConfirmDeleteField { index: usize, label: String },
    AddOption { field_index: usize },
    DeleteOption { field_index: usize, option_index: usize },
}

pub struct FormsApp {
    controller: AppController<FileStore>,
    active_notice: Option<client_core::Notice>,
    pending_form_delete: Option<PendingFormDelete>,
    pending_field_delete: Option<PendingFieldDelete>,
    new_field_kind: FieldKind,
    answers: AnswerDraft,
    invalid_fields: HashSet<String>,
}

impl FormsApp {
    pub fn new(controller: AppController<FileStore>) -> Self {
        Self {
            controller,
            active_notice: None,
            pending_form_delete: None,
            pending_field_delete: None,
            new_field_kind: FieldKind::Text,
            answers: AnswerDraft::default(),
            invalid_fields: HashSet::new(),
        }
    }

    fn reset_viewer_state(&mut self) {
        self.answers.clear();
        self.invalid_fields.clear();
    }

    // ---------- List view ----------

    fn show_list_view(&mut self, ctx: &egui::Context) {
        let mut action: Option<ListAction> = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("My Forms");
            ui.add_space(6.0);
            if ui.button("Create New Form").clicked() {
                action = Some(ListAction::Create);
            }
            ui.separator();

            if self.controller.forms().is_empty() {
                ui.label("No forms created yet.");
                return;
            }

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for form in self.controller.forms() {
                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new(form.display_title()).strong());
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if ui.button("Delete").clicked() {
                                        action = Some(ListAction::ConfirmDelete {
                                            form_id: form.id.clone(),
                                            title: form.display_title().to_string(),
                                        });
                                    }
                                    if ui.button("Responses").clicked() {
                                        action = Some(ListAction::Responses(form.id.clone()));
                                    }
                                    if ui.button("Edit").clicked() {
                                        action = Some(ListAction::Edit(form.id.clone()));
                                    }
                                    if ui.button("View/Fill").clicked() {
                                        action = Some(ListAction::View(form.id.clone()));
                                    }
                                },
                            );
                        });
                        ui.separator();
                    }
                });
        });

        match action {
            Some(ListAction::Create) => self.controller.open_builder(None),
            Some(ListAction::Edit(form_id)) => self.controller.open_builder(Some(&form_id)),
            Some(ListAction::View(form_id)) => {
                if self.controller.open_viewer(&form_id).is_ok() {
                    self.reset_viewer_state();
                }
            }
            Some(ListAction::Responses(form_id)) => {
                let _ = self.controller.open_responses(&form_id);
            }
            Some(ListAction::ConfirmDelete { form_id, title }) => {
                self.pending_form_delete = Some(PendingFormDelete { form_id, title });
            }
            None => {}
        }
    }

    // ---------- Builder view ----------

    fn show_builder_view(&mut self, ctx: &egui::Context) {
        let mut action: Option<BuilderAction> = None;

        let Some(draft) = self.controller.draft_mut() else {
            // No draft to edit; recover to the list.
            self.controller.go_home();
            return;
        };

        egui::TopBottomPanel::top("builder_header").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut draft.title)
                        .hint_text("Form Title")
                        .desired_width(320.0),
                );
                if ui.button("Save Form").clicked() {
                    action = Some(BuilderAction::Save);
                }
                if ui.button("Back to List").clicked() {
                    action = Some(BuilderAction::Back);
                }
            });
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    if draft.fields.is_empty() {
                        ui.label("No questions yet. Add the first one below.");
                        ui.add_space(6.0);
                    }

                    for index in 0..draft.fields.len() {
                        let field = &mut draft.fields[index];
                        ui.group(|ui| {
                            ui.horizontal(|ui| {
                                ui.add(
                                    egui::TextEdit::singleline(field.label_mut())
                                        .hint_text("Question Label")
                                        .desired_width(280.0),
                                );
                                ui.checkbox(field.required_mut(), "Required");
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        if ui.button("Delete Field").clicked() {
                                            action = Some(BuilderAction::ConfirmDeleteField {
                                                index,
                                                label: field.label().to_string(),
                                            });
                                        }
                                    },
                                );
                            });

                            if let Some(options) = field.options_mut() {
                                let option_count = options.len();
                                for (option_index, option) in options.iter_mut().enumerate() {
                                    ui.horizontal(|ui| {
                                        let response = ui.add(
                                            egui::TextEdit::singleline(&mut option.label)
                                                .hint_text(format!("Option {}", option_index + 1))
                                                .desired_width(240.0),
                                        );
                                        if response.changed() {
                                            option.refresh_value();
                                        }
                                        let delete = ui
                                            .add_enabled(
                                                option_count > 1,
                                                egui::Button::new("✕").small(),
                                            )
                                            .on_disabled_hover_text(
                                                "A choice field needs at least one option",
                                            );
                                        if delete.clicked() {
                                            action = Some(BuilderAction::DeleteOption {
                                                field_index: index,
                                                option_index,
                                            });
                                        }
                                    });
                                }
                                if ui.button("Add Option").clicked() {
                                    action = Some(BuilderAction::AddOption { field_index: index });
                                }
                            }
                        });
                        ui.add_space(6.0);
                    }

                    ui.separator();
                    ui.horizontal(|ui| {
                        egui::ComboBox::from_id_salt("new_field_kind")
                            .selected_text(self.new_field_kind.label())
                            .show_ui(ui, |ui| {
                                for kind in FieldKind::ALL {
                                    ui.selectable_value(
                                        &mut self.new_field_kind,
                                        kind,
                                        kind.label(),
                                    );
                                }
                            });
                        if ui.button("Add Field").clicked() {
                            action = Some(BuilderAction::AddField);
                        }
                    });
                });
        });

        match action {
            Some(BuilderAction::Save) => {
                // Validation failures leave the draft open; the controller
                // raises the notice.
                let _ = self.controller.save_draft();
            }
            Some(BuilderAction::Back) => self.controller.go_home(),
            Some(BuilderAction::AddField) => {
                let kind = self.new_field_kind;
                if let Some(draft) = self.controller.draft_mut() {
                    draft.fields.push(client_core::new_field(kind));
                }
            }
            Some(BuilderAction::ConfirmDeleteField { index, label }) => {
                self.pending_field_delete = Some(PendingFieldDelete { index, label });
            }
            Some(BuilderAction::AddOption { field_index }) => {
                if let Some(options) = self
                    .controller
                    .draft_mut()
                    .and_then(|draft| draft.fields.get_mut(field_index))
                    .and_then(FormField::options_mut)
                {
                    options.push(client_core::new_option(options.len() + 1));
                }
            }
            Some(BuilderAction::DeleteOption {
                field_index,
                option_index,
            }) => {
                if let Some(options) = self
                    .controller
                    .draft_mut()
                    .and_then(|draft| draft.fields.get_mut(field_index))
                    .and_then(FormField::options_mut)
                {
                    // Floor of one remaining option.
                    if options.len() > 1 {
                        options.remove(option_index);
                    }
                }
            }
            None => {}
        }
    }

    // ---------- Viewer (fill-out) view ----------

    fn show_viewer_view(&mut self, ctx: &egui::Context) {
        let Some(form) = self.controller.active_form().cloned() else {
            self.controller.go_home();
            return;
        };

        let mut back = false;
        let mut submit = false;

        egui::TopBottomPanel::top("viewer_header").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading(form.display_title());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Back to List").clicked() {
                        back = true;
                    }
                });
            });
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    if form.fields.is_empty() {
                        ui.label("This form has no questions yet.");
                        return;
                    }
                    for field in &form.fields {
                        self.show_field_input(ui, field);
                        ui.add_space(10.0);
                    }
                    ui.separator();
                    if ui.button("Submit Response").clicked() {
                        submit = true;
                    }
                });
        });

        if back {
            self.controller.go_home();
            self.reset_viewer_state();
        } else if submit {
            self.submit_current_answers(&form);
        }
    }

    fn show_field_input(&mut self, ui: &mut egui::Ui, field: &FormField) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(field.label()).strong());
            if field.required() {
                ui.label(egui::RichText::new("*").color(ERROR_RED));
            }
        });

        match field.kind() {
            FieldKind::Text => {
                let text = self.answers.text.entry(field.id().to_string()).or_default();
                ui.add(
                    egui::TextEdit::singleline(text)
                        .hint_text("Your answer")
                        .desired_width(320.0),
                );
            }
            FieldKind::Radio => {
                let selected = self
                    .answers
                    .radio
                    .entry(field.id().to_string())
                    .or_default();
                for option in field.options().unwrap_or_default() {
                    ui.radio_value(selected, option.value.clone(), option.label.as_str());
                }
            }
            FieldKind::Checkbox => {
                let selected = self
                    .answers
                    .checks
                    .entry(field.id().to_string())
                    .or_default();
                for option in field.options().unwrap_or_default() {
                    let mut checked = selected.contains(&option.value);
                    if ui.checkbox(&mut checked, option.label.as_str()).changed() {
                        if checked {
                            selected.insert(option.value.clone());
                        } else {
                            selected.remove(&option.value);
                        }
                    }
                }
            }
        }

        if self.invalid_fields.contains(field.id()) {
            let message = match field.kind() {
                FieldKind::Checkbox => "At least one option must be selected.",
                _ => "This field is required.",
            };
            ui.colored_label(ERROR_RED, message);
        }
    }

    fn submit_current_answers(&mut self, form: &Form) {
        let answers = self.answers.collect(form);
        let missing = client_core::missing_required_fields(form, &answers);
        if !missing.is_empty() {
            self.invalid_fields = missing.into_iter().collect();
            self.controller.push_notice(
                NoticeSeverity::Warning,
                "Please fill out all required fields correctly.",
            );
            return;
        }

        self.invalid_fields.clear();
        if self.controller.submit_response(&form.id, answers).is_ok() {
            self.controller
                .push_notice(NoticeSeverity::Info, "Response submitted successfully!");
            self.answers.clear();
            self.controller.go_home();
        }
    }

    // ---------- Responses view ----------

    fn show_responses_view(&mut self, ctx: &egui::Context) {
        let Some(form) = self.controller.active_form().cloned() else {
            self.controller.go_home();
            return;
        };

        let mut back = false;

        egui::TopBottomPanel::top("responses_header").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading(format!("Responses for \"{}\"", form.display_title()));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Back to List").clicked() {
                        back = true;
                    }
                });
            });
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let responses = self.controller.responses_for_active_form();
            ui.label(format!("Total Responses: {}", responses.len()));
            ui.add_space(6.0);

            if responses.is_empty() {
                ui.label("No responses have been submitted for this form yet.");
                return;
            }

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for (index, response) in responses.iter().enumerate() {
                        ui.group(|ui| {
                            ui.label(
                                egui::RichText::new(format!(
                                    "Response #{} (Submitted: {})",
                                    index + 1,
                                    format_submitted_at(response.submitted_at)
                                ))
                                .strong(),
                            );
                            ui.add_space(4.0);
                            // One line per form field in form order, so
                            // unanswered questions still show up.
                            for field in &form.fields {
                                let (text, is_placeholder) =
                                    answer_display(response.responses.get(field.id()));
                                ui.horizontal_wrapped(|ui| {
                                    ui.label(
                                        egui::RichText::new(format!("{}:", field.label()))
                                            .strong(),
                                    );
                                    if is_placeholder {
                                        ui.label(egui::RichText::new(text).italics().weak());
                                    } else {
                                        ui.label(text);
                                    }
                                });
                            }
                        });
                        ui.add_space(6.0);
                    }
                });
        });

        if back {
            self.controller.go_home();
        }
    }

    // ---------- Dialogs ----------

    fn show_form_delete_confirmation(&mut self, ctx: &egui::Context) {
        let Some(pending) = &self.pending_form_delete else {
            return;
        };
        let message = format!(
            "Are you sure you want to delete the form \"{}\"?",
            pending.title
        );

        let mut decision: Option<bool> = None;
        egui::Window::new("Delete form")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(false);
                    }
                });
            });

        match decision {
            Some(true) => {
                if let Some(pending) = self.pending_form_delete.take() {
                    let _ = self.controller.delete_form(&pending.form_id);
                }
            }
            Some(false) => self.pending_form_delete = None,
            None => {}
        }
    }

    fn show_field_delete_confirmation(&mut self, ctx: &egui::Context) {
        let Some(pending) = &self.pending_field_delete else {
            return;
        };
        let name = if pending.label.is_empty() {
            "this field"
        } else {
            pending.label.as_str()
        };
        let message = format!("Delete field \"{name}\"?");

        let mut decision: Option<bool> = None;
        egui::Window::new("Delete field")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(false);
                    }
                });
            });

        match decision {
            Some(true) => {
                if let Some(pending) = self.pending_field_delete.take() {
                    if let Some(draft) = self.controller.draft_mut() {
                        if pending.index < draft.fields.len() {
                            draft.fields.remove(pending.index);
                        }
                    }
                }
            }
            Some(false) => self.pending_field_delete = None,
            None => {}
        }
    }

    /// Presents controller notices one at a time as a blocking dialog.
    fn show_notice_dialog(&mut self, ctx: &egui::Context) {
        if self.active_notice.is_none() {
            self.active_notice = self.controller.pop_notice();
        }
        let Some(notice) = self.active_notice.clone() else {
            return;
        };

        let (title, color) = match notice.severity {
            NoticeSeverity::Info => ("Notice", egui::Color32::from_rgb(120, 170, 120)),
            NoticeSeverity::Warning => ("Warning", egui::Color32::from_rgb(204, 163, 82)),
            NoticeSeverity::Error => ("Error", ERROR_RED),
        };

        let mut acknowledged = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(egui::RichText::new(&notice.message).color(color));
                ui.add_space(6.0);
                if ui.button("OK").clicked() {
                    acknowledged = true;
                }
            });

        if acknowledged {
            self.active_notice = None;
        }
    }
}

impl eframe::App for FormsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match self.controller.view() {
            AppView::List => self.show_list_view(ctx),
            AppView::Builder => self.show_builder_view(ctx),
            AppView::Viewer => self.show_viewer_view(ctx),
            AppView::Responses => self.show_responses_view(ctx),
        }

        self.show_form_delete_confirmation(ctx);
        self.show_field_delete_confirmation(ctx);
        self.show_notice_dialog(ctx);
    }
}

/// Submission timestamp in local time for the responses view.
fn format_submitted_at(millis: i64) -> String {
    match chrono::DateTime::from_timestamp_millis(millis) {
        Some(utc) => utc
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "unknown time".to_string(),
    }
}

/// Display text for one answer line, with a flag for placeholder styling.
fn answer_display(answer: Option<&AnswerValue>) -> (String, bool) {
    match answer {
        None => ("- (No answer provided)".to_string(), true),
        Some(AnswerValue::Single(value)) if value.is_empty() => {
            ("- (No answer provided)".to_string(), true)
        }
        Some(AnswerValue::Single(value)) => (value.clone(), false),
        Some(AnswerValue::Many(values)) if values.is_empty() => ("-".to_string(), true),
        Some(AnswerValue::Many(values)) => (values.join(", "), false),
    }
}

#[cfg(test)]
mod tests {
    use super::{answer_display, format_submitted_at, AnswerDraft};
    use shared::domain::{AnswerValue, FieldOption, Form, FormField};

    fn choice_form() -> Form {
        Form {
            id: "form1".to_string(),
            title: "Survey".to_string(),
            fields: vec![
                FormField::Text {
                    id: "f1".to_string(),
                    label: "Name".to_string(),
                    required: true,
                },
                FormField::Checkbox {
                    id: "f2".to_string(),
                    label: "Toppings".to_string(),
                    required: false,
                    options: vec![
                        FieldOption::new("o1", "Hot Sauce"),
                        FieldOption::new("o2", "Cheese"),
                        FieldOption::new("o3", "Olives"),
                    ],
                },
            ],
        }
    }

    #[test]
    fn collects_one_answer_per_field_with_empty_defaults() {
        let draft = AnswerDraft::default();
        let answers = draft.collect(&choice_form());
        assert_eq!(answers.len(), 2);
        assert_eq!(
            answers.get("f1"),
            Some(&AnswerValue::Single(String::new()))
        );
        assert_eq!(answers.get("f2"), Some(&AnswerValue::Many(Vec::new())));
    }

    #[test]
    fn orders_checkbox_answers_by_option_order() {
        let mut draft = AnswerDraft::default();
        draft
            .text
            .insert("f1".to_string(), "Ada".to_string());
        // BTreeSet iteration order (alphabetical) differs from the field's
        // option order; collection must follow the latter.
        let set = draft.checks.entry("f2".to_string()).or_default();
        set.insert("hot-sauce".to_string());
        set.insert("cheese".to_string());

        let answers = draft.collect(&choice_form());
        assert_eq!(
            answers.get("f2"),
            Some(&AnswerValue::Many(vec![
                "hot-sauce".to_string(),
                "cheese".to_string()
            ]))
        );
    }

    #[test]
    fn renders_placeholders_for_missing_answers() {
        assert_eq!(answer_display(None), ("- (No answer provided)".to_string(), true));
        assert_eq!(
            answer_display(Some(&AnswerValue::Single(String::new()))),
            ("- (No answer provided)".to_string(), true)
        );
        assert_eq!(
            answer_display(Some(&AnswerValue::Single("hello".to_string()))),
            ("hello".to_string(), false)
        );
        assert_eq!(
            answer_display(Some(&AnswerValue::Many(Vec::new()))),
            ("-".to_string(), true)
        );
        assert_eq!(
            answer_display(Some(&AnswerValue::Many(vec![
                "red".to_string(),
                "blue".to_string()
            ]))),
            ("red, blue".to_string(), false)
        );
    }

    #[test]
    fn formats_out_of_range_timestamps_defensively() {
        assert_eq!(format_submitted_at(i64::MAX), "unknown time");
        assert!(!format_submitted_at(1_700_000_000_000).is_empty());
    }
}
