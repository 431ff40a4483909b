//! Navigation state machine.
//!
//! `AppState` is a value: `update` consumes it with one `Message` and
//! returns the next state plus at most one `Command` for the loop to run.

use super::commands::{Command, Dispatch};
use super::components::selection_list::{ListRow, SelectionList};
use super::components::text_input::TextInput;
use super::events::Message;
use super::keymap::{Action, KeyContext, action_for};
use crate::catalog::{
    ApproveRequest, Catalog, CatalogEntry, OperationKind, OperationOutput, OperationRequest,
    StartExecutionRequest, UiOperation,
};
use crate::config::{GatewayConfig, validate_profile, validate_region};
use crate::error::{EngineError, EngineResult};
use crate::gateway::{ApprovalAction, PipelineSnapshot};
use crate::interactive::constants::BREADCRUMB_SEPARATOR;
use crate::interactive::domain::models::{
    ConfigStep, Decision, InputMode, SelectionTrail, TargetEntity, View,
};
use crate::output::format_timestamp;
use crossterm::event::KeyEvent;
use std::sync::Arc;

pub struct AppState {
    pub view: View,
    pub trail: SelectionTrail,
    pub input_mode: InputMode,
    pub pending_error: Option<EngineError>,
    /// Label of the in-flight command; `Some` while loading.
    pub loading: Option<String>,
    pub text_input: TextInput,
    pub list: SelectionList,
    pub approvals: Vec<ApprovalAction>,
    pub pipelines: Vec<PipelineSnapshot>,
    pub outcome: Option<String>,
    pub notice: Option<String>,
    catalog: Arc<Catalog>,
    profiles: Vec<String>,
    regions: Vec<String>,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, profiles: Vec<String>, regions: Vec<String>) -> Self {
        let mut state = Self {
            view: View::Providers,
            trail: SelectionTrail::default(),
            input_mode: InputMode::ListSelect,
            pending_error: None,
            loading: None,
            text_input: TextInput::new(),
            list: SelectionList::default(),
            approvals: Vec::new(),
            pipelines: Vec::new(),
            outcome: None,
            notice: None,
            catalog,
            profiles,
            regions,
        };
        state.rebuild_list(None);
        state
    }

    pub fn update(mut self, message: Message) -> (Self, Command) {
        let command = match message {
            Message::Key(key) => self.handle_key(key),
            Message::Completed(result) => {
                self.apply_completion(result);
                Command::None
            }
            Message::Resize => Command::None,
            Message::InputClosed => Command::Quit,
        };
        (self, command)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn key_context(&self) -> KeyContext {
        if self.is_loading() {
            KeyContext::Loading
        } else if self.pending_error.is_some() {
            KeyContext::Error
        } else if self.input_mode == InputMode::FreeText {
            KeyContext::FreeText
        } else {
            KeyContext::List
        }
    }

    pub fn config_step(&self) -> ConfigStep {
        self.trail.config_step()
    }

    pub fn current_operation(&self) -> Option<Arc<dyn UiOperation>> {
        let trail = &self.trail;
        self.catalog.operation(
            trail.provider.as_deref()?,
            trail.service.as_deref()?,
            trail.category.as_deref()?,
            trail.operation.as_deref()?,
        )
    }

    fn current_kind(&self) -> Option<OperationKind> {
        self.current_operation().map(|op| op.kind())
    }

    /// Display names of everything chosen so far, outermost first.
    pub fn breadcrumb(&self) -> String {
        let trail = &self.trail;
        let mut parts: Vec<String> = Vec::new();

        let provider = trail
            .provider
            .as_deref()
            .and_then(|id| self.catalog.provider(id));
        if let Some(provider) = provider {
            parts.push(provider.entry.name.clone());
        }
        parts.extend(trail.profile.iter().cloned());
        parts.extend(trail.region.iter().cloned());

        let service = provider.and_then(|p| p.service(trail.service.as_deref()?));
        if let Some(service) = service {
            parts.push(service.entry.name.clone());
        }
        let category = service.and_then(|s| s.category(trail.category.as_deref()?));
        if let Some(category) = category {
            parts.push(category.entry.name.clone());
        }
        if let Some(operation) = self.current_operation() {
            parts.push(operation.display_name().to_string());
        }
        if let Some(target) = &trail.target {
            parts.push(target.key());
        }
        if let Some(decision) = trail.decision {
            parts.push(decision.label().to_string());
        }

        if parts.is_empty() {
            View::Providers.title().to_string()
        } else {
            parts.join(BREADCRUMB_SEPARATOR)
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Command {
        let Some(action) = action_for(key, self.key_context()) else {
            return Command::None;
        };
        if self.input_mode == InputMode::ListSelect {
            self.notice = None;
        }

        match action {
            Action::Quit => Command::Quit,
            Action::Acknowledge => {
                self.pending_error = None;
                self.back();
                Command::None
            }
            Action::Cancel => {
                self.back();
                Command::None
            }
            Action::Commit => self.commit_text(),
            Action::Edit(key) => {
                self.text_input.handle_key(key);
                Command::None
            }
            Action::Up => {
                self.list.move_up();
                Command::None
            }
            Action::Down => {
                self.list.move_down();
                Command::None
            }
            Action::PageUp => {
                self.list.page_up();
                Command::None
            }
            Action::PageDown => {
                self.list.page_down();
                Command::None
            }
            Action::Home => {
                self.list.move_to_start();
                Command::None
            }
            Action::End => {
                self.list.move_to_end();
                Command::None
            }
            Action::Select => self.select(),
            Action::Back => {
                self.back();
                Command::None
            }
            Action::ManualEntry => {
                if self.view == View::ProviderConfig {
                    self.text_input.clear();
                    self.input_mode = InputMode::FreeText;
                }
                Command::None
            }
            Action::Refresh => {
                if self.view.is_refreshable() {
                    self.fetch_for_view()
                } else {
                    Command::None
                }
            }
        }
    }

    /// Forward transition from the highlighted row.
    pub fn select(&mut self) -> Command {
        if self.view == View::ExecutingAction {
            if self.outcome.is_some() {
                self.finish_execution();
            }
            return Command::None;
        }

        let Some(row) = self.list.selected_row().cloned() else {
            return Command::None;
        };
        if !row.enabled {
            self.notice = Some(format!("{} is not available yet", row.columns[0]));
            return Command::None;
        }

        tracing::debug!(view = ?self.view, key = %row.key, "select");
        match self.view {
            View::Providers => {
                self.trail.provider = Some(row.key);
                self.enter(View::ProviderConfig, None);
                if self.profiles.is_empty() {
                    self.notice = Some("No profiles found; press m to type one".to_string());
                }
                Command::None
            }
            View::ProviderConfig => {
                match self.config_step() {
                    ConfigStep::Profile => {
                        self.trail.profile = Some(row.key);
                        self.rebuild_list(None);
                    }
                    ConfigStep::Region => {
                        self.trail.region = Some(row.key);
                        self.enter(View::SelectService, None);
                    }
                }
                Command::None
            }
            View::SelectService => {
                self.trail.service = Some(row.key);
                self.enter(View::SelectCategory, None);
                Command::None
            }
            View::SelectCategory => {
                self.trail.category = Some(row.key);
                self.enter(View::SelectOperation, None);
                Command::None
            }
            View::SelectOperation => {
                self.trail.operation = Some(row.key.clone());
                match self.current_kind() {
                    Some(OperationKind::ManualApproval) => {
                        self.approvals.clear();
                        self.enter(View::Approvals, None);
                    }
                    Some(OperationKind::PipelineStatus | OperationKind::StartPipeline) => {
                        self.pipelines.clear();
                        self.enter(View::PipelineStatus, None);
                    }
                    None => {
                        self.trail.operation = None;
                        self.pending_error = Some(EngineError::Internal(format!(
                            "operation '{}' is not in the catalog",
                            row.key
                        )));
                        return Command::None;
                    }
                }
                self.fetch_for_view()
            }
            View::Approvals => {
                let Some(action) = self.approvals.iter().find(|a| a.key() == row.key).cloned()
                else {
                    return Command::None;
                };
                self.trail.target = Some(TargetEntity::Approval(action));
                self.enter(View::Confirmation, None);
                Command::None
            }
            View::Confirmation => {
                self.trail.decision = Decision::from_key(&row.key);
                self.text_input.clear();
                self.input_mode = InputMode::FreeText;
                self.enter(View::Summary, None);
                Command::None
            }
            View::PipelineStatus => {
                let Some(snapshot) = self.pipelines.iter().find(|p| p.name == row.key).cloned()
                else {
                    return Command::None;
                };
                self.trail.target = Some(TargetEntity::Pipeline(snapshot));
                if self.current_kind() == Some(OperationKind::StartPipeline) {
                    self.outcome = None;
                    self.enter(View::ExecutingAction, None);
                    let request = OperationRequest::StartExecution(StartExecutionRequest {
                        pipeline_name: row.key,
                        revision_id: None,
                    });
                    self.dispatch(request)
                } else {
                    self.enter(View::PipelineStages, None);
                    Command::None
                }
            }
            View::PipelineStages | View::Summary | View::ExecutingAction => Command::None,
        }
    }

    /// Enter in free-text mode.
    pub fn commit_text(&mut self) -> Command {
        let value = self.text_input.text().trim().to_string();
        match self.view {
            View::ProviderConfig => {
                let step = self.config_step();
                let validated = match step {
                    ConfigStep::Profile => validate_profile(&value),
                    ConfigStep::Region => validate_region(&value),
                };
                if let Err(err) = validated {
                    self.pending_error = Some(err);
                    return Command::None;
                }
                self.text_input.clear();
                self.input_mode = InputMode::ListSelect;
                match step {
                    ConfigStep::Profile => {
                        self.trail.profile = Some(value);
                        self.rebuild_list(None);
                    }
                    ConfigStep::Region => {
                        self.trail.region = Some(value);
                        self.enter(View::SelectService, None);
                    }
                }
                Command::None
            }
            View::Summary => {
                let (Some(action), Some(decision)) =
                    (self.trail.approval().cloned(), self.trail.decision)
                else {
                    self.pending_error = Some(EngineError::Internal(
                        "no approval and decision to submit".to_string(),
                    ));
                    return Command::None;
                };
                let comment = self.text_input.take();
                self.trail.summary = Some(comment.clone());
                self.input_mode = InputMode::ListSelect;
                self.outcome = None;
                self.enter(View::ExecutingAction, None);
                self.dispatch(OperationRequest::Decide(ApproveRequest {
                    action,
                    approved: decision.is_approve(),
                    comment,
                }))
            }
            _ => Command::None,
        }
    }

    /// Back action: cancels text entry when one is open, otherwise steps
    /// the view back.
    pub fn back(&mut self) {
        if self.input_mode == InputMode::FreeText {
            self.text_input.clear();
            self.input_mode = InputMode::ListSelect;
            if self.view == View::Summary {
                self.view_back();
            }
            return;
        }
        self.view_back();
    }

    fn view_back(&mut self) {
        tracing::debug!(view = ?self.view, "back");
        match self.view {
            View::Providers => {}
            View::ProviderConfig => match self.config_step() {
                ConfigStep::Region => {
                    let profile = self.trail.profile.take();
                    self.rebuild_list(profile.as_deref());
                }
                ConfigStep::Profile => {
                    self.trail.region = None;
                    let provider = self.trail.provider.take();
                    self.enter(View::Providers, provider.as_deref());
                }
            },
            View::SelectService => {
                let region = self.trail.region.take();
                self.enter(View::ProviderConfig, region.as_deref());
            }
            View::SelectCategory => {
                let service = self.trail.service.take();
                self.enter(View::SelectService, service.as_deref());
            }
            View::SelectOperation => {
                let category = self.trail.category.take();
                self.enter(View::SelectCategory, category.as_deref());
            }
            View::Approvals => {
                self.approvals.clear();
                let operation = self.trail.operation.take();
                self.enter(View::SelectOperation, operation.as_deref());
            }
            View::PipelineStatus => {
                self.pipelines.clear();
                let operation = self.trail.operation.take();
                self.enter(View::SelectOperation, operation.as_deref());
            }
            View::PipelineStages => {
                let target = self.trail.target.take().map(|t| t.key());
                self.enter(View::PipelineStatus, target.as_deref());
            }
            View::Confirmation => {
                let target = self.trail.target.take().map(|t| t.key());
                self.enter(View::Approvals, target.as_deref());
            }
            View::Summary => {
                self.text_input.clear();
                self.input_mode = InputMode::ListSelect;
                let decision = self.trail.decision.take();
                self.enter(View::Confirmation, decision.map(|d| d.key()));
            }
            View::ExecutingAction => {
                if self.outcome.is_some() {
                    // the token or run is spent; nothing to step back into
                    self.finish_execution();
                } else if self.trail.approval().is_some() {
                    let summary = self.trail.summary.take().unwrap_or_default();
                    self.text_input.set_text(summary);
                    self.input_mode = InputMode::FreeText;
                    self.enter(View::Summary, None);
                } else {
                    let target = self.trail.target.take().map(|t| t.key());
                    self.enter(View::PipelineStatus, target.as_deref());
                }
            }
        }
    }

    /// Terminal step after a successful execution.
    fn finish_execution(&mut self) {
        let operation = self.trail.reset_operation();
        self.approvals.clear();
        self.pipelines.clear();
        self.outcome = None;
        self.enter(View::SelectOperation, operation.as_deref());
    }

    fn fetch_for_view(&mut self) -> Command {
        match self.view {
            View::Approvals => self.dispatch(OperationRequest::ListApprovals),
            View::PipelineStatus => self.dispatch(OperationRequest::ListPipelines),
            _ => Command::None,
        }
    }

    /// Builds the command for `request` against the current operation and
    /// enters loading.
    pub fn dispatch(&mut self, request: OperationRequest) -> Command {
        match self.prepare_dispatch(request) {
            Ok(dispatch) => {
                tracing::debug!(
                    operation = dispatch.operation.id(),
                    request = dispatch.request.name(),
                    "dispatch"
                );
                self.loading = Some(dispatch.request.loading_label().to_string());
                Command::Execute(dispatch)
            }
            Err(err) => {
                self.pending_error = Some(err);
                Command::None
            }
        }
    }

    fn prepare_dispatch(&self, request: OperationRequest) -> EngineResult<Dispatch> {
        let config =
            GatewayConfig::new(self.trail.profile.as_deref(), self.trail.region.as_deref())?;
        let operation = self
            .current_operation()
            .ok_or_else(|| EngineError::Internal("no operation selected".to_string()))?;
        Ok(Dispatch {
            operation,
            config,
            request,
        })
    }

    pub fn apply_completion(&mut self, result: EngineResult<OperationOutput>) {
        self.loading = None;
        match result {
            Ok(OperationOutput::Approvals(approvals)) if self.view == View::Approvals => {
                let cursor = self.list.selected_key().map(str::to_string);
                self.approvals = approvals;
                self.rebuild_list(cursor.as_deref());
            }
            Ok(OperationOutput::Pipelines(pipelines)) if self.view == View::PipelineStatus => {
                let cursor = self.list.selected_key().map(str::to_string);
                self.pipelines = pipelines;
                self.rebuild_list(cursor.as_deref());
            }
            Ok(OperationOutput::Approvals(_) | OperationOutput::Pipelines(_)) => {
                tracing::debug!(view = ?self.view, "dropping list for a view no longer shown");
            }
            Ok(OperationOutput::DecisionSubmitted { action, approved }) => {
                let verb = if approved { "Approved" } else { "Rejected" };
                self.outcome = Some(format!("{verb} {}", action.key()));
            }
            Ok(OperationOutput::ExecutionStarted {
                pipeline_name,
                execution_id,
            }) => {
                self.outcome = Some(format!(
                    "Started {pipeline_name} (execution {execution_id})"
                ));
            }
            Err(err) => {
                tracing::warn!(error = %err, view = ?self.view, "command failed");
                self.pending_error = Some(err);
            }
        }
    }

    fn enter(&mut self, view: View, cursor: Option<&str>) {
        self.view = view;
        self.rebuild_list(cursor);
    }

    /// Regenerates the current view's rows from the trail.
    fn rebuild_list(&mut self, cursor: Option<&str>) {
        let rows = self.rows_for_view();
        self.list.set_rows(rows, cursor);
    }

    fn rows_for_view(&self) -> Vec<ListRow> {
        let trail = &self.trail;
        let entry_row = |entry: &CatalogEntry| {
            ListRow::new(
                entry.id.clone(),
                vec![entry.name.clone(), entry.description.clone()],
            )
            .with_enabled(entry.available)
        };

        match self.view {
            View::Providers => self
                .catalog
                .providers()
                .iter()
                .map(|p| entry_row(&p.entry))
                .collect(),
            View::ProviderConfig => {
                let values = match self.config_step() {
                    ConfigStep::Profile => &self.profiles,
                    ConfigStep::Region => &self.regions,
                };
                values
                    .iter()
                    .map(|v| ListRow::new(v.clone(), vec![v.clone()]))
                    .collect()
            }
            View::SelectService => trail
                .provider
                .as_deref()
                .and_then(|id| self.catalog.provider(id))
                .map(|p| p.services.iter().map(|s| entry_row(&s.entry)).collect())
                .unwrap_or_default(),
            View::SelectCategory => match (trail.provider.as_deref(), trail.service.as_deref()) {
                (Some(provider), Some(service)) => self
                    .catalog
                    .service(provider, service)
                    .map(|s| s.categories.iter().map(|c| entry_row(&c.entry)).collect())
                    .unwrap_or_default(),
                _ => Vec::new(),
            },
            View::SelectOperation => match (
                trail.provider.as_deref(),
                trail.service.as_deref(),
                trail.category.as_deref(),
            ) {
                (Some(provider), Some(service), Some(category)) => self
                    .catalog
                    .category(provider, service, category)
                    .map(|c| {
                        c.visible_operations()
                            .map(|op| {
                                ListRow::new(
                                    op.id(),
                                    vec![
                                        op.display_name().to_string(),
                                        op.description().to_string(),
                                    ],
                                )
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
                _ => Vec::new(),
            },
            View::Approvals => self
                .approvals
                .iter()
                .map(|a| {
                    ListRow::new(
                        a.key(),
                        vec![
                            a.pipeline_name.clone(),
                            a.stage_name.clone(),
                            a.action_name.clone(),
                        ],
                    )
                })
                .collect(),
            View::PipelineStatus => self
                .pipelines
                .iter()
                .map(|p| {
                    ListRow::new(
                        p.name.clone(),
                        vec![
                            p.name.clone(),
                            p.overall_status().to_string(),
                            format_timestamp(p.last_updated()),
                        ],
                    )
                })
                .collect(),
            View::PipelineStages => trail
                .pipeline()
                .map(|p| {
                    p.stages
                        .iter()
                        .map(|s| {
                            ListRow::new(
                                s.name.clone(),
                                vec![
                                    s.name.clone(),
                                    s.status.clone(),
                                    format_timestamp(s.last_updated),
                                ],
                            )
                        })
                        .collect()
                })
                .unwrap_or_default(),
            View::Confirmation => Decision::ALL
                .iter()
                .map(|d| ListRow::new(d.key(), vec![d.label().to_string()]))
                .collect(),
            View::Summary | View::ExecutingAction => Vec::new(),
        }
    }
}
