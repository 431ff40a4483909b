//! Correlates a pipeline's declared structure with its live run-state to find
//! the approval actions waiting on a human.
//!
//! The two inputs are fetched separately and only correlated by name, so
//! either side may mention stages or actions the other does not know about.
//! Those are skipped, never reported.

use super::{ApprovalAction, STATUS_IN_PROGRESS};
use std::collections::HashMap;

pub const APPROVAL_CATEGORY: &str = "Approval";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionDeclaration {
    pub name: String,
    pub category: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageDeclaration {
    pub name: String,
    pub actions: Vec<ActionDeclaration>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionState {
    pub action_name: String,
    pub latest_status: Option<String>,
    pub token: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageState {
    pub stage_name: String,
    pub action_states: Vec<ActionState>,
}

/// Pending approvals for one pipeline, in declared-stage order and then
/// declared-action order within each stage.
///
/// An action state counts only under the stage that declares it.
pub fn resolve_pending_approvals(
    pipeline_name: &str,
    declarations: &[StageDeclaration],
    states: &[StageState],
) -> Vec<ApprovalAction> {
    let states_by_stage: HashMap<&str, &StageState> = states
        .iter()
        .map(|state| (state.stage_name.as_str(), state))
        .collect();

    let mut pending = Vec::new();
    for stage in declarations {
        let Some(stage_state) = states_by_stage.get(stage.name.as_str()) else {
            continue;
        };

        for declared in &stage.actions {
            if declared.category != APPROVAL_CATEGORY {
                continue;
            }
            let Some(action) = stage_state
                .action_states
                .iter()
                .find(|a| a.action_name == declared.name)
            else {
                continue;
            };
            if action.latest_status.as_deref() != Some(STATUS_IN_PROGRESS) {
                continue;
            }
            let Some(token) = action.token.as_deref().filter(|t| !t.is_empty()) else {
                continue;
            };

            pending.push(ApprovalAction {
                pipeline_name: pipeline_name.to_string(),
                stage_name: stage.name.clone(),
                action_name: declared.name.clone(),
                token: token.to_string(),
            });
        }
    }
    pending
}
