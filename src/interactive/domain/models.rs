use crate::gateway::{ApprovalAction, PipelineSnapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Providers,
    /// Profile step while no profile is on the trail, region step after.
    ProviderConfig,
    SelectService,
    SelectCategory,
    SelectOperation,
    Approvals,
    PipelineStatus,
    PipelineStages,
    Confirmation,
    Summary,
    ExecutingAction,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Providers => "Providers",
            View::ProviderConfig => "Provider Configuration",
            View::SelectService => "Services",
            View::SelectCategory => "Categories",
            View::SelectOperation => "Operations",
            View::Approvals => "Pending Approvals",
            View::PipelineStatus => "Pipelines",
            View::PipelineStages => "Stages",
            View::Confirmation => "Decision",
            View::Summary => "Summary",
            View::ExecutingAction => "Execution",
        }
    }

    /// Table header for list views.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            View::Providers
            | View::SelectService
            | View::SelectCategory
            | View::SelectOperation => &["Name", "Description"],
            View::ProviderConfig => &["Name"],
            View::Approvals => &["Pipeline", "Stage", "Action"],
            View::PipelineStatus => &["Pipeline", "Status", "Last Updated"],
            View::PipelineStages => &["Stage", "Status", "Last Updated"],
            View::Confirmation => &["Decision"],
            View::Summary | View::ExecutingAction => &[],
        }
    }

    /// Whether `r` re-fetches this view's list.
    pub fn is_refreshable(&self) -> bool {
        matches!(self, View::Approvals | View::PipelineStatus)
    }
}

/// Exactly one mode is active at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    ListSelect,
    FreeText,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigStep {
    Profile,
    Region,
}

impl ConfigStep {
    pub fn label(&self) -> &'static str {
        match self {
            ConfigStep::Profile => "profile",
            ConfigStep::Region => "region",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub const ALL: [Decision; 2] = [Decision::Approve, Decision::Reject];

    pub fn key(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Decision::Approve => "Approve",
            Decision::Reject => "Reject",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.key() == key)
    }

    pub fn is_approve(&self) -> bool {
        matches!(self, Decision::Approve)
    }
}

/// The entity an operation acts on once one row is picked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetEntity {
    Approval(ApprovalAction),
    Pipeline(PipelineSnapshot),
}

impl TargetEntity {
    /// Row key of the entity in the list it was picked from.
    pub fn key(&self) -> String {
        match self {
            TargetEntity::Approval(action) => action.key(),
            TargetEntity::Pipeline(snapshot) => snapshot.name.clone(),
        }
    }
}

/// One slot per navigation step. Each forward step sets exactly one slot
/// and its back step clears that slot again.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionTrail {
    pub provider: Option<String>,
    pub profile: Option<String>,
    pub region: Option<String>,
    pub service: Option<String>,
    pub category: Option<String>,
    pub operation: Option<String>,
    pub target: Option<TargetEntity>,
    pub decision: Option<Decision>,
    pub summary: Option<String>,
}

impl SelectionTrail {
    pub fn config_step(&self) -> ConfigStep {
        if self.profile.is_none() {
            ConfigStep::Profile
        } else {
            ConfigStep::Region
        }
    }

    pub fn approval(&self) -> Option<&ApprovalAction> {
        match &self.target {
            Some(TargetEntity::Approval(action)) => Some(action),
            _ => None,
        }
    }

    pub fn pipeline(&self) -> Option<&PipelineSnapshot> {
        match &self.target {
            Some(TargetEntity::Pipeline(snapshot)) => Some(snapshot),
            _ => None,
        }
    }

    /// Drops everything chosen after the category, ready for the next
    /// operation.
    pub fn reset_operation(&mut self) -> Option<String> {
        self.target = None;
        self.decision = None;
        self.summary = None;
        self.operation.take()
    }
}
