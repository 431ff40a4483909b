#[cfg(test)]
mod tests {
    use super::super::app_state::AppState;
    use super::super::commands::{Command, Dispatch};
    use super::super::components::selection_list::ListRow;
    use super::super::events::Message;
    use crate::catalog::{Catalog, OperationRequest, StartExecutionRequest};
    use crate::error::EngineError;
    use crate::interactive::domain::models::{ConfigStep, Decision, InputMode, View};
    use crate::test_support::{FakeGateway, GatewayCall, char_key, ctrl, key};
    use crossterm::event::{KeyCode, KeyEvent};
    use std::sync::Arc;

    fn create_test_state() -> AppState {
        AppState::new(
            Arc::new(Catalog::builtin()),
            vec!["default".to_string(), "dev".to_string()],
            vec!["us-east-1".to_string(), "eu-west-1".to_string()],
        )
    }

    fn enter() -> KeyEvent {
        key(KeyCode::Enter)
    }

    fn esc() -> KeyEvent {
        key(KeyCode::Esc)
    }

    fn press(state: AppState, event: KeyEvent) -> (AppState, Command) {
        state.update(Message::Key(event))
    }

    fn press_all(mut state: AppState, events: &[KeyEvent]) -> AppState {
        for event in events {
            let (next, command) = press(state, *event);
            assert!(
                !matches!(command, Command::Execute(_)),
                "unexpected dispatch on {event:?}"
            );
            state = next;
        }
        state
    }

    fn type_text(state: AppState, text: &str) -> AppState {
        let events: Vec<KeyEvent> = text.chars().map(char_key).collect();
        press_all(state, &events)
    }

    fn expect_dispatch(command: Command) -> Dispatch {
        match command {
            Command::Execute(dispatch) => dispatch,
            other => panic!("expected a dispatch, got {other:?}"),
        }
    }

    /// Runs the dispatched call inline and feeds its completion back.
    fn complete(state: AppState, dispatch: Dispatch, gateway: &FakeGateway) -> AppState {
        let result = dispatch
            .operation
            .execute(gateway, &dispatch.config, &dispatch.request);
        let (state, command) = state.update(Message::Completed(result));
        assert!(matches!(command, Command::None));
        state
    }

    fn settle(state: AppState, command: Command, gateway: &FakeGateway) -> AppState {
        match command {
            Command::Execute(dispatch) => complete(state, dispatch, gateway),
            _ => state,
        }
    }

    /// Providers -> aws / dev / eu-west-1 -> codepipeline -> `category`.
    fn at_operations(category_down: usize) -> AppState {
        let mut keys = vec![enter(), char_key('j'), enter(), char_key('j'), enter(), enter()];
        keys.extend(std::iter::repeat_n(char_key('j'), category_down));
        keys.push(enter());
        let state = press_all(create_test_state(), &keys);
        assert_eq!(state.view, View::SelectOperation);
        state
    }

    fn at_approvals(gateway: &FakeGateway) -> AppState {
        let (state, command) = press(at_operations(0), enter());
        assert_eq!(state.view, View::Approvals);
        complete(state, expect_dispatch(command), gateway)
    }

    fn at_summary(gateway: &FakeGateway) -> AppState {
        let state = press_all(at_approvals(gateway), &[enter(), enter()]);
        assert_eq!(state.view, View::Summary);
        state
    }

    #[test]
    fn test_initial_state() {
        let state = create_test_state();

        assert_eq!(state.view, View::Providers);
        assert_eq!(state.input_mode, InputMode::ListSelect);
        assert!(!state.is_loading());
        assert!(state.pending_error.is_none());
        let keys: Vec<&str> = state.list.rows().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["aws", "azure", "gcp"]);
        assert_eq!(state.breadcrumb(), "Providers");
    }

    #[test]
    fn test_unavailable_entry_shows_notice() {
        let state = press_all(create_test_state(), &[char_key('j'), enter()]);

        assert_eq!(state.view, View::Providers);
        assert_eq!(state.trail.provider, None);
        assert_eq!(state.notice.as_deref(), Some("Azure is not available yet"));

        // any later key clears the notice
        let state = press_all(state, &[char_key('k')]);
        assert_eq!(state.notice, None);
    }

    #[test]
    fn test_provider_config_walks_profile_then_region() {
        let state = press_all(create_test_state(), &[enter()]);
        assert_eq!(state.view, View::ProviderConfig);
        assert_eq!(state.config_step(), ConfigStep::Profile);
        assert_eq!(state.list.selected_key(), Some("default"));

        let state = press_all(state, &[char_key('j'), enter()]);
        assert_eq!(state.trail.profile.as_deref(), Some("dev"));
        assert_eq!(state.config_step(), ConfigStep::Region);
        assert_eq!(state.list.selected_key(), Some("us-east-1"));

        let state = press_all(state, &[enter()]);
        assert_eq!(state.view, View::SelectService);
        assert_eq!(state.trail.region.as_deref(), Some("us-east-1"));
    }

    #[test]
    fn test_approval_flow_end_to_end() {
        let gateway = FakeGateway::new();
        let state = at_approvals(&gateway);
        assert!(!state.is_loading());
        assert_eq!(state.list.len(), 2);

        let state = press_all(state, &[enter()]);
        assert_eq!(state.view, View::Confirmation);
        assert_eq!(
            state.breadcrumb(),
            "AWS > dev > eu-west-1 > CodePipeline > Approvals > Manual Approval > web/Release/ProdGate"
        );

        let state = press_all(state, &[char_key('j'), enter()]);
        assert_eq!(state.view, View::Summary);
        assert_eq!(state.trail.decision, Some(Decision::Reject));
        assert_eq!(state.input_mode, InputMode::FreeText);
        assert!(state.text_input.is_empty());

        let state = type_text(state, "flaky tests");
        let (state, command) = press(state, enter());
        assert_eq!(state.view, View::ExecutingAction);
        assert_eq!(state.trail.summary.as_deref(), Some("flaky tests"));
        assert_eq!(state.loading.as_deref(), Some("Submitting decision..."));
        let dispatch = expect_dispatch(command);
        assert_eq!(dispatch.config.profile, "dev");
        assert_eq!(dispatch.config.region, "eu-west-1");

        let state = complete(state, dispatch, &gateway);
        assert!(!state.is_loading());
        assert_eq!(state.outcome.as_deref(), Some("Rejected web/Release/ProdGate"));
        assert_eq!(
            gateway.calls().last(),
            Some(&GatewayCall::Decide {
                key: "web/Release/ProdGate".to_string(),
                token: "tok-web".to_string(),
                approved: false,
                comment: "flaky tests".to_string(),
            })
        );

        let state = press_all(state, &[enter()]);
        assert_eq!(state.view, View::SelectOperation);
        assert_eq!(state.list.selected_key(), Some("manual-approval"));
        assert_eq!(state.trail.operation, None);
        assert_eq!(state.trail.target, None);
        assert_eq!(state.trail.decision, None);
        assert_eq!(state.trail.summary, None);
        assert_eq!(state.trail.category.as_deref(), Some("approvals"));
        assert!(state.approvals.is_empty());
        assert!(state.outcome.is_none());
    }

    #[test]
    fn test_every_forward_step_is_undone_by_back() {
        let gateway = FakeGateway::new();
        let mut state = create_test_state();

        // Providers, profile, region, service, category, operation,
        // approval, decision
        for step in 0..8 {
            let trail_before = state.trail.clone();
            let view_before = state.view;
            let cursor_before = state.list.selected_key().map(str::to_string);

            let (next, command) = press(state, enter());
            let next = settle(next, command, &gateway);
            assert_ne!(next.trail, trail_before, "step {step} set nothing");

            let (next, _) = press(next, esc());
            assert_eq!(next.trail, trail_before, "step {step}");
            assert_eq!(next.view, view_before, "step {step}");
            assert_eq!(
                next.list.selected_key().map(str::to_string),
                cursor_before,
                "step {step}"
            );
            assert_eq!(next.input_mode, InputMode::ListSelect);

            let (next, command) = press(next, enter());
            state = settle(next, command, &gateway);
        }
        assert_eq!(state.view, View::Summary);
    }

    #[test]
    fn test_back_from_approvals_discards_the_list() {
        let gateway = FakeGateway::new();
        let state = press_all(at_approvals(&gateway), &[esc()]);

        assert_eq!(state.view, View::SelectOperation);
        assert!(state.approvals.is_empty());
        assert_eq!(state.trail.operation, None);
    }

    #[test]
    fn test_back_from_service_keeps_profile() {
        let state = press_all(
            create_test_state(),
            &[enter(), enter(), char_key('j'), enter(), esc()],
        );

        assert_eq!(state.view, View::ProviderConfig);
        assert_eq!(state.config_step(), ConfigStep::Region);
        assert_eq!(state.trail.profile.as_deref(), Some("default"));
        assert_eq!(state.trail.region, None);
        assert_eq!(state.list.selected_key(), Some("eu-west-1"));
    }

    #[test]
    fn test_loading_only_honors_quit() {
        let (state, command) = press(at_operations(0), enter());
        assert!(matches!(command, Command::Execute(_)));
        assert!(state.is_loading());

        let mut state = state;
        for event in [enter(), esc(), char_key('j'), char_key('r'), char_key('m')] {
            let (next, command) = press(state, event);
            assert!(matches!(command, Command::None), "{event:?}");
            assert!(next.is_loading());
            assert_eq!(next.view, View::Approvals);
            state = next;
        }

        let (state, command) = press(state, char_key('q'));
        assert!(matches!(command, Command::Quit));
        let (_, command) = press(state, ctrl('c'));
        assert!(matches!(command, Command::Quit));
    }

    #[test]
    fn test_double_press_dispatches_once() {
        let (state, first) = press(at_operations(0), enter());
        let (state, second) = press(state, enter());

        assert!(matches!(first, Command::Execute(_)));
        assert!(matches!(second, Command::None));
        assert_eq!(state.view, View::Approvals);
    }

    #[test]
    fn test_failed_fetch_keeps_selection_until_acknowledged() {
        let gateway = FakeGateway::new().failing("AccessDeniedException");
        let (state, command) = press(at_operations(0), enter());
        let trail_before = state.trail.clone();

        let state = complete(state, expect_dispatch(command), &gateway);
        assert!(!state.is_loading());
        assert_eq!(
            state.pending_error,
            Some(EngineError::Gateway {
                operation: "list pending approvals",
                message: "AccessDeniedException".to_string(),
            })
        );
        assert_eq!(state.trail, trail_before);
        assert_eq!(state.view, View::Approvals);

        // navigation keys do nothing while the error is shown
        let state = press_all(state, &[char_key('j'), char_key('h'), char_key('r')]);
        assert!(state.pending_error.is_some());
        assert_eq!(state.trail, trail_before);

        let state = press_all(state, &[enter()]);
        assert!(state.pending_error.is_none());
        assert_eq!(state.view, View::SelectOperation);
        assert_eq!(state.trail.operation, None);
        assert_eq!(state.list.selected_key(), Some("manual-approval"));
    }

    #[test]
    fn test_free_text_takes_navigation_letters_literally() {
        let gateway = FakeGateway::new();
        let state = type_text(at_summary(&gateway), "jkqrmgh");

        assert_eq!(state.view, View::Summary);
        assert_eq!(state.text_input.text(), "jkqrmgh");

        let (_, command) = press(state, ctrl('c'));
        assert!(matches!(command, Command::Quit));
    }

    #[test]
    fn test_failed_submission_restores_summary() {
        let gateway = FakeGateway::new();
        let state = type_text(at_summary(&gateway), "needs QA");
        let (state, command) = press(state, enter());
        assert!(state.text_input.is_empty());

        let failing = FakeGateway::new().failing("InvalidApprovalTokenException");
        let state = complete(state, expect_dispatch(command), &failing);
        assert_eq!(state.view, View::ExecutingAction);
        assert!(state.pending_error.is_some());
        assert!(state.outcome.is_none());

        let state = press_all(state, &[esc()]);
        assert_eq!(state.view, View::Summary);
        assert_eq!(state.input_mode, InputMode::FreeText);
        assert_eq!(state.text_input.text(), "needs QA");
        assert_eq!(state.trail.summary, None);
        assert_eq!(state.trail.decision, Some(Decision::Approve));

        // editing continues where it left off
        let state = type_text(state, "!");
        assert_eq!(state.text_input.text(), "needs QA!");
    }

    #[test]
    fn test_escape_in_summary_discards_buffer() {
        let gateway = FakeGateway::new();
        let state = type_text(at_summary(&gateway), "draft");
        let state = press_all(state, &[esc()]);

        assert_eq!(state.view, View::Confirmation);
        assert_eq!(state.trail.decision, None);
        assert!(state.text_input.is_empty());

        let state = press_all(state, &[enter()]);
        assert!(state.text_input.is_empty());
    }

    #[test]
    fn test_start_pipeline_bypasses_confirmation() {
        let gateway = FakeGateway::new();
        let state = at_operations(1);
        let state = press_all(state, &[char_key('j')]);
        assert_eq!(state.list.selected_key(), Some("start-pipeline"));

        let (state, command) = press(state, enter());
        assert_eq!(state.view, View::PipelineStatus);
        let dispatch = expect_dispatch(command);
        assert_eq!(dispatch.request, OperationRequest::ListPipelines);
        let state = complete(state, dispatch, &gateway);
        assert_eq!(state.list.len(), 2);

        let (state, command) = press(state, enter());
        assert_eq!(state.view, View::ExecutingAction);
        let dispatch = expect_dispatch(command);
        assert_eq!(
            dispatch.request,
            OperationRequest::StartExecution(StartExecutionRequest {
                pipeline_name: "web".to_string(),
                revision_id: None,
            })
        );

        let state = complete(state, dispatch, &gateway);
        assert_eq!(
            state.outcome.as_deref(),
            Some("Started web (execution exec-0001)")
        );

        let state = press_all(state, &[enter()]);
        assert_eq!(state.view, View::SelectOperation);
        assert_eq!(state.list.selected_key(), Some("start-pipeline"));
        assert!(state.pipelines.is_empty());
    }

    #[test]
    fn test_failed_start_returns_to_pipeline_list() {
        let gateway = FakeGateway::new();
        let state = press_all(at_operations(1), &[char_key('j')]);
        let (state, command) = press(state, enter());
        let state = complete(state, expect_dispatch(command), &gateway);
        let state = press_all(state, &[char_key('j')]);

        let (state, command) = press(state, enter());
        let failing = FakeGateway::new().failing("PipelineNotFoundException");
        let state = complete(state, expect_dispatch(command), &failing);
        assert!(state.pending_error.is_some());

        let state = press_all(state, &[enter()]);
        assert_eq!(state.view, View::PipelineStatus);
        assert_eq!(state.trail.target, None);
        assert_eq!(state.list.selected_key(), Some("api"));
    }

    #[test]
    fn test_pipeline_stages_are_read_only() {
        let gateway = FakeGateway::new();
        let (state, command) = press(at_operations(1), enter());
        let state = complete(state, expect_dispatch(command), &gateway);

        let state = press_all(state, &[enter()]);
        assert_eq!(state.view, View::PipelineStages);
        let stages: Vec<&str> = state.list.rows().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(stages, vec!["Source", "Release"]);

        let state = press_all(state, &[enter(), esc()]);
        assert_eq!(state.view, View::PipelineStatus);
        assert_eq!(state.trail.target, None);
        assert_eq!(state.list.selected_key(), Some("web"));
    }

    #[test]
    fn test_refresh_refetches_and_keeps_cursor() {
        let gateway = FakeGateway::new();
        let state = press_all(at_approvals(&gateway), &[char_key('j')]);

        let (state, command) = press(state, char_key('r'));
        let dispatch = expect_dispatch(command);
        assert_eq!(dispatch.request, OperationRequest::ListApprovals);
        assert!(state.is_loading());

        let state = complete(state, dispatch, &gateway);
        assert_eq!(state.list.selected_key(), Some("api/Deploy/Review"));
        assert_eq!(gateway.calls().len(), 2);
    }

    #[test]
    fn test_refresh_is_ignored_outside_list_views() {
        let (_, command) = press(at_operations(0), char_key('r'));
        assert!(matches!(command, Command::None));
    }

    #[test]
    fn test_manual_entry_validates_on_commit() {
        let state = press_all(create_test_state(), &[enter(), char_key('m')]);
        assert_eq!(state.input_mode, InputMode::FreeText);

        let state = type_text(state, "ops admin");
        let state = press_all(state, &[enter()]);
        assert!(matches!(
            state.pending_error,
            Some(EngineError::Configuration(_))
        ));
        assert_eq!(state.trail.profile, None);

        // acknowledging cancels the entry
        let state = press_all(state, &[enter()]);
        assert!(state.pending_error.is_none());
        assert_eq!(state.input_mode, InputMode::ListSelect);
        assert_eq!(state.view, View::ProviderConfig);
        assert!(state.text_input.is_empty());

        let state = type_text(press_all(state, &[char_key('m')]), "ops");
        let state = press_all(state, &[enter()]);
        assert_eq!(state.trail.profile.as_deref(), Some("ops"));
        assert_eq!(state.config_step(), ConfigStep::Region);

        let state = type_text(press_all(state, &[char_key('m')]), "mars-1");
        let state = press_all(state, &[enter()]);
        assert!(state.pending_error.is_some());

        let state = press_all(state, &[esc(), char_key('m')]);
        let state = type_text(state, "ap-south-2");
        let state = press_all(state, &[enter()]);
        assert_eq!(state.view, View::SelectService);
        assert_eq!(state.trail.region.as_deref(), Some("ap-south-2"));
    }

    #[test]
    fn test_escape_cancels_manual_entry_only() {
        let state = press_all(create_test_state(), &[enter(), char_key('m')]);
        let state = type_text(state, "half");
        let state = press_all(state, &[esc()]);

        assert_eq!(state.view, View::ProviderConfig);
        assert_eq!(state.trail.provider.as_deref(), Some("aws"));
        assert_eq!(state.input_mode, InputMode::ListSelect);
        assert!(state.text_input.is_empty());
    }

    #[test]
    fn test_manual_entry_key_is_scoped_to_provider_config() {
        let state = press_all(create_test_state(), &[char_key('m')]);
        assert_eq!(state.input_mode, InputMode::ListSelect);
    }

    #[test]
    fn test_invalid_configuration_blocks_dispatch() {
        let mut state = at_operations(0);
        state.trail.region = Some("not a region".to_string());

        let (state, command) = press(state, enter());

        assert!(matches!(command, Command::None));
        assert!(!state.is_loading());
        assert!(matches!(
            state.pending_error,
            Some(EngineError::Configuration(_))
        ));

        let state = press_all(state, &[enter()]);
        assert_eq!(state.view, View::SelectOperation);
    }

    #[test]
    fn test_operation_missing_from_catalog_is_internal_error() {
        let mut state = at_operations(0);
        state.list.set_rows(
            vec![ListRow::new("retired-op", vec!["Retired".to_string()])],
            None,
        );

        let (state, command) = press(state, enter());

        assert!(matches!(command, Command::None));
        assert!(!state.is_loading());
        assert_eq!(state.view, View::SelectOperation);
        assert_eq!(state.trail.operation, None);
        assert_eq!(
            state.pending_error,
            Some(EngineError::Internal(
                "operation 'retired-op' is not in the catalog".to_string()
            ))
        );
    }

    #[test]
    fn test_empty_profiles_prompt_manual_entry() {
        let state = AppState::new(Arc::new(Catalog::builtin()), Vec::new(), Vec::new());
        let state = press_all(state, &[enter()]);

        assert_eq!(state.view, View::ProviderConfig);
        assert!(state.list.is_empty());
        assert_eq!(
            state.notice.as_deref(),
            Some("No profiles found; press m to type one")
        );

        // nothing to select
        let state = press_all(state, &[enter()]);
        assert_eq!(state.trail.profile, None);
    }

    #[test]
    fn test_back_at_top_level_is_a_no_op() {
        let state = press_all(create_test_state(), &[esc(), key(KeyCode::Left)]);
        assert_eq!(state.view, View::Providers);
        assert_eq!(state.list.selected_key(), Some("aws"));
    }

    #[test]
    fn test_resize_and_input_closed() {
        let (state, command) = create_test_state().update(Message::Resize);
        assert!(matches!(command, Command::None));
        assert_eq!(state.view, View::Providers);

        let (_, command) = state.update(Message::InputClosed);
        assert!(matches!(command, Command::Quit));
    }
}
