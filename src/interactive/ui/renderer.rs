use crate::interactive::constants::{FOOTER_HEIGHT, HEADER_HEIGHT, TEXT_BOX_HEIGHT};
use crate::interactive::domain::models::{ConfigStep, InputMode, View};
use crate::interactive::ui::app_state::AppState;
use crate::interactive::ui::components::error_popup;
use crate::interactive::ui::keymap::KeyContext;
use crate::output::format_timestamp;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

#[derive(Debug, Default)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&mut self, f: &mut Frame, state: &AppState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(f.area());

        self.render_header(f, chunks[0], state);
        match state.view {
            View::ExecutingAction => self.render_execution(f, chunks[1], state),
            View::Summary => self.render_text_entry(f, chunks[1], state),
            View::ProviderConfig if state.input_mode == InputMode::FreeText => {
                self.render_text_entry(f, chunks[1], state)
            }
            _ => self.render_list(f, chunks[1], state),
        }
        self.render_footer(f, chunks[2], state);

        if let Some(error) = &state.pending_error {
            error_popup::render(f, f.area(), error);
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect, state: &AppState) {
        let header = Paragraph::new(Line::from(vec![Span::styled(
            state.breadcrumb(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]))
        .block(Block::default().title(" pipedeck ").borders(Borders::ALL));
        f.render_widget(header, area);
    }

    fn list_title(state: &AppState) -> String {
        match state.view {
            View::ProviderConfig => match state.config_step() {
                ConfigStep::Profile => "Select Profile".to_string(),
                ConfigStep::Region => "Select Region".to_string(),
            },
            View::PipelineStages => match state.trail.pipeline() {
                Some(pipeline) => format!("Stages of {}", pipeline.name),
                None => View::PipelineStages.title().to_string(),
            },
            view => view.title().to_string(),
        }
    }

    fn empty_message(state: &AppState) -> &'static str {
        match state.view {
            _ if state.is_loading() => "Loading...",
            View::ProviderConfig => "None found. Press m to type a value.",
            View::Approvals => "No approvals are waiting for a decision.",
            View::PipelineStatus => "No pipelines in this region.",
            _ => "Nothing to show.",
        }
    }

    fn render_list(&self, f: &mut Frame, area: Rect, state: &AppState) {
        state.list.render(
            f,
            area,
            &Self::list_title(state),
            state.view.columns(),
            Self::empty_message(state),
        );
    }

    fn render_text_entry(&self, f: &mut Frame, area: Rect, state: &AppState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(TEXT_BOX_HEIGHT), Constraint::Min(0)])
            .split(area);

        let (title, context) = match state.view {
            View::Summary => {
                let what = match (state.trail.decision, state.trail.approval()) {
                    (Some(decision), Some(action)) => {
                        format!("{} {}", decision.label(), action.key())
                    }
                    _ => String::new(),
                };
                (" Summary (optional) ".to_string(), what)
            }
            _ => (
                format!(" Enter {} ", state.config_step().label()),
                match state.config_step() {
                    ConfigStep::Profile => "Any profile name from your AWS config".to_string(),
                    ConfigStep::Region => "A region identifier such as us-east-1".to_string(),
                },
            ),
        };

        let input = Paragraph::new(Line::from(state.text_input.render_cursor_spans())).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
        f.render_widget(input, chunks[0]);
        f.render_widget(
            Paragraph::new(context).style(Style::default().fg(Color::DarkGray)),
            chunks[1],
        );
    }

    fn render_execution(&self, f: &mut Frame, area: Rect, state: &AppState) {
        let label = Style::default().fg(Color::Yellow);
        let mut lines = Vec::new();

        if let Some(action) = state.trail.approval() {
            lines.push(Line::from(vec![
                Span::styled("Approval: ", label),
                Span::raw(action.key()),
            ]));
            if let Some(decision) = state.trail.decision {
                lines.push(Line::from(vec![
                    Span::styled("Decision: ", label),
                    Span::raw(decision.label()),
                ]));
            }
            if let Some(summary) = state.trail.summary.as_deref().filter(|s| !s.is_empty()) {
                lines.push(Line::from(vec![
                    Span::styled("Summary:  ", label),
                    Span::raw(summary),
                ]));
            }
        } else if let Some(pipeline) = state.trail.pipeline() {
            lines.push(Line::from(vec![
                Span::styled("Pipeline: ", label),
                Span::raw(pipeline.name.as_str()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Revision: ", label),
                Span::raw("latest"),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Last run: ", label),
                Span::raw(format_timestamp(pipeline.last_updated())),
            ]));
        }
        lines.push(Line::from(""));

        if let Some(loading) = &state.loading {
            lines.push(Line::from(Span::styled(
                loading.as_str(),
                Style::default().fg(Color::Yellow),
            )));
        } else if let Some(outcome) = &state.outcome {
            lines.push(Line::from(Span::styled(
                outcome.as_str(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from("Press Enter to continue."));
        }

        let panel = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(format!(" {} ", View::ExecutingAction.title()))
                    .borders(Borders::ALL),
            );
        f.render_widget(panel, area);
    }

    fn hints(state: &AppState) -> &'static str {
        match state.key_context() {
            KeyContext::Loading => "q: quit",
            KeyContext::Error => "Enter/Esc: dismiss  q: quit",
            KeyContext::FreeText => "Enter: confirm  Esc: cancel  Ctrl+C: quit",
            KeyContext::List => match state.view {
                View::ProviderConfig => {
                    "↑/↓: move  Enter: select  m: type value  Esc: back  q: quit"
                }
                View::Approvals | View::PipelineStatus => {
                    "↑/↓: move  Enter: select  r: refresh  Esc: back  q: quit"
                }
                View::PipelineStages => "↑/↓: move  Esc: back  q: quit",
                View::ExecutingAction => "Enter: continue  q: quit",
                _ => "↑/↓: move  Enter: select  Esc: back  q: quit",
            },
        }
    }

    fn render_footer(&self, f: &mut Frame, area: Rect, state: &AppState) {
        let status = if let Some(loading) = &state.loading {
            Span::styled(loading.as_str(), Style::default().fg(Color::Yellow))
        } else if let Some(notice) = &state.notice {
            Span::styled(notice.as_str(), Style::default().fg(Color::Magenta))
        } else if let Some(outcome) = &state.outcome {
            Span::styled(outcome.as_str(), Style::default().fg(Color::Green))
        } else {
            Span::raw("")
        };

        let footer = Paragraph::new(vec![
            Line::from(Span::styled(
                Self::hints(state),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(status),
        ])
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(footer, area);
    }
}
