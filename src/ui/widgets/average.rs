use crate::ui::chart::{average_bar, AverageBar};
use crate::ui::widgets::{panel_block, render_placeholder, ChartData, DashboardWidget};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Gauge, Paragraph},
};

pub struct AverageWidget {
    bar: Option<AverageBar>,
    loading: bool,
    selected: bool,
}

impl AverageWidget {
    pub fn new() -> Self {
        Self {
            bar: None,
            loading: false,
            selected: false,
        }
    }
}

impl Default for AverageWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardWidget for AverageWidget {
    fn id(&self) -> &'static str {
        "average-sentiment"
    }

    fn title(&self) -> &str {
        "Average Tweet Sentiment"
    }

    fn render(&self, frame: &mut Frame, area: Rect, selected: bool) {
        let block = panel_block(self.title(), selected);

        let Some(bar) = self.bar else {
            let text = if self.loading { "Loading..." } else { "" };
            render_placeholder(frame, area, block, text);
            return;
        };

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Line::from("Average Sentiment")).style(Style::default().fg(Color::Cyan)),
            chunks[0],
        );

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(bar.color()).bg(Color::Black))
            .ratio(bar.ratio())
            .label(bar.label())
            .use_unicode(true);
        frame.render_widget(gauge, chunks[1]);

        let axis = format!(
            "0{:>width$}",
            AverageBar::AXIS_MAX as u64,
            width = chunks[2].width.saturating_sub(1) as usize
        );
        frame.render_widget(
            Paragraph::new(axis).style(Style::default().add_modifier(Modifier::DIM)),
            chunks[2],
        );
    }

    fn update_data(&mut self, data: &ChartData) {
        match data {
            ChartData::Analysis(result) => {
                self.bar = Some(average_bar(result.average_score));
                self.loading = false;
            }
            ChartData::Loading => {
                self.bar = None;
                self.loading = true;
            }
            ChartData::Cleared => {
                self.bar = None;
                self.loading = false;
            }
        }
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}
