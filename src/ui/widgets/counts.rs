use crate::analysis::AnalysisResult;
use crate::ui::chart::{counts_rows, ChartRow};
use crate::ui::widgets::{panel_block, render_placeholder, ChartData, DashboardWidget};
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Cell, Row, Table},
};

const BAR_WIDTH: usize = 20;

pub struct CountsWidget {
    result: Option<AnalysisResult>,
    loading: bool,
    selected: bool,
}

impl CountsWidget {
    pub fn new() -> Self {
        Self {
            result: None,
            loading: false,
            selected: false,
        }
    }

    fn bar(row: &ChartRow, max: u64) -> String {
        if max == 0 {
            return String::new();
        }
        let filled = ((row.count as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
        "█".repeat(filled)
    }
}

impl Default for CountsWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardWidget for CountsWidget {
    fn id(&self) -> &'static str {
        "sentiment-counts"
    }

    fn title(&self) -> &str {
        "Sentiment of tweets"
    }

    fn render(&self, frame: &mut Frame, area: Rect, selected: bool) {
        let block = panel_block(self.title(), selected);

        let Some(result) = &self.result else {
            let text = if self.loading { "Loading..." } else { "" };
            render_placeholder(frame, area, block, text);
            return;
        };

        let rows = counts_rows(result.positive_tweets, result.negative_tweets);
        let max = rows.iter().map(|r| r.count).max().unwrap_or(0);

        let table_rows: Vec<Row> = rows
            .iter()
            .map(|row| {
                Row::new(vec![
                    Cell::from(Span::styled(row.label, Style::default().fg(row.color))),
                    Cell::from(row.count.to_string()),
                    Cell::from(Span::styled(
                        Self::bar(row, max),
                        Style::default().fg(row.color),
                    )),
                ])
            })
            .collect();

        let table = Table::new(
            table_rows,
            [
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Min(BAR_WIDTH as u16),
            ],
        )
        .header(
            Row::new(vec!["Sentiment", "Count", ""]).style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
        )
        .block(block);

        frame.render_widget(table, area);
    }

    fn update_data(&mut self, data: &ChartData) {
        match data {
            ChartData::Analysis(result) => {
                self.result = Some(result.clone());
                self.loading = false;
            }
            ChartData::Loading => {
                self.result = None;
                self.loading = true;
            }
            ChartData::Cleared => {
                self.result = None;
                self.loading = false;
            }
        }
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}
