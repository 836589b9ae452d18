use crate::ui::chart::{format_value, pie_points, pie_slices, PieSlice};
use crate::ui::widgets::{panel_block, render_placeholder, ChartData, DashboardWidget};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Paragraph,
    },
};

/// Grid spacing used to fill the disc, in unit-circle coordinates.
const FILL_STEP: f64 = 0.02;

pub struct PieWidget {
    slices: Vec<PieSlice>,
    points: Vec<Vec<(f64, f64)>>,
    has_result: bool,
    loading: bool,
    selected: bool,
}

impl PieWidget {
    pub fn new() -> Self {
        Self {
            slices: Vec::new(),
            points: Vec::new(),
            has_result: false,
            loading: false,
            selected: false,
        }
    }

    fn clear(&mut self) {
        self.slices.clear();
        self.points.clear();
        self.has_result = false;
    }

    fn legend(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for slice in &self.slices {
            if !spans.is_empty() {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled("■ ", Style::default().fg(slice.row.color)));
            spans.push(Span::raw(format!(
                "{} {} ({}%)",
                slice.row.label,
                slice.row.count,
                format_value(slice.percent())
            )));
        }
        Line::from(spans)
    }
}

impl Default for PieWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardWidget for PieWidget {
    fn id(&self) -> &'static str {
        "sentiment-pie"
    }

    fn title(&self) -> &str {
        "Tweet Sentiments"
    }

    fn render(&self, frame: &mut Frame, area: Rect, selected: bool) {
        let block = panel_block(self.title(), selected);

        if !self.has_result {
            let text = if self.loading { "Loading..." } else { "" };
            render_placeholder(frame, area, block, text);
            return;
        }

        if self.slices.is_empty() {
            render_placeholder(frame, area, block, "No tweets analysed");
            return;
        }

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(inner);

        // Terminal cells are roughly twice as tall as wide.
        let aspect = if chunks[0].height > 0 {
            (chunks[0].width as f64 / (chunks[0].height as f64 * 2.0)).max(1.0)
        } else {
            1.0
        };

        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([-aspect, aspect])
            .y_bounds([-1.0, 1.0])
            .paint(|ctx| {
                for (slice, coords) in self.slices.iter().zip(&self.points) {
                    ctx.draw(&Points {
                        coords: coords.as_slice(),
                        color: slice.row.color,
                    });
                }
            });
        frame.render_widget(canvas, chunks[0]);
        frame.render_widget(Paragraph::new(self.legend()), chunks[1]);
    }

    fn update_data(&mut self, data: &ChartData) {
        match data {
            ChartData::Analysis(result) => {
                self.slices = pie_slices(result.positive_tweets, result.negative_tweets);
                self.points = pie_points(&self.slices, FILL_STEP);
                self.has_result = true;
                self.loading = false;
            }
            ChartData::Loading => {
                self.clear();
                self.loading = true;
            }
            ChartData::Cleared => {
                self.clear();
                self.loading = false;
            }
        }
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}
