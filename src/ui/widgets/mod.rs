pub mod average;
pub mod counts;
pub mod pie;

use crate::analysis::AnalysisResult;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

#[derive(Debug, Clone)]
pub enum ChartData {
    /// A search is in flight, previous charts are gone.
    Loading,
    /// The last search produced nothing to draw.
    Cleared,
    Analysis(AnalysisResult),
}

pub trait DashboardWidget {
    fn id(&self) -> &'static str;

    fn title(&self) -> &str;

    fn render(&self, frame: &mut Frame, area: Rect, selected: bool);

    fn update_data(&mut self, data: &ChartData);

    fn set_selected(&mut self, selected: bool);
}

/// Shared chrome for chart panels.
pub(crate) fn panel_block(title: &str, selected: bool) -> Block<'static> {
    let border_style = if selected {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };

    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Renders a one-line placeholder inside a panel.
pub(crate) fn render_placeholder(frame: &mut Frame, area: Rect, block: Block, text: &str) {
    let paragraph = Paragraph::new(text.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .block(block);
    frame.render_widget(paragraph, area);
}

pub fn dashboard_widgets() -> Vec<Box<dyn DashboardWidget>> {
    vec![
        Box::new(counts::CountsWidget::new()),
        Box::new(pie::PieWidget::new()),
        Box::new(average::AverageWidget::new()),
    ]
}
