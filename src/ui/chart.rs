//! View-models that reshape an analysis into what the chart widgets draw.

use ratatui::style::Color;
use std::f64::consts::TAU;

pub const POSITIVE_COLOR: Color = Color::Green;
pub const NEGATIVE_COLOR: Color = Color::Red;

/// One labelled, coloured value in a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub label: &'static str,
    pub count: u64,
    pub color: Color,
}

pub fn counts_rows(positive: u64, negative: u64) -> [ChartRow; 2] {
    [
        ChartRow {
            label: "Positive",
            count: positive,
            color: POSITIVE_COLOR,
        },
        ChartRow {
            label: "Negative",
            count: negative,
            color: NEGATIVE_COLOR,
        },
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub row: ChartRow,
    pub fraction: f64,
    /// Angles in radians, counter-clockwise from the positive x axis.
    pub start_angle: f64,
    pub end_angle: f64,
}

impl PieSlice {
    pub fn percent(&self) -> f64 {
        self.fraction * 100.0
    }

    pub fn contains_angle(&self, angle: f64) -> bool {
        angle >= self.start_angle && angle < self.end_angle
    }
}

/// Splits the circle between the positive and negative counts. Empty when
/// there is nothing to draw.
pub fn pie_slices(positive: u64, negative: u64) -> Vec<PieSlice> {
    let total = positive as u128 + negative as u128;
    if total == 0 {
        return Vec::new();
    }

    let mut start = 0.0;
    counts_rows(positive, negative)
        .into_iter()
        .filter(|row| row.count > 0)
        .map(|row| {
            let fraction = row.count as f64 / total as f64;
            let end = start + fraction * TAU;
            let slice = PieSlice {
                row,
                fraction,
                start_angle: start,
                end_angle: end,
            };
            start = end;
            slice
        })
        .collect()
}

/// Sample points filling the unit disc, grouped by slice.
pub fn pie_points(slices: &[PieSlice], step: f64) -> Vec<Vec<(f64, f64)>> {
    let mut points = vec![Vec::new(); slices.len()];
    if slices.is_empty() || step <= 0.0 {
        return points;
    }

    let steps = (2.0 / step).ceil() as i64;
    for yi in 0..=steps {
        let y = -1.0 + yi as f64 * step;
        for xi in 0..=steps {
            let x = -1.0 + xi as f64 * step;
            if x * x + y * y > 1.0 {
                continue;
            }
            let angle = y.atan2(x).rem_euclid(TAU);
            let idx = slices
                .iter()
                .position(|s| s.contains_angle(angle))
                .unwrap_or(slices.len() - 1);
            points[idx].push((x, y));
        }
    }

    points
}

/// Average sentiment on a 0..100 axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageBar {
    pub value: f64,
}

impl AverageBar {
    pub const AXIS_MAX: f64 = 100.0;

    /// Bar fill in [0, 1]. Negative averages fill by magnitude.
    pub fn ratio(&self) -> f64 {
        if self.value.is_finite() {
            (self.value.abs() / Self::AXIS_MAX).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn color(&self) -> Color {
        if self.value < 0.0 {
            NEGATIVE_COLOR
        } else {
            POSITIVE_COLOR
        }
    }

    pub fn label(&self) -> String {
        format_value(self.value)
    }
}

pub fn average_bar(average_score: f64) -> AverageBar {
    AverageBar {
        value: average_score * 100.0,
    }
}

/// Formats a chart value without a trailing `.0` for whole numbers.
pub fn format_value(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_rows_are_verbatim() {
        let rows = counts_rows(30, 18);
        assert_eq!(rows[0].label, "Positive");
        assert_eq!(rows[0].count, 30);
        assert_eq!(rows[0].color, Color::Green);
        assert_eq!(rows[1].label, "Negative");
        assert_eq!(rows[1].count, 18);
        assert_eq!(rows[1].color, Color::Red);
    }

    #[test]
    fn test_pie_slices_split_the_circle() {
        let slices = pie_slices(30, 18);
        assert_eq!(slices.len(), 2);
        assert!((slices[0].fraction - 30.0 / 48.0).abs() < 1e-12);
        assert!((slices[1].fraction - 18.0 / 48.0).abs() < 1e-12);
        assert_eq!(slices[0].start_angle, 0.0);
        assert_eq!(slices[0].end_angle, slices[1].start_angle);
        assert!((slices[1].end_angle - TAU).abs() < 1e-12);
        assert!((slices[0].percent() - 62.5).abs() < 1e-9);
    }

    #[test]
    fn test_pie_slices_skip_zero_rows() {
        let slices = pie_slices(0, 5);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].row.label, "Negative");
        assert_eq!(slices[0].fraction, 1.0);
    }

    #[test]
    fn test_pie_slices_empty_when_no_tweets() {
        assert!(pie_slices(0, 0).is_empty());
        assert!(pie_points(&[], 0.1).is_empty());
    }

    #[test]
    fn test_pie_slices_with_counts_at_u64_max() {
        let slices = pie_slices(u64::MAX, 1);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].row.count, u64::MAX);
        assert!(slices[0].fraction > 0.999_999);
        assert!(slices[1].fraction > 0.0);

        let slices = pie_slices(u64::MAX, u64::MAX);
        assert!((slices[0].fraction - 0.5).abs() < 1e-12);
        assert!((slices[1].end_angle - TAU).abs() < 1e-9);
    }

    #[test]
    fn test_pie_points_follow_fractions() {
        let slices = pie_slices(3, 1);
        let points = pie_points(&slices, 0.02);
        let total: usize = points.iter().map(Vec::len).sum();
        let share = points[0].len() as f64 / total as f64;
        assert!((share - 0.75).abs() < 0.02, "share was {}", share);
        assert!(points
            .iter()
            .flatten()
            .all(|(x, y)| x * x + y * y <= 1.0));
    }

    #[test]
    fn test_average_bar_scales_score() {
        let bar = average_bar(0.22);
        assert_eq!(bar.label(), "22");
        assert!((bar.ratio() - 0.22).abs() < 1e-9);
        assert_eq!(bar.color(), Color::Green);
    }

    #[test]
    fn test_average_bar_negative_and_out_of_range() {
        let bar = average_bar(-0.355);
        assert_eq!(bar.label(), "-35.5");
        assert_eq!(bar.color(), Color::Red);
        assert!((bar.ratio() - 0.355).abs() < 1e-9);

        assert_eq!(average_bar(1.7).ratio(), 1.0);
        assert_eq!(average_bar(f64::NAN).ratio(), 0.0);
    }
}
