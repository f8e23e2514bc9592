use std::ops::RangeInclusive;

use eframe::egui::{RichText, Stroke, Ui};
use egui_plot::{Bar, BarChart, GridMark, Plot};

use crate::color;
use crate::data::aggregate::DashboardView;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel – KPI row and the two bar charts
// ---------------------------------------------------------------------------

/// Render the dashboard in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a sales file to get started  (File → Open…)");
        });
        return;
    };

    ui.add_space(8.0);
    ui.heading(RichText::new("Sales Dashboard").size(26.0).strong());
    ui.add_space(10.0);

    kpi_row(ui, view);

    ui.add_space(6.0);
    ui.separator();
    ui.add_space(6.0);

    let chart_height = (ui.available_height() - 40.0).max(220.0);
    ui.columns(2, |cols: &mut [Ui]| {
        product_line_chart(&mut cols[0], view, chart_height);
        hourly_chart(&mut cols[1], view, chart_height);
    });
}

// ---------------------------------------------------------------------------
// KPI row
// ---------------------------------------------------------------------------

fn kpi_row(ui: &mut Ui, view: &DashboardView) {
    let kpis = &view.kpis;
    ui.columns(3, |cols: &mut [Ui]| {
        kpi(
            &mut cols[0],
            "Total Sales:",
            format!("US $ {}", thousands(kpis.total_sales)),
        );

        cols[1].label(RichText::new("Average Rating:").size(15.0));
        let rating = match kpis.average_rating {
            Some(r) => format!("{r:.1}"),
            None => "—".to_string(),
        };
        cols[1].horizontal(|ui: &mut Ui| {
            ui.label(
                RichText::new(rating)
                    .size(22.0)
                    .strong()
                    .color(color::ACCENT),
            );
            ui.label(
                RichText::new(&kpis.star_rating)
                    .size(22.0)
                    .color(color::STAR),
            );
        });

        let avg_sale = match kpis.avg_sale_per_transaction {
            Some(v) => format!("US $ {v:.2}"),
            None => "—".to_string(),
        };
        kpi(&mut cols[2], "Average Sales Per Transaction:", avg_sale);
    });
}

fn kpi(ui: &mut Ui, title: &str, value: String) {
    ui.label(RichText::new(title).size(15.0));
    ui.label(
        RichText::new(value)
            .size(22.0)
            .strong()
            .color(color::ACCENT),
    );
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn bar_outline() -> Stroke {
    Stroke::new(1.0, color::shift_lightness(color::ACCENT, -0.1))
}

/// Horizontal bars: one per product line, sorted ascending by total.
fn product_line_chart(ui: &mut Ui, view: &DashboardView, height: f32) {
    ui.strong("Sales By Product Line");

    let labels: Vec<String> = view
        .by_product_line
        .iter()
        .map(|g| g.product_line.clone())
        .collect();
    let bars: Vec<Bar> = view
        .by_product_line
        .iter()
        .enumerate()
        .map(|(i, g)| {
            Bar::new(i as f64, g.total)
                .name(&g.product_line)
                .width(0.6)
                .fill(color::ACCENT)
                .stroke(bar_outline())
        })
        .collect();

    Plot::new("sales_by_product_line")
        .height(height)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_axis_label("Total (US $)")
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&labels, mark.value)
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().name("Total"));
        });
}

/// Vertical bars: one per hour present in the filtered data.
fn hourly_chart(ui: &mut Ui, view: &DashboardView, height: f32) {
    ui.strong("Sales By Hour");

    let bars: Vec<Bar> = view
        .by_hour
        .iter()
        .map(|g| {
            Bar::new(g.hour as f64, g.total)
                .name(format!("{:02}:00", g.hour))
                .width(0.8)
                .fill(color::ACCENT)
                .stroke(bar_outline())
        })
        .collect();

    Plot::new("sales_by_hour")
        .height(height)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_axis_label("Hour")
        .y_axis_label("Total (US $)")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| hour_label(mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Total"));
        });
}

// -- Axis tick helpers --

/// Label integer category positions with their group name, nothing else.
fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 0.25 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Two-digit hour at integer positions within 0–23.
fn hour_label(value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 0.25 || !(0.0..=23.0).contains(&idx) {
        return String::new();
    }
    format!("{:02}", idx as u8)
}

/// Group a whole number with thousands separators: 1234567 → "1,234,567".
fn thousands(n: i64) -> String {
    let digits = n.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 {
        format!("-{out}")
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_groups_digits() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(110127), "110,127");
        assert_eq!(thousands(1234567), "1,234,567");
        assert_eq!(thousands(-1234), "-1,234");
    }

    #[test]
    fn category_labels_only_appear_on_their_tick() {
        let labels = vec!["Health and beauty".to_string(), "Sports and travel".to_string()];
        assert_eq!(category_label(&labels, 0.0), "Health and beauty");
        assert_eq!(category_label(&labels, 1.05), "Sports and travel");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, -1.0), "");
        assert_eq!(category_label(&labels, 7.0), "");
    }

    #[test]
    fn hour_labels_cover_the_day_only() {
        assert_eq!(hour_label(13.0), "13");
        assert_eq!(hour_label(0.0), "00");
        assert_eq!(hour_label(13.4), "");
        assert_eq!(hour_label(24.0), "");
    }
}
