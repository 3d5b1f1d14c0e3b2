//! Analytics dashboard handler.
//!
//! Fetches the three server-side aggregates concurrently and renders stat
//! cards, an inline-SVG sales area chart, and the status distribution. All
//! computation beyond chart geometry happens on the backend.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;
use tracing::instrument;

use crate::backend::{AnalyticsSummary, SalesPoint, StatusSlice, TimeRange};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

use super::orders::AdminUserView;

/// Drawn width of the sales chart, in SVG units.
const CHART_WIDTH: f64 = 600.0;
/// Drawn height of the sales chart, in SVG units.
const CHART_HEIGHT: f64 = 220.0;

// =============================================================================
// View Types
// =============================================================================

/// Stat card values.
#[derive(Debug, Clone)]
pub struct MetricsView {
    pub total_sales: String,
    pub total_orders: String,
    pub avg_ticket: String,
    pub pending_orders: String,
}

impl From<&AnalyticsSummary> for MetricsView {
    fn from(summary: &AnalyticsSummary) -> Self {
        Self {
            total_sales: format!("${:.2}", summary.total_sales),
            total_orders: summary.total_orders.to_string(),
            avg_ticket: format!("${:.2}", summary.avg_ticket),
            pending_orders: summary.pending_orders.to_string(),
        }
    }
}

/// One slice of the status distribution with its share of the total.
#[derive(Debug, Clone)]
pub struct StatusSliceView {
    pub name: String,
    pub value: i64,
    pub percent: u32,
    pub css_class: String,
}

/// Sales chart geometry for the template.
#[derive(Debug, Clone)]
pub struct SalesChartView {
    /// `points` attribute of the area polygon (closed along the baseline).
    pub area_points: String,
    /// `points` attribute of the top polyline.
    pub line_points: String,
    pub width: u32,
    pub height: u32,
    /// First and last date labels for the x axis.
    pub start_label: String,
    pub end_label: String,
    pub max_label: String,
    pub has_data: bool,
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub range_param: String,
    pub start_value: String,
    pub end_value: String,
    pub metrics: MetricsView,
    pub chart: SalesChartView,
    pub slices: Vec<StatusSliceView>,
}

/// Dashboard query parameters.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub range: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

// =============================================================================
// Chart Geometry
// =============================================================================

/// Compute polyline/polygon point lists for the sales series.
///
/// X spreads the points evenly across the width; Y scales linearly from zero
/// to the series maximum. A single point renders as a flat line.
#[must_use]
pub fn sales_chart_view(points: &[SalesPoint]) -> SalesChartView {
    if points.is_empty() {
        return SalesChartView {
            area_points: String::new(),
            line_points: String::new(),
            width: CHART_WIDTH as u32,
            height: CHART_HEIGHT as u32,
            start_label: String::new(),
            end_label: String::new(),
            max_label: String::new(),
            has_data: false,
        };
    }

    let max = points.iter().map(|p| p.sales).fold(0.0_f64, f64::max);
    let scale = if max > 0.0 { CHART_HEIGHT / max } else { 0.0 };
    let step = if points.len() > 1 {
        CHART_WIDTH / (points.len() - 1) as f64
    } else {
        0.0
    };

    let mut line = String::new();
    for (i, point) in points.iter().enumerate() {
        let x = i as f64 * step;
        let y = CHART_HEIGHT - point.sales.max(0.0) * scale;
        if i > 0 {
            line.push(' ');
        }
        line.push_str(&format!("{x:.1},{y:.1}"));
    }

    // Close the polygon along the baseline for the filled area.
    let last_x = (points.len() - 1) as f64 * step;
    let area = format!("0,{CHART_HEIGHT} {line} {last_x:.1},{CHART_HEIGHT}");

    SalesChartView {
        area_points: area,
        line_points: line,
        width: CHART_WIDTH as u32,
        height: CHART_HEIGHT as u32,
        start_label: points.first().map(|p| p.date.clone()).unwrap_or_default(),
        end_label: points.last().map(|p| p.date.clone()).unwrap_or_default(),
        max_label: format!("${max:.0}"),
        has_data: true,
    }
}

/// Attach percentages and CSS classes to the status slices.
#[must_use]
pub fn status_slice_views(slices: &[StatusSlice]) -> Vec<StatusSliceView> {
    let total: i64 = slices.iter().map(|s| s.value).sum();

    slices
        .iter()
        .map(|slice| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let percent = if total > 0 {
                (slice.value * 100 / total) as u32
            } else {
                0
            };
            let css_class = slice
                .raw_status
                .as_deref()
                .map(|raw| format!("status-{}", raw.to_lowercase().replace('_', "-")))
                .unwrap_or_else(|| "status-unknown".to_string());

            StatusSliceView {
                name: slice.name.clone(),
                value: slice.value,
                percent,
                css_class,
            }
        })
        .collect()
}

// =============================================================================
// Handler
// =============================================================================

/// Dashboard page handler.
#[instrument(skip(admin, state))]
pub async fn dashboard(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    let range = TimeRange::from_query(
        query.range.as_deref(),
        query.start.as_deref(),
        query.end.as_deref(),
    );

    // The three aggregates are independent; fetch them concurrently and
    // render once all have resolved.
    let (summary_result, sales_result, status_result) = tokio::join!(
        state.backend().analytics_summary(admin.restaurant_id, &range),
        state.backend().sales_chart(admin.restaurant_id, &range),
        state.backend().status_distribution(admin.restaurant_id, &range),
    );

    let summary = summary_result.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch analytics summary: {e}");
        AnalyticsSummary::default()
    });
    let sales = sales_result.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch sales chart: {e}");
        Vec::new()
    });
    let slices = status_result.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch status distribution: {e}");
        Vec::new()
    });

    let (start_value, end_value) = match range {
        TimeRange::Custom { start, end } => (start.to_string(), end.to_string()),
        _ => (String::new(), String::new()),
    };

    let template = DashboardTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/dashboard".to_string(),
        range_param: range.as_param().to_string(),
        start_value,
        end_value,
        metrics: MetricsView::from(&summary),
        chart: sales_chart_view(&sales),
        slices: status_slice_views(&slices),
    };

    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn point(date: &str, sales: f64) -> SalesPoint {
        SalesPoint {
            date: date.to_string(),
            sales,
        }
    }

    #[test]
    fn test_metrics_view_formatting() {
        let summary = AnalyticsSummary {
            total_sales: Decimal::new(123450, 2),
            total_orders: 42,
            avg_ticket: Decimal::new(2939, 2),
            pending_orders: 3,
        };
        let view = MetricsView::from(&summary);
        assert_eq!(view.total_sales, "$1234.50");
        assert_eq!(view.total_orders, "42");
        assert_eq!(view.avg_ticket, "$29.39");
        assert_eq!(view.pending_orders, "3");
    }

    #[test]
    fn test_sales_chart_empty() {
        let view = sales_chart_view(&[]);
        assert!(!view.has_data);
        assert!(view.line_points.is_empty());
    }

    #[test]
    fn test_sales_chart_scales_to_max() {
        let view = sales_chart_view(&[
            point("2025-01-01", 0.0),
            point("2025-01-02", 50.0),
            point("2025-01-03", 100.0),
        ]);
        assert!(view.has_data);

        let coords: Vec<&str> = view.line_points.split(' ').collect();
        assert_eq!(coords.len(), 3);
        // Zero sales sits on the baseline, the max touches the top
        assert_eq!(coords[0], "0.0,220.0");
        assert_eq!(coords[2], "600.0,0.0");
        assert_eq!(view.start_label, "2025-01-01");
        assert_eq!(view.end_label, "2025-01-03");
        assert_eq!(view.max_label, "$100");
    }

    #[test]
    fn test_sales_chart_area_closes_polygon() {
        let view = sales_chart_view(&[point("a", 10.0), point("b", 20.0)]);
        assert!(view.area_points.starts_with("0,220"));
        assert!(view.area_points.ends_with("600.0,220"));
    }

    #[test]
    fn test_status_slices_percentages() {
        let slices = vec![
            StatusSlice {
                name: "Delivered".to_string(),
                value: 3,
                raw_status: Some("DELIVERED".to_string()),
            },
            StatusSlice {
                name: "Pending".to_string(),
                value: 1,
                raw_status: Some("PENDING".to_string()),
            },
        ];

        let views = status_slice_views(&slices);
        assert_eq!(views[0].percent, 75);
        assert_eq!(views[1].percent, 25);
        assert_eq!(views[0].css_class, "status-delivered");
    }

    #[test]
    fn test_status_slices_empty_total() {
        let slices = vec![StatusSlice {
            name: "Pending".to_string(),
            value: 0,
            raw_status: None,
        }];
        let views = status_slice_views(&slices);
        assert_eq!(views[0].percent, 0);
        assert_eq!(views[0].css_class, "status-unknown");
    }
}
