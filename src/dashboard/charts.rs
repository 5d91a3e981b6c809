//! Chart generation and rendering for the dashboard.
//!
//! This module creates interactive ECharts visualizations for the selected month:
//! - **Price Range Chart**: Number of items in each price range
//! - **Category Chart**: Share of items in each category
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisPointer, AxisPointerType, AxisType, Tooltip, Trigger},
    series::{Pie, bar},
};
use maud::{Markup, PreEscaped, html};

use crate::aggregation::{CategoryHistogram, PriceHistogram};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Registers the window listeners shared by every dashboard chart.
///
/// The flag on `window` survives htmx swaps, so the listeners are only added
/// once per page load however often the dashboard content is replaced.
const CHART_LISTENERS_SCRIPT: &str = r#"(function() {
    window.dashboardCharts = window.dashboardCharts || {};
    if (window.dashboardChartListeners) {
        return;
    }
    window.dashboardChartListeners = true;

    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
    const forEachChart = (f) => Object.values(window.dashboardCharts).forEach(f);

    window.addEventListener('resize', () => forEachChart((chart) => chart.resize()));
    darkModeMediaQuery.addEventListener('change', () => {
        const theme = darkModeMediaQuery.matches ? 'dark' : 'default';
        forEachChart((chart) => chart.setTheme(theme));
    });
})();"#;

/// Generates the script that draws `charts` into their containers.
///
/// The script runs inline rather than on `DOMContentLoaded` so that it also
/// runs when htmx swaps in new dashboard content. A swap replaces the chart
/// containers, so the instance drawn into the old container is disposed.
pub(super) fn charts_script(charts: &[DashboardChart]) -> Markup {
    let chart_scripts = charts.iter().map(|chart| {
        format!(
            r#"(function() {{
                const chartDom = document.getElementById("{id}");
                const previous = window.dashboardCharts["{id}"];
                if (previous && previous.getDom() !== chartDom) {{
                    previous.dispose();
                }}
                const chart = echarts.getInstanceByDom(chartDom) || echarts.init(chartDom);
                window.dashboardCharts["{id}"] = chart;
                chart.setOption({options}, true);

                const isDarkMode = window.matchMedia('(prefers-color-scheme: dark)').matches;
                chart.setTheme(isDarkMode ? 'dark' : 'default');
            }})();"#,
            id = chart.id,
            options = escape_script(&chart.options)
        )
    });

    let script_content = std::iter::once(CHART_LISTENERS_SCRIPT.to_owned())
        .chain(chart_scripts)
        .collect::<Vec<_>>()
        .join("\n");

    html!(
        script { (PreEscaped(script_content)) }
    )
}

/// Stop text such as a category name from closing the surrounding script tag.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// A bar chart of the number of items in each price range.
pub(super) fn price_range_chart(histogram: &PriceHistogram, month_label: &str) -> Chart {
    let (labels, values): (Vec<String>, Vec<f64>) = histogram
        .iter()
        .map(|(label, count)| (label.to_owned(), count as f64))
        .unzip();

    Chart::new()
        .title(
            Title::new()
                .text("Bar Chart Stats")
                .subtext(month_label),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .name("Price range")
                .data(labels),
        )
        .y_axis(Axis::new().type_(AxisType::Value).name("Items"))
        .series(bar::Bar::new().name("Items").data(values))
}

/// A pie chart of the number of items in each category.
pub(super) fn category_chart(histogram: &CategoryHistogram, month_label: &str) -> Chart {
    let data: Vec<(f64, &str)> = histogram
        .iter()
        .map(|(category, count)| (*count as f64, category.as_str()))
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Pie Chart Stats")
                .subtext(month_label),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().left("right").top("1%"))
        .series(Pie::new().name("Items").radius("55%").data(data))
}
