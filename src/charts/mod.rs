//! Chart documents for the report.
//!
//! Charts are emitted as Vega-Lite v5 specifications with the data inlined,
//! so any Vega-Lite renderer can draw them. Styling comes only from the
//! `ChartConfig` handed to each builder.

use crate::config::ChartConfig;
use crate::models::{ClinicYearlyStat, MonthlyRecord, YearlyClinicRecord};
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// A chart ready to be written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDocument {
    /// File name without directory, e.g. `monthly_births_deaths.vl.json`.
    pub file_name: String,
    pub spec: Value,
}

/// Per-clinic yearly quantity plotted as one line per clinic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum YearlyMetric {
    Births,
    Deaths,
    PctDeaths,
}

impl YearlyMetric {
    fn field(&self) -> &'static str {
        match self {
            YearlyMetric::Births => "births",
            YearlyMetric::Deaths => "deaths",
            YearlyMetric::PctDeaths => "pct_deaths",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            YearlyMetric::Births => "Total Yearly Births by Clinic",
            YearlyMetric::Deaths => "Total Yearly Deaths by Clinic",
            YearlyMetric::PctDeaths => "Proportion of Yearly Deaths by Clinic",
        }
    }

    fn file_name(&self) -> String {
        format!("yearly_{}_by_clinic.vl.json", self.field())
    }
}

/// Monthly births and deaths on twin y axes.
pub fn monthly_births_deaths(records: &[MonthlyRecord], config: &ChartConfig) -> ChartDocument {
    let values: Vec<Value> = records
        .iter()
        .map(|r| {
            json!({
                "date": r.date.format("%Y-%m-%d").to_string(),
                "births": r.births,
                "deaths": r.deaths,
            })
        })
        .collect();

    let spec = json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": title(config, "Total Number of Monthly Births and Deaths"),
        "width": config.width,
        "height": config.height,
        "data": { "values": values },
        "encoding": {
            "x": {
                "field": "date",
                "type": "temporal",
                "title": null,
                "axis": {
                    "format": "%Y",
                    "tickCount": "year",
                    "labelAngle": -45,
                    "grid": config.grid,
                    "gridColor": "grey",
                    "gridDash": [4, 4],
                },
            },
        },
        "layer": [
            {
                "mark": { "type": "line", "color": config.births_color, "strokeWidth": 3 },
                "encoding": {
                    "y": {
                        "field": "births",
                        "type": "quantitative",
                        "axis": {
                            "title": "Births",
                            "titleColor": config.births_color,
                            "labelColor": config.births_color,
                            "titleFontSize": 16,
                            "grid": config.grid,
                            "gridDash": [4, 4],
                        },
                    },
                },
            },
            {
                "mark": {
                    "type": "line",
                    "color": config.deaths_color,
                    "strokeWidth": 2,
                    "strokeDash": [6, 4],
                },
                "encoding": {
                    "y": {
                        "field": "deaths",
                        "type": "quantitative",
                        "axis": {
                            "title": "Deaths",
                            "orient": "right",
                            "titleColor": config.deaths_color,
                            "labelColor": config.deaths_color,
                            "titleFontSize": 16,
                            "grid": false,
                        },
                    },
                },
            },
        ],
        "resolve": { "scale": { "y": "independent" } },
    });

    ChartDocument {
        file_name: "monthly_births_deaths.vl.json".to_string(),
        spec,
    }
}

/// Raw yearly count plotted by `yearly_counts_by_clinic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearlyCount {
    Births,
    Deaths,
}

impl YearlyCount {
    fn value(&self, record: &YearlyClinicRecord) -> u64 {
        match self {
            YearlyCount::Births => record.births,
            YearlyCount::Deaths => record.deaths,
        }
    }

    fn metric(&self) -> YearlyMetric {
        match self {
            YearlyCount::Births => YearlyMetric::Births,
            YearlyCount::Deaths => YearlyMetric::Deaths,
        }
    }
}

/// Yearly births or deaths, one line per clinic.
pub fn yearly_counts_by_clinic(
    rows: &[YearlyClinicRecord],
    count: YearlyCount,
    config: &ChartConfig,
) -> ChartDocument {
    let metric = count.metric();
    let values = rows
        .iter()
        .map(|r| json!({ "year": r.year, "clinic": r.clinic, (metric.field()): count.value(r) }))
        .collect();

    clinic_line_chart(values, metric, config)
}

/// Per-row death percentage, one line per clinic.
pub fn yearly_pct_deaths_by_clinic(series: &[ClinicYearlyStat], config: &ChartConfig) -> ChartDocument {
    let values = series
        .iter()
        .map(|s| json!({ "year": s.year, "clinic": s.clinic, "pct_deaths": s.pct_deaths }))
        .collect();

    clinic_line_chart(values, YearlyMetric::PctDeaths, config)
}

/// Every chart of the report, in display order.
pub fn build_charts(
    monthly: &[MonthlyRecord],
    yearly: &[YearlyClinicRecord],
    pct_deaths: &[ClinicYearlyStat],
    config: &ChartConfig,
) -> Vec<ChartDocument> {
    vec![
        monthly_births_deaths(monthly, config),
        yearly_counts_by_clinic(yearly, YearlyCount::Births, config),
        yearly_counts_by_clinic(yearly, YearlyCount::Deaths, config),
        yearly_pct_deaths_by_clinic(pct_deaths, config),
    ]
}

/// Write chart documents into `dir`, creating it if needed.
pub fn write_charts(charts: &[ChartDocument], dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create chart directory: {}", dir.display()))?;

    let mut written = Vec::with_capacity(charts.len());
    for chart in charts {
        let path = dir.join(&chart.file_name);
        let content = serde_json::to_string_pretty(&chart.spec)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write chart: {}", path.display()))?;
        debug!("Wrote chart {}", path.display());
        written.push(path);
    }

    info!("Wrote {} charts to {}", written.len(), dir.display());
    Ok(written)
}

fn clinic_line_chart(values: Vec<Value>, metric: YearlyMetric, config: &ChartConfig) -> ChartDocument {
    let spec = json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": title(config, metric.title()),
        "width": config.width,
        "height": config.height,
        "data": { "values": values },
        "mark": { "type": "line", "point": true },
        "encoding": {
            "x": { "field": "year", "type": "ordinal", "axis": { "grid": config.grid } },
            "y": { "field": metric.field(), "type": "quantitative", "axis": { "grid": config.grid } },
            "color": {
                "field": "clinic",
                "type": "nominal",
                "scale": { "scheme": config.clinic_scheme },
            },
        },
    });

    ChartDocument {
        file_name: metric.file_name(),
        spec,
    }
}

fn title(config: &ChartConfig, text: &str) -> Value {
    json!({ "text": text, "fontSize": config.title_font_size })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn months() -> Vec<MonthlyRecord> {
        vec![
            MonthlyRecord {
                date: NaiveDate::from_ymd_opt(1841, 1, 1).unwrap(),
                births: 254,
                deaths: 37,
            },
            MonthlyRecord {
                date: NaiveDate::from_ymd_opt(1841, 2, 1).unwrap(),
                births: 239,
                deaths: 18,
            },
        ]
    }

    fn years() -> Vec<YearlyClinicRecord> {
        vec![
            YearlyClinicRecord {
                year: 1841,
                clinic: "clinic 1".to_string(),
                births: 3036,
                deaths: 237,
            },
            YearlyClinicRecord {
                year: 1841,
                clinic: "clinic 2".to_string(),
                births: 2442,
                deaths: 86,
            },
        ]
    }

    #[test]
    fn test_monthly_chart_uses_config() {
        let config = ChartConfig {
            births_color: "navy".to_string(),
            width: 640,
            ..ChartConfig::default()
        };
        let chart = monthly_births_deaths(&months(), &config);

        assert_eq!(chart.spec["width"], 640);
        assert_eq!(chart.spec["data"]["values"][1]["date"], "1841-02-01");
        assert_eq!(chart.spec["data"]["values"][0]["births"], 254);
        assert_eq!(chart.spec["layer"][0]["mark"]["color"], "navy");
        assert_eq!(chart.spec["layer"][1]["encoding"]["y"]["axis"]["orient"], "right");
        assert_eq!(chart.spec["resolve"]["scale"]["y"], "independent");
    }

    #[test]
    fn test_yearly_counts_chart() {
        let chart = yearly_counts_by_clinic(&years(), YearlyCount::Deaths, &ChartConfig::default());

        assert_eq!(chart.file_name, "yearly_deaths_by_clinic.vl.json");
        assert_eq!(chart.spec["encoding"]["y"]["field"], "deaths");
        assert_eq!(chart.spec["data"]["values"][1]["deaths"], 86);
        assert_eq!(chart.spec["encoding"]["color"]["field"], "clinic");
        assert_eq!(chart.spec["mark"]["point"], true);
    }

    #[test]
    fn test_each_count_plots_its_own_column() {
        let config = ChartConfig::default();
        let births = yearly_counts_by_clinic(&years(), YearlyCount::Births, &config);
        let deaths = yearly_counts_by_clinic(&years(), YearlyCount::Deaths, &config);

        assert_eq!(births.spec["data"]["values"][0]["births"], 3036);
        assert!(births.spec["data"]["values"][0].get("deaths").is_none());
        assert_eq!(births.spec["title"]["text"], "Total Yearly Births by Clinic");

        assert_eq!(deaths.spec["data"]["values"][0]["deaths"], 237);
        assert!(deaths.spec["data"]["values"][0].get("births").is_none());
        assert!(deaths.spec["data"]["values"][0].get("pct_deaths").is_none());
        assert_eq!(deaths.spec["title"]["text"], "Total Yearly Deaths by Clinic");
    }

    #[test]
    fn test_build_charts_titles_match_data() {
        let series = vec![ClinicYearlyStat {
            year: 1841,
            clinic: "clinic 1".to_string(),
            pct_deaths: 7.8,
        }];
        let charts = build_charts(&months(), &years(), &series, &ChartConfig::default());

        for chart in &charts[1..] {
            let field = chart.spec["encoding"]["y"]["field"].as_str().unwrap();
            assert!(chart.spec["data"]["values"][0].get(field).is_some());
            assert!(chart.file_name.contains(field));
        }
        assert_eq!(charts[3].spec["data"]["values"][0]["pct_deaths"], 7.8);
    }

    #[test]
    fn test_pct_chart() {
        let series = vec![ClinicYearlyStat {
            year: 1841,
            clinic: "clinic 1".to_string(),
            pct_deaths: 7.8,
        }];
        let chart = yearly_pct_deaths_by_clinic(&series, &ChartConfig::default());

        assert_eq!(chart.file_name, "yearly_pct_deaths_by_clinic.vl.json");
        assert_eq!(chart.spec["data"]["values"][0]["pct_deaths"], 7.8);
        assert_eq!(
            chart.spec["title"]["text"],
            "Proportion of Yearly Deaths by Clinic"
        );
    }

    #[test]
    fn test_write_charts() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("charts");
        let charts = build_charts(&months(), &years(), &[], &ChartConfig::default());

        let written = write_charts(&charts, &out).unwrap();

        assert_eq!(written.len(), 4);
        let content = std::fs::read_to_string(out.join("yearly_births_by_clinic.vl.json")).unwrap();
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["$schema"], VEGA_LITE_SCHEMA);
    }
}
