//! Descriptive statistics over every column of a layer.
//!
//! Numeric columns (all non-null values are JSON numbers) get count, mean,
//! sample standard deviation, min, quartiles and max. Every other column,
//! including `geometry`, gets count, unique, top and freq.

use std::collections::HashMap;
use std::fmt;

use comfy_table::{presets, Table};
use serde::Serialize;
use serde_json::Value;

use crate::layers::{geometry_type, Layer};
use crate::util::truncate_for_log;

const CATEGORICAL_ROWS: [&str; 3] = ["unique", "top", "freq"];
const NUMERIC_ROWS: [&str; 7] = ["mean", "std", "min", "25%", "50%", "75%", "max"];

/// A single cell of a describe table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Stat {
    Count(u64),
    Number(f64),
    Text(String),
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stat::Count(n) => write!(f, "{}", n),
            Stat::Number(x) => write!(f, "{:.6}", x),
            Stat::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatRow {
    pub stat: String,
    /// One entry per column; `None` where the statistic does not apply.
    pub values: Vec<Option<Stat>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DescribeTable {
    pub layer: String,
    pub columns: Vec<String>,
    pub rows: Vec<StatRow>,
}

impl DescribeTable {
    pub fn row(&self, stat: &str) -> Option<&StatRow> {
        self.rows.iter().find(|r| r.stat == stat)
    }

    pub fn get(&self, stat: &str, column: &str) -> Option<&Stat> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.row(stat)?.values.get(index)?.as_ref()
    }
}

impl fmt::Display for DescribeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = Table::new();
        table.load_preset(presets::ASCII_MARKDOWN);

        let mut header = vec![String::new()];
        header.extend(self.columns.iter().cloned());
        table.set_header(header);

        for row in &self.rows {
            let mut cells = vec![row.stat.clone()];
            cells.extend(row.values.iter().map(|v| match v {
                Some(stat) => stat.to_string(),
                None => "NaN".to_string(),
            }));
            table.add_row(cells);
        }

        write!(f, "{}", table)
    }
}

enum Column {
    Numeric(Vec<f64>),
    /// Display label and grouping key per non-null value.
    Categorical(Vec<(String, String)>),
}

impl Column {
    fn count(&self) -> u64 {
        match self {
            Column::Numeric(values) => values.len() as u64,
            Column::Categorical(values) => values.len() as u64,
        }
    }

    fn stat(&self, row: &str) -> Option<Stat> {
        match self {
            Column::Numeric(values) => numeric_stat(values, row),
            Column::Categorical(values) => categorical_stat(values, row),
        }
    }
}

/// Summarize every attribute column plus the geometry column of `layer`.
pub fn summarize(layer: &Layer) -> DescribeTable {
    let mut names = layer.columns();
    let mut columns: Vec<Column> = names
        .iter()
        .map(|name| attribute_column(layer, name))
        .collect();

    names.push("geometry".to_string());
    columns.push(geometry_column(layer));

    let has_categorical = columns.iter().any(|c| matches!(c, Column::Categorical(_)));
    let has_numeric = columns.iter().any(|c| matches!(c, Column::Numeric(_)));

    let mut rows = vec![StatRow {
        stat: "count".to_string(),
        values: columns.iter().map(|c| Some(Stat::Count(c.count()))).collect(),
    }];

    let mut push_rows = |labels: &[&str]| {
        for label in labels {
            rows.push(StatRow {
                stat: label.to_string(),
                values: columns.iter().map(|c| c.stat(label)).collect(),
            });
        }
    };
    if has_categorical {
        push_rows(&CATEGORICAL_ROWS[..]);
    }
    if has_numeric {
        push_rows(&NUMERIC_ROWS[..]);
    }

    DescribeTable {
        layer: layer.name.clone(),
        columns: names,
        rows,
    }
}

fn attribute_column(layer: &Layer, name: &str) -> Column {
    let values: Vec<&Value> = layer
        .features
        .iter()
        .filter_map(|f| f.properties.get(name))
        .filter(|v| !v.is_null())
        .collect();

    let numbers: Vec<f64> = values.iter().filter_map(|v| v.as_f64()).collect();
    if !values.is_empty() && numbers.len() == values.len() {
        return Column::Numeric(numbers);
    }

    Column::Categorical(
        values
            .into_iter()
            .map(|v| {
                let label = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (label.clone(), label)
            })
            .collect(),
    )
}

fn geometry_column(layer: &Layer) -> Column {
    Column::Categorical(
        layer
            .features
            .iter()
            .map(|f| {
                let geometry = geojson::Geometry::new(geojson::Value::from(&f.geometry));
                let key = serde_json::to_string(&geometry).unwrap_or_default();
                let label = format!(
                    "{} {}",
                    geometry_type(&f.geometry),
                    truncate_for_log(&key, 48)
                );
                (label, key)
            })
            .collect(),
    )
}

fn categorical_stat(values: &[(String, String)], row: &str) -> Option<Stat> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, (_, key)) in values.iter().enumerate() {
        counts.entry(key.as_str()).or_insert((0, position)).0 += 1;
    }

    // Ties go to the value seen first.
    let top = counts
        .values()
        .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
        .copied();

    match row {
        "unique" => Some(Stat::Count(counts.len() as u64)),
        "top" => top.map(|(_, position)| Stat::Text(values[position].0.clone())),
        "freq" => top.map(|(count, _)| Stat::Count(count as u64)),
        _ => None,
    }
}

fn numeric_stat(values: &[f64], row: &str) -> Option<Stat> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let value = match row {
        "mean" => mean,
        "std" => {
            if values.len() < 2 {
                return None;
            }
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        }
        "min" => sorted[0],
        "25%" => quantile(&sorted, 0.25),
        "50%" => quantile(&sorted, 0.5),
        "75%" => quantile(&sorted, 0.75),
        "max" => sorted[sorted.len() - 1],
        _ => return None,
    };
    Some(Stat::Number(value))
}

/// Linear-interpolated quantile of sorted, non-empty input.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{Feature, Properties};
    use geo::Point;
    use serde_json::json;

    fn schools() -> Layer {
        let rows = [
            json!({"name": "Hillside", "pupils": 100, "district": "north"}),
            json!({"name": "Riverside", "pupils": 200, "district": "south"}),
            json!({"name": "Lakeside", "pupils": 300, "district": "north"}),
            json!({"name": "Parkview", "pupils": 400, "district": null}),
        ];
        let features = rows
            .iter()
            .enumerate()
            .map(|(i, props)| {
                Feature::new(
                    Point::new(i as f64, 0.0).into(),
                    props.as_object().cloned().unwrap_or_default(),
                )
            })
            .collect();
        Layer::new("school_zones", features, None)
    }

    #[test]
    fn count_row_covers_every_column() {
        let table = summarize(&schools());
        assert_eq!(table.rows[0].stat, "count");
        assert_eq!(table.columns.len(), 4);
        assert_eq!(table.columns.last().map(String::as_str), Some("geometry"));
        assert!(table.rows[0].values.iter().all(Option::is_some));
        assert_eq!(table.get("count", "district"), Some(&Stat::Count(3)));
        assert_eq!(table.get("count", "geometry"), Some(&Stat::Count(4)));
    }

    #[test]
    fn numeric_columns_get_distribution_stats() {
        let table = summarize(&schools());
        assert_eq!(table.get("mean", "pupils"), Some(&Stat::Number(250.0)));
        assert_eq!(table.get("min", "pupils"), Some(&Stat::Number(100.0)));
        assert_eq!(table.get("25%", "pupils"), Some(&Stat::Number(175.0)));
        assert_eq!(table.get("max", "pupils"), Some(&Stat::Number(400.0)));
        match table.get("std", "pupils") {
            Some(Stat::Number(std)) => assert!((std - 129.099_444_873_580_56).abs() < 1e-9),
            other => panic!("unexpected std: {other:?}"),
        }
        assert_eq!(table.get("unique", "pupils"), None);
    }

    #[test]
    fn categorical_columns_get_top_and_freq() {
        let table = summarize(&schools());
        assert_eq!(table.get("unique", "district"), Some(&Stat::Count(2)));
        assert_eq!(table.get("top", "district"), Some(&Stat::Text("north".to_string())));
        assert_eq!(table.get("freq", "district"), Some(&Stat::Count(2)));
        assert_eq!(table.get("mean", "district"), None);
        assert_eq!(table.get("unique", "geometry"), Some(&Stat::Count(4)));
    }

    #[test]
    fn row_order_follows_describe_layout() {
        let table = summarize(&schools());
        let stats: Vec<&str> = table.rows.iter().map(|r| r.stat.as_str()).collect();
        assert_eq!(
            stats,
            vec!["count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max"]
        );
    }

    #[test]
    fn empty_layer_summarizes_geometry_only() {
        let table = summarize(&Layer::new("empty", Vec::new(), None));
        assert_eq!(table.columns, vec!["geometry"]);
        assert_eq!(table.get("count", "geometry"), Some(&Stat::Count(0)));
        assert_eq!(table.get("top", "geometry"), None);
        assert!(table.row("mean").is_none());
    }

    #[test]
    fn renders_as_text_table() {
        let mut props = Properties::new();
        props.insert("pupils".to_string(), json!(12));
        let layer = Layer::new(
            "tiny",
            vec![Feature::new(Point::new(0.0, 0.0).into(), props)],
            None,
        );
        let text = summarize(&layer).to_string();
        assert!(text.contains("pupils"));
        assert!(text.contains("count"));
        assert!(text.contains("NaN"));
    }
}
