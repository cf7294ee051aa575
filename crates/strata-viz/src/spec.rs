//! Vega-Lite specification builders.

use serde_json::{json, Value};
use strata_metrics::{CoChange, FileAge, HotSpot};

/// Schema identifier stamped on every generated spec.
pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Scatter plot of hot spots: code size against change count, the
/// classic quadrant view. Point size carries the composite score.
///
/// # Examples
///
/// ```
/// use strata_viz::hotspot_scatter;
///
/// let spec = hotspot_scatter(&[]);
/// assert_eq!(spec["mark"]["type"], "point");
/// ```
pub fn hotspot_scatter(spots: &[HotSpot]) -> Value {
    let values: Vec<Value> = spots
        .iter()
        .map(|s| {
            json!({
                "path": s.path,
                "language": s.language,
                "lines": s.lines,
                "changes": s.changes,
                "score": s.score,
            })
        })
        .collect();

    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "description": "Hot spots: size vs. change frequency",
        "data": {"values": values},
        "mark": {"type": "point", "filled": true, "opacity": 0.7},
        "encoding": {
            "x": {
                "field": "lines",
                "type": "quantitative",
                "title": "lines of code",
                "scale": {"zero": true},
            },
            "y": {
                "field": "changes",
                "type": "quantitative",
                "title": "changes",
                "scale": {"zero": true},
            },
            "size": {
                "field": "score",
                "type": "quantitative",
                "scale": {"domain": [0.0, 2.0]},
            },
            "color": {"field": "language", "type": "nominal"},
            "tooltip": [
                {"field": "path", "type": "nominal"},
                {"field": "lines", "type": "quantitative"},
                {"field": "changes", "type": "quantitative"},
                {"field": "score", "type": "quantitative", "format": ".2f"},
            ],
        },
        "width": 640,
        "height": 400,
    })
}

/// Horizontal bar chart of file ages in days, oldest first.
///
/// # Examples
///
/// ```
/// use strata_viz::ages_bars;
///
/// let spec = ages_bars(&[]);
/// assert_eq!(spec["mark"], "bar");
/// ```
pub fn ages_bars(ages: &[FileAge]) -> Value {
    let values: Vec<Value> = ages
        .iter()
        .map(|a| json!({"path": a.path, "ageDays": a.age_days}))
        .collect();

    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "description": "Age of last change per path",
        "data": {"values": values},
        "mark": "bar",
        "encoding": {
            "x": {"field": "ageDays", "type": "quantitative", "title": "age (days)"},
            "y": {"field": "path", "type": "nominal", "sort": "-x", "title": null},
            "tooltip": [
                {"field": "path", "type": "nominal"},
                {"field": "ageDays", "type": "quantitative", "format": ".1f"},
            ],
        },
        "width": 640,
    })
}

/// Heatmap of directed coupling ratios between paths.
///
/// The color scale is pinned to [0, 1] so charts from different
/// repositories compare directly.
///
/// # Examples
///
/// ```
/// use strata_viz::coupling_heatmap;
///
/// let spec = coupling_heatmap(&[]);
/// assert_eq!(spec["mark"], "rect");
/// assert_eq!(spec["encoding"]["color"]["scale"]["domain"][1], 1.0);
/// ```
pub fn coupling_heatmap(pairs: &[CoChange]) -> Value {
    let values: Vec<Value> = pairs
        .iter()
        .map(|p| {
            json!({
                "primary": p.primary,
                "dependency": p.dependency,
                "coupling": p.coupling,
                "cochanges": p.cochanges,
            })
        })
        .collect();

    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "description": "Co-change coupling between paths",
        "data": {"values": values},
        "mark": "rect",
        "encoding": {
            "x": {"field": "primary", "type": "nominal", "title": "primary"},
            "y": {"field": "dependency", "type": "nominal", "title": "dependency"},
            "color": {
                "field": "coupling",
                "type": "quantitative",
                "scale": {"domain": [0.0, 1.0], "scheme": "reds"},
            },
            "tooltip": [
                {"field": "primary", "type": "nominal"},
                {"field": "dependency", "type": "nominal"},
                {"field": "coupling", "type": "quantitative", "format": ".2f"},
                {"field": "cochanges", "type": "quantitative"},
            ],
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_spot() -> HotSpot {
        HotSpot {
            language: "Rust".into(),
            path: "src/main.rs".into(),
            blank: 5,
            comment: 10,
            lines: 200,
            changes: 12,
            complexity_score: 1.0,
            changes_score: 1.0,
            score: 2.0,
        }
    }

    #[test]
    fn scatter_embeds_rows_as_inline_data() {
        let spec = hotspot_scatter(&[sample_spot()]);
        assert_eq!(spec["$schema"], VEGA_LITE_SCHEMA);
        let values = spec["data"]["values"].as_array().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["path"], "src/main.rs");
        assert_eq!(values[0]["lines"], 200);
    }

    #[test]
    fn scatter_encodes_size_as_score() {
        let spec = hotspot_scatter(&[sample_spot()]);
        assert_eq!(spec["encoding"]["size"]["field"], "score");
        assert_eq!(spec["encoding"]["x"]["field"], "lines");
        assert_eq!(spec["encoding"]["y"]["field"], "changes");
    }

    #[test]
    fn bars_sort_oldest_first() {
        let spec = ages_bars(&[]);
        assert_eq!(spec["encoding"]["y"]["sort"], "-x");
    }

    #[test]
    fn heatmap_color_domain_is_unit_interval() {
        let spec = coupling_heatmap(&[]);
        let domain = &spec["encoding"]["color"]["scale"]["domain"];
        assert_eq!(domain[0], 0.0);
        assert_eq!(domain[1], 1.0);
    }

    #[test]
    fn specs_serialize_to_json_strings() {
        let text = serde_json::to_string(&hotspot_scatter(&[sample_spot()])).unwrap();
        assert!(text.contains("vega-lite"));
    }
}
