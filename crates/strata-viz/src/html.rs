//! Self-contained HTML pages embedding chart specs.

use serde_json::Value;

/// Wrap chart specs in an HTML page that renders them with vega-embed.
///
/// Each `(title, spec)` pair becomes a section; the page pulls the vega
/// runtime from a CDN, so it needs a network connection when opened but
/// no local toolchain.
///
/// # Examples
///
/// ```
/// use strata_viz::{hotspot_scatter, render_page};
///
/// let page = render_page("acme metrics", &[("Hot spots".into(), hotspot_scatter(&[]))]);
/// assert!(page.contains("vegaEmbed"));
/// assert!(page.contains("Hot spots"));
/// ```
pub fn render_page(title: &str, charts: &[(String, Value)]) -> String {
    let mut sections = String::new();
    let mut embeds = String::new();
    for (index, (name, spec)) in charts.iter().enumerate() {
        sections.push_str(&format!(
            "  <section>\n    <h2>{}</h2>\n    <div id=\"chart-{index}\"></div>\n  </section>\n",
            escape(name),
        ));
        embeds.push_str(&format!(
            "    vegaEmbed('#chart-{index}', {});\n",
            spec,
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <script src="https://cdn.jsdelivr.net/npm/vega@5"></script>
  <script src="https://cdn.jsdelivr.net/npm/vega-lite@5"></script>
  <script src="https://cdn.jsdelivr.net/npm/vega-embed@6"></script>
  <style>
    body {{ font-family: sans-serif; margin: 2rem; }}
    section {{ margin-bottom: 3rem; }}
  </style>
</head>
<body>
  <h1>{title}</h1>
{sections}  <script>
{embeds}  </script>
</body>
</html>
"#,
        title = escape(title),
        sections = sections,
        embeds = embeds,
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::hotspot_scatter;

    #[test]
    fn page_contains_one_div_per_chart() {
        let charts = vec![
            ("A".to_string(), hotspot_scatter(&[])),
            ("B".to_string(), hotspot_scatter(&[])),
        ];
        let page = render_page("metrics", &charts);
        assert!(page.contains("chart-0"));
        assert!(page.contains("chart-1"));
        assert_eq!(page.matches("vegaEmbed(").count(), 2);
    }

    #[test]
    fn titles_are_html_escaped() {
        let page = render_page("a < b & c", &[]);
        assert!(page.contains("a &lt; b &amp; c"));
        assert!(!page.contains("a < b & c"));
    }

    #[test]
    fn page_is_complete_html() {
        let page = render_page("t", &[]);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.trim_end().ends_with("</html>"));
    }
}
