//! Declarative chart output.
//!
//! Builds Vega-Lite specifications — marks, encodings, scales — from
//! report rows, and wraps them in a self-contained HTML page for
//! inspection in a browser. No rendering happens here; the specs are
//! plain JSON documents.

pub mod html;
pub mod spec;

pub use html::render_page;
pub use spec::{ages_bars, coupling_heatmap, hotspot_scatter, VEGA_LITE_SCHEMA};
