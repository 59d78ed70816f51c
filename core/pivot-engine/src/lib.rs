//! FILENAME: core/pivot-engine/src/lib.rs
//! Result-to-visualization pipeline.
//!
//! This crate turns a typed query result into everything needed to render it
//! as a table, a pivot or a chart, and maps clicks back to drilldown requests.
//!
//! Layers:
//! - `definition`: Serializable options (how a run is configured)
//! - `axis`: Category, legend and value axis selection
//! - `table`: The flat, filtered, sorted row set
//! - `cache`: Interned axis values (HOW distinct values are tracked)
//! - `engine`: Pivot calculation (generic, calendar, multi-series)
//! - `view`: Renderable pivot output (WHAT we display)
//! - `drilldown`: Clicked cell -> group-by request
//! - `display`: Supported display kinds
//! - `pipeline`: The end-to-end transform

pub mod definition;
pub mod error;
pub mod axis;
pub mod table;
pub mod cache;
pub mod view;
pub mod engine;
pub mod drilldown;
pub mod display;
pub mod pipeline;

pub use definition::*;
pub use error::{DrilldownError, PivotError};
pub use axis::{apply_swap_heuristic, select_axes, select_secondary_value_axis, AxisHints};
pub use table::{assemble_table, FlatTable};
pub use cache::{distinct_count, DistinctValues};
pub use view::*;
pub use engine::{build_pivot, calendar_shape, supports_pivot, PivotCalculator};
pub use drilldown::{
    drilldown, DrilldownRequest, DrilldownResolution, DrilldownTarget, GroupBy, RowCondition, RowPredicate,
};
pub use display::{recommend_display_kind, supported_display_kinds, DisplayKind};
pub use pipeline::{transform, TransformOutcome, Visualization};

pub use result_model::AxisConfig;
