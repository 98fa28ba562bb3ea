//! Circular relationship graph: entries evenly spaced on a circle, one
//! curve per link routed through the centre, hover and click handling, and
//! SVG output.

mod interaction;
mod layout;
mod render;
mod viewport;

pub use interaction::{
    ClickHandler, GraphView, LinkStyle, NodeStyle, Tooltip, ACTIVE_LINK_OPACITY,
    ACTIVE_STROKE_WIDTH, BASE_NODE_RADIUS, HOVER_NODE_RADIUS, IDLE_LINK_OPACITY,
    IDLE_STROKE_WIDTH, LINKED_NODE_RADIUS, TOOLTIP_OFFSET,
};
pub use layout::{
    node_angle, Dimensions, GraphEntry, GraphNode, GraphScene, LinkCurve, Point, CIRCLE_RATIO,
    MAX_HEIGHT, MAX_WIDTH,
};
pub use render::{render_svg, ExportedCurve, ExportedNode, GraphExport};
pub use viewport::{Subscription, Viewport};
