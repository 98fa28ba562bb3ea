use crate::accessor::count_links_for_entry;
use crate::types::{Entry, EntryRef, SpiritualLink};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;

/// Largest drawing area, whatever the container measures.
pub const MAX_WIDTH: f64 = 1200.0;
pub const MAX_HEIGHT: f64 = 700.0;

/// Circle radius as a fraction of the smaller dimension.
pub const CIRCLE_RATIO: f64 = 0.35;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    /// Drawing area for a measured container, capped at 1200×700.
    /// Non-finite or negative measurements count as zero.
    pub fn measured(width: f64, height: f64) -> Self {
        let clean = |v: f64, max: f64| if v.is_finite() { v.clamp(0.0, max) } else { 0.0 };
        Self {
            width: clean(width, MAX_WIDTH),
            height: clean(height, MAX_HEIGHT),
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.width / 2.0,
            y: self.height / 2.0,
        }
    }

    pub fn circle_radius(&self) -> f64 {
        self.width.min(self.height) * CIRCLE_RATIO
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: MAX_WIDTH,
            height: MAX_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// An entry handed to the graph, with its link count when the host already
/// computed it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphEntry {
    pub entry: Entry,
    pub links_count: Option<usize>,
}

impl From<Entry> for GraphEntry {
    fn from(entry: Entry) -> Self {
        Self {
            entry,
            links_count: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub entry: Entry,
    pub index: usize,
    /// Radians; node 0 sits at -π/2 (top) and indices run clockwise.
    pub angle: f64,
    pub position: Point,
    pub links_count: usize,
}

impl GraphNode {
    pub fn entry_ref(&self) -> EntryRef {
        self.entry.entry_ref()
    }

    pub fn has_links(&self) -> bool {
        self.links_count > 0
    }
}

/// Quadratic Bézier from the source node to the target node with the
/// diagram centre as control point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkCurve {
    pub link: SpiritualLink,
    pub source_index: usize,
    pub target_index: usize,
    pub from: Point,
    pub control: Point,
    pub to: Point,
}

impl LinkCurve {
    /// SVG path data. A self-link gives a zero-length chord that still goes
    /// through the centre.
    pub fn path(&self) -> String {
        format!(
            "M {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}",
            self.from.x, self.from.y, self.control.x, self.control.y, self.to.x, self.to.y
        )
    }

    pub fn touches(&self, node_index: usize) -> bool {
        self.source_index == node_index || self.target_index == node_index
    }
}

/// Laid-out graph: a pure function of the entries, the links and the
/// drawing area.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphScene {
    pub dimensions: Dimensions,
    pub center: Point,
    pub radius: f64,
    pub nodes: Vec<GraphNode>,
    pub curves: Vec<LinkCurve>,
    /// Links left out because an endpoint is not among the entries.
    pub skipped_links: usize,
}

impl GraphScene {
    pub fn layout(entries: &[GraphEntry], links: &[SpiritualLink], dimensions: Dimensions) -> Self {
        let center = dimensions.center();
        let radius = dimensions.circle_radius();
        let total = entries.len();

        let nodes: Vec<GraphNode> = entries
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let angle = node_angle(index, total);
                GraphNode {
                    entry: item.entry.clone(),
                    index,
                    angle,
                    position: Point {
                        x: center.x + radius * angle.cos(),
                        y: center.y + radius * angle.sin(),
                    },
                    links_count: item
                        .links_count
                        .unwrap_or_else(|| count_links_for_entry(item.entry.id, links)),
                }
            })
            .collect();

        // First occurrence wins if an entry is listed twice
        let mut index_of: HashMap<EntryRef, usize> = HashMap::with_capacity(nodes.len());
        for node in &nodes {
            index_of.entry(node.entry_ref()).or_insert(node.index);
        }

        let mut curves = Vec::new();
        let mut skipped_links = 0;
        for link in links {
            let (Some(&source_index), Some(&target_index)) =
                (index_of.get(&link.source()), index_of.get(&link.target()))
            else {
                skipped_links += 1;
                continue;
            };
            curves.push(LinkCurve {
                link: link.clone(),
                source_index,
                target_index,
                from: nodes[source_index].position,
                control: center,
                to: nodes[target_index].position,
            });
        }

        if skipped_links > 0 {
            log::debug!(
                "Graph layout skipped {} of {} links with endpoints outside the entry set",
                skipped_links,
                links.len()
            );
        }

        GraphScene {
            dimensions,
            center,
            radius,
            nodes,
            curves,
            skipped_links,
        }
    }

    pub fn node(&self, entry: EntryRef) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.entry_ref() == entry)
    }
}

/// Angle of node `index` out of `total`, evenly spaced from the top.
pub fn node_angle(index: usize, total: usize) -> f64 {
    if total == 0 {
        return -PI / 2.0;
    }
    (index as f64 / total as f64) * 2.0 * PI - PI / 2.0
}
