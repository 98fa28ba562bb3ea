use crate::graph::layout::{Dimensions, GraphEntry, GraphNode, GraphScene, LinkCurve, Point};
use crate::style::TypeConfigProvider;
use crate::types::{Entry, EntryRef, SpiritualLink};
use serde::{Deserialize, Serialize};

pub const BASE_NODE_RADIUS: f64 = 25.0;
pub const LINKED_NODE_RADIUS: f64 = 30.0;
pub const HOVER_NODE_RADIUS: f64 = 35.0;

pub const IDLE_LINK_OPACITY: f64 = 0.4;
pub const ACTIVE_LINK_OPACITY: f64 = 0.8;
pub const IDLE_STROKE_WIDTH: f64 = 2.0;
pub const ACTIVE_STROKE_WIDTH: f64 = 3.0;

/// Gap between the hovered node's edge and the tooltip.
pub const TOOLTIP_OFFSET: f64 = 15.0;
pub const TOOLTIP_EXCERPT_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NodeStyle {
    pub radius: f64,
    pub glow: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LinkStyle {
    pub opacity: f64,
    pub stroke_width: f64,
    pub highlighted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tooltip {
    pub entry: EntryRef,
    pub label: String,
    pub excerpt: String,
    pub location: Option<String>,
    /// Top-centre of the tooltip box, just below the hovered node.
    pub anchor: Point,
}

pub type ClickHandler = Box<dyn FnMut(&Entry) + Send>;

/// A laid-out graph plus its pointer state. At most one node is hovered;
/// clicking hands the entry to the host and changes nothing else.
pub struct GraphView {
    entries: Vec<GraphEntry>,
    links: Vec<SpiritualLink>,
    scene: GraphScene,
    hovered: Option<EntryRef>,
    on_entry_click: Option<ClickHandler>,
}

impl GraphView {
    pub fn new(
        entries: Vec<GraphEntry>,
        links: Vec<SpiritualLink>,
        dimensions: Dimensions,
    ) -> Self {
        let scene = GraphScene::layout(&entries, &links, dimensions);
        Self {
            entries,
            links,
            scene,
            hovered: None,
            on_entry_click: None,
        }
    }

    pub fn with_click_handler(mut self, handler: impl FnMut(&Entry) + Send + 'static) -> Self {
        self.on_entry_click = Some(Box::new(handler));
        self
    }

    pub fn scene(&self) -> &GraphScene {
        &self.scene
    }

    pub fn hovered(&self) -> Option<EntryRef> {
        self.hovered
    }

    /// Re-run the layout for a new drawing area. Hover state survives.
    pub fn resize(&mut self, dimensions: Dimensions) {
        if dimensions == self.scene.dimensions {
            return;
        }
        self.scene = GraphScene::layout(&self.entries, &self.links, dimensions);
    }

    /// Swap in freshly loaded data. A hovered node that disappeared is
    /// dropped back to idle.
    pub fn set_data(&mut self, entries: Vec<GraphEntry>, links: Vec<SpiritualLink>) {
        self.entries = entries;
        self.links = links;
        self.scene = GraphScene::layout(&self.entries, &self.links, self.scene.dimensions);
        if let Some(hovered) = self.hovered {
            if self.scene.node(hovered).is_none() {
                self.hovered = None;
            }
        }
    }

    /// Pointer entered a node. Unknown entries are ignored.
    pub fn pointer_enter(&mut self, entry: EntryRef) -> bool {
        if self.scene.node(entry).is_none() {
            return false;
        }
        self.hovered = Some(entry);
        true
    }

    /// Pointer left a node; only the hovered node can end the hover.
    pub fn pointer_leave(&mut self, entry: EntryRef) {
        if self.hovered == Some(entry) {
            self.hovered = None;
        }
    }

    /// Hand the clicked entry to the host. Returns false for unknown nodes.
    pub fn click(&mut self, entry: EntryRef) -> bool {
        let Some(node) = self.scene.node(entry) else {
            return false;
        };
        if let Some(handler) = self.on_entry_click.as_mut() {
            handler(&node.entry);
        }
        true
    }

    fn hovered_index(&self) -> Option<usize> {
        self.hovered
            .and_then(|h| self.scene.node(h))
            .map(|n| n.index)
    }

    pub fn node_style(&self, node: &GraphNode) -> NodeStyle {
        if self.hovered_index() == Some(node.index) {
            return NodeStyle {
                radius: HOVER_NODE_RADIUS,
                glow: true,
            };
        }
        NodeStyle {
            radius: if node.has_links() {
                LINKED_NODE_RADIUS
            } else {
                BASE_NODE_RADIUS
            },
            glow: false,
        }
    }

    pub fn link_style(&self, curve: &LinkCurve) -> LinkStyle {
        match self.hovered_index() {
            Some(index) if curve.touches(index) => LinkStyle {
                opacity: ACTIVE_LINK_OPACITY,
                stroke_width: ACTIVE_STROKE_WIDTH,
                highlighted: true,
            },
            _ => LinkStyle {
                opacity: IDLE_LINK_OPACITY,
                stroke_width: IDLE_STROKE_WIDTH,
                highlighted: false,
            },
        }
    }

    pub fn tooltip<P: TypeConfigProvider + ?Sized>(&self, styles: &P) -> Option<Tooltip> {
        let node = self.hovered.and_then(|h| self.scene.node(h))?;
        Some(Tooltip {
            entry: node.entry_ref(),
            label: styles.type_config(node.entry.variant()).label,
            excerpt: node.entry.excerpt(TOOLTIP_EXCERPT_CHARS),
            location: node.entry.location().map(str::to_string),
            anchor: Point {
                x: node.position.x,
                y: node.position.y + HOVER_NODE_RADIUS + TOOLTIP_OFFSET,
            },
        })
    }
}
