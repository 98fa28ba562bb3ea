use crate::graph::interaction::{GraphView, LinkStyle, NodeStyle, Tooltip};
use crate::graph::layout::{Dimensions, Point};
use crate::style::{TypeConfig, TypeConfigProvider};
use crate::types::{EntryRef, EntryVariant, LinkId, LinkKind};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Characters of entry text kept on each exported node.
const NODE_EXCERPT_CHARS: usize = 80;

/// Everything a client needs to draw the current state of a graph view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphExport {
    pub dimensions: Dimensions,
    pub center: Point,
    pub radius: f64,
    pub hovered: Option<EntryRef>,
    pub nodes: Vec<ExportedNode>,
    pub curves: Vec<ExportedCurve>,
    pub skipped_links: usize,
    pub tooltip: Option<Tooltip>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportedNode {
    pub entry: EntryRef,
    pub index: usize,
    pub position: Point,
    pub links_count: usize,
    pub excerpt: String,
    pub location: Option<String>,
    pub style: NodeStyle,
    pub config: TypeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportedCurve {
    pub link_id: LinkId,
    pub kind: LinkKind,
    pub source: EntryRef,
    pub target: EntryRef,
    pub path: String,
    pub color: String,
    pub style: LinkStyle,
}

impl GraphView {
    pub fn export<P: TypeConfigProvider + ?Sized>(&self, styles: &P) -> GraphExport {
        let scene = self.scene();

        let nodes = scene
            .nodes
            .iter()
            .map(|node| ExportedNode {
                entry: node.entry_ref(),
                index: node.index,
                position: node.position,
                links_count: node.links_count,
                excerpt: node.entry.excerpt(NODE_EXCERPT_CHARS),
                location: node.entry.location().map(str::to_string),
                style: self.node_style(node),
                config: styles.type_config(node.entry.variant()),
            })
            .collect();

        let curves = scene
            .curves
            .iter()
            .map(|curve| ExportedCurve {
                link_id: curve.link.id,
                kind: curve.link.kind,
                source: curve.link.source(),
                target: curve.link.target(),
                path: curve.path(),
                color: styles.type_config(curve.link.source_variant).color,
                style: self.link_style(curve),
            })
            .collect();

        GraphExport {
            dimensions: scene.dimensions,
            center: scene.center,
            radius: scene.radius,
            hovered: self.hovered(),
            nodes,
            curves,
            skipped_links: scene.skipped_links,
            tooltip: self.tooltip(styles),
        }
    }
}

/// Render the view as a standalone SVG document.
pub fn render_svg<P: TypeConfigProvider + ?Sized>(view: &GraphView, styles: &P) -> String {
    let export = view.export(styles);
    let Dimensions { width, height } = export.dimensions;
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="carnet-graph" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#,
        w = width,
        h = height
    );

    out.push_str("  <defs>\n");
    out.push_str(
        r#"    <filter id="glow" x="-50%" y="-50%" width="200%" height="200%"><feGaussianBlur stdDeviation="4" result="blur"/><feMerge><feMergeNode in="blur"/><feMergeNode in="SourceGraphic"/></feMerge></filter>"#,
    );
    out.push('\n');
    for variant in EntryVariant::ALL {
        let config = styles.type_config(variant);
        let _ = writeln!(
            out,
            r#"    <radialGradient id="grad-{}"><stop offset="0%" stop-color="{}"/><stop offset="100%" stop-color="{}"/></radialGradient>"#,
            variant,
            escape_xml(&config.gradient.0),
            escape_xml(&config.gradient.1)
        );
    }
    out.push_str("  </defs>\n");

    out.push_str("  <g class=\"links\">\n");
    for curve in &export.curves {
        let _ = writeln!(
            out,
            r#"    <path class="link{}" d="{}" fill="none" stroke="{}" stroke-opacity="{}" stroke-width="{}" data-link="{}" data-kind="{}"/>"#,
            if curve.style.highlighted { " active" } else { "" },
            curve.path,
            escape_xml(&curve.color),
            curve.style.opacity,
            curve.style.stroke_width,
            curve.link_id,
            curve.kind
        );
    }
    out.push_str("  </g>\n");

    out.push_str("  <g class=\"nodes\">\n");
    for node in &export.nodes {
        let _ = writeln!(
            out,
            r#"    <g class="node" data-entry="{}"><circle cx="{:.2}" cy="{:.2}" r="{}" fill="url(#grad-{})" stroke="{}" stroke-width="2"{}/><text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="central">{}</text></g>"#,
            node.entry,
            node.position.x,
            node.position.y,
            node.style.radius,
            node.entry.variant,
            escape_xml(&node.config.color),
            if node.style.glow { r#" filter="url(#glow)""# } else { "" },
            node.position.x,
            node.position.y,
            escape_xml(&node.config.icon)
        );
    }
    out.push_str("  </g>\n");

    if let Some(tooltip) = &export.tooltip {
        render_tooltip(&mut out, tooltip);
    }

    out.push_str("</svg>\n");
    out
}

fn render_tooltip(out: &mut String, tooltip: &Tooltip) {
    const BOX_WIDTH: f64 = 220.0;
    const LINE_HEIGHT: f64 = 16.0;

    let lines: Vec<&str> = std::iter::once(tooltip.label.as_str())
        .chain(std::iter::once(tooltip.excerpt.as_str()))
        .chain(tooltip.location.as_deref())
        .collect();
    let x = tooltip.anchor.x - BOX_WIDTH / 2.0;
    let y = tooltip.anchor.y;

    let _ = writeln!(
        out,
        r#"  <g class="tooltip" data-entry="{}"><rect x="{:.2}" y="{:.2}" width="{}" height="{}" rx="6" fill="rgba(0,0,0,0.85)"/>"#,
        tooltip.entry,
        x,
        y,
        BOX_WIDTH,
        LINE_HEIGHT * lines.len() as f64 + 12.0
    );
    for (i, line) in lines.iter().enumerate() {
        let _ = writeln!(
            out,
            r##"    <text x="{:.2}" y="{:.2}" fill="#fff" font-size="12" text-anchor="middle">{}</text>"##,
            tooltip.anchor.x,
            y + 6.0 + LINE_HEIGHT * (i as f64 + 0.75),
            escape_xml(line)
        );
    }
    out.push_str("  </g>\n");
}

fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
