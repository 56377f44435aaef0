//! Retained scene graph with keyed joins.
//!
//! Renderers describe each layer as a list of `(key, Element)` pairs and call
//! [`Scene::join`]. Elements whose key already exists in the layer are
//! updated in place and keep their [`NodeId`]; new keys enter with a fresh
//! id; keys that disappeared exit. Back ends (SVG, terminal raster) only
//! read the scene, and hit testing goes through [`Scene::pick`].

mod spatial;
pub mod svg;

use crate::color::Rgb;
use glam::DVec2;
use spatial::PickGrid;
use std::collections::{BTreeMap, HashMap};

/// Pick-grid cell size in pixels
const PICK_CELL: f64 = 32.0;

/// Layers in paint order (back to front)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerId {
    Countries,
    Symbols,
    Labels,
    LegendSwatch,
    LegendLabels,
    LegendSymbols,
}

impl LayerId {
    pub const PAINT_ORDER: [LayerId; 6] = [
        LayerId::Countries,
        LayerId::Symbols,
        LayerId::Labels,
        LayerId::LegendSwatch,
        LayerId::LegendLabels,
        LayerId::LegendSymbols,
    ];

    pub fn class(self) -> &'static str {
        match self {
            LayerId::Countries => "country",
            LayerId::Symbols => "geo-symbol",
            LayerId::Labels => "geo-label",
            LayerId::LegendSwatch => "legend",
            LayerId::LegendLabels => "legend-label",
            LayerId::LegendSymbols => "legend-symbol",
        }
    }
}

/// Stable identity of a scene node across joins
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

/// The datum an interactive element is bound to (index into the engine's data)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Country(usize),
    City(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Fill {
    None,
    Solid(Rgb),
    /// Reference to a pattern in [`Defs::patterns`]
    Pattern(String),
    /// Reference to a gradient in [`Defs::gradients`]
    Gradient(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Closed rings in chart pixels, filled even-odd
    Path { rings: Vec<Vec<DVec2>> },
    Circle { center: DVec2, radius: f64 },
    Rect { origin: DVec2, size: DVec2 },
    Text {
        position: DVec2,
        content: String,
        anchor: TextAnchor,
        /// Baseline shift in em
        dy: f64,
    },
}

impl Shape {
    /// Axis-aligned bounds as (min, max); `None` for empty paths and text
    pub fn bounds(&self) -> Option<(DVec2, DVec2)> {
        match self {
            Shape::Path { rings } => {
                let mut points = rings.iter().flatten();
                let first = *points.next()?;
                Some(points.fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))))
            }
            Shape::Circle { center, radius } => {
                let r = DVec2::splat(*radius);
                Some((*center - r, *center + r))
            }
            Shape::Rect { origin, size } => Some((*origin, *origin + *size)),
            Shape::Text { .. } => None,
        }
    }

    pub fn contains(&self, p: DVec2) -> bool {
        match self {
            Shape::Path { rings } => rings.iter().filter(|r| ring_crosses(r, p)).count() % 2 == 1,
            Shape::Circle { center, radius } => center.distance_squared(p) <= radius * radius,
            Shape::Rect { origin, size } => {
                p.x >= origin.x && p.y >= origin.y && p.x <= origin.x + size.x && p.y <= origin.y + size.y
            }
            Shape::Text { .. } => false,
        }
    }
}

/// Even-odd ray cast: does a ray from `p` to +x cross this ring an odd number of times
fn ring_crosses(ring: &[DVec2], p: DVec2) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub shape: Shape,
    pub fill: Fill,
    pub opacity: f64,
    /// Set for elements that receive pointer events
    pub target: Option<Target>,
}

impl Element {
    pub fn new(shape: Shape, fill: Fill) -> Self {
        Self {
            shape,
            fill,
            opacity: 1.0,
            target: None,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub key: usize,
    pub element: Element,
}

/// Outcome of one join
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
}

/// Diagonal stripes over a flat background
#[derive(Clone, Debug, PartialEq)]
pub struct Hatch {
    pub background: Rgb,
    pub stripe: Rgb,
    /// Distance between stripe starts in pixels
    pub spacing: f64,
    pub stripe_width: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GradientStop {
    /// Percent along the gradient, 0..=100
    pub offset: f64,
    pub color: Rgb,
}

/// Shared paint servers referenced by [`Fill::Pattern`] / [`Fill::Gradient`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Defs {
    pub patterns: BTreeMap<String, Hatch>,
    pub gradients: BTreeMap<String, Vec<GradientStop>>,
}

#[derive(Debug)]
pub struct Scene {
    /// Root element id
    pub id: String,
    /// Full container size
    pub width: f64,
    pub height: f64,
    /// Offset of the chart group inside the container (the margins)
    pub origin: DVec2,
    pub defs: Defs,
    layers: BTreeMap<LayerId, Vec<Node>>,
    next_id: u64,
    pick: PickGrid,
}

impl Scene {
    pub fn new(id: impl Into<String>, width: f64, height: f64, origin: DVec2) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            origin,
            defs: Defs::default(),
            layers: BTreeMap::new(),
            next_id: 0,
            pick: PickGrid::new(PICK_CELL, (DVec2::ZERO, DVec2::ZERO)),
        }
    }

    /// Reconcile `layer` with `data` by key. Node order follows `data`.
    pub fn join<I>(&mut self, layer: LayerId, data: I) -> JoinStats
    where
        I: IntoIterator<Item = (usize, Element)>,
    {
        let old = self.layers.remove(&layer).unwrap_or_default();
        let mut existing: HashMap<usize, NodeId> = old.iter().map(|n| (n.key, n.id)).collect();

        let mut stats = JoinStats::default();
        let mut nodes = Vec::new();
        for (key, element) in data {
            let id = match existing.remove(&key) {
                Some(id) => {
                    stats.updated += 1;
                    id
                }
                None => {
                    stats.entered += 1;
                    self.fresh_id()
                }
            };
            nodes.push(Node { id, key, element });
        }
        stats.exited = existing.len();

        self.layers.insert(layer, nodes);
        self.rebuild_pick_index();
        stats
    }

    fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn nodes(&self, layer: LayerId) -> &[Node] {
        self.layers.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nodes of every layer in paint order
    pub fn painted(&self) -> impl Iterator<Item = (LayerId, &Node)> {
        LayerId::PAINT_ORDER
            .into_iter()
            .flat_map(move |layer| self.nodes(layer).iter().map(move |n| (layer, n)))
    }

    pub fn node_count(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    /// Move the chart group (margins changed)
    pub fn set_origin(&mut self, origin: DVec2) {
        self.origin = origin;
        self.rebuild_pick_index();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.rebuild_pick_index();
    }

    /// The container box in chart coordinates
    fn chart_area(&self) -> (DVec2, DVec2) {
        (-self.origin, DVec2::new(self.width, self.height) - self.origin)
    }

    fn rebuild_pick_index(&mut self) {
        let mut grid = PickGrid::new(PICK_CELL, self.chart_area());
        for layer in LayerId::PAINT_ORDER {
            for (pos, node) in self.nodes(layer).iter().enumerate() {
                if node.element.target.is_none() {
                    continue;
                }
                if let Some(bounds) = node.element.shape.bounds() {
                    grid.insert(bounds, (layer, pos));
                }
            }
        }
        self.pick = grid;
    }

    /// Topmost interactive element under a container-space point
    pub fn pick(&self, page: DVec2) -> Option<Target> {
        let p = page - self.origin;
        let mut best: Option<(usize, usize, Target)> = None;
        for (layer, pos) in self.pick.query(p) {
            let Some(node) = self.nodes(layer).get(pos) else {
                continue;
            };
            let (Some(target), true) = (node.element.target, node.element.shape.contains(p)) else {
                continue;
            };
            let order = LayerId::PAINT_ORDER.iter().position(|l| *l == layer).unwrap_or(0);
            if best.map_or(true, |(o, q, _)| (order, pos) > (o, q)) {
                best = Some((order, pos, target));
            }
        }
        best.map(|(_, _, target)| target)
    }
}
