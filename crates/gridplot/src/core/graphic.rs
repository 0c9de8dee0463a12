//! Graphics held by a subplot
//!
//! Only what the layout needs is modelled: the kind of graphic, an optional
//! name and its data bounds. Building GPU geometry is left to the renderer.

use glam::Vec3;
use std::fmt;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Vec3]) -> Self {
        points.iter().fold(Self::default(), |mut bounds, point| {
            bounds.expand(*point);
            bounds
        })
    }

    /// True until at least one point has been added
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn expand_by_box(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphicKind {
    Line,
    /// Image data; subplots showing one flip their camera's y axis
    Image,
    LineCollection,
}

impl fmt::Display for GraphicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GraphicKind::Line => "line",
            GraphicKind::Image => "image",
            GraphicKind::LineCollection => "line collection",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Graphic {
    pub kind: GraphicKind,
    pub name: Option<String>,
    pub bounds: BoundingBox,
}

impl Graphic {
    pub fn new(kind: GraphicKind, bounds: BoundingBox) -> Self {
        Self {
            kind,
            name: None,
            bounds,
        }
    }

    pub fn line(points: &[Vec3]) -> Self {
        Self::new(GraphicKind::Line, BoundingBox::from_points(points))
    }

    /// Image covering `[0, width] x [0, height]` in data space
    pub fn image(width: u32, height: u32) -> Self {
        Self::new(
            GraphicKind::Image,
            BoundingBox::new(Vec3::ZERO, Vec3::new(width as f32, height as f32, 0.0)),
        )
    }

    pub fn line_collection(lines: &[Vec<Vec3>]) -> Self {
        let mut bounds = BoundingBox::default();
        for line in lines {
            bounds.expand_by_box(&BoundingBox::from_points(line));
        }
        Self::new(GraphicKind::LineCollection, bounds)
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }
}
