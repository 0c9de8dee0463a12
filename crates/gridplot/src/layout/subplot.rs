//! Subplots and their construction from resolved cameras and controllers

use crate::core::camera::CameraHandle;
use crate::core::controller::ControllerHandle;
use crate::core::graphic::{BoundingBox, Graphic, GraphicKind};
use crate::core::surface::{RenderSurface, Renderer, Viewport};
use crate::error::Result;
use crate::layout::grid::{GridShape, GridSpec, Matrix};
use std::fmt;
use std::rc::Rc;

/// One cell of a figure
///
/// Camera and controller are shared handles: subplots in the same controller
/// group hold the same controller, and a camera passed for several cells is
/// held by each of them.
pub struct Subplot {
    position: (usize, usize),
    grid: GridShape,
    name: Option<String>,
    camera: CameraHandle,
    controller: ControllerHandle,
    canvas: Rc<dyn RenderSurface>,
    renderer: Rc<dyn Renderer>,
    graphics: Vec<Graphic>,
    /// RGBA clear color of the viewport
    pub background: [u8; 4],
}

impl Subplot {
    pub fn position(&self) -> (usize, usize) {
        self.position
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn camera(&self) -> &CameraHandle {
        &self.camera
    }

    pub fn controller(&self) -> &ControllerHandle {
        &self.controller
    }

    pub fn canvas(&self) -> &Rc<dyn RenderSurface> {
        &self.canvas
    }

    pub fn renderer(&self) -> &Rc<dyn Renderer> {
        &self.renderer
    }

    pub fn graphics(&self) -> &[Graphic] {
        &self.graphics
    }

    pub fn add_graphic(&mut self, graphic: Graphic) {
        self.graphics.push(graphic);
    }

    /// Remove every graphic with the given name, returning how many were removed
    pub fn remove_graphic(&mut self, name: &str) -> usize {
        let before = self.graphics.len();
        self.graphics.retain(|g| g.name.as_deref() != Some(name));
        before - self.graphics.len()
    }

    pub fn clear(&mut self) {
        self.graphics.clear();
    }

    pub fn contains_image(&self) -> bool {
        self.graphics.iter().any(|g| g.kind == GraphicKind::Image)
    }

    /// Union of all graphic bounds; empty when there are no graphics
    pub fn bounds(&self) -> BoundingBox {
        let mut bounds = BoundingBox::default();
        for graphic in &self.graphics {
            bounds.expand_by_box(&graphic.bounds);
        }
        bounds
    }

    /// Pixel rect of this cell within the canvas.
    ///
    /// Cells split the canvas evenly; the last row and column absorb the
    /// remainder of the integer division.
    pub fn viewport_rect(&self) -> Viewport {
        let (width, height) = self.canvas.logical_size();
        let (row, col) = self.position;
        let (x0, x1) = split(width, col, self.grid.cols());
        let (y0, y1) = split(height, row, self.grid.rows());
        Viewport {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Queue this subplot with the renderer
    pub fn render(&self) {
        let camera = self.camera.borrow();
        self.renderer
            .render(self.viewport_rect(), &camera, self.background);
    }
}

fn split(extent: u32, index: usize, count: usize) -> (u32, u32) {
    let at = |i: usize| (extent as u64 * i as u64 / count.max(1) as u64) as u32;
    (at(index), at(index + 1))
}

impl fmt::Debug for Subplot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subplot")
            .field("position", &self.position)
            .field("name", &self.name)
            .field("camera", &self.camera)
            .field("controller", &self.controller)
            .field("graphics", &self.graphics.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Subplot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (row, col) = self.position;
        match &self.name {
            Some(name) => write!(f, "subplot ({row}, {col}) `{name}`")?,
            None => write!(f, "subplot ({row}, {col})")?,
        }
        write!(
            f,
            ": {} controller, {} graphic(s)",
            self.controller.kind(),
            self.graphics.len()
        )
    }
}

/// Assemble one subplot per cell in row-major order.
///
/// Cameras and controllers are moved in as handles, never copied.
pub fn create_subplots(
    grid: &GridSpec,
    cameras: Matrix<CameraHandle>,
    controllers: Matrix<ControllerHandle>,
    canvas: &Rc<dyn RenderSurface>,
    renderer: &Rc<dyn Renderer>,
) -> Result<Matrix<Subplot>> {
    let shape = grid.shape();
    let subplots = shape
        .positions()
        .zip(cameras.into_vec())
        .zip(controllers.into_vec())
        .map(|((position, camera), controller)| Subplot {
            position,
            grid: shape,
            name: grid.name_at(position).map(str::to_string),
            camera,
            controller,
            canvas: Rc::clone(canvas),
            renderer: Rc::clone(renderer),
            graphics: Vec::new(),
            background: [0, 0, 0, 255],
        })
        .collect();
    Matrix::from_vec(shape, subplots, "subplots")
}
