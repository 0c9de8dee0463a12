//! Figure: a grid of subplots sharing one canvas and renderer
//!
//! [`FigureBuilder`] runs the whole resolution pipeline (grid, cameras,
//! controller groups, subplots). Once built, a [`Figure`] only looks up,
//! iterates and delegates to its subplots.

use crate::core::camera::CameraHandle;
use crate::core::controller::ControllerHandle;
use crate::core::surface::{
    CanvasBackend, OffscreenCanvas, OffscreenRenderer, RenderSurface, Renderer, Viewport,
};
use crate::error::{LayoutError, Result};
use crate::layout::cameras::{resolve_cameras, CameraSpec};
use crate::layout::controllers::{
    resolve_controllers, ControllerIds, ControllerRequest, DefaultControllerRule, FovDefaultRule,
};
use crate::layout::grid::{CellSpec, GridShape, GridSpec, Matrix};
use crate::layout::subplot::{create_subplots, Subplot};
use image::{DynamicImage, Rgb, RgbImage, RgbaImage};
use std::fmt;
use std::path::Path;
use std::rc::Rc;

/// Canvas size used when none is given
pub const DEFAULT_SIZE: (u32, u32) = (500, 300);

/// Extensions whose encoders keep the alpha channel
const ALPHA_FORMATS: &[&str] = &["png", "tiff", "tif", "gif"];

/// When an animation hook runs relative to a render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    /// Before the subplots are rendered
    Pre,
    /// After the draw request
    Post,
    Both,
}

impl AnimationPhase {
    fn includes(self, phase: AnimationPhase) -> bool {
        self == AnimationPhase::Both || self == phase
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(u64);

impl AnimationId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "animation {}", self.0)
    }
}

type AnimationFn = Box<dyn FnMut(&mut Figure)>;

struct Animation {
    id: AnimationId,
    phase: AnimationPhase,
    hook: AnimationFn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowOptions {
    /// Fit every camera to the bounds of its subplot's graphics
    pub autoscale: bool,
    /// Aspect handling while fitting; `None` uses each camera's own setting
    pub maintain_aspect: Option<bool>,
}

impl Default for ShowOptions {
    fn default() -> Self {
        Self {
            autoscale: true,
            maintain_aspect: None,
        }
    }
}

enum CanvasChoice {
    Surface(Rc<dyn RenderSurface>),
    Backend(CanvasBackend),
}

/// Builder for [`Figure`]
///
/// Every option has a default: a 1x1 grid of 2D cameras, one controller per
/// cell chosen by [`FovDefaultRule`], and an offscreen canvas of
/// [`DEFAULT_SIZE`].
pub struct FigureBuilder {
    shape: (usize, usize),
    cameras: CellSpec<CameraSpec>,
    controller_types: Option<CellSpec<String>>,
    controller_ids: ControllerIds,
    controllers: Option<CellSpec<ControllerHandle>>,
    names: Option<Vec<String>>,
    canvas: Option<CanvasChoice>,
    renderer: Option<Rc<dyn Renderer>>,
    size: (u32, u32),
    default_rule: Box<dyn DefaultControllerRule>,
}

impl Default for FigureBuilder {
    fn default() -> Self {
        Self {
            shape: (1, 1),
            cameras: CellSpec::All(CameraSpec::default()),
            controller_types: None,
            controller_ids: ControllerIds::Unique,
            controllers: None,
            names: None,
            canvas: None,
            renderer: None,
            size: DEFAULT_SIZE,
            default_rule: Box::new(FovDefaultRule),
        }
    }
}

impl FigureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(mut self, rows: usize, cols: usize) -> Self {
        self.shape = (rows, cols);
        self
    }

    pub fn cameras(mut self, cameras: CellSpec<CameraSpec>) -> Self {
        self.cameras = cameras;
        self
    }

    /// Use one camera spec for every cell
    pub fn camera(self, camera: impl Into<CameraSpec>) -> Self {
        self.cameras(CellSpec::all(camera))
    }

    pub fn controller_types(mut self, types: CellSpec<String>) -> Self {
        self.controller_types = Some(types);
        self
    }

    pub fn controller_type(self, token: impl Into<String>) -> Self {
        self.controller_types(CellSpec::all(token))
    }

    pub fn controller_ids(mut self, ids: ControllerIds) -> Self {
        self.controller_ids = ids;
        self
    }

    /// Explicit controllers; `controller_types` and `controller_ids` are then ignored
    pub fn controllers(mut self, controllers: CellSpec<ControllerHandle>) -> Self {
        self.controllers = Some(controllers);
        self
    }

    /// One controller shared by every cell
    pub fn controller(self, controller: ControllerHandle) -> Self {
        self.controllers(CellSpec::All(controller))
    }

    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn canvas(mut self, canvas: Rc<dyn RenderSurface>) -> Self {
        self.canvas = Some(CanvasChoice::Surface(canvas));
        self
    }

    pub fn canvas_backend(mut self, backend: CanvasBackend) -> Self {
        self.canvas = Some(CanvasChoice::Backend(backend));
        self
    }

    pub fn renderer(mut self, renderer: Rc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// Replace the rule deciding the controller of `default`-typed groups
    pub fn default_controller_rule(mut self, rule: impl DefaultControllerRule + 'static) -> Self {
        self.default_rule = Box::new(rule);
        self
    }

    /// Resolve every option and assemble the figure.
    ///
    /// Cameras are bound to controllers last, so a failed build leaves
    /// caller-supplied controllers untouched.
    pub fn build(self) -> Result<Figure> {
        let shape = GridShape::new(self.shape.0, self.shape.1)?;
        let grid = GridSpec::new(shape, self.names)?;

        let cameras = resolve_cameras(self.cameras, shape)?;

        let canvas = match self.canvas {
            Some(CanvasChoice::Surface(surface)) => surface,
            Some(CanvasChoice::Backend(backend)) => backend.create(self.size)?,
            None => Rc::new(OffscreenCanvas::new(self.size)),
        };
        let renderer = match self.renderer {
            Some(renderer) => renderer,
            None => Rc::new(OffscreenRenderer::for_surface(canvas.as_ref())),
        };

        let controllers = resolve_controllers(
            ControllerRequest {
                controllers: self.controllers,
                ids: self.controller_ids,
                types: self.controller_types,
                default_rule: self.default_rule.as_ref(),
            },
            &cameras,
            grid.names(),
        )?;

        let subplots = create_subplots(&grid, cameras, controllers, &canvas, &renderer)?;
        let figure = Figure {
            subplots,
            canvas,
            renderer,
            animations: Vec::new(),
            next_animation: 0,
            shown: false,
        };
        log::debug!(target: "gridplot", "built {figure}");
        Ok(figure)
    }
}

/// A `rows x cols` grid of subplots
pub struct Figure {
    subplots: Matrix<Subplot>,
    canvas: Rc<dyn RenderSurface>,
    renderer: Rc<dyn Renderer>,
    animations: Vec<Animation>,
    next_animation: u64,
    shown: bool,
}

impl Figure {
    pub fn builder() -> FigureBuilder {
        FigureBuilder::new()
    }

    pub fn shape(&self) -> GridShape {
        self.subplots.shape()
    }

    pub fn len(&self) -> usize {
        self.shape().len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn canvas(&self) -> &Rc<dyn RenderSurface> {
        &self.canvas
    }

    pub fn renderer(&self) -> &Rc<dyn Renderer> {
        &self.renderer
    }

    /// Camera of every subplot, read from the live subplots
    pub fn cameras(&self) -> Matrix<CameraHandle> {
        self.subplots.map(|s| s.camera().clone())
    }

    pub fn controllers(&self) -> Matrix<ControllerHandle> {
        self.subplots.map(|s| s.controller().clone())
    }

    pub fn names(&self) -> Matrix<Option<String>> {
        self.subplots.map(|s| s.name().map(str::to_string))
    }

    pub fn subplot(&self, position: (usize, usize)) -> Result<&Subplot> {
        let shape = self.shape();
        self.subplots
            .get(position)
            .ok_or_else(|| out_of_range(position, shape))
    }

    pub fn subplot_mut(&mut self, position: (usize, usize)) -> Result<&mut Subplot> {
        let shape = self.shape();
        self.subplots
            .get_mut(position)
            .ok_or_else(|| out_of_range(position, shape))
    }

    pub fn subplot_by_name(&self, name: &str) -> Result<&Subplot> {
        self.subplots
            .iter()
            .find(|s| s.name() == Some(name))
            .ok_or_else(|| LayoutError::NameNotFound(name.to_string()))
    }

    pub fn subplot_by_name_mut(&mut self, name: &str) -> Result<&mut Subplot> {
        self.subplots
            .iter_mut()
            .find(|s| s.name() == Some(name))
            .ok_or_else(|| LayoutError::NameNotFound(name.to_string()))
    }

    /// Subplots in row-major order
    pub fn iter(&self) -> std::slice::Iter<'_, Subplot> {
        self.subplots.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Subplot> {
        self.subplots.iter_mut()
    }

    /// Register a hook run on every [`Figure::render`].
    pub fn add_animation<F>(&mut self, phase: AnimationPhase, hook: F) -> AnimationId
    where
        F: FnMut(&mut Figure) + 'static,
    {
        let id = AnimationId(self.next_animation);
        self.next_animation += 1;
        self.animations.push(Animation {
            id,
            phase,
            hook: Box::new(hook),
        });
        id
    }

    /// Unregister a hook. A hook cannot remove itself while it is running.
    pub fn remove_animation(&mut self, id: AnimationId) -> Result<()> {
        let index = self
            .animations
            .iter()
            .position(|a| a.id == id)
            .ok_or(LayoutError::AnimationNotFound(id.get()))?;
        self.animations.remove(index);
        Ok(())
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    fn run_animations(&mut self, phase: AnimationPhase) {
        let mut animations = std::mem::take(&mut self.animations);
        for animation in animations
            .iter_mut()
            .filter(|a| a.phase.includes(phase))
        {
            (animation.hook)(self);
        }
        // Keep hooks registered while the others were running.
        animations.append(&mut self.animations);
        self.animations = animations;
    }

    /// Render one frame: pre hooks, every subplot, flush, draw request, post hooks.
    pub fn render(&mut self, draw: bool) {
        self.run_animations(AnimationPhase::Pre);
        for subplot in self.subplots.iter() {
            subplot.render();
        }
        self.renderer.flush();
        if draw {
            self.canvas.request_draw();
        }
        self.run_animations(AnimationPhase::Post);
    }

    /// Remove every graphic from every subplot
    pub fn clear(&mut self) {
        for subplot in self.subplots.iter_mut() {
            subplot.clear();
        }
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Prepare cameras and start rendering.
    ///
    /// Subplots with an image get their camera's y axis flipped, cameras are
    /// fit to their graphics when `autoscale` is set, and one frame is drawn.
    /// Calling it again does nothing.
    pub fn show(&mut self, options: ShowOptions) -> Rc<dyn RenderSurface> {
        if self.shown {
            return Rc::clone(&self.canvas);
        }

        for subplot in self.subplots.iter() {
            let bounds = subplot.bounds();
            let mut camera = subplot.camera().borrow_mut();
            if subplot.contains_image() {
                // Absolute value so a camera shared by several image subplots flips once.
                camera.scale.y = -camera.scale.y.abs();
            }
            if options.autoscale && !bounds.is_empty() {
                let maintain_aspect = options.maintain_aspect.unwrap_or(camera.maintain_aspect);
                camera.fit_bounds_with_aspect(bounds.min, bounds.max, maintain_aspect);
            }
        }

        self.render(true);
        self.shown = true;
        Rc::clone(&self.canvas)
    }

    /// Whole canvas as a viewport
    pub fn render_area(&self) -> Viewport {
        let (width, height) = self.canvas.logical_size();
        Viewport {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Last rendered frame; with `rgb` the alpha channel is blended onto black.
    pub fn export_image(&self, rgb: bool) -> DynamicImage {
        let frame = self.renderer.snapshot();
        if rgb {
            DynamicImage::ImageRgb8(composite_on_black(&frame))
        } else {
            DynamicImage::ImageRgba8(frame)
        }
    }

    /// Write the last rendered frame, choosing the encoder from the extension.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| {
                LayoutError::Export(format!("`{}` has no file extension", path.display()))
            })?;

        let keep_alpha = ALPHA_FORMATS.contains(&extension.as_str());
        let image = self.export_image(!keep_alpha);
        image
            .save(path)
            .map_err(|e| LayoutError::Export(format!("{}: {e}", path.display())))?;
        log::debug!(target: "gridplot", "exported figure to {}", path.display());
        Ok(())
    }
}

fn out_of_range((row, col): (usize, usize), shape: GridShape) -> LayoutError {
    LayoutError::PositionOutOfRange {
        row,
        col,
        rows: shape.rows(),
        cols: shape.cols(),
    }
}

fn composite_on_black(frame: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b, a] = frame.get_pixel(x, y).0;
        let blend = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

impl fmt::Debug for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Figure")
            .field("shape", &self.shape().as_tuple())
            .field("subplots", &self.subplots.as_slice())
            .field("animations", &self.animations.len())
            .field("shown", &self.shown)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.shape().as_tuple();
        let (width, height) = self.canvas.logical_size();
        write!(f, "figure ({rows}, {cols}) {width}x{height}")?;
        for subplot in self.subplots.iter() {
            write!(f, "\n  {subplot}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::Camera;
    use crate::core::controller::{Controller, ControllerKind};
    use crate::core::graphic::Graphic;
    use std::cell::Cell;

    #[test]
    fn defaults_to_a_single_panzoom_cell() {
        let figure = Figure::builder().build().unwrap();
        assert_eq!(figure.len(), 1);
        assert_eq!(figure.render_area().width, DEFAULT_SIZE.0);
        assert_eq!(figure.controllers()[(0, 0)].kind(), ControllerKind::PanZoom);
    }

    #[test]
    fn lookup_by_position_and_name() {
        let figure = Figure::builder()
            .shape(2, 2)
            .names(["a", "b", "c", "d"])
            .build()
            .unwrap();
        assert_eq!(figure.subplot((1, 0)).unwrap().name(), Some("c"));
        assert_eq!(figure.subplot_by_name("d").unwrap().position(), (1, 1));
        assert_eq!(
            figure.subplot_by_name("e").unwrap_err(),
            LayoutError::NameNotFound("e".to_string())
        );
        assert_eq!(
            figure.subplot((2, 0)).unwrap_err(),
            LayoutError::PositionOutOfRange {
                row: 2,
                col: 0,
                rows: 2,
                cols: 2
            }
        );
    }

    #[test]
    fn explicit_controller_is_shared() {
        let controller = ControllerHandle::new(Controller::new(ControllerKind::Orbit));
        let figure = Figure::builder()
            .shape(1, 3)
            .camera("3d")
            .controller(controller.clone())
            .controller_type("panzoom")
            .build()
            .unwrap();
        assert!(figure.controllers().iter().all(|c| c.ptr_eq(&controller)));
        assert_eq!(controller.camera_count(), 3);
    }

    #[test]
    fn animations_run_around_render() {
        let mut figure = Figure::builder().build().unwrap();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let id = figure.add_animation(AnimationPhase::Both, move |_| {
            counter.set(counter.get() + 1)
        });

        figure.render(false);
        assert_eq!(calls.get(), 2);

        figure.remove_animation(id).unwrap();
        figure.render(false);
        assert_eq!(calls.get(), 2);
        assert_eq!(
            figure.remove_animation(id),
            Err(LayoutError::AnimationNotFound(id.get()))
        );
    }

    #[test]
    fn hooks_can_register_more_hooks() {
        let mut figure = Figure::builder().build().unwrap();
        figure.add_animation(AnimationPhase::Pre, |figure| {
            if figure.animation_count() == 0 {
                figure.add_animation(AnimationPhase::Post, |_| {});
            }
        });
        figure.render(false);
        assert_eq!(figure.animation_count(), 2);
    }

    #[test]
    fn show_flips_image_cameras_once() {
        let mut figure = Figure::builder().shape(1, 2).build().unwrap();
        figure
            .subplot_mut((0, 0))
            .unwrap()
            .add_graphic(Graphic::image(8, 4));

        figure.show(ShowOptions::default());
        figure.show(ShowOptions::default());

        let cameras = figure.cameras();
        assert_eq!(cameras[(0, 0)].borrow().scale.y, -1.0);
        assert_eq!(cameras[(0, 1)].borrow().scale.y, 1.0);
        assert!(figure.is_shown());
    }

    #[test]
    fn show_keeps_camera_aspect_setting() {
        let mut camera = Camera::new_2d();
        camera.maintain_aspect = false;
        let mut figure = Figure::builder().camera(camera).build().unwrap();
        figure
            .subplot_mut((0, 0))
            .unwrap()
            .add_graphic(Graphic::image(10, 2));

        figure.show(ShowOptions::default());

        let camera = figure.cameras()[(0, 0)].clone();
        let camera = camera.borrow();
        assert!(!camera.maintain_aspect);
        assert!(camera.width > camera.height);
    }

    #[test]
    fn show_aspect_override_applies_to_fit_only() {
        let mut camera = Camera::new_2d();
        camera.maintain_aspect = false;
        let mut figure = Figure::builder().camera(camera).build().unwrap();
        figure
            .subplot_mut((0, 0))
            .unwrap()
            .add_graphic(Graphic::image(10, 2));

        figure.show(ShowOptions {
            autoscale: true,
            maintain_aspect: Some(true),
        });

        let camera = figure.cameras()[(0, 0)].clone();
        let camera = camera.borrow();
        assert!(!camera.maintain_aspect);
        assert_eq!(camera.width, camera.height);
    }

    #[test]
    fn rgb_export_blends_onto_black() {
        let mut figure = Figure::builder().size(4, 4).build().unwrap();
        figure.subplot_mut((0, 0)).unwrap().background = [200, 100, 0, 128];
        figure.render(false);

        let rgba = figure.export_image(false).to_rgba8();
        assert_eq!(rgba.get_pixel(0, 0).0, [200, 100, 0, 128]);

        let rgb = figure.export_image(true).to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [100, 50, 0]);
    }

    #[test]
    fn export_requires_an_extension() {
        let figure = Figure::builder().build().unwrap();
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            figure.export(dir.path().join("no-extension")),
            Err(LayoutError::Export(_))
        ));
    }

    #[test]
    fn every_alpha_format_can_be_written() {
        let mut figure = Figure::builder().size(4, 4).build().unwrap();
        figure.render(false);
        let dir = tempfile::tempdir().unwrap();
        for extension in ALPHA_FORMATS {
            let path = dir.path().join(format!("frame.{extension}"));
            figure.export(&path).unwrap();
            assert!(image::open(&path).unwrap().color().has_alpha());
        }
    }

    #[test]
    fn display_lists_subplots() {
        let figure = Figure::builder()
            .shape(1, 2)
            .names(["left", "right"])
            .size(40, 20)
            .build()
            .unwrap();
        let text = figure.to_string();
        assert!(text.starts_with("figure (1, 2) 40x20"));
        assert!(text.contains("subplot (0, 1) `right`"));
    }
}
