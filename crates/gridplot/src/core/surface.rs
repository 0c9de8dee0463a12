//! Rendering-surface and renderer collaborators
//!
//! The figure only needs a surface it can size and ask for redraws, and a
//! renderer it can hand viewports to, flush and snapshot. GPU-backed
//! implementations live outside this crate; the offscreen ones here keep
//! headless use and tests self-contained.

use crate::core::camera::Camera;
use crate::error::{LayoutError, Result};
use image::{Rgba, RgbaImage};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::str::FromStr;

/// Pixel rectangle inside the rendering surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

pub trait RenderSurface {
    /// Size in logical pixels, `(width, height)`
    fn logical_size(&self) -> (u32, u32);
    fn request_draw(&self);
}

pub trait Renderer {
    /// Queue one subplot for the next frame
    fn render(&self, viewport: Viewport, camera: &Camera, background: [u8; 4]);
    /// Submit everything queued since the last flush
    fn flush(&self);
    /// Read back the last flushed frame
    fn snapshot(&self) -> RgbaImage;
}

/// GUI backends a canvas can be requested for by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasBackend {
    Offscreen,
    Qt,
    Glfw,
    Jupyter,
    Wx,
}

impl CanvasBackend {
    pub fn name(self) -> &'static str {
        match self {
            CanvasBackend::Offscreen => "offscreen",
            CanvasBackend::Qt => "qt",
            CanvasBackend::Glfw => "glfw",
            CanvasBackend::Jupyter => "jupyter",
            CanvasBackend::Wx => "wx",
        }
    }

    /// Create a surface of the given size for this backend
    pub fn create(self, size: (u32, u32)) -> Result<Rc<dyn RenderSurface>> {
        match self {
            CanvasBackend::Offscreen => Ok(Rc::new(OffscreenCanvas::new(size))),
            other => Err(LayoutError::CanvasUnavailable(other.name().to_string())),
        }
    }
}

impl FromStr for CanvasBackend {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "offscreen" => Ok(CanvasBackend::Offscreen),
            "qt" => Ok(CanvasBackend::Qt),
            "glfw" => Ok(CanvasBackend::Glfw),
            "jupyter" => Ok(CanvasBackend::Jupyter),
            "wx" => Ok(CanvasBackend::Wx),
            other => Err(LayoutError::InvalidCanvasBackend(other.to_string())),
        }
    }
}

/// Headless surface that records draw requests
#[derive(Debug)]
pub struct OffscreenCanvas {
    size: Cell<(u32, u32)>,
    draw_requests: Cell<u64>,
}

impl OffscreenCanvas {
    pub fn new(size: (u32, u32)) -> Self {
        Self {
            size: Cell::new(size),
            draw_requests: Cell::new(0),
        }
    }

    pub fn resize(&self, size: (u32, u32)) {
        self.size.set(size);
    }

    pub fn draw_requests(&self) -> u64 {
        self.draw_requests.get()
    }
}

impl RenderSurface for OffscreenCanvas {
    fn logical_size(&self) -> (u32, u32) {
        self.size.get()
    }

    fn request_draw(&self) {
        self.draw_requests.set(self.draw_requests.get() + 1);
    }
}

/// CPU renderer that clears each subplot viewport to its background color
#[derive(Debug)]
pub struct OffscreenRenderer {
    frame: RefCell<RgbaImage>,
    pending: RefCell<Vec<(Viewport, [u8; 4])>>,
    flushes: Cell<u64>,
}

impl OffscreenRenderer {
    pub fn new(size: (u32, u32)) -> Self {
        Self {
            frame: RefCell::new(RgbaImage::new(size.0, size.1)),
            pending: RefCell::new(Vec::new()),
            flushes: Cell::new(0),
        }
    }

    pub fn for_surface(surface: &dyn RenderSurface) -> Self {
        Self::new(surface.logical_size())
    }

    pub fn flushes(&self) -> u64 {
        self.flushes.get()
    }
}

impl Renderer for OffscreenRenderer {
    fn render(&self, viewport: Viewport, camera: &Camera, background: [u8; 4]) {
        log::trace!(
            target: "gridplot",
            "offscreen render viewport={:?} fov={}",
            viewport,
            camera.fov()
        );
        self.pending.borrow_mut().push((viewport, background));
    }

    fn flush(&self) {
        let mut frame = self.frame.borrow_mut();
        let (fw, fh) = frame.dimensions();
        for (viewport, color) in self.pending.borrow_mut().drain(..) {
            let x_end = viewport.x.saturating_add(viewport.width).min(fw);
            let y_end = viewport.y.saturating_add(viewport.height).min(fh);
            for y in viewport.y.min(fh)..y_end {
                for x in viewport.x.min(fw)..x_end {
                    frame.put_pixel(x, y, Rgba(color));
                }
            }
        }
        self.flushes.set(self.flushes.get() + 1);
    }

    fn snapshot(&self) -> RgbaImage {
        self.frame.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse() {
        assert_eq!("offscreen".parse::<CanvasBackend>(), Ok(CanvasBackend::Offscreen));
        assert_eq!("qt".parse::<CanvasBackend>(), Ok(CanvasBackend::Qt));
        assert_eq!(
            "tk".parse::<CanvasBackend>(),
            Err(LayoutError::InvalidCanvasBackend("tk".to_string()))
        );
    }

    #[test]
    fn only_offscreen_is_constructible() {
        let canvas = CanvasBackend::Offscreen.create((64, 32)).unwrap();
        assert_eq!(canvas.logical_size(), (64, 32));
        assert!(matches!(
            CanvasBackend::Glfw.create((64, 32)),
            Err(LayoutError::CanvasUnavailable(name)) if name == "glfw"
        ));
    }

    #[test]
    fn renderer_draws_on_flush_only() {
        let renderer = OffscreenRenderer::new((4, 2));
        let viewport = Viewport {
            x: 2,
            y: 0,
            width: 2,
            height: 2,
        };
        renderer.render(viewport, &Camera::new_2d(), [255, 0, 0, 255]);
        assert_eq!(renderer.snapshot().get_pixel(3, 1).0, [0, 0, 0, 0]);

        renderer.flush();
        let frame = renderer.snapshot();
        assert_eq!(frame.get_pixel(3, 1).0, [255, 0, 0, 255]);
        assert_eq!(frame.get_pixel(1, 1).0, [0, 0, 0, 0]);
        assert_eq!(renderer.flushes(), 1);
    }

    #[test]
    fn viewport_is_clipped_to_frame() {
        let renderer = OffscreenRenderer::new((2, 2));
        let viewport = Viewport {
            x: 1,
            y: 1,
            width: 10,
            height: 10,
        };
        renderer.render(viewport, &Camera::new_2d(), [9, 9, 9, 255]);
        renderer.flush();
        assert_eq!(renderer.snapshot().get_pixel(1, 1).0, [9, 9, 9, 255]);
    }
}
