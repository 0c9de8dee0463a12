//! Cameras, controllers and the rendering collaborators a figure drives

pub mod camera;
pub mod controller;
pub mod graphic;
pub mod interaction;
pub mod surface;

pub use camera::{Camera, CameraHandle, ProjectionType, DEFAULT_3D_FOV};
pub use controller::{Controller, ControllerHandle, ControllerKind};
pub use graphic::{BoundingBox, Graphic, GraphicKind};
pub use interaction::{EventHandler, Modifiers, MouseButton, PlotEvent};
pub use surface::{
    CanvasBackend, OffscreenCanvas, OffscreenRenderer, RenderSurface, Renderer, Viewport,
};
