//! Navigation controllers
//!
//! A controller owns an ordered list of cameras and applies every pointer or
//! wheel gesture to all of them, which is what keeps the subplots of one
//! controller group synchronized.

use crate::core::camera::CameraHandle;
use crate::core::interaction::{EventHandler, Modifiers, MouseButton, PlotEvent};
use glam::Vec2;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Distance moved per wheel step by fly controllers.
const FLY_STEP: f32 = 0.5;

/// Navigation behaviour of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerKind {
    PanZoom,
    Fly,
    Trackball,
    Orbit,
}

impl ControllerKind {
    pub const ALL: [ControllerKind; 4] = [
        ControllerKind::PanZoom,
        ControllerKind::Fly,
        ControllerKind::Trackball,
        ControllerKind::Orbit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ControllerKind::PanZoom => "panzoom",
            ControllerKind::Fly => "fly",
            ControllerKind::Trackball => "trackball",
            ControllerKind::Orbit => "orbit",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Camera controller for handling input events
#[derive(Debug)]
pub struct Controller {
    kind: ControllerKind,
    cameras: Vec<CameraHandle>,
    pub enabled: bool,
    active_button: Option<MouseButton>,
    active_modifiers: Modifiers,
    last_mouse_pos: Vec2,
}

impl Controller {
    pub fn new(kind: ControllerKind) -> Self {
        Self {
            kind,
            cameras: Vec::new(),
            enabled: true,
            active_button: None,
            active_modifiers: Modifiers::default(),
            last_mouse_pos: Vec2::ZERO,
        }
    }

    /// Create a controller already driving `camera`
    pub fn with_camera(kind: ControllerKind, camera: CameraHandle) -> Self {
        let mut controller = Self::new(kind);
        controller.add_camera(camera);
        controller
    }

    pub fn kind(&self) -> ControllerKind {
        self.kind
    }

    /// Bind a camera to this controller.
    ///
    /// Returns `false` if the camera was already bound; a camera is never bound twice.
    pub fn add_camera(&mut self, camera: CameraHandle) -> bool {
        if self.has_camera(&camera) {
            return false;
        }
        self.cameras.push(camera);
        true
    }

    pub fn remove_camera(&mut self, camera: &CameraHandle) -> bool {
        let before = self.cameras.len();
        self.cameras.retain(|c| !c.ptr_eq(camera));
        self.cameras.len() != before
    }

    pub fn has_camera(&self, camera: &CameraHandle) -> bool {
        self.cameras.iter().any(|c| c.ptr_eq(camera))
    }

    /// Bound cameras in binding order
    pub fn cameras(&self) -> &[CameraHandle] {
        &self.cameras
    }

    fn drag(&self, delta: Vec2, viewport_px: (u32, u32), button: MouseButton) {
        let pan = self.active_modifiers.shift;
        for handle in &self.cameras {
            let mut camera = handle.borrow_mut();
            match (self.kind, button) {
                (ControllerKind::PanZoom, MouseButton::Right) => {
                    // Right-drag zooms; dragging up zooms in.
                    camera.zoom((-delta.y / 120.0).clamp(-5.0, 5.0));
                }
                (ControllerKind::PanZoom, _) => camera.pan(delta, viewport_px),
                (ControllerKind::Orbit, MouseButton::Left) if !pan => camera.rotate(delta),
                (ControllerKind::Trackball, MouseButton::Left) if !pan => camera.tumble(delta),
                (ControllerKind::Fly, MouseButton::Left) if !pan => camera.look_around(delta),
                _ => camera.pan(delta, viewport_px),
            }
        }
    }

    fn wheel(&self, delta: f32) {
        for handle in &self.cameras {
            let mut camera = handle.borrow_mut();
            match self.kind {
                ControllerKind::Fly => camera.move_forward(delta * FLY_STEP),
                _ => camera.zoom(delta),
            }
        }
    }
}

impl EventHandler for Controller {
    fn handle_event(&mut self, event: PlotEvent) -> bool {
        if !self.enabled {
            return false;
        }

        match event {
            PlotEvent::MousePress {
                position,
                button,
                modifiers,
            } => {
                self.last_mouse_pos = position;
                self.active_button = Some(button);
                self.active_modifiers = modifiers;
                false
            }
            PlotEvent::MouseRelease { position, button } => {
                self.last_mouse_pos = position;
                if self.active_button == Some(button) {
                    self.active_button = None;
                }
                false
            }
            PlotEvent::MouseMove {
                position,
                viewport_px,
                modifiers,
            } => {
                let delta = position - self.last_mouse_pos;
                self.last_mouse_pos = position;
                let Some(button) = self.active_button else {
                    return false;
                };
                if delta.length_squared() == 0.0 || self.cameras.is_empty() {
                    return false;
                }
                self.active_modifiers = modifiers;
                self.drag(delta, viewport_px, button);
                true
            }
            PlotEvent::MouseWheel { delta } => {
                if delta == 0.0 || self.cameras.is_empty() {
                    return false;
                }
                self.wheel(delta);
                true
            }
        }
    }
}

/// Shared, single-threaded handle to a [`Controller`].
///
/// All subplots of one controller group hold clones of the same handle.
#[derive(Clone)]
pub struct ControllerHandle(Rc<RefCell<Controller>>);

impl ControllerHandle {
    pub fn new(controller: Controller) -> Self {
        Self(Rc::new(RefCell::new(controller)))
    }

    pub fn borrow(&self) -> Ref<'_, Controller> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Controller> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn kind(&self) -> ControllerKind {
        self.0.borrow().kind()
    }

    pub fn add_camera(&self, camera: CameraHandle) -> bool {
        self.0.borrow_mut().add_camera(camera)
    }

    pub fn camera_count(&self) -> usize {
        self.0.borrow().cameras().len()
    }

    pub fn handle_event(&self, event: PlotEvent) -> bool {
        self.0.borrow_mut().handle_event(event)
    }
}

impl From<Controller> for ControllerHandle {
    fn from(controller: Controller) -> Self {
        Self::new(controller)
    }
}

impl fmt::Debug for ControllerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("ControllerHandle");
        out.field("ptr", &Rc::as_ptr(&self.0));
        match self.0.try_borrow() {
            Ok(controller) => out
                .field("kind", &controller.kind())
                .field("cameras", &controller.cameras().len())
                .finish(),
            Err(_) => out.finish_non_exhaustive(),
        }
    }
}
