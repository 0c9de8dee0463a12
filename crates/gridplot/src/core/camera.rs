//! Camera model shared by subplots and their controllers
//!
//! Every camera is perspective-family: a field of view of zero degrees is the
//! orthographic-equivalent projection used by 2D subplots, any positive field
//! of view is a true perspective projection.

use glam::{Mat4, Quat, Vec2, Vec3};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Field of view, in degrees, given to cameras created from the `"3d"` token.
pub const DEFAULT_3D_FOV: f32 = 50.0;

const MAX_FOV: f32 = 179.0;

/// Camera projection, derived from the field of view
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionType {
    Perspective { fov: f32 },
    Orthographic,
}

/// Interactive camera for one or more subplots
#[derive(Debug, Clone)]
pub struct Camera {
    // Position and orientation
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,

    /// Field of view in degrees; 0 means orthographic-equivalent.
    fov: f32,

    /// Visible extent around the target for the orthographic projection.
    pub width: f32,
    pub height: f32,
    pub near: f32,
    pub far: f32,

    // Navigation state
    pub zoom: f32,
    /// Local scale applied to the scene, e.g. `y = -1` to flip images.
    pub scale: Vec3,
    pub maintain_aspect: bool,

    // Interaction settings
    pub pan_sensitivity: f32,
    pub zoom_sensitivity: f32,
    pub rotate_sensitivity: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new_3d()
    }
}

impl Camera {
    /// Create a 2D camera (zero field of view) looking down -Z at the origin
    pub fn new_2d() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 1.0),
            target: Vec3::ZERO,
            // 2D views keep a stable screen-up (+Y).
            up: Vec3::Y,
            fov: 0.0,
            width: 2.0,
            height: 2.0,
            near: -1000.0,
            far: 1000.0,
            zoom: 1.0,
            scale: Vec3::ONE,
            maintain_aspect: true,
            pan_sensitivity: 1.0,
            zoom_sensitivity: 0.1,
            rotate_sensitivity: 0.0,
        }
    }

    /// Create a 3D perspective camera with [`DEFAULT_3D_FOV`]
    pub fn new_3d() -> Self {
        Self {
            // Z-up with an isometric-ish starting view.
            position: Vec3::new(3.5, 3.5, 3.5),
            target: Vec3::ZERO,
            up: Vec3::Z,
            fov: DEFAULT_3D_FOV,
            width: 2.0,
            height: 2.0,
            near: 0.1,
            far: 1000.0,
            zoom: 1.0,
            scale: Vec3::ONE,
            maintain_aspect: true,
            pan_sensitivity: 0.01,
            zoom_sensitivity: 0.1,
            rotate_sensitivity: 0.005,
        }
    }

    pub fn with_fov(mut self, fov: f32) -> Self {
        self.set_fov(fov);
        self
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.fov = if fov.is_finite() {
            fov.clamp(0.0, MAX_FOV)
        } else {
            0.0
        };
    }

    pub fn projection(&self) -> ProjectionType {
        if self.is_orthographic() {
            ProjectionType::Orthographic
        } else {
            ProjectionType::Perspective { fov: self.fov }
        }
    }

    pub fn is_orthographic(&self) -> bool {
        self.fov == 0.0
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up) * Mat4::from_scale(self.scale)
    }

    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        let aspect = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            aspect_ratio
        } else {
            1.0
        };
        match self.projection() {
            ProjectionType::Perspective { fov } => {
                Mat4::perspective_rh(fov.to_radians(), aspect, self.near, self.far)
            }
            ProjectionType::Orthographic => {
                let (w, h) = self.visible_extent(aspect);
                Mat4::orthographic_rh(-w / 2.0, w / 2.0, -h / 2.0, h / 2.0, self.near, self.far)
            }
        }
    }

    pub fn view_proj_matrix(&self, aspect_ratio: f32) -> Mat4 {
        self.projection_matrix(aspect_ratio) * self.view_matrix()
    }

    /// Width and height of the orthographic view volume at the current zoom
    pub fn visible_extent(&self, aspect_ratio: f32) -> (f32, f32) {
        let mut w = self.width / self.zoom;
        let mut h = self.height / self.zoom;
        if self.maintain_aspect && aspect_ratio > 0.0 {
            // Grow the short side so data keeps its aspect inside the viewport.
            if w / h < aspect_ratio {
                w = h * aspect_ratio;
            } else {
                h = w / aspect_ratio;
            }
        }
        (w, h)
    }

    /// Pan by a screen-space delta in pixels
    pub fn pan(&mut self, delta: Vec2, viewport_px: (u32, u32)) {
        let world_delta = match self.projection() {
            ProjectionType::Orthographic => {
                let (vw, vh) = (viewport_px.0.max(1) as f32, viewport_px.1.max(1) as f32);
                let (w, h) = self.visible_extent(vw / vh);
                // Dragging right moves the data right, i.e. the camera left.
                // Screen +Y points down, so a downward drag moves the camera up.
                let dx = -delta.x * (w / vw) * self.pan_sensitivity;
                let dy = delta.y * (h / vh) * self.pan_sensitivity;
                Vec3::new(dx, dy, 0.0)
            }
            ProjectionType::Perspective { .. } => {
                let view = self.view_matrix();
                let right = view.row(0).truncate();
                let up = view.row(1).truncate();
                let dist = (self.position - self.target).length().max(1e-3);
                let amount = Vec2::new(-delta.x, delta.y) * self.pan_sensitivity * dist;
                right * amount.x + up * amount.y
            }
        };

        self.position += world_delta;
        self.target += world_delta;
    }

    /// Zoom (positive = zoom in, negative = zoom out)
    pub fn zoom(&mut self, delta: f32) {
        let factor = 1.0 - delta * self.zoom_sensitivity;
        if factor.abs() < 1e-3 {
            return;
        }
        let factor = factor.clamp(0.2, 5.0);

        match self.projection() {
            ProjectionType::Orthographic => {
                self.zoom = (self.zoom / factor).clamp(0.01, 100.0);
            }
            ProjectionType::Perspective { .. } => {
                // Dolly towards or away from the target.
                let offset = self.position - self.target;
                let distance = offset.length();
                if !distance.is_finite() || distance < 1e-4 {
                    return;
                }
                let new_distance = (distance * factor).clamp(0.1, 1000.0);
                self.position = self.target + offset / distance * new_distance;
            }
        }
    }

    /// Orbit around the target: yaw about world up, pitch about camera right
    pub fn rotate(&mut self, delta: Vec2) {
        if self.rotate_sensitivity == 0.0 {
            return;
        }

        let yaw = -delta.x * self.rotate_sensitivity;
        let pitch = -delta.y * self.rotate_sensitivity;

        let world_up = self.up.normalize_or_zero();
        let mut offset = self.position - self.target;
        if offset.length_squared() < 1e-9 {
            offset = Vec3::new(0.0, 0.0, 1.0);
        }

        offset = Quat::from_axis_angle(world_up, yaw) * offset;

        let forward = (-offset).normalize_or_zero();
        let right = forward.cross(world_up).normalize_or_zero();
        if right.length_squared() > 1e-9 {
            let candidate = Quat::from_axis_angle(right, pitch) * offset;
            // Avoid flipping over the poles.
            let up_dot = candidate.normalize_or_zero().dot(world_up).abs();
            if up_dot < 0.995 {
                offset = candidate;
            }
        }

        self.position = self.target + offset;
    }

    /// Free rotation that also rolls the up vector, so no pole is special
    pub fn tumble(&mut self, delta: Vec2) {
        if self.rotate_sensitivity == 0.0 {
            return;
        }

        let offset = self.position - self.target;
        let forward = (-offset).normalize_or_zero();
        let up = self.up.normalize_or_zero();
        let right = forward.cross(up).normalize_or_zero();
        if right.length_squared() < 1e-9 {
            return;
        }

        let rotation = Quat::from_axis_angle(up, -delta.x * self.rotate_sensitivity)
            * Quat::from_axis_angle(right, -delta.y * self.rotate_sensitivity);
        self.position = self.target + rotation * offset;
        self.up = (rotation * up).normalize_or_zero();
    }

    /// Turn the view direction in place, keeping the position fixed
    pub fn look_around(&mut self, delta: Vec2) {
        if self.rotate_sensitivity == 0.0 {
            return;
        }

        let up = self.up.normalize_or_zero();
        let offset = self.target - self.position;
        let yawed = Quat::from_axis_angle(up, -delta.x * self.rotate_sensitivity) * offset;
        let right = yawed.normalize_or_zero().cross(up).normalize_or_zero();
        let turned = if right.length_squared() > 1e-9 {
            let candidate =
                Quat::from_axis_angle(right, -delta.y * self.rotate_sensitivity) * yawed;
            if candidate.normalize_or_zero().dot(up).abs() < 0.995 {
                candidate
            } else {
                yawed
            }
        } else {
            yawed
        };
        self.target = self.position + turned;
    }

    /// Move position and target together along the view direction
    pub fn move_forward(&mut self, distance: f32) {
        let forward = (self.target - self.position).normalize_or_zero();
        self.position += forward * distance;
        self.target += forward * distance;
    }

    /// Fit the camera so the given bounds are visible
    pub fn fit_bounds(&mut self, min_bounds: Vec3, max_bounds: Vec3) {
        self.fit_bounds_with_aspect(min_bounds, max_bounds, self.maintain_aspect);
    }

    /// Fit to the bounds without touching `maintain_aspect`; with
    /// `maintain_aspect` the orthographic extent is made square in data units.
    pub fn fit_bounds_with_aspect(
        &mut self,
        min_bounds: Vec3,
        max_bounds: Vec3,
        maintain_aspect: bool,
    ) {
        let center = (min_bounds + max_bounds) / 2.0;
        let size = (max_bounds - min_bounds).abs();

        match self.projection() {
            ProjectionType::Orthographic => {
                let margin = 1.1;
                self.width = (size.x * margin).max(1e-6);
                self.height = (size.y * margin).max(1e-6);
                if maintain_aspect {
                    let side = self.width.max(self.height);
                    self.width = side;
                    self.height = side;
                }
                self.zoom = 1.0;
                self.position = Vec3::new(center.x, center.y, self.position.z);
                self.target = Vec3::new(center.x, center.y, 0.0);
            }
            ProjectionType::Perspective { fov } => {
                let radius = (size.length() * 0.5).max(1e-3);
                let distance = radius / (fov.to_radians() / 2.0).sin().max(1e-3);
                let direction = (self.position - self.target).normalize_or_zero();
                let direction = if direction.length_squared() < 1e-9 {
                    Vec3::Z
                } else {
                    direction
                };
                self.target = center;
                self.position = center + direction * distance;
                // Keep clip planes sane relative to the new view distance.
                self.near = (distance - radius * 4.0).max(0.01);
                self.far = (distance + radius * 4.0).max(self.near + 1.0);
            }
        }
    }

    /// Reset navigation state, keeping projection and scale
    pub fn reset(&mut self) {
        let fresh = if self.is_orthographic() {
            Self::new_2d()
        } else {
            Self::new_3d().with_fov(self.fov)
        };
        self.position = fresh.position;
        self.target = fresh.target;
        self.up = fresh.up;
        self.zoom = 1.0;
    }
}

/// Shared, single-threaded handle to a [`Camera`].
///
/// Cloning the handle aliases the camera; use [`CameraHandle::ptr_eq`] to
/// compare identity.
#[derive(Clone, Default)]
pub struct CameraHandle(Rc<RefCell<Camera>>);

impl CameraHandle {
    pub fn new(camera: Camera) -> Self {
        Self(Rc::new(RefCell::new(camera)))
    }

    pub fn borrow(&self) -> Ref<'_, Camera> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Camera> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn fov(&self) -> f32 {
        self.0.borrow().fov()
    }
}

impl From<Camera> for CameraHandle {
    fn from(camera: Camera) -> Self {
        Self::new(camera)
    }
}

impl fmt::Debug for CameraHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(camera) => f
                .debug_struct("CameraHandle")
                .field("ptr", &Rc::as_ptr(&self.0))
                .field("fov", &camera.fov())
                .finish(),
            Err(_) => f
                .debug_struct("CameraHandle")
                .field("ptr", &Rc::as_ptr(&self.0))
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_2d_camera_is_orthographic() {
        let camera = Camera::new_2d();
        assert_eq!(camera.fov(), 0.0);
        assert_eq!(camera.projection(), ProjectionType::Orthographic);
        assert_eq!(camera.up, Vec3::Y);
    }

    #[test]
    fn test_3d_camera_has_default_fov() {
        let camera = Camera::new_3d();
        assert_eq!(camera.projection(), ProjectionType::Perspective { fov: 50.0 });
        assert_eq!(camera.position, Vec3::new(3.5, 3.5, 3.5));
    }

    #[test]
    fn fov_is_clamped() {
        assert_eq!(Camera::new_3d().with_fov(-10.0).fov(), 0.0);
        assert_eq!(Camera::new_3d().with_fov(500.0).fov(), 179.0);
        assert_eq!(Camera::new_3d().with_fov(f32::NAN).fov(), 0.0);
    }

    #[test]
    fn pan_2d_moves_position_and_target() {
        let mut camera = Camera::new_2d();
        camera.pan(Vec2::new(100.0, 0.0), (200, 200));
        assert!(camera.position.x < 0.0);
        assert_eq!(camera.position.x, camera.target.x);
        assert_eq!(camera.position.y, 0.0);
    }

    #[test]
    fn zoom_2d_shrinks_extent() {
        let mut camera = Camera::new_2d();
        let (w0, _) = camera.visible_extent(1.0);
        camera.zoom(1.0);
        let (w1, _) = camera.visible_extent(1.0);
        assert!(w1 < w0);
    }

    #[test]
    fn zoom_3d_dollies_towards_target() {
        let mut camera = Camera::new_3d();
        let before = (camera.position - camera.target).length();
        camera.zoom(1.0);
        let after = (camera.position - camera.target).length();
        assert!(after < before);
    }

    #[test]
    fn rotate_keeps_distance() {
        let mut camera = Camera::new_3d();
        let before = (camera.position - camera.target).length();
        camera.rotate(Vec2::new(40.0, 10.0));
        let after = (camera.position - camera.target).length();
        assert!((before - after).abs() < 1e-4);
    }

    #[test]
    fn rotate_is_disabled_for_2d() {
        let mut camera = Camera::new_2d();
        let before = camera.position;
        camera.rotate(Vec2::new(40.0, 10.0));
        assert_eq!(camera.position, before);
    }

    #[test]
    fn fit_bounds_2d_covers_data() {
        let mut camera = Camera::new_2d();
        camera.fit_bounds(Vec3::new(-5.0, -3.0, 0.0), Vec3::new(5.0, 3.0, 0.0));
        let (w, h) = camera.visible_extent(0.0);
        assert!(w >= 10.0);
        assert!(h >= 6.0);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn fit_bounds_aspect_is_explicit() {
        let mut camera = Camera::new_2d();
        camera.maintain_aspect = false;
        camera.fit_bounds_with_aspect(Vec3::ZERO, Vec3::new(10.0, 2.0, 0.0), true);
        assert_eq!(camera.width, camera.height);
        assert!(!camera.maintain_aspect);

        camera.fit_bounds_with_aspect(Vec3::ZERO, Vec3::new(10.0, 2.0, 0.0), false);
        assert!(camera.width > camera.height);
    }

    #[test]
    fn handle_identity() {
        let a = CameraHandle::new(Camera::new_2d());
        let b = a.clone();
        let c = CameraHandle::new(Camera::new_2d());
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        b.borrow_mut().zoom = 3.0;
        assert_eq!(a.borrow().zoom, 3.0);
    }
}
