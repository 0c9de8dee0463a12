//! Expansion of camera specifications into one camera per cell

use crate::core::camera::{Camera, CameraHandle};
use crate::error::{LayoutError, Result};
use crate::layout::grid::{CellSpec, GridShape, Matrix};
use std::fmt;
use std::str::FromStr;

/// Camera types that can be requested by token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraKind {
    /// `"2d"`: zero field of view
    TwoD,
    /// `"3d"`: perspective with the default field of view
    ThreeD,
}

impl CameraKind {
    pub fn token(self) -> &'static str {
        match self {
            CameraKind::TwoD => "2d",
            CameraKind::ThreeD => "3d",
        }
    }

    pub fn create(self) -> Camera {
        match self {
            CameraKind::TwoD => Camera::new_2d(),
            CameraKind::ThreeD => Camera::new_3d(),
        }
    }
}

impl FromStr for CameraKind {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "2d" => Ok(CameraKind::TwoD),
            "3d" => Ok(CameraKind::ThreeD),
            other => Err(LayoutError::InvalidCameraSpec(other.to_string())),
        }
    }
}

impl fmt::Display for CameraKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// What one cell asks for: a camera type or an existing camera
#[derive(Debug, Clone)]
pub enum CameraSpec {
    Kind(CameraKind),
    /// Unparsed token, validated during resolution
    Token(String),
    /// Used as-is; passing the same handle for several cells shares the camera
    Instance(CameraHandle),
}

impl Default for CameraSpec {
    fn default() -> Self {
        CameraSpec::Kind(CameraKind::TwoD)
    }
}

impl From<CameraKind> for CameraSpec {
    fn from(kind: CameraKind) -> Self {
        CameraSpec::Kind(kind)
    }
}

impl From<&str> for CameraSpec {
    fn from(token: &str) -> Self {
        CameraSpec::Token(token.to_string())
    }
}

impl From<String> for CameraSpec {
    fn from(token: String) -> Self {
        CameraSpec::Token(token)
    }
}

impl From<CameraHandle> for CameraSpec {
    fn from(handle: CameraHandle) -> Self {
        CameraSpec::Instance(handle)
    }
}

impl From<Camera> for CameraSpec {
    fn from(camera: Camera) -> Self {
        CameraSpec::Instance(CameraHandle::new(camera))
    }
}

enum Resolved {
    Create(CameraKind),
    Existing(CameraHandle),
}

fn resolve_one(spec: CameraSpec) -> Result<Resolved> {
    Ok(match spec {
        CameraSpec::Kind(kind) => Resolved::Create(kind),
        CameraSpec::Token(token) => Resolved::Create(token.parse()?),
        CameraSpec::Instance(handle) => Resolved::Existing(handle),
    })
}

/// Resolve `cameras` into one camera handle per cell.
///
/// A broadcast token creates a separate camera for every cell; a broadcast
/// instance is shared by every cell. All tokens are validated before any
/// camera is created.
pub fn resolve_cameras(cameras: CellSpec<CameraSpec>, shape: GridShape) -> Result<Matrix<CameraHandle>> {
    let specs = cameras.into_matrix(shape, "cameras")?;
    let resolved = specs
        .into_vec()
        .into_iter()
        .map(resolve_one)
        .collect::<Result<Vec<_>>>()?;

    let handles = resolved
        .into_iter()
        .enumerate()
        .map(|(index, cell)| {
            let handle = match cell {
                Resolved::Create(kind) => CameraHandle::new(kind.create()),
                Resolved::Existing(handle) => handle,
            };
            log::trace!(
                target: "gridplot",
                "cell {:?} camera fov={}",
                shape.position_of(index),
                handle.fov()
            );
            handle
        })
        .collect();

    Matrix::from_vec(shape, handles, "cameras")
}
