//! Errors raised while resolving and driving a subplot grid.

use thiserror::Error;

/// Every way figure construction or lookup can fail.
///
/// Resolution errors are fatal to the construction call that raised them; no
/// partially wired figure is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("grid shape must have at least one row and one column, got ({rows}, {cols})")]
    InvalidShape { rows: usize, cols: usize },

    #[error("`{field}` has {actual} entries but the grid shape ({rows}, {cols}) needs {expected}")]
    ShapeMismatch {
        field: &'static str,
        rows: usize,
        cols: usize,
        expected: usize,
        actual: usize,
    },

    #[error("invalid camera `{0}`: expected \"2d\", \"3d\" or a camera instance")]
    InvalidCameraSpec(String),

    #[error(
        "invalid controller type `{0}`: expected one of \"panzoom\", \"fly\", \"trackball\", \"orbit\", \"default\""
    )]
    InvalidControllerType(String),

    #[error("invalid `controller_ids` value `{0}`: expected \"sync\", integer ids or lists of subplot names")]
    InvalidControllerIds(String),

    #[error("grouping controllers by subplot name requires `names` to be set")]
    MissingNames,

    #[error("`controller_ids` refers to `{0}`, which is not a subplot name")]
    UnknownName(String),

    #[error("subplot name `{0}` appears more than once in `controller_ids`")]
    DuplicateName(String),

    #[error("controller group {group} mixes controller types: {}", .types.join(", "))]
    MixedControllerType { group: String, types: Vec<String> },

    #[error("no subplot named `{0}`")]
    NameNotFound(String),

    #[error("subplot position ({row}, {col}) is outside the ({rows}, {cols}) grid")]
    PositionOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("animation {0} is not registered")]
    AnimationNotFound(u64),

    #[error("unknown canvas backend `{0}`: expected one of offscreen, qt, glfw, jupyter, wx")]
    InvalidCanvasBackend(String),

    #[error("canvas backend `{0}` is not available in this build")]
    CanvasUnavailable(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("invalid figure config: {0}")]
    Config(String),
}

impl LayoutError {
    pub(crate) fn shape_mismatch(field: &'static str, shape: (usize, usize), actual: usize) -> Self {
        Self::ShapeMismatch {
            field,
            rows: shape.0,
            cols: shape.1,
            expected: shape.0 * shape.1,
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;
