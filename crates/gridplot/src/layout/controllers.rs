//! Controller group resolution
//!
//! Turns the controller options of a figure into one controller per cell.
//! Cells that share a group share the controller instance, and every camera
//! of the group is bound to it in row-major order.
//!
//! The three grouping styles (`Sync`, integer ids, name lists) are
//! canonicalised into a matrix of [`GroupKey`]s first; everything after that
//! point is independent of how the groups were described.

use crate::core::camera::CameraHandle;
use crate::core::controller::{Controller, ControllerHandle, ControllerKind};
use crate::error::{LayoutError, Result};
use crate::layout::grid::{CellSpec, GridShape, Matrix};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Controller type requested for a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControllerType {
    PanZoom,
    Fly,
    Trackball,
    Orbit,
    /// Let the [`DefaultControllerRule`] decide from the group's cameras
    #[default]
    Default,
}

impl ControllerType {
    pub fn token(self) -> &'static str {
        match self.kind() {
            Some(kind) => kind.name(),
            None => "default",
        }
    }

    /// The explicitly requested kind, `None` for `Default`
    pub fn kind(self) -> Option<ControllerKind> {
        match self {
            ControllerType::PanZoom => Some(ControllerKind::PanZoom),
            ControllerType::Fly => Some(ControllerKind::Fly),
            ControllerType::Trackball => Some(ControllerKind::Trackball),
            ControllerType::Orbit => Some(ControllerKind::Orbit),
            ControllerType::Default => None,
        }
    }
}

impl From<ControllerKind> for ControllerType {
    fn from(kind: ControllerKind) -> Self {
        match kind {
            ControllerKind::PanZoom => ControllerType::PanZoom,
            ControllerKind::Fly => ControllerType::Fly,
            ControllerKind::Trackball => ControllerType::Trackball,
            ControllerKind::Orbit => ControllerType::Orbit,
        }
    }
}

impl FromStr for ControllerType {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self> {
        if s == "default" {
            return Ok(ControllerType::Default);
        }
        ControllerKind::from_name(s)
            .map(ControllerType::from)
            .ok_or_else(|| LayoutError::InvalidControllerType(s.to_string()))
    }
}

impl fmt::Display for ControllerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// How cells are grouped onto shared controllers
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ControllerIds {
    /// Every cell gets its own controller
    #[default]
    Unique,
    /// One controller for the whole grid
    Sync,
    /// Cells with equal ids share a controller
    ById(CellSpec<i64>),
    /// Each list of subplot names shares a controller; unlisted cells get their own
    ByName(Vec<Vec<String>>),
}

impl ControllerIds {
    /// Parse the string form; only `"sync"` is meaningful.
    pub fn from_token(token: &str) -> Result<Self> {
        match token {
            "sync" => Ok(ControllerIds::Sync),
            other => Err(LayoutError::InvalidControllerIds(other.to_string())),
        }
    }

    pub fn by_id<R, I>(rows: R) -> Self
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = i64>,
    {
        ControllerIds::ById(CellSpec::rows(rows))
    }

    pub fn by_name<G, I, S>(groups: G) -> Self
    where
        G: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ControllerIds::ByName(
            groups
                .into_iter()
                .map(|group| group.into_iter().map(Into::into).collect())
                .collect(),
        )
    }
}

/// Canonical identity of a controller group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    /// The k-th list of a [`ControllerIds::ByName`] grouping
    Named(usize),
    Id(i64),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Named(k) => write!(f, "names[{k}]"),
            GroupKey::Id(id) => write!(f, "id {id}"),
        }
    }
}

/// Picks the controller kind for a group whose type is `default`
pub trait DefaultControllerRule {
    fn controller_for(&self, cameras: &[CameraHandle]) -> ControllerKind;
}

/// Pan/zoom when every camera of the group has zero field of view, fly otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct FovDefaultRule;

impl DefaultControllerRule for FovDefaultRule {
    fn controller_for(&self, cameras: &[CameraHandle]) -> ControllerKind {
        if cameras.iter().all(|camera| camera.fov() == 0.0) {
            ControllerKind::PanZoom
        } else {
            ControllerKind::Fly
        }
    }
}

impl<F> DefaultControllerRule for F
where
    F: Fn(&[CameraHandle]) -> ControllerKind,
{
    fn controller_for(&self, cameras: &[CameraHandle]) -> ControllerKind {
        self(cameras)
    }
}

/// One validated controller group, before any controller exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerGroup {
    pub key: GroupKey,
    /// Member cells in row-major order
    pub cells: Vec<(usize, usize)>,
    pub controller_type: ControllerType,
}

/// Canonicalise any grouping style into one key per cell
pub fn resolve_group_keys(
    ids: ControllerIds,
    shape: GridShape,
    names: Option<&Matrix<String>>,
) -> Result<Matrix<GroupKey>> {
    match ids {
        ControllerIds::Unique => Ok(singleton_keys(shape)),
        ControllerIds::Sync => Ok(Matrix::from_fn(shape, |_| GroupKey::Id(0))),
        ControllerIds::ById(ids) => Ok(ids.into_matrix(shape, "controller_ids")?.map(|id| GroupKey::Id(*id))),
        ControllerIds::ByName(groups) => keys_from_names(&groups, shape, names),
    }
}

/// `Id(i)` for the i-th cell in row-major order
fn singleton_keys(shape: GridShape) -> Matrix<GroupKey> {
    let mut next = 0;
    Matrix::from_fn(shape, |_| {
        let key = GroupKey::Id(next);
        next += 1;
        key
    })
}

fn keys_from_names(
    groups: &[Vec<String>],
    shape: GridShape,
    names: Option<&Matrix<String>>,
) -> Result<Matrix<GroupKey>> {
    let names = names.ok_or(LayoutError::MissingNames)?;

    let known: HashSet<&str> = names.iter().map(String::as_str).collect();
    if let Some(unknown) = groups
        .iter()
        .flatten()
        .find(|name| !known.contains(name.as_str()))
    {
        return Err(LayoutError::UnknownName(unknown.clone()));
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = groups.iter().flatten().find(|name| !seen.insert(name.as_str())) {
        return Err(LayoutError::DuplicateName(duplicate.clone()));
    }

    // Unlisted cells keep a key of their own.
    let mut keys = singleton_keys(shape);
    for (k, group) in groups.iter().enumerate() {
        let members: HashSet<&str> = group.iter().map(String::as_str).collect();
        for (key, name) in keys.iter_mut().zip(names.iter()) {
            if members.contains(name.as_str()) {
                *key = GroupKey::Named(k);
            }
        }
    }
    Ok(keys)
}

/// Parse `controller_types`, defaulting every cell to `default`
pub fn resolve_controller_types(
    types: Option<CellSpec<String>>,
    shape: GridShape,
) -> Result<Matrix<ControllerType>> {
    let Some(types) = types else {
        return Ok(Matrix::from_fn(shape, |_| ControllerType::Default));
    };
    let tokens = types.into_matrix(shape, "controller_types")?;
    let parsed = tokens
        .iter()
        .map(|token| token.parse())
        .collect::<Result<Vec<ControllerType>>>()?;
    Matrix::from_vec(shape, parsed, "controller_types")
}

/// Collect cells per group key in ascending key order and check type consistency
pub fn plan_groups(
    keys: &Matrix<GroupKey>,
    types: &Matrix<ControllerType>,
) -> Result<Vec<ControllerGroup>> {
    let mut members: BTreeMap<GroupKey, Vec<(usize, usize)>> = BTreeMap::new();
    for (position, key) in keys.indexed() {
        members.entry(*key).or_default().push(position);
    }

    members
        .into_iter()
        .map(|(key, cells)| {
            let mut requested: Vec<ControllerType> = Vec::new();
            for position in &cells {
                let ty = types[*position];
                if !requested.contains(&ty) {
                    requested.push(ty);
                }
            }
            if requested.len() > 1 {
                return Err(LayoutError::MixedControllerType {
                    group: key.to_string(),
                    types: requested.iter().map(|t| t.token().to_string()).collect(),
                });
            }
            Ok(ControllerGroup {
                key,
                cells,
                controller_type: requested.first().copied().unwrap_or_default(),
            })
        })
        .collect()
}

/// Controller options of a figure
pub struct ControllerRequest<'a> {
    /// Explicit instances; when set, `ids` and `types` are ignored
    pub controllers: Option<CellSpec<ControllerHandle>>,
    pub ids: ControllerIds,
    pub types: Option<CellSpec<String>>,
    pub default_rule: &'a dyn DefaultControllerRule,
}

impl Default for ControllerRequest<'_> {
    fn default() -> Self {
        Self {
            controllers: None,
            ids: ControllerIds::Unique,
            types: None,
            default_rule: &FovDefaultRule,
        }
    }
}

/// Resolve controllers for every cell and bind the cameras to them.
///
/// All inputs are validated before the first controller is created or the
/// first camera bound.
pub fn resolve_controllers(
    request: ControllerRequest<'_>,
    cameras: &Matrix<CameraHandle>,
    names: Option<&Matrix<String>>,
) -> Result<Matrix<ControllerHandle>> {
    let shape = cameras.shape();

    if let Some(controllers) = request.controllers {
        if request.types.is_some() || request.ids != ControllerIds::Unique {
            log::warn!(
                target: "gridplot",
                "explicit controllers given; ignoring controller_types and controller_ids"
            );
        }
        return bind_explicit(controllers, cameras);
    }

    let keys = resolve_group_keys(request.ids, shape, names)?;
    let types = resolve_controller_types(request.types, shape)?;
    let groups = plan_groups(&keys, &types)?;
    build_groups(&groups, cameras, request.default_rule)
}

fn bind_explicit(
    controllers: CellSpec<ControllerHandle>,
    cameras: &Matrix<CameraHandle>,
) -> Result<Matrix<ControllerHandle>> {
    let controllers = controllers.into_matrix(cameras.shape(), "controllers")?;
    for (controller, camera) in controllers.iter().zip(cameras.iter()) {
        controller.add_camera(camera.clone());
    }
    Ok(controllers)
}

fn build_groups(
    groups: &[ControllerGroup],
    cameras: &Matrix<CameraHandle>,
    rule: &dyn DefaultControllerRule,
) -> Result<Matrix<ControllerHandle>> {
    let mut assigned: Vec<Option<ControllerHandle>> = vec![None; cameras.shape().len()];

    for group in groups {
        let group_cameras: Vec<CameraHandle> = group
            .cells
            .iter()
            .map(|position| cameras[*position].clone())
            .collect();
        let kind = group
            .controller_type
            .kind()
            .unwrap_or_else(|| rule.controller_for(&group_cameras));

        let mut controller = Controller::new(kind);
        for camera in group_cameras {
            controller.add_camera(camera);
        }
        log::debug!(
            target: "gridplot",
            "controller group {} -> {} over {} cell(s)",
            group.key,
            kind,
            group.cells.len()
        );

        let handle = ControllerHandle::new(controller);
        for position in &group.cells {
            if let Some(index) = cameras.shape().index_of(*position) {
                assigned[index] = Some(handle.clone());
            }
        }
    }

    Matrix::from_vec(
        cameras.shape(),
        assigned.into_iter().flatten().collect(),
        "controllers",
    )
}
