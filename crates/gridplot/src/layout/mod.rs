//! Grid resolution: shape and names, cameras, controller groups, subplots

pub mod cameras;
pub mod controllers;
pub mod grid;
pub mod subplot;

pub use cameras::{resolve_cameras, CameraKind, CameraSpec};
pub use controllers::{
    plan_groups, resolve_controller_types, resolve_controllers, resolve_group_keys,
    ControllerGroup, ControllerIds, ControllerRequest, ControllerType, DefaultControllerRule,
    FovDefaultRule, GroupKey,
};
pub use grid::{CellSpec, GridShape, GridSpec, Matrix};
pub use subplot::{create_subplots, Subplot};
