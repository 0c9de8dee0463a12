//! Subplot grids with shared cameras and controllers
//!
//! A [`Figure`] is a `rows x cols` grid of [`Subplot`]s. Building one resolves
//! a camera for every cell, groups cells onto shared controllers and binds
//! each camera to its group's controller:
//!
//! ```
//! use gridplot::{ControllerIds, Figure};
//!
//! let figure = Figure::builder()
//!     .shape(2, 2)
//!     .names(["a", "b", "c", "d"])
//!     .controller_ids(ControllerIds::by_name([["a", "d"]]))
//!     .build()?;
//!
//! let a = figure.subplot_by_name("a")?.controller();
//! let d = figure.subplot_by_name("d")?.controller();
//! assert!(a.ptr_eq(d));
//! # Ok::<(), gridplot::LayoutError>(())
//! ```
//!
//! Declarative figures can be loaded with [`FigureConfig`].

pub mod config;
pub mod core;
pub mod error;
pub mod figure;
pub mod layout;

pub use crate::core::{
    BoundingBox, Camera, CameraHandle, CanvasBackend, Controller, ControllerHandle,
    ControllerKind, EventHandler, Graphic, GraphicKind, Modifiers, MouseButton, OffscreenCanvas,
    OffscreenRenderer, PlotEvent, ProjectionType, RenderSurface, Renderer, Viewport,
    DEFAULT_3D_FOV,
};
pub use config::{load_config, ControllerIdsConfig, FigureConfig, TokenSpec, CONFIG_ENV};
pub use error::{LayoutError, Result};
pub use figure::{AnimationId, AnimationPhase, Figure, FigureBuilder, ShowOptions, DEFAULT_SIZE};
pub use layout::{
    CameraKind, CameraSpec, CellSpec, ControllerIds, ControllerType, DefaultControllerRule,
    FovDefaultRule, GridShape, GridSpec, GroupKey, Matrix, Subplot,
};
