//! Controller grouping through the public figure API
//!
//! Covers:
//! - unique, synchronized, id-matrix and name-based grouping
//! - default controller derivation and explicit type conflicts
//! - validation happening before any camera is bound

use gridplot::{
    Camera, CameraHandle, CameraSpec, CanvasBackend, CellSpec, Controller, ControllerHandle,
    ControllerIds, ControllerKind, Figure, LayoutError, Matrix,
};

fn distinct_controllers(controllers: &Matrix<ControllerHandle>) -> usize {
    let mut seen: Vec<&ControllerHandle> = Vec::new();
    for controller in controllers {
        if !seen.iter().any(|c| c.ptr_eq(controller)) {
            seen.push(controller);
        }
    }
    seen.len()
}

#[test]
fn test_unique_grouping_gives_one_controller_per_cell() {
    let figure = Figure::builder().shape(2, 3).build().unwrap();
    let controllers = figure.controllers();

    assert_eq!(distinct_controllers(&controllers), 6);
    for (controller, camera) in controllers.iter().zip(figure.cameras().iter()) {
        let controller = controller.borrow();
        assert_eq!(controller.cameras().len(), 1);
        assert!(controller.cameras()[0].ptr_eq(camera));
    }
}

#[test]
fn test_sync_binds_every_camera_in_row_major_order() {
    let figure = Figure::builder()
        .shape(2, 2)
        .controller_ids(ControllerIds::Sync)
        .build()
        .unwrap();
    let controllers = figure.controllers();
    assert_eq!(distinct_controllers(&controllers), 1);

    let controller = controllers[(0, 0)].borrow();
    let cameras = figure.cameras();
    assert_eq!(controller.cameras().len(), 4);
    for (bound, camera) in controller.cameras().iter().zip(cameras.iter()) {
        assert!(bound.ptr_eq(camera));
    }
}

#[test]
fn test_name_groups_leave_other_cells_alone() {
    let figure = Figure::builder()
        .shape(2, 2)
        .names(["a", "b", "c", "d"])
        .controller_ids(ControllerIds::by_name([["a", "d"]]))
        .build()
        .unwrap();

    let a = figure.subplot_by_name("a").unwrap().controller();
    let b = figure.subplot_by_name("b").unwrap().controller();
    let c = figure.subplot_by_name("c").unwrap().controller();
    let d = figure.subplot_by_name("d").unwrap().controller();

    assert!(a.ptr_eq(d));
    assert!(!a.ptr_eq(b));
    assert!(!b.ptr_eq(c));
    assert_eq!(a.camera_count(), 2);
    assert_eq!(b.camera_count(), 1);
}

#[test]
fn test_id_matrix_grouping() {
    let figure = Figure::builder()
        .shape(2, 3)
        .controller_ids(ControllerIds::by_id([[0, 0, 1], [2, 3, 3]]))
        .build()
        .unwrap();
    let controllers = figure.controllers();

    assert_eq!(distinct_controllers(&controllers), 4);
    assert!(controllers[(0, 0)].ptr_eq(&controllers[(0, 1)]));
    assert!(controllers[(1, 1)].ptr_eq(&controllers[(1, 2)]));
    assert!(!controllers[(0, 2)].ptr_eq(&controllers[(1, 0)]));
}

#[test]
fn test_default_type_follows_group_cameras() {
    let figure = Figure::builder()
        .shape(1, 2)
        .cameras(CellSpec::each(["2d", "3d"]))
        .controller_ids(ControllerIds::Sync)
        .build()
        .unwrap();
    assert_eq!(figure.controllers()[(0, 0)].kind(), ControllerKind::Fly);

    let figure = Figure::builder()
        .shape(1, 2)
        .cameras(CellSpec::each(["2d", "3d"]))
        .build()
        .unwrap();
    let controllers = figure.controllers();
    assert_eq!(controllers[(0, 0)].kind(), ControllerKind::PanZoom);
    assert_eq!(controllers[(0, 1)].kind(), ControllerKind::Fly);
}

#[test]
fn test_conflicting_types_in_a_group_fail() {
    let err = Figure::builder()
        .shape(1, 2)
        .controller_ids(ControllerIds::Sync)
        .controller_types(CellSpec::each(["panzoom", "orbit"]))
        .build()
        .unwrap_err();
    assert!(matches!(err, LayoutError::MixedControllerType { .. }));
}

#[test]
fn test_explicit_type_broadcast_to_group() {
    let figure = Figure::builder()
        .shape(2, 2)
        .camera("3d")
        .controller_ids(ControllerIds::Sync)
        .controller_type("trackball")
        .build()
        .unwrap();
    assert_eq!(figure.controllers()[(1, 1)].kind(), ControllerKind::Trackball);
}

#[test]
fn test_invalid_inputs_are_reported() {
    let err = Figure::builder()
        .shape(2, 2)
        .controller_ids(ControllerIds::by_id([[0, 0, 1]]))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        LayoutError::ShapeMismatch {
            field: "controller_ids",
            expected: 4,
            actual: 3,
            ..
        }
    ));

    let err = Figure::builder()
        .shape(1, 2)
        .controller_ids(ControllerIds::by_name([["a"]]))
        .build()
        .unwrap_err();
    assert_eq!(err, LayoutError::MissingNames);

    let err = Figure::builder()
        .controller_type("zoom")
        .build()
        .unwrap_err();
    assert_eq!(err, LayoutError::InvalidControllerType("zoom".to_string()));

    let err = Figure::builder().shape(0, 2).build().unwrap_err();
    assert_eq!(err, LayoutError::InvalidShape { rows: 0, cols: 2 });
}

#[test]
fn test_failed_build_binds_nothing() {
    let shared = CameraHandle::new(Camera::new_2d());
    let controller = ControllerHandle::new(Controller::new(ControllerKind::PanZoom));

    let err = Figure::builder()
        .shape(2, 2)
        .camera(shared.clone())
        .controllers(CellSpec::each(vec![controller.clone(); 3]))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        LayoutError::ShapeMismatch {
            field: "controllers",
            ..
        }
    ));
    assert_eq!(controller.camera_count(), 0);

    let err = Figure::builder()
        .shape(1, 2)
        .cameras(CellSpec::each([
            CameraSpec::from(shared.clone()),
            CameraSpec::from("4d"),
        ]))
        .controller(controller.clone())
        .build()
        .unwrap_err();
    assert_eq!(err, LayoutError::InvalidCameraSpec("4d".to_string()));
    assert_eq!(controller.camera_count(), 0);

    let err = Figure::builder()
        .shape(1, 2)
        .controller(controller.clone())
        .canvas_backend(CanvasBackend::Qt)
        .build()
        .unwrap_err();
    assert_eq!(err, LayoutError::CanvasUnavailable("qt".to_string()));
    assert_eq!(controller.camera_count(), 0);
}

#[test]
fn test_shared_camera_is_bound_once_per_controller() {
    let shared = CameraHandle::new(Camera::new_3d());
    let figure = Figure::builder()
        .shape(1, 3)
        .camera(shared.clone())
        .controller_ids(ControllerIds::Sync)
        .build()
        .unwrap();

    assert!(figure.cameras().iter().all(|c| c.ptr_eq(&shared)));
    assert_eq!(figure.controllers()[(0, 0)].camera_count(), 1);
}

#[test]
fn test_resolution_is_deterministic() {
    let build = || {
        Figure::builder()
            .shape(2, 2)
            .names(["a", "b", "c", "d"])
            .controller_ids(ControllerIds::by_name([vec!["b", "c"], vec!["d"]]))
            .build()
            .unwrap()
    };
    let first = build();
    let second = build();

    let kinds = |f: &Figure| f.controllers().map(|c| (c.kind(), c.camera_count()));
    assert_eq!(kinds(&first), kinds(&second));
    assert_eq!(first.to_string(), second.to_string());
}
