mod common;

use cairo::{Context, Format, ImageSurface};
use dicomcrop::dicom::DicomImage;
use dicomcrop::draw::{
    CommittedRegion, OverlayStyle, OverlaySurface, PreviewGenerator, RectangleRegion,
};
use dicomcrop::input::{
    MouseButton, PointerPoint, SelectionController, SelectionMode, SelectionOutcome,
};
use dicomcrop::util::SurfaceMapping;
use dicomcrop::{Config, Viewer, ViewerOptions};
use tempfile::TempDir;

fn surface_with_context(width: i32, height: i32) -> (ImageSurface, Context) {
    let surface = ImageSurface::create(Format::ARgb32, width, height).unwrap();
    let ctx = Context::new(&surface).unwrap();
    (surface, ctx)
}

fn surface_has_pixels(surface: &mut ImageSurface) -> bool {
    surface
        .data()
        .map(|data| data.iter().any(|byte| *byte != 0))
        .unwrap_or(false)
}

fn alpha_at(surface: &mut ImageSurface, x: i32, y: i32) -> u8 {
    let stride = surface.stride() as usize;
    let data = surface.data().unwrap();
    let offset = y as usize * stride + x as usize * 4;
    let pixel = u32::from_ne_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ]);
    (pixel >> 24) as u8
}

fn p(x: f64, y: f64) -> PointerPoint {
    PointerPoint::new(x, y)
}

#[test]
fn committed_rectangle_masks_outside_and_previews_inside() {
    let mut controller = SelectionController::default();
    controller.on_mouse_press(MouseButton::Left, p(50.0, 50.0));
    controller.on_mouse_motion(p(200.0, 150.0));
    assert_eq!(
        controller.on_mouse_release(MouseButton::Left, p(200.0, 150.0)),
        SelectionOutcome::Committed
    );
    assert_eq!(
        controller.committed(),
        Some(&CommittedRegion::Rectangle(RectangleRegion {
            x: 50.0,
            y: 50.0,
            width: 150.0,
            height: 100.0,
        }))
    );

    let mapping = SurfaceMapping::identity();
    let mut overlay = OverlaySurface::new(300, 200).unwrap();
    overlay
        .render(controller.active_shape(), &mapping, &OverlayStyle::default())
        .unwrap();
    let surface = overlay.surface_mut();
    assert!((126..=129).contains(&alpha_at(surface, 10, 10)));
    assert_eq!(alpha_at(surface, 120, 100), 0);

    let (mut source, ctx) = surface_with_context(300, 200);
    ctx.set_source_rgb(0.8, 0.2, 0.2);
    ctx.paint().unwrap();
    drop(ctx);

    let mut preview = PreviewGenerator::default()
        .generate(controller.committed(), &mapping, Some(&source))
        .unwrap();
    assert_eq!((preview.width(), preview.height()), (150, 100));
    assert!(surface_has_pixels(preview.surface_mut()));
    assert!(surface_has_pixels(&mut source));
}

#[test]
fn undersized_drag_erases_previous_mask() {
    let pixels = (0..128 * 128).map(|i| (i % 128) as i32).collect();
    let image = DicomImage::from_pixels(128, 128, pixels).unwrap();
    let mut viewer = Viewer::new(ViewerOptions::default(), 128, 128).unwrap();
    viewer.load_image(image).unwrap();

    viewer.on_mouse_press(MouseButton::Left, p(20.0, 20.0));
    viewer.on_mouse_motion(p(100.0, 90.0));
    viewer.on_mouse_release(MouseButton::Left, p(100.0, 90.0));
    assert!(surface_has_pixels(viewer.overlay_mut().surface_mut()));
    assert!(viewer.preview().is_some());

    viewer.on_mouse_press(MouseButton::Left, p(10.0, 10.0));
    viewer.on_mouse_motion(p(15.0, 12.0));
    assert!(surface_has_pixels(viewer.overlay_mut().surface_mut()));
    assert_eq!(
        viewer.on_mouse_release(MouseButton::Left, p(15.0, 12.0)),
        SelectionOutcome::Discarded
    );

    assert!(viewer.controller().committed().is_none());
    assert!(viewer.preview().is_none());
    assert!(!surface_has_pixels(viewer.overlay_mut().surface_mut()));
}

#[test]
fn closed_triangle_has_wrapping_edge() {
    let mut controller = SelectionController::new(SelectionMode::Polygon, 10.0);
    for point in [p(0.0, 0.0), p(100.0, 0.0), p(50.0, 100.0)] {
        controller.on_mouse_press(MouseButton::Left, point);
    }
    assert_eq!(controller.on_double_click(), SelectionOutcome::Committed);

    let Some(CommittedRegion::Polygon(polygon)) = controller.committed() else {
        panic!("expected a committed polygon");
    };
    assert_eq!(
        polygon.edges(),
        vec![
            (p(0.0, 0.0), p(100.0, 0.0)),
            (p(100.0, 0.0), p(50.0, 100.0)),
            (p(50.0, 100.0), p(0.0, 0.0)),
        ]
    );
}

#[test]
fn viewer_loads_file_and_follows_window_changes() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("scan.dcm");
    common::write_gradient_dicom(&path, 256, 256, Some("L"), Some("CC"));

    let options = ViewerOptions::from_config(&Config::default());
    let mut viewer = Viewer::new(options, 256, 256).unwrap();
    viewer.load_file(&path).unwrap();
    assert!(viewer.status_message().is_none());
    assert_eq!(
        viewer.image().map(|image| image.formatted_tags()),
        Some("L-CC".to_string())
    );

    viewer.on_mouse_press(MouseButton::Left, p(20.0, 20.0));
    viewer.on_mouse_motion(p(220.0, 120.0));
    viewer.on_mouse_release(MouseButton::Left, p(220.0, 120.0));
    let before = viewer
        .preview_mut()
        .map(|preview| preview.surface_mut().data().unwrap().to_vec())
        .unwrap();

    viewer.set_window_level(200.0, 10.0).unwrap();
    let after = viewer
        .preview_mut()
        .map(|preview| preview.surface_mut().data().unwrap().to_vec())
        .unwrap();

    assert_ne!(before, after);
    assert_eq!(
        viewer.preview().map(|p| (p.width(), p.height())),
        Some((200, 100))
    );
}

#[test]
fn failed_load_keeps_previous_image() {
    let temp = TempDir::new().unwrap();
    let good = temp.path().join("good.dcm");
    common::write_gradient_dicom(&good, 32, 32, None, None);
    let bad = temp.path().join("bad.dcm");
    std::fs::write(&bad, b"not a dicom file").unwrap();

    let mut viewer = Viewer::new(ViewerOptions::default(), 64, 64).unwrap();
    viewer.load_file(&good).unwrap();
    assert!(viewer.load_file(&bad).is_err());

    assert!(viewer.status_message().is_some());
    assert_eq!(viewer.image().map(|image| image.columns), Some(32));
}
