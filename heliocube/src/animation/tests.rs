use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::frame::ImageFrame;
use crate::testing::{sample_cube, sample_frames, shifting_cube};

type EventLog = Rc<RefCell<Vec<String>>>;

struct Marker {
    frame: usize,
    log: EventLog,
}

impl OverlayArtifact for Marker {
    fn remove(&mut self) {
        self.log.borrow_mut().push(format!("remove {}", self.frame));
    }
}

fn marker_overlay(log: &EventLog) -> impl FnMut(&ImageFrame, usize) -> Vec<Box<dyn OverlayArtifact>> {
    let log = Rc::clone(log);
    move |_, index| {
        log.borrow_mut().push(format!("draw {index}"));
        vec![Box::new(Marker {
            frame: index,
            log: Rc::clone(&log),
        }) as Box<dyn OverlayArtifact>]
    }
}

/// Records the titles it is asked to draw.
#[derive(Default)]
struct RecordingBackend {
    titles: Vec<String>,
}

impl RenderBackend for RecordingBackend {
    type Drawable = (usize, Option<(f64, f64)>);

    fn draw(&mut self, frame: &RenderedFrame) -> Self::Drawable {
        self.titles.push(frame.title.clone());
        (frame.index, frame.norm_range)
    }
}

#[test]
fn test_render_annotates_frame() {
    let cube = sample_cube(3, 4, 2);
    let mut animator =
        CubeAnimator::new(&cube, AnimatorConfig::default(), DisplayConfig::default()).unwrap();

    assert_eq!(animator.frame_count(), 3);
    assert_eq!(animator.interval(), Duration::from_millis(200));

    let rendered = animator.render(1).unwrap();
    assert_eq!(rendered.index, 1);
    assert_eq!(rendered.title, "SDO AIA 3 171 angstrom 2011-06-07 06:33:14");
    assert_eq!(rendered.x_label, "X-position [arcsec]");
    assert_eq!(rendered.y_label, "Y-position [arcsec]");
    assert_eq!(rendered.color_map, "gray");
    assert_eq!(rendered.norm_range, Some((100.0, 107.0)));
    assert_eq!(&rendered.image, cube.frame(1).unwrap().data());
}

#[test]
fn test_render_without_annotation() {
    let cube = sample_cube(2, 2, 2);
    let config = AnimatorConfig {
        annotate: false,
        ..Default::default()
    };
    let mut animator = CubeAnimator::new(&cube, config, DisplayConfig::default()).unwrap();

    let rendered = animator.render(0).unwrap();
    assert!(rendered.title.is_empty());
    assert!(rendered.x_label.is_empty());
}

#[test]
fn test_heliographic_axis_labels() {
    let mut frames = sample_frames(2, 2, 2);
    for frame in &mut frames {
        let meta = frame.meta_mut();
        meta.insert("ctype1", "HGLN-CAR");
        meta.insert("ctype2", "HGLT-CAR");
        meta.insert("cunit1", "deg");
        meta.insert("cunit2", "deg");
        meta.insert("cmap", "sdoaia171");
    }
    let cube = FrameCollection::new(frames).unwrap();
    let mut animator =
        CubeAnimator::new(&cube, AnimatorConfig::default(), DisplayConfig::default()).unwrap();

    let rendered = animator.render(0).unwrap();
    assert_eq!(rendered.x_label, "Longitude [deg]");
    assert_eq!(rendered.y_label, "Latitude [deg]");
    assert_eq!(rendered.color_map, "sdoaia171");
}

#[test]
fn test_overlays_are_removed_before_next_frame() {
    let log = EventLog::default();
    let cube = sample_cube(3, 2, 2);
    let mut animator =
        CubeAnimator::new(&cube, AnimatorConfig::default(), DisplayConfig::default())
            .unwrap()
            .with_overlay(marker_overlay(&log));

    animator.render(0).unwrap();
    animator.render(1).unwrap();
    animator.render(2).unwrap();
    assert_eq!(
        *log.borrow(),
        vec!["draw 0", "remove 0", "draw 1", "remove 1", "draw 2"]
    );

    drop(animator);
    assert_eq!(log.borrow().last().map(String::as_str), Some("remove 2"));
}

#[test]
fn test_failed_render_keeps_overlays() {
    let log = EventLog::default();
    let cube = sample_cube(2, 2, 2);
    let mut animator =
        CubeAnimator::new(&cube, AnimatorConfig::default(), DisplayConfig::default())
            .unwrap()
            .with_overlay(marker_overlay(&log));

    animator.render(0).unwrap();
    assert!(matches!(
        animator.render(5),
        Err(Error::IndexOutOfRange { index: 5, len: 2 })
    ));
    assert_eq!(*log.borrow(), vec!["draw 0"]);

    animator.clear_overlays();
    assert_eq!(*log.borrow(), vec!["draw 0", "remove 0"]);
}

#[test]
fn test_play_hands_every_frame_to_backend() {
    let cube = sample_cube(3, 2, 2);
    let mut animator =
        CubeAnimator::new(&cube, AnimatorConfig::default(), DisplayConfig::default()).unwrap();
    let mut backend = RecordingBackend::default();

    let drawables = animator.play(&mut backend).unwrap();
    assert_eq!(
        drawables,
        vec![
            (0, Some((0.0, 3.0))),
            (1, Some((100.0, 103.0))),
            (2, Some((200.0, 203.0)))
        ]
    );
    assert_eq!(backend.titles.len(), 3);
    assert!(backend.titles[2].ends_with("06:33:26"));
}

#[test]
fn test_resample_before_playback() {
    let cube = sample_cube(2, 8, 4);
    let config = AnimatorConfig {
        resample: Some([0.5, 0.25]),
        ..Default::default()
    };
    let mut animator = CubeAnimator::new(&cube, config, DisplayConfig::default()).unwrap();

    assert_eq!(animator.cube().dimensions(), Shape::new(4, 1));
    assert_eq!(animator.render(1).unwrap().image.dimensions(), (4, 1));
    // The source cube keeps its frames.
    assert_eq!(cube.dimensions(), Shape::new(8, 4));
}

#[test]
fn test_resample_rejects_bad_fraction() {
    let cube = sample_cube(2, 4, 4);
    let config = AnimatorConfig {
        resample: Some([0.0, 0.5]),
        ..Default::default()
    };
    assert!(matches!(
        CubeAnimator::new(&cube, config.clone(), DisplayConfig::default()),
        Err(Error::InvalidArgument { name: "resample", .. })
    ));
    assert!(matches!(config.validate(), Err(Error::Config(_))));
}

#[test]
fn test_custom_time_format_in_title() {
    let cube = sample_cube(1, 2, 2);
    let display = DisplayConfig::new("%H:%M").unwrap();
    let mut animator = CubeAnimator::new(&cube, AnimatorConfig::default(), display).unwrap();
    assert!(animator.render(0).unwrap().title.ends_with("171 angstrom 06:33"));
}

#[test]
fn test_resample_rechecks_shape() {
    let cube = shifting_cube(3, 8, 4);
    cube.frame(1).unwrap().shift();

    let config = AnimatorConfig {
        resample: Some([0.5, 0.5]),
        ..Default::default()
    };
    let result = CubeAnimator::new(&cube, config, DisplayConfig::default());
    assert!(matches!(
        result,
        Err(Error::ShapeMismatch { index: Some(1), .. })
    ));
}
