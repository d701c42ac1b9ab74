//! End-to-end batch runs against real PNG files in temp directories.
//!
//! Each test lays out `originals/`, `edited/`, `diffs/` and `rebuilt/`,
//! generates diffs, applies them, and checks what landed on disk.

use image::{Rgba, RgbaImage};
use img_delta::batch::{self, BatchEvent, BatchStats, FileError};
use img_delta::config::{Invocation, Mode};
use img_delta::diff::DiffError;
use img_delta::imaging::{Bounds, Color, Image, ImageBackend, Palette, RustBackend};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Dirs {
    _tmp: TempDir,
    originals: PathBuf,
    edited: PathBuf,
    diffs: PathBuf,
    rebuilt: PathBuf,
}

fn setup() -> Dirs {
    let tmp = TempDir::new().unwrap();
    let dirs = Dirs {
        originals: tmp.path().join("originals"),
        edited: tmp.path().join("edited"),
        diffs: tmp.path().join("diffs"),
        rebuilt: tmp.path().join("rebuilt"),
        _tmp: tmp,
    };
    for dir in [&dirs.originals, &dirs.edited, &dirs.diffs, &dirs.rebuilt] {
        fs::create_dir(dir).unwrap();
    }
    dirs
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Rgba([r, g, b, 255])
}

fn truecolor(width: u32, height: u32, pixels: &[Color]) -> Image {
    let raw = pixels.iter().flat_map(|c| c.0).collect();
    Image::from_rgba(RgbaImage::from_raw(width, height, raw).unwrap())
}

fn traffic_palette() -> Palette {
    Palette::new(vec![Rgba([0, 0, 0, 0]), rgb(255, 0, 0), rgb(0, 255, 0)]).unwrap()
}

fn write(path: impl AsRef<Path>, image: &Image) {
    RustBackend::new().write_image(image, path.as_ref()).unwrap();
}

fn read(path: impl AsRef<Path>) -> Image {
    RustBackend::new().read_image(path.as_ref()).unwrap()
}

fn run(mode: Mode, input: &Path, compare: &Path, output: &Path) -> (BatchStats, Vec<BatchEvent>) {
    let invocation = Invocation {
        mode,
        input: input.to_path_buf(),
        compare: compare.to_path_buf(),
        output: output.to_path_buf(),
    };
    let mut events = Vec::new();
    let stats = batch::run(&invocation, |e| events.push(e)).unwrap();
    (stats, events)
}

fn generate_then_apply(dirs: &Dirs) {
    run(Mode::Generate, &dirs.originals, &dirs.edited, &dirs.diffs);
    run(Mode::Apply, &dirs.originals, &dirs.diffs, &dirs.rebuilt);
}

#[test]
fn truecolor_change_round_trips() {
    let dirs = setup();
    write(dirs.originals.join("a.png"), &truecolor(1, 1, &[rgb(10, 20, 30)]));
    write(dirs.edited.join("a.png"), &truecolor(1, 1, &[rgb(40, 50, 60)]));

    generate_then_apply(&dirs);

    assert_eq!(read(dirs.diffs.join("a.png")).at(0, 0), rgb(40, 50, 60));
    assert_eq!(read(dirs.rebuilt.join("a.png")).at(0, 0), rgb(40, 50, 60));
}

#[test]
fn unchanged_truecolor_diff_is_transparent() {
    let dirs = setup();
    let image = truecolor(1, 1, &[rgb(10, 20, 30)]);
    write(dirs.originals.join("a.png"), &image);
    write(dirs.edited.join("a.png"), &image);

    generate_then_apply(&dirs);

    assert_eq!(read(dirs.diffs.join("a.png")).at(0, 0), Rgba([0, 0, 0, 0]));
    assert_eq!(read(dirs.rebuilt.join("a.png")), image);
}

#[test]
fn palette_round_trip_keeps_palette_on_disk() {
    let dirs = setup();
    let bounds = Bounds::from_size(2, 1);
    let original = Image::from_indices(bounds, traffic_palette(), vec![1, 1]).unwrap();
    let edited = Image::from_indices(bounds, traffic_palette(), vec![1, 2]).unwrap();
    write(dirs.originals.join("p.png"), &original);
    write(dirs.edited.join("p.png"), &edited);

    generate_then_apply(&dirs);

    let diff = read(dirs.diffs.join("p.png"));
    assert_eq!(diff.palette(), Some(&traffic_palette()));
    assert_eq!(diff.indices(), Some(&[0u8, 2][..]));
    assert_eq!(read(dirs.rebuilt.join("p.png")), edited);
}

#[test]
fn truecolor_edit_of_palette_original_rebuilds_same_colors() {
    let dirs = setup();
    let bounds = Bounds::from_size(2, 1);
    let original = Image::from_indices(bounds, traffic_palette(), vec![1, 1]).unwrap();
    let edited = truecolor(2, 1, &[rgb(255, 0, 0), rgb(0, 255, 0)]);
    write(dirs.originals.join("p.png"), &original);
    write(dirs.edited.join("p.png"), &edited);

    generate_then_apply(&dirs);

    let rebuilt = read(dirs.rebuilt.join("p.png"));
    assert_eq!(rebuilt.palette(), Some(&traffic_palette()));
    assert_eq!(rebuilt.indices(), Some(&[1u8, 2][..]));
    assert!(rebuilt.same_pixels(&edited));
}

#[test]
fn sentinel_edit_restores_original() {
    let dirs = setup();
    write(dirs.originals.join("a.png"), &truecolor(1, 1, &[rgb(5, 5, 5)]));
    write(dirs.edited.join("a.png"), &truecolor(1, 1, &[Rgba([0, 0, 0, 0])]));

    generate_then_apply(&dirs);

    assert_eq!(read(dirs.rebuilt.join("a.png")).at(0, 0), rgb(5, 5, 5));
}

#[test]
fn bounds_mismatch_writes_nothing_and_continues() {
    let dirs = setup();
    write(dirs.originals.join("a.png"), &Image::truecolor(Bounds::from_size(2, 2)));
    write(dirs.edited.join("a.png"), &Image::truecolor(Bounds::from_size(2, 3)));
    write(dirs.originals.join("b.png"), &truecolor(1, 1, &[rgb(1, 1, 1)]));
    write(dirs.edited.join("b.png"), &truecolor(1, 1, &[rgb(2, 2, 2)]));

    let (stats, events) = run(Mode::Generate, &dirs.originals, &dirs.edited, &dirs.diffs);

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.written, 1);
    assert!(!dirs.diffs.join("a.png").exists());
    assert!(dirs.diffs.join("b.png").exists());
    assert!(events.iter().any(|e| matches!(
        e,
        BatchEvent::Failed {
            name,
            error: FileError::Transform(DiffError::BoundsMismatch { .. })
        } if name == "a.png"
    )));
}

#[test]
fn missing_pair_is_skipped() {
    let dirs = setup();
    let image = truecolor(1, 1, &[rgb(1, 2, 3)]);
    write(dirs.originals.join("a.png"), &image);
    write(dirs.originals.join("b.png"), &image);
    write(dirs.edited.join("a.png"), &image);

    let (stats, _) = run(Mode::Generate, &dirs.originals, &dirs.edited, &dirs.diffs);

    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.failed, 0);
    let mut names: Vec<_> = fs::read_dir(&dirs.diffs)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    names.sort();
    assert_eq!(names, vec![OsString::from("a.png")]);
}

#[test]
fn corrupt_edit_is_reported() {
    let dirs = setup();
    write(dirs.originals.join("a.png"), &truecolor(1, 1, &[rgb(1, 2, 3)]));
    fs::write(dirs.edited.join("a.png"), b"not a png").unwrap();

    let (stats, events) = run(Mode::Generate, &dirs.originals, &dirs.edited, &dirs.diffs);

    assert_eq!(stats.failed, 1);
    assert!(events.iter().any(|e| matches!(
        e,
        BatchEvent::Failed {
            error: FileError::Read { .. },
            ..
        }
    )));
    assert!(!dirs.diffs.join("a.png").exists());
}

#[test]
fn missing_output_directory_reports_write_failures() {
    let dirs = setup();
    let image = truecolor(1, 1, &[rgb(1, 2, 3)]);
    write(dirs.originals.join("a.png"), &image);
    write(dirs.edited.join("a.png"), &image);

    let (stats, _) = run(
        Mode::Generate,
        &dirs.originals,
        &dirs.edited,
        &dirs.diffs.join("does-not-exist"),
    );

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.written, 0);
}

#[test]
fn missing_input_directory_is_fatal() {
    let dirs = setup();
    let invocation = Invocation {
        mode: Mode::Apply,
        input: dirs.originals.join("nope"),
        compare: dirs.diffs.clone(),
        output: dirs.rebuilt.clone(),
    };

    assert!(batch::run(&invocation, |_| {}).is_err());
}
