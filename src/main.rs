use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use dicomcrop::dicom::{self, ViewContainer};
use dicomcrop::draw::CommittedRegion;
use dicomcrop::export::{self, ExportTarget};
use dicomcrop::input::{MouseButton, PointerPoint, SelectionMode};
use dicomcrop::viewer::{ThumbnailBoard, Viewport, render_grayscale};
use dicomcrop::{Config, Viewer, ViewerOptions};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "dicomcrop")]
#[command(
    version,
    about = "DICOM viewer core with rectangle and polygon crop-region selection"
)]
struct Cli {
    /// DICOM file to open
    #[arg(long, short = 'i', value_name = "FILE")]
    input: Option<PathBuf>,

    /// Display surface size
    #[arg(
        long,
        value_name = "WxH",
        default_value = "512x512",
        value_parser = parse_size
    )]
    display: (i32, i32),

    /// Layout size of the hosting element when pointer coordinates differ from
    /// surface pixels
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    element: Option<(i32, i32)>,

    /// Selection mode (rectangle or polygon)
    #[arg(long, short = 'm', value_name = "MODE")]
    mode: Option<String>,

    /// Replay a rectangle drag from (X1,Y1) to (X2,Y2)
    #[arg(
        long,
        value_name = "X1,Y1,X2,Y2",
        allow_hyphen_values = true,
        value_parser = parse_drag
    )]
    drag: Option<[f64; 4]>,

    /// Add a polygon vertex; repeat for each point, the polygon is closed afterwards
    #[arg(
        long = "point",
        value_name = "X,Y",
        action = ArgAction::Append,
        allow_hyphen_values = true,
        value_parser = parse_point
    )]
    points: Vec<PointerPoint>,

    /// Window center override
    #[arg(long, value_name = "C", requires = "window_width", allow_hyphen_values = true)]
    window_center: Option<f64>,

    /// Window width override
    #[arg(long, value_name = "W", requires = "window_center")]
    window_width: Option<f64>,

    /// Invert grayscale
    #[arg(long, action = ArgAction::SetTrue)]
    invert: bool,

    /// Zoom factor applied after fitting the image to the display
    #[arg(long, value_name = "S")]
    zoom: Option<f64>,

    /// Write the preview of the committed region as PNG
    #[arg(long, value_name = "PNG")]
    preview_out: Option<PathBuf>,

    /// Also write the preview into the configured export directory
    #[arg(long, action = ArgAction::SetTrue)]
    export: bool,

    /// Write the selection overlay as PNG
    #[arg(long, value_name = "PNG")]
    overlay_out: Option<PathBuf>,

    /// Write the rendered display surface as PNG
    #[arg(long, value_name = "PNG")]
    display_out: Option<PathBuf>,

    /// Sort DICOM files into view containers
    #[arg(long, value_name = "FILE", num_args = 1.., conflicts_with = "input")]
    sort: Vec<PathBuf>,

    /// With --sort, write thumbnails under per-container directories
    #[arg(long, value_name = "DIR", requires = "sort")]
    thumbnails: Option<PathBuf>,

    /// Config file to use instead of ~/.config/dicomcrop/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write a documented default config file and exit
    #[arg(long, action = ArgAction::SetTrue)]
    init_config: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if cli.init_config {
        let path = Config::create_default_file(cli.config.as_deref())?;
        println!("Created {}", path.display());
        return Ok(());
    }

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if !cli.sort.is_empty() {
        sort_files(&cli, &config)
    } else if let Some(input) = cli.input.as_deref() {
        view_file(&cli, &config, input)
    } else {
        println!("dicomcrop: DICOM viewer core with crop-region selection");
        println!();
        println!("Usage:");
        println!(
            "  dicomcrop --input FILE [--drag X1,Y1,X2,Y2 | --point X,Y ...] \
             [--preview-out PNG] [--export]"
        );
        println!("  dicomcrop --sort FILE... [--thumbnails DIR]");
        println!("  dicomcrop --help");
        println!();
        println!("Examples:");
        println!("  dicomcrop -i scan.dcm --drag 50,50,200,150 --preview-out crop.png");
        println!(
            "  dicomcrop -i scan.dcm --point 0,0 --point 100,0 --point 50,100 \
             --overlay-out mask.png"
        );
        Ok(())
    }
}

/// Opens one image, replays the requested selection and writes the outputs.
fn view_file(cli: &Cli, config: &Config, input: &Path) -> Result<()> {
    if cli.drag.is_some() && !cli.points.is_empty() {
        bail!("--drag and --point cannot be combined");
    }

    let mut options = ViewerOptions::from_config(config);
    if let Some(name) = cli.mode.as_deref() {
        options.mode = SelectionMode::from_name(name)
            .with_context(|| format!("Unknown selection mode '{}'", name))?;
    }
    if let (Some(center), Some(width)) = (cli.window_center, cli.window_width) {
        options.window = Some((center, width));
    }
    options.invert ^= cli.invert;

    let (width, height) = cli.display;
    let mut viewer = Viewer::new(options, width, height)?;
    viewer
        .load_file(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    if let Some((element_w, element_h)) = cli.element {
        viewer.set_element_size(element_w as f64, element_h as f64)?;
    }
    if let Some(zoom) = cli.zoom {
        viewer.zoom_by(zoom)?;
    }

    if let Some(image) = viewer.image() {
        println!(
            "{}: {}x{} {} ({})",
            input.display(),
            image.columns,
            image.rows,
            image.formatted_tags(),
            image.container().id()
        );
    }

    if let Some([x1, y1, x2, y2]) = cli.drag {
        viewer.set_mode(SelectionMode::Rectangle);
        viewer.on_mouse_press(MouseButton::Left, PointerPoint::new(x1, y1));
        viewer.on_mouse_motion(PointerPoint::new(x2, y2));
        let outcome = viewer.on_mouse_release(MouseButton::Left, PointerPoint::new(x2, y2));
        log::info!("Rectangle drag: {:?}", outcome);
    } else if !cli.points.is_empty() {
        viewer.set_mode(SelectionMode::Polygon);
        for point in &cli.points {
            viewer.on_mouse_press(MouseButton::Left, *point);
        }
        let outcome = viewer.on_double_click();
        log::info!("Polygon close: {:?}", outcome);
    }

    match viewer.controller().committed() {
        Some(CommittedRegion::Rectangle(rect)) => println!(
            "committed rectangle: x={} y={} width={} height={}",
            rect.x, rect.y, rect.width, rect.height
        ),
        Some(CommittedRegion::Polygon(polygon)) => {
            let points: Vec<String> = polygon
                .points()
                .iter()
                .map(|p| format!("({},{})", p.x, p.y))
                .collect();
            println!("committed polygon: {}", points.join(" "));
        }
        None => println!("no region committed"),
    }
    if let Some(preview) = viewer.preview() {
        println!("preview: {}x{}", preview.width(), preview.height());
    }

    if let Some(path) = cli.display_out.as_deref() {
        let display = viewer.display().context("Nothing is displayed")?;
        export::save_surface_png(display, path)?;
    }
    if let Some(path) = cli.overlay_out.as_deref() {
        export::save_surface_png(viewer.overlay().surface(), path)?;
    }
    if let Some(path) = cli.preview_out.as_deref() {
        let preview = viewer
            .preview()
            .context("No preview to write: no rectangle region is committed")?;
        export::save_surface_png(preview.surface(), path)?;
    }
    if cli.export {
        let preview = viewer
            .preview()
            .context("Nothing to export: no rectangle region is committed")?;
        let path = ExportTarget::from_config(&config.export).export(preview.surface())?;
        println!("exported: {}", path.display());
    }

    Ok(())
}

/// Prints the view container of each file and optionally writes thumbnails.
fn sort_files(cli: &Cli, config: &Config) -> Result<()> {
    let mut board = ThumbnailBoard::new(config.thumbnails.size);
    let mut failures = 0usize;

    for path in &cli.sort {
        let image = match dicom::load_image(path) {
            Ok(image) => image,
            Err(err) => {
                eprintln!("{}: {}", path.display(), err);
                failures += 1;
                continue;
            }
        };
        let container = image.container();
        println!("{}\t{}", path.display(), container.id());

        if cli.thumbnails.is_some() {
            let mut viewport = Viewport::for_image(&image, 0, 0);
            viewport.invert ^= config.viewport.invert;
            let gray = render_grayscale(&image, &viewport)?;
            let label = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            board.add(label, container, &gray)?;
        }
    }

    if let Some(dir) = cli.thumbnails.as_deref() {
        for container in ViewContainer::ALL {
            for (index, thumbnail) in board.thumbnails(container).iter().enumerate() {
                let path = dir
                    .join(container.label())
                    .join(format!("{:03}_{}.png", index, thumbnail.label));
                export::save_surface_png(thumbnail.surface(), &path)?;
            }
        }
        println!("wrote {} thumbnails to {}", board.len(), dir.display());
    }

    if failures > 0 {
        bail!("{} of {} files could not be read", failures, cli.sort.len());
    }
    Ok(())
}

fn parse_size(value: &str) -> Result<(i32, i32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{}'", value))?;
    let w: i32 = w.trim().parse().map_err(|_| format!("invalid width '{}'", w))?;
    let h: i32 = h.trim().parse().map_err(|_| format!("invalid height '{}'", h))?;
    if w <= 0 || h <= 0 {
        return Err(format!("size must be positive, got {}x{}", w, h));
    }
    Ok((w, h))
}

fn parse_numbers<const N: usize>(value: &str) -> Result<[f64; N], String> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != N {
        return Err(format!(
            "expected {} comma-separated numbers, got '{}'",
            N, value
        ));
    }
    let mut numbers = [0.0; N];
    for (slot, part) in numbers.iter_mut().zip(parts) {
        *slot = part
            .trim()
            .parse()
            .map_err(|_| format!("invalid number '{}'", part))?;
    }
    Ok(numbers)
}

fn parse_drag(value: &str) -> Result<[f64; 4], String> {
    parse_numbers::<4>(value)
}

fn parse_point(value: &str) -> Result<PointerPoint, String> {
    let [x, y] = parse_numbers::<2>(value)?;
    Ok(PointerPoint::new(x, y))
}
