use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use pdf_cover::{
    CompositionSession, DocumentInfo, ExportKind, ExportOptions, ExportPipeline, ImageEncoding,
    MergeRequest, PageRasterizer, Size,
};
use pdf_cover::raster::PdfiumRasterizer;
use pdf_cover_runtime::{ThumbnailChannel, WorkerEvent};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pdfcover", about = "Cover and citation page composition", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show page count and page sizes
    Info {
        /// Input PDF file
        input: PathBuf,
    },

    /// Copy citation pages (and optionally a cover page) into a new PDF
    Merge {
        /// Input PDF file
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Citation pages, 1-based (e.g. "1,3-5")
        #[arg(short, long, value_parser = parse_pages)]
        pages: ::std::vec::Vec<usize>,

        /// Cover page, 1-based
        #[arg(short, long, value_parser = parse_page)]
        cover: Option<usize>,

        /// Where the cover is inserted
        #[arg(long, default_value = "top", value_enum)]
        placement: PlacementArg,
    },

    /// Layer a cover page over a citation page and export the result
    Compose {
        /// Input PDF file
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Citation page shown underneath, 1-based
        #[arg(short, long, value_parser = parse_page)]
        background: usize,

        /// Cover page drawn on top, 1-based
        #[arg(short, long, value_parser = parse_page)]
        cover: usize,

        /// Preview container the placement is expressed in (WIDTHxHEIGHT)
        #[arg(long, default_value = "500x600", value_parser = parse_size)]
        container: Size,

        /// Overlay left edge in container pixels (default: top-right corner)
        #[arg(short)]
        x: Option<f32>,

        /// Overlay top edge in container pixels (default: top-right corner)
        #[arg(short)]
        y: Option<f32>,

        /// Overlay scale relative to the cover's intrinsic size
        #[arg(short, long)]
        scale: Option<f32>,

        /// What to export
        #[arg(long, default_value = "screen", value_enum)]
        kind: KindArg,

        /// Resolution multiplier (defaults depend on the export kind)
        #[arg(short, long)]
        quality: Option<f32>,

        /// Raster encoding for image exports
        #[arg(long, default_value = "png", value_enum)]
        format: FormatArg,

        /// JPEG quality (1-100)
        #[arg(long, default_value = "90")]
        jpeg_quality: u8,

        /// Export options JSON file; command-line flags take precedence
        #[arg(long)]
        options: Option<PathBuf>,
    },

    /// Render page thumbnails as PNG files
    Thumbnails {
        /// Input PDF file
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Thumbnail width in pixels
        #[arg(short, long, default_value = "200")]
        width: u32,

        /// Pages written per batch
        #[arg(long, default_value = "4")]
        batch_size: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PlacementArg {
    Top,
    TopLeft,
    TopRight,
    Center,
    Left,
    Right,
    Bottom,
    BottomLeft,
    BottomRight,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    /// Screen-resolution image
    Screen,
    /// High-resolution image
    Hq,
    /// Single-page PDF
    Pdf,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
}

impl From<PlacementArg> for pdf_cover::CoverPlacement {
    fn from(arg: PlacementArg) -> Self {
        match arg {
            PlacementArg::Top => Self::Top,
            PlacementArg::TopLeft => Self::TopLeft,
            PlacementArg::TopRight => Self::TopRight,
            PlacementArg::Center => Self::Center,
            PlacementArg::Left => Self::Left,
            PlacementArg::Right => Self::Right,
            PlacementArg::Bottom => Self::Bottom,
            PlacementArg::BottomLeft => Self::BottomLeft,
            PlacementArg::BottomRight => Self::BottomRight,
        }
    }
}

impl From<KindArg> for ExportKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Screen => Self::ScreenImage,
            KindArg::Hq => Self::HighFidelityImage,
            KindArg::Pdf => Self::Document,
        }
    }
}

/// Parse a 1-based page number into a page index
fn parse_page(s: &str) -> std::result::Result<usize, String> {
    let page: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a page number"))?;
    page.checked_sub(1)
        .ok_or_else(|| "page numbers start at 1".to_string())
}

/// Parse a list like "1,3-5" into page indices
fn parse_pages(s: &str) -> std::result::Result<Vec<usize>, String> {
    let mut pages = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (parse_page(start)?, parse_page(end)?);
                if start > end {
                    return Err(format!("range '{part}' runs backwards"));
                }
                pages.extend(start..=end);
            }
            None => pages.push(parse_page(part)?),
        }
    }
    Ok(pages)
}

fn parse_size(s: &str) -> std::result::Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let width: f32 = w.trim().parse().map_err(|_| format!("bad width '{w}'"))?;
    let height: f32 = h.trim().parse().map_err(|_| format!("bad height '{h}'"))?;
    if !(width > 0.0 && height > 0.0) {
        return Err("container must have a positive size".to_string());
    }
    Ok(Size::new(width, height))
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // Use RUST_LOG if set, otherwise info for our crates
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pdfcover=info,pdf_cover=info,pdf_cover_runtime=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(filter)
        .init();
}

async fn open_rasterizer(input: &Path) -> Result<PdfiumRasterizer> {
    let bytes = tokio::fs::read(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    Ok(PdfiumRasterizer::from_bytes(bytes)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input } => {
            let bytes = tokio::fs::read(&input)
                .await
                .with_context(|| format!("reading {}", input.display()))?;
            let info = DocumentInfo::from_bytes(&bytes)?;
            println!("{}: {} pages", input.display(), info.page_count());
            for (index, size) in info.page_sizes.iter().enumerate() {
                println!(
                    "  Page {}: {:.1} x {:.1} pt",
                    index + 1,
                    size.width,
                    size.height
                );
            }
        }

        Commands::Merge {
            input,
            output,
            pages,
            cover,
            placement,
        } => {
            let mut request = MergeRequest::new(pages);
            if let Some(cover) = cover {
                request = request.with_cover(cover, placement.into());
            }
            let bytes = pdf_cover::merge_file(&input, &request).await?;
            tokio::fs::write(&output, bytes).await?;
            println!("Merged → {}", output.display());
        }

        Commands::Compose {
            input,
            output,
            background,
            cover,
            container,
            x,
            y,
            scale,
            kind,
            quality,
            format,
            jpeg_quality,
            options,
        } => {
            let mut export_options = match options {
                Some(path) => ExportOptions::load(&path).await?,
                None => ExportOptions::default(),
            };
            export_options.encoding = match format {
                FormatArg::Png => ImageEncoding::Png,
                FormatArg::Jpeg => ImageEncoding::Jpeg {
                    quality: jpeg_quality,
                },
            };
            export_options.validate()?;

            let rasterizer = open_rasterizer(&input).await?;
            let mut session =
                CompositionSession::new(rasterizer.info().clone(), export_options.limits);
            session.toggle_citation(background)?;
            session.fit_to_container(container);
            session.set_cover(cover)?;
            if let Some(scale) = scale {
                session.scale_overlay(scale);
            }
            if x.is_some() || y.is_some() {
                let current = session
                    .transform()
                    .map(|t| t.position())
                    .context("no cover placed")?;
                session.move_overlay(x.unwrap_or(current.x), y.unwrap_or(current.y));
            }
            let scene = session.scene()?;

            let pipeline = ExportPipeline::new(Arc::new(rasterizer), export_options);
            let artifact = pipeline.export_as(&scene, kind.into(), quality).await?;
            for placeholder in &artifact.report.placeholders {
                tracing::warn!(page = placeholder.page + 1, "{}", placeholder.reason);
            }
            tokio::fs::write(&output, &artifact.bytes).await?;
            println!(
                "Composed {}x{} {} → {}",
                artifact.width,
                artifact.height,
                artifact.mime_type,
                output.display()
            );
        }

        Commands::Thumbnails {
            input,
            output,
            width,
            batch_size,
        } => {
            let rasterizer = open_rasterizer(&input).await?;
            let total_pages = rasterizer.page_count();
            tokio::fs::create_dir_all(&output).await?;

            let mut channel = ThumbnailChannel::spawn(Arc::new(rasterizer));
            channel.start(total_pages, batch_size, width)?;

            while let Some(event) = channel.next_event().await {
                match event {
                    WorkerEvent::Progress { page_num, .. } => {
                        tracing::debug!(page_num, total_pages, "Rendered thumbnail");
                    }
                    WorkerEvent::ThumbnailsBatch { thumbnails, .. } => {
                        for thumbnail in thumbnails {
                            let path =
                                output.join(format!("page_{:03}.png", thumbnail.page_index + 1));
                            tokio::fs::write(&path, &thumbnail.png).await?;
                        }
                    }
                    WorkerEvent::ThumbnailsComplete { thumbnails, .. } => {
                        let missing = thumbnails.iter().filter(|t| t.placeholder).count();
                        println!(
                            "Wrote {} thumbnails ({} unavailable) → {}",
                            thumbnails.len(),
                            missing,
                            output.display()
                        );
                        break;
                    }
                    WorkerEvent::Error { error, .. } => bail!("thumbnail generation failed: {error}"),
                    WorkerEvent::Cancelled { .. } | WorkerEvent::Pong { .. } => {}
                }
            }
        }
    }

    Ok(())
}
