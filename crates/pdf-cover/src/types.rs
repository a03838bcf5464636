use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Failed to render page {page}: {message}")]
    Render { page: usize, message: String },
    #[error("Page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },
    #[error("No citation pages selected")]
    EmptySelection,
    #[error("No pages to write")]
    NoPages,
    #[error("No cover page selected")]
    NoCover,
    #[error("An export is already running")]
    ExportInProgress,
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Document authoring failed: {0}")]
    Authoring(String),
}

pub type Result<T> = std::result::Result<T, ComposeError>;

/// Where the cover page is inserted when merging pages into a new document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum CoverPlacement {
    #[default]
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

impl CoverPlacement {
    /// Index at which the cover is inserted among `selected_count` copied pages
    pub fn insertion_index(self, selected_count: usize) -> usize {
        match self {
            CoverPlacement::Top | CoverPlacement::TopLeft | CoverPlacement::TopRight => 0,
            CoverPlacement::Center | CoverPlacement::Left | CoverPlacement::Right => {
                selected_count / 2
            }
            CoverPlacement::Bottom | CoverPlacement::BottomLeft | CoverPlacement::BottomRight => {
                selected_count
            }
        }
    }
}

impl std::str::FromStr for CoverPlacement {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "top" => Ok(CoverPlacement::Top),
            "top-left" => Ok(CoverPlacement::TopLeft),
            "top-right" => Ok(CoverPlacement::TopRight),
            "center" | "centre" => Ok(CoverPlacement::Center),
            "left" => Ok(CoverPlacement::Left),
            "right" => Ok(CoverPlacement::Right),
            "bottom" => Ok(CoverPlacement::Bottom),
            "bottom-left" => Ok(CoverPlacement::BottomLeft),
            "bottom-right" => Ok(CoverPlacement::BottomRight),
            other => Err(ComposeError::Config(format!(
                "Unknown cover placement: {other}"
            ))),
        }
    }
}

/// Output kinds produced by the export pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ExportKind {
    /// Quick raster for on-screen use
    ScreenImage,
    /// Raster at print-like resolution
    HighFidelityImage,
    /// Single-page PDF wrapping the composited raster
    Document,
}

impl ExportKind {
    pub fn is_image(self) -> bool {
        !matches!(self, ExportKind::Document)
    }

    fn file_stem(self) -> &'static str {
        match self {
            ExportKind::ScreenImage => "composite",
            ExportKind::HighFidelityImage => "composite_hq",
            ExportKind::Document => "composite",
        }
    }

    /// Suggested file name for an artifact of this kind
    pub fn file_name(self, encoding: ImageEncoding) -> String {
        let extension = match self {
            ExportKind::Document => "pdf",
            _ => encoding.extension(),
        };
        format!("{}.{}", self.file_stem(), extension)
    }
}

/// Raster encoding used for image exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImageEncoding {
    #[default]
    Png,
    Jpeg {
        quality: u8,
    },
}

impl ImageEncoding {
    pub fn extension(self) -> &'static str {
        match self {
            ImageEncoding::Png => "png",
            ImageEncoding::Jpeg { .. } => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageEncoding::Png => "image/png",
            ImageEncoding::Jpeg { .. } => "image/jpeg",
        }
    }
}
