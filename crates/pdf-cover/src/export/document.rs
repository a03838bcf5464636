//! Single-page PDF authoring for the document export kind

use crate::constants::POINTS_PER_INCH;
use crate::geometry::Size;
use crate::types::{ComposeError, Result};
use image::buffer::ConvertBuffer;
use image::{RgbImage, RgbaImage};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};

/// Wrap `image` as the only page of a new PDF whose page is `page_size`
/// points, the image covering the whole page
pub(crate) fn write_document(image: &RgbaImage, page_size: Size, title: &str) -> Result<Vec<u8>> {
    if page_size.is_degenerate() || image.width() == 0 || image.height() == 0 {
        return Err(ComposeError::Authoring(format!(
            "cannot place a {}x{} image on a {}x{} pt page",
            image.width(),
            image.height(),
            page_size.width,
            page_size.height
        )));
    }

    let rgb: RgbImage = image.convert();
    let raw = RawImage {
        pixels: RawImageData::U8(rgb.into_raw()),
        width: image.width() as usize,
        height: image.height() as usize,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    };

    let mut doc = PdfDocument::new(title);
    let xobject_id = doc.add_image(&raw);

    // The image fills the page exactly when placed at this resolution
    let dpi = image.width() as f32 * POINTS_PER_INCH / page_size.width;

    let ops = vec![Op::UseXobject {
        id: xobject_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(0.0)),
            translate_y: Some(Pt(0.0)),
            scale_x: None,
            scale_y: None,
            dpi: Some(dpi),
            rotate: None,
        },
    }];

    let page = PdfPage::new(
        Mm::from(Pt(page_size.width)),
        Mm::from(Pt(page_size.height)),
        ops,
    );
    doc.with_pages(vec![page]);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        log::debug!("PDF authoring produced {} warnings", warnings.len());
    }

    Ok(bytes)
}
