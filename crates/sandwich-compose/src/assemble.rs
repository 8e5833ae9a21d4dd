//! Document assembly: one output page per source raster, background
//! image plus invisible text layer.

use image::codecs::jpeg::JpegEncoder;
use pdf_writer::types::TextRenderingMode;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str};
use sandwich_core::TextPlacement;

use crate::error::ComposeError;
use crate::font::{FONT_NAME, FontResource, GlyphUsage};

/// The raster image of one source page plus its pixel dimensions.
///
/// Owned by the job pipeline while the page is processed, handed here
/// to be drawn, and deleted from disk once the document is finished.
#[derive(Debug, Clone)]
pub struct PageArtifact {
    /// Encoded image bytes (any format the `image` crate can decode).
    pub raster: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Accumulates output pages and finalizes the document exactly once.
///
/// Pages are sized to their raster's pixel dimensions (1 px = 1 pt), so
/// placements computed in pixel space need no further scaling. Each
/// page's words are emitted inside a single `BT … ET` block with text
/// rendering mode 3: present in the text content stream, visually
/// absent. `finish` consumes the assembler; there is no partial flush.
pub struct DocumentAssembler {
    pdf: Pdf,
    font: FontResource,
    font_ref: Ref,
    page_tree_ref: Ref,
    page_refs: Vec<Ref>,
    glyphs: GlyphUsage,
    next_ref: i32,
}

impl DocumentAssembler {
    /// Start a new document using `font` for the text layer.
    pub fn new(font: FontResource) -> Self {
        let mut next_ref = 1;
        let mut alloc = || {
            let id = Ref::new(next_ref);
            next_ref += 1;
            id
        };
        let catalog_ref = alloc();
        let page_tree_ref = alloc();
        let font_ref = alloc();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_ref).pages(page_tree_ref);

        Self {
            pdf,
            font,
            font_ref,
            page_tree_ref,
            page_refs: Vec::new(),
            glyphs: GlyphUsage::new(),
            next_ref,
        }
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    /// Append one page: raster background plus invisible text layer.
    ///
    /// All fallible work (raster re-encode, text encoding) happens
    /// before any object is written, so a failed page leaves the
    /// document unchanged.
    pub fn add_page(
        &mut self,
        artifact: &PageArtifact,
        placements: &[TextPlacement],
    ) -> Result<(), ComposeError> {
        let jpeg = encode_jpeg(&artifact.raster)?;

        let image_name_str = format!("Im{}", self.page_refs.len());
        let image_name = Name(image_name_str.as_bytes());

        let width = artifact.width as f32;
        let height = artifact.height as f32;

        let mut content = Content::new();
        content.save_state();
        content.transform([width, 0.0, 0.0, height, 0.0, 0.0]);
        content.x_object(image_name);
        content.restore_state();

        if !placements.is_empty() {
            // Scoped: the rendering-mode change must not leak past the
            // text block.
            content.save_state();
            content.begin_text();
            content.set_text_rendering_mode(TextRenderingMode::Invisible);
            for placement in placements {
                let bytes = self.font.encode(&placement.text, &mut self.glyphs)?;
                content.set_font(FONT_NAME, placement.font_size as f32);
                content.set_text_matrix([
                    1.0,
                    0.0,
                    0.0,
                    1.0,
                    placement.x as f32,
                    placement.y as f32,
                ]);
                content.show(Str(&bytes));
            }
            content.end_text();
            content.restore_state();
        }
        let content_bytes = content.finish();

        let page_ref = self.alloc();
        let content_ref = self.alloc();
        let image_ref = self.alloc();

        let mut page = self.pdf.page(page_ref);
        page.media_box(Rect::new(0.0, 0.0, width, height));
        page.parent(self.page_tree_ref);
        page.contents(content_ref);
        let mut resources = page.resources();
        resources.fonts().pair(FONT_NAME, self.font_ref);
        resources.x_objects().pair(image_name, image_ref);
        resources.finish();
        page.finish();

        self.pdf.stream(content_ref, &content_bytes);

        let mut image = self.pdf.image_xobject(image_ref, &jpeg);
        image.filter(Filter::DctDecode);
        image.width(artifact.width as i32);
        image.height(artifact.height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        image.finish();

        self.page_refs.push(page_ref);
        Ok(())
    }

    /// Finalize the document and return its bytes.
    pub fn finish(mut self) -> Result<Vec<u8>, ComposeError> {
        self.font
            .write_objects(&mut self.pdf, &mut self.next_ref, self.font_ref, &self.glyphs)?;

        self.pdf
            .pages(self.page_tree_ref)
            .kids(self.page_refs.iter().copied())
            .count(self.page_refs.len() as i32);

        Ok(self.pdf.finish())
    }

    fn alloc(&mut self) -> Ref {
        let id = Ref::new(self.next_ref);
        self.next_ref += 1;
        id
    }
}

/// Decode a raster and re-encode it as JPEG for DCT embedding.
fn encode_jpeg(raster: &[u8]) -> Result<Vec<u8>, ComposeError> {
    let decoded = image::load_from_memory(raster)
        .map_err(|e| ComposeError::Image(format!("failed to decode page raster: {e}")))?;
    let rgb = decoded.to_rgb8();

    let mut jpeg = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, 85);
    encoder
        .encode_image(&rgb)
        .map_err(|e| ComposeError::Image(format!("failed to encode page raster: {e}")))?;
    Ok(jpeg)
}
