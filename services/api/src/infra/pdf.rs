//! Shopping-list PDF rendering.
//!
//! A4 pages set in an embedded DejaVu Sans, written as a Type0 font with
//! Identity-H encoding: every string in a content stream is a sequence of
//! big-endian glyph ids, and a ToUnicode map keeps the text extractable.
//! The heading sits on the first line of page one; items continue onto new
//! pages as needed.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use anyhow::Context;
use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str};
use ttf_parser::{Face, GlyphId};

use crate::domain::shopping_list::format_item;
use crate::domain::types::ShoppingListItem;

pub const HEADING: &str = "Shopping list:";

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 56.0;
const HEADING_SIZE: f32 = 16.0;
const TEXT_SIZE: f32 = 12.0;
const LEADING: f32 = 18.0;
const LINES_PER_PAGE: usize = 40;

const FONT_NAME: Name<'static> = Name(b"F1");
const BASE_FONT: Name<'static> = Name(b"DejaVuSans");
const IDENTITY: SystemInfo<'static> = SystemInfo {
    registry: Str(b"Adobe"),
    ordering: Str(b"Identity"),
    supplement: 0,
};

const FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

static FONT_STREAM: LazyLock<Vec<u8>> =
    LazyLock::new(|| miniz_oxide::deflate::compress_to_vec_zlib(FONT_DATA, 6));

/// Number of pages needed for `item_count` lines plus the heading.
fn page_count(item_count: usize) -> usize {
    (item_count + 1).div_ceil(LINES_PER_PAGE)
}

/// Glyph lookup over the embedded face. Remembers every glyph a document
/// shows so widths and the ToUnicode map cover exactly those.
struct GlyphSet<'a> {
    face: Face<'a>,
    used: BTreeMap<u16, char>,
}

impl GlyphSet<'static> {
    fn load() -> anyhow::Result<Self> {
        let face = Face::parse(FONT_DATA, 0).context("parse embedded font")?;
        Ok(Self {
            face,
            used: BTreeMap::new(),
        })
    }
}

impl GlyphSet<'_> {
    /// Characters the font lacks become `.notdef` (glyph 0).
    fn encode(&mut self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len() * 2);
        for c in text.chars() {
            let gid = self.face.glyph_index(c).map_or(0, |g| g.0);
            if gid != 0 {
                self.used.entry(gid).or_insert(c);
            }
            out.extend_from_slice(&gid.to_be_bytes());
        }
        out
    }

    fn scale(&self, value: f32) -> f32 {
        value * 1000.0 / f32::from(self.face.units_per_em())
    }

    fn width(&self, gid: u16) -> f32 {
        let advance = self.face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0);
        self.scale(f32::from(advance))
    }
}

/// Render the aggregated shopping list as a PDF document.
pub fn render_shopping_list(items: &[ShoppingListItem]) -> anyhow::Result<Vec<u8>> {
    let mut glyphs = GlyphSet::load()?;
    let mut lines: Vec<(f32, Vec<u8>)> = Vec::with_capacity(items.len() + 1);
    lines.push((HEADING_SIZE, glyphs.encode(HEADING)));
    for item in items {
        lines.push((TEXT_SIZE, glyphs.encode(&format_item(item))));
    }

    let mut pdf = Pdf::new();
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let font_id = Ref::new(3);
    let cid_font_id = Ref::new(4);
    let descriptor_id = Ref::new(5);
    let font_file_id = Ref::new(6);
    let cmap_id = Ref::new(7);
    let mut next_id = 8;
    let mut alloc = || {
        let id = Ref::new(next_id);
        next_id += 1;
        id
    };

    let ids: Vec<(Ref, Ref)> = (0..page_count(items.len()))
        .map(|_| (alloc(), alloc()))
        .collect();

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(ids.iter().map(|(page_id, _)| *page_id))
        .count(ids.len() as i32);

    pdf.type0_font(font_id)
        .base_font(BASE_FONT)
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_id)
        .to_unicode(cmap_id);

    let mut cid_font = pdf.cid_font(cid_font_id);
    cid_font
        .subtype(CidFontType::Type2)
        .base_font(BASE_FONT)
        .system_info(IDENTITY)
        .font_descriptor(descriptor_id)
        .default_width(0.0)
        .cid_to_gid_map_predefined(Name(b"Identity"));
    let mut widths = cid_font.widths();
    for &gid in glyphs.used.keys() {
        widths.consecutive(gid, [glyphs.width(gid)]);
    }
    widths.finish();
    cid_font.finish();

    let face = &glyphs.face;
    let bbox = face.global_bounding_box();
    let ascent = glyphs.scale(f32::from(face.ascender()));
    pdf.font_descriptor(descriptor_id)
        .name(BASE_FONT)
        .flags(FontFlags::NON_SYMBOLIC)
        .bbox(Rect::new(
            glyphs.scale(f32::from(bbox.x_min)),
            glyphs.scale(f32::from(bbox.y_min)),
            glyphs.scale(f32::from(bbox.x_max)),
            glyphs.scale(f32::from(bbox.y_max)),
        ))
        .italic_angle(face.italic_angle())
        .ascent(ascent)
        .descent(glyphs.scale(f32::from(face.descender())))
        .cap_height(
            face.capital_height()
                .map_or(ascent, |h| glyphs.scale(f32::from(h))),
        )
        .stem_v(80.0)
        .font_file2(font_file_id);

    pdf.stream(font_file_id, &FONT_STREAM)
        .filter(Filter::FlateDecode)
        .pair(Name(b"Length1"), FONT_DATA.len() as i32);

    let mut cmap = UnicodeCmap::new(Name(b"Foodgram-UCS"), IDENTITY);
    for (&gid, &c) in &glyphs.used {
        cmap.pair(gid, c);
    }
    let cmap = cmap.finish();
    pdf.cmap(cmap_id, &cmap)
        .name(Name(b"Foodgram-UCS"))
        .system_info(IDENTITY);

    for (chunk, (page_id, content_id)) in lines.chunks(LINES_PER_PAGE).zip(&ids) {
        let mut page = pdf.page(*page_id);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
        page.parent(page_tree_id);
        page.contents(*content_id);
        page.resources().fonts().pair(FONT_NAME, font_id);
        page.finish();

        let mut content = Content::new();
        content.begin_text();
        content.next_line(MARGIN, PAGE_HEIGHT - MARGIN);
        for (i, (size, text)) in chunk.iter().enumerate() {
            content.set_font(FONT_NAME, *size);
            if i > 0 {
                content.next_line(0.0, -LEADING);
            }
            content.show(Str(text));
        }
        content.end_text();
        pdf.stream(*content_id, &content.finish());
    }

    Ok(pdf.finish())
}
