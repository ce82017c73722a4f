//! Glyph atlas and text layout.
//!
//! Glyphs are rasterized once with [`fontdue`] into a single-channel coverage texture. Laying
//! out a string produces one textured quad per visible glyph, ready to be drawn with a
//! texture-sampling shader.

use std::{collections::HashMap, error::Error, fmt};

use fontdue::{Font, FontSettings};
use log::debug;

/// Space left between glyphs in the atlas so that linear filtering doesn’t bleed.
const PADDING: u32 = 1;

/// Error that might occur while building an atlas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtlasError {
  /// The font data couldn’t be parsed.
  InvalidFont(String),
  /// A rectangle doesn’t fit in the remaining space.
  Full {
    /// Width of the rejected rectangle.
    width: u32,
    /// Height of the rejected rectangle.
    height: u32,
  },
}

impl fmt::Display for AtlasError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      AtlasError::InvalidFont(reason) => write!(f, "invalid font: {}", reason),
      AtlasError::Full { width, height } => {
        write!(f, "no room left in the atlas for a {}×{} glyph", width, height)
      }
    }
  }
}

impl Error for AtlasError {}

/// Packs rectangles in rows (shelves) from the top-left corner of a fixed-size area.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShelfPacker {
  width: u32,
  height: u32,
  padding: u32,
  cursor_x: u32,
  shelf_y: u32,
  shelf_height: u32,
}

impl ShelfPacker {
  /// Packer for an area of `width × height`, leaving `padding` pixels around each rectangle.
  pub fn new(width: u32, height: u32, padding: u32) -> Self {
    ShelfPacker {
      width,
      height,
      padding,
      cursor_x: padding,
      shelf_y: padding,
      shelf_height: 0,
    }
  }

  /// Size of the packed area.
  pub fn size(&self) -> [u32; 2] {
    [self.width, self.height]
  }

  /// Reserve a `width × height` rectangle and return its top-left corner.
  pub fn insert(&mut self, width: u32, height: u32) -> Result<[u32; 2], AtlasError> {
    let full = AtlasError::Full { width, height };

    if width + 2 * self.padding > self.width {
      return Err(full);
    }

    if self.cursor_x + width + self.padding > self.width {
      // open a new shelf under the current one
      self.shelf_y += self.shelf_height + self.padding;
      self.cursor_x = self.padding;
      self.shelf_height = 0;
    }

    if self.shelf_y + height + self.padding > self.height {
      return Err(full);
    }

    let corner = [self.cursor_x, self.shelf_y];
    self.cursor_x += width + self.padding;
    self.shelf_height = self.shelf_height.max(height);

    Ok(corner)
  }
}

/// Placement and metrics of a rasterized glyph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphInfo {
  /// Top-left corner of the glyph in the atlas, in texels.
  pub corner: [u32; 2],
  /// Size of the glyph bitmap, in texels.
  pub size: [u32; 2],
  /// Offset of the bitmap’s bottom-left corner from the pen position, in pixels.
  pub bearing: [f32; 2],
  /// Horizontal pen advance, in pixels.
  pub advance: f32,
}

/// Vertex of a text quad: window position and atlas texture coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextVertex {
  /// Position, in pixels.
  pub position: [f32; 2],
  /// Texture coordinates in the atlas, in `[0, 1]`, v pointing down.
  pub uv: [f32; 2],
}

/// Rasterized glyphs of a font at a given size.
#[derive(Clone, Debug)]
pub struct GlyphAtlas {
  size: [u32; 2],
  texels: Vec<u8>,
  glyphs: HashMap<char, GlyphInfo>,
  line_height: f32,
}

impl GlyphAtlas {
  /// Rasterize `chars` from the font in `font_bytes` at `px` pixels per em.
  pub fn build(
    font_bytes: &[u8],
    px: f32,
    chars: impl IntoIterator<Item = char>,
    atlas_size: [u32; 2],
  ) -> Result<Self, AtlasError> {
    let font = Font::from_bytes(font_bytes, FontSettings::default())
      .map_err(|reason| AtlasError::InvalidFont(reason.to_owned()))?;

    let line_height = font
      .horizontal_line_metrics(px)
      .map(|m| m.new_line_size)
      .unwrap_or(px * 1.2);

    let mut atlas = GlyphAtlas::empty(atlas_size, line_height);
    let mut packer = ShelfPacker::new(atlas_size[0], atlas_size[1], PADDING);

    for ch in chars {
      if atlas.glyphs.contains_key(&ch) {
        continue;
      }

      let (metrics, bitmap) = font.rasterize(ch, px);
      let info = GlyphInfo {
        corner: [0, 0],
        size: [metrics.width as u32, metrics.height as u32],
        bearing: [metrics.xmin as f32, metrics.ymin as f32],
        advance: metrics.advance_width,
      };

      atlas.insert(ch, info, &bitmap, &mut packer)?;
    }

    debug!(
      "glyph atlas: {} glyphs, {}×{} texels",
      atlas.glyphs.len(),
      atlas_size[0],
      atlas_size[1]
    );

    Ok(atlas)
  }

  fn empty(size: [u32; 2], line_height: f32) -> Self {
    GlyphAtlas {
      size,
      texels: vec![0; (size[0] * size[1]) as usize],
      glyphs: HashMap::new(),
      line_height,
    }
  }

  /// Copy a glyph bitmap (row-major, top row first) into the atlas.
  fn insert(
    &mut self,
    ch: char,
    mut info: GlyphInfo,
    bitmap: &[u8],
    packer: &mut ShelfPacker,
  ) -> Result<(), AtlasError> {
    let [w, h] = info.size;

    if w > 0 && h > 0 {
      info.corner = packer.insert(w, h)?;

      let [x0, y0] = info.corner;
      for (row, line) in bitmap.chunks(w as usize).take(h as usize).enumerate() {
        let start = ((y0 + row as u32) * self.size[0] + x0) as usize;
        self.texels[start..start + line.len()].copy_from_slice(line);
      }
    }

    self.glyphs.insert(ch, info);
    Ok(())
  }

  /// Size of the atlas texture, in texels.
  pub fn size(&self) -> [u32; 2] {
    self.size
  }

  /// Coverage texels, row-major, top row first.
  pub fn texels(&self) -> &[u8] {
    &self.texels
  }

  /// Distance between two baselines, in pixels.
  pub fn line_height(&self) -> f32 {
    self.line_height
  }

  /// Metrics of a glyph, if it was rasterized.
  pub fn glyph(&self, ch: char) -> Option<&GlyphInfo> {
    self.glyphs.get(&ch)
  }

  /// Lay out `text` with the pen starting at `origin` (baseline of the first line, y up).
  ///
  /// Returns two triangles per visible glyph. Characters missing from the atlas are skipped;
  /// `'\n'` moves the pen back to `origin.x`, one line lower.
  pub fn layout(&self, text: &str, origin: [f32; 2]) -> Vec<TextVertex> {
    let mut vertices = Vec::with_capacity(text.len() * 6);
    let [mut pen_x, mut pen_y] = origin;
    let [aw, ah] = [self.size[0] as f32, self.size[1] as f32];

    for ch in text.chars() {
      if ch == '\n' {
        pen_x = origin[0];
        pen_y -= self.line_height;
        continue;
      }

      let info = match self.glyphs.get(&ch) {
        Some(info) => info,
        None => continue,
      };

      if info.size[0] > 0 && info.size[1] > 0 {
        let x0 = pen_x + info.bearing[0];
        let y0 = pen_y + info.bearing[1];
        let x1 = x0 + info.size[0] as f32;
        let y1 = y0 + info.size[1] as f32;

        let u0 = info.corner[0] as f32 / aw;
        let v0 = info.corner[1] as f32 / ah;
        let u1 = (info.corner[0] + info.size[0]) as f32 / aw;
        let v1 = (info.corner[1] + info.size[1]) as f32 / ah;

        // the bitmap’s top row is at v0
        let bl = TextVertex {
          position: [x0, y0],
          uv: [u0, v1],
        };
        let br = TextVertex {
          position: [x1, y0],
          uv: [u1, v1],
        };
        let tr = TextVertex {
          position: [x1, y1],
          uv: [u1, v0],
        };
        let tl = TextVertex {
          position: [x0, y1],
          uv: [u0, v0],
        };

        vertices.extend([bl, br, tr, bl, tr, tl]);
      }

      pen_x += info.advance;
    }

    vertices
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn atlas_with(glyphs: &[(char, [u32; 2], f32)]) -> GlyphAtlas {
    let mut atlas = GlyphAtlas::empty([64, 64], 20.);
    let mut packer = ShelfPacker::new(64, 64, PADDING);

    for &(ch, size, advance) in glyphs {
      let bitmap = vec![255; (size[0] * size[1]) as usize];
      let info = GlyphInfo {
        corner: [0, 0],
        size,
        bearing: [1., -2.],
        advance,
      };
      atlas.insert(ch, info, &bitmap, &mut packer).unwrap();
    }

    atlas
  }

  #[test]
  fn packer_fills_shelves() {
    let mut packer = ShelfPacker::new(32, 32, 1);

    assert_eq!(packer.insert(10, 8), Ok([1, 1]));
    assert_eq!(packer.insert(10, 5), Ok([12, 1]));
    // 23 + 10 + 1 > 32: new shelf under the tallest rectangle
    assert_eq!(packer.insert(10, 4), Ok([1, 10]));
  }

  #[test]
  fn packer_reports_full() {
    let mut packer = ShelfPacker::new(16, 16, 1);

    assert_eq!(
      packer.insert(20, 2),
      Err(AtlasError::Full {
        width: 20,
        height: 2
      })
    );
    assert!(packer.insert(14, 10).is_ok());
    assert_eq!(
      packer.insert(14, 10),
      Err(AtlasError::Full {
        width: 14,
        height: 10
      })
    );
  }

  #[test]
  fn bitmaps_are_copied_at_their_corner() {
    let atlas = atlas_with(&[('a', [2, 2], 3.), ('b', [3, 1], 4.)]);
    let b = atlas.glyph('b').unwrap();

    assert_eq!(b.corner, [4, 1]);
    assert_eq!(atlas.texels()[64 + 4..64 + 7], [255, 255, 255]);
    assert_eq!(atlas.texels()[64 + 7], 0);
    assert_eq!(atlas.texels()[2 * 64 + 1..2 * 64 + 3], [255, 255]);
  }

  #[test]
  fn layout_advances_the_pen() {
    let atlas = atlas_with(&[('a', [2, 2], 3.), (' ', [0, 0], 5.)]);
    let quads = atlas.layout("a a", [10., 100.]);

    assert_eq!(quads.len(), 12);
    assert_eq!(quads[0].position, [11., 98.]);
    assert_eq!(quads[6].position, [10. + 3. + 5. + 1., 98.]);
    assert_eq!(quads[2].position, [13., 100.]);
  }

  #[test]
  fn newline_resets_the_pen() {
    let atlas = atlas_with(&[('a', [2, 2], 3.)]);
    let quads = atlas.layout("aa\na", [0., 50.]);

    assert_eq!(quads.len(), 18);
    assert_eq!(quads[12].position, [1., 50. - 20. - 2.]);
  }

  #[test]
  fn unknown_characters_are_skipped() {
    let atlas = atlas_with(&[('a', [2, 2], 3.)]);

    assert_eq!(atlas.layout("?a", [0., 0.]).len(), 6);
    assert_eq!(atlas.layout("?a", [0., 0.])[0].position, [1., -2.]);
  }

  #[test]
  fn uvs_cover_the_glyph_cell() {
    let atlas = atlas_with(&[('a', [2, 2], 3.)]);
    let quad = atlas.layout("a", [0., 0.]);

    assert_eq!(quad[0].uv, [1. / 64., 3. / 64.]);
    assert_eq!(quad[2].uv, [3. / 64., 1. / 64.]);
  }

  #[test]
  fn invalid_font_is_reported() {
    let err = GlyphAtlas::build(&[0, 1, 2, 3], 16., "abc".chars(), [64, 64]).unwrap_err();

    assert!(matches!(err, AtlasError::InvalidFont(_)));
  }
}
