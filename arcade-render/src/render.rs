use std::collections::HashMap;
use std::time::{Duration, Instant};

use ab_glyph::{point, Font, FontVec, Glyph, GlyphId, PxScale, ScaleFont};
use anyhow::{anyhow, Result};
use arcade_core::{Point, ReactionAttempt, Scene, SessionSummary};
use log::debug;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Rect, Transform};

const BACKGROUND: Color = Color::BLACK;
const TEXT: [u8; 4] = [255, 255, 255, 255];
const TEXT_DIM: [u8; 4] = [150, 150, 150, 255];
const TARGET: [u8; 4] = [230, 40, 40, 255];
const CENTER_DOT: [u8; 4] = [180, 180, 180, 255];
const REFLEX_IDLE: [u8; 4] = [70, 70, 90, 255];
const REFLEX_LIT: [u8; 4] = [255, 210, 0, 255];
const STRIPE: [u8; 4] = [255, 255, 255, 255];

pub struct FrameStats {
    pub clear: Duration,
    pub scene: Duration,
    pub copy: Duration,
    pub total: Duration,
}

#[derive(Clone)]
struct CachedGlyph {
    bitmap: Vec<u8>,
    width: u32,
    height: u32,
    bearing_x: i32,
    bearing_y: i32,
}

#[derive(Hash, Eq, PartialEq, Clone, Copy)]
struct GlyphCacheKey {
    glyph_id: u16,
    scale_bits: u32,
}

/// Draws a [`Scene`] onto an offscreen canvas and copies it into an RGBA
/// frame buffer. Text needs a font; without one only shapes are drawn.
pub struct SkiaRenderer {
    width: u32,
    height: u32,
    center: (f32, f32),
    font: Option<FontVec>,
    glyph_cache: HashMap<GlyphCacheKey, CachedGlyph>,
    canvas: Pixmap,
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32, font: Option<FontVec>) -> Result<Self> {
        let canvas = Pixmap::new(width.max(1), height.max(1))
            .ok_or_else(|| anyhow!("cannot allocate {width}x{height} canvas"))?;
        Ok(Self {
            width,
            height,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            font,
            glyph_cache: HashMap::with_capacity(256),
            canvas,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.canvas = Pixmap::new(width.max(1), height.max(1))
            .ok_or_else(|| anyhow!("cannot allocate {width}x{height} canvas"))?;
        self.width = width;
        self.height = height;
        self.center = (width as f32 / 2.0, height as f32 / 2.0);
        debug!("canvas resized to {width}x{height}");
        Ok(())
    }

    pub fn canvas(&self) -> &Pixmap {
        &self.canvas
    }

    /// Renders `scene` and copies the result into `frame` (RGBA8, same size).
    pub fn render_frame(&mut self, scene: &Scene<'_>, frame: &mut [u8]) -> Result<FrameStats> {
        let start = Instant::now();
        self.canvas.fill(BACKGROUND);
        let clear = start.elapsed();

        let scene_start = Instant::now();
        self.render_scene(scene);
        let scene_time = scene_start.elapsed();

        let copy_start = Instant::now();
        let data = self.canvas.data();
        if frame.len() != data.len() {
            return Err(anyhow!(
                "frame is {} bytes, canvas {}x{} needs {}",
                frame.len(),
                self.width,
                self.height,
                data.len()
            ));
        }
        frame.copy_from_slice(data);
        let copy = copy_start.elapsed();

        Ok(FrameStats {
            clear,
            scene: scene_time,
            copy,
            total: start.elapsed(),
        })
    }

    pub fn render_scene(&mut self, scene: &Scene<'_>) {
        let (cx, cy) = self.center;
        let title = scene.title();
        match scene {
            Scene::Start => {
                self.draw_text(title, cx, cy - 60.0, 36.0, TEXT);
                self.draw_text("Press SPACE to start", cx, cy + 20.0, 20.0, TEXT_DIM);
                self.draw_text("Press ESC to exit", cx, cy + 55.0, 14.0, TEXT_DIM);
            }
            Scene::Slide { index, total, text } => {
                self.draw_text(
                    &format!("{title} ({}/{})", index + 1, total),
                    cx,
                    cy - 60.0,
                    28.0,
                    TEXT,
                );
                self.draw_text(text, cx, cy, 20.0, TEXT);
                self.draw_text("Press SPACE to continue", cx, cy + 60.0, 14.0, TEXT_DIM);
            }
            Scene::Fixation { dot, radius } => {
                self.draw_text(title, cx, 50.0, 18.0, TEXT_DIM);
                self.fill_circle(*dot, *radius, TEXT);
            }
            Scene::Reaction {
                center_dot,
                center_radius,
                target,
                target_radius,
                last,
                completed,
                max_attempts,
            } => {
                self.fill_circle(*center_dot, *center_radius, CENTER_DOT);
                if let Some(target) = target {
                    self.fill_circle(*target, *target_radius, TARGET);
                }
                self.draw_text(
                    &format!("Attempt {}/{}", (completed + 1).min(*max_attempts), max_attempts),
                    80.0,
                    30.0,
                    14.0,
                    TEXT_DIM,
                );
                match last {
                    Some(attempt) => {
                        self.draw_text(&reaction_line(attempt), cx, 50.0, 24.0, TEXT);
                    }
                    None => self.draw_text(title, cx, 50.0, 24.0, TEXT_DIM),
                }
            }
            Scene::Reflex {
                dots,
                radius,
                highlighted,
                hits,
                misses,
                hit_percentage,
                running,
            } => {
                for (i, dot) in dots.iter().enumerate() {
                    let color = if i == *highlighted { REFLEX_LIT } else { REFLEX_IDLE };
                    self.fill_circle(*dot, *radius, color);
                }
                self.draw_text(
                    &format!("Hits {hits}  Misses {misses}  Hit rate {hit_percentage:.0}%"),
                    cx,
                    50.0,
                    22.0,
                    TEXT,
                );
                let hint = if *running {
                    title
                } else {
                    "Round over. Press SPACE to continue"
                };
                self.draw_text(hint, cx, self.height as f32 - 50.0, 16.0, TEXT_DIM);
            }
            Scene::Optokinetic {
                stripes,
                gap,
                offset,
            } => {
                self.draw_stripes(stripes, *gap, *offset);
            }
            Scene::Summary(summary) => {
                self.draw_text(title, cx, cy - 100.0, 32.0, TEXT);
                for (i, line) in summary_lines(summary).iter().enumerate() {
                    self.draw_text(line, cx, cy - 40.0 + 34.0 * i as f32, 20.0, TEXT);
                }
                self.draw_text(
                    "Press SPACE to play again",
                    cx,
                    cy + 120.0,
                    16.0,
                    TEXT_DIM,
                );
            }
        }
    }

    fn paint(color: [u8; 4]) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(Color::from_rgba8(color[0], color[1], color[2], color[3]));
        paint.anti_alias = true;
        paint
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: [u8; 4]) {
        let mut pb = PathBuilder::new();
        pb.push_circle(center.x, center.y, radius);
        if let Some(path) = pb.finish() {
            self.canvas.fill_path(
                &path,
                &Self::paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    /// Full-height vertical stripes, left edge of the first at `offset`.
    fn draw_stripes(&mut self, widths: &[f32], gap: f32, offset: f32) {
        let paint = Self::paint(STRIPE);
        let height = self.height as f32;
        let mut x = offset;
        for &w in widths {
            if x > self.width as f32 {
                break;
            }
            if x + w >= 0.0 {
                if let Some(rect) = Rect::from_xywh(x, 0.0, w, height) {
                    self.canvas
                        .fill_rect(rect, &paint, Transform::identity(), None);
                }
            }
            x += w + gap;
        }
    }

    fn text_width(font: &FontVec, text: &str, scale: PxScale) -> f32 {
        let sf = font.as_scaled(scale);
        let mut width = 0.0;
        let mut prev: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = prev {
                width += sf.kern(prev, id);
            }
            width += sf.h_advance(id);
            prev = Some(id);
        }
        width
    }

    /// Draws `text` horizontally centred on `cx` with its baseline at `baseline_y`.
    fn draw_text(&mut self, text: &str, cx: f32, baseline_y: f32, size: f32, color: [u8; 4]) {
        let Some(font) = &self.font else {
            return;
        };
        let scale = PxScale::from(size);
        let sf = font.as_scaled(scale);

        let mut pen_x = cx - Self::text_width(font, text, scale) / 2.0;
        let mut prev = None;
        let mut glyphs = Vec::with_capacity(text.len());
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev_id) = prev {
                pen_x += sf.kern(prev_id, id);
            }
            let key = GlyphCacheKey {
                glyph_id: id.0,
                scale_bits: size.to_bits(),
            };
            if !self.glyph_cache.contains_key(&key) {
                let glyph = Glyph {
                    id,
                    scale,
                    position: point(0.0, 0.0),
                };
                if let Some(cached) = rasterize_glyph(font, glyph) {
                    self.glyph_cache.insert(key, cached);
                }
            }
            glyphs.push((point(pen_x, baseline_y), key));
            pen_x += sf.h_advance(id);
            prev = Some(id);
        }

        let (w, h) = (self.width as i32, self.height as i32);
        let pixels = self.canvas.pixels_mut();
        for (pos, key) in glyphs {
            if let Some(cached) = self.glyph_cache.get(&key) {
                blit_glyph(pixels, w, h, pos.x as i32, pos.y as i32, cached, color);
            }
        }
    }
}

fn rasterize_glyph(font: &FontVec, glyph: Glyph) -> Option<CachedGlyph> {
    let outlined = font.outline_glyph(glyph)?;
    let bounds = outlined.px_bounds();
    let w = bounds.width().ceil() as u32;
    let h = bounds.height().ceil() as u32;
    if w == 0 || h == 0 {
        return None;
    }
    let mut bitmap = vec![0u8; (w * h) as usize];
    outlined.draw(|x, y, cov| {
        if x < w && y < h {
            bitmap[(y * w + x) as usize] = (cov.clamp(0.0, 1.0) * 255.0) as u8;
        }
    });
    Some(CachedGlyph {
        bitmap,
        width: w,
        height: h,
        bearing_x: bounds.min.x.floor() as i32,
        bearing_y: bounds.min.y.floor() as i32,
    })
}

/// Source-over blend of a coverage bitmap in premultiplied space.
fn blit_glyph(
    pixels: &mut [PremultipliedColorU8],
    w: i32,
    h: i32,
    x: i32,
    y: i32,
    cached: &CachedGlyph,
    color: [u8; 4],
) {
    let origin_x = x + cached.bearing_x;
    let origin_y = y + cached.bearing_y;
    let ca = color[3] as f32 / 255.0;

    for gy in 0..cached.height as i32 {
        let py = origin_y + gy;
        if py < 0 || py >= h {
            continue;
        }
        for gx in 0..cached.width as i32 {
            let px = origin_x + gx;
            if px < 0 || px >= w {
                continue;
            }
            let coverage = cached.bitmap[(gy as u32 * cached.width + gx as u32) as usize];
            if coverage == 0 {
                continue;
            }
            let alpha = ca * coverage as f32 / 255.0;
            let idx = (py * w + px) as usize;
            let dst = pixels[idx];
            let inv = 1.0 - alpha;
            let blend = |src: u8, dst: u8| (src as f32 * alpha + dst as f32 * inv).round() as u8;
            let out_a = (alpha * 255.0 + dst.alpha() as f32 * inv).round() as u8;
            let out = PremultipliedColorU8::from_rgba(
                blend(color[0], dst.red()).min(out_a),
                blend(color[1], dst.green()).min(out_a),
                blend(color[2], dst.blue()).min(out_a),
                out_a,
            );
            if let Some(out) = out {
                pixels[idx] = out;
            }
        }
    }
}

fn reaction_line(attempt: &ReactionAttempt) -> String {
    format!(
        "Reaction: {:.2} s   Δx {:.0}   Δy {:.0}",
        attempt.reaction_seconds, attempt.delta_x, attempt.delta_y
    )
}

fn summary_lines(summary: &SessionSummary) -> Vec<String> {
    let reflex = match summary.reflex_hit_percentage {
        Some(pct) => format!(
            "Reflex hit rate: {pct:.0}% ({} hits, {} misses)",
            summary.reflex_hits, summary.reflex_misses
        ),
        None => "Reflex round not played".to_string(),
    };
    vec![
        format!(
            "Average reaction: {:.2} s over {} attempts",
            summary.average_reaction_seconds, summary.attempts
        ),
        format!(
            "Average distance: Δx {:.0} px   Δy {:.0} px",
            summary.average_abs_dx, summary.average_abs_dy
        ),
        reflex,
    ]
}

/// A small red dot on transparent background as straight RGBA, for the
/// window icon.
pub fn render_icon(size: u32) -> Result<(Vec<u8>, u32, u32)> {
    let mut pixmap =
        Pixmap::new(size, size).ok_or_else(|| anyhow!("cannot allocate {size}px icon"))?;
    let r = size as f32 / 2.0;
    let mut pb = PathBuilder::new();
    pb.push_circle(r, r, r * 0.9);
    let path = pb
        .finish()
        .ok_or_else(|| anyhow!("empty icon path"))?;
    pixmap.fill_path(
        &path,
        &SkiaRenderer::paint(TARGET),
        FillRule::Winding,
        Transform::identity(),
        None,
    );
    let rgba = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    Ok((rgba, size, size))
}
