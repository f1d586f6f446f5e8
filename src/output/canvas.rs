// 该文件是 Duizhao （对照） 项目的一部分。
// src/output/canvas.rs - 基于 RGBA 图像的画布
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use ab_glyph::{FontArc, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
  Blend, draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut, draw_text_mut,
};
use tracing::debug;

use crate::{
  mapping::PixelPoint,
  render::{Canvas, CircleStyle, Color},
};

/// 画面外区域的底色
pub const BACKDROP_COLOR: Rgba<u8> = Rgba([26, 26, 26, 255]);

/// 光栅画布。
///
/// 绘制时按 alpha 混合；`clear` 恢复到背景（纯色或信箱化后的视频画面）。
/// 未设置字体时标签不绘制。
pub struct ImageCanvas {
  surface: Blend<RgbaImage>,
  backdrop: RgbaImage,
  font: Option<FontArc>,
}

impl ImageCanvas {
  pub fn new(width: u32, height: u32) -> Self {
    Self::with_backdrop(RgbaImage::from_pixel(width, height, BACKDROP_COLOR))
  }

  pub fn with_backdrop(backdrop: RgbaImage) -> Self {
    Self {
      surface: Blend(backdrop.clone()),
      backdrop,
      font: None,
    }
  }

  pub fn with_font(mut self, font: Option<FontArc>) -> Self {
    self.font = font;
    self
  }

  pub fn image(&self) -> &RgbaImage {
    &self.surface.0
  }

  pub fn into_image(self) -> RgbaImage {
    self.surface.0
  }
}

fn to_pixel(p: PixelPoint) -> (i32, i32) {
  (p.x.round() as i32, p.y.round() as i32)
}

impl Canvas for ImageCanvas {
  fn width(&self) -> f64 {
    self.surface.0.width() as f64
  }

  fn height(&self) -> f64 {
    self.surface.0.height() as f64
  }

  fn clear(&mut self) {
    self.surface.0.clone_from(&self.backdrop);
  }

  fn draw_circle(&mut self, center: PixelPoint, radius: f64, style: &CircleStyle) {
    if !center.is_finite() || !radius.is_finite() {
      debug!("跳过非有限坐标的圆: {:?}", center);
      return;
    }

    let center = to_pixel(center);
    let radius = radius.round().max(1.0) as i32;
    draw_filled_circle_mut(&mut self.surface, center, radius, style.fill.into());

    if let Some(stroke) = style.stroke {
      // 描边宽度按整像素环数绘制
      let rings = stroke.width.round().max(1.0) as i32;
      for ring in 0..rings {
        draw_hollow_circle_mut(&mut self.surface, center, radius + ring, stroke.color.into());
      }
    }
  }

  fn draw_label(&mut self, text: &str, position: PixelPoint, font_size: f64, color: Color) {
    let Some(font) = &self.font else {
      debug!("未加载字体，跳过标签 '{}'", text);
      return;
    };
    if !position.is_finite() {
      return;
    }

    // imageproc 以文字左上角定位，这里的 position 是基线
    let (x, y) = to_pixel(position.offset(0.0, -font_size));
    draw_text_mut(
      &mut self.surface,
      color.into(),
      x,
      y,
      PxScale::from(font_size as f32),
      font,
      text,
    );
  }

  fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: Color, line_width: f64) {
    if !from.is_finite() || !to.is_finite() {
      return;
    }

    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let length = dx.hypot(dy);
    let (nx, ny) = if length > 0.0 {
      (-dy / length, dx / length)
    } else {
      (0.0, 0.0)
    };

    // 沿法线方向平移多次以获得线宽
    let passes = line_width.round().max(1.0) as i32;
    for pass in 0..passes {
      let o = pass as f64 - (passes - 1) as f64 / 2.0;
      draw_line_segment_mut(
        &mut self.surface,
        ((from.x + nx * o) as f32, (from.y + ny * o) as f32),
        ((to.x + nx * o) as f32, (to.y + ny * o) as f32),
        color.into(),
      );
    }
  }
}
