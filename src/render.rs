// 该文件是 Duizhao （对照） 项目的一部分。
// src/render.rs - 单帧叠加渲染
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::{
  alignment::{AlignmentResult, DEFAULT_ALIGNMENT_THRESHOLD, evaluate},
  frame::{DetectionResult, VideoSize},
  guide::PoseGuide,
  landmark::{Landmark, MAJOR_LANDMARKS},
  mapping::{MappingContext, PixelPoint},
};

// 标记尺寸相对画布短边的比例
const MARKER_SIZE_RATIO: f64 = 0.006;
const MIN_GUIDE_SIZE: f64 = 3.0;
const MIN_LANDMARK_SIZE: f64 = 2.0;
// 标签相对标记的偏移（像素）
const LABEL_GAP: f64 = 6.0;
const DEFAULT_LABEL_SIZE: f64 = 12.0;
const CONNECTOR_WIDTH: f64 = 2.0;

const ALIGNED_GLYPH: &str = "✓";
const MISALIGNED_GLYPH: &str = "✕";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}

impl Color {
  pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
    Self { r, g, b, a: 255 }
  }

  pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
    Self { r, g, b, a }
  }
}

impl From<Color> for image::Rgba<u8> {
  fn from(color: Color) -> Self {
    image::Rgba([color.r, color.g, color.b, color.a])
  }
}

pub const GUIDE_FILL: Color = Color::rgba(0, 255, 100, 140);
pub const GUIDE_OUTLINE: Color = Color::rgba(0, 0, 0, 217);
pub const MAJOR_FILL: Color = Color::rgba(0, 255, 100, 242);
pub const MAJOR_OUTLINE: Color = Color::rgba(0, 0, 0, 242);
pub const DETECTED_FILL: Color = Color::rgb(255, 107, 107);
pub const DETECTED_OUTLINE: Color = Color::rgba(0, 0, 0, 230);
pub const LANDMARK_FILL: Color = Color::rgba(255, 107, 107, 153);
pub const ALIGNED_COLOR: Color = Color::rgba(0, 200, 100, 242);
pub const MISALIGNED_COLOR: Color = Color::rgba(255, 80, 80, 242);
pub const LABEL_COLOR: Color = Color::rgb(0, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
  pub color: Color,
  pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleStyle {
  pub fill: Color,
  pub stroke: Option<Stroke>,
}

impl CircleStyle {
  pub const fn filled(fill: Color) -> Self {
    Self { fill, stroke: None }
  }

  pub const fn outlined(fill: Color, stroke: Color, width: f64) -> Self {
    Self {
      fill,
      stroke: Some(Stroke {
        color: stroke,
        width,
      }),
    }
  }
}

const GUIDE_STYLE: CircleStyle = CircleStyle::outlined(GUIDE_FILL, GUIDE_OUTLINE, 0.8);
const MAJOR_STYLE: CircleStyle = CircleStyle::outlined(MAJOR_FILL, MAJOR_OUTLINE, 2.0);
const DETECTED_STYLE: CircleStyle = CircleStyle::outlined(DETECTED_FILL, DETECTED_OUTLINE, 1.0);
const LANDMARK_STYLE: CircleStyle = CircleStyle::filled(LANDMARK_FILL);

/// 绘图表面。渲染器只通过它产生副作用。
pub trait Canvas {
  fn width(&self) -> f64;
  fn height(&self) -> f64;
  fn clear(&mut self);
  fn draw_circle(&mut self, center: PixelPoint, radius: f64, style: &CircleStyle);
  /// `position` 为文字基线左端
  fn draw_label(&mut self, text: &str, position: PixelPoint, font_size: f64, color: Color);
  fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: Color, line_width: f64);
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
  #[error("画布尺寸无效: {width}x{height}")]
  MissingGeometry { width: f64, height: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
  /// 对齐阈值（归一化单位）
  pub threshold: f64,
  /// 参考姿态是否水平镜像
  pub mirror: bool,
  /// 是否绘制参考姿态引导层
  pub show_guide: bool,
}

impl Default for RenderConfig {
  fn default() -> Self {
    Self {
      threshold: DEFAULT_ALIGNMENT_THRESHOLD,
      mirror: true,
      show_guide: true,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignmentEntry {
  pub landmark: Landmark,
  pub index: usize,
  #[serde(flatten)]
  pub result: AlignmentResult,
}

/// 单帧中各主要关键点的对齐结果，按 MAJOR_LANDMARKS 顺序
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameReport {
  pub entries: Vec<AlignmentEntry>,
}

impl FrameReport {
  fn push(&mut self, landmark: Landmark, result: AlignmentResult) {
    self.entries.push(AlignmentEntry {
      landmark,
      index: landmark.index(),
      result,
    });
  }

  pub fn get(&self, landmark: Landmark) -> Option<&AlignmentResult> {
    self
      .entries
      .iter()
      .find(|entry| entry.landmark == landmark)
      .map(|entry| &entry.result)
  }

  pub fn aligned_count(&self) -> usize {
    self.entries.iter().filter(|e| e.result.aligned).count()
  }

  /// 至少有一个关键点参与判定且全部对齐
  pub fn all_aligned(&self) -> bool {
    !self.entries.is_empty() && self.entries.iter().all(|e| e.result.aligned)
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// 逐帧渲染器，本身不保存跨帧状态
#[derive(Debug, Clone, Default)]
pub struct FrameRenderer {
  config: RenderConfig,
}

impl FrameRenderer {
  pub fn new(config: RenderConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &RenderConfig {
    &self.config
  }

  /// 渲染一帧。
  ///
  /// 画布尺寸不可用时返回 `MissingGeometry` 且不做任何绘制；
  /// 缺失的检测点或参考点只跳过依赖它的绘制步骤。
  pub fn render_frame<C: Canvas + ?Sized>(
    &self,
    canvas: &mut C,
    video: VideoSize,
    result: &DetectionResult,
    guide: &PoseGuide,
  ) -> Result<FrameReport, RenderError> {
    let (width, height) = (canvas.width(), canvas.height());
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
      return Err(RenderError::MissingGeometry { width, height });
    }

    canvas.clear();
    let ctx = MappingContext::new(video.width, video.height, width, height);
    let marker_base = width.min(height) * MARKER_SIZE_RATIO;

    let mut report = FrameReport::default();
    if self.config.show_guide {
      let guide_size = marker_base.max(MIN_GUIDE_SIZE);
      self.draw_guide(canvas, &ctx, guide, guide_size);
      self.draw_majors(canvas, &ctx, result, guide, guide_size, &mut report);
    }

    let landmark_size = marker_base.max(MIN_LANDMARK_SIZE);
    for (_, landmark) in result.iter() {
      let p = ctx.map_detected(landmark.x, landmark.y);
      canvas.draw_circle(p, landmark_size, &LANDMARK_STYLE);
    }

    Ok(report)
  }

  // 全身引导点，不含面部与手指
  fn draw_guide<C: Canvas + ?Sized>(
    &self,
    canvas: &mut C,
    ctx: &MappingContext,
    guide: &PoseGuide,
    guide_size: f64,
  ) {
    let radius = (guide_size * 0.8).max(MIN_LANDMARK_SIZE);
    for (landmark, point) in guide.keypoints() {
      if landmark.is_excluded() {
        continue;
      }
      let p = ctx.map_guide(point.x, point.y, self.config.mirror);
      canvas.draw_circle(p, radius, &GUIDE_STYLE);
    }
  }

  fn draw_majors<C: Canvas + ?Sized>(
    &self,
    canvas: &mut C,
    ctx: &MappingContext,
    result: &DetectionResult,
    guide: &PoseGuide,
    guide_size: f64,
    report: &mut FrameReport,
  ) {
    let label_offset = guide_size + LABEL_GAP;
    let index_size = (guide_size * 1.2).round().max(10.0);
    let glyph_size = (guide_size * 1.5).round().max(12.0);

    for landmark in MAJOR_LANDMARKS {
      let Some(reference) = guide.get(landmark) else {
        debug!("参考姿态缺少关键点 {}", landmark);
        continue;
      };
      let index = landmark.index().to_string();

      let g = ctx.map_guide(reference.x, reference.y, self.config.mirror);
      canvas.draw_circle(g, guide_size, &MAJOR_STYLE);
      canvas.draw_label(
        &index,
        g.offset(label_offset, -label_offset),
        index_size,
        LABEL_COLOR,
      );

      let Some(detected) = result.get(landmark) else {
        debug!("本帧未检测到关键点 {} ({})", landmark, index);
        continue;
      };

      let d = ctx.map_detected(detected.x, detected.y);
      canvas.draw_circle(d, (guide_size * 0.9).max(MIN_GUIDE_SIZE), &DETECTED_STYLE);

      let alignment = evaluate(detected.point(), *reference, self.config.threshold);
      let (color, glyph) = if alignment.aligned {
        (ALIGNED_COLOR, ALIGNED_GLYPH)
      } else {
        (MISALIGNED_COLOR, MISALIGNED_GLYPH)
      };

      canvas.draw_line(g, d, color, CONNECTOR_WIDTH);
      canvas.draw_label(glyph, d.offset(label_offset, label_offset), glyph_size, color);
      canvas.draw_label(
        &index,
        d.offset(label_offset, -label_offset),
        DEFAULT_LABEL_SIZE,
        LABEL_COLOR,
      );

      report.push(landmark, alignment);
    }
  }
}
