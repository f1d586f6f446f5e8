// 该文件是 Duizhao （对照） 项目的一部分。
// src/output/draw.rs - 检测帧的叠加绘制
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::Path;

use ab_glyph::FontArc;
use image::{
  RgbaImage,
  imageops::{self, FilterType},
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
  frame::{DetectionFrame, VideoSize},
  guide::PoseGuide,
  mapping::MappingContext,
  output::canvas::{BACKDROP_COLOR, ImageCanvas},
  render::{FrameRenderer, FrameReport, RenderConfig, RenderError},
};

pub const DEFAULT_CANVAS_WIDTH: u32 = 640;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 480;

#[derive(Error, Debug)]
pub enum DrawError {
  #[error("渲染错误: {0}")]
  RenderError(#[from] RenderError),
  #[error("背景画面错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("字体加载错误: {0}")]
  FontError(ab_glyph::InvalidFont),
}

impl DrawError {
  pub fn is_missing_geometry(&self) -> bool {
    matches!(
      self,
      DrawError::RenderError(RenderError::MissingGeometry { .. })
    )
  }
}

/// 把检测帧绘制成叠加图像：画布尺寸、渲染参数与标签字体
#[derive(Clone)]
pub struct Draw {
  canvas_width: u32,
  canvas_height: u32,
  renderer: FrameRenderer,
  font: Option<FontArc>,
}

impl Default for Draw {
  fn default() -> Self {
    Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
  }
}

impl Draw {
  pub fn new(canvas_width: u32, canvas_height: u32) -> Self {
    Self {
      canvas_width,
      canvas_height,
      renderer: FrameRenderer::default(),
      font: None,
    }
  }

  pub fn with_config(mut self, config: RenderConfig) -> Self {
    self.renderer = FrameRenderer::new(config);
    self
  }

  pub fn with_font(mut self, font: FontArc) -> Self {
    self.font = Some(font);
    self
  }

  pub fn with_font_file(self, path: impl AsRef<Path>) -> Result<Self, DrawError> {
    let path = path.as_ref();
    info!("加载标签字体: {}", path.display());
    let data = std::fs::read(path)?;
    let font = FontArc::try_from_vec(data).map_err(DrawError::FontError)?;
    Ok(self.with_font(font))
  }

  pub fn canvas_size(&self) -> (u32, u32) {
    (self.canvas_width, self.canvas_height)
  }

  pub fn config(&self) -> &RenderConfig {
    self.renderer.config()
  }

  /// 绘制一帧，返回叠加图像与对齐结果
  pub fn draw_frame(
    &self,
    frame: &DetectionFrame,
    guide: &PoseGuide,
  ) -> Result<(RgbaImage, FrameReport), DrawError> {
    let background = match &frame.background {
      Some(path) => {
        debug!("加载第 {} 帧背景画面: {}", frame.index, path.display());
        Some(image::open(path)?.to_rgba8())
      }
      None => None,
    };

    // 记录中没有视频尺寸时，以背景画面的尺寸为准
    let video = match &background {
      Some(image) if !frame.video_size().is_known() => {
        VideoSize::new(image.width() as f64, image.height() as f64)
      }
      _ => frame.video_size(),
    };

    let canvas = match &background {
      Some(image) => ImageCanvas::with_backdrop(self.letterbox(image, video)),
      None => ImageCanvas::new(self.canvas_width, self.canvas_height),
    };
    let mut canvas = canvas.with_font(self.font.clone());

    let report = self
      .renderer
      .render_frame(&mut canvas, video, &frame.result, guide)?;
    Ok((canvas.into_image(), report))
  }

  /// 同 `draw_frame`，但画布尺寸不可用时记录日志并返回 None
  pub fn try_draw_frame(
    &self,
    frame: &DetectionFrame,
    guide: &PoseGuide,
  ) -> Result<Option<(RgbaImage, FrameReport)>, DrawError> {
    match self.draw_frame(frame, guide) {
      Ok((image, report)) => {
        info!(
          "第 {} 帧: {}/{} 个主要关键点对齐",
          frame.index,
          report.aligned_count(),
          report.entries.len()
        );
        Ok(Some((image, report)))
      }
      Err(e) if e.is_missing_geometry() => {
        warn!("第 {} 帧未渲染: {}", frame.index, e);
        Ok(None)
      }
      Err(e) => Err(e),
    }
  }

  // 按 contain 方式把视频画面放进画布，其余区域为底色
  fn letterbox(&self, image: &RgbaImage, video: VideoSize) -> RgbaImage {
    let mut backdrop = RgbaImage::from_pixel(self.canvas_width, self.canvas_height, BACKDROP_COLOR);
    let ctx = MappingContext::new(
      video.width,
      video.height,
      self.canvas_width as f64,
      self.canvas_height as f64,
    );
    let rect = ctx.video_rect();
    if !(rect.width.is_finite() && rect.height.is_finite()) {
      return backdrop;
    }

    let (width, height) = (rect.width.round() as u32, rect.height.round() as u32);
    if width == 0 || height == 0 {
      return backdrop;
    }

    let scaled = imageops::resize(image, width, height, FilterType::Triangle);
    imageops::overlay(
      &mut backdrop,
      &scaled,
      rect.x.round() as i64,
      rect.y.round() as i64,
    );
    backdrop
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    frame::{DetectedLandmark, DetectionResult},
    landmark::Landmark,
    mapping::NormalizedPoint,
  };
  use image::Rgba;

  fn guide() -> PoseGuide {
    PoseGuide::new(
      "T",
      "",
      [(Landmark::LeftShoulder, NormalizedPoint::new(0.3, 0.4))],
    )
  }

  #[test]
  fn draws_frame_on_plain_backdrop() {
    let draw = Draw::new(320, 240);
    let frame = DetectionFrame::new(
      VideoSize::new(640.0, 480.0),
      DetectionResult::new((0..33).map(|_| DetectedLandmark::new(0.7, 0.4))),
    );
    let (image, report) = draw.draw_frame(&frame, &guide()).unwrap();
    assert_eq!(image.dimensions(), (320, 240));
    assert!(report.get(Landmark::LeftShoulder).unwrap().aligned);
    // 检测点 (0.7, 0.4) -> (224, 96)
    assert_ne!(*image.get_pixel(224, 96), BACKDROP_COLOR);
  }

  #[test]
  fn background_is_letterboxed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    RgbaImage::from_pixel(160, 90, Rgba([255, 255, 255, 255]))
      .save(&path)
      .unwrap();

    let draw = Draw::new(160, 160).with_config(RenderConfig {
      show_guide: false,
      ..RenderConfig::default()
    });
    let frame = DetectionFrame::new(VideoSize::unknown(), DetectionResult::empty())
      .with_background(&path);
    let (image, report) = draw.draw_frame(&frame, &guide()).unwrap();

    assert!(report.is_empty());
    // 16:9 画面放进正方形画布：上下各 35 像素黑边
    assert_eq!(*image.get_pixel(80, 10), BACKDROP_COLOR);
    assert_eq!(*image.get_pixel(80, 150), BACKDROP_COLOR);
    assert_eq!(*image.get_pixel(80, 80), Rgba([255, 255, 255, 255]));
  }

  #[test]
  fn zero_canvas_is_skipped_not_failed() {
    let draw = Draw::new(0, 0);
    let frame = DetectionFrame::new(VideoSize::new(640.0, 480.0), DetectionResult::empty());
    assert!(draw.draw_frame(&frame, &guide()).unwrap_err().is_missing_geometry());
    assert!(draw.try_draw_frame(&frame, &guide()).unwrap().is_none());
  }

  #[test]
  fn missing_background_is_an_error() {
    let draw = Draw::default();
    let frame = DetectionFrame::new(VideoSize::unknown(), DetectionResult::empty())
      .with_background("/nonexistent/frame.png");
    let err = draw.draw_frame(&frame, &guide()).unwrap_err();
    assert!(!err.is_missing_geometry());
  }
}
