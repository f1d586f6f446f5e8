// 该文件是 Duizhao （对照） 项目的一部分。
// src/mapping.rs - 归一化坐标到画布像素的映射
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

// 响应式布局下画布高宽比（4:3）
const CANVAS_ASPECT_RATIO: f64 = 0.75;

/// 归一化坐标，原点在左上角，x 向右、y 向下，取值 [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedPoint {
  pub x: f64,
  pub y: f64,
}

impl NormalizedPoint {
  pub const fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }

  /// 水平镜像：x' = 1 - x
  pub fn mirrored(self) -> Self {
    Self {
      x: 1.0 - self.x,
      y: self.y,
    }
  }
}

/// 画布像素坐标
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
  pub x: f64,
  pub y: f64,
}

impl PixelPoint {
  pub const fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }

  pub fn offset(self, dx: f64, dy: f64) -> Self {
    Self {
      x: self.x + dx,
      y: self.y + dy,
    }
  }

  pub fn is_finite(&self) -> bool {
    self.x.is_finite() && self.y.is_finite()
  }
}

/// 视频画面在画布上实际占据的区域
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoRect {
  pub x: f64,
  pub y: f64,
  pub width: f64,
  pub height: f64,
}

/// 单帧的映射上下文。
///
/// 以 `object-fit: contain` 的方式把视频等比缩放进画布并居中，
/// 较短一侧留出黑边。每帧重新计算，不可变。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappingContext {
  pub video_width: f64,
  pub video_height: f64,
  pub canvas_width: f64,
  pub canvas_height: f64,
  pub scale: f64,
  pub offset_x: f64,
  pub offset_y: f64,
}

// 视频元数据尚未就绪时尺寸可能缺失或为 0
fn available(dimension: Option<f64>) -> Option<f64> {
  dimension.filter(|d| d.is_finite() && *d > 0.0)
}

impl MappingContext {
  /// 视频某一维不可用时，以画布对应维度代替，不报错。
  pub fn new(
    video_width: Option<f64>,
    video_height: Option<f64>,
    canvas_width: f64,
    canvas_height: f64,
  ) -> Self {
    let video_width = available(video_width).unwrap_or(canvas_width);
    let video_height = available(video_height).unwrap_or(canvas_height);
    let scale = (canvas_width / video_width).min(canvas_height / video_height);
    let offset_x = (canvas_width - video_width * scale) / 2.0;
    let offset_y = (canvas_height - video_height * scale) / 2.0;

    Self {
      video_width,
      video_height,
      canvas_width,
      canvas_height,
      scale,
      offset_x,
      offset_y,
    }
  }

  /// 检测结果的映射，不做镜像
  pub fn map_detected(&self, norm_x: f64, norm_y: f64) -> PixelPoint {
    PixelPoint {
      x: norm_x * self.video_width * self.scale + self.offset_x,
      y: norm_y * self.video_height * self.scale + self.offset_y,
    }
  }

  /// 参考姿态的映射，`mirror` 时先取 1 - x
  pub fn map_guide(&self, norm_x: f64, norm_y: f64, mirror: bool) -> PixelPoint {
    let norm_x = if mirror { 1.0 - norm_x } else { norm_x };
    self.map_detected(norm_x, norm_y)
  }

  pub fn video_rect(&self) -> VideoRect {
    VideoRect {
      x: self.offset_x,
      y: self.offset_y,
      width: self.video_width * self.scale,
      height: self.video_height * self.scale,
    }
  }
}

pub fn build_context(
  video_width: Option<f64>,
  video_height: Option<f64>,
  canvas_width: f64,
  canvas_height: f64,
) -> MappingContext {
  MappingContext::new(video_width, video_height, canvas_width, canvas_height)
}

pub fn map_detected(ctx: &MappingContext, norm_x: f64, norm_y: f64) -> PixelPoint {
  ctx.map_detected(norm_x, norm_y)
}

pub fn map_guide(ctx: &MappingContext, norm_x: f64, norm_y: f64, mirror: bool) -> PixelPoint {
  ctx.map_guide(norm_x, norm_y, mirror)
}

/// 按容器宽度计算 4:3 画布的像素尺寸
pub fn canvas_size_for_width(width: f64) -> (u32, u32) {
  let width = width.floor();
  let height = (width * CANVAS_ASPECT_RATIO).floor();
  (width as u32, height as u32)
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;
  use proptest::prelude::*;

  const EPS: f64 = 1e-9;

  #[test]
  fn center_maps_to_canvas_center_with_matching_aspect() {
    let ctx = build_context(Some(640.0), Some(480.0), 640.0, 480.0);
    let p = map_detected(&ctx, 0.5, 0.5);
    assert_relative_eq!(p.x, 320.0, epsilon = EPS);
    assert_relative_eq!(p.y, 240.0, epsilon = EPS);

    let ctx = build_context(Some(1280.0), Some(720.0), 640.0, 360.0);
    let p = map_detected(&ctx, 0.5, 0.5);
    assert_relative_eq!(p.x, 320.0, epsilon = EPS);
    assert_relative_eq!(p.y, 180.0, epsilon = EPS);
    assert_relative_eq!(ctx.scale, 0.5, epsilon = EPS);
  }

  #[test]
  fn wide_video_in_square_canvas_is_letterboxed() {
    let ctx = build_context(Some(1920.0), Some(1080.0), 640.0, 640.0);
    assert_relative_eq!(ctx.scale, 1.0 / 3.0, epsilon = EPS);
    assert_relative_eq!(ctx.offset_x, 0.0, epsilon = EPS);
    assert_relative_eq!(ctx.offset_y, 140.0, epsilon = EPS);

    let top_left = map_detected(&ctx, 0.0, 0.0);
    assert_relative_eq!(top_left.x, 0.0, epsilon = EPS);
    assert_relative_eq!(top_left.y, 140.0, epsilon = EPS);

    let bottom_right = map_detected(&ctx, 1.0, 1.0);
    assert_relative_eq!(bottom_right.x, 640.0, epsilon = EPS);
    assert_relative_eq!(bottom_right.y, 500.0, epsilon = EPS);

    let rect = ctx.video_rect();
    assert_relative_eq!(rect.width, 640.0, epsilon = EPS);
    assert_relative_eq!(rect.height, 360.0, epsilon = EPS);
  }

  #[test]
  fn tall_video_gets_side_bars() {
    let ctx = build_context(Some(480.0), Some(640.0), 640.0, 480.0);
    assert_relative_eq!(ctx.scale, 0.75, epsilon = EPS);
    assert_relative_eq!(ctx.offset_x, 140.0, epsilon = EPS);
    assert_relative_eq!(ctx.offset_y, 0.0, epsilon = EPS);
    assert_relative_eq!(map_detected(&ctx, 1.0, 0.0).x, 500.0, epsilon = EPS);
  }

  #[test]
  fn missing_video_size_falls_back_to_canvas() {
    for (w, h) in [(None, None), (Some(0.0), Some(0.0)), (Some(f64::NAN), None)] {
      let ctx = build_context(w, h, 800.0, 600.0);
      assert_eq!(ctx.video_width, 800.0);
      assert_eq!(ctx.video_height, 600.0);
      assert_eq!(ctx.scale, 1.0);
      assert_eq!(ctx.offset_x, 0.0);
      assert_eq!(ctx.offset_y, 0.0);
    }

    // 各维度独立回退
    let ctx = build_context(Some(1600.0), None, 800.0, 600.0);
    assert_eq!(ctx.video_width, 1600.0);
    assert_eq!(ctx.video_height, 600.0);
    assert_relative_eq!(ctx.scale, 0.5, epsilon = EPS);
  }

  #[test]
  fn mirror_only_affects_guide_x() {
    let ctx = build_context(Some(1920.0), Some(1080.0), 640.0, 640.0);
    let detected = map_detected(&ctx, 0.2, 0.3);
    let mirrored = map_guide(&ctx, 0.2, 0.3, true);
    let plain = map_guide(&ctx, 0.2, 0.3, false);

    assert_eq!(plain, detected);
    assert_ne!(detected.x.round(), mirrored.x.round());
    assert_relative_eq!(mirrored.x, map_detected(&ctx, 0.8, 0.3).x, epsilon = EPS);
    assert_eq!(mirrored.y, detected.y);

    let center = map_guide(&ctx, 0.5, 0.3, true);
    assert_eq!(center.x, map_detected(&ctx, 0.5, 0.3).x);
  }

  #[test]
  fn invalid_input_propagates() {
    let ctx = build_context(Some(640.0), Some(480.0), 640.0, 480.0);
    assert!(map_detected(&ctx, f64::NAN, 0.5).x.is_nan());
    assert!(map_detected(&ctx, 1.5, 0.5).x > 640.0);
    assert!(!map_guide(&ctx, 0.5, f64::NAN, true).is_finite());
  }

  #[test]
  fn responsive_canvas_is_four_by_three() {
    assert_eq!(canvas_size_for_width(640.0), (640, 480));
    assert_eq!(canvas_size_for_width(1001.7), (1001, 750));
  }

  fn dimension() -> impl Strategy<Value = f64> {
    1.0f64..4096.0
  }

  proptest! {
    #[test]
    fn prop_mapped_points_stay_on_canvas(
      vw in dimension(),
      vh in dimension(),
      cw in dimension(),
      ch in dimension(),
      x in 0.0f64..=1.0,
      y in 0.0f64..=1.0,
      mirror in any::<bool>(),
    ) {
      let ctx = build_context(Some(vw), Some(vh), cw, ch);
      let tol = 1e-9 * cw.max(ch);
      for p in [map_detected(&ctx, x, y), map_guide(&ctx, x, y, mirror)] {
        prop_assert!(p.x >= -tol && p.x <= cw + tol, "x {} outside 0..{}", p.x, cw);
        prop_assert!(p.y >= -tol && p.y <= ch + tol, "y {} outside 0..{}", p.y, ch);
      }
    }

    #[test]
    fn prop_mirror_moves_off_center_points(
      vw in dimension(),
      vh in dimension(),
      cw in dimension(),
      ch in dimension(),
      x in 0.0f64..=1.0,
      y in 0.0f64..=1.0,
    ) {
      prop_assume!((x - 0.5).abs() > 1e-6);
      let ctx = build_context(Some(vw), Some(vh), cw, ch);
      prop_assert_ne!(map_guide(&ctx, x, y, true).x, map_detected(&ctx, x, y).x);
    }

    #[test]
    fn prop_equal_aspect_center_is_canvas_center(w in dimension(), h in dimension(), k in 0.1f64..8.0) {
      let ctx = build_context(Some(w * k), Some(h * k), w, h);
      let p = map_detected(&ctx, 0.5, 0.5);
      prop_assert!((p.x - w / 2.0).abs() < 1e-6);
      prop_assert!((p.y - h / 2.0).abs() < 1e-6);
    }
  }
}
