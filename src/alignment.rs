// 该文件是 Duizhao （对照） 项目的一部分。
// src/alignment.rs - 关键点对齐判定
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

use crate::mapping::NormalizedPoint;

/// 默认对齐阈值（归一化单位）
pub const DEFAULT_ALIGNMENT_THRESHOLD: f64 = 0.06;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignmentResult {
  pub aligned: bool,
  pub distance: f64,
}

/// 归一化空间中的欧氏距离，与分辨率无关
pub fn normalized_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
  let dx = x1 - x2;
  let dy = y1 - y2;
  (dx * dx + dy * dy).sqrt()
}

/// 距离等于阈值时视为对齐
pub fn classify(distance: f64, threshold: f64) -> bool {
  distance <= threshold
}

/// 比较未镜像的检测点与镜像后的参考点（1 - x）。
///
/// 无论引导层是否镜像绘制，判定始终使用镜像后的参考点。
pub fn evaluate(
  detected: NormalizedPoint,
  reference: NormalizedPoint,
  threshold: f64,
) -> AlignmentResult {
  let reference = reference.mirrored();
  let distance = normalized_distance(detected.x, detected.y, reference.x, reference.y);
  AlignmentResult {
    aligned: classify(distance, threshold),
    distance,
  }
}
