// 该文件是 Duizhao （对照） 项目的一部分。
// src/frame.rs - 检测帧定义
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

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{landmark::Landmark, mapping::NormalizedPoint};

/// 检测器输出的单个关键点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedLandmark {
  pub x: f64,
  pub y: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub z: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub visibility: Option<f64>,
}

impl DetectedLandmark {
  pub const fn new(x: f64, y: f64) -> Self {
    Self {
      x,
      y,
      z: None,
      visibility: None,
    }
  }

  pub fn point(&self) -> NormalizedPoint {
    NormalizedPoint::new(self.x, self.y)
  }
}

/// 单帧检测结果。
///
/// 关键点下标即其在序列中的位置；`None` 表示检测器未给出该下标。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pose_landmarks: Option<Vec<Option<DetectedLandmark>>>,
}

impl DetectionResult {
  pub fn new(landmarks: impl IntoIterator<Item = DetectedLandmark>) -> Self {
    Self {
      pose_landmarks: Some(landmarks.into_iter().map(Some).collect()),
    }
  }

  /// 未检测到人体
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn get(&self, landmark: Landmark) -> Option<&DetectedLandmark> {
    self
      .pose_landmarks
      .as_ref()?
      .get(landmark.index())?
      .as_ref()
  }

  /// 去掉某个关键点，模拟检测器本帧未报告该下标
  pub fn without(mut self, landmark: Landmark) -> Self {
    if let Some(slot) = self
      .pose_landmarks
      .as_mut()
      .and_then(|landmarks| landmarks.get_mut(landmark.index()))
    {
      *slot = None;
    }
    self
  }

  /// 按 (下标, 关键点) 遍历已报告的关键点
  pub fn iter(&self) -> impl Iterator<Item = (usize, &DetectedLandmark)> {
    self
      .pose_landmarks
      .iter()
      .flatten()
      .enumerate()
      .filter_map(|(index, landmark)| landmark.as_ref().map(|l| (index, l)))
  }

  pub fn len(&self) -> usize {
    self.iter().count()
  }

  pub fn is_empty(&self) -> bool {
    self.iter().next().is_none()
  }
}

/// 视频固有分辨率，元数据加载前可能缺失
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VideoSize {
  pub width: Option<f64>,
  pub height: Option<f64>,
}

impl VideoSize {
  pub const fn new(width: f64, height: f64) -> Self {
    Self {
      width: Some(width),
      height: Some(height),
    }
  }

  pub const fn unknown() -> Self {
    Self {
      width: None,
      height: None,
    }
  }

  pub fn is_known(&self) -> bool {
    matches!((self.width, self.height), (Some(w), Some(h)) if w > 0.0 && h > 0.0)
  }
}

/// 一条检测记录：视频尺寸、可选的背景画面以及检测结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
  #[serde(skip)]
  pub index: usize,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub video_width: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub video_height: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub background: Option<PathBuf>,
  #[serde(flatten)]
  pub result: DetectionResult,
}

impl DetectionFrame {
  pub fn new(video: VideoSize, result: DetectionResult) -> Self {
    Self {
      index: 0,
      video_width: video.width,
      video_height: video.height,
      background: None,
      result,
    }
  }

  pub fn with_index(mut self, index: usize) -> Self {
    self.index = index;
    self
  }

  pub fn with_background(mut self, background: impl Into<PathBuf>) -> Self {
    self.background = Some(background.into());
    self
  }

  pub fn video_size(&self) -> VideoSize {
    VideoSize {
      width: self.video_width,
      height: self.video_height,
    }
  }
}
