// 该文件是 Duizhao （对照） 项目的一部分。
// src/landmark.rs - 人体关键点目录
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

use std::{fmt, str::FromStr};

use serde::Serialize;
use thiserror::Error;

/// 检测器输出的关键点数量
pub const LANDMARK_COUNT: usize = 33;

/// 人体关键点，判别值即检测器输出中的下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Landmark {
  Nose = 0,
  LeftEyeInner = 1,
  LeftEye = 2,
  LeftEyeOuter = 3,
  RightEyeInner = 4,
  RightEye = 5,
  RightEyeOuter = 6,
  LeftEar = 7,
  RightEar = 8,
  MouthLeft = 9,
  MouthRight = 10,
  LeftShoulder = 11,
  RightShoulder = 12,
  LeftElbow = 13,
  RightElbow = 14,
  LeftWrist = 15,
  RightWrist = 16,
  LeftPinky = 17,
  RightPinky = 18,
  LeftIndex = 19,
  RightIndex = 20,
  LeftThumb = 21,
  RightThumb = 22,
  LeftHip = 23,
  RightHip = 24,
  LeftKnee = 25,
  RightKnee = 26,
  LeftAnkle = 27,
  RightAnkle = 28,
  LeftHeel = 29,
  RightHeel = 30,
  LeftFootIndex = 31,
  RightFootIndex = 32,
}

/// 参与对齐判定并标注序号的主要关键点（双肩、双髋）
pub const MAJOR_LANDMARKS: [Landmark; 4] = [
  Landmark::LeftShoulder,
  Landmark::RightShoulder,
  Landmark::LeftHip,
  Landmark::RightHip,
];

/// 全身引导层中不绘制的关键点（面部与手指）
pub const EXCLUDED_LANDMARKS: [Landmark; 17] = [
  Landmark::Nose,
  Landmark::LeftEyeInner,
  Landmark::LeftEye,
  Landmark::LeftEyeOuter,
  Landmark::RightEyeInner,
  Landmark::RightEye,
  Landmark::RightEyeOuter,
  Landmark::LeftEar,
  Landmark::RightEar,
  Landmark::MouthLeft,
  Landmark::MouthRight,
  Landmark::LeftPinky,
  Landmark::RightPinky,
  Landmark::LeftIndex,
  Landmark::RightIndex,
  Landmark::LeftThumb,
  Landmark::RightThumb,
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("未知的关键点名称: {0}")]
pub struct UnknownLandmark(pub String);

impl Landmark {
  /// 按检测器下标排列的全部关键点
  pub const ALL: [Landmark; LANDMARK_COUNT] = [
    Landmark::Nose,
    Landmark::LeftEyeInner,
    Landmark::LeftEye,
    Landmark::LeftEyeOuter,
    Landmark::RightEyeInner,
    Landmark::RightEye,
    Landmark::RightEyeOuter,
    Landmark::LeftEar,
    Landmark::RightEar,
    Landmark::MouthLeft,
    Landmark::MouthRight,
    Landmark::LeftShoulder,
    Landmark::RightShoulder,
    Landmark::LeftElbow,
    Landmark::RightElbow,
    Landmark::LeftWrist,
    Landmark::RightWrist,
    Landmark::LeftPinky,
    Landmark::RightPinky,
    Landmark::LeftIndex,
    Landmark::RightIndex,
    Landmark::LeftThumb,
    Landmark::RightThumb,
    Landmark::LeftHip,
    Landmark::RightHip,
    Landmark::LeftKnee,
    Landmark::RightKnee,
    Landmark::LeftAnkle,
    Landmark::RightAnkle,
    Landmark::LeftHeel,
    Landmark::RightHeel,
    Landmark::LeftFootIndex,
    Landmark::RightFootIndex,
  ];

  pub const fn index(self) -> usize {
    self as usize
  }

  pub fn from_index(index: usize) -> Option<Self> {
    Self::ALL.get(index).copied()
  }

  pub const fn name(self) -> &'static str {
    match self {
      Landmark::Nose => "nose",
      Landmark::LeftEyeInner => "left_eye_inner",
      Landmark::LeftEye => "left_eye",
      Landmark::LeftEyeOuter => "left_eye_outer",
      Landmark::RightEyeInner => "right_eye_inner",
      Landmark::RightEye => "right_eye",
      Landmark::RightEyeOuter => "right_eye_outer",
      Landmark::LeftEar => "left_ear",
      Landmark::RightEar => "right_ear",
      Landmark::MouthLeft => "mouth_left",
      Landmark::MouthRight => "mouth_right",
      Landmark::LeftShoulder => "left_shoulder",
      Landmark::RightShoulder => "right_shoulder",
      Landmark::LeftElbow => "left_elbow",
      Landmark::RightElbow => "right_elbow",
      Landmark::LeftWrist => "left_wrist",
      Landmark::RightWrist => "right_wrist",
      Landmark::LeftPinky => "left_pinky",
      Landmark::RightPinky => "right_pinky",
      Landmark::LeftIndex => "left_index",
      Landmark::RightIndex => "right_index",
      Landmark::LeftThumb => "left_thumb",
      Landmark::RightThumb => "right_thumb",
      Landmark::LeftHip => "left_hip",
      Landmark::RightHip => "right_hip",
      Landmark::LeftKnee => "left_knee",
      Landmark::RightKnee => "right_knee",
      Landmark::LeftAnkle => "left_ankle",
      Landmark::RightAnkle => "right_ankle",
      Landmark::LeftHeel => "left_heel",
      Landmark::RightHeel => "right_heel",
      Landmark::LeftFootIndex => "left_foot_index",
      Landmark::RightFootIndex => "right_foot_index",
    }
  }

  pub fn is_major(self) -> bool {
    MAJOR_LANDMARKS.contains(&self)
  }

  pub fn is_excluded(self) -> bool {
    EXCLUDED_LANDMARKS.contains(&self)
  }
}

/// 名称到下标的查询，未知名称返回 None
pub fn index_of(name: &str) -> Option<usize> {
  name.parse::<Landmark>().ok().map(Landmark::index)
}

impl FromStr for Landmark {
  type Err = UnknownLandmark;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .iter()
      .copied()
      .find(|landmark| landmark.name() == s)
      .ok_or_else(|| UnknownLandmark(s.to_string()))
  }
}

impl fmt::Display for Landmark {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn all_is_ordered_by_index() {
    for (i, landmark) in Landmark::ALL.iter().enumerate() {
      assert_eq!(landmark.index(), i);
      assert_eq!(Landmark::from_index(i), Some(*landmark));
    }
    assert_eq!(Landmark::from_index(LANDMARK_COUNT), None);
  }

  #[test]
  fn names_match_detector_ordering() {
    assert_eq!(index_of("nose"), Some(0));
    assert_eq!(index_of("mouth_right"), Some(10));
    assert_eq!(index_of("left_shoulder"), Some(11));
    assert_eq!(index_of("right_shoulder"), Some(12));
    assert_eq!(index_of("left_hip"), Some(23));
    assert_eq!(index_of("right_hip"), Some(24));
    assert_eq!(index_of("right_foot_index"), Some(32));
    assert_eq!(index_of("tail"), None);
  }

  #[test]
  fn name_parse_round_trip() {
    for landmark in Landmark::ALL {
      assert_eq!(landmark.name().parse::<Landmark>(), Ok(landmark));
      assert_eq!(landmark.to_string(), landmark.name());
    }
    assert_eq!(
      "LeftShoulder".parse::<Landmark>(),
      Err(UnknownLandmark("LeftShoulder".to_string()))
    );
  }

  #[test]
  fn serializes_as_snake_case_name() {
    let json = serde_json::to_string(&Landmark::LeftFootIndex).unwrap();
    assert_eq!(json, "\"left_foot_index\"");
  }

  #[test]
  fn major_and_excluded_sets() {
    assert_eq!(
      MAJOR_LANDMARKS.map(Landmark::name),
      ["left_shoulder", "right_shoulder", "left_hip", "right_hip"]
    );
    for landmark in MAJOR_LANDMARKS {
      assert!(landmark.is_major());
      assert!(!landmark.is_excluded());
    }

    let excluded = Landmark::ALL.iter().filter(|l| l.is_excluded()).count();
    assert_eq!(excluded, EXCLUDED_LANDMARKS.len());
    assert!(Landmark::Nose.is_excluded());
    assert!(Landmark::RightThumb.is_excluded());
    assert!(!Landmark::LeftElbow.is_excluded());
    assert!(!Landmark::LeftFootIndex.is_excluded());
  }
}
