// 该文件是 Duizhao （对照） 项目的一部分。
// src/guide.rs - 参考姿态数据
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

use std::{
  collections::BTreeMap,
  path::Path,
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, landmark::Landmark, mapping::NormalizedPoint, url_file_path,
};

#[derive(Error, Debug)]
pub enum GuideError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 解析错误: {0}")]
  JsonError(serde_json::Error),
  #[error("参考姿态数据无效: {0}")]
  Malformed(String),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

impl From<serde_json::Error> for GuideError {
  fn from(err: serde_json::Error) -> Self {
    if err.is_data() {
      GuideError::Malformed(err.to_string())
    } else {
      GuideError::JsonError(err)
    }
  }
}

// 文件中的原始格式：keypoints[name] = [x, y]
#[derive(Deserialize)]
struct RawPoseGuide {
  name: String,
  description: String,
  keypoints: BTreeMap<String, Vec<f64>>,
}

/// 参考姿态，加载后只读
#[derive(Debug, Clone, PartialEq)]
pub struct PoseGuide {
  name: String,
  description: String,
  keypoints: BTreeMap<Landmark, NormalizedPoint>,
}

impl PoseGuide {
  pub fn new(
    name: impl Into<String>,
    description: impl Into<String>,
    keypoints: impl IntoIterator<Item = (Landmark, NormalizedPoint)>,
  ) -> Self {
    Self {
      name: name.into(),
      description: description.into(),
      keypoints: keypoints.into_iter().collect(),
    }
  }

  pub fn from_json_str(json: &str) -> Result<Self, GuideError> {
    let raw: RawPoseGuide = serde_json::from_str(json)?;
    Self::from_raw(raw)
  }

  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GuideError> {
    let path = path.as_ref();
    info!("加载参考姿态: {}", path.display());
    let json = std::fs::read_to_string(path)?;
    let guide = Self::from_json_str(&json)?;
    debug!(
      "参考姿态 '{}' 共 {} 个关键点",
      guide.name,
      guide.keypoints.len()
    );
    Ok(guide)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn description(&self) -> &str {
    &self.description
  }

  pub fn get(&self, landmark: Landmark) -> Option<&NormalizedPoint> {
    self.keypoints.get(&landmark)
  }

  /// 按关键点下标顺序遍历
  pub fn keypoints(&self) -> impl Iterator<Item = (Landmark, &NormalizedPoint)> {
    self.keypoints.iter().map(|(landmark, point)| (*landmark, point))
  }

  pub fn len(&self) -> usize {
    self.keypoints.len()
  }

  pub fn is_empty(&self) -> bool {
    self.keypoints.is_empty()
  }
}

impl PoseGuide {
  fn from_raw(raw: RawPoseGuide) -> Result<Self, GuideError> {
    let mut keypoints = BTreeMap::new();
    for (name, coords) in raw.keypoints {
      let landmark: Landmark = name
        .parse()
        .map_err(|e| GuideError::Malformed(format!("{}", e)))?;
      let &[x, y] = coords.as_slice() else {
        return Err(GuideError::Malformed(format!(
          "关键点 {} 应为 [x, y]，实际有 {} 个分量",
          name,
          coords.len()
        )));
      };
      if !x.is_finite() || !y.is_finite() {
        return Err(GuideError::Malformed(format!(
          "关键点 {} 坐标不是有限值",
          name
        )));
      }
      keypoints.insert(landmark, NormalizedPoint::new(x, y));
    }

    Ok(Self {
      name: raw.name,
      description: raw.description,
      keypoints,
    })
  }
}

impl FromUrlWithScheme for PoseGuide {
  const SCHEME: &'static str = "file";
}

impl FromUrl for PoseGuide {
  type Error = GuideError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(GuideError::SchemeMismatch(format!(
        "期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      )));
    }

    let path = url
      .to_file_path()
      .unwrap_or_else(|_| url_file_path(url));
    Self::from_path(path)
  }
}
