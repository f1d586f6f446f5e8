// 该文件是 Duizhao （对照） 项目的一部分。
// src/input.rs - 检测记录输入
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
  fs::File,
  io::{BufRead, BufReader, Lines, StdinLock},
  path::PathBuf,
};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::{FromUrl, FromUrlWithScheme, frame::DetectionFrame, url_file_path};

#[derive(Error, Debug)]
pub enum InputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

/// 逐行读取 JSON Lines 格式的检测记录。
///
/// 空行忽略，无法解析的行记录警告后跳过；帧序号按流中顺序从 0 开始分配。
/// 读取出错时迭代结束。
pub struct JsonLinesInput<R> {
  lines: Lines<R>,
  base_dir: Option<PathBuf>,
  line_number: usize,
  frame_index: usize,
  finished: bool,
}

impl<R: BufRead> JsonLinesInput<R> {
  pub fn from_reader(reader: R) -> Self {
    Self {
      lines: reader.lines(),
      base_dir: None,
      line_number: 0,
      frame_index: 0,
      finished: false,
    }
  }

  /// 相对路径的背景画面以此目录为基准
  pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
    self.base_dir = Some(base_dir.into());
    self
  }

  fn parse_line(&self, line: &str) -> Option<DetectionFrame> {
    let mut frame = match serde_json::from_str::<DetectionFrame>(line) {
      Ok(frame) => frame,
      Err(e) => {
        warn!("第 {} 行检测记录无法解析，已跳过: {}", self.line_number, e);
        return None;
      }
    };

    if let (Some(base_dir), Some(background)) = (&self.base_dir, &frame.background)
      && background.is_relative()
    {
      frame.background = Some(base_dir.join(background));
    }

    Some(frame)
  }
}

impl<R: BufRead> Iterator for JsonLinesInput<R> {
  type Item = DetectionFrame;

  fn next(&mut self) -> Option<Self::Item> {
    while !self.finished {
      let line = match self.lines.next() {
        Some(Ok(line)) => line,
        Some(Err(e)) => {
          error!("读取检测记录失败: {}", e);
          self.finished = true;
          break;
        }
        None => {
          self.finished = true;
          break;
        }
      };
      self.line_number += 1;

      let line = line.trim();
      if line.is_empty() {
        continue;
      }

      if let Some(frame) = self.parse_line(line) {
        let frame = frame.with_index(self.frame_index);
        self.frame_index += 1;
        return Some(frame);
      }
    }
    None
  }
}

impl FromUrlWithScheme for JsonLinesInput<BufReader<File>> {
  const SCHEME: &'static str = "jsonl";
}

impl FromUrl for JsonLinesInput<BufReader<File>> {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(InputError::SchemeMismatch(format!(
        "期望输入方式 '{}', 实际输入方式 '{}'",
        Self::SCHEME,
        url.scheme()
      )));
    }

    let path = url_file_path(url);
    info!("打开检测记录文件: {}", path.display());
    let input = Self::from_reader(BufReader::new(File::open(&path)?));
    Ok(match path.parent() {
      Some(parent) => input.with_base_dir(parent),
      None => input,
    })
  }
}

impl FromUrlWithScheme for JsonLinesInput<StdinLock<'static>> {
  const SCHEME: &'static str = "stdin";
}

impl FromUrl for JsonLinesInput<StdinLock<'static>> {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(InputError::SchemeMismatch(format!(
        "期望输入方式 '{}', 实际输入方式 '{}'",
        Self::SCHEME,
        url.scheme()
      )));
    }

    info!("从标准输入读取检测记录");
    Ok(Self::from_reader(std::io::stdin().lock()))
  }
}

pub enum InputWrapper {
  File(JsonLinesInput<BufReader<File>>),
  Stdin(JsonLinesInput<StdinLock<'static>>),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      JsonLinesInput::<BufReader<File>>::SCHEME => {
        Ok(InputWrapper::File(JsonLinesInput::from_url(url)?))
      }
      JsonLinesInput::<StdinLock<'static>>::SCHEME => {
        Ok(InputWrapper::Stdin(JsonLinesInput::from_url(url)?))
      }
      scheme => {
        error!("不支持的输入方式: {}", scheme);
        Err(InputError::SchemeMismatch(scheme.to_string()))
      }
    }
  }
}

impl Iterator for InputWrapper {
  type Item = DetectionFrame;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      InputWrapper::File(input) => input.next(),
      InputWrapper::Stdin(input) => input.next(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{frame::VideoSize, landmark::Landmark};
  use std::{
    io::{Cursor, Write},
    path::Path,
  };

  #[test]
  fn skips_blank_and_malformed_lines() {
    let data = concat!(
      "{\"video_width\": 640, \"video_height\": 480, \"pose_landmarks\": [{\"x\": 0.1, \"y\": 0.2}]}\n",
      "\n",
      "not json\n",
      "   \n",
      "{\"pose_landmarks\": \"oops\"}\n",
      "{}\n",
    );
    let frames: Vec<_> = JsonLinesInput::from_reader(Cursor::new(data)).collect();

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].index, 0);
    assert_eq!(frames[1].index, 1);
    assert_eq!(frames[0].video_size(), VideoSize::new(640.0, 480.0));
    assert_eq!(frames[0].result.get(Landmark::Nose).unwrap().y, 0.2);
    assert!(frames[1].result.is_empty());
  }

  #[test]
  fn relative_background_uses_base_dir() {
    let data = "{\"background\": \"a.png\"}\n{\"background\": \"/abs/b.png\"}\n";
    let frames: Vec<_> = JsonLinesInput::from_reader(Cursor::new(data))
      .with_base_dir("/records")
      .collect();

    assert_eq!(frames[0].background.as_deref(), Some(Path::new("/records/a.png")));
    assert_eq!(frames[1].background.as_deref(), Some(Path::new("/abs/b.png")));
  }

  #[test]
  fn opens_jsonl_url() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frames.jsonl");
    let mut file = File::create(&path).unwrap();
    writeln!(file, "{{\"background\": \"f0.png\"}}").unwrap();
    writeln!(file, "{{}}").unwrap();
    drop(file);

    let url = url::Url::parse(&format!("jsonl://{}", path.display())).unwrap();
    let input = InputWrapper::from_url(&url).unwrap();
    assert!(matches!(input, InputWrapper::File(_)));

    let frames: Vec<_> = input.collect();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].background, Some(dir.path().join("f0.png")));
  }

  #[test]
  fn opens_jsonl_url_with_spaces() {
    let dir = tempfile::tempdir().unwrap();
    let records = dir.path().join("my records");
    std::fs::create_dir(&records).unwrap();
    let path = records.join("frames.jsonl");
    std::fs::write(&path, "{\"background\": \"f0.png\"}\n").unwrap();

    let url = url::Url::from_file_path(&path).unwrap();
    let url = url::Url::parse(&url.as_str().replacen("file:", "jsonl:", 1)).unwrap();
    assert!(url.path().contains("%20"));

    let frames: Vec<_> = InputWrapper::from_url(&url).unwrap().collect();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].background, Some(records.join("f0.png")));
  }

  #[test]
  fn rejects_unknown_scheme() {
    let url = url::Url::parse("v4l:///dev/video0").unwrap();
    assert!(matches!(
      InputWrapper::from_url(&url),
      Err(InputError::SchemeMismatch(_))
    ));
  }

  #[test]
  fn missing_file_is_an_error() {
    let url = url::Url::parse("jsonl:///nonexistent/frames.jsonl").unwrap();
    assert!(matches!(
      InputWrapper::from_url(&url),
      Err(InputError::IoError(_))
    ));
  }
}
