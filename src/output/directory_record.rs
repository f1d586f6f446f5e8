// 该文件是 Duizhao （对照） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::{
  fs::File,
  io::BufWriter,
  path::PathBuf,
  sync::atomic::{AtomicU16, Ordering},
};

use chrono::{Datelike, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::DetectionFrame,
  guide::PoseGuide,
  output::{
    Render,
    draw::{Draw, DrawError},
  },
  render::FrameReport,
  url_file_path,
};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("绘制错误: {0}")]
  DrawError(#[from] DrawError),
}

// 与叠加图像同名的 .json 记录
#[derive(Serialize)]
struct FrameRecord<'a> {
  frame: usize,
  guide: &'a str,
  report: &'a FrameReport,
}

/// 按日期分目录保存每帧叠加图像。
///
/// `?record` 同时写出对齐结果，`?always` 连未检测到人体的帧也保存。
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  draw: Draw,
  frame_counter: AtomicU16,
  record: bool,
  always: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let record = uri.query_pairs().any(|(k, _)| k == "record");
    let always = uri.query_pairs().any(|(k, _)| k == "always");

    Ok(DirectoryRecordOutput {
      directory: url_file_path(uri),
      draw: Draw::default(),
      frame_counter: AtomicU16::new(0),
      record,
      always,
    })
  }
}

impl DirectoryRecordOutput {
  pub fn with_draw(mut self, draw: Draw) -> Self {
    self.draw = draw;
    self
  }

  fn frame_id(&self) -> u16 {
    self
      .frame_counter
      .fetch_add(1, Ordering::Relaxed)
      .wrapping_add(1)
  }

  fn frame_path(&self) -> Result<PathBuf, std::io::Error> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    if !directory.exists() {
      std::fs::create_dir_all(&directory)?;
    }

    Ok(directory.join(format!(
      "{}-{:04X}.png",
      now.format("%H-%M-%S"),
      self.frame_id()
    )))
  }
}

impl Render<DetectionFrame, PoseGuide> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, frame: &DetectionFrame, guide: &PoseGuide) -> Result<(), Self::Error> {
    if !self.always && frame.result.is_empty() {
      debug!("第 {} 帧未检测到人体，不保存", frame.index);
      return Ok(());
    }

    let Some((image, report)) = self.draw.try_draw_frame(frame, guide)? else {
      return Ok(());
    };

    let path = self.frame_path()?;
    image.save(&path)?;
    info!("保存第 {} 帧到 {}", frame.index, path.display());

    if self.record {
      let writer = BufWriter::new(File::create(path.with_extension("json"))?);
      serde_json::to_writer_pretty(
        writer,
        &FrameRecord {
          frame: frame.index,
          guide: guide.name(),
          report: &report,
        },
      )?;
    }

    Ok(())
  }
}
