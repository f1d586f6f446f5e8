// 该文件是 Duizhao （对照） 项目的一部分。
// src/output/record.rs - 记录绘图命令的画布
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use crate::{
  mapping::PixelPoint,
  render::{Canvas, CircleStyle, Color},
};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
  Clear,
  Circle {
    center: PixelPoint,
    radius: f64,
    style: CircleStyle,
  },
  Label {
    text: String,
    position: PixelPoint,
    font_size: f64,
    color: Color,
  },
  Line {
    from: PixelPoint,
    to: PixelPoint,
    color: Color,
    line_width: f64,
  },
}

/// 不做光栅化，只按顺序记录绘图命令
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
  width: f64,
  height: f64,
  commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
  pub fn new(width: f64, height: f64) -> Self {
    Self {
      width,
      height,
      commands: Vec::new(),
    }
  }

  pub fn commands(&self) -> &[DrawCommand] {
    &self.commands
  }

  /// 指定填充色的圆：(圆心, 半径)
  pub fn circles_with_fill(&self, fill: Color) -> Vec<(PixelPoint, f64)> {
    self
      .commands
      .iter()
      .filter_map(|command| match command {
        DrawCommand::Circle {
          center,
          radius,
          style,
        } if style.fill == fill => Some((*center, *radius)),
        _ => None,
      })
      .collect()
  }

  pub fn lines(&self) -> Vec<(PixelPoint, PixelPoint, Color)> {
    self
      .commands
      .iter()
      .filter_map(|command| match command {
        DrawCommand::Line { from, to, color, .. } => Some((*from, *to, *color)),
        _ => None,
      })
      .collect()
  }

  pub fn labels_with_text(&self, text: &str) -> usize {
    self
      .commands
      .iter()
      .filter(|command| matches!(command, DrawCommand::Label { text: t, .. } if t == text))
      .count()
  }
}

impl Canvas for RecordingCanvas {
  fn width(&self) -> f64 {
    self.width
  }

  fn height(&self) -> f64 {
    self.height
  }

  fn clear(&mut self) {
    self.commands.push(DrawCommand::Clear);
  }

  fn draw_circle(&mut self, center: PixelPoint, radius: f64, style: &CircleStyle) {
    self.commands.push(DrawCommand::Circle {
      center,
      radius,
      style: *style,
    });
  }

  fn draw_label(&mut self, text: &str, position: PixelPoint, font_size: f64, color: Color) {
    self.commands.push(DrawCommand::Label {
      text: text.to_string(),
      position,
      font_size,
      color,
    });
  }

  fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: Color, line_width: f64) {
    self.commands.push(DrawCommand::Line {
      from,
      to,
      color,
      line_width,
    });
  }
}
