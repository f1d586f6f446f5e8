// 该文件是 Duizhao （对照） 项目的一部分。
// src/bin/overlay_oneshot.rs - 单帧叠加
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use url::Url;

use duizhao::{
  FromUrl,
  alignment::DEFAULT_ALIGNMENT_THRESHOLD,
  guide::PoseGuide,
  mapping::canvas_size_for_width,
  output::draw::Draw,
  render::RenderConfig,
  task::{OneShotTask, Task},
};
use tracing::info;

/// Duizhao 单帧叠加参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 参考姿态 (file:///path/pose.json)
  #[arg(long, value_name = "GUIDE")]
  pub guide: Url,
  /// 检测记录来源 (jsonl:///path/frames.jsonl 或 stdin:)
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径 (image:///path/out.png 或 folder:///dir?record)
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,

  /// 画布宽度
  #[arg(long, default_value = "640", value_name = "PIXELS")]
  pub canvas_width: u32,
  /// 画布高度，缺省时按 4:3 计算
  #[arg(long, value_name = "PIXELS")]
  pub canvas_height: Option<u32>,

  /// 对齐阈值（归一化单位）
  #[arg(long, default_value_t = DEFAULT_ALIGNMENT_THRESHOLD, value_name = "THRESHOLD")]
  pub threshold: f64,
  /// 不镜像参考姿态
  #[arg(long)]
  pub no_mirror: bool,
  /// 不绘制参考姿态引导层
  #[arg(long)]
  pub hide_guide: bool,

  /// 标签字体文件 (TTF/OTF)
  #[arg(long, value_name = "FONT")]
  pub font: Option<PathBuf>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("参考姿态: {}", args.guide);
  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let (width, height) = match args.canvas_height {
    Some(height) => (args.canvas_width, height),
    None => canvas_size_for_width(args.canvas_width as f64),
  };
  let mut draw = Draw::new(width, height).with_config(RenderConfig {
    threshold: args.threshold,
    mirror: !args.no_mirror,
    show_guide: !args.hide_guide,
  });
  if let Some(font) = &args.font {
    draw = draw.with_font_file(font)?;
  }

  let guide = PoseGuide::from_url(&args.guide)?;
  let input = duizhao::input::InputWrapper::from_url(&args.input)?;
  let output = duizhao::output::OutputWrapper::from_url(&args.output)?.with_draw(draw);

  OneShotTask.run_task(input, &guide, output)?;

  Ok(())
}
