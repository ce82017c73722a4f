//! Command line shared by the desktop front-ends.

use ogl_utility::window::{WindowDim, WindowOpt};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct CLIOpts {
  #[structopt(short, long)]
  /// Directory where to pick textures from.
  pub textures: Option<PathBuf>,

  #[structopt(short, long)]
  /// Directory where to pick fonts from.
  pub fonts: Option<PathBuf>,

  #[structopt(short, long)]
  /// List available examples.
  pub list_examples: bool,

  #[structopt(long, default_value = "960")]
  /// Width of the window.
  pub width: u32,

  #[structopt(long, default_value = "540")]
  /// Height of the window.
  pub height: u32,

  #[structopt(long)]
  /// Open a fullscreen window on the primary monitor.
  pub fullscreen: bool,

  #[structopt(long)]
  /// Don’t wait for the vertical blank when swapping buffers.
  pub no_vsync: bool,

  /// Example to run.
  pub example: Option<String>,
}

impl CLIOpts {
  /// Window options asked for on the command line.
  pub fn window_opt(&self) -> WindowOpt {
    let dim = if self.fullscreen {
      WindowDim::Fullscreen
    } else {
      WindowDim::Windowed {
        width: self.width,
        height: self.height,
      }
    };

    WindowOpt::default()
      .set_dim(dim)
      .set_vsync(!self.no_vsync)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn window_options_follow_the_command_line() {
    let opts = CLIOpts::from_iter(&["ogl-demos-desktop", "--width", "640", "--no-vsync", "ssao"]);
    let window = opts.window_opt();

    assert_eq!(window.dim().size(), Some([640, 540]));
    assert!(!window.vsync());
    assert_eq!(opts.example.as_deref(), Some("ssao"));
  }

  #[test]
  fn fullscreen_has_no_size() {
    let opts = CLIOpts::from_iter(&["ogl-demos-glutin", "--fullscreen", "text"]);

    assert_eq!(opts.window_opt().dim(), WindowDim::Fullscreen);
    assert!(opts.window_opt().vsync());
  }
}
