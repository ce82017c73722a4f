//! Window creation options.
//!
//! The front-end reads these to create its window and GL context. They carry no windowing-system
//! types so that they can be built from the command line and tested without a display.

/// Dimension metrics.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WindowDim {
  /// Windowed mode with the wished resolution.
  Windowed {
    /// Width of the window, in screen coordinates.
    width: u32,
    /// Height of the window, in screen coordinates.
    height: u32,
  },
  /// Fullscreen mode on the primary monitor, at its current resolution.
  Fullscreen,
}

impl WindowDim {
  /// Requested size, if any.
  pub fn size(&self) -> Option<[u32; 2]> {
    match *self {
      WindowDim::Windowed { width, height } => Some([width, height]),
      WindowDim::Fullscreen => None,
    }
  }
}

/// Cursor mode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CursorMode {
  /// The cursor is always visible.
  Visible,
  /// The cursor is hidden while over the window.
  Invisible,
  /// The cursor is hidden and captured; used for first-person navigation.
  Disabled,
}

/// Window options.
///
/// Start from [`WindowOpt::default`] and tweak with the `set_*` methods.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowOpt {
  dim: WindowDim,
  cursor_mode: CursorMode,
  num_samples: Option<u32>,
  vsync: bool,
}

impl Default for WindowOpt {
  /// Defaults:
  ///
  /// - a 960×540 window.
  /// - `cursor_mode` set to `CursorMode::Visible`.
  /// - no multisampling.
  /// - vertical synchronization on.
  fn default() -> Self {
    WindowOpt {
      dim: WindowDim::Windowed {
        width: 960,
        height: 540,
      },
      cursor_mode: CursorMode::Visible,
      num_samples: None,
      vsync: true,
    }
  }
}

impl WindowOpt {
  /// Change the window dimension.
  #[inline]
  pub fn set_dim(self, dim: WindowDim) -> Self {
    WindowOpt { dim, ..self }
  }

  /// Window dimension.
  #[inline]
  pub fn dim(&self) -> WindowDim {
    self.dim
  }

  /// Hide, unhide or disable the cursor.
  #[inline]
  pub fn set_cursor_mode(self, cursor_mode: CursorMode) -> Self {
    WindowOpt {
      cursor_mode,
      ..self
    }
  }

  /// Cursor mode.
  #[inline]
  pub fn cursor_mode(&self) -> CursorMode {
    self.cursor_mode
  }

  /// Set the number of samples to use for multisampling.
  ///
  /// Pass `None` (or `Some(0)`) to disable multisampling.
  #[inline]
  pub fn set_num_samples<S>(self, samples: S) -> Self
  where
    S: Into<Option<u32>>,
  {
    WindowOpt {
      num_samples: samples.into().filter(|&n| n > 0),
      ..self
    }
  }

  /// Number of samples to use in multisampling, if any.
  #[inline]
  pub fn num_samples(&self) -> Option<u32> {
    self.num_samples
  }

  /// Enable or disable vertical synchronization.
  #[inline]
  pub fn set_vsync(self, vsync: bool) -> Self {
    WindowOpt { vsync, ..self }
  }

  /// Whether buffer swaps wait for the vertical blank.
  #[inline]
  pub fn vsync(&self) -> bool {
    self.vsync
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_is_windowed_with_vsync() {
    let opt = WindowOpt::default();

    assert_eq!(opt.dim().size(), Some([960, 540]));
    assert_eq!(opt.cursor_mode(), CursorMode::Visible);
    assert_eq!(opt.num_samples(), None);
    assert!(opt.vsync());
  }

  #[test]
  fn zero_samples_disables_multisampling() {
    assert_eq!(WindowOpt::default().set_num_samples(0).num_samples(), None);
    assert_eq!(WindowOpt::default().set_num_samples(4).num_samples(), Some(4));
  }

  #[test]
  fn fullscreen_has_no_requested_size() {
    let opt = WindowOpt::default().set_dim(WindowDim::Fullscreen);
    assert_eq!(opt.dim().size(), None);
  }
}
