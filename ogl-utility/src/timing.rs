//! Frame timing.

use std::collections::VecDeque;

use log::info;

/// Rolling average of frame durations.
///
/// Feed it the time of every frame with [`FrameCounter::tick`]; the average frame rate is
/// logged once per interval.
#[derive(Clone, Debug)]
pub struct FrameCounter {
  durations: VecDeque<f32>,
  window: usize,
  sum: f32,
  last_time: Option<f32>,
  log_interval: f32,
  last_log: f32,
}

impl FrameCounter {
  /// Average over the last `window` frames, logging every `log_interval` seconds.
  ///
  /// A null `log_interval` disables logging.
  pub fn new(window: usize, log_interval: f32) -> Self {
    let window = window.max(1);

    FrameCounter {
      durations: VecDeque::with_capacity(window),
      window,
      sum: 0.,
      last_time: None,
      log_interval,
      last_log: 0.,
    }
  }

  /// Record a frame rendered at `time` (seconds).
  ///
  /// Returns the duration since the previous frame, if any.
  pub fn tick(&mut self, time: f32) -> Option<f32> {
    let last = self.last_time.replace(time);
    let dt = time - last?;

    if dt <= 0. {
      return None;
    }

    if self.durations.len() == self.window {
      if let Some(oldest) = self.durations.pop_front() {
        self.sum -= oldest;
      }
    }

    self.durations.push_back(dt);
    self.sum += dt;

    if self.log_interval > 0. && time - self.last_log >= self.log_interval {
      self.last_log = time;

      if let Some(fps) = self.fps() {
        info!("{:.1} fps ({:.2} ms/frame)", fps, self.average_duration() * 1000.);
      }
    }

    Some(dt)
  }

  /// Average frame duration over the window, in seconds (0 before the second frame).
  pub fn average_duration(&self) -> f32 {
    if self.durations.is_empty() {
      0.
    } else {
      self.sum / self.durations.len() as f32
    }
  }

  /// Average frame rate over the window.
  pub fn fps(&self) -> Option<f32> {
    let avg = self.average_duration();

    if avg > 0. {
      Some(1. / avg)
    } else {
      None
    }
  }

  /// Number of frames in the window.
  pub fn len(&self) -> usize {
    self.durations.len()
  }

  /// Whether no frame duration was recorded yet.
  pub fn is_empty(&self) -> bool {
    self.durations.is_empty()
  }
}

impl Default for FrameCounter {
  fn default() -> Self {
    FrameCounter::new(60, 1.)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;

  #[test]
  fn first_frame_has_no_duration() {
    let mut counter = FrameCounter::new(4, 0.);

    assert_eq!(counter.tick(1.), None);
    assert!(counter.is_empty());
    assert_eq!(counter.fps(), None);
  }

  #[test]
  fn average_over_the_window() {
    let mut counter = FrameCounter::new(2, 0.);

    counter.tick(0.);
    counter.tick(0.5);
    counter.tick(0.75);

    assert_eq!(counter.len(), 2);
    assert_relative_eq!(counter.average_duration(), 0.375);

    counter.tick(1.);

    assert_eq!(counter.len(), 2);
    assert_relative_eq!(counter.fps().unwrap(), 4., epsilon = 1e-4);
  }

  #[test]
  fn time_going_backwards_is_ignored() {
    let mut counter = FrameCounter::new(4, 0.);

    counter.tick(1.);
    assert_eq!(counter.tick(0.5), None);
    assert_eq!(counter.tick(0.75), Some(0.25));
    assert_eq!(counter.len(), 1);
  }
}
