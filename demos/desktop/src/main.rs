//! GLFW front-end of the demos.

use glfw::{
  Action, Context as _, Key, Modifiers, MouseButton, SwapInterval, WindowEvent, WindowMode,
};
use luminance_glfw::{GlfwSurface, GlfwSurfaceError};
use ogl_demos::{Example, InputAction, LoopFeedback};
use ogl_demos_desktop::{
  pick_and_run_example, show_available_examples, CLIOpts, DesktopPlatformServices,
  ExampleRunner,
};
use ogl_utility::window::{CursorMode, WindowDim, WindowOpt};
use std::{error::Error, fmt, iter, time::Instant};
use structopt::StructOpt;

/// Error raised while creating the window.
#[derive(Debug)]
pub enum WindowError {
  /// Fullscreen was requested but no monitor is connected.
  NoPrimaryMonitor,
  /// GLFW refused to create the window.
  Creation,
}

impl fmt::Display for WindowError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      WindowError::NoPrimaryMonitor => f.write_str("no primary monitor"),
      WindowError::Creation => f.write_str("cannot create window"),
    }
  }
}

impl Error for WindowError {}

// Open a window with an OpenGL 3.3 core context.
fn create_surface(
  title: &str,
  opt: WindowOpt,
) -> Result<GlfwSurface, GlfwSurfaceError<WindowError>> {
  GlfwSurface::new(|glfw| {
    glfw.window_hint(glfw::WindowHint::Samples(opt.num_samples()));

    let created = match opt.dim() {
      WindowDim::Windowed { width, height } => {
        glfw.create_window(width, height, title, WindowMode::Windowed)
      }

      WindowDim::Fullscreen => glfw.with_primary_monitor(|glfw, monitor| {
        let monitor = monitor?;
        let mode = monitor.get_video_mode()?;
        glfw.create_window(mode.width, mode.height, title, WindowMode::FullScreen(monitor))
      }),
    };

    let (mut window, events) = created.ok_or(GlfwSurfaceError::UserError(match opt.dim() {
      WindowDim::Fullscreen => WindowError::NoPrimaryMonitor,
      WindowDim::Windowed { .. } => WindowError::Creation,
    }))?;

    window.make_current();
    window.set_all_polling(true);
    window.set_cursor_mode(match opt.cursor_mode() {
      CursorMode::Visible => glfw::CursorMode::Normal,
      CursorMode::Invisible => glfw::CursorMode::Hidden,
      CursorMode::Disabled => glfw::CursorMode::Disabled,
    });

    glfw.set_swap_interval(if opt.vsync() {
      SwapInterval::Sync(1)
    } else {
      SwapInterval::None
    });

    Ok((window, events))
  })
}

struct GlfwRunner;

impl ExampleRunner for GlfwRunner {
  fn run<E>(self, cli_opts: CLIOpts, name: &str)
  where
    E: Example,
  {
    run_example::<E>(cli_opts, name)
  }
}

// Run an example.
fn run_example<E>(cli_opts: CLIOpts, name: &str)
where
  E: Example,
{
  let window_opt = cli_opts.window_opt();

  // Check the features so that we know what we need to load.
  let mut services = match DesktopPlatformServices::new(&cli_opts, E::features()) {
    Ok(services) => services,
    Err(e) => {
      log::error!("cannot load assets of {}: {}", name, e);
      return;
    }
  };

  let surface = match create_surface(name, window_opt) {
    Ok(surface) => surface,
    Err(e) => {
      log::error!("cannot create GLFW surface: {}", e);
      return;
    }
  };
  let mut context = surface.context;
  let events = surface.events_rx;

  let example = match E::bootstrap(&mut services, &mut context) {
    Ok(example) => example,
    Err(e) => {
      log::error!("cannot bootstrap {}: {}", name, e);
      return;
    }
  };
  log::info!("running {}", name);
  let start_t = Instant::now();

  let back_buffer = match context.back_buffer() {
    Ok(back_buffer) => back_buffer,
    Err(e) => {
      log::error!("cannot get the back buffer: {}", e);
      return;
    }
  };

  // render a dummy frame carrying the initial framebuffer size, so that examples bootstrapped
  // with a default size pick up the real one
  let (fb_w, fb_h) = context.window.get_framebuffer_size();
  let feedback = example.render_frame(
    0.,
    back_buffer,
    iter::once(InputAction::Resized {
      width: fb_w as _,
      height: fb_h as _,
    }),
    &mut context,
  );
  let mut example = match feedback {
    LoopFeedback::Exit => return,
    LoopFeedback::Continue(example) => example,
  };

  'app: loop {
    // handle events
    context.window.glfw.poll_events();
    let scale = cursor_scale(
      context.window.get_framebuffer_size(),
      context.window.get_size(),
    );
    let actions = glfw::flush_messages(&events).flat_map(|(_, event)| adapt_events(event, scale));

    let back_buffer = match context.back_buffer() {
      Ok(back_buffer) => back_buffer,
      Err(e) => {
        log::error!("cannot get the back buffer: {}", e);
        break 'app;
      }
    };

    let t = start_t.elapsed().as_secs_f32();
    let feedback = example.render_frame(t, back_buffer, actions, &mut context);

    if let LoopFeedback::Continue(stepped) = feedback {
      example = stepped;
      context.window.swap_buffers();
    } else {
      break 'app;
    }
  }
}

// Ratio of framebuffer pixels to screen coordinates, which differ on HiDPI displays.
fn cursor_scale((fb_w, fb_h): (i32, i32), (w, h): (i32, i32)) -> [f64; 2] {
  let ratio = |fb: i32, screen: i32| {
    if screen > 0 && fb > 0 {
      fb as f64 / screen as f64
    } else {
      1.
    }
  };

  [ratio(fb_w, w), ratio(fb_h, h)]
}

fn adapt_events(event: WindowEvent, [sx, sy]: [f64; 2]) -> Option<InputAction> {
  match event {
    WindowEvent::Close | WindowEvent::Key(Key::Escape, _, Action::Release, _) => {
      Some(InputAction::Quit)
    }

    WindowEvent::Key(Key::Space, _, Action::Release, mods) => {
      if mods.is_empty() {
        Some(InputAction::MainToggle)
      } else if mods == Modifiers::Shift {
        Some(InputAction::AuxiliaryToggle)
      } else {
        None
      }
    }

    WindowEvent::Key(key, _, Action::Press, _) | WindowEvent::Key(key, _, Action::Repeat, _) => {
      log::debug!("key press: {:?}", key);
      match key {
        Key::A | Key::Left => Some(InputAction::Left),
        Key::D | Key::Right => Some(InputAction::Right),
        Key::W => Some(InputAction::Forward),
        Key::S => Some(InputAction::Backward),
        Key::F | Key::Up => Some(InputAction::Up),
        Key::R | Key::Down => Some(InputAction::Down),
        _ => None,
      }
    }

    WindowEvent::MouseButton(MouseButton::Button1, action, _) => match action {
      Action::Press => Some(InputAction::PrimaryPressed),
      Action::Release => Some(InputAction::PrimaryReleased),
      _ => None,
    },

    WindowEvent::MouseButton(MouseButton::Button2, action, _) => match action {
      Action::Press => Some(InputAction::SecondaryPressed),
      Action::Release => Some(InputAction::SecondaryReleased),
      _ => None,
    },

    WindowEvent::CursorPos(x, y) => Some(InputAction::CursorMoved {
      x: (x * sx) as _,
      y: (y * sy) as _,
    }),

    WindowEvent::FramebufferSize(width, height) => Some(InputAction::Resized {
      width: width.max(0) as _,
      height: height.max(0) as _,
    }),

    WindowEvent::Scroll(_, amount) => Some(InputAction::VScroll {
      amount: amount as f32,
    }),

    _ => None,
  }
}

fn main() {
  env_logger::builder()
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .init();
  let cli_opts = CLIOpts::from_args();

  if cli_opts.list_examples {
    show_available_examples();
  } else if !pick_and_run_example(cli_opts, GlfwRunner) {
    show_available_examples();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const UNSCALED: [f64; 2] = [1., 1.];

  fn adapt_key(key: Key, action: Action, mods: Modifiers) -> Option<InputAction> {
    adapt_events(WindowEvent::Key(key, 0, action, mods), UNSCALED)
  }

  fn adapt_mouse(button: MouseButton, action: Action) -> Option<InputAction> {
    adapt_events(WindowEvent::MouseButton(button, action, Modifiers::empty()), UNSCALED)
  }

  #[test]
  fn space_toggles() {
    assert_eq!(
      adapt_key(Key::Space, Action::Release, Modifiers::empty()),
      Some(InputAction::MainToggle)
    );
    assert_eq!(
      adapt_key(Key::Space, Action::Release, Modifiers::Shift),
      Some(InputAction::AuxiliaryToggle)
    );
    assert_eq!(adapt_key(Key::Space, Action::Release, Modifiers::Control), None);
  }

  #[test]
  fn mouse_buttons_map_to_primary_and_secondary() {
    assert_eq!(
      adapt_mouse(MouseButton::Button2, Action::Press),
      Some(InputAction::SecondaryPressed)
    );
    assert_eq!(
      adapt_mouse(MouseButton::Button1, Action::Release),
      Some(InputAction::PrimaryReleased)
    );
  }

  #[test]
  fn repeated_keys_keep_moving() {
    assert_eq!(
      adapt_key(Key::W, Action::Repeat, Modifiers::empty()),
      Some(InputAction::Forward)
    );
    assert_eq!(
      adapt_key(Key::Down, Action::Press, Modifiers::empty()),
      Some(InputAction::Down)
    );
  }

  #[test]
  fn cursor_is_reported_in_framebuffer_pixels() {
    let scale = cursor_scale((1920, 1080), (960, 540));
    assert_eq!(scale, [2., 2.]);
    assert_eq!(
      adapt_events(WindowEvent::CursorPos(10., 20.5), scale),
      Some(InputAction::CursorMoved { x: 20., y: 41. })
    );

    // minimized windows report empty sizes
    assert_eq!(cursor_scale((0, 0), (0, 0)), UNSCALED);
  }
}
