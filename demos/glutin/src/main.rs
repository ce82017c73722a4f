//! Glutin front-end of the demos.
//!
//! Runs the same examples as the GLFW front-end, on top of a glutin (winit) window. Cursor
//! positions are reported by winit in physical pixels, which is what the demos expect.

mod surface;

use glutin::{
  dpi::LogicalSize,
  event::{
    ElementState, Event, KeyboardInput, ModifiersState, MouseButton, MouseScrollDelta,
    VirtualKeyCode, WindowEvent,
  },
  event_loop::ControlFlow,
  platform::run_return::EventLoopExtRunReturn as _,
  window::{Fullscreen, WindowBuilder},
};
use ogl_demos::{Example, InputAction, LoopFeedback};
use ogl_demos_desktop::{
  pick_and_run_example, show_available_examples, CLIOpts, DesktopPlatformServices,
  ExampleRunner,
};
use ogl_utility::window::{CursorMode, WindowDim, WindowOpt};
use std::time::Instant;
use structopt::StructOpt;
use surface::GlutinSurface;

// pixels scrolled by a touchpad for one wheel notch
const PIXELS_PER_LINE: f64 = 20.;

fn window_builder(title: &str, opt: &WindowOpt) -> WindowBuilder {
  let builder = WindowBuilder::new().with_title(title).with_visible(false);

  match opt.dim() {
    WindowDim::Windowed { width, height } => {
      builder.with_inner_size(LogicalSize::new(width, height))
    }

    WindowDim::Fullscreen => builder.with_fullscreen(Some(Fullscreen::Borderless(None))),
  }
}

fn apply_cursor_mode(surface: &GlutinSurface, mode: CursorMode) {
  let window = surface.ctx.window();
  window.set_cursor_visible(mode == CursorMode::Visible);

  if let Err(e) = window.set_cursor_grab(mode == CursorMode::Disabled) {
    log::warn!("cannot grab the cursor: {}", e);
  }
}

struct GlutinRunner;

impl ExampleRunner for GlutinRunner {
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

  let mut services = match DesktopPlatformServices::new(&cli_opts, E::features()) {
    Ok(services) => services,
    Err(e) => {
      log::error!("cannot load assets of {}: {}", name, e);
      return;
    }
  };

  let (mut surface, mut event_loop) =
    match GlutinSurface::new(window_builder(name, &window_opt), &window_opt) {
      Ok(created) => created,
      Err(e) => {
        log::error!("cannot create glutin surface: {}", e);
        return;
      }
    };
  apply_cursor_mode(&surface, window_opt.cursor_mode());

  let example = match E::bootstrap(&mut services, &mut surface) {
    Ok(example) => example,
    Err(e) => {
      log::error!("cannot bootstrap {}: {}", name, e);
      return;
    }
  };
  log::info!("running {}", name);

  let start_t = Instant::now();
  let [width, height] = surface.size();
  let mut actions = vec![InputAction::Resized { width, height }];
  let mut modifiers = ModifiersState::empty();
  let mut example = Some(example);

  event_loop.run_return(|event, _, control_flow| {
    *control_flow = ControlFlow::Poll;

    match event {
      Event::WindowEvent { event, .. } => {
        match event {
          WindowEvent::Resized(size) => surface.ctx.resize(size),
          WindowEvent::ModifiersChanged(state) => modifiers = state,
          _ => (),
        }

        actions.extend(adapt_event(&event, modifiers));
      }

      Event::MainEventsCleared => {
        let current = match example.take() {
          Some(current) => current,
          None => {
            *control_flow = ControlFlow::Exit;
            return;
          }
        };

        let back_buffer = match surface.back_buffer() {
          Ok(back_buffer) => back_buffer,
          Err(e) => {
            log::error!("cannot get the back buffer: {}", e);
            *control_flow = ControlFlow::Exit;
            return;
          }
        };

        let t = start_t.elapsed().as_secs_f32();
        match current.render_frame(t, back_buffer, actions.drain(..), &mut surface) {
          LoopFeedback::Continue(stepped) => {
            example = Some(stepped);
            surface.swap_buffers();
          }

          LoopFeedback::Exit => *control_flow = ControlFlow::Exit,
        }
      }

      _ => (),
    }
  });
}

fn adapt_event(event: &WindowEvent, modifiers: ModifiersState) -> Option<InputAction> {
  match *event {
    WindowEvent::CloseRequested => Some(InputAction::Quit),

    WindowEvent::KeyboardInput {
      input:
        KeyboardInput {
          state,
          virtual_keycode: Some(key),
          ..
        },
      ..
    } => adapt_key(key, state, modifiers),

    WindowEvent::MouseInput { state, button, .. } => adapt_mouse(button, state),

    WindowEvent::CursorMoved { position, .. } => Some(InputAction::CursorMoved {
      x: position.x as _,
      y: position.y as _,
    }),

    WindowEvent::Resized(size) => Some(InputAction::Resized {
      width: size.width,
      height: size.height,
    }),

    WindowEvent::MouseWheel { delta, .. } => Some(InputAction::VScroll {
      amount: scroll_lines(delta),
    }),

    _ => None,
  }
}

fn adapt_key(
  key: VirtualKeyCode,
  state: ElementState,
  modifiers: ModifiersState,
) -> Option<InputAction> {
  match (key, state) {
    (VirtualKeyCode::Escape, ElementState::Released) => Some(InputAction::Quit),

    (VirtualKeyCode::Space, ElementState::Released) => {
      if modifiers.is_empty() {
        Some(InputAction::MainToggle)
      } else if modifiers == ModifiersState::SHIFT {
        Some(InputAction::AuxiliaryToggle)
      } else {
        None
      }
    }

    (key, ElementState::Pressed) => {
      log::debug!("key press: {:?}", key);
      match key {
        VirtualKeyCode::A | VirtualKeyCode::Left => Some(InputAction::Left),
        VirtualKeyCode::D | VirtualKeyCode::Right => Some(InputAction::Right),
        VirtualKeyCode::W => Some(InputAction::Forward),
        VirtualKeyCode::S => Some(InputAction::Backward),
        VirtualKeyCode::F | VirtualKeyCode::Up => Some(InputAction::Up),
        VirtualKeyCode::R | VirtualKeyCode::Down => Some(InputAction::Down),
        _ => None,
      }
    }

    _ => None,
  }
}

fn adapt_mouse(button: MouseButton, state: ElementState) -> Option<InputAction> {
  match (button, state) {
    (MouseButton::Left, ElementState::Pressed) => Some(InputAction::PrimaryPressed),
    (MouseButton::Left, ElementState::Released) => Some(InputAction::PrimaryReleased),
    (MouseButton::Right, ElementState::Pressed) => Some(InputAction::SecondaryPressed),
    (MouseButton::Right, ElementState::Released) => Some(InputAction::SecondaryReleased),
    _ => None,
  }
}

fn scroll_lines(delta: MouseScrollDelta) -> f32 {
  match delta {
    MouseScrollDelta::LineDelta(_, lines) => lines,
    MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
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
  } else if !pick_and_run_example(cli_opts, GlutinRunner) {
    show_available_examples();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use glutin::dpi::PhysicalPosition;

  #[test]
  fn space_toggles() {
    let released = ElementState::Released;

    assert_eq!(
      adapt_key(VirtualKeyCode::Space, released, ModifiersState::empty()),
      Some(InputAction::MainToggle)
    );
    assert_eq!(
      adapt_key(VirtualKeyCode::Space, released, ModifiersState::SHIFT),
      Some(InputAction::AuxiliaryToggle)
    );
    assert_eq!(adapt_key(VirtualKeyCode::Space, released, ModifiersState::CTRL), None);
    assert_eq!(
      adapt_key(VirtualKeyCode::Space, ElementState::Pressed, ModifiersState::empty()),
      None
    );
  }

  #[test]
  fn keys_move_while_pressed() {
    let none = ModifiersState::empty();

    assert_eq!(
      adapt_key(VirtualKeyCode::W, ElementState::Pressed, none),
      Some(InputAction::Forward)
    );
    assert_eq!(
      adapt_key(VirtualKeyCode::Down, ElementState::Pressed, none),
      Some(InputAction::Down)
    );
    assert_eq!(adapt_key(VirtualKeyCode::W, ElementState::Released, none), None);
    assert_eq!(
      adapt_key(VirtualKeyCode::Escape, ElementState::Released, none),
      Some(InputAction::Quit)
    );
  }

  #[test]
  fn mouse_buttons_map_to_primary_and_secondary() {
    assert_eq!(
      adapt_mouse(MouseButton::Right, ElementState::Pressed),
      Some(InputAction::SecondaryPressed)
    );
    assert_eq!(
      adapt_mouse(MouseButton::Left, ElementState::Released),
      Some(InputAction::PrimaryReleased)
    );
    assert_eq!(adapt_mouse(MouseButton::Middle, ElementState::Pressed), None);
  }

  #[test]
  fn touchpad_scrolls_in_lines() {
    assert_eq!(scroll_lines(MouseScrollDelta::LineDelta(0., -2.)), -2.);
    assert_eq!(
      scroll_lines(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0., 40.))),
      2.
    );
  }

  #[test]
  fn events_without_input_are_dropped() {
    assert_eq!(adapt_event(&WindowEvent::Focused(true), ModifiersState::empty()), None);
    assert_eq!(
      adapt_event(&WindowEvent::CloseRequested, ModifiersState::empty()),
      Some(InputAction::Quit)
    );
  }
}
