//! Pieces shared by the desktop front-ends of the demos.
//!
//! A front-end owns a window and a GL context and runs one [`Example`] at a time. Everything
//! that does not depend on the windowing library lives here: the command line, asset loading
//! from the disk and picking an example by name.

pub mod cli;
pub mod platform;

pub use cli::CLIOpts;
pub use platform::{DesktopFetchError, DesktopPlatformServices};

use ogl_demos::Example;

/// Something able to run an example in a window.
pub trait ExampleRunner {
  fn run<E>(self, cli_opts: CLIOpts, name: &str)
  where
    E: Example;
}

/// Macro to declaratively add examples.
macro_rules! examples {
  ($($ex_name:literal, $ex_ident:ident),* $(,)?) => {
    /// Names of every available example.
    pub const EXAMPLES: &[&str] = &[$($ex_name),*];

    /// Run the example named on the command line with `runner`.
    ///
    /// Returns `false` if no such example exists.
    pub fn pick_and_run_example(cli_opts: CLIOpts, runner: impl ExampleRunner) -> bool {
      let example_name = cli_opts.example.as_ref().map(|n| n.as_str());
      match example_name {
        $(
          Some($ex_name) => {
            runner.run::<ogl_demos::$ex_ident::LocalExample>(cli_opts, $ex_name);
            true
          }
        ),*

        _ => {
          log::error!("no example found");
          false
        }
      }
    }
  }
}

examples! {
  "hello-triangle", hello_triangle,
  "hello-cube", hello_cube,
  "blinn-phong", blinn_phong,
  "navigation", navigation,
  "trackball", trackball,
  "first-person", first_person,
  "ssao", ssao,
  "shadow-mapping", shadow_mapping,
  "parallax-mapping", parallax_mapping,
  "tessellation", tessellation,
  "geometry-shader", geometry_shader,
  "text", text,
  "instancing", instancing,
  "texture", texture,
}

pub fn show_available_examples() {
  println!("available examples:");
  for name in EXAMPLES {
    println!("  - {}", name);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::RefCell;
  use structopt::StructOpt as _;

  struct Recorder<'a>(&'a RefCell<Vec<String>>);

  impl ExampleRunner for Recorder<'_> {
    fn run<E>(self, _: CLIOpts, name: &str)
    where
      E: Example,
    {
      self.0.borrow_mut().push(name.to_owned());
    }
  }

  #[test]
  fn examples_are_picked_by_name() {
    let ran = RefCell::new(Vec::new());

    let opts = CLIOpts::from_iter(&["ogl-demos-desktop", "shadow-mapping"]);
    assert!(pick_and_run_example(opts, Recorder(&ran)));

    let opts = CLIOpts::from_iter(&["ogl-demos-desktop", "teapot"]);
    assert!(!pick_and_run_example(opts, Recorder(&ran)));

    assert_eq!(*ran.borrow(), ["shadow-mapping"]);
  }

  #[test]
  fn every_demo_is_listed() {
    assert_eq!(EXAMPLES.len(), 14);
    assert!(EXAMPLES.contains(&"geometry-shader"));
  }
}
