//! Platform services implementation.

use crate::cli::CLIOpts;
use image::ImageError;
use ogl_demos::{Features, PlatformServices};
use std::{
  collections::HashMap,
  error::Error,
  fmt, io,
  path::{Path, PathBuf},
};

/// Desktop implementation of the [`PlatformServices`] API.
///
/// Every asset listed in the [`Features`] of a demo is loaded from the disk up front.
#[derive(Debug)]
pub struct DesktopPlatformServices {
  textures: HashMap<String, image::RgbImage>,
  fonts: HashMap<String, Vec<u8>>,
}

impl DesktopPlatformServices {
  pub fn new(cli_opts: &CLIOpts, features: Features) -> Result<Self, DesktopFetchError> {
    let textures = load_all(features.textures(), cli_opts.textures.as_deref(), "textures", |path| {
      // images are stored top row first but OpenGL textures start at the bottom row
      Ok(image::open(path)?.flipv().to_rgb8())
    })?;

    let fonts = load_all(features.fonts(), cli_opts.fonts.as_deref(), "fonts", |path| {
      std::fs::read(path).map_err(|source| DesktopFetchError::Io {
        path: path.to_owned(),
        source,
      })
    })?;

    Ok(Self { textures, fonts })
  }
}

// load every named asset from `root`
fn load_all<T>(
  names: &[String],
  root: Option<&Path>,
  kind: &'static str,
  load: impl Fn(&Path) -> Result<T, DesktopFetchError>,
) -> Result<HashMap<String, T>, DesktopFetchError> {
  if names.is_empty() {
    return Ok(HashMap::new());
  }

  let root = root.ok_or(DesktopFetchError::NoRoot(kind))?;

  names
    .iter()
    .map(|name| {
      let path = root.join(name);
      log::debug!("loading {}", path.display());
      load(&path).map(|asset| (name.clone(), asset))
    })
    .collect()
}

#[derive(Debug)]
pub enum DesktopFetchError {
  /// The demo needs assets of a kind but no directory was given for them.
  NoRoot(&'static str),
  UnknownTexture(String),
  UnknownFont(String),
  ImageError(ImageError),
  Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for DesktopFetchError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      DesktopFetchError::NoRoot(kind) => {
        write!(f, "no directory to load {} from (see --{})", kind, kind)
      }
      DesktopFetchError::UnknownTexture(ref name) => {
        write!(f, "unknown texture to load: {}", name)
      }
      DesktopFetchError::UnknownFont(ref name) => write!(f, "unknown font to load: {}", name),
      DesktopFetchError::ImageError(ref e) => write!(f, "cannot fetch texture: {}", e),
      DesktopFetchError::Io { ref path, ref source } => {
        write!(f, "cannot read {}: {}", path.display(), source)
      }
    }
  }
}

impl Error for DesktopFetchError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      DesktopFetchError::ImageError(e) => Some(e),
      DesktopFetchError::Io { source, .. } => Some(source),
      _ => None,
    }
  }
}

impl From<ImageError> for DesktopFetchError {
  fn from(source: ImageError) -> Self {
    Self::ImageError(source)
  }
}

impl PlatformServices for DesktopPlatformServices {
  type FetchError = DesktopFetchError;

  fn fetch_texture(&mut self, name: impl AsRef<str>) -> Result<&image::RgbImage, Self::FetchError> {
    let name = name.as_ref();
    self
      .textures
      .get(name)
      .ok_or_else(|| DesktopFetchError::UnknownTexture(name.to_owned()))
  }

  fn fetch_font(&mut self, name: impl AsRef<str>) -> Result<&[u8], Self::FetchError> {
    let name = name.as_ref();
    self
      .fonts
      .get(name)
      .map(Vec::as_slice)
      .ok_or_else(|| DesktopFetchError::UnknownFont(name.to_owned()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use structopt::StructOpt as _;

  #[test]
  fn demos_without_assets_need_no_directory() {
    let opts = CLIOpts::from_iter(&["ogl-demos-desktop", "hello-cube"]);
    let mut services = DesktopPlatformServices::new(&opts, Features::none()).unwrap();

    assert!(matches!(
      services.fetch_font("FreeSans.ttf"),
      Err(DesktopFetchError::UnknownFont(_))
    ));
  }

  #[test]
  fn missing_directory_is_reported() {
    let opts = CLIOpts::from_iter(&["ogl-demos-desktop", "text"]);
    let features = Features::none().font("FreeSans.ttf");
    let err = DesktopPlatformServices::new(&opts, features).unwrap_err();

    assert!(matches!(err, DesktopFetchError::NoRoot("fonts")));
    assert_eq!(err.to_string(), "no directory to load fonts from (see --fonts)");
  }

  #[test]
  fn fonts_are_read_from_their_directory() {
    let dir = std::env::temp_dir().join(format!("ogl-demos-fonts-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("tiny.ttf"), b"not really a font").unwrap();

    let dir_arg = dir.to_string_lossy().into_owned();
    let opts = CLIOpts::from_iter(&["ogl-demos-desktop", "--fonts", dir_arg.as_str(), "text"]);
    let features = Features::none().font("tiny.ttf");
    let mut services = DesktopPlatformServices::new(&opts, features).unwrap();

    assert_eq!(services.fetch_font("tiny.ttf").unwrap(), b"not really a font");
    std::fs::remove_dir_all(&dir).unwrap();
  }
}
