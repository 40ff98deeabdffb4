use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use log::{debug, info};

use crate::utils::create_file;
use crate::ChartError;

/// Write `svg` to `output` (or a temp file) and optionally open it in the
/// platform's default viewer, waiting for the launcher to exit.
pub fn present(
  svg: &str,
  output: Option<PathBuf>,
  open: bool,
) -> Result<PathBuf, ChartError> {
  let (path, mut file) = create_file(output)?;
  file.write_all(svg.as_bytes())?;
  file.flush()?;
  info!("wrote {} bytes to {}", svg.len(), path.display());

  if open {
    open_in_viewer(&path)?;
  }
  Ok(path)
}

fn viewer_command(path: &std::path::Path) -> Command {
  if cfg!(target_os = "macos") {
    let mut cmd = Command::new("open");
    cmd.arg("-W").arg(path);
    cmd
  } else if cfg!(target_os = "windows") {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "/WAIT", ""]).arg(path);
    cmd
  } else {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
  }
}

fn open_in_viewer(path: &std::path::Path) -> Result<(), ChartError> {
  let mut cmd = viewer_command(path);
  debug!("launching viewer: {:?}", cmd);

  let status = cmd.status().map_err(|e| {
    ChartError::ViewerFailed(format!(
      "failed to launch {:?}: {e}",
      cmd.get_program()
    ))
  })?;
  if !status.success() {
    return Err(ChartError::ViewerFailed(format!(
      "{:?} exited with {}",
      cmd.get_program(),
      status
    )));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn writes_svg_to_given_path() {
    let path = std::env::temp_dir()
      .join(format!("heightbars-test-{}.svg", crate::utils::rand_str(8)));
    let written = present("<svg/>", Some(path.clone()), false).unwrap();
    assert_eq!(written, path);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "<svg/>");
    std::fs::remove_file(&path).unwrap();
  }

  #[test]
  fn temp_files_get_svg_extension() {
    let path = present("<svg/>", None, false).unwrap();
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("svg"));
    std::fs::remove_file(&path).unwrap();
  }
}
