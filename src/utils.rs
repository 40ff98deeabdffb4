use rand::distributions::{Alphanumeric, Distribution};

pub fn rand_str(length: usize) -> String {
  let rng = rand::thread_rng();
  Alphanumeric
    .sample_iter(rng)
    .map(char::from)
    .take(length)
    .collect()
}

/// Create (or truncate) `path`. Without a path, create a fresh randomly
/// named `.svg` file in the temp directory, never reusing an existing one.
pub fn create_file(
  path: Option<std::path::PathBuf>,
) -> Result<(std::path::PathBuf, std::fs::File), std::io::Error> {
  if let Some(path) = path {
    return std::fs::File::create(&path).map(|file| (path, file));
  }

  let file_path =
    std::env::temp_dir().join(format!("heightbars-{}.svg", rand_str(12)));
  std::fs::OpenOptions::new()
    .create_new(true)
    .write(true)
    .truncate(true)
    .open(&file_path)
    .map(|file| (file_path, file))
}

/// Command line parser for numbers that must be finite.
pub fn parse_finite(s: &str) -> Result<f64, String> {
  let v: f64 = s.trim().parse().map_err(|e| format!("{e}"))?;
  if v.is_finite() {
    Ok(v)
  } else {
    Err(format!("{s} is not a finite number"))
  }
}
