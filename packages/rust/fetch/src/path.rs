//! Address → storage path mapping.

use std::path::{Path, PathBuf};

use url::Url;

use distill_shared::{DistillError, Result};

/// Derive the output path for a parsed address.
///
/// The host becomes a directory, intermediate path segments become nested
/// directories and the final segment becomes the file name with its
/// extension replaced by `.txt`. The result is joined onto `root` when given.
///
/// ```text
/// https://lenta.ru/news/2022/08/24/ze1/  ->  lenta.ru/news/2022/08/24/ze1.txt
/// https://example.com/a/page.html        ->  example.com/a/page.txt
/// ```
pub fn url_to_path(url: &Url, root: Option<&Path>) -> Result<PathBuf> {
    let address = url.as_str();

    if !matches!(url.scheme(), "http" | "https") {
        return Err(DistillError::path_mapping(
            address,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| DistillError::path_mapping(address, "missing host"))?;

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let Some((file, dirs)) = segments.split_last() else {
        return Err(DistillError::path_mapping(address, "no path segment to name the file"));
    };

    let mut path = root.map(Path::to_path_buf).unwrap_or_default();
    path.push(host);
    for dir in dirs {
        path.push(dir);
    }
    path.push(Path::new(file).with_extension("txt"));

    Ok(path)
}
