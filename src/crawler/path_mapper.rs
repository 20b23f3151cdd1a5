use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};
use url::Url;

const INDEX_FILE: &str = "index.html";
const HTML_EXTENSION: &str = ".html";

/// Maps an absolute URL to the file it is mirrored into.
///
/// The result is `<download_root>/<host[:port]>/<path>`, where a directory-like
/// path gets `index.html` appended and an extension-less file name gets `.html`.
/// Query and fragment never take part in the mapping.
///
/// This must stay a pure function of its inputs: the worker that saves a
/// resource and the rewriter that links to it both call it, and they only
/// agree because they compute the same thing.
pub fn map_to_local_path(download_root: &Path, url: &Url) -> PathBuf {
    let decoded = urlencoding::decode(url.path()).unwrap_or(Cow::Borrowed(url.path()));
    let decoded: &str = &decoded;
    let mut relative = decoded.strip_prefix('/').unwrap_or(decoded).to_owned();
    if relative.is_empty() || relative.ends_with('/') {
        relative.push_str(INDEX_FILE);
    }

    let mut local_path = download_root.join(host_directory(url));
    let mut pushed_segments = 0;
    for segment in relative
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
    {
        local_path.push(segment);
        pushed_segments += 1;
    }
    if pushed_segments == 0 {
        local_path.push(INDEX_FILE);
    }

    if !has_extension(&local_path) {
        let mut with_extension = local_path.into_os_string();
        with_extension.push(HTML_EXTENSION);
        local_path = PathBuf::from(with_extension);
    }
    local_path
}

/// Relative reference from the page stored at `from_file` to `to_file`,
/// always with `/` separators so it can be written into an HTML attribute.
pub fn relative_link(from_file: &Path, to_file: &Path) -> Option<String> {
    let from_dir = from_file.parent()?;
    let relative = pathdiff::diff_paths(to_file, from_dir)?;
    let segments = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy()),
            Component::ParentDir => Some(Cow::Borrowed("..")),
            _ => None,
        })
        .collect::<Vec<_>>();
    Some(segments.join("/"))
}

fn host_directory(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_owned(),
    }
}

// Any dot in the file name counts, so `.htaccess` or `archive.` keep their names.
fn has_extension(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().contains('.'))
        .unwrap_or(false)
}
