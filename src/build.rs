use std::{
    ffi::OsStr,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::{
    error::{Error, Result},
    render::Renderer,
};

const MARKDOWN_EXT: &str = "md";
const HTML_EXT: &str = "html";

/// where rendered posts end up
#[derive(Debug, Clone)]
pub enum Output {
    /// one newline terminated record per post
    Stdout,
    /// one `.html` file per post
    Dir(PathBuf),
}

/// counts for a finished build
#[derive(Debug, Default)]
pub struct BuildReport {
    pub rendered: usize,
    /// posts that could not be read or written, the build carried on without them
    pub failed: Vec<PathBuf>,
}

/// renders every `*.md` file directly inside a source directory
pub struct Builder {
    renderer: Renderer,
}

impl Builder {
    pub fn new(renderer: Renderer) -> Self {
        Self { renderer }
    }

    pub fn run(&self, src: impl AsRef<Path>, output: &Output) -> Result<BuildReport> {
        match output {
            Output::Stdout => self.to_writer(src, io::stdout().lock()),
            Output::Dir(dst) => self.to_dir(src, dst),
        }
    }

    /// Write `<dst>/<name>.html` for each `<src>/<name>.md`, creating `dst` as needed.
    pub fn to_dir(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<BuildReport> {
        let dst = dst.as_ref();
        let sources = sources(src)?;
        fs::create_dir_all(dst).map_err(|source| Error::DirError {
            path: dst.to_path_buf(),
            source,
        })?;

        let mut report = BuildReport::default();
        for md in sources {
            let Some(target) = output_path(&md, dst) else {
                log::warn!("Skipping unexpected path: {}", md.display());
                report.failed.push(md);
                continue;
            };
            log::debug!("markdown file src: {}", md.display());
            log::debug!("markdown file dst: {}", target.display());

            let Some(html) = self.render_file(&md) else {
                report.failed.push(md);
                continue;
            };
            if let Err(err) = fs::write(&target, html) {
                log::warn!("Error writing `{}`: {err}", target.display());
                report.failed.push(md);
                continue;
            }
            report.rendered += 1;
        }
        Ok(report)
    }

    /// Write each rendered post to `writer`, one record per post.
    pub fn to_writer(&self, src: impl AsRef<Path>, mut writer: impl Write) -> Result<BuildReport> {
        let mut report = BuildReport::default();
        for md in sources(src)? {
            log::debug!("markdown file src: {}", md.display());
            let Some(html) = self.render_file(&md) else {
                report.failed.push(md);
                continue;
            };
            if let Err(err) = writeln!(writer, "{html}") {
                log::warn!("Error writing `{}`: {err}", md.display());
                report.failed.push(md);
                continue;
            }
            report.rendered += 1;
        }
        writer.flush()?;
        Ok(report)
    }

    fn render_file(&self, md: &Path) -> Option<String> {
        match fs::read(md) {
            Ok(data) => Some(self.renderer.render(&data)),
            Err(err) => {
                log::warn!("Error reading `{}`: {err}", md.display());
                None
            }
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new(Renderer::default())
    }
}

/// The markdown files directly inside `src`, in glob order.
///
/// A missing source directory or bad pattern is an error; entries glob could not read are
/// logged and left out. Glob only matches utf-8 names, so the directory is scanned
/// afterwards for any other `.md` files and those are appended.
pub fn sources(src: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let src = src.as_ref();
    if !src.is_dir() {
        return Err(Error::MissingSource(src.to_path_buf()));
    }

    let dir = glob::Pattern::escape(&src.to_string_lossy());
    let pattern = format!("{dir}/*.{MARKDOWN_EXT}");
    let mut found = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) => found.push(path),
            Err(err) => log::warn!("Error reading `{}`: {err}", err.path().display()),
        }
    }

    let mut missed = Vec::new();
    for entry in fs::read_dir(src)? {
        let path = entry?.path();
        let matched = found.iter().any(|p| p.file_name() == path.file_name());
        if path.extension() == Some(OsStr::new(MARKDOWN_EXT)) && !matched {
            log::debug!("markdown file outside glob: {}", path.display());
            missed.push(path);
        }
    }
    missed.sort();
    found.extend(missed);
    Ok(found)
}

/// `<dst>/<file name minus .md>.html`
pub fn output_path(md: &Path, dst: &Path) -> Option<PathBuf> {
    if md.extension()? != MARKDOWN_EXT {
        return None;
    }
    let mut name = md.file_stem()?.to_os_string();
    name.push(".");
    name.push(HTML_EXT);
    Some(dst.join(name))
}

/// Remove a generated site directory, returns whether there was anything to remove.
pub fn clean(site: impl AsRef<Path>) -> Result<bool> {
    let site = site.as_ref();
    match fs::remove_dir_all(site) {
        Ok(()) => {
            log::debug!("Removed {}", site.display());
            Ok(true)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn posts(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).unwrap();
        }
        dir
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn output_path_swaps_extension() {
        let dst = Path::new("_site");
        assert_eq!(
            output_path(Path::new("_posts/hello.md"), dst),
            Some(PathBuf::from("_site/hello.html"))
        );
        assert_eq!(
            output_path(Path::new("_posts/notes.md.md"), dst),
            Some(PathBuf::from("_site/notes.md.html"))
        );
        assert_eq!(output_path(Path::new("_posts/readme.txt"), dst), None);
    }

    #[test]
    fn sources_are_md_only_and_non_recursive() {
        let src = posts(&[("a.md", "a"), ("b.md", "b"), ("c.txt", "c")]);
        fs::create_dir(src.path().join("nested")).unwrap();
        fs::write(src.path().join("nested").join("d.md"), "d").unwrap();

        let found = sources(src.path()).unwrap();
        assert_eq!(found, vec![src.path().join("a.md"), src.path().join("b.md")]);
    }

    #[test]
    fn sources_handles_glob_metacharacters_in_dir() {
        let root = tempdir().unwrap();
        let src = root.path().join("[posts]");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("a.md"), "a").unwrap();
        assert_eq!(sources(&src).unwrap(), vec![src.join("a.md")]);
    }

    #[test]
    fn one_html_file_per_post() {
        let src = posts(&[("first.md", "# First"), ("second.md", "*second*")]);
        let dst = tempdir().unwrap();

        let report = Builder::default().to_dir(src.path(), dst.path()).unwrap();
        assert_eq!(report.rendered, 2);
        assert!(report.failed.is_empty());
        assert_eq!(listing(dst.path()), vec!["first.html", "second.html"]);

        let first = fs::read_to_string(dst.path().join("first.html")).unwrap();
        assert!(first.contains("<h1>First</h1>"));
    }

    #[test]
    fn output_dir_is_created() {
        let src = posts(&[("a.md", "a")]);
        let root = tempdir().unwrap();
        let dst = root.path().join("out").join("site");
        Builder::default().to_dir(src.path(), &dst).unwrap();
        assert!(dst.join("a.html").is_file());
    }

    #[test]
    fn rebuild_is_byte_identical() {
        let src = posts(&[("a.md", "# A\n\nsome *text*"), ("b.md", "- one\n- two")]);
        let dst = tempdir().unwrap();
        let builder = Builder::default();

        builder.to_dir(src.path(), dst.path()).unwrap();
        let first: Vec<Vec<u8>> = ["a.html", "b.html"]
            .iter()
            .map(|f| fs::read(dst.path().join(f)).unwrap())
            .collect();
        builder.to_dir(src.path(), dst.path()).unwrap();
        let second: Vec<Vec<u8>> = ["a.html", "b.html"]
            .iter()
            .map(|f| fs::read(dst.path().join(f)).unwrap())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_source_is_fatal_and_writes_nothing() {
        let root = tempdir().unwrap();
        let dst = root.path().join("_site");
        let err = Builder::default()
            .to_dir(root.path().join("_posts"), &dst)
            .unwrap_err();
        assert!(matches!(err, Error::MissingSource(_)));
        assert!(!dst.exists());
    }

    #[test]
    fn empty_source_builds_nothing() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        let report = Builder::default().to_dir(src.path(), dst.path()).unwrap();
        assert_eq!(report.rendered, 0);
        assert!(listing(dst.path()).is_empty());
    }

    #[test]
    fn unreadable_post_does_not_stop_the_build() {
        let src = posts(&[("good.md", "good")]);
        // a directory named like a post matches the glob but can't be read
        fs::create_dir(src.path().join("bad.md")).unwrap();
        let dst = tempdir().unwrap();

        let report = Builder::default().to_dir(src.path(), dst.path()).unwrap();
        assert_eq!(report.rendered, 1);
        assert_eq!(report.failed, vec![src.path().join("bad.md")]);
        assert_eq!(listing(dst.path()), vec!["good.html"]);
    }

    #[test]
    fn writer_gets_one_record_per_post() {
        let src = posts(&[("a.md", "alpha"), ("b.md", "beta")]);
        let mut out = Vec::new();
        let report = Builder::default().to_writer(src.path(), &mut out).unwrap();
        assert_eq!(report.rendered, 2);

        let out = String::from_utf8(out).unwrap();
        assert!(out.ends_with('\n'));
        let records: Vec<&str> = out.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(records, vec!["<p>alpha</p>", "<p>beta</p>"]);
    }

    #[test]
    fn writer_missing_source_is_fatal() {
        let root = tempdir().unwrap();
        let mut out = Vec::new();
        let err = Builder::default()
            .to_writer(root.path().join("nope"), &mut out)
            .unwrap_err();
        assert!(matches!(err, Error::MissingSource(_)));
        assert!(out.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_post_is_rendered() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let src = posts(&[("plain.md", "plain")]);
        let name = OsString::from_vec(b"caf\xff.md".to_vec());
        fs::write(src.path().join(&name), "# X").unwrap();
        let dst = tempdir().unwrap();

        let report = Builder::default().to_dir(src.path(), dst.path()).unwrap();
        assert_eq!(report.rendered, 2);
        assert!(report.failed.is_empty());

        let html = dst.path().join(OsString::from_vec(b"caf\xff.html".to_vec()));
        assert!(fs::read_to_string(html).unwrap().contains("<h1>X</h1>"));
        assert!(dst.path().join("plain.html").is_file());
    }

    /// fails its first write, then accepts everything
    struct FlakyWriter {
        fail_next: bool,
        written: Vec<u8>,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if std::mem::take(&mut self.fail_next) {
                return Err(io::Error::other("disk full"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_record_does_not_stop_the_writer() {
        let src = posts(&[("a.md", "alpha"), ("b.md", "beta")]);
        let mut writer = FlakyWriter {
            fail_next: true,
            written: Vec::new(),
        };

        let report = Builder::default().to_writer(src.path(), &mut writer).unwrap();
        assert_eq!(report.rendered, 1);
        assert_eq!(report.failed, vec![src.path().join("a.md")]);

        let out = String::from_utf8(writer.written).unwrap();
        assert!(!out.contains("alpha"), "{out}");
        assert!(out.contains("<p>beta</p>"), "{out}");
    }

    #[test]
    fn clean_removes_site() {
        let root = tempdir().unwrap();
        let site = root.path().join("_site");
        fs::create_dir(&site).unwrap();
        fs::write(site.join("a.html"), "").unwrap();

        assert!(clean(&site).unwrap());
        assert!(!site.exists());
        assert!(!clean(&site).unwrap());
    }
}
