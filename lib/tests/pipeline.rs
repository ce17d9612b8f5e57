use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use kiln::steps::Compressor;
use kiln::{BuildMode, Config, Ctx, Pipeline, Step};

const FILES: &[(&str, &str)] = &[
    ("dist/README.md", "keep me"),
    ("dist/stale.txt", "remove me"),
    ("resources/fonts/body.woff", "woff"),
    ("resources/img/logo.svg", "<svg xmlns='http://www.w3.org/2000/svg'/>"),
    ("resources/scss/main.scss", "@import 'nav';\n.page { color: red; }\n.orphan { color: blue; }\n"),
    ("resources/scss/_nav.scss", ".nav { display: flex; }\n"),
    ("resources/js/lib/vendor.js", "var vendor = true;\n"),
    ("resources/js/main.js", "function greet(name) { return 'hi ' + name; }\n"),
    ("resources/views/index.html", "<body class=\"page\"><nav class=\"nav\">{{ title }}</nav></body>"),
    ("resources/views/about.html", "<body class=\"page\">{{ title }} by {{ author }}</body>"),
    ("resources/views/data/default.json", r#"{ "title": "Home", "author": "Someone" }"#),
    ("resources/views/data/about.html.json", r#"{ "title": "About" }"#),
];

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, contents) in FILES {
        let path = dir.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    dir
}

fn read(root: &Path, path: &str) -> String {
    fs::read_to_string(root.join(path)).unwrap()
}

#[derive(Default)]
struct Counting(AtomicUsize);

impl Compressor for Counting {
    fn compress(&self, _: &Path, bytes: Vec<u8>) -> kiln::Result<Vec<u8>> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(bytes)
    }
}

#[test]
fn production_build() {
    let dir = project();
    let root = dir.path();
    let config = Config::discover(root).unwrap();
    let ctx = Ctx::new(root, &config, BuildMode::Production);
    Pipeline::default().build(&ctx).unwrap();

    assert_eq!(read(root, "dist/README.md"), "keep me");
    assert!(!root.join("dist/stale.txt").exists());
    assert_eq!(read(root, "dist/fonts/body.woff"), "woff");
    assert!(root.join("dist/img/logo.svg").is_file());

    let css = read(root, "dist/css/app.min.css");
    assert!(css.contains(".nav{"));
    assert!(css.contains(".page{"));
    assert!(!css.contains("orphan"));
    assert!(root.join("dist/css/app.min.css.map").is_file());
    assert!(!root.join("dist/css/app.css").exists());

    assert_eq!(read(root, "dist/js/libs.js"), "var vendor = true;\n");
    assert!(root.join("dist/js/app.min.js").is_file());
    assert!(root.join("dist/js/app.min.js.map").is_file());
    assert!(!root.join("dist/js/app.js").exists());

    assert!(read(root, "dist/html/index.html").contains("Home"));
    assert!(read(root, "dist/html/about.html").contains("About by Someone"));
}

#[test]
fn builds_inside_a_saturated_pool() {
    let dir = project();
    let root = dir.path();
    let config = Config::default();
    let ctx = Ctx::new(root, &config, BuildMode::Production);

    let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    pool.install(|| Pipeline::default().build(&ctx)).unwrap();

    assert!(root.join("dist/js/app.min.js").is_file());
    assert!(root.join("dist/css/app.min.css").is_file());
    assert!(root.join("dist/html/index.html").is_file());
}

#[test]
fn development_build() {
    let dir = project();
    let root = dir.path();
    let config = Config::default();
    Pipeline::default().build(&Ctx::new(root, &config, BuildMode::Development)).unwrap();

    let css = read(root, "dist/css/app.css");
    assert!(css.contains("orphan"));
    assert!(!root.join("dist/css/app.css.map").exists());
    assert!(read(root, "dist/js/app.js").contains("function greet(name)"));
    assert!(!root.join("dist/js/app.js.map").exists());
}

#[test]
fn configuration_file_is_honored() {
    let dir = project();
    let root = dir.path();
    fs::write(root.join("furnace.toml"), r#"
        [paths.fonts]
        input = "resources/fonts/**/*.woff"
        output = "dist/assets/fonts"

        [lint.scripts]
        max_errors = 0
    "#).unwrap();

    let config = Config::discover(root).unwrap();
    let ctx = Ctx::new(root, &config, BuildMode::Development);
    Pipeline::default().run(Step::Fonts, &ctx).unwrap();
    assert!(root.join("dist/assets/fonts/body.woff").is_file());

    fs::write(root.join("furnace.toml"), "[paths.fonts]\ninput = 'x'\noutput = 'elsewhere'\n").unwrap();
    assert!(Config::discover(root).is_err());
}

#[test]
fn lint_failure_aborts_build() {
    let dir = project();
    let root = dir.path();
    fs::write(root.join("resources/js/main.js"), "debugger;\n").unwrap();

    let config = Config::default();
    let error = Pipeline::default()
        .build(&Ctx::new(root, &config, BuildMode::Production))
        .unwrap_err();

    assert!(error.lint_failure().is_some());
    assert!(!root.join("dist/js/app.min.js").exists());
}

#[test]
fn rebuilds_skip_unchanged_images() {
    let dir = project();
    let root = dir.path();
    let config = Config::default();
    let ctx = Ctx::new(root, &config, BuildMode::Development);
    let pipeline = Pipeline::with_compressor(Counting::default());

    pipeline.build(&ctx).unwrap();
    assert_eq!(pipeline.images().compressor().0.load(Ordering::SeqCst), 1);

    pipeline.rebuild(&ctx).unwrap();
    assert_eq!(pipeline.images().compressor().0.load(Ordering::SeqCst), 1);

    let html = read(root, "dist/html/index.html");
    assert!(html.contains("Home"));
}

#[test]
fn clean_is_idempotent() {
    let dir = project();
    let root = dir.path();
    let config = Config::default();
    let ctx = Ctx::new(root, &config, BuildMode::Development);
    let pipeline = Pipeline::default();

    pipeline.build(&ctx).unwrap();
    pipeline.run(Step::Clean, &ctx).unwrap();
    pipeline.run(Step::Clean, &ctx).unwrap();

    let left: Vec<_> = fs::read_dir(root.join("dist")).unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();

    assert_eq!(left, vec!["README.md"]);
}
