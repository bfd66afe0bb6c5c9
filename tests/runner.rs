mod common;

use common::{Calls, Site, tools};
use tsumiki::{BuildError, Profile, Runner, Task, TaskError};

fn seed(site: &Site) {
    site.write("src/html/index.html", "<p> hi </p>");
    site.write("src/js/a.js", "one");
    site.write("src/js/b.js", "two");
    site.write("src/scss/main.scss", ".a{}");
    site.write("src/img/logo.png", [1u8, 2, 3, 4]);
    site.write("src/fonts/font.woff2", [9u8]);
}

#[test]
fn dev_replaces_stale_output() {
    let site = Site::new();
    seed(&site);
    site.write("app/stale.txt", "old");
    site.write("app/js/old.min.js", "old");
    let (tools, _) = tools();

    let services = Runner::new(site.config(Profile::Dev), tools)
        .run(Task::Dev)
        .unwrap();

    assert!(services.is_empty());
    assert_eq!(
        site.list("app"),
        vec![
            "css/main.min.css",
            "fonts/font.woff2",
            "img/logo.png",
            "index.html",
            "js/a.min.js",
            "js/b.min.js",
        ]
    );
}

#[test]
fn dist_uses_the_production_profile() {
    let site = Site::new();
    seed(&site);
    let (tools, calls) = tools();

    // A runner created in dev mode still builds `dist` for production.
    Runner::new(site.config(Profile::Dev), tools)
        .run(Task::Dist)
        .unwrap();

    assert_eq!(site.list("app/js"), vec!["app.min.js"]);
    assert_eq!(site.read("app/css/main.min.css"), "prefix(min(.a{}))");
    assert_eq!(Calls::get(&calls.image), 1);
}

#[test]
fn pipeline_reloads_collapse_into_one_pending_signal() {
    let site = Site::new();
    seed(&site);
    let (tools, _) = tools();
    let runner = Runner::new(site.config(Profile::Dev), tools);
    let events = runner.subscribe().unwrap();

    // Five pipelines each ask for a reload; nobody is listening yet.
    runner.run(Task::Dev).unwrap();
    assert_eq!(events.try_iter().count(), 1);

    runner.run(Task::Html).unwrap();
    assert_eq!(events.try_iter().count(), 1);
    assert!(runner.subscribe().is_none());
}

#[test]
fn clean_removes_a_plain_file_in_place_of_the_output() {
    let site = Site::new();
    seed(&site);
    site.write("app", "not a directory");
    let (tools, _) = tools();

    Runner::new(site.config(Profile::Dev), tools)
        .run(Task::Dev)
        .unwrap();

    assert!(site.exists("app/index.html"));
}

#[test]
fn dev_leaves_hidden_files_behind() {
    let site = Site::new();
    seed(&site);
    for kind in ["html", "js", "scss", "img", "fonts"] {
        site.write(&format!("src/{kind}/.gitkeep"), "");
    }
    site.write("src/img/.DS_Store", [0u8]);
    let (tools, _) = tools();

    Runner::new(site.config(Profile::Dev), tools)
        .run(Task::Dev)
        .unwrap();

    assert!(site.list("app").iter().all(|f| !f.contains("/.") && !f.starts_with('.')));
    assert_eq!(site.list("app/img"), vec!["logo.png"]);
    assert_eq!(site.list("app/fonts"), vec!["font.woff2"]);
}

#[test]
fn pipeline_failure_fails_the_sequence() {
    let site = Site::new();
    seed(&site);
    site.write("src/scss/broken.scss", ".b { color: ERROR; }");
    let (tools, _) = tools();

    let err = Runner::new(site.config(Profile::Dev), tools)
        .run(Task::Dev)
        .unwrap_err();

    assert!(matches!(err, BuildError::Task(Task::Sass, TaskError::Pipeline(_))));
    // Sibling pipelines in the same step still finished.
    assert!(site.exists("app/index.html"));
    assert!(site.exists("app/css/main.min.css"));
}

#[test]
fn single_pipeline_task() {
    let site = Site::new();
    seed(&site);
    let (tools, calls) = tools();

    Runner::new(site.config(Profile::Dev), tools)
        .run(Task::Html)
        .unwrap();

    assert_eq!(site.list("app"), vec!["index.html"]);
    assert_eq!(Calls::get(&calls.lint), 0);
}

#[test]
fn build_rejects_non_pipelines() {
    let site = Site::new();
    let (tools, _) = tools();
    let runner = Runner::new(site.config(Profile::Dev), tools);

    assert!(matches!(
        runner.build(Task::Clean),
        Err(TaskError::NotPipeline(Task::Clean))
    ));
}
