// tests/site_tests.rs

use std::fs;
use std::path::Path;

use dataview::{IndexError, Site, SiteError, Value};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn sample_docs() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(
        root,
        "guides/install.md",
        "---\ntitle: Install\ntags:\n  - howto\nfeatureID: F1\n---\nInstall steps\n",
    );
    write(
        root,
        "guides/usage.md",
        "---\ntags: [howto, F1]\n---\nUsage\n",
    );
    write(root, "notes.txt", "not markdown\n");
    write(
        root,
        "index.mdtmpl",
        "---\ntitle: Home\nfeatureID: F1\n---\n# `= this.metadata.title`\n\n```dataview\nTABLE file.link, metadata.featureID FROM #howto\n```\n\n```dataview\nLIST WHERE this.metadata.featureID IN metadata.tags\n```\n",
    );

    dir
}

#[test]
fn test_collect_indexes_markdown_and_templates() {
    let docs = sample_docs();
    let site = Site::collect(docs.path()).unwrap();

    let keys: Vec<&str> = site.index().iter().map(|d| d.key.as_str()).collect();
    assert_eq!(keys, vec!["guides/install.md", "guides/usage.md", "index.mdtmpl"]);

    let template = site.index().get("index.mdtmpl").unwrap();
    assert_eq!(template.file.path, "index.md");
    assert_eq!(template.file.name, "index.mdtmpl");

    assert_eq!(site.templates().len(), 1);
    assert_eq!(site.index().documents_with_tag("howto").count(), 2);
}

#[test]
fn test_render_templates_writes_markdown() {
    let docs = sample_docs();
    let site = Site::collect(docs.path()).unwrap();

    let written = site.render_templates().unwrap();
    assert_eq!(written, vec![docs.path().join("index.md")]);

    let output = fs::read_to_string(docs.path().join("index.md")).unwrap();
    let expected = "---\n\
generated_ignore: true\n\
title: Home\n\
featureID: F1\n\
---\n\
# Home\n\
\n\
|file.link|metadata.featureID|\n\
|--|--|\n\
|[Install](guides/install.md)|F1|\n\
|[usage.md](guides/usage.md)||\n\
\n\
- [usage.md](guides/usage.md)\n";
    assert_eq!(output, expected);
}

#[test]
fn test_rendered_output_is_not_indexed_again() {
    let docs = sample_docs();
    Site::collect(docs.path()).unwrap().render_templates().unwrap();

    let site = Site::collect(docs.path()).unwrap();
    assert!(site.index().get("index.md").is_none());
    assert!(site.index().get("index.mdtmpl").is_some());

    // Rendering twice gives the same result
    let first = fs::read_to_string(docs.path().join("index.md")).unwrap();
    site.render_templates().unwrap();
    let second = fs::read_to_string(docs.path().join("index.md")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_reserved_key_names_the_file() {
    let docs = sample_docs();
    write(docs.path(), "bad.md", "---\nfile: nope\n---\n");

    let err = Site::collect(docs.path()).unwrap_err();
    match err {
        SiteError::Index { path, source } => {
            assert!(path.ends_with("bad.md"));
            assert!(matches!(source, IndexError::ReservedKey(_)));
        }
        other => panic!("Expected index error, got {:?}", other),
    }
}

#[test]
fn test_invalid_front_matter() {
    let docs = sample_docs();
    write(docs.path(), "broken.md", "---\ntitle: [unclosed\n---\n");

    let err = Site::collect(docs.path()).unwrap_err();
    assert!(matches!(
        err,
        SiteError::Index {
            source: IndexError::FrontMatter(_),
            ..
        }
    ));
}

#[test]
fn test_this_record_for_template() {
    let docs = sample_docs();
    let site = Site::collect(docs.path()).unwrap();
    let template = &site.templates()[0];

    let this = site.this_record(&template.key, &template.file);
    let metadata = this.as_object().unwrap()["metadata"].as_object().unwrap().clone();
    assert_eq!(metadata["featureID"], Value::from("F1"));
}

#[test]
fn test_hidden_and_ignore_listed_documents_are_indexed() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, ".drafts/a.md", "---\ntags: [x]\n---\n");
    write(root, "b.md", "---\ntags: [x]\n---\n");
    write(root, "c.md", "---\ntags: [x]\n---\n");
    write(root, ".ignore", "c.md\n");
    write(root, ".gitignore", "b.md\n");

    let site = Site::collect(root).unwrap();
    assert_eq!(site.root(), root);

    let tagged: Vec<&str> = site.index().documents_with_tag("x").map(|d| d.key.as_str()).collect();
    assert_eq!(tagged, vec![".drafts/a.md", "b.md", "c.md"]);
    assert_eq!(site.index().tag_names().collect::<Vec<_>>(), vec!["x"]);
}
