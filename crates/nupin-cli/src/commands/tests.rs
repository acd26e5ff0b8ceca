//! Unit tests for CLI commands.

use super::*;
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = r#"
[install]
repository-path = "Assets/Packages"

[cache]
path = "cache"

[[sources]]
name = "local"
path = "feed"
"#;

const REMOTE_SOURCE: &str = r#"
[[sources]]
name = "remote"
url = "https://packages.example.org/flat"
token-env = "NUPIN_TEST_FEED_TOKEN"
"#;

struct Project {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Project {
    fn new(config: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        fs::write(root.join("nupin.toml"), config).unwrap();
        Self { _dir: dir, root }
    }

    fn context(&self) -> CommandContext {
        CommandContext::load(ConfigLoader::new(self.root.clone()), None).unwrap()
    }

    /// Write a record and a package directory, then push them to the local source
    fn push(&self, id: &str, version: &str, dependencies: &str) {
        let staging = self.root.join("staging").join(format!("{}.{}", id, version));
        fs::create_dir_all(staging.join("content")).unwrap();
        fs::write(staging.join("content").join(format!("{}.js", id)), version).unwrap();

        let record = self.root.join("staging").join(format!("{}.{}.json", id, version));
        fs::write(
            &record,
            format!(r#"{{ "id": "{}", "version": "{}", "dependencies": [{}] }}"#, id, version, dependencies),
        )
        .unwrap();

        push::execute(&record, &staging, "local", &self.context()).unwrap();
    }

    fn packages(&self) -> Utf8PathBuf {
        self.root.join("Assets").join("Packages")
    }
}

#[test]
fn test_parse_identifier() {
    let any = parse_identifier("jQuery", None).unwrap();
    assert!(any.satisfied_by(&"3.1.1".parse().unwrap()));

    let exact = parse_identifier("jQuery", Some("[1.9.1]")).unwrap();
    assert!(exact.is_pinned());

    assert!(parse_identifier("jQuery", Some("[1.9.1")).is_err());
}

#[test]
fn test_parse_identifier_rejects_path_ids() {
    for id in ["../victim", "a/b", "..", " "] {
        assert!(matches!(parse_identifier(id, None), Err(NupinError::Format(_))), "'{}' was accepted", id);
        assert!(parse_identifier(id, Some("1.0")).is_err());
    }
}

#[test]
fn test_uninstall_path_id_leaves_neighbours_alone() {
    let project = Project::new(CONFIG);
    let victim = project.root.join("Assets").join("victim.1.0");
    fs::create_dir_all(&victim).unwrap();

    assert!(uninstall::execute("../victim", false, &project.context()).is_err());
    assert!(install::execute("../victim", None, &project.context()).is_err());
    assert!(victim.is_dir());
}

#[test]
fn test_context_uses_config_paths() {
    let project = Project::new(&format!("{}{}", CONFIG, REMOTE_SOURCE));
    let ctx = project.context();

    assert_eq!(ctx.repository_path(), project.packages());
    assert_eq!(ctx.feed_set().unwrap().len(), 2);
}

#[test]
fn test_push_only_to_folder_sources() {
    let project = Project::new(&format!("{}{}", CONFIG, REMOTE_SOURCE));
    let ctx = project.context();

    assert!(ctx.folder_source("LOCAL").is_ok());
    assert!(matches!(ctx.folder_source("remote"), Err(NupinError::ConfigValidation { .. })));
    assert!(matches!(ctx.folder_source("missing"), Err(NupinError::ConfigValidation { .. })));
}

#[test]
fn test_push_install_and_uninstall() {
    let project = Project::new(CONFIG);
    project.push("jQuery", "1.9.1", "");
    project.push("jQuery", "3.1.1", "");
    project.push("bootstrap", "3.3.7", r#"{ "id": "jQuery", "version": "[1.9.1, 4.0.0)" }"#);
    assert!(project.root.join("feed").join("bootstrap").join("3.3.7").join("record.json").is_file());

    let ctx = project.context();
    install::execute("bootstrap", None, &ctx).unwrap();

    assert!(project.packages().join("bootstrap.3.3.7").join("content").join("bootstrap.js").is_file());
    assert!(project.packages().join("jQuery.1.9.1").is_dir());
    assert!(project.packages().join("packages.json").is_file());
    assert!(project.root.join("cache").join("index.json").is_file());

    list::execute(&ctx).unwrap();
    resolve::execute("jQuery", Some("[3.1.1]"), &ctx).unwrap();

    uninstall::execute("bootstrap", true, &ctx).unwrap();
    assert!(!project.packages().join("bootstrap.3.3.7").exists());
    assert!(!project.packages().join("jQuery.1.9.1").exists());
    assert!(ctx.open_manager().unwrap().installed().is_empty());
}

#[test]
fn test_restore_after_files_are_deleted() {
    let project = Project::new(CONFIG);
    project.push("protobuf-net", "2.0.0.668", "");
    let ctx = project.context();
    install::execute("protobuf-net", Some("2.0.0.668"), &ctx).unwrap();

    fs::remove_dir_all(project.packages().join("protobuf-net.2.0.0.668")).unwrap();
    restore::execute(&ctx).unwrap();

    assert!(project.packages().join("protobuf-net.2.0.0.668").is_dir());
}

#[test]
fn test_install_unknown_package_fails() {
    let project = Project::new(CONFIG);
    let err = install::execute("missing", None, &project.context()).unwrap_err();

    let cause = err.downcast_ref::<NupinError>().unwrap();
    assert!(matches!(cause, NupinError::UnresolvableDependency { .. }));
}

#[test]
fn test_uninstall_all_on_empty_project() {
    let project = Project::new(CONFIG);
    uninstall::execute_all(&project.context()).unwrap();
    uninstall::execute("bootstrap", false, &project.context()).unwrap();
}
