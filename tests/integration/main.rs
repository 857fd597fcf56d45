//! Integration tests for shellkeep

mod cli_tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn shellkeep() -> Command {
        Command::cargo_bin("shellkeep").unwrap()
    }

    /// A hermetic deployment: its own config file, stores dir and site tree
    struct Workspace {
        temp: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let ws = Self { temp };
            ws.build_site();
            ws
        }

        fn config_path(&self) -> PathBuf {
            self.temp.path().join("shellkeep.toml")
        }

        fn site_dir(&self) -> PathBuf {
            self.temp.path().join("site")
        }

        fn build_site(&self) {
            let app = self.site_dir().join("app");
            std::fs::create_dir_all(&app).unwrap();
            std::fs::write(app.join("index.html"), "<html>shell</html>").unwrap();
            std::fs::write(app.join("bundle.js"), "console.log('app')").unwrap();
        }

        fn write_config(&self, version: &str, navigation_root: &str) {
            let stores = self.temp.path().join("stores");
            let config = format!(
                r#"
[app]
name = "demo"
version = "{version}"
navigation_root = "{navigation_root}"

[manifest]
resources = ["/app/", "/app/index.html", "/app/bundle.js"]

[store]
dir = "{stores}"
"#,
                stores = stores.display(),
            );
            std::fs::write(self.config_path(), config).unwrap();
        }

        fn cmd(&self, args: &[&str]) -> Command {
            let mut cmd = shellkeep();
            cmd.arg("--config").arg(self.config_path()).args(args);
            cmd
        }

        fn install(&self) {
            self.cmd(&["install", "--from"])
                .arg(self.site_dir())
                .assert()
                .success();
        }
    }

    #[test]
    fn help_displays() {
        shellkeep()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("offline cache"));
    }

    #[test]
    fn version_displays() {
        shellkeep()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("shellkeep"));
    }

    #[test]
    fn init_creates_local_config() {
        let temp = TempDir::new().unwrap();

        shellkeep()
            .args(["init", "--path"])
            .arg(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Created"));

        assert!(temp.path().join("shellkeep.toml").exists());

        // A second init without --force must refuse
        shellkeep()
            .args(["init", "--path"])
            .arg(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn config_show_and_path() {
        let ws = Workspace::new();
        ws.write_config("v1", "/app/");

        ws.cmd(&["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[app]"))
            .stdout(predicate::str::contains("demo"));

        ws.cmd(&["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("shellkeep.toml"));
    }

    #[test]
    fn install_from_directory_populates_store() {
        let ws = Workspace::new();
        ws.write_config("v1", "/app/");

        ws.cmd(&["install", "--from"])
            .arg(ws.site_dir())
            .assert()
            .success()
            .stdout(predicate::str::contains("demo-v1"))
            .stdout(predicate::str::contains("Cached 3 resources"));

        ws.cmd(&["status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("demo-v1"));
    }

    #[test]
    fn install_without_origin_or_dir_fails() {
        let ws = Workspace::new();
        ws.write_config("v1", "/app/");

        ws.cmd(&["install"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("origin"));
    }

    #[test]
    fn fetch_cached_subresource() {
        let ws = Workspace::new();
        ws.write_config("v1", "/app/");
        ws.install();

        ws.cmd(&["fetch", "/app/bundle.js"])
            .assert()
            .success()
            .stdout(predicate::str::contains("status: 200"))
            .stdout(predicate::str::contains("text/javascript"));
    }

    #[test]
    fn fetch_uncached_subresource_is_404() {
        let ws = Workspace::new();
        ws.write_config("v1", "/app/");
        ws.install();

        ws.cmd(&["fetch", "/app/missing.png"])
            .assert()
            .success()
            .stdout(predicate::str::contains("status: 404"))
            .stdout(predicate::str::contains("size: 0 B"));
    }

    #[test]
    fn fetch_navigation_serves_shell_for_any_url() {
        let ws = Workspace::new();
        ws.write_config("v1", "/app/");
        ws.install();

        let out = ws.temp.path().join("shell.html");
        ws.cmd(&["fetch", "/app/some/deep/link", "--navigate", "--output"])
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("status: 200"));

        let body = std::fs::read_to_string(out).unwrap();
        assert_eq!(body, "<html>shell</html>");
    }

    #[test]
    fn navigation_root_mismatch_fails_with_hint() {
        let ws = Workspace::new();
        // The platform-conventional "/" root is not a manifest entry here
        ws.write_config("v1", "/");
        ws.install();

        ws.cmd(&["fetch", "/app/", "--navigate"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not cached"))
            .stderr(predicate::str::contains("navigation_root"));
    }

    #[test]
    fn activate_claims_control() {
        let ws = Workspace::new();
        ws.write_config("v1", "/app/");
        ws.install();

        ws.cmd(&["activate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("demo-v1 is in control"));

        ws.cmd(&["status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Controlling version: v1"))
            .stdout(predicate::str::contains("current"));
    }

    #[test]
    fn activate_before_install_fails() {
        let ws = Workspace::new();
        ws.write_config("v1", "/app/");

        ws.cmd(&["activate"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not found"));
    }

    #[test]
    fn upgrade_prunes_stale_store() {
        let ws = Workspace::new();

        ws.write_config("v1", "/app/");
        ws.install();
        ws.cmd(&["activate"]).assert().success();

        // Deploy v2 over the same stores dir
        ws.write_config("v2", "/app/");
        ws.install();
        ws.cmd(&["activate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed demo-v1"));

        ws.cmd(&["status", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("demo-v2"))
            .stdout(predicate::str::contains("demo-v1").not());
    }

    #[test]
    fn status_json_format() {
        let ws = Workspace::new();
        ws.write_config("v1", "/app/");
        ws.install();

        ws.cmd(&["status", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"name\": \"demo-v1\""))
            .stdout(predicate::str::contains("\"entries\": 3"));
    }
}
