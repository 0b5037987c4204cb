//! Integration tests for Bazelisk
//!
//! Every test isolates the cache with BAZELISK_HOME and runs inside a
//! temporary workspace, so nothing touches the real user cache or the
//! network.

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::path::Path;
    use std::thread;
    use tempfile::TempDir;

    fn bazelisk(workspace: &Path, home: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("bazelisk");
        cmd.current_dir(workspace)
            .env("BAZELISK_HOME", home)
            .env_remove("USE_NIGHTLY_BAZEL")
            .env_remove("USE_BAZEL_NIGHTLY")
            .env_remove("USE_CANARY_BAZEL")
            .env_remove("USE_BAZEL_CANARY")
            .env_remove("BAZELISK_BASE_URL")
            .env_remove("BAZELISK_LATEST_URL");
        cmd
    }

    /// Read one HTTP request and return its path
    fn read_request_path(stream: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    data.extend_from_slice(&buf[..n]);
                    if data.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
            }
        }
        String::from_utf8_lossy(&data)
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .unwrap_or_default()
            .to_string()
    }

    /// One-shot HTTP server answering a single request, then exiting
    fn one_shot_server(response_for: impl Fn(&str) -> String + Send + 'static) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let path = read_request_path(&mut stream);
                let _ = stream.write_all(response_for(&path).as_bytes());
            }
        });
        format!("http://{addr}")
    }

    /// Artifact filename for the platform the test binary runs on
    fn host_artifact(version: &str) -> String {
        let os = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        format!("bazel-{version}-{os}-{}", std::env::consts::ARCH)
    }

    fn on_supported_arch() -> bool {
        std::env::consts::ARCH == "x86_64"
    }

    #[test]
    fn nightly_channel_fails_loudly() {
        let workspace = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        bazelisk(workspace.path(), home.path())
            .env("USE_BAZEL_NIGHTLY", "1")
            .arg("version")
            .assert()
            .failure()
            .stderr(predicate::str::contains("nightly"));
    }

    #[test]
    fn canary_channel_fails_loudly() {
        let workspace = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        bazelisk(workspace.path(), home.path())
            .env("USE_CANARY_BAZEL", "1")
            .arg("version")
            .assert()
            .failure()
            .stderr(predicate::str::contains("canary"));
    }

    #[test]
    fn unreachable_release_store_reports_fetch_failure() {
        if !on_supported_arch() {
            return;
        }
        let workspace = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        fs::write(workspace.path().join(".bazelversion"), "0.17.1\n").unwrap();

        bazelisk(workspace.path(), home.path())
            .env("BAZELISK_BASE_URL", "http://127.0.0.1:1")
            .arg("version")
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to fetch"));
    }

    #[cfg(unix)]
    #[test]
    fn cached_binary_runs_and_exit_code_is_forwarded() {
        use std::os::unix::fs::PermissionsExt;

        if !on_supported_arch() {
            return;
        }
        let workspace = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        fs::write(workspace.path().join(".bazelversion"), "1.2.3\n").unwrap();

        // Seed the cache with a fake bazel that records its argv.
        let cache_dir = home.path().join("bin");
        fs::create_dir_all(&cache_dir).unwrap();
        let fake = cache_dir.join(host_artifact("1.2.3"));
        fs::write(&fake, "#!/bin/sh\necho \"argv: $@\"\nexit 7\n").unwrap();
        fs::set_permissions(&fake, fs::Permissions::from_mode(0o755)).unwrap();

        bazelisk(workspace.path(), home.path())
            // Unroutable store proves the hit path makes no network call.
            .env("BAZELISK_BASE_URL", "http://127.0.0.1:1")
            .args(["build", "//..."])
            .assert()
            .code(7)
            .stdout(predicate::str::contains("argv: build //..."));
    }

    #[cfg(unix)]
    #[test]
    fn latest_resolves_downloads_and_runs() {
        use std::os::unix::fs::PermissionsExt;

        if !on_supported_arch() {
            return;
        }
        let workspace = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        // Release index answers with a redirect to the tagged release.
        let index_url = one_shot_server(|_| {
            "HTTP/1.1 302 Found\r\n\
             Location: https://github.com/bazelbuild/bazel/releases/tag/1.2.3\r\n\
             Content-Length: 0\r\nConnection: close\r\n\r\n"
                .to_string()
        });

        // Release store serves the binary, but only under the canonical
        // /{version}/release/{filename} path.
        let expected_path = format!("/1.2.3/release/{}", host_artifact("1.2.3"));
        let store_url = one_shot_server(move |path| {
            if path == expected_path {
                let body = "#!/bin/sh\nexit 3\n";
                format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                )
            } else {
                "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                    .to_string()
            }
        });

        bazelisk(workspace.path(), home.path())
            .env("BAZELISK_LATEST_URL", &index_url)
            .env("BAZELISK_BASE_URL", &store_url)
            .arg("version")
            .assert()
            .code(3);

        // The artifact is cached under the resolved version, executable.
        let cached = home.path().join("bin").join(host_artifact("1.2.3"));
        assert!(cached.is_file());
        let mode = fs::metadata(&cached).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn seeded_cache_entry_is_made_executable() {
        use std::os::unix::fs::PermissionsExt;

        if !on_supported_arch() {
            return;
        }
        let workspace = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        fs::write(workspace.path().join(".bazelversion"), "1.2.3\n").unwrap();

        // Present but not executable, as a crashed chmod would leave it.
        let cache_dir = home.path().join("bin");
        fs::create_dir_all(&cache_dir).unwrap();
        let fake = cache_dir.join(host_artifact("1.2.3"));
        fs::write(&fake, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&fake, fs::Permissions::from_mode(0o600)).unwrap();

        bazelisk(workspace.path(), home.path())
            .env("BAZELISK_BASE_URL", "http://127.0.0.1:1")
            .arg("version")
            .assert()
            .success();

        let mode = fs::metadata(&fake).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
