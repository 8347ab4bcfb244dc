// Stand-in programs for process-level tests, so the pipeline runs without a C++ toolchain

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Stand-in for g++, invoked as `<cc> -O3 <source> -o <binary>`.
/// "Compiles" by copying the (shell script) source to the binary path.
const FAKE_COMPILER: &str = r#"#!/bin/sh
src="$2"
out="$4"
echo "note: compiling $src"
if grep -q 'slow compile' "$src"; then
  exec sleep 5
fi
if grep -q 'syntax error' "$src"; then
  echo "$src:1:14: error: expected ';' before '}' token" >&2
  exit 1
fi
cp "$src" "$out" && chmod +x "$out"
"#;

/// Install an executable script at `dir/name`.
///
/// The final file is written by a `cp` child, never through a write handle in
/// this process, so a concurrent fork in another test cannot make exec fail
/// with ETXTBSY.
pub(crate) fn install_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let staging = dir.join(format!("{}.txt", name));
    let target = dir.join(name);
    std::fs::write(&staging, body).unwrap();

    let status = Command::new("cp").arg(&staging).arg(&target).status().unwrap();
    assert!(status.success(), "cp failed for {}", target.display());
    std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o755)).unwrap();
    target
}

pub(crate) fn fake_compiler(dir: &Path) -> PathBuf {
    install_script(dir, "fake-cc", FAKE_COMPILER)
}

/// Poll until `pid` no longer runs. A zombie waiting for its new parent to
/// reap it counts as gone. Gives up after two seconds.
#[cfg(target_os = "linux")]
pub(crate) async fn wait_until_gone(pid: &str) -> bool {
    let stat = Path::new("/proc").join(pid).join("stat");
    for _ in 0..40 {
        let Ok(content) = std::fs::read_to_string(&stat) else {
            return true;
        };
        // State is the first field after the parenthesized command name
        let state = content
            .rsplit(')')
            .next()
            .and_then(|rest| rest.split_whitespace().next());
        if matches!(state, Some("Z") | Some("X")) {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    false
}
