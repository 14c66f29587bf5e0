use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Run an external command detached from the window manager.
///
/// The child gets its own session and has stdio redirected to /dev/null. It is never
/// waited on: SIGCHLD is ignored at startup so the kernel reaps it.
pub fn spawn(argv: &[String]) -> std::io::Result<()> {
    let Some((program, args)) = argv.split_first() else {
        return Ok(());
    };

    debug!(?argv, "spawning");
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    unsafe {
        command.pre_exec(|| {
            nix::unistd::setsid()
                .map(|_| ())
                .map_err(std::io::Error::from)
        });
    }

    command.spawn().map(|_| ())
}

/// Spawn through `sh -c`, for autostart entries and other single command strings.
pub fn spawn_shell(command: &str) {
    let argv = ["sh", "-c", command].map(String::from);
    if let Err(error) = spawn(&argv) {
        warn!(%command, %error, "failed to spawn");
    }
}

/// Parent pid of `pid` according to `/proc/<pid>/stat`, or 0 when unknown.
pub fn parent_process(pid: u32) -> u32 {
    std::fs::read_to_string(format!("/proc/{pid}/stat"))
        .ok()
        .and_then(|stat| parse_parent_pid(&stat))
        .unwrap_or(0)
}

/// The fourth field of a stat line. The command name in field two may itself contain
/// spaces and parentheses, so fields are counted from the last `)`.
fn parse_parent_pid(stat: &str) -> Option<u32> {
    let after_name = &stat[stat.rfind(')')? + 1..];
    after_name.split_whitespace().nth(1)?.parse().ok()
}

/// Whether `child` is `parent` or one of its descendants.
pub fn is_descendant_process(parent: u32, child: u32) -> bool {
    is_descendant_with(parent, child, parent_process)
}

fn is_descendant_with(parent: u32, mut child: u32, parent_of: impl Fn(u32) -> u32) -> bool {
    while child != parent && child != 0 {
        child = parent_of(child);
    }
    child != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case("1234 (st) S 1200 1234 1234 0", Some(1200); "simple")]
    #[test_case("99 (my (weird) prog) R 42 99 99", Some(42); "parens in name")]
    #[test_case("garbage", None; "malformed")]
    #[test]
    fn parent_pid(stat: &str, expected: Option<u32>) {
        assert_eq!(parse_parent_pid(stat), expected);
    }

    fn tree(pid: u32) -> u32 {
        match pid {
            30 => 20,
            20 => 10,
            10 => 1,
            _ => 0,
        }
    }

    #[test_case(10, 30, true; "grandchild")]
    #[test_case(20, 20, true; "itself")]
    #[test_case(30, 10, false; "ancestor")]
    #[test_case(5, 30, false; "unrelated")]
    #[test]
    fn descendants(parent: u32, child: u32, expected: bool) {
        assert_eq!(is_descendant_with(parent, child, tree), expected);
    }

    #[test]
    fn spawning_nothing_is_fine() {
        assert!(spawn(&[]).is_ok());
    }
}
