//! Command execution
//!
//! This module handles rendering and executing external commands. Commands
//! are always spawned from an argument vector; the rendered command line is
//! only used for the transcript.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{Context, Env};
use std::process::{Command as StdCommand, Stdio};

/// Quote a single token for the transcript so that it can be pasted back
/// into a shell.
///
/// Tokens without spaces or quotes are returned as-is. For `NAME=value`
/// tokens only the value part is quoted.
pub fn maybe_quote(s: &str) -> String {
    if s.contains('\'') {
        return format!("{:?}", s);
    }

    match s.matches('"').count() {
        0 => {
            let space = match s.find(' ') {
                Some(i) => i,
                None => return s.to_string(),
            };
            match s.find('=') {
                Some(equal) if equal < space => {
                    format!("{}\"{}\"", &s[..=equal], &s[equal + 1..])
                }
                _ => format!("\"{}\"", s),
            }
        }
        2 => {
            let mut beg = s.find(['"', ' ']).unwrap_or(0);
            if let Some(i) = s.find('=') {
                if i < beg {
                    beg = i + 1;
                }
            }
            let end = s.rfind(['"', ' ']).map(|i| i + 1).unwrap_or(s.len());
            format!("{}'{}'{}", &s[..beg], &s[beg..end], &s[end..])
        }
        _ => format!("'{}'", s),
    }
}

/// Render a command with its environment overlay as a single line
pub fn command_line(argv: &[String], env: &Env) -> String {
    let line = argv
        .iter()
        .map(|s| maybe_quote(s))
        .collect::<Vec<_>>()
        .join(" ");

    if env.is_empty() {
        line
    } else {
        format!("{} {}", env, line)
    }
}

/// Execute a command in the given context
///
/// Standard output and error are inherited. The environment overlay is
/// applied to the child process only.
pub fn execute_command(argv: &[String], env: &Env, ctx: &Context) -> ExecutionResult<()> {
    let Some((program, args)) = argv.split_first() else {
        return Ok(());
    };

    let line = command_line(argv, env);
    ctx.print_running(&line);

    let mut command = StdCommand::new(program);
    command.args(args);
    command.envs(env.iter());

    if let Some(dir) = &ctx.working_dir {
        command.current_dir(dir);
    }

    command.stdin(Stdio::inherit());
    command.stdout(Stdio::inherit());
    command.stderr(Stdio::inherit());

    let status = command.status().map_err(|source| ExecutionError::Spawn {
        program: program.clone(),
        source,
    })?;

    if !status.success() {
        return Err(ExecutionError::CommandFailed {
            command: line,
            code: status.code(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::Verbosity;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_quote_bare() {
        assert_eq!(maybe_quote("gcc"), "gcc");
        assert_eq!(maybe_quote("-O2"), "-O2");
        assert_eq!(maybe_quote("CC=gcc"), "CC=gcc");
    }

    #[test]
    fn test_quote_spaces() {
        assert_eq!(maybe_quote("hello world"), "\"hello world\"");
        assert_eq!(maybe_quote("CFLAGS=-O2 -g"), "CFLAGS=\"-O2 -g\"");
        // Equal sign after the space is part of the value
        assert_eq!(maybe_quote("a b=c"), "\"a b=c\"");
    }

    #[test]
    fn test_quote_double_quotes() {
        assert_eq!(maybe_quote("-DNAME=\"x\""), "-DNAME='\"x\"'");
        assert_eq!(maybe_quote("say \"hi\""), "say' \"hi\"'");
        assert_eq!(maybe_quote("a\"b\"c\""), "'a\"b\"c\"'");
    }

    #[test]
    fn test_quote_single_quote() {
        assert_eq!(maybe_quote("it's"), "\"it's\"");
        assert_eq!(maybe_quote("it's \"x\""), "\"it's \\\"x\\\"\"");
    }

    #[test]
    fn test_command_line_with_env() {
        let env = Env::new().var("B", "2").var("A", "x y");
        let line = command_line(&argv(&["echo", "hello world"]), &env);
        assert_eq!(line, "A=\"x y\" B=2 echo \"hello world\"");
    }

    #[test]
    fn test_execute_simple_command() {
        let ctx = Context::new().with_verbosity(Verbosity::Quiet);
        let result = execute_command(&argv(&["true"]), &Env::new(), &ctx);
        assert!(result.is_ok());
    }

    #[test]
    fn test_execute_failing_command() {
        let ctx = Context::new().with_verbosity(Verbosity::Quiet);
        let result = execute_command(&argv(&["sh", "-c", "exit 3"]), &Env::new(), &ctx);
        assert!(matches!(
            result,
            Err(ExecutionError::CommandFailed { code: Some(3), .. })
        ));
    }

    #[test]
    fn test_execute_missing_program() {
        let ctx = Context::new().with_verbosity(Verbosity::Quiet);
        let result = execute_command(
            &argv(&["rmake-no-such-program-xyz"]),
            &Env::new(),
            &ctx,
        );
        assert!(matches!(result, Err(ExecutionError::Spawn { .. })));
    }

    #[test]
    fn test_execute_with_env_overlay() {
        let ctx = Context::new().with_verbosity(Verbosity::Quiet);
        let env = Env::new().var("RMAKE_TEST_OVERLAY", "yes");
        let result = execute_command(
            &argv(&["sh", "-c", "test \"$RMAKE_TEST_OVERLAY\" = yes"]),
            &env,
            &ctx,
        );
        assert!(result.is_ok());
        assert!(std::env::var("RMAKE_TEST_OVERLAY").is_err());
    }

    #[test]
    fn test_empty_command_is_noop() {
        let ctx = Context::new();
        assert!(execute_command(&[], &Env::new(), &ctx).is_ok());
    }
}
