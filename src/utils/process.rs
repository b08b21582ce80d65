//! Running programs outside of a task tree

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::command_line;
use crate::runner::Env;
use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::thread;

/// Run a command with inherited stdio, printing it first
///
/// Useful inside function tasks.
pub fn run<I, S>(argv: I) -> ExecutionResult<()>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
    let Some((program, args)) = argv.split_first() else {
        return Ok(());
    };

    let line = command_line(&argv, &Env::new());
    println!("Running {}", line);

    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| ExecutionError::Spawn {
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

/// Run a command feeding `input` to its stdin and capturing its stdout
///
/// Stderr is inherited.
pub fn run_io<R, I, S>(mut input: R, argv: I) -> ExecutionResult<Vec<u8>>
where
    R: Read,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
    let Some((program, args)) = argv.split_first() else {
        return Ok(Vec::new());
    };

    let mut data = Vec::new();
    input.read_to_end(&mut data)?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| ExecutionError::Spawn {
            program: program.clone(),
            source,
        })?;

    // Feed stdin from a separate thread so a large output cannot deadlock
    let writer = child.stdin.take().map(|mut stdin| {
        thread::spawn(move || -> io::Result<()> {
            match stdin.write_all(&data) {
                Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        })
    });

    let output = child.wait_with_output()?;

    if let Some(writer) = writer {
        writer
            .join()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "stdin writer panicked"))??;
    }

    if !output.status.success() {
        return Err(ExecutionError::CommandFailed {
            command: command_line(&argv, &Env::new()),
            code: output.status.code(),
        });
    }

    Ok(output.stdout)
}
