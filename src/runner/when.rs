//! Condition combinators
//!
//! Conditions guard task nodes. They are evaluated against the execution
//! [`Context`], which supplies the global dependency list used by
//! [`outdated`].

use crate::error::ExecutionResult;
use crate::runner::Context;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;
use tracing::trace;

type Predicate = dyn Fn(&Context) -> ExecutionResult<bool>;

/// A guard predicate attached to a task
#[derive(Clone)]
pub struct Condition(Rc<Predicate>);

impl Condition {
    /// Wrap a context-aware predicate
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Context) -> ExecutionResult<bool> + 'static,
    {
        Condition(Rc::new(f))
    }

    /// Evaluate the condition
    pub fn evaluate(&self, ctx: &Context) -> ExecutionResult<bool> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Condition(..)")
    }
}

/// Condition from a plain closure
pub fn predicate<F>(f: F) -> Condition
where
    F: Fn() -> bool + 'static,
{
    Condition::new(move |_| Ok(f()))
}

/// True if every condition is true. Stops at the first false one.
pub fn all<I>(conds: I) -> Condition
where
    I: IntoIterator<Item = Condition>,
{
    let mut conds: Vec<Condition> = conds.into_iter().collect();
    if conds.len() == 1 {
        return conds.remove(0);
    }

    Condition::new(move |ctx| {
        for cond in &conds {
            if !cond.evaluate(ctx)? {
                return Ok(false);
            }
        }
        Ok(true)
    })
}

/// True if any condition is true. Stops at the first true one.
pub fn any<I>(conds: I) -> Condition
where
    I: IntoIterator<Item = Condition>,
{
    let mut conds: Vec<Condition> = conds.into_iter().collect();
    if conds.len() == 1 {
        return conds.remove(0);
    }

    Condition::new(move |ctx| {
        for cond in &conds {
            if cond.evaluate(ctx)? {
                return Ok(true);
            }
        }
        Ok(false)
    })
}

/// True if the path does not exist
pub fn missing(path: impl Into<PathBuf>) -> Condition {
    let path = path.into();
    Condition::new(move |ctx| Ok(!crate::utils::exists(ctx.resolve(&path))))
}

/// True if the target is missing or older than any of its dependencies
///
/// The dependencies are the context's global dependencies followed by
/// `sources`. A dependency that cannot be stat'ed counts as newer; it is
/// reported as a warning.
pub fn outdated(target: impl Into<PathBuf>, sources: impl Into<Sources>) -> Condition {
    let target = target.into();
    let sources = sources.into();

    Condition::new(move |ctx| {
        let target_time = match modified(&ctx.resolve(&target)) {
            Ok(time) => time,
            Err(_) => {
                trace!(output = %target.display(), "target missing");
                return Ok(true);
            }
        };

        let mut deps = ctx.global_deps.clone();
        deps.extend(sources.resolve()?);

        for dep in &deps {
            match modified(&ctx.resolve(dep)) {
                Ok(time) if time > target_time => {
                    trace!(output = %target.display(), dep = %dep.display(), "dependency is newer");
                    return Ok(true);
                }
                Ok(_) => {}
                Err(err) => {
                    ctx.print_warning(&format!(
                        "{} dependency {}: {}",
                        target.display(),
                        dep.display(),
                        err
                    ));
                    return Ok(true);
                }
            }
        }

        Ok(false)
    })
}

fn modified(path: &Path) -> std::io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

type Lister = dyn Fn() -> ExecutionResult<Vec<PathBuf>>;

/// A possibly lazy list of dependency paths
///
/// Lazy sources are resolved every time the condition is evaluated, so a
/// glob sees the files present at that moment.
#[derive(Clone, Default)]
pub struct Sources(Option<Rc<Lister>>);

impl Sources {
    /// No per-call dependencies
    pub fn none() -> Self {
        Sources(None)
    }

    /// Dependencies computed when the condition is evaluated
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn() -> ExecutionResult<Vec<PathBuf>> + 'static,
    {
        Sources(Some(Rc::new(f)))
    }

    /// Produce the dependency list
    pub fn resolve(&self) -> ExecutionResult<Vec<PathBuf>> {
        match &self.0 {
            Some(f) => f(),
            None => Ok(Vec::new()),
        }
    }
}

impl fmt::Debug for Sources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(_) => f.write_str("Sources(..)"),
            None => f.write_str("Sources(none)"),
        }
    }
}

impl<P: Into<PathBuf>> From<Vec<P>> for Sources {
    fn from(paths: Vec<P>) -> Self {
        let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        Sources::lazy(move || Ok(paths.clone()))
    }
}

impl<P: Into<PathBuf>, const N: usize> From<[P; N]> for Sources {
    fn from(paths: [P; N]) -> Self {
        Sources::from(Vec::from(paths))
    }
}
