//! Task trees and their execution
//!
//! A [`Task`] is an immutable node built only through the factory functions
//! in this module. Every node gets a fresh [`TaskId`] at construction; the
//! engine uses it to run each node at most once per invocation, however many
//! parents reference it.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{execute_command, Condition, Context, Env};
use crate::utils;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque per-node identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    pub(crate) fn next() -> Self {
        TaskId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

type Function = dyn Fn(&Context) -> anyhow::Result<()>;

/// A node in a build tree
///
/// Cloning a task clones the handle, not the node: the clone has the same
/// identity and runs at most once together with the original.
#[derive(Clone)]
pub struct Task {
    inner: Rc<Node>,
}

struct Node {
    id: TaskId,
    kind: Kind,
}

enum Kind {
    /// Children run in order, gated by the optional condition
    Group {
        name: Option<String>,
        default: bool,
        condition: Option<Condition>,
        children: Vec<Task>,
    },

    /// External program
    Command { argv: Vec<String>, env: Env },

    /// Side-effecting closure
    Function(Box<Function>),
}

impl Task {
    fn from_kind(kind: Kind) -> Self {
        Task {
            inner: Rc::new(Node {
                id: TaskId::next(),
                kind,
            }),
        }
    }

    fn new_group(
        name: Option<String>,
        default: bool,
        condition: Option<Condition>,
        children: Vec<Task>,
    ) -> Self {
        Self::from_kind(Kind::Group {
            name,
            default,
            condition,
            children,
        })
    }

    pub(crate) fn new_command(argv: Vec<String>, env: Env) -> Self {
        Self::from_kind(Kind::Command { argv, env })
    }

    /// Identity of this node
    pub fn id(&self) -> TaskId {
        self.inner.id
    }

    /// Target name, if this is a named target
    pub fn name(&self) -> Option<&str> {
        match &self.inner.kind {
            Kind::Group { name, .. } => name.as_deref(),
            _ => None,
        }
    }

    /// Whether this target runs when no target is named
    pub fn is_default(&self) -> bool {
        matches!(self.inner.kind, Kind::Group { default: true, .. })
    }

    /// Child tasks, in execution order
    pub fn children(&self) -> &[Task] {
        match &self.inner.kind {
            Kind::Group { children, .. } => children,
            _ => &[],
        }
    }

    /// Command line of a command task
    pub fn argv(&self) -> Option<&[String]> {
        match &self.inner.kind {
            Kind::Command { argv, .. } => Some(argv),
            _ => None,
        }
    }

    /// Run this task and its children
    ///
    /// Returns whether any work happened: a command or function ran
    /// somewhere in the subtree. A node already visited in `ctx` is skipped
    /// without evaluating its condition. A false condition skips the whole
    /// subtree. Nodes are marked visited before anything else, so a skipped
    /// or failed node is not attempted again in the same context.
    pub fn run(&self, ctx: &mut Context) -> ExecutionResult<bool> {
        if !ctx.visit(self.id()) {
            trace!(id = ?self.id(), "already visited");
            return Ok(false);
        }

        match &self.inner.kind {
            Kind::Group {
                name,
                condition,
                children,
                ..
            } => {
                if let Some(condition) = condition {
                    if !condition.evaluate(ctx)? {
                        debug!(id = ?self.id(), name = ?name, "condition false, skipping subtree");
                        return Ok(false);
                    }
                }

                let mut worked = false;
                for child in children {
                    if child.run(ctx)? {
                        worked = true;
                    }
                }
                Ok(worked)
            }

            Kind::Command { argv, env } => {
                if argv.is_empty() {
                    return Ok(false);
                }
                execute_command(argv, env, ctx)?;
                Ok(true)
            }

            Kind::Function(function) => {
                function(ctx).map_err(ExecutionError::Function)?;
                Ok(true)
            }
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.kind {
            Kind::Group {
                name,
                default,
                condition,
                children,
            } => f
                .debug_struct("Group")
                .field("id", &self.inner.id)
                .field("name", name)
                .field("default", default)
                .field("guarded", &condition.is_some())
                .field("children", children)
                .finish(),
            Kind::Command { argv, env } => f
                .debug_struct("Command")
                .field("id", &self.inner.id)
                .field("argv", argv)
                .field("env", env)
                .finish(),
            Kind::Function(_) => f
                .debug_struct("Function")
                .field("id", &self.inner.id)
                .finish(),
        }
    }
}

/// Run a task tree in the given context
pub fn run(task: &Task, ctx: &mut Context) -> ExecutionResult<bool> {
    task.run(ctx)
}

/// Named target
pub fn target(name: impl Into<String>, tasks: impl IntoIterator<Item = Task>) -> Task {
    Task::new_group(Some(name.into()), false, None, tasks.into_iter().collect())
}

/// Named target that runs when no target is given on the command line
pub fn target_default(name: impl Into<String>, tasks: impl IntoIterator<Item = Task>) -> Task {
    Task::new_group(Some(name.into()), true, None, tasks.into_iter().collect())
}

/// Anonymous group of tasks
pub fn group(tasks: impl IntoIterator<Item = Task>) -> Task {
    Task::new_group(None, false, None, tasks.into_iter().collect())
}

/// Tasks that run only if the condition holds
pub fn when(condition: Condition, tasks: impl IntoIterator<Item = Task>) -> Task {
    Task::new_group(None, false, Some(condition), tasks.into_iter().collect())
}

/// Command task
pub fn command<I, S>(argv: I) -> Task
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Env::new().command(argv)
}

/// Command task prefixed by `optional` when it is non-empty
pub fn command_wrap<I, S>(optional: &str, argv: I) -> Task
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Env::new().command_wrap(optional, argv)
}

/// Command task from a whitespace-separated command line
pub fn system(commandline: &str) -> Task {
    Env::new().system(commandline)
}

/// Function task
pub fn func<F>(f: F) -> Task
where
    F: Fn() -> anyhow::Result<()> + 'static,
{
    func_in_context(move |_| f())
}

/// Function task that sees the execution context
///
/// Relative paths should go through [`Context::resolve`] so that they agree
/// with commands and conditions when a working directory is set.
pub fn func_in_context<F>(f: F) -> Task
where
    F: Fn(&Context) -> anyhow::Result<()> + 'static,
{
    Task::from_kind(Kind::Function(Box::new(f)))
}

/// Create a directory and its parents
pub fn directory(path: impl Into<PathBuf>) -> Task {
    let path = path.into();
    func_in_context(move |ctx| {
        std::fs::create_dir_all(ctx.resolve(&path))?;
        Ok(())
    })
}

/// Create the parent directory of a file
pub fn directory_of(filename: &str) -> Task {
    directory(utils::dir(filename))
}

/// Remove directory trees
///
/// Every path is attempted; the first error is reported. Missing paths are
/// not an error.
pub fn removal<I, P>(paths: I) -> Task
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
    func_in_context(move |ctx| {
        let mut first_error = None;
        for path in &paths {
            if let Err(err) = utils::remove_all(ctx.resolve(path)) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    })
}

/// Install a file
pub fn installation(destination: impl Into<String>, source: impl Into<String>, executable: bool) -> Task {
    let destination = destination.into();
    let source = source.into();
    func_in_context(move |ctx| {
        let destination = resolve_str(ctx, &destination);
        let source = resolve_str(ctx, &source);
        utils::install(&destination, &source, executable)?;
        Ok(())
    })
}

fn resolve_str(ctx: &Context, path: &str) -> String {
    ctx.resolve(Path::new(path)).to_string_lossy().into_owned()
}

/// Ordered list of top-level tasks
#[derive(Debug, Clone, Default)]
pub struct Tasks(Vec<Task>);

impl Tasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task and return a handle to it
    pub fn add(&mut self, task: Task) -> Task {
        self.0.push(task.clone());
        task
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.0
    }
}

impl From<Vec<Task>> for Tasks {
    fn from(tasks: Vec<Task>) -> Self {
        Tasks(tasks)
    }
}

impl From<Tasks> for Vec<Task> {
    fn from(tasks: Tasks) -> Self {
        tasks.0
    }
}

impl FromIterator<Task> for Tasks {
    fn from_iter<T: IntoIterator<Item = Task>>(iter: T) -> Self {
        Tasks(iter.into_iter().collect())
    }
}

impl IntoIterator for Tasks {
    type Item = Task;
    type IntoIter = std::vec::IntoIter<Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Tasks {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{predicate, Verbosity};
    use std::cell::Cell;

    fn quiet() -> Context {
        Context::new().with_verbosity(Verbosity::Quiet)
    }

    fn counter() -> (Rc<Cell<u32>>, Task) {
        let count = Rc::new(Cell::new(0));
        let task = {
            let count = count.clone();
            func(move || {
                count.set(count.get() + 1);
                Ok(())
            })
        };
        (count, task)
    }

    #[test]
    fn test_ids_are_unique() {
        let a = command(["echo", "x"]);
        let b = command(["echo", "x"]);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), a.clone().id());
    }

    #[test]
    fn test_shared_child_runs_once() {
        let (count, shared) = counter();
        let tree = group([
            group([shared.clone()]),
            group([shared.clone()]),
            shared,
        ]);

        let mut ctx = quiet();
        assert!(tree.run(&mut ctx).unwrap());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_identical_nodes_both_run() {
        let count = Rc::new(Cell::new(0));
        let make = || {
            let count = count.clone();
            func(move || {
                count.set(count.get() + 1);
                Ok(())
            })
        };
        let tree = group([make(), make()]);

        let mut ctx = quiet();
        tree.run(&mut ctx).unwrap();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_false_guard_skips_subtree() {
        let (b_count, b) = counter();
        let (c_count, c) = counter();
        let tree = when(predicate(|| false), [b, c]);

        let mut ctx = quiet();
        assert!(!tree.run(&mut ctx).unwrap());
        assert_eq!(b_count.get(), 0);
        assert_eq!(c_count.get(), 0);
    }

    #[test]
    fn test_true_guard_runs_children_in_order() {
        let order = Rc::new(std::cell::RefCell::new(Vec::new()));
        let step = |n: u32| {
            let order = order.clone();
            func(move || {
                order.borrow_mut().push(n);
                Ok(())
            })
        };
        let tree = when(predicate(|| true), [step(1), step(2), step(3)]);

        let mut ctx = quiet();
        assert!(tree.run(&mut ctx).unwrap());
        assert_eq!(*order.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_visited_node_skips_condition() {
        let evaluations = Rc::new(Cell::new(0));
        let guarded = {
            let evaluations = evaluations.clone();
            when(
                predicate(move || {
                    evaluations.set(evaluations.get() + 1);
                    true
                }),
                [],
            )
        };
        let tree = group([guarded.clone(), guarded]);

        let mut ctx = quiet();
        tree.run(&mut ctx).unwrap();
        assert_eq!(evaluations.get(), 1);
    }

    #[test]
    fn test_gated_skip_leaves_children_unvisited() {
        let (count, shared) = counter();
        let tree = group([
            when(predicate(|| false), [shared.clone()]),
            group([shared.clone()]),
        ]);

        let mut ctx = quiet();
        assert!(tree.run(&mut ctx).unwrap());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_gated_node_itself_is_marked_visited() {
        let (count, child) = counter();
        let flip = Rc::new(Cell::new(false));
        let gated = {
            let flip = flip.clone();
            when(predicate(move || flip.get()), [child])
        };

        let mut ctx = quiet();
        assert!(!gated.run(&mut ctx).unwrap());
        flip.set(true);
        assert!(!gated.run(&mut ctx).unwrap());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_no_work_reported() {
        let tree = target("noop", [when(predicate(|| false), [])]);
        let mut ctx = quiet();
        assert!(!tree.run(&mut ctx).unwrap());
    }

    #[test]
    fn test_empty_command_does_no_work() {
        let tree = command(Vec::<String>::new());
        let mut ctx = quiet();
        assert!(!tree.run(&mut ctx).unwrap());
    }

    #[test]
    fn test_function_failure_stops_siblings() {
        let (count, after) = counter();
        let tree = group([func(|| Err(anyhow::anyhow!("broken"))), after]);

        let mut ctx = quiet();
        let result = tree.run(&mut ctx);
        assert!(matches!(result, Err(ExecutionError::Function(_))));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_command_failure_is_error() {
        let tree = group([command(["false"])]);
        let mut ctx = quiet();
        assert!(matches!(
            tree.run(&mut ctx),
            Err(ExecutionError::CommandFailed { .. })
        ));
    }

    #[test]
    fn test_condition_error_propagates() {
        let cond = Condition::new(|_| {
            Err(ExecutionError::Glob {
                pattern: "[".to_string(),
                message: "bad".to_string(),
            })
        });
        let tree = when(cond, [command(["true"])]);
        let mut ctx = quiet();
        assert!(matches!(tree.run(&mut ctx), Err(ExecutionError::Glob { .. })));
    }

    #[test]
    fn test_target_accessors() {
        let t = target_default("all", [command(["true"])]);
        assert_eq!(t.name(), Some("all"));
        assert!(t.is_default());
        assert_eq!(t.children().len(), 1);
        assert_eq!(t.children()[0].argv().unwrap(), &["true".to_string()]);

        let g = group([]);
        assert_eq!(g.name(), None);
        assert!(!g.is_default());
    }

    #[test]
    fn test_command_wrap_and_system() {
        assert_eq!(
            command_wrap("", ["cc", "-c"]).argv().unwrap(),
            &["cc".to_string(), "-c".to_string()]
        );
        assert_eq!(
            command_wrap("ccache", ["cc"]).argv().unwrap(),
            &["ccache".to_string(), "cc".to_string()]
        );
        assert_eq!(
            system("  cc  -o out main.c ").argv().unwrap(),
            &["cc", "-o", "out", "main.c"].map(String::from)
        );
    }

    #[test]
    fn test_tasks_add_returns_shared_handle() {
        let mut tasks = Tasks::new();
        let added = tasks.add(target("a", []));
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks.as_slice()[0].id(), added.id());
    }

    #[test]
    fn test_directory_and_removal() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("a/b/c");
        let mut ctx = quiet();

        assert!(directory(&nested).run(&mut ctx).unwrap());
        assert!(nested.is_dir());

        let top = dir.path().join("a");
        assert!(removal([&top, &dir.path().join("missing")]).run(&mut ctx).unwrap());
        assert!(!top.exists());
    }

    #[test]
    fn test_file_tasks_use_working_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut ctx = quiet().with_working_dir(dir.path());

        assert!(directory("out/obj").run(&mut ctx).unwrap());
        assert!(dir.path().join("out/obj").is_dir());

        std::fs::write(dir.path().join("tool"), "data").unwrap();
        assert!(installation("out/bin/", "tool", false).run(&mut ctx).unwrap());
        assert!(dir.path().join("out/bin/tool").is_file());

        assert!(removal(["out"]).run(&mut ctx).unwrap());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_func_in_context_sees_working_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut ctx = quiet().with_working_dir(dir.path());
        let task = func_in_context(|ctx| {
            std::fs::write(ctx.resolve(Path::new("made")), "")?;
            Ok(())
        });

        assert!(task.run(&mut ctx).unwrap());
        assert!(dir.path().join("made").exists());
    }
}
