//! Build script for the rmake demo project.
//!
//! Run `rmake --help` to list its targets and variables.

use rmake::{
    command, directory_of, func, join, outdated, removal, target, target_default, touch, when,
    Make, Sources, Tasks, Variables,
};

fn targets(vars: &Variables) -> anyhow::Result<Tasks> {
    let greeting = vars.get("GREETING", "hello")?;
    let out = vars.get("OUT", "target/rmake-demo")?;
    let stamp = join([out.as_str(), "stamp"]);

    let mut tasks = Tasks::new();

    let hello = tasks.add(target_default("hello", [command(["echo", greeting.as_str()])]));

    let stamp_task = tasks.add(target(
        "stamp",
        [when(
            outdated(&stamp, Sources::none()),
            [directory_of(&stamp), {
                let stamp = stamp.clone();
                func(move || Ok(touch(&stamp)?))
            }],
        )],
    ));

    tasks.add(target("fail", [command(["sh", "-c", "exit 3"])]));
    tasks.add(target("all", [hello, stamp_task]));
    tasks.add(target("clean", [removal([out])]));

    Ok(tasks)
}

fn main() {
    Make::new().script(file!()).main(targets)
}
