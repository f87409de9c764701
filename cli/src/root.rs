use optree_core::{CommandSpec, Invocation, Opt, slot};

use crate::{cat, version};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP: &str = r#"
Usage: {{.Command}} [options] subcommand [subcommand] ...

This example program offers two simple subcommands, "cat" and "version". It exists to show the feature set of optree, a declarative command-line library.

In this help text, {{"{{.Command}}"}} is replaced with the name of the calling executable, followed by the subcommand path when shown for a subcommand, so examples stay correct whatever the program was installed as.

The help text is Markdown: it is rewrapped to fit the terminal, *colorized* where it makes sense, and can even hold simple tables:

| Heading One | Heading Two |
| ---: | --- |
| Blah | Yadda yadda |
| Crazy Is | What crazy does |
| Test Link | https://example.com/ |

It can also hold `code snippets` and code blocks:

```
fn main() {
    println!("Hello World!");
}
```

Usage text for the options below is **not** Markdown, since it is already laid out in columns.
"#;

#[derive(Debug, Default)]
pub struct Root {
    pub help: bool,
    pub color: bool,
    pub version: bool,
    pub debug: bool,
}

pub fn root() -> CommandSpec<Root> {
    CommandSpec::new()
        .with_help(HELP)
        .with_option(Opt::help_switch(slot!(Root, help)))
        .with_option(
            Opt::new("color", "color", slot!(Root, color))
                .with_help("Controls color output; use --no-color to disable.")
                .with_default("terminal"),
        )
        .with_option(
            Opt::new("version", "V,version", slot!(Root, version))
                .with_help("Output version information."),
        )
        .with_option(
            Opt::new("debug", "v,debug", slot!(Root, debug))
                .with_help("Output debug information.")
                .with_default("env:DEBUG"),
        )
        .with_handler(run)
        .with_subcommand("cat", cat::command())
        .with_subcommand("version", version::command())
}

fn run(root: &mut Root, invocation: &mut Invocation<'_>) -> i32 {
    if root.version {
        let _ = writeln!(invocation.stdout(), "Version {VERSION}");
        return 0;
    }
    if root.debug {
        let _ = writeln!(
            invocation.stdout(),
            "No subcommands were given; outputting help text."
        );
    }
    1
}
