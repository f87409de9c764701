use std::fs::File;
use std::io::{self, Write};

use optree_core::{CommandSpec, Invocation, Opt, slot};
use tracing::debug;

use crate::common::{self, CommonOptions};
use crate::root::Root;
use crate::sprinkles::{self, Sprinkles};

const HELP: &str = "
Usage: {{.Command}} [options] filename [filename] ...

Outputs the content of the named file or files.
";

#[derive(Debug, Default)]
pub struct Cat {
    pub common: CommonOptions,
    pub sprinkles: Sprinkles,
    pub help: bool,
    pub filenames: bool,
    pub prefix: String,
    pub count: i64,
    /// Replaces the `sprinkle-type` option from [`Sprinkles`].
    pub sprinkle_type: i64,
    pub files: Vec<String>,
}

pub fn command() -> CommandSpec<Cat> {
    CommandSpec::new()
        .with_help(HELP)
        .with_summary("Output the content of a file or files.")
        .with_group(common::options(), slot!(Cat, common))
        .with_group(sprinkles::options(), slot!(Cat, sprinkles))
        .with_option(Opt::help_switch(slot!(Cat, help)))
        .with_option(
            Opt::new("filenames", "f,filenames", slot!(Cat, filenames))
                .with_help("Outputs filenames before each file."),
        )
        .with_option(
            Opt::new("prefix", "p,prefix", slot!(Cat, prefix))
                .with_help("Prefix to output before each filename, if any.")
                .with_default("## "),
        )
        .with_option(
            Opt::new("count", "c,count", slot!(Cat, count))
                .with_help("The number of times to output each file.")
                .with_default("env:COUNT,1"),
        )
        .with_option(
            Opt::new("sprinkle_type", "sprinkle-type", slot!(Cat, sprinkle_type))
                .with_help("The type of sprinkles to output (overridden).")
                .with_default("1"),
        )
        .with_args(slot!(Cat, files))
        .with_handler(run)
}

fn run(cat: &mut Cat, invocation: &mut Invocation<'_>) -> i32 {
    cat.sprinkles.kind = cat.sprinkle_type;
    if cat.files.is_empty() {
        return 1;
    }
    let debug = invocation.parent::<Root>().is_some_and(|root| root.debug);
    match output(cat, debug, invocation.stdout()) {
        Ok(()) => 0,
        Err(err) => {
            let _ = writeln!(invocation.stderr(), "{err}");
            2
        }
    }
}

fn output(cat: &Cat, debug: bool, out: &mut dyn Write) -> io::Result<()> {
    cat.sprinkles.sprinkle(out)?;
    if debug {
        writeln!(out, "We have {} files to output", cat.files.len())?;
    }
    for path in &cat.files {
        if cat.filenames {
            writeln!(out, "{}{path}", cat.prefix)?;
        }
        for _ in 0..cat.count {
            let mut file = File::open(path)
                .map_err(|err| io::Error::new(err.kind(), format!("open {path}: {err}")))?;
            io::copy(&mut file, out)?;
        }
        debug!(path = %path, count = cat.count, "Copied file");
    }
    cat.sprinkles.sprinkle(out)
}
