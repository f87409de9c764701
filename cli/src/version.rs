use optree_core::{CommandSpec, Invocation, Opt, slot};

use crate::common::{self, CommonOptions};
use crate::root::VERSION;
use crate::sprinkles::{self, Sprinkles};

#[derive(Debug, Default)]
pub struct Version {
    pub common: CommonOptions,
    pub sprinkles: Sprinkles,
    pub help: bool,
    pub all_help: bool,
    pub args: Vec<String>,
}

/// State of the two leaf commands under `version`.
#[derive(Debug, Default)]
pub struct VersionLeaf {
    pub common: CommonOptions,
    pub help: bool,
    pub args: Vec<String>,
}

pub fn command() -> CommandSpec<Version> {
    CommandSpec::new()
        .with_help("\nUsage: {{.Command}}\n\nOutputs the program's version.\n")
        .with_summary("Output the version of the program.")
        .with_group(common::options(), slot!(Version, common))
        .with_group(sprinkles::options(), slot!(Version, sprinkles))
        .with_option(Opt::help_switch(slot!(Version, help)))
        .with_option(Opt::all_help_switch(slot!(Version, all_help)))
        .with_args(slot!(Version, args))
        .with_handler(|version: &mut Version, invocation: &mut Invocation<'_>| {
            if !version.args.is_empty() {
                return 1;
            }
            let _ = writeln!(invocation.stdout(), "Version {VERSION}");
            0
        })
        .with_subcommand(
            "only",
            leaf(
                "Outputs the program's version number, and only the version number.",
                "Output the version number of the program, and only the version number.",
            ),
        )
        .with_hidden_subcommand(
            "hidden",
            leaf(
                "Mostly just an example of a hidden subcommand.",
                "Mostly just an example of a hidden subcommand.",
            ),
        )
}

fn leaf(description: &str, summary: &str) -> CommandSpec<VersionLeaf> {
    CommandSpec::new()
        .with_help(&format!("\nUsage: {{{{.Command}}}}\n\n{description}\n"))
        .with_summary(summary)
        .with_group(common::options(), slot!(VersionLeaf, common))
        .with_option(Opt::help_switch(slot!(VersionLeaf, help)))
        .with_args(slot!(VersionLeaf, args))
        .with_handler(|leaf: &mut VersionLeaf, invocation: &mut Invocation<'_>| {
            if !leaf.args.is_empty() {
                return 1;
            }
            let _ = writeln!(invocation.stdout(), "{VERSION}");
            0
        })
}
