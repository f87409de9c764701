use optree_core::{Opt, OptionGroup, slot};

/// Options shared by `cat` and the `version` family.
#[derive(Debug, Default)]
pub struct CommonOptions {
    pub one: String,
    pub two: bool,
}

pub fn options() -> OptionGroup<CommonOptions> {
    OptionGroup::new()
        .with_option(
            Opt::new("one", "one", slot!(CommonOptions, one)).with_help("First common option."),
        )
        .with_option(
            Opt::new("two", "two", slot!(CommonOptions, two)).with_help("Second common option."),
        )
}
