use std::io::{self, Write};

use optree_core::{Opt, OptionGroup, slot};

/// Decoration printed around `cat` output.
#[derive(Debug, Default)]
pub struct Sprinkles {
    pub kind: i64,
    pub count: i64,
}

impl Sprinkles {
    /// Writes one line of sprinkles; only type 1 draws anything.
    pub fn sprinkle(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.kind != 1 {
            return Ok(());
        }
        for _ in 0..self.count {
            out.write_all(b"* + x ")?;
        }
        writeln!(out, "*")
    }
}

pub fn options() -> OptionGroup<Sprinkles> {
    OptionGroup::new()
        .with_option(
            Opt::new("sprinkle_type", "sprinkle-type", slot!(Sprinkles, kind))
                .with_help("The type of sprinkles to output."),
        )
        .with_option(
            Opt::new("sprinkle_count", "sprinkle-count", slot!(Sprinkles, count))
                .with_help("The number of sprinkles to output.")
                .with_default("10"),
        )
}
