//! Plain-text rendering of analysis results.

use std::io::{self, Write};

use crate::analysis::call_counts::CallCounts;

const SEPARATOR_WIDTH: usize = 49;

/// Writes the call count table: a header row, a separator row, then one row
/// per function that was called directly at least once, sorted ascending by
/// name. Columns are left-justified and padded.
pub fn write_table<W: Write + ?Sized>(out: &mut W, counts: &CallCounts) -> io::Result<()> {
    writeln!(out, "{:<20} {:<10}", "NAME", "#N DIRECT CALLS")?;
    writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))?;

    for (name, count) in counts.iter() {
        writeln!(out, "{:<20} {:<10}", name, count)?;
    }

    Ok(())
}

/// Writes the banner and title printed above the table on the eager path.
pub fn write_banner<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(SEPARATOR_WIDTH))?;
    writeln!(out, "static analysis results")?;
    writeln!(out, "{}", "=".repeat(SEPARATOR_WIDTH))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::data::types::FuncName;

    fn render(counts: &CallCounts) -> String {
        let mut out = Vec::new();
        write_table(&mut out, counts).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn rows_are_sorted_and_padded() {
        let mut counts = CallCounts::new();
        counts.record(&FuncName::new("foo"));
        counts.record(&FuncName::new("bar"));
        counts.record(&FuncName::new("bar"));

        let expected = "\
NAME                 #N DIRECT CALLS\n\
-------------------------------------------------\n\
bar                  2         \n\
foo                  1         \n";

        assert_eq!(render(&counts), expected);
    }

    #[test]
    fn empty_table_renders_header_only() {
        let expected = "\
NAME                 #N DIRECT CALLS\n\
-------------------------------------------------\n";

        assert_eq!(render(&CallCounts::new()), expected);
    }

    #[test]
    fn formatter_is_idempotent() {
        let mut counts = CallCounts::new();
        counts.record(&FuncName::new("alpha"));
        counts.record(&FuncName::new("bravo"));

        assert_eq!(render(&counts), render(&counts));
    }

    #[test]
    fn table_from_parsed_module() {
        let text = "\
            func @main() {\n\
            entry:\n\
            \x20 call @foo()\n\
            \x20 call @foo()\n\
            \x20 call @bar()\n\
            \x20 ret\n\
            }\n\
            func @foo() {\n\
            entry:\n\
            \x20 call @bar()\n\
            \x20 ret\n\
            }\n\
            decl @bar\n";

        let module = crate::data::parser::parse_module(&mut text.as_bytes()).unwrap();
        let counts = crate::analysis::count_direct_calls(&module);

        let expected = "\
NAME                 #N DIRECT CALLS\n\
-------------------------------------------------\n\
bar                  2         \n\
foo                  1         \n";

        assert_eq!(render(&counts), expected);
    }

    #[test]
    fn order_is_case_sensitive_lexicographic() {
        let mut counts = CallCounts::new();
        counts.record(&FuncName::new("bravo"));
        counts.record(&FuncName::new("alpha"));
        counts.record(&FuncName::new("charlie"));

        let rendered = render(&counts);
        let names = rendered
            .lines()
            .skip(2)
            .map(|line| line.split_whitespace().next().unwrap())
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["alpha", "bravo", "charlie"]);
    }
}
