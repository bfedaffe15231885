//! Terminal help rendering.

use std::io::{self, IsTerminal, Write};

use clargs_core::{Registry, RegistryEntry};

const FORMAT_INDENT: &str = "   ";
const HELP_INDENT: &str = "      ";

/// Renders usage text for every declared argument.
///
/// Help text is wrapped to `width` characters per line. A line that breaks
/// inside a word ends with `-`.
///
/// # Examples
///
/// ```
/// use clargs_core::{Declarations, Registry, RouteMode};
/// use clargs_engine::help::render_help;
///
/// let decls = Declarations::new().doc_arg("-dims %d %d", "mesh size");
/// let registry = Registry::build(decls, RouteMode::BuildDocument).unwrap();
///
/// assert_eq!(
///     render_help("macsio", &registry, 70),
///     "usage and help for macsio\n   -dims %d %d\n      mesh size\n"
/// );
/// ```
pub fn render_help(program: &str, registry: &Registry<'_>, width: usize) -> String {
    let mut out = format!("usage and help for {program}\n");
    for entry in registry.entries() {
        match entry {
            RegistryEntry::GroupBegin { name, help } => {
                out.push_str(&format!("  {name}:\n"));
                push_wrapped(&mut out, help, width);
            }
            RegistryEntry::GroupEnd { .. } => out.push('\n'),
            RegistryEntry::Arg(descriptor) => {
                out.push_str(&format!("{FORMAT_INDENT}{}\n", descriptor.format));
                push_wrapped(&mut out, &descriptor.help, width);
                if let Some(default) = &descriptor.default {
                    out.push_str(&format!("{HELP_INDENT}(default: {default})\n"));
                }
            }
        }
    }
    out
}

/// Writes usage text to `out`.
pub fn write_help<W: Write>(
    out: &mut W,
    program: &str,
    registry: &Registry<'_>,
    width: usize,
) -> io::Result<()> {
    out.write_all(render_help(program, registry, width).as_bytes())
}

/// Prints help to stderr when it is a terminal, otherwise to stdout.
pub fn emit_help(program: &str, registry: &Registry<'_>, width: usize) -> io::Result<()> {
    if io::stderr().is_terminal() {
        write_help(&mut io::stderr().lock(), program, registry, width)
    } else {
        let mut stdout = io::stdout().lock();
        write_help(&mut stdout, program, registry, width)?;
        stdout.flush()
    }
}

fn push_wrapped(out: &mut String, text: &str, width: usize) {
    for line in wrap(text, width) {
        if !line.is_empty() {
            out.push_str(HELP_INDENT);
            out.push_str(&line);
        }
        out.push('\n');
    }
}

/// Splits `text` into lines of at most `width` characters, plus a possible
/// trailing `-` on lines that cut a word.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let width = width.max(1);
    let mut lines = Vec::new();

    for segment in text.split('\n') {
        let chars: Vec<char> = segment.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut pos = 0;
        while pos < chars.len() {
            let end = (pos + width).min(chars.len());
            let chunk: String = chars[pos..end].iter().collect();
            let cuts_word = end < chars.len() && chars[end] != ' ' && chars[end - 1] != ' ';

            let mut line = chunk.trim_end().to_string();
            if cuts_word {
                line.push('-');
            }
            lines.push(line);

            pos = end;
            if chars.get(pos) == Some(&' ') {
                pos += 1;
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use clargs_core::{Declarations, RouteMode};
    use proptest::prelude::*;

    #[test]
    fn test_break_inside_word_is_hyphenated() {
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd-", "efgh-", "ij"]);
    }

    #[test]
    fn test_break_at_space_is_not_hyphenated() {
        assert_eq!(wrap("abcd efgh", 4), vec!["abcd", "efgh"]);
    }

    #[test]
    fn test_chunk_ending_in_space_is_not_hyphenated() {
        assert_eq!(wrap("abc defg", 4), vec!["abc", "defg"]);
    }

    #[test]
    fn test_explicit_newlines_start_new_lines() {
        assert_eq!(
            wrap("first line\nsecond\n\nlast", 70),
            vec!["first line", "second", "", "last"]
        );
    }

    #[test]
    fn test_empty_help_renders_no_lines() {
        assert!(wrap("", 70).is_empty());
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        assert_eq!(wrap("ééééé", 3), vec!["ééé-", "éé"]);
    }

    #[test]
    fn test_groups_and_defaults_are_rendered() {
        let decls = Declarations::new()
            .group("mesh", "mesh options")
            .doc_arg("--part_size %d", "bytes per part")
            .with_default("80000")
            .end_group("mesh")
            .doc_arg("-multifile", "");
        let registry = Registry::build(decls, RouteMode::BuildDocument).unwrap();

        let text = render_help("macsio", &registry, 70);

        assert_eq!(
            text,
            "usage and help for macsio\n\
             \x20 mesh:\n\
             \x20     mesh options\n\
             \x20  --part_size %d\n\
             \x20     bytes per part\n\
             \x20     (default: 80000)\n\
             \n\
             \x20  -multifile\n"
        );
    }

    #[test]
    fn test_write_help_matches_rendered_text() {
        let decls = Declarations::new().doc_arg("-dims %d %d", "mesh size");
        let registry = Registry::build(decls, RouteMode::BuildDocument).unwrap();

        let mut out = Vec::new();
        write_help(&mut out, "macsio", &registry, 70).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), render_help("macsio", &registry, 70));
    }

    proptest! {
        #[test]
        fn test_wrapped_lines_fit_width(text in "[a-z \n]{0,200}", width in 1usize..40) {
            for line in wrap(&text, width) {
                prop_assert!(line.chars().count() <= width + 1, "line {:?} exceeds {}", line, width);
            }
        }

        #[test]
        fn test_wrapping_only_drops_spaces(text in "[a-z ]{0,200}", width in 1usize..40) {
            let kept: String = wrap(&text, width)
                .concat()
                .chars()
                .filter(|c| *c != ' ' && *c != '-')
                .collect();
            let expected: String = text.chars().filter(|c| *c != ' ').collect();
            prop_assert_eq!(kept, expected);
        }
    }
}
