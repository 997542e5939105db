use log::{debug, trace};
use regex::Regex;
use std::sync::LazyLock;

use crate::types::{Command, Dependency};

/// How one command family is recognized.
struct CommandRule {
    command: Command,
    /// Group 1 (or group 2 for alternative syntaxes) captures the argument.
    pattern: &'static str,
    /// The argument is a comma-separated list of files.
    list: bool,
}

/// Rules are applied in this order; matches are then sorted by position, so
/// the order only breaks ties that cannot happen in practice.
const COMMAND_RULES: &[CommandRule] = &[
    CommandRule {
        command: Command::Input,
        // \input{file} or the primitive form \input file
        pattern: r"\\input(?:[ \t]*\{([^{}\n]*)\}|[ \t]+([^\s{}%\\]+))",
        list: false,
    },
    CommandRule { command: Command::Include, pattern: r"\\include[ \t]*\{([^{}\n]*)\}", list: false },
    CommandRule {
        command: Command::IncludeGraphics,
        pattern: r"\\includegraphics\*?[ \t]*(?:\[[^\]\n]*\][ \t]*)*\{([^{}\n]*)\}",
        list: false,
    },
    CommandRule {
        command: Command::Bibliography,
        pattern: r"\\bibliography[ \t]*\{([^{}\n]*)\}",
        list: true,
    },
    CommandRule {
        command: Command::AddBibResource,
        pattern: r"\\addbibresource[ \t]*(?:\[[^\]\n]*\][ \t]*)*\{([^{}\n]*)\}",
        list: true,
    },
    CommandRule {
        command: Command::UsePackage,
        pattern: r"\\usepackage[ \t]*(?:\[[^\]\n]*\][ \t]*)*\{([^{}\n]*)\}",
        list: true,
    },
    CommandRule {
        command: Command::DocumentClass,
        pattern: r"\\documentclass[ \t]*(?:\[[^\]\n]*\][ \t]*)*\{([^{}\n]*)\}",
        list: false,
    },
];

static COMPILED_RULES: LazyLock<Vec<(&'static CommandRule, Regex)>> = LazyLock::new(|| {
    COMMAND_RULES
        .iter()
        .map(|rule| (rule, Regex::new(rule.pattern).expect("invalid command pattern")))
        .collect()
});

/// Extract every dependency command from LaTeX source, in order of appearance.
///
/// Comments are dropped first. A command and its arguments must sit on one
/// line. Commands with an empty argument or unbalanced braces do not match
/// and are skipped; the rest of the text is still
/// scanned. Repeated references are all returned.
pub fn extract(contents: &str) -> Vec<Dependency> {
    let text = strip_comments(contents);
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
        .collect();

    let mut found: Vec<(usize, Dependency)> = Vec::new();

    for (rule, regex) in COMPILED_RULES.iter() {
        for caps in regex.captures_iter(&text) {
            let (Some(whole), Some(arg)) = (caps.get(0), caps.get(1).or_else(|| caps.get(2)))
            else {
                continue;
            };
            let line = line_starts.partition_point(|&start| start <= whole.start());

            let items: Vec<&str> = if rule.list {
                arg.as_str().split(',').map(str::trim).collect()
            } else {
                vec![arg.as_str().trim()]
            };

            for item in items {
                if item.is_empty() {
                    trace!("Skipping empty argument of {} on line {}", rule.command, line);
                    continue;
                }
                found.push((
                    whole.start(),
                    Dependency { command: rule.command, raw: item.to_string(), line },
                ));
            }
        }
    }

    // Stable: list items of one command keep their written order.
    found.sort_by_key(|(offset, _)| *offset);
    debug!("Extracted {} dependency references", found.len());
    found.into_iter().map(|(_, dep)| dep).collect()
}

/// Blank out comments while keeping the line structure intact.
fn strip_comments(contents: &str) -> String {
    contents.lines().map(strip_line_comment).collect::<Vec<_>>().join("\n")
}

fn strip_line_comment(line: &str) -> &str {
    if line.trim_start().starts_with('%') {
        return "";
    }
    let mut escaped = false;
    for (idx, b) in line.bytes().enumerate() {
        match b {
            b'\\' => escaped = !escaped,
            b'%' if !escaped => return &line[..idx],
            _ => escaped = false,
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(contents: &str) -> Vec<(Command, String)> {
        extract(contents).into_iter().map(|d| (d.command, d.raw)).collect()
    }

    #[test]
    fn test_input_and_include() {
        let deps = pairs("\\input{intro}\n\\include{chapters/ch01}\n");
        assert_eq!(
            deps,
            vec![
                (Command::Input, "intro".to_string()),
                (Command::Include, "chapters/ch01".to_string()),
            ]
        );
    }

    #[test]
    fn test_input_without_braces() {
        let deps = pairs("\\input preamble\\relax\n");
        assert_eq!(deps, vec![(Command::Input, "preamble".to_string())]);
    }

    #[test]
    fn test_similar_commands_do_not_match() {
        let deps = pairs(
            "\\includeonly{ch01}\n\\inputencoding{utf8}\n\\bibliographystyle{plain}\n\\nobibliography{x}\n",
        );
        assert!(deps.is_empty(), "unexpected matches: {:?}", deps);
    }

    #[test]
    fn test_includegraphics_with_options() {
        let deps = pairs(
            "\\includegraphics[width=0.5\\textwidth]{figures/plot}\n\\includegraphics*[scale=2][x]{logo}\n",
        );
        assert_eq!(
            deps,
            vec![
                (Command::IncludeGraphics, "figures/plot".to_string()),
                (Command::IncludeGraphics, "logo".to_string()),
            ]
        );
    }

    #[test]
    fn test_bibliography_list() {
        let deps = pairs("\\bibliography{refs1, refs2}");
        assert_eq!(
            deps,
            vec![
                (Command::Bibliography, "refs1".to_string()),
                (Command::Bibliography, "refs2".to_string()),
            ]
        );
    }

    #[test]
    fn test_packages_and_class() {
        let deps = pairs(
            "\\documentclass[11pt,a4paper]{article}\n\\usepackage[utf8]{inputenc}\n\\usepackage{amsmath,amssymb}\n\\addbibresource{lib.bib}\n",
        );
        assert_eq!(
            deps,
            vec![
                (Command::DocumentClass, "article".to_string()),
                (Command::UsePackage, "inputenc".to_string()),
                (Command::UsePackage, "amsmath".to_string()),
                (Command::UsePackage, "amssymb".to_string()),
                (Command::AddBibResource, "lib.bib".to_string()),
            ]
        );
    }

    #[test]
    fn test_order_follows_text_across_rules() {
        let deps = pairs("\\includegraphics{a}\\input{b}\n\\bibliography{c}\\include{d}");
        let raws: Vec<_> = deps.iter().map(|(_, r)| r.as_str()).collect();
        assert_eq!(raws, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let deps = pairs("\\input{common}\n\\input{common}\n");
        assert_eq!(deps.len(), 2);
    }

    #[test]
    fn test_commented_lines_are_ignored() {
        let deps = pairs("% \\input{ignored}\n   %\\include{also}\n\\input{kept}\n");
        assert_eq!(deps, vec![(Command::Input, "kept".to_string())]);
    }

    #[test]
    fn test_inline_comment_and_escaped_percent() {
        let deps = pairs("\\input{a} % \\input{b}\n50\\% done \\input{c}\n\\\\% \\input{d}\n");
        let raws: Vec<_> = deps.iter().map(|(_, r)| r.as_str()).collect();
        assert_eq!(raws, vec!["a", "c"]);
    }

    #[test]
    fn test_malformed_commands_are_skipped() {
        let deps = pairs("\\input{}\n\\include{broken\n\\bibliography{a,,b}\n\\input{ok}\n");
        assert_eq!(
            deps,
            vec![
                (Command::Bibliography, "a".to_string()),
                (Command::Bibliography, "b".to_string()),
                (Command::Input, "ok".to_string()),
            ]
        );
    }

    #[test]
    fn test_unclosed_argument_does_not_span_lines() {
        let deps = pairs("\\input{chap\nSome prose here} and more\n\\input{ok}\n");
        assert_eq!(deps, vec![(Command::Input, "ok".to_string())]);

        let deps = pairs("\\usepackage[draft\n]{graphicx}\n\\input\n\nbody\n");
        assert!(deps.is_empty());
    }

    #[test]
    fn test_line_numbers() {
        let deps = extract("\\documentclass{article}\n\n% \\input{x}\n\\input{body}\n");
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].line, 1);
        assert_eq!(deps[1].line, 4);
    }

    #[test]
    fn test_no_commands() {
        assert!(extract("Just text, no dependencies.\n").is_empty());
        assert!(extract("").is_empty());
    }
}
