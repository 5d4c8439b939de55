use colored::Colorize;
use lvcs::changes::ChangeSet;
use lvcs::tree::{Entry, EntryKind, RootEntry};

pub fn render_tree(tree: &RootEntry) -> String {
    let mut lines = Vec::new();
    for child in tree.root().children() {
        render_entry(child, 0, &mut lines);
    }
    lines.join("\n")
}

fn render_entry(entry: &Entry, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    match entry.kind() {
        EntryKind::Directory { children } => {
            lines.push(format!("{indent}{}", format!("{}/", entry.name()).blue().bold()));
            for child in children {
                render_entry(child, depth + 1, lines);
            }
        }
        EntryKind::File { content, .. } => {
            let size = format!("({} bytes)", content.len());
            lines.push(format!("{indent}{} {}", entry.name(), size.dimmed()));
        }
    }
}

/// One block per change set, with the index `tree --before` takes.
pub fn render_log<'a>(change_sets: impl IntoIterator<Item = (usize, &'a ChangeSet)>) -> String {
    let mut lines = Vec::new();
    for (index, change_set) in change_sets {
        let name = change_set.name().unwrap_or("unnamed");
        lines.push(format!(
            "{} {} {}",
            format!("#{index}").yellow(),
            change_set.timestamp().to_string().dimmed(),
            name.bold()
        ));
        for change in change_set.changes() {
            lines.push(format!("    {change}"));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvcs::history::{LocalHistory, Operation};

    fn history() -> LocalHistory {
        let mut history = LocalHistory::new();
        history
            .record(
                Some("import"),
                1,
                vec![
                    Operation::create_directory("src"),
                    Operation::create_file("src/main.rs", "fn main() {}"),
                    Operation::create_file("README", "hi"),
                ],
            )
            .unwrap();
        history.rename("README", "README.md", 2).unwrap();
        history
    }

    #[test]
    fn tree_lists_children_below_their_directory() {
        let rendered = render_tree(history().tree());
        let lines = rendered.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("README.md"));
        assert!(lines[1].contains("src/"));
        assert!(lines[2].starts_with("  main.rs"));
        assert!(lines[2].contains("12 bytes"));
    }

    #[test]
    fn empty_tree_renders_nothing() {
        assert_eq!(render_tree(&RootEntry::new()), "");
    }

    #[test]
    fn log_shows_every_change() {
        let history = history();
        let rendered = render_log(history.change_list().change_sets().enumerate());

        assert!(rendered.contains("#0"));
        assert!(rendered.contains("rename README to README.md"));
        assert!(rendered.contains("#1"));
        assert!(rendered.contains("import"));
        assert!(rendered.contains("create file src/main.rs"));
        assert_eq!(rendered.lines().count(), 6);
    }
}
