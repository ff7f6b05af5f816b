//! Command registry
//!
//! A static table from command name to a typed handler record. Dispatch
//! matches on [`CommandKind`], so adding a command without a handler does
//! not compile.

/// Every command the terminal understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Ls,
    Cat,
    Search,
    Categories,
    Posts,
    Help,
}

/// Handler record: name, positional-argument contract, help text
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub kind: CommandKind,
    pub name: &'static str,
    /// Positional arguments accepted; extra words are ignored
    pub max_args: usize,
    pub usage: &'static str,
    pub summary: &'static str,
    pub example: &'static str,
}

/// The command table, in help order
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        kind: CommandKind::Ls,
        name: "ls",
        max_args: 2,
        usage: "ls [page] [per_page]",
        summary: "Lists all articles.",
        example: "ls, ls 2, ls 2 5",
    },
    CommandSpec {
        kind: CommandKind::Cat,
        name: "cat",
        max_args: 1,
        usage: "cat <post-id or slug>",
        summary: "Displays a specific article by its ID or slug.",
        example: "cat 123, cat example-post-title",
    },
    CommandSpec {
        kind: CommandKind::Search,
        name: "search",
        max_args: 3,
        usage: "search <query> [page] [per_page]",
        summary: "Searches articles with the given query.",
        example: "search keyword, search \"two words\" 2",
    },
    CommandSpec {
        kind: CommandKind::Categories,
        name: "categories",
        max_args: 0,
        usage: "categories",
        summary: "Lists all categories.",
        example: "categories",
    },
    CommandSpec {
        kind: CommandKind::Posts,
        name: "posts",
        max_args: 1,
        usage: "posts <category-id>",
        summary: "Lists all articles in a specific category.",
        example: "posts 5",
    },
    CommandSpec {
        kind: CommandKind::Help,
        name: "help",
        max_args: 0,
        usage: "help",
        summary: "Displays this help message.",
        example: "help",
    },
];

/// Look up a command by exact name
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.name == name)
}

/// Command names, in help order
pub fn names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|spec| spec.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("ls").map(|s| s.kind), Some(CommandKind::Ls));
        assert_eq!(lookup("posts").map(|s| s.kind), Some(CommandKind::Posts));
        assert!(lookup("foobar").is_none());
        assert!(lookup("").is_none());
        assert!(lookup("LS").is_none());
    }

    #[test]
    fn test_names_are_unique() {
        let mut all: Vec<_> = names().collect();
        let count = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), count);
        assert_eq!(count, 6);
    }
}
