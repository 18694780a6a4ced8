/// A flattened, framework-independent view of the registered commands.
///
/// Built once from the poise command list at startup. Prefix stripping,
/// `help` and `usage` all resolve through it so that name and alias lookup
/// behaves the same everywhere.
#[derive(Clone, Debug, Default)]
pub struct CommandIndex {
    commands: Vec<CommandNode>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandNode {
    pub name: String,
    pub aliases: Vec<String>,
    pub qualified_name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Parameter list rendered as `<required> [optional]`.
    pub signature: String,
    pub owners_only: bool,
    pub children: Vec<CommandNode>,
}

/// Result of resolving user input against the index.
#[derive(Clone, Copy, Debug)]
pub struct Resolved<'a, 'i> {
    pub node: &'a CommandNode,
    /// Text after the last consumed command token, trimmed.
    pub rest: &'i str,
}

impl CommandNode {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            qualified_name: name.clone(),
            name,
            aliases: Vec::new(),
            category: None,
            description: None,
            signature: String::new(),
            owners_only: false,
            children: Vec::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|alias| (*alias).to_owned()).collect();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }

    pub fn with_child(mut self, mut child: CommandNode) -> Self {
        child.requalify(&self.qualified_name);
        self.children.push(child);
        self
    }

    fn requalify(&mut self, parent: &str) {
        self.qualified_name = format!("{parent} {}", self.name);
        let qualified = self.qualified_name.clone();
        for child in &mut self.children {
            child.requalify(&qualified);
        }
    }

    /// Name followed by every alias, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// `qualified name` plus the parameter signature, without a prefix.
    pub fn usage(&self) -> String {
        if self.signature.is_empty() {
            self.qualified_name.clone()
        } else {
            format!("{} {}", self.qualified_name, self.signature)
        }
    }

    fn from_poise<U, E>(command: &poise::Command<U, E>) -> Self {
        Self {
            name: command.name.clone(),
            aliases: command.aliases.clone(),
            qualified_name: command.qualified_name.clone(),
            category: command.category.clone(),
            description: command.description.clone(),
            signature: render_signature(
                command
                    .parameters
                    .iter()
                    .map(|param| (param.name.as_str(), param.required)),
            ),
            owners_only: command.owners_only,
            children: command.subcommands.iter().map(Self::from_poise).collect(),
        }
    }
}

impl CommandIndex {
    pub fn new(commands: Vec<CommandNode>) -> Self {
        Self { commands }
    }

    pub fn from_commands<U, E>(commands: &[poise::Command<U, E>]) -> Self {
        Self::new(commands.iter().map(CommandNode::from_poise).collect())
    }

    pub fn commands(&self) -> &[CommandNode] {
        &self.commands
    }

    /// Resolve a command path like `tag create foo bar`.
    ///
    /// Names and aliases match case-insensitively and must end on a token
    /// boundary. The longest match wins; ties go to the earliest registered
    /// command. After a match the next token is tried against the matched
    /// node's subcommands, and so on until nothing matches.
    pub fn resolve<'a, 'i>(&'a self, input: &'i str) -> Option<Resolved<'a, 'i>> {
        let input = input.trim_start();
        let (mut node, mut rest) = best_match(&self.commands, input)?;

        while let Some((child, child_rest)) = best_match(&node.children, rest) {
            node = child;
            rest = child_rest;
        }

        Some(Resolved { node, rest })
    }

    /// `Usage: `<prefix><path> <params>`` for a qualified command name.
    /// Unknown names fall back to the bare name.
    pub fn usage_line(&self, prefix: &str, qualified_name: &str) -> String {
        let usage = self
            .resolve(qualified_name)
            .filter(|resolved| resolved.rest.is_empty())
            .map(|resolved| resolved.node.usage())
            .unwrap_or_else(|| qualified_name.to_owned());

        format!("Usage: `{prefix}{usage}`")
    }

    /// Top-level commands grouped by category, both in registration order.
    pub fn categories(&self) -> Vec<(&str, Vec<&CommandNode>)> {
        let mut grouped: Vec<(&str, Vec<&CommandNode>)> = Vec::new();
        for command in &self.commands {
            let category = command.category.as_deref().unwrap_or("Uncategorized");
            match grouped.iter_mut().find(|(name, _)| *name == category) {
                Some((_, nodes)) => nodes.push(command),
                None => grouped.push((category, vec![command])),
            }
        }
        grouped
    }

    pub fn find_category(&self, name: &str) -> Option<(&str, Vec<&CommandNode>)> {
        let name = name.trim();
        self.categories()
            .into_iter()
            .find(|(category, _)| category.eq_ignore_ascii_case(name))
    }
}

fn best_match<'a, 'i>(
    nodes: &'a [CommandNode],
    input: &'i str,
) -> Option<(&'a CommandNode, &'i str)> {
    let mut best: Option<(&CommandNode, usize)> = None;

    for node in nodes {
        for candidate in node.names() {
            let Some(len) = match_len(input, candidate) else {
                continue;
            };
            if best.is_none_or(|(_, best_len)| len > best_len) {
                best = Some((node, len));
            }
        }
    }

    best.map(|(node, len)| (node, input[len..].trim_start()))
}

/// Byte length of `candidate` if `input` starts with it (ASCII case-insensitive)
/// followed by whitespace or end of input.
fn match_len(input: &str, candidate: &str) -> Option<usize> {
    if candidate.is_empty() {
        return None;
    }

    let head = input.get(..candidate.len())?;
    if !head.eq_ignore_ascii_case(candidate) {
        return None;
    }

    let boundary = input[candidate.len()..]
        .chars()
        .next()
        .is_none_or(char::is_whitespace);

    boundary.then_some(candidate.len())
}

/// Strip the first matching prefix from `content`.
///
/// The longest matching prefix wins; equal lengths keep the order given.
/// Returns `(prefix, rest)` as slices of `content` with whitespace after the
/// prefix trimmed.
pub fn split_prefix<'c, S: AsRef<str>>(
    content: &'c str,
    prefixes: &[S],
) -> Option<(&'c str, &'c str)> {
    let mut best: Option<usize> = None;

    for prefix in prefixes {
        let prefix = prefix.as_ref();
        if prefix.is_empty() || !content.starts_with(prefix) {
            continue;
        }
        if best.is_none_or(|len| prefix.len() > len) {
            best = Some(prefix.len());
        }
    }

    let len = best?;
    Some((&content[..len], content[len..].trim_start()))
}

/// Render `(name, required)` pairs as `<a> <b> [c]`.
pub fn render_signature<'p>(params: impl IntoIterator<Item = (&'p str, bool)>) -> String {
    params
        .into_iter()
        .map(|(name, required)| {
            if required {
                format!("<{name}>")
            } else {
                format!("[{name}]")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
