use crate::command::Command;

/// Result of walking the command tree.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    /// Root first, leaf last. Never empty.
    pub path: Vec<&'a Command>,
    /// Tokens not consumed as command names.
    pub residual: Vec<String>,
}

impl<'a> Resolution<'a> {
    pub fn leaf(&self) -> &'a Command {
        // path always holds at least the root
        self.path[self.path.len() - 1]
    }
}

/// Descend from `root` while the next token names a child command.
///
/// Resolution stops at the first dash-prefixed token or at the first token
/// that names no child.
pub fn resolve<'a>(root: &'a Command, args: &[String]) -> Resolution<'a> {
    let mut path = vec![root];
    let mut current = root;
    let mut consumed = 0;
    while let Some(token) = args.get(consumed) {
        if token.starts_with('-') {
            break;
        }
        let Some(child) = current.find_command(token) else {
            break;
        };
        path.push(child);
        current = child;
        consumed += 1;
    }

    tracing::debug!(
        path = %path_string(&path),
        residual = args.len() - consumed,
        "resolved command"
    );
    Resolution {
        path,
        residual: args[consumed..].to_vec(),
    }
}

/// Space-separated command names below the root.
pub fn path_string(path: &[&Command]) -> String {
    path.iter()
        .skip(1)
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(" ")
}
