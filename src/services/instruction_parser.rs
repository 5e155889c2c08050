//! Extracts instructions and their mentions from a comment body.
//!
//! A line whose first token starts with `/` is an instruction; every `@login`
//! token on the same line is one of its mentions.

/// One instruction found in a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInstruction {
    /// Literal including the leading slash, e.g. `/accept`.
    pub name: String,
    /// Mentioned logins without the `@`, deduplicated, in order of appearance.
    pub mentions: Vec<String>,
}

/// Parse every instruction in `body`.
///
/// Instructions keep the order of their first occurrence. Repeating an
/// instruction merges its mentions into the first occurrence.
pub fn parse_instructions(body: &str) -> Vec<ParsedInstruction> {
    let mut parsed: Vec<ParsedInstruction> = Vec::new();

    for line in body.lines() {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next().filter(|t| is_instruction(t)) else {
            continue;
        };
        let mentions: Vec<String> = tokens.filter_map(mention).collect();

        let index = match parsed.iter().position(|p| p.name == name) {
            Some(index) => index,
            None => {
                parsed.push(ParsedInstruction {
                    name: name.to_string(),
                    mentions: Vec::new(),
                });
                parsed.len() - 1
            }
        };
        let entry = &mut parsed[index];
        for login in mentions {
            if !entry.mentions.iter().any(|m| m.eq_ignore_ascii_case(&login)) {
                entry.mentions.push(login);
            }
        }
    }

    parsed
}

fn is_instruction(token: &str) -> bool {
    token.len() > 1
        && token.starts_with('/')
        && token[1..].chars().next().is_some_and(char::is_alphanumeric)
}

fn mention(token: &str) -> Option<String> {
    let login = token
        .strip_prefix('@')?
        .trim_end_matches(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'));
    (!login.is_empty()).then(|| login.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_single_instruction_without_mentions() {
        let parsed = parse_instructions("/accept");
        assert_eq!(
            parsed,
            vec![ParsedInstruction {
                name: "/accept".into(),
                mentions: vec![]
            }]
        );
    }

    #[test]
    fn unit_mentions_are_scoped_to_their_line() {
        let body = "Thanks!\n/assign @bob, @carol.\n/accept\nping @dave";
        let parsed = parse_instructions(body);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "/assign");
        assert_eq!(parsed[0].mentions, vec!["bob", "carol"]);
        assert_eq!(parsed[1].name, "/accept");
        assert!(parsed[1].mentions.is_empty());
    }

    #[test]
    fn functional_repeated_instruction_merges_mentions() {
        let parsed = parse_instructions("/assign @bob\r\n/assign @Bob @erin");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].mentions, vec!["bob", "erin"]);
    }

    #[test]
    fn regression_paths_and_prose_are_not_instructions() {
        assert!(parse_instructions("see /docs for details").is_empty());
        assert!(parse_instructions("/ accept").is_empty());
        assert!(parse_instructions("// comment").is_empty());
        assert!(parse_instructions("").is_empty());
    }

    #[test]
    fn regression_bare_at_sign_is_ignored() {
        let parsed = parse_instructions("/assign @ @,");
        assert!(parsed[0].mentions.is_empty());
    }
}
