/// Whitespace separated arguments of a prefix command.
///
/// An argument wrapped in double quotes may contain whitespace; the quotes are stripped.
#[derive(Debug, Clone)]
pub struct Arguments<'a> {
    rest: &'a str,
}

impl<'a> Arguments<'a> {
    pub fn new(args_str: &'a str) -> Self {
        Arguments { rest: args_str }
    }

    /// Everything not consumed by `next` yet, verbatim.
    pub fn remainder(&self) -> &'a str {
        self.rest.trim()
    }
}

impl<'a> Iterator for Arguments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let trimmed = self.rest.trim_start();
        if trimmed.is_empty() {
            self.rest = "";
            return None;
        }

        if let Some(quoted) = trimmed.strip_prefix('"') {
            if let Some(close) = quoted.find('"') {
                self.rest = &quoted[close + 1..];
                return Some(&quoted[..close]);
            }
        }

        let end = trimmed
            .find(char::is_whitespace)
            .unwrap_or(trimmed.len());
        let (arg, rest) = trimmed.split_at(end);
        self.rest = rest;
        Some(arg)
    }
}

#[derive(Debug, PartialEq)]
pub struct ParsedCommand<'a> {
    pub command: &'a str,
    args_part: &'a str,
}

impl<'a> ParsedCommand<'a> {
    pub fn arguments(&self) -> Arguments<'a> {
        Arguments::new(self.args_part)
    }
}

pub fn parse<'a>(message: &'a str, prefix: &str) -> Option<ParsedCommand<'a>> {
    if prefix.is_empty() {
        return None;
    }

    let body = message.strip_prefix(prefix)?.trim();
    if body.is_empty() {
        return None;
    }

    let (command, args_part) = match body.find(char::is_whitespace) {
        Some(split) => (&body[..split], body[split..].trim_start()),
        None => (body, ""),
    };

    Some(ParsedCommand { command, args_part })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_and_arguments() {
        let parsed = parse(";play never gonna give", ";").unwrap();
        assert_eq!(parsed.command, "play");

        let mut args = parsed.arguments();
        assert_eq!(args.next(), Some("never"));
        assert_eq!(args.remainder(), "gonna give");
        assert_eq!(args.next(), Some("gonna"));
        assert_eq!(args.next(), Some("give"));
        assert_eq!(args.next(), None);
        assert_eq!(args.remainder(), "");
    }

    #[test]
    fn test_extra_whitespace_is_ignored() {
        let parsed = parse(";  volume   80   ", ";").unwrap();
        assert_eq!(parsed.command, "volume");

        let mut args = parsed.arguments();
        assert_eq!(args.remainder(), "80");
        assert_eq!(args.next(), Some("80"));
        assert_eq!(args.next(), None);
    }

    #[test]
    fn test_remainder_keeps_inner_spacing() {
        let parsed = parse(";play lo-fi  beats to relax", ";").unwrap();
        let mut args = parsed.arguments();
        assert_eq!(args.remainder(), "lo-fi  beats to relax");
        args.next();
        assert_eq!(args.remainder(), "beats to relax");
    }

    #[test]
    fn test_quoted_argument() {
        let parsed = parse(r#"!tag "hello world" rest"#, "!").unwrap();
        let mut args = parsed.arguments();
        assert_eq!(args.next(), Some("hello world"));
        assert_eq!(args.next(), Some("rest"));
        assert_eq!(args.next(), None);
    }

    #[test]
    fn test_unterminated_quote_is_a_plain_word() {
        let parsed = parse(r#"!tag "hello world"#, "!").unwrap();
        let mut args = parsed.arguments();
        assert_eq!(args.next(), Some("\"hello"));
        assert_eq!(args.next(), Some("world"));
    }

    #[test]
    fn test_no_arguments() {
        let parsed = parse(";skip", ";").unwrap();
        assert_eq!(parsed.command, "skip");
        let mut args = parsed.arguments();
        assert_eq!(args.next(), None);
        assert_eq!(args.remainder(), "");
    }

    #[test]
    fn test_multi_char_prefix() {
        let parsed = parse("bh!queue", "bh!").unwrap();
        assert_eq!(parsed.command, "queue");
    }

    #[test]
    fn test_rejected_inputs() {
        assert!(parse("play song", ";").is_none());
        assert!(parse("!play song", ";").is_none());
        assert!(parse(";", ";").is_none());
        assert!(parse(";    ", ";").is_none());
        assert!(parse("", ";").is_none());
        assert!(parse("anything", "").is_none());
    }

    #[test]
    fn test_arguments_restart_from_parsed_command() {
        let parsed = parse(";cmd a b", ";").unwrap();

        let mut first = parsed.arguments();
        first.next();
        first.next();

        let mut second = parsed.arguments();
        assert_eq!(second.next(), Some("a"));
        assert_eq!(second.remainder(), "b");
    }
}
