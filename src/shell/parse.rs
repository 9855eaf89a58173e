use crate::shell::command::Command;

pub fn parse_command(input: &str) -> Option<Command> {
    let tokens: Vec<&str> = input.trim().split_ascii_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    let cmd = tokens[0];
    let args = &tokens[1..];

    match cmd {
        "help" => Some(Command::Help),
        "open" => args.first().map(|&name| Command::Open(name.to_string())),
        "close" => parse_handle(args).map(Command::Close),
        "read" => {
            let handle = parse_handle(args)?;
            let count = args.get(1)?.parse().ok()?;
            Some(Command::Read(handle, count))
        }
        "write" => {
            if args.len() >= 2 {
                Some(Command::Write(parse_handle(args)?, args[1..].join(" ")))
            } else {
                None
            }
        }
        "seek" => {
            let handle = parse_handle(args)?;
            let offset = args.get(1)?.parse().ok()?;
            Some(Command::Seek(handle, offset))
        }
        "files" => Some(Command::Files),
        "stat" => parse_handle(args).map(Command::Stat),
        "cache" => Some(Command::Cache),
        "exit" => Some(Command::Exit),
        _ => None,
    }
}

fn parse_handle(args: &[&str]) -> Option<usize> {
    args.first()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_read_with_handle_and_count() {
        assert!(matches!(parse_command("read 3 100"), Some(Command::Read(3, 100))));
    }

    #[test]
    fn write_joins_remaining_tokens() {
        match parse_command("write 0 hello remote world") {
            Some(Command::Write(0, text)) => assert_eq!(text, "hello remote world"),
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn seek_accepts_negative_offsets() {
        // The driver rejects them; the parser just passes them through.
        assert!(matches!(parse_command("seek 1 -5"), Some(Command::Seek(1, -5))));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_command("frobnicate").is_none());
        assert!(parse_command("read x 10").is_none());
        assert!(parse_command("").is_none());
    }
}
