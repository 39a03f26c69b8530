//! Shell command parsing

use std::path::PathBuf;
use std::str::FromStr;

use siteqa_core::{Error, Result};

use crate::ExportFormat;

/// One line of user input, parsed
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(String),
    Ask(String),
    Image {
        path: PathBuf,
        question: Option<String>,
    },
    Images(PathBuf),
    /// 1-based position in the last `images` listing
    Pick {
        index: usize,
        question: Option<String>,
    },
    Export {
        format: ExportFormat,
        path: PathBuf,
    },
    Reset,
    Status,
    Help,
    Exit,
    Empty,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Command::Empty);
        }

        let (head, rest) = match input.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (input, ""),
        };

        match head.to_ascii_lowercase().as_str() {
            "exit" | "quit" if rest.is_empty() => Ok(Command::Exit),
            "help" if rest.is_empty() => Ok(Command::Help),
            "reset" if rest.is_empty() => Ok(Command::Reset),
            "status" if rest.is_empty() => Ok(Command::Status),
            "load" => {
                let url = required(rest, "load <url>")?;
                Ok(Command::Load(url.to_string()))
            }
            "ask" => {
                let question = required(rest, "ask <question>")?;
                Ok(Command::Ask(question.to_string()))
            }
            "image" => {
                let rest = required(rest, "image <path> [question]")?;
                let (path, question) = split_first(rest);
                Ok(Command::Image {
                    path: PathBuf::from(path),
                    question,
                })
            }
            "images" => {
                let folder = required(rest, "images <folder>")?;
                Ok(Command::Images(PathBuf::from(folder)))
            }
            "pick" => {
                let rest = required(rest, "pick <n> [question]")?;
                let (n, question) = split_first(rest);
                let index = n
                    .parse::<usize>()
                    .ok()
                    .filter(|i| *i > 0)
                    .ok_or_else(|| Error::InvalidInput(format!("Not an image number: {n}")))?;
                Ok(Command::Pick { index, question })
            }
            "export" => {
                let rest = required(rest, "export pdf|docx <path>")?;
                let (format, path) = split_first(rest);
                let format = format.parse::<ExportFormat>()?;
                let path = path
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(format!("response.{}", format.extension())));
                Ok(Command::Export { format, path })
            }
            _ => Ok(Command::Ask(input.to_string())),
        }
    }
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str> {
    if rest.is_empty() {
        Err(Error::InvalidInput(format!("Usage: {usage}")))
    } else {
        Ok(rest)
    }
}

/// First word, then whatever follows it (if anything)
fn split_first(rest: &str) -> (&str, Option<String>) {
    match rest.split_once(char::is_whitespace) {
        Some((first, tail)) if !tail.trim().is_empty() => (first, Some(tail.trim().to_string())),
        Some((first, _)) => (first, None),
        None => (rest, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Command {
        input.parse().unwrap()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse("  "), Command::Empty);
        assert_eq!(parse("EXIT"), Command::Exit);
        assert_eq!(parse("quit"), Command::Exit);
        assert_eq!(parse("help"), Command::Help);
        assert_eq!(parse("reset"), Command::Reset);
        assert_eq!(parse("status"), Command::Status);
    }

    #[test]
    fn test_load_and_ask() {
        assert_eq!(
            parse("load https://example.com"),
            Command::Load("https://example.com".to_string())
        );
        assert_eq!(
            parse("ask What is this page about?"),
            Command::Ask("What is this page about?".to_string())
        );
        assert_eq!(
            parse("What is this page about?"),
            Command::Ask("What is this page about?".to_string())
        );
        // a keyword with trailing words is just a question
        assert_eq!(
            parse("help me find pricing"),
            Command::Ask("help me find pricing".to_string())
        );
    }

    #[test]
    fn test_missing_arguments() {
        for input in ["load", "ask", "image", "images", "pick", "export"] {
            let err = input.parse::<Command>().unwrap_err();
            assert!(matches!(err, Error::InvalidInput(msg) if msg.starts_with("Usage:")));
        }
    }

    #[test]
    fn test_image_commands() {
        assert_eq!(
            parse("image photos/desk.png what is on the desk?"),
            Command::Image {
                path: PathBuf::from("photos/desk.png"),
                question: Some("what is on the desk?".to_string()),
            }
        );
        assert_eq!(
            parse("image desk.png"),
            Command::Image {
                path: PathBuf::from("desk.png"),
                question: None,
            }
        );
        assert_eq!(parse("images ./photos"), Command::Images(PathBuf::from("./photos")));
        assert_eq!(
            parse("pick 2 count the chairs"),
            Command::Pick {
                index: 2,
                question: Some("count the chairs".to_string()),
            }
        );
        assert!(matches!("pick 0".parse::<Command>(), Err(Error::InvalidInput(_))));
        assert!(matches!("pick two".parse::<Command>(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_export() {
        assert_eq!(
            parse("export pdf out/answer.pdf"),
            Command::Export {
                format: ExportFormat::Pdf,
                path: PathBuf::from("out/answer.pdf"),
            }
        );
        assert_eq!(
            parse("export docx"),
            Command::Export {
                format: ExportFormat::Docx,
                path: PathBuf::from("response.docx"),
            }
        );
        assert!(matches!("export rtf x.rtf".parse::<Command>(), Err(Error::InvalidInput(_))));
    }
}
