use std::str::FromStr;

use log::*;
use thiserror::Error;

/// A single scripted request against the allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Give `owner` a contiguous block of `size` KB.
    Allocate { owner: String, size: u64 },
    /// Free the block held by `owner`.
    Release { owner: String },
}

/// A parsed request script: the size of the address space,
/// followed by the requests in the order they must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub total_memory: u64,
    pub requests: Vec<Request>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Script is empty, expected the total memory on the first line.")]
    MissingTotalMemory,
    #[error("Line {line}: invalid total memory '{value}'.")]
    InvalidTotalMemory { line: usize, value: String },
    #[error("Line {line}: missing process name for {command}.")]
    MissingOwner { line: usize, command: &'static str },
    #[error("Line {line}: missing size for REQUEST.")]
    MissingSize { line: usize },
    #[error("Line {line}: invalid size '{value}'.")]
    InvalidSize { line: usize, value: String },
}

impl FromStr for Script {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        // Blank lines are ignored everywhere, but line numbers
        // in errors refer to the raw text.
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (line, header) = lines.next().ok_or(ParseError::MissingTotalMemory)?;
        let total_memory = match header.parse::<u64>() {
            Ok(total) if total > 0 => total,
            _ => return Err(ParseError::InvalidTotalMemory {
                line,
                value: header.to_string(),
            }),
        };

        let mut requests = Vec::new();
        for (line, content) in lines {
            if let Some(request) = parse_request(line, content)? {
                requests.push(request);
            }
        }

        Ok(Self {
            total_memory,
            requests,
        })
    }
}

/// Parses one request line. Lines with an unknown command are
/// skipped.
fn parse_request(line: usize, content: &str) -> Result<Option<Request>, ParseError> {
    let mut tokens = content.split_whitespace();
    let command = tokens.next().unwrap_or_default();

    match command {
        "REQUEST" => {
            let owner = tokens
                .next()
                .ok_or(ParseError::MissingOwner { line, command: "REQUEST" })?;
            let value = tokens.next().ok_or(ParseError::MissingSize { line })?;

            // Sizes must be positive: a zero-sized block cannot
            // exist in the address space.
            let size = match value.parse::<u64>() {
                Ok(size) if size > 0 => size,
                _ => return Err(ParseError::InvalidSize {
                    line,
                    value: value.to_string(),
                }),
            };

            Ok(Some(Request::Allocate {
                owner: owner.to_string(),
                size,
            }))
        }
        "RELEASE" => {
            let owner = tokens
                .next()
                .ok_or(ParseError::MissingOwner { line, command: "RELEASE" })?;

            Ok(Some(Request::Release {
                owner: owner.to_string(),
            }))
        }
        _ => {
            warn!("Line {}: skipping unknown command '{}'.", line, command);
            Ok(None)
        }
    }
}
