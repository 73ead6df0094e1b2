//! Prompt-Driven Interaction Engine
//!
//! Consumes the installer's stdout one character at a time, stops at every
//! prompt terminator, and answers prompts on stdin. A prompt is printed
//! without a line break before the installer blocks, so nothing here may
//! wait for a full line.
//!
//! States: Scanning (read until `>` plus one trailing character, or EOF),
//! Evaluating (record the chunk, answer if its last line is a prompt),
//! Closed (EOF with an empty chunk).

use serde::{Deserialize, Serialize};
use std::char::REPLACEMENT_CHARACTER;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use super::answers::{AnswerTable, Resolution, DEFAULT_FALLBACK_ANSWER};
use super::prompt::{Prompt, PROMPT_TERMINATOR};
use crate::error::{Error, Result, StreamKind};

/// One answered prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptExchange {
    /// The line that was recognized as a prompt
    pub prompt_line: String,
    /// Label extracted from the line
    pub label: String,
    /// Answer written to stdin, without the line terminator
    pub answer: String,
    pub resolution: Resolution,
    /// False when the installer had already closed its stdin
    pub delivered: bool,
}

/// Everything observed on stdout during one drive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// Cumulative captured output
    pub output: String,
    /// Prompts in the order they were answered
    pub exchanges: Vec<PromptExchange>,
}

impl Transcript {
    /// Prompts that had no table entry
    pub fn unresolved(&self) -> impl Iterator<Item = &PromptExchange> {
        self.exchanges
            .iter()
            .filter(|e| e.resolution == Resolution::Fallback)
    }

    /// Prompts whose answer never reached the installer
    pub fn undelivered(&self) -> impl Iterator<Item = &PromptExchange> {
        self.exchanges.iter().filter(|e| !e.delivered)
    }
}

/// Drives one installer's stdout/stdin pair
#[derive(Debug, Clone)]
pub struct InteractionEngine {
    answers: Arc<AnswerTable>,
    fallback_answer: String,
}

impl InteractionEngine {
    pub fn new(answers: impl Into<Arc<AnswerTable>>) -> Self {
        Self {
            answers: answers.into(),
            fallback_answer: DEFAULT_FALLBACK_ANSWER.to_string(),
        }
    }

    /// Override the answer used for unknown prompts
    pub fn with_fallback_answer(mut self, answer: impl Into<String>) -> Self {
        self.fallback_answer = answer.into();
        self
    }

    pub fn fallback_answer(&self) -> &str {
        &self.fallback_answer
    }

    /// Run until `output` closes
    ///
    /// `input` is dropped on return, which delivers EOF to the installer.
    /// If the installer closes its stdin early, answers are skipped and
    /// output is still drained.
    pub async fn drive<R, W>(&self, output: R, input: W) -> Result<Transcript>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = CharReader::new(output);
        let mut input = Some(input);
        let mut transcript = Transcript::default();

        loop {
            let chunk = read_chunk(&mut reader)
                .await
                .map_err(|e| stream_error(StreamKind::Stdout, e))?;
            if chunk.is_empty() {
                debug!("Installer stdout closed");
                break;
            }

            transcript.output.push_str(&chunk);

            let Some(prompt) = Prompt::detect(&chunk) else {
                continue;
            };

            let (answer, resolution) = self.answers.resolve(prompt.label, &self.fallback_answer);
            match resolution {
                Resolution::Matched => {
                    debug!("Answering prompt '{}'", prompt.label);
                }
                Resolution::Fallback => {
                    warn!(
                        "Value for prompt {:?} not found, using fallback answer instead",
                        prompt.line
                    );
                }
            }

            let mut delivered = false;
            if let Some(writer) = input.as_mut() {
                match write_answer(writer, answer).await {
                    Ok(()) => delivered = true,
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                        warn!(
                            "Installer closed stdin before prompt '{}' was answered",
                            prompt.label
                        );
                        input = None;
                    }
                    Err(e) => return Err(stream_error(StreamKind::Stdin, e)),
                }
            } else {
                debug!("Stdin closed, not answering prompt '{}'", prompt.label);
            }

            transcript.exchanges.push(PromptExchange {
                prompt_line: prompt.line.to_string(),
                label: prompt.label.to_string(),
                answer: answer.to_string(),
                resolution,
                delivered,
            });
        }

        Ok(transcript)
    }
}

fn stream_error(stream: StreamKind, err: io::Error) -> Error {
    error!("Installer {} failed: {}", stream, err);
    Error::StreamFailed {
        stream,
        reason: err.to_string(),
    }
}

async fn write_answer<W: AsyncWrite + Unpin>(input: &mut W, answer: &str) -> io::Result<()> {
    let line = format!("{}\n", answer);
    input.write_all(line.as_bytes()).await?;
    input.flush().await
}

/// Scan up to and including the prompt terminator and the one character
/// after it. Returns an empty chunk only at end of stream.
async fn read_chunk<R: AsyncRead + Unpin>(reader: &mut CharReader<R>) -> io::Result<String> {
    let mut chunk = String::new();

    while let Some(ch) = reader.next_char().await? {
        chunk.push(ch);
        if ch == PROMPT_TERMINATOR {
            if let Some(trailing) = reader.next_char().await? {
                chunk.push(trailing);
            }
            break;
        }
    }

    Ok(chunk)
}

/// Character-at-a-time UTF-8 reader
///
/// The buffer only holds what the child has already written, so reads never
/// wait for more than the next character.
struct CharReader<R> {
    inner: BufReader<R>,
}

impl<R: AsyncRead + Unpin> CharReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
        }
    }

    async fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        let available = self.inner.fill_buf().await?;
        Ok(available.first().copied())
    }

    async fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = self.peek_byte().await?;
        if byte.is_some() {
            self.inner.consume(1);
        }
        Ok(byte)
    }

    /// Next character, `None` at end of stream. Malformed sequences decode
    /// to U+FFFD without swallowing the byte that broke them.
    async fn next_char(&mut self) -> io::Result<Option<char>> {
        let Some(lead) = self.read_byte().await? else {
            return Ok(None);
        };

        let width = utf8_width(lead);
        match width {
            0 => return Ok(Some(REPLACEMENT_CHARACTER)),
            1 => return Ok(Some(char::from(lead))),
            _ => {}
        }

        let mut bytes = [lead, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            match self.peek_byte().await? {
                Some(next) if next & 0xC0 == 0x80 => {
                    self.inner.consume(1);
                    *slot = next;
                }
                _ => return Ok(Some(REPLACEMENT_CHARACTER)),
            }
        }

        let decoded = std::str::from_utf8(&bytes[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(REPLACEMENT_CHARACTER);
        Ok(Some(decoded))
    }
}

fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}
