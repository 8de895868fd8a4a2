//! Terminal output: the question and answer transcript, streamed tokens
//! and ingestion progress.
//!
//! Transcript lines go through `tracing` so they reach both stdout and the
//! log file. Streamed tokens are written straight to stdout as they
//! arrive. Progress goes to stderr.

use localqa_core::AppResult;
use localqa_knowledge::{Answer, ProgressEvent, ProgressReporter, TokenSink};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// Prints each token to stdout as soon as it is generated.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl TokenSink for StdoutSink {
    fn on_token(&mut self, token: &str) -> AppResult<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(token.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

/// Progress reporter printing one line per event on stderr.
pub fn stderr_progress() -> ProgressReporter {
    ProgressReporter::new(Arc::new(|event: ProgressEvent| eprintln!("{}", event.format_simple())))
}

pub fn question_line(question: &str) -> String {
    format!("\n\n> Question:{}", question)
}

pub fn answer_header(elapsed: Duration) -> String {
    format!("\n> Answer (took {:.2} s.):", elapsed.as_secs_f64())
}

pub fn source_header(source: &str) -> String {
    format!("\n> {}:", source)
}

/// Log the answer and its sources.
pub fn print_answer(answer: &Answer) {
    tracing::info!("{}", answer_header(answer.elapsed));
    tracing::info!("{}", answer.text);

    for chunk in &answer.sources {
        tracing::info!("{}", source_header(chunk.source()));
        tracing::info!("{}", chunk.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_prefixes() {
        assert_eq!(question_line("Who?"), "\n\n> Question:Who?");
        assert_eq!(
            answer_header(Duration::from_millis(1234)),
            "\n> Answer (took 1.23 s.):"
        );
        assert_eq!(source_header("docs/a.txt"), "\n> docs/a.txt:");
    }

    #[test]
    fn test_answer_time_rounding() {
        assert_eq!(
            answer_header(Duration::from_millis(5)),
            "\n> Answer (took 0.01 s.):"
        );
        assert_eq!(
            answer_header(Duration::from_secs(12)),
            "\n> Answer (took 12.00 s.):"
        );
    }
}
