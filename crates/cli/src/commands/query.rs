//! Query command handler.
//!
//! Answers questions from the command line, or one per line from
//! standard input until end of input or `exit`.

use crate::output::{print_answer, question_line, StdoutSink};
use clap::Parser;
use localqa_core::{AppConfig, AppError, AppResult};
use localqa_knowledge::{
    create_provider, index_exists, AnswerOptions, Answerer, EmbeddingConfig, NullSink,
    SqliteVectorStore, TokenSink,
};
use localqa_llm::{create_client, ModelType};
use localqa_prompt::resolve_prompt;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Line that ends an interactive session.
const EXIT_COMMAND: &str = "exit";

/// Ask questions to your documents without an internet connection
#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Ask questions to your documents without an internet connection, using the power of local LLMs.", long_about = None)]
#[command(version)]
pub struct QueryCommand {
    /// Questions to answer; read from standard input when none are given
    pub questions: Vec<String>,

    /// Use this flag to disable printing of source documents used for answers.
    #[arg(short = 'S', long)]
    pub hide_source: bool,

    /// Use this flag to disable streaming the answer to stdout.
    #[arg(short = 'M', long)]
    pub mute_stream: bool,
}

impl QueryCommand {
    /// Execute the query command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let answerer = self.answerer(config).await?;

        if !self.questions.is_empty() {
            for question in &self.questions {
                self.ask(&answerer, question).await?;
            }
            return Ok(());
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            eprint!("\nEnter a query: ");
            let Some(line) = lines.next_line().await? else {
                break;
            };

            let question = line.trim();
            if question == EXIT_COMMAND {
                break;
            }
            if question.is_empty() {
                continue;
            }

            self.ask(&answerer, question).await?;
        }

        Ok(())
    }

    /// Wire the store, embedding provider and model backend together.
    ///
    /// The model type is checked first so a bad `MODEL_TYPE` fails before
    /// the index or any backend is touched.
    async fn answerer(&self, config: &AppConfig) -> AppResult<Answerer> {
        let model_type = ModelType::parse(config.model_type()?)?;
        let settings = config.model_settings()?;
        let options = AnswerOptions::from_config(config, self.hide_source, !self.mute_stream)?;
        let prompt = resolve_prompt(config.prompt_template.as_deref())?;

        if !index_exists(&config.persist_directory) {
            return Err(AppError::Knowledge(format!(
                "No index found at {:?}. Run ingest first.",
                config.persist_directory
            )));
        }

        let embedder = create_provider(&EmbeddingConfig::from(&config.embeddings)).await?;
        let store = SqliteVectorStore::open(&config.persist_directory, embedder)?;
        let llm = create_client(model_type, settings.endpoint.as_deref());

        tracing::debug!(
            "Answering with {} ({}), k = {}",
            model_type,
            settings.model_path,
            options.k
        );

        Ok(Answerer::new(Box::new(store), llm, prompt, options))
    }

    async fn ask(&self, answerer: &Answerer, question: &str) -> AppResult<()> {
        tracing::info!("{}", question_line(question));

        let mut stdout = StdoutSink;
        let mut muted = NullSink;
        let sink: &mut dyn TokenSink = if self.mute_stream {
            &mut muted
        } else {
            &mut stdout
        };

        let answer = answerer.answer(question, sink).await?;
        print_answer(&answer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn config(persist_directory: PathBuf, model_type: &str) -> AppConfig {
        let vars = [
            ("PERSIST_DIRECTORY", persist_directory.to_string_lossy().to_string()),
            ("EMBEDDINGS_MODEL_NAME", "all-minilm".to_string()),
            ("EMBEDDINGS_PROVIDER", "trigram".to_string()),
            ("MODEL_TYPE", model_type.to_string()),
            ("MODEL_PATH", "models/model.bin".to_string()),
            ("MODEL_N_CTX", "1000".to_string()),
        ];
        AppConfig::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[test]
    fn test_flags() {
        let cmd = QueryCommand::try_parse_from(["query", "-S", "-M", "What is a cat?"]).unwrap();
        assert!(cmd.hide_source);
        assert!(cmd.mute_stream);
        assert_eq!(cmd.questions, vec!["What is a cat?"]);

        let cmd = QueryCommand::try_parse_from(["query", "--hide-source"]).unwrap();
        assert!(cmd.hide_source);
        assert!(!cmd.mute_stream);
        assert!(cmd.questions.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_model_type_fails_before_index() {
        let temp = TempDir::new().unwrap();
        let persist = temp.path().join("db");
        let cmd = QueryCommand::try_parse_from(["query", "hello"]).unwrap();

        let err = cmd.execute(&config(persist.clone(), "Unsupported")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Model type Unsupported is not supported. Please choose one of the following: LlamaCpp, GPT4All"
        );
        assert!(!persist.exists());
    }

    #[tokio::test]
    async fn test_missing_index_is_reported() {
        let temp = TempDir::new().unwrap();
        let cmd = QueryCommand::try_parse_from(["query", "hello"]).unwrap();

        let err = cmd
            .execute(&config(temp.path().join("db"), "LlamaCpp"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Knowledge(_)));
    }
}
