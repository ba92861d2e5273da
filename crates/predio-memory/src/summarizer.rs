//! Completion capability trait and the local extractive fallback.
//!
//! Summarization calls a chat-completion provider through
//! `CompletionService`. `ExtractiveCompletion` is a deterministic local
//! implementation that needs no network, used by tests and by the demo
//! binary when no remote provider is configured.

use std::collections::HashSet;

use predio_core::error::PredioError;

use crate::types::{Turn, TurnRole};

/// Service for one-shot text completion: prompt in, text out.
pub trait CompletionService: Send + Sync {
    /// Produce a completion for the given prompt.
    fn complete(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, PredioError>> + Send;
}

/// Object-safe version of [`CompletionService`] for dynamic dispatch.
///
/// A blanket implementation is provided so that every `CompletionService`
/// automatically implements `DynCompletionService`.
pub trait DynCompletionService: Send + Sync {
    /// Produce a completion for the given prompt (boxed future).
    fn complete_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<String, PredioError>> + Send + 'a>,
    >;
}

impl<T: CompletionService> DynCompletionService for T {
    fn complete_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<String, PredioError>> + Send + 'a>,
    > {
        Box::pin(self.complete(prompt))
    }
}

/// Build the summarization prompt for the turns being collapsed.
///
/// One instruction paragraph, a blank line, then the turns as labeled
/// dialogue lines.
pub fn build_summary_prompt(turns: &[Turn]) -> String {
    let mut prompt = String::from(
        "Resume esta conversacion entre un usuario y un asesor inmobiliario. \
         Conserva presupuesto, zonas, tipo de inmueble y preferencias mencionadas.\n\n",
    );
    for turn in turns {
        let label = match turn.role {
            TurnRole::User => "usuario",
            TurnRole::Assistant => "asesor",
            TurnRole::Summary => "resumen previo",
        };
        prompt.push_str(label);
        prompt.push_str(": ");
        prompt.push_str(&turn.content);
        prompt.push('\n');
    }
    prompt
}

/// Local extractive completion.
///
/// Everything before the first blank line is treated as instructions and
/// skipped; the remaining lines are scored by lexical density (unique terms
/// times the square root of total terms) and the top lines are returned in
/// their original order. Fully deterministic.
#[derive(Debug, Clone)]
pub struct ExtractiveCompletion {
    max_lines: usize,
}

impl ExtractiveCompletion {
    pub fn new(max_lines: usize) -> Self {
        Self { max_lines }
    }

    fn summarize_text(&self, prompt: &str) -> String {
        let body = match prompt.split_once("\n\n") {
            Some((_, body)) => body,
            None => prompt,
        };

        let lines: Vec<&str> = body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let mut scored: Vec<(f64, usize)> = lines
            .iter()
            .enumerate()
            .map(|(idx, line)| {
                let words: Vec<&str> = line.split_whitespace().collect();
                let unique: HashSet<&str> = words.iter().copied().collect();
                let score = (unique.len() as f64) * (words.len() as f64).sqrt();
                (score, idx)
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        let mut picked: Vec<usize> = scored
            .into_iter()
            .take(self.max_lines)
            .map(|(_, idx)| idx)
            .collect();
        picked.sort_unstable();

        picked
            .into_iter()
            .map(|idx| lines[idx])
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl Default for ExtractiveCompletion {
    fn default() -> Self {
        Self::new(3)
    }
}

impl CompletionService for ExtractiveCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, PredioError> {
        Ok(self.summarize_text(prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_labels_roles() {
        let turns = vec![
            Turn::new(TurnRole::User, "busco apartamento"),
            Turn::new(TurnRole::Assistant, "claro, en que zona"),
            Turn::new(TurnRole::Summary, "el usuario busca en el norte"),
        ];
        let prompt = build_summary_prompt(&turns);
        assert!(prompt.contains("usuario: busco apartamento"));
        assert!(prompt.contains("asesor: claro, en que zona"));
        assert!(prompt.contains("resumen previo: el usuario busca en el norte"));
    }

    #[test]
    fn test_prompt_separates_instructions_with_blank_line() {
        let turns = vec![Turn::new(TurnRole::User, "hola")];
        let prompt = build_summary_prompt(&turns);
        assert!(prompt.contains("\n\n"));
    }

    #[tokio::test]
    async fn test_extractive_skips_instructions() {
        let service = ExtractiveCompletion::default();
        let prompt = "Instrucciones que no deben aparecer en la salida.\n\n\
                      usuario: busco apartamento en chapinero con piscina\n";
        let summary = service.complete(prompt).await.unwrap();
        assert!(!summary.contains("Instrucciones"));
        assert!(summary.contains("chapinero"));
    }

    #[tokio::test]
    async fn test_extractive_keeps_original_order() {
        let service = ExtractiveCompletion::new(2);
        let prompt = "cabecera\n\n\
                      usuario: primera linea con bastantes palabras distintas aqui\n\
                      asesor: ok\n\
                      usuario: segunda linea tambien con muchas palabras distintas presentes\n";
        let summary = service.complete(prompt).await.unwrap();
        let first = summary.find("primera").unwrap();
        let second = summary.find("segunda").unwrap();
        assert!(first < second);
        assert!(!summary.contains("asesor: ok"));
    }

    #[tokio::test]
    async fn test_extractive_short_input_kept_whole() {
        let service = ExtractiveCompletion::default();
        let summary = service.complete("x\n\nusuario: hola\n").await.unwrap();
        assert_eq!(summary, "usuario: hola");
    }

    #[tokio::test]
    async fn test_extractive_empty_prompt() {
        let service = ExtractiveCompletion::default();
        let summary = service.complete("").await.unwrap();
        assert!(summary.is_empty());
    }

    #[tokio::test]
    async fn test_extractive_deterministic() {
        let service = ExtractiveCompletion::default();
        let prompt = build_summary_prompt(&[
            Turn::new(TurnRole::User, "busco casa en laureles"),
            Turn::new(TurnRole::Assistant, "tengo tres opciones por alla"),
        ]);
        let a = service.complete(&prompt).await.unwrap();
        let b = service.complete(&prompt).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_dyn_dispatch() {
        let service: Box<dyn DynCompletionService> = Box::new(ExtractiveCompletion::default());
        let out = service.complete_boxed("x\n\nusuario: hola\n").await.unwrap();
        assert_eq!(out, "usuario: hola");
    }
}
