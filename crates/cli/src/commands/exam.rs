//! `answerline exam`: Ask every question of a multiple-choice exam file
//! through the orchestrator and grade the letters it answers with.
//!
//! The exam file looks like:
//!
//! ```json
//! { "questions": [
//!     { "question": "...", "options": ["A. ...", "B. ..."],
//!       "metadata": { "question_position": 1, "answer": "B" } }
//! ] }
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use answerline_core::event::EventBus;
use answerline_orchestrator::{AnswerOrchestrator, HostInput};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const ANSWER_LETTERS: &str = "ABCDE";

#[derive(Debug, Clone, Deserialize)]
pub struct ExamFile {
    pub questions: Vec<ExamQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExamQuestion {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub metadata: QuestionMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionMetadata {
    pub question_position: Option<u32>,
    pub answer: Option<String>,
}

impl ExamQuestion {
    fn position(&self, index: usize) -> u32 {
        self.metadata.question_position.unwrap_or(index as u32 + 1)
    }

    /// The text sent to the orchestrator for this question.
    fn prompt(&self, position: u32, total: usize) -> String {
        let mut text = format!(
            "There are {total} questions. This is question {position}:\n\n{}",
            self.question.trim()
        );
        for option in &self.options {
            text.push('\n');
            text.push_str(option.trim());
        }
        text.push_str("\n\nAnswer with the letter of the correct option only.");
        text
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedAnswer {
    pub position: u32,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub output: String,
}

impl GradedAnswer {
    pub fn is_correct(&self) -> bool {
        matches!((&self.expected, &self.actual), (Some(e), Some(a)) if e == a)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExamReport {
    pub exam_name: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub score_percentage: f64,
    pub duration_secs: f64,
    pub answers: Vec<GradedAnswer>,
    pub wrong_answers: Vec<u32>,
}

/// Pull the answer letter for question `position` out of a model reply.
///
/// Accepts a bare letter (`"B"`, `"b."`), a numbered line (`"3. C"`,
/// `"3) C"`), or falls back to the first line that starts with a letter
/// followed by a non-letter (`"C. Paris"`, `"D"`).
pub fn parse_letter(reply: &str, position: u32) -> Option<String> {
    let text = reply.trim();

    let bare = text.trim_end_matches(['.', ')', ':']);
    if bare.chars().count() == 1 {
        return answer_letter(bare.chars().next()?);
    }

    for line in text.lines() {
        let line = line.trim();
        let Some((number, rest)) = line.split_once(['.', ':', ')']) else {
            continue;
        };
        if number.trim().parse::<u32>().ok() == Some(position)
            && let Some(letter) = rest.trim().chars().next().and_then(answer_letter)
        {
            return Some(letter);
        }
    }

    text.lines().find_map(|line| {
        let mut chars = line.trim().chars();
        let first = chars.next()?;
        match chars.next() {
            Some(next) if next.is_alphabetic() => None,
            _ => answer_letter(first),
        }
    })
}

fn answer_letter(c: char) -> Option<String> {
    let upper = c.to_ascii_uppercase();
    ANSWER_LETTERS.contains(upper).then(|| upper.to_string())
}

/// Ask every question (at most `concurrency` in flight, results kept in
/// exam order) and grade the replies.
pub async fn take_exam(
    orchestrator: &AnswerOrchestrator,
    exam: &ExamFile,
    exam_name: &str,
    concurrency: usize,
) -> ExamReport {
    let start = Instant::now();
    let total = exam.questions.len();

    let answers: Vec<GradedAnswer> = stream::iter(exam.questions.iter().enumerate())
        .map(|(index, question)| async move {
            let position = question.position(index);
            let input = HostInput {
                question: question.prompt(position, total),
            };
            let output = orchestrator
                .run(&input)
                .await
                .into_iter()
                .next()
                .map(|item| item.output)
                .unwrap_or_default();

            let graded = GradedAnswer {
                position,
                expected: question
                    .metadata
                    .answer
                    .as_deref()
                    .map(|a| a.trim().to_ascii_uppercase()),
                actual: parse_letter(&output, position),
                output,
            };
            if graded.is_correct() {
                info!(position, "Correct");
            } else {
                warn!(
                    position,
                    expected = ?graded.expected,
                    actual = ?graded.actual,
                    "Wrong or missing answer"
                );
            }
            graded
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let correct_answers = answers.iter().filter(|a| a.is_correct()).count();
    let mut wrong_answers: Vec<u32> = answers
        .iter()
        .filter(|a| !a.is_correct())
        .map(|a| a.position)
        .collect();
    wrong_answers.sort_unstable();

    let score_percentage = if total == 0 {
        0.0
    } else {
        (correct_answers as f64 / total as f64 * 1000.0).round() / 10.0
    };

    ExamReport {
        exam_name: exam_name.to_string(),
        timestamp: chrono::Utc::now(),
        total_questions: total,
        correct_answers,
        score_percentage,
        duration_secs: (start.elapsed().as_secs_f64() * 10.0).round() / 10.0,
        answers,
        wrong_answers,
    }
}

pub async fn run(
    config_path: Option<&Path>,
    questions_path: &Path,
    name: Option<String>,
    out: Option<&Path>,
    concurrency: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)
        .map_err(|e| format!("Failed to load config: {e}"))?;
    let raw = std::fs::read_to_string(questions_path)
        .map_err(|e| format!("Failed to read {}: {e}", questions_path.display()))?;
    let exam: ExamFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Invalid exam file {}: {e}", questions_path.display()))?;

    let exam_name = name.unwrap_or_else(|| {
        questions_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "exam".to_string())
    });

    let orchestrator =
        answerline_gateway::build_orchestrator(&config, Arc::new(EventBus::default()))?;
    info!(
        exam = %exam_name,
        questions = exam.questions.len(),
        concurrency,
        "Taking exam"
    );

    let report = take_exam(&orchestrator, &exam, &exam_name, concurrency).await;
    info!(
        correct = report.correct_answers,
        total = report.total_questions,
        score = report.score_percentage,
        duration_secs = report.duration_secs,
        "Exam finished"
    );

    let json = serde_json::to_string_pretty(&report)?;
    match out {
        Some(path) => {
            std::fs::write(path, json)
                .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
            println!(
                "{}/{} correct ({:.1}%), report written to {}",
                report.correct_answers,
                report.total_questions,
                report.score_percentage,
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}
