use crate::extractor::{extract_exercises, LessonExercise};
use crate::language::LanguageTag;
use crate::runner::Runner;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Maximum number of exercises per lesson file
pub const MAX_EXERCISES_PER_LESSON: usize = 1000;

/// A single lesson exercise to be run and checked.
#[derive(Debug)]
pub struct ExerciseTask {
    lesson_path: Arc<PathBuf>,
    exercise: LessonExercise,
}

impl ExerciseTask {
    pub fn new(lesson_path: Arc<PathBuf>, exercise: LessonExercise) -> Self {
        Self {
            lesson_path,
            exercise,
        }
    }

    /// Runs the exercise and consumes the task to produce a result.
    pub fn check(self, runner: &Runner) -> ExerciseResult {
        log::debug!(
            "Running {} block #{} of {}",
            self.exercise.language,
            self.exercise.block_index,
            self.lesson_path.display()
        );

        let start = Instant::now();
        let result = runner.run(&self.exercise.code, self.exercise.language);
        let duration = start.elapsed();

        ExerciseResult {
            language: self.exercise.language,
            duration,
            lesson_path: self.lesson_path,
            block_index: self.exercise.block_index,
            code: self.exercise.code,
            expected_output: self.exercise.expected_output,
            actual_output: result.output_text,
        }
    }
}

/// Result of running a single lesson exercise.
pub struct ExerciseResult {
    language: LanguageTag,
    duration: Duration,
    lesson_path: Arc<PathBuf>,
    block_index: usize,
    code: String,
    expected_output: Option<String>,
    actual_output: String,
}

impl ExerciseResult {
    /// Returns true when there is no expected output or the output matches
    /// it, ignoring surrounding whitespace.
    pub fn success(&self) -> bool {
        match &self.expected_output {
            Some(expected) => expected.trim() == self.actual_output.trim(),
            None => true,
        }
    }

    pub fn language(&self) -> LanguageTag {
        self.language
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn lesson_path(&self) -> &Path {
        &self.lesson_path
    }

    pub fn block_index(&self) -> usize {
        self.block_index
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn expected_output(&self) -> Option<&str> {
        self.expected_output.as_deref()
    }

    pub fn actual_output(&self) -> &str {
        &self.actual_output
    }
}

/// Collects the exercises of every lesson file.
///
/// # Errors
///
/// Returns an error if a lesson cannot be read, or if a lesson exceeds
/// [`MAX_EXERCISES_PER_LESSON`].
pub fn collect_tasks(lesson_paths: &[PathBuf]) -> Result<Vec<ExerciseTask>> {
    let mut tasks = Vec::new();
    let mut collection_errors = Vec::new();

    for path in lesson_paths {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lesson {}", path.display()))?;

        log::debug!("Collecting exercises from {}", path.display());

        let exercises = extract_exercises(&content);
        if exercises.len() > MAX_EXERCISES_PER_LESSON {
            collection_errors.push(format!(
                "Lesson {} has {} exercises, exceeding limit of {}",
                path.display(),
                exercises.len(),
                MAX_EXERCISES_PER_LESSON
            ));
            continue;
        }

        let lesson_path = Arc::new(path.clone());
        tasks.extend(
            exercises
                .into_iter()
                .map(|exercise| ExerciseTask::new(Arc::clone(&lesson_path), exercise)),
        );
    }

    if !collection_errors.is_empty() {
        for error in &collection_errors {
            log::error!("{}", error);
        }
        anyhow::bail!(
            "Failed to collect exercises due to {} error(s)",
            collection_errors.len()
        );
    }

    Ok(tasks)
}

/// Runs all tasks in order.
///
/// Returns a tuple of (results, total_duration).
pub fn check_tasks(tasks: Vec<ExerciseTask>, runner: &Runner) -> (Vec<ExerciseResult>, Duration) {
    let start = Instant::now();
    let results = tasks.into_iter().map(|task| task.check(runner)).collect();
    (results, start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lesson(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_matching_and_mismatching_exercises() {
        let file = lesson(
            "```python\nprint(6 * 7)\n```\n\n```output\n42\n```\n\n```js\nconsole.log('a')\n```\n\n```output\nb\n```\n",
        );
        let tasks = collect_tasks(&[file.path().to_path_buf()]).unwrap();
        assert_eq!(tasks.len(), 2);

        let (results, _) = check_tasks(tasks, &Runner::default());
        assert!(results[0].success());
        assert_eq!(results[0].actual_output(), "42");
        assert!(!results[1].success());
        assert_eq!(results[1].expected_output(), Some("b\n"));
        assert_eq!(results[1].language(), LanguageTag::JavaScript);
    }

    #[test]
    fn test_exercise_without_expectation_succeeds() {
        let file = lesson("```go\nfmt.Println(1)\n```\n");
        let (results, _) = check_tasks(
            collect_tasks(&[file.path().to_path_buf()]).unwrap(),
            &Runner::default(),
        );
        assert!(results[0].success());
        assert_eq!(
            results[0].actual_output(),
            "Error: No main package or function found"
        );
    }

    #[test]
    fn test_missing_lesson_is_an_error() {
        let err = collect_tasks(&[PathBuf::from("/nonexistent/lesson.md")]).unwrap_err();
        assert!(err.to_string().contains("Failed to read lesson"));
    }
}
