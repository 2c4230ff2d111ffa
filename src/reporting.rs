use crate::exercise::ExerciseResult;
use anyhow::Result;
use chrono::Local;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

/// Formats a message as a timestamped log line with level and crate prefix.
pub fn format_line(level: &str, message: &str) -> String {
    format!(
        "{} [{}] (lesson_sandbox): {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        level,
        message
    )
}

fn error_line(message: &str) {
    eprintln!("{}", format_line("ERROR", message));
}

/// Reports output mismatches to stderr as timestamped log lines.
///
/// # Errors
///
/// Returns an error after printing all failures.
pub fn report_failures(failed_results: &[&ExerciseResult]) -> Result<()> {
    for result in failed_results {
        error_line("Output mismatch");
        error_line(&format!("File: {}", result.lesson_path().display()));
        error_line(&format!(
            "Block: #{} ({})",
            result.block_index(),
            result.language()
        ));
        error_line("");

        error_line("Expected:");
        for line in result.expected_output().unwrap_or_default().lines() {
            error_line(&format!("  {}", line));
        }
        error_line("Actual:");
        for line in result.actual_output().lines() {
            error_line(&format!("  {}", line));
        }

        error_line("");
        error_line("Code block:");
        error_line(&format!("```{}", result.language()));
        for line in result.code().lines() {
            error_line(line);
        }
        error_line("```");
        error_line("");
    }

    let failed_files: BTreeSet<_> = failed_results.iter().map(|r| r.lesson_path()).collect();
    error_line("Output did not match in the following files:");
    for file in failed_files {
        error_line(&format!("  {}", file.display()));
    }

    anyhow::bail!("{} exercise(s) failed", failed_results.len());
}

/// Prints check statistics to stderr.
///
/// Shows the number of exercises checked per language and the total time.
/// Per-block timings are logged at debug level.
pub fn print_statistics(results: &[ExerciseResult], total_duration: Duration) {
    let mut lang_counts: HashMap<&str, usize> = HashMap::new();
    for result in results {
        *lang_counts.entry(result.language().name()).or_insert(0) += 1;
    }

    let mut sorted_stats: Vec<_> = lang_counts.into_iter().collect();
    sorted_stats.sort();

    let stats_str = sorted_stats
        .iter()
        .map(|(lang, count)| format!("{}: {}", lang, count))
        .collect::<Vec<_>>()
        .join(", ");

    let passed = results.iter().filter(|r| r.success()).count();
    let avg_ms = if results.is_empty() {
        0
    } else {
        total_duration.as_millis() / results.len() as u128
    };

    eprintln!(
        "{}",
        format_line(
            "INFO",
            &format!(
                "Checked {} exercise(s), {} passed ({})",
                results.len(),
                passed,
                stats_str
            )
        )
    );
    eprintln!(
        "{}",
        format_line(
            "INFO",
            &format!(
                "Finished in {}ms (avg {}ms per block)",
                total_duration.as_millis(),
                avg_ms
            )
        )
    );

    log::debug!("Individual run timings:");
    for result in results {
        log::debug!(
            "[{}] {} block #{}: {}ms",
            result.language(),
            result.lesson_path().display(),
            result.block_index(),
            result.duration().as_millis()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line() {
        let line = format_line("INFO", "hello");
        assert!(line.ends_with(" [INFO] (lesson_sandbox): hello"));
        // "YYYY-MM-DD HH:MM:SS"
        assert_eq!(line.find(" [INFO]"), Some(19));
    }
}
