use crate::language::LanguageTag;
use crate::runner::markup;
use crate::runner::python;
use crate::runner::rewrite::{self, RewriteStep, DECODE};

/// Substrings a source must contain before it is run, and the fixed text
/// returned when one is missing.
#[derive(Debug, Clone, Copy)]
pub struct Precheck {
    pub required: &'static [&'static str],
    pub failure: &'static str,
}

impl Precheck {
    pub fn passes(&self, source: &str) -> bool {
        self.required.iter().all(|marker| source.contains(marker))
    }
}

/// How a language's rewritten source turns into output text.
#[derive(Debug, Clone, Copy)]
pub enum Mode {
    /// Run in the sandbox. Errors are reported as `error_prefix` followed by
    /// the message; a run that prints nothing reports `empty_output`.
    Execute {
        error_prefix: &'static str,
        empty_output: &'static str,
    },
    /// Produce a static report without running anything.
    Report(fn(&str) -> String),
}

/// Everything the runner needs to know about one language.
#[derive(Debug, Clone, Copy)]
pub struct LanguagePolicy {
    pub language: LanguageTag,
    pub precheck: Option<Precheck>,
    pub steps: &'static [RewriteStep],
    pub mode: Mode,
}

impl LanguagePolicy {
    /// Prefix used when a run of this language fails.
    pub fn error_prefix(&self) -> &'static str {
        match self.mode {
            Mode::Execute { error_prefix, .. } => error_prefix,
            Mode::Report(_) => "Error: ",
        }
    }
}

const fn step(name: &'static str, apply: rewrite::RewriteFn) -> RewriteStep {
    RewriteStep { name, apply }
}

static JAVASCRIPT_STEPS: [RewriteStep; 1] = [DECODE];

static PYTHON_STEPS: [RewriteStep; 11] = [
    DECODE,
    step("print_capture", python::print_capture),
    step("literals", python::literals),
    step("logical_operators", python::logical_operators),
    step("comments", python::comments),
    step("assignments", python::assignments),
    step("for_in", python::for_in),
    step("for_range", python::for_range),
    step("conditionals", python::conditionals),
    step("while_loops", python::while_loops),
    step("close_blocks", python::close_blocks),
];

static JAVA_STEPS: [RewriteStep; 4] = [
    DECODE,
    step("java_print", rewrite::java_print),
    step("java_wrapper", rewrite::java_wrapper),
    step("java_declarations", rewrite::java_declarations),
];

static CPP_STEPS: [RewriteStep; 6] = [
    DECODE,
    step("cpp_includes", rewrite::cpp_includes),
    step("cpp_main_wrapper", rewrite::cpp_main_wrapper),
    step("cpp_cout", rewrite::cpp_cout),
    step("cpp_declarations", rewrite::cpp_declarations),
    step("cpp_return_zero", rewrite::cpp_return_zero),
];

static PHP_STEPS: [RewriteStep; 5] = [
    DECODE,
    step("php_tags", rewrite::php_tags),
    step("php_echo", rewrite::php_echo),
    step("php_sigils", rewrite::php_sigils),
    step("php_concat", rewrite::php_concat),
];

static GO_STEPS: [RewriteStep; 6] = [
    DECODE,
    step("go_package", rewrite::go_package),
    step("go_main_wrapper", rewrite::go_main_wrapper),
    step("go_print", rewrite::go_print),
    step("go_short_decl", rewrite::go_short_decl),
    step("go_typed_var", rewrite::go_typed_var),
];

static RUST_STEPS: [RewriteStep; 5] = [
    DECODE,
    step("rust_main_wrapper", rewrite::rust_main_wrapper),
    step("rust_print", rewrite::rust_print),
    step("rust_let_mut", rewrite::rust_let_mut),
    step("rust_let_type", rewrite::rust_let_type),
];

static POLICIES: [LanguagePolicy; 9] = [
    LanguagePolicy {
        language: LanguageTag::JavaScript,
        precheck: None,
        steps: &JAVASCRIPT_STEPS,
        mode: Mode::Execute {
            error_prefix: "SyntaxError: ",
            empty_output: "undefined",
        },
    },
    LanguagePolicy {
        language: LanguageTag::Python,
        precheck: None,
        steps: &PYTHON_STEPS,
        mode: Mode::Execute {
            error_prefix: "SyntaxError: ",
            empty_output: "",
        },
    },
    LanguagePolicy {
        language: LanguageTag::Java,
        precheck: Some(Precheck {
            required: &["public class", "public static void main"],
            failure: "Error: Main method not found in class",
        }),
        steps: &JAVA_STEPS,
        mode: Mode::Execute {
            error_prefix: "javac: ",
            empty_output: "",
        },
    },
    LanguagePolicy {
        language: LanguageTag::Cpp,
        precheck: Some(Precheck {
            required: &["#include", "int main"],
            failure: "fatal error: no input files\ncompilation terminated.",
        }),
        steps: &CPP_STEPS,
        mode: Mode::Execute {
            error_prefix: "g++: error: ",
            empty_output: "",
        },
    },
    LanguagePolicy {
        language: LanguageTag::Php,
        precheck: None,
        steps: &PHP_STEPS,
        mode: Mode::Execute {
            error_prefix: "Parse error: ",
            empty_output: "PHP script executed successfully",
        },
    },
    LanguagePolicy {
        language: LanguageTag::Go,
        precheck: Some(Precheck {
            required: &["package main", "func main"],
            failure: "Error: No main package or function found",
        }),
        steps: &GO_STEPS,
        mode: Mode::Execute {
            error_prefix: "Build error: ",
            empty_output: "Process finished with exit code 0",
        },
    },
    LanguagePolicy {
        language: LanguageTag::Rust,
        precheck: Some(Precheck {
            required: &["fn main"],
            failure: "Error: No main function found",
        }),
        steps: &RUST_STEPS,
        mode: Mode::Execute {
            error_prefix: "Compilation error: ",
            empty_output: "Process finished with exit code 0",
        },
    },
    LanguagePolicy {
        language: LanguageTag::Html,
        precheck: None,
        steps: &[],
        mode: Mode::Report(markup::html_report),
    },
    LanguagePolicy {
        language: LanguageTag::Css,
        precheck: None,
        steps: &[],
        mode: Mode::Report(markup::css_report),
    },
];

/// Looks up the policy for `language`.
pub fn policy_for(language: LanguageTag) -> &'static LanguagePolicy {
    let index = match language {
        LanguageTag::JavaScript => 0,
        LanguageTag::Python => 1,
        LanguageTag::Java => 2,
        LanguageTag::Cpp => 3,
        LanguageTag::Php => 4,
        LanguageTag::Go => 5,
        LanguageTag::Rust => 6,
        LanguageTag::Html => 7,
        LanguageTag::Css => 8,
    };
    &POLICIES[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LANGUAGES;

    #[test]
    fn test_every_language_has_a_policy() {
        for lang in LANGUAGES {
            assert_eq!(policy_for(lang).language, lang);
        }
    }

    #[test]
    fn test_pipelines_start_with_decoding() {
        for lang in LANGUAGES {
            let policy = policy_for(lang);
            if let Mode::Execute { .. } = policy.mode {
                assert_eq!(policy.steps[0].name, "decode_entities", "{}", lang);
            }
        }
    }

    #[test]
    fn test_precheck() {
        let check = policy_for(LanguageTag::Go).precheck.unwrap();
        assert!(!check.passes("func main() {}"));
        assert!(check.passes("package main\nfunc main() {}"));
    }
}
