//! Text-to-text rewrite steps shared by the language pipelines.
//!
//! Each step is a pure function over the whole source. A pipeline is an
//! ordered slice of steps; later steps see the output of earlier ones.

use regex::{Captures, Regex};
use std::sync::LazyLock;

pub type RewriteFn = fn(&str) -> String;

/// One named step of a rewrite pipeline.
#[derive(Clone, Copy)]
pub struct RewriteStep {
    pub name: &'static str,
    pub apply: RewriteFn,
}

impl std::fmt::Debug for RewriteStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RewriteStep").field(&self.name).finish()
    }
}

/// Runs every step in order.
pub fn apply_pipeline(source: &str, steps: &[RewriteStep]) -> String {
    let mut text = source.to_string();
    for step in steps {
        text = (step.apply)(&text);
        log::debug!("after {}: {} bytes", step.name, text.len());
    }
    text
}

/// Decodes the handful of HTML entities an editor widget may leave behind.
/// `&amp;` is decoded last so `&amp;lt;` becomes `&lt;` and not `<`.
pub fn decode_entities(source: &str) -> String {
    source
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

pub const DECODE: RewriteStep = RewriteStep {
    name: "decode_entities",
    apply: decode_entities,
};

/// Removes the last closing brace of the source, the partner of a wrapper
/// header that an earlier step stripped.
pub fn strip_last_brace(source: &str) -> String {
    match source.rfind('}') {
        Some(index) => {
            let mut text = String::with_capacity(source.len());
            text.push_str(&source[..index]);
            text.push_str(&source[index + 1..]);
            text
        }
        None => source.to_string(),
    }
}

macro_rules! regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($pattern).expect("valid rewrite pattern"));
    };
}

// --- java ---

regex!(RE_JAVA_PRINT, r"System\.out\.print(ln)?\(");
regex!(RE_JAVA_CLASS, r"public\s+class\s+\w+\s*\{");
regex!(
    RE_JAVA_MAIN,
    r"public\s+static\s+void\s+main\s*\([^)]*\)\s*(throws\s+[\w.,\s]+)?\{"
);
regex!(
    RE_JAVA_DECL,
    r"\b(?:final\s+)?(?:int|long|String|boolean|double|float|char)\s+([A-Za-z_]\w*)\s*([=;])"
);

pub fn java_print(source: &str) -> String {
    RE_JAVA_PRINT.replace_all(source, "console.log(").into_owned()
}

/// Strips `public class X {` and the `main` header together with their two
/// closing braces.
pub fn java_wrapper(source: &str) -> String {
    let mut text = source.to_string();
    if RE_JAVA_CLASS.is_match(&text) {
        text = RE_JAVA_CLASS.replace(&text, "").into_owned();
        text = strip_last_brace(&text);
    }
    if RE_JAVA_MAIN.is_match(&text) {
        text = RE_JAVA_MAIN.replace(&text, "").into_owned();
        text = strip_last_brace(&text);
    }
    text
}

pub fn java_declarations(source: &str) -> String {
    RE_JAVA_DECL.replace_all(source, "var ${1} ${2}").into_owned()
}

// --- cpp ---

regex!(RE_CPP_INCLUDE, r"(?m)^[ \t]*#[ \t]*include.*$");
regex!(RE_CPP_USING, r"(?m)^[ \t]*using\s+namespace\s+[\w:]+\s*;[ \t]*$");
regex!(RE_CPP_MAIN, r"int\s+main\s*\([^)]*\)\s*\{");
regex!(RE_CPP_COUT, r"(?:std::)?cout\s*<<\s*([^;]*);");
regex!(
    RE_CPP_DECL,
    r"\b(?:const\s+)?(?:int|long|std::string|string|bool|double|float|char|auto)\s+([A-Za-z_]\w*)\s*([=;])"
);
regex!(RE_CPP_RETURN, r"\breturn\s+0\s*;");

pub fn cpp_includes(source: &str) -> String {
    let text = RE_CPP_INCLUDE.replace_all(source, "");
    RE_CPP_USING.replace_all(&text, "").into_owned()
}

pub fn cpp_main_wrapper(source: &str) -> String {
    if !RE_CPP_MAIN.is_match(source) {
        return source.to_string();
    }
    strip_last_brace(&RE_CPP_MAIN.replace(source, ""))
}

/// `cout << a << b << endl;` becomes one capture call printing `a` and `b`
/// back to back. `endl` operands are dropped; the capture call already ends
/// the line.
pub fn cpp_cout(source: &str) -> String {
    RE_CPP_COUT
        .replace_all(source, |caps: &Captures| {
            let operands: Vec<String> = caps[1]
                .split("<<")
                .map(str::trim)
                .filter(|operand| !operand.is_empty())
                .filter(|operand| !matches!(*operand, "endl" | "std::endl" | "\"\\n\"" | "'\\n'"))
                .map(|operand| format!("({})", operand))
                .collect();
            if operands.is_empty() {
                "console.log(\"\");".to_string()
            } else {
                format!("console.log(\"\" + {});", operands.join(" + "))
            }
        })
        .into_owned()
}

pub fn cpp_declarations(source: &str) -> String {
    RE_CPP_DECL.replace_all(source, "var ${1} ${2}").into_owned()
}

pub fn cpp_return_zero(source: &str) -> String {
    RE_CPP_RETURN.replace_all(source, "").into_owned()
}

// --- php ---

regex!(RE_PHP_TAGS, r"<\?php|<\?|\?>");
regex!(RE_PHP_ECHO, r"\b(?:echo|print)\s+([^;]+);");
regex!(RE_PHP_SIGIL, r"\$([A-Za-z_])");
regex!(RE_PHP_CONCAT, r"\s\.\s");
regex!(RE_PHP_CONCAT_ASSIGN, r"\.=");

pub fn php_tags(source: &str) -> String {
    RE_PHP_TAGS.replace_all(source, "").into_owned()
}

pub fn php_echo(source: &str) -> String {
    RE_PHP_ECHO.replace_all(source, "console.log(${1});").into_owned()
}

pub fn php_sigils(source: &str) -> String {
    RE_PHP_SIGIL.replace_all(source, "${1}").into_owned()
}

pub fn php_concat(source: &str) -> String {
    let text = RE_PHP_CONCAT_ASSIGN.replace_all(source, "+=");
    RE_PHP_CONCAT.replace_all(&text, " + ").into_owned()
}

// --- go ---

regex!(RE_GO_PACKAGE, r"(?m)^[ \t]*package\s+\w+[ \t]*$");
regex!(RE_GO_IMPORT_GROUP, r"(?m)^[ \t]*import\s*\([^)]*\)");
regex!(RE_GO_IMPORT, r#"(?m)^[ \t]*import\s+(?:\w+\s+)?"[^"]*"[ \t]*$"#);
regex!(RE_GO_MAIN, r"func\s+main\s*\(\s*\)\s*\{");
regex!(RE_GO_PRINT, r"fmt\.Print(ln)?\(");
regex!(RE_GO_SHORT_DECL, r"\b([A-Za-z_]\w*)\s*:=");
regex!(RE_GO_TYPED_VAR, r"\bvar\s+([A-Za-z_]\w*)\s+[\w\[\].]+\s*=");

pub fn go_package(source: &str) -> String {
    let text = RE_GO_PACKAGE.replace_all(source, "");
    let text = RE_GO_IMPORT_GROUP.replace_all(&text, "");
    RE_GO_IMPORT.replace_all(&text, "").into_owned()
}

pub fn go_main_wrapper(source: &str) -> String {
    if !RE_GO_MAIN.is_match(source) {
        return source.to_string();
    }
    strip_last_brace(&RE_GO_MAIN.replace(source, ""))
}

pub fn go_print(source: &str) -> String {
    RE_GO_PRINT.replace_all(source, "console.log(").into_owned()
}

pub fn go_short_decl(source: &str) -> String {
    RE_GO_SHORT_DECL.replace_all(source, "var ${1} =").into_owned()
}

pub fn go_typed_var(source: &str) -> String {
    RE_GO_TYPED_VAR.replace_all(source, "var ${1} =").into_owned()
}

// --- rust ---

regex!(RE_RUST_MAIN, r"fn\s+main\s*\(\s*\)\s*\{");
regex!(RE_RUST_PRINT, r"\bprint(ln)?!\(");
regex!(RE_RUST_LET_MUT, r"\blet\s+mut\s+");
regex!(RE_RUST_LET_TYPE, r"\blet\s+([A-Za-z_]\w*)\s*:\s*[^=;]+=");

pub fn rust_main_wrapper(source: &str) -> String {
    if !RE_RUST_MAIN.is_match(source) {
        return source.to_string();
    }
    strip_last_brace(&RE_RUST_MAIN.replace(source, ""))
}

pub fn rust_print(source: &str) -> String {
    RE_RUST_PRINT.replace_all(source, "console.log(").into_owned()
}

pub fn rust_let_mut(source: &str) -> String {
    RE_RUST_LET_MUT.replace_all(source, "let ").into_owned()
}

pub fn rust_let_type(source: &str) -> String {
    RE_RUST_LET_TYPE.replace_all(source, "let ${1} =").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_entities_order() {
        assert_eq!(decode_entities("a &lt; b &amp;&amp; c"), "a < b && c");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("it&#39;s &quot;x&quot;"), "it's \"x\"");
    }

    #[test]
    fn test_strip_last_brace() {
        assert_eq!(strip_last_brace("{ a } }"), "{ a } ");
        assert_eq!(strip_last_brace("none"), "none");
    }

    #[test]
    fn test_java_wrapper() {
        let source = "public class Main {\n    public static void main(String[] args) {\n        int x = 1;\n    }\n}";
        let text = java_declarations(&java_wrapper(source));
        assert!(!text.contains('{'));
        assert!(!text.contains('}'));
        assert!(text.contains("var x = 1;"));
    }

    #[test]
    fn test_java_print() {
        assert_eq!(
            java_print("System.out.println(1); System.out.print(2);"),
            "console.log(1); console.log(2);"
        );
    }

    #[test]
    fn test_cpp_cout_chain() {
        assert_eq!(
            cpp_cout("cout << \"x = \" << x << endl;"),
            "console.log(\"\" + (\"x = \") + (x));"
        );
        assert_eq!(cpp_cout("std::cout << 42;"), "console.log(\"\" + (42));");
        assert_eq!(cpp_cout("cout << endl;"), "console.log(\"\");");
    }

    #[test]
    fn test_cpp_includes_and_wrapper() {
        let source = "#include <iostream>\nusing namespace std;\nint main() {\n    return 0;\n}";
        let text = cpp_return_zero(&cpp_main_wrapper(&cpp_includes(source)));
        assert_eq!(text.trim(), "");
    }

    #[test]
    fn test_cpp_declarations() {
        assert_eq!(cpp_declarations("string s = \"a\"; bool b;"), "var s = \"a\"; var b ;");
    }

    #[test]
    fn test_php_steps() {
        let text = php_concat(&php_sigils(&php_echo(&php_tags(
            "<?php $name = \"Ann\"; echo \"Hi \" . $name; ?>",
        ))));
        assert_eq!(text.trim(), "name = \"Ann\"; console.log(\"Hi \" + name);");
        assert_eq!(php_concat("$s .= \"x\";"), "$s += \"x\";");
    }

    #[test]
    fn test_go_steps() {
        let source = "package main\n\nimport (\n    \"fmt\"\n)\n\nfunc main() {\n    x := 5\n    var y int = 2\n    fmt.Println(x + y)\n}";
        let text = go_typed_var(&go_short_decl(&go_print(&go_main_wrapper(&go_package(source)))));
        assert!(text.contains("var x = 5"));
        assert!(text.contains("var y = 2"));
        assert!(text.contains("console.log(x + y)"));
        assert!(!text.contains("package"));
        assert!(!text.contains('}'));
    }

    #[test]
    fn test_rust_steps() {
        let source = "fn main() {\n    let mut count: i32 = 3;\n    println!(\"{}\", count);\n}";
        let text = rust_let_type(&rust_let_mut(&rust_print(&rust_main_wrapper(source))));
        assert!(text.contains("let count = 3;"));
        assert!(text.contains("console.log(\"{}\", count);"));
        assert!(text.trim_end().ends_with(';'));
    }
}
