//! Best-effort source language guess used for the prompt prefix and the
//! editor title. Purely advisory: it never fails and never gates a request.

/// Label returned when none of the rules match.
pub const UNKNOWN: &str = "Unknown";

type Rule = (fn(&str) -> bool, &'static str);

/// Ordered rules; the first predicate that matches wins.
const RULES: &[Rule] = &[
    (is_react, "JavaScript/React"),
    (is_python, "Python"),
    (is_java, "Java"),
    (is_c_family, "C/C++"),
    (is_php, "PHP"),
];

fn is_react(s: &str) -> bool {
    s.contains("import React") || s.contains("useState")
}

fn is_python(s: &str) -> bool {
    s.contains("def ") || (s.contains("import ") && !s.contains(';'))
}

fn is_java(s: &str) -> bool {
    s.contains("public class") || s.contains("public static void main")
}

fn is_c_family(s: &str) -> bool {
    s.contains("#include") || s.contains("int main()")
}

fn is_php(s: &str) -> bool {
    s.contains("<?php")
}

/// Guess the language of `source`.
///
/// Returns `None` for blank input, otherwise a label (falling back to
/// [`UNKNOWN`]).
pub fn detect_language(source: &str) -> Option<&'static str> {
    if source.trim().is_empty() {
        return None;
    }

    let label = RULES
        .iter()
        .find(|(matches, _)| matches(source))
        .map_or(UNKNOWN, |(_, label)| *label);

    Some(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_has_no_label() {
        assert_eq!(detect_language(""), None);
        assert_eq!(detect_language("   \n\t"), None);
    }

    #[test]
    fn python_from_def_without_semicolons() {
        assert_eq!(detect_language("def add(a, b):\n    return a + b"), Some("Python"));
    }

    #[test]
    fn python_from_bare_import() {
        assert_eq!(detect_language("import os\nprint(os.getcwd())"), Some("Python"));
    }

    #[test]
    fn import_with_semicolon_is_not_python() {
        assert_eq!(detect_language("import foo from 'bar';"), Some(UNKNOWN));
    }

    #[test]
    fn react_wins_over_python_rule() {
        let src = "import React from 'react'\nconst [x, setX] = useState(0)";
        assert_eq!(detect_language(src), Some("JavaScript/React"));
    }

    #[test]
    fn java_c_and_php() {
        assert_eq!(
            detect_language("public class Main { public static void main(String[] a) {} }"),
            Some("Java")
        );
        assert_eq!(
            detect_language("#include <stdio.h>\nint main() { return 0; }"),
            Some("C/C++")
        );
        assert_eq!(detect_language("<?php echo 'hi'; ?>"), Some("PHP"));
    }

    #[test]
    fn prose_is_unknown() {
        assert_eq!(
            detect_language("The quick brown fox jumps over the lazy dog."),
            Some(UNKNOWN)
        );
    }
}
