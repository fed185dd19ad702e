//! Simulated code formatter for the active buffer
//!
//! Not a real TSX formatter: it normalizes indentation of the handful of
//! shapes the sample component uses.

use std::time::Duration;

/// Reformat `code` by trimming lines, dropping blanks and re-indenting
pub fn format_code(code: &str) -> String {
    code.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(indent_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent_line(line: &str) -> String {
    const BODY: [&str; 3] = ["return", "const", "useEffect"];
    const CLOSERS: [&str; 3] = ["};", "});", ");"];

    if BODY.iter().any(|p| line.starts_with(p)) || CLOSERS.contains(&line) {
        format!("  {}", line)
    } else if line.starts_with('<') || line.starts_with("Count:") {
        format!("    {}", line)
    } else if line.starts_with("export default") {
        format!("\n{}", line)
    } else {
        line.to_string()
    }
}

/// Run the formatter after the configured delay
pub async fn format_with_delay(code: String, delay: Duration) -> String {
    tokio::time::sleep(delay).await;
    format_code(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_indents_component_body() {
        let input = "const Counter = () => {\nconst [count,setCount]=useState(0);\n\nreturn (\n<div>\nCount: {count}\n</div>\n);\n};\nexport default Counter;";
        let formatted = format_code(input);
        let lines: Vec<&str> = formatted.lines().collect();

        assert_eq!(lines[0], "  const Counter = () => {");
        assert_eq!(lines[1], "  const [count,setCount]=useState(0);");
        assert_eq!(lines[2], "  return (");
        assert_eq!(lines[3], "    <div>");
        assert_eq!(lines[4], "    Count: {count}");
        assert_eq!(lines[6], "  );");
        assert_eq!(lines[7], "  };");
        assert_eq!(lines[8], "");
        assert_eq!(lines[9], "export default Counter;");
    }

    #[test]
    fn test_format_is_stable_on_blank_input() {
        assert_eq!(format_code("\n\n   \n"), "");
    }

    #[tokio::test]
    async fn test_format_with_delay() {
        let out = format_with_delay("  import x  ".to_string(), Duration::from_millis(1)).await;
        assert_eq!(out, "import x");
    }
}
