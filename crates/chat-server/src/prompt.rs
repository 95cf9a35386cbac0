use protocol::Finding;
use std::fmt::Write;

const ANALYSIS_HEADER: &str = "\
You are a highly skilled cybersecurity expert specializing in web application security.
Your task is to analyze OWASP ZAP scan results, explaining each vulnerability in a clear, structured, and intuitive manner.

### Response Format:
- **Vulnerability:** <Vulnerability Name>
- **Risk Level:** <Risk Level>
- **Explanation:** <A concise, easy-to-understand explanation of the vulnerability, how it works, and why it's dangerous.>
- **Code Fix:** (Provide a code snippet inside triple backticks with the appropriate language for syntax highlighting.)
- **Fix Implementation Guide:** (A step-by-step explanation of how to apply the fix correctly and securely.)

**Analyze the following vulnerabilities:**
";

const NO_FINDINGS: &str =
    "\nThe scan report contained no vulnerabilities. Say so briefly and suggest how to confirm the scan covered the application.\n";

/// System instruction asking the model for a per-finding analysis.
pub(crate) fn build_analysis_prompt(findings: &[Finding]) -> String {
    let mut prompt = String::from(ANALYSIS_HEADER);
    if findings.is_empty() {
        prompt.push_str(NO_FINDINGS);
        return prompt;
    }
    for finding in findings {
        // Writing into a String cannot fail.
        let _ = write!(
            prompt,
            "\n- **Vulnerability:** {}\n- **Risk Level:** {}\n- **Explanation:** {}\n- **Code Fix:** (Provide a properly formatted code block using triple backticks.)\n- **Fix Implementation Guide:** Explain in a step-by-step manner how to fix this issue.\n\n---\n",
            finding.name, finding.risk, finding.description
        );
    }
    prompt
}
