const MAX_OUTPUT_LENGTH: usize = 15_000;
const MAX_ERROR_LENGTH: usize = 2_000;

pub fn truncate_output(output: &str) -> String {
    if output.len() <= MAX_OUTPUT_LENGTH {
        output.to_string()
    } else {
        let half = MAX_OUTPUT_LENGTH / 2;
        let start = &output[..floor_boundary(output, half)];
        let end = &output[ceil_boundary(output, output.len() - half)..];
        format!("{}\n\n... [truncated {} chars] ...\n\n{}", start, output.len() - start.len() - end.len(), end)
    }
}

pub fn truncate_error(error: &str) -> String {
    if error.len() <= MAX_ERROR_LENGTH {
        error.to_string()
    } else {
        format!("{}...", &error[..floor_boundary(error, MAX_ERROR_LENGTH)])
    }
}

fn floor_boundary(s: &str, mut idx: usize) -> usize {
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_boundary(s: &str, mut idx: usize) -> usize {
    while !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_error_untouched() {
        assert_eq!(truncate_error("QUITTING!"), "QUITTING!");
    }

    #[test]
    fn test_long_error_truncated() {
        let long = "x".repeat(MAX_ERROR_LENGTH + 50);
        let out = truncate_error(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.len(), MAX_ERROR_LENGTH + 3);
    }

    #[test]
    fn test_multibyte_boundary_does_not_panic() {
        let long = "é".repeat(MAX_ERROR_LENGTH);
        let out = truncate_error(&long);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_truncate_output_keeps_head_and_tail() {
        let body = format!("HEAD{}TAIL", "a".repeat(MAX_OUTPUT_LENGTH));
        let out = truncate_output(&body);
        assert!(out.starts_with("HEAD"));
        assert!(out.ends_with("TAIL"));
        assert!(out.contains("truncated"));
    }
}
