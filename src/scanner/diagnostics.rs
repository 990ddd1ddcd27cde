use crate::errors::GenmapError;
use crate::models::scan_result::ToolOutput;
use crate::utils::truncation::truncate_error;

/// Markers the elevation program prints when it refuses to run the tool.
const ELEVATION_FAILURE_MARKERS: &[&str] = &[
    "incorrect password attempt",
    "Sorry, try again",
    "a password is required",
    "is not in the sudoers file",
    "no password was provided",
    "Authentication failure",
];

/// Printed by nmap itself when raw-socket scans are attempted without root.
const PRIVILEGE_MARKERS: &[&str] = &["requires root privileges"];

/// Only meaningful on a failed exit; nmap also prints it as a per-packet
/// `sendto` warning when a local firewall drops a packet.
const EPERM_MARKER: &str = "Operation not permitted";

const NOT_FOUND_MARKERS: &[&str] = &["command not found", ": not found"];

/// At least one of these appears in any normal nmap run.
const NMAP_MARKERS: &[&str] = &["Starting Nmap", "Nmap scan report", "Nmap done"];

/// Turn a finished process into a typed failure, or `Ok` when the output is
/// fit for classification.
pub fn check_output(output: &ToolOutput, tool: &str) -> Result<(), GenmapError> {
    let stderr = output.stderr.as_str();

    if output.status == Some(127) || NOT_FOUND_MARKERS.iter().any(|m| stderr.contains(m)) {
        return Err(GenmapError::ToolNotFound(format!(
            "'{}' could not be executed: {}",
            tool,
            first_line(stderr)
        )));
    }

    if let Some(marker) = ELEVATION_FAILURE_MARKERS.iter().find(|m| stderr.contains(*m)) {
        return Err(GenmapError::PermissionDenied(format!(
            "elevation was refused ({})",
            marker
        )));
    }

    if let Some(marker) = PRIVILEGE_MARKERS
        .iter()
        .find(|m| stderr.contains(*m) || output.stdout.contains(*m))
        .or_else(|| (!output.success() && stderr.contains(EPERM_MARKER)).then_some(&EPERM_MARKER))
    {
        return Err(GenmapError::PermissionDenied(format!(
            "{} needs elevated privileges ({})",
            tool, marker
        )));
    }

    if !output.success() {
        return Err(GenmapError::ToolFailed {
            status: output.status.unwrap_or(-1),
            detail: truncate_error(stderr.trim()),
        });
    }

    if output.lossy {
        return Err(GenmapError::MalformedOutput(format!(
            "{} wrote non UTF-8 bytes to stdout",
            tool
        )));
    }

    if !NMAP_MARKERS.iter().any(|m| output.stdout.contains(m)) {
        return Err(GenmapError::MalformedOutput(format!(
            "{} exited cleanly but its output has no scan report",
            tool
        )));
    }

    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().find(|l| !l.trim().is_empty()).unwrap_or("no diagnostic output")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(status: i32, stdout: &str, stderr: &str) -> ToolOutput {
        ToolOutput {
            status: Some(status),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            lossy: false,
        }
    }

    #[test]
    fn test_clean_run_passes() {
        let out = output(0, "Starting Nmap 7.94\n22/tcp open ssh\nNmap done: 1 IP address", "");
        assert!(check_output(&out, "nmap").is_ok());
    }

    #[test]
    fn test_exit_127_is_tool_not_found() {
        let out = output(127, "", "sudo: nmap: command not found\n");
        assert!(matches!(check_output(&out, "nmap"), Err(GenmapError::ToolNotFound(_))));
    }

    #[test]
    fn test_wrong_password_is_permission_denied() {
        let out = output(1, "", "Sorry, try again.\nsudo: 1 incorrect password attempt\n");
        assert!(matches!(check_output(&out, "nmap"), Err(GenmapError::PermissionDenied(_))));
    }

    #[test]
    fn test_nmap_root_requirement_is_permission_denied() {
        let out = output(1, "", "You requested a scan type which requires root privileges.\nQUITTING!\n");
        assert!(matches!(check_output(&out, "nmap"), Err(GenmapError::PermissionDenied(_))));
    }

    #[test]
    fn test_sendto_warning_on_clean_exit_passes() {
        let out = output(
            0,
            "Starting Nmap 7.94\n22/tcp open ssh\nNmap done: 1 IP address",
            "sendto in send_ip_packet_sd: sendto(5, packet, 44, 0, 10.0.0.7, 16) => Operation not permitted\n",
        );
        assert!(check_output(&out, "nmap").is_ok());
    }

    #[test]
    fn test_eperm_on_failed_exit_is_permission_denied() {
        let out = output(1, "", "socket troubles: Operation not permitted\nQUITTING!\n");
        assert!(matches!(check_output(&out, "nmap"), Err(GenmapError::PermissionDenied(_))));
    }

    #[test]
    fn test_other_non_zero_exit_is_tool_failed() {
        let out = output(1, "Starting Nmap 7.94\n", "Failed to resolve \"nohost\".\n");
        match check_output(&out, "nmap") {
            Err(GenmapError::ToolFailed { status, detail }) => {
                assert_eq!(status, 1);
                assert!(detail.contains("Failed to resolve"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_report_is_malformed() {
        let out = output(0, "hello\n", "");
        assert!(matches!(check_output(&out, "nmap"), Err(GenmapError::MalformedOutput(_))));
    }

    #[test]
    fn test_lossy_stdout_is_malformed() {
        let mut out = output(0, "Starting Nmap\u{fffd}", "");
        out.lossy = true;
        assert!(matches!(check_output(&out, "nmap"), Err(GenmapError::MalformedOutput(_))));
    }

    #[test]
    fn test_killed_by_signal_is_tool_failed() {
        let out = ToolOutput { status: None, ..Default::default() };
        assert!(matches!(
            check_output(&out, "nmap"),
            Err(GenmapError::ToolFailed { status: -1, .. })
        ));
    }
}
