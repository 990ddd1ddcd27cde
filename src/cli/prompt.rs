use console::{style, Term};
use crate::errors::GenmapError;
use crate::scanner::target::ScanTarget;

/// Ask for a target on the terminal until a valid one is given.
pub fn read_target() -> Result<ScanTarget, GenmapError> {
    let term = Term::stderr();
    loop {
        term.write_str(&format!("{} ", style("Enter target IP or hostname:").bold()))?;
        let line = term.read_line()?;
        match ScanTarget::host(line.trim()) {
            Ok(target) => return Ok(target),
            Err(e) => term.write_line(&format!("  {}", style(e).red()))?,
        }
    }
}

/// Read the elevation password without echoing it.
pub fn read_password(program: &str) -> Result<String, GenmapError> {
    let term = Term::stderr();
    term.write_str(&format!("{} ", style(format!("Enter {} password:", program)).bold()))?;
    Ok(term.read_secure_line()?)
}
