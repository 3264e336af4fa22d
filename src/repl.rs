use std::io::Write;

const PROMPT: &str = "labelplay> ";

/// Print the prompt and read one line from stdin.
///
/// Returns `Ok(None)` at end of input.
pub fn readline() -> Result<Option<String>, String> {
    let mut out = std::io::stdout();
    write!(out, "{PROMPT}").map_err(|e| e.to_string())?;
    out.flush().map_err(|e| e.to_string())?;

    let mut buffer = String::new();
    let read = std::io::stdin()
        .read_line(&mut buffer)
        .map_err(|e| e.to_string())?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(buffer))
}
