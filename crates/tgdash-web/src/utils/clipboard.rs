//! Clipboard access through JavaScript interop

/// Copy text using a temporary textarea and `execCommand('copy')`
pub fn copy_text(text: &str) -> Result<(), String> {
    // JSON string literals are valid JavaScript string literals
    let literal = serde_json::to_string(text).map_err(|e| e.to_string())?;

    let js_code = format!(
        r#"(function() {{
            const text = {};
            const textarea = document.createElement('textarea');
            textarea.value = text;
            textarea.style.position = 'fixed';
            textarea.style.opacity = '0';
            document.body.appendChild(textarea);
            textarea.select();
            const result = document.execCommand('copy');
            document.body.removeChild(textarea);
            return result;
        }})()"#,
        literal
    );

    let result = js_sys::eval(&js_code).map_err(|_| "Failed to execute copy script")?;

    if result.as_bool().unwrap_or(false) {
        Ok(())
    } else {
        Err("Copy command failed".to_string())
    }
}
