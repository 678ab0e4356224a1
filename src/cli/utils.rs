use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format. Object `data` is
/// merged into the JSON envelope.
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(envelope)) = (data, response.as_object_mut()) {
                envelope.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}
