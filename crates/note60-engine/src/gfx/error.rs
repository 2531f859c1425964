use thiserror::Error;

use super::{ErrorCode, GraphicsApi, codes};

/// Pending GL errors observed at a named checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{label}: glError {}", describe(.codes))]
pub struct GraphicsError {
    pub label: String,
    pub codes: Vec<ErrorCode>,
}

/// Upper bound on codes drained per checkpoint. A lost context can report
/// errors forever.
const MAX_DRAINED: usize = 16;

/// Drains every pending error code and reports them under `label`.
///
/// Nothing is aborted here; the caller decides whether the failure is fatal.
pub fn check_error<G: GraphicsApi>(gfx: &mut G, label: &str) -> Result<(), GraphicsError> {
    let mut found = Vec::new();
    while let Some(code) = gfx.get_error() {
        log::error!("{label}: glError {code:#06x} ({})", error_name(code));
        found.push(code);
        if found.len() == MAX_DRAINED {
            break;
        }
    }

    if found.is_empty() {
        Ok(())
    } else {
        Err(GraphicsError {
            label: label.to_string(),
            codes: found,
        })
    }
}

pub fn error_name(code: ErrorCode) -> &'static str {
    match code {
        codes::INVALID_ENUM => "GL_INVALID_ENUM",
        codes::INVALID_VALUE => "GL_INVALID_VALUE",
        codes::INVALID_OPERATION => "GL_INVALID_OPERATION",
        codes::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        codes::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        _ => "unknown",
    }
}

fn describe(found: &[ErrorCode]) -> String {
    found
        .iter()
        .map(|c| format!("{c:#06x}"))
        .collect::<Vec<_>>()
        .join(", ")
}
