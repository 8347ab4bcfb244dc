// Pre-flight checks on submitted source, run before anything touches disk.
// The entry-point check is a textual heuristic, not a parse.

use crate::error::ValidationError;
use arbiter_common::types::TestCase;

pub fn validate(source: &str, entry_point_marker: &str, max_bytes: usize) -> Result<(), ValidationError> {
    if source.trim().is_empty() {
        return Err(ValidationError::EmptySource);
    }

    if source.len() > max_bytes {
        return Err(ValidationError::SourceTooLarge {
            size: source.len(),
            limit: max_bytes,
        });
    }

    if !source.contains(entry_point_marker) {
        return Err(ValidationError::MissingEntryPoint);
    }

    Ok(())
}

/// Reject any case whose stdin is larger than `max_bytes`. Cases are numbered from 1.
pub fn validate_inputs(test_cases: &[TestCase], max_bytes: usize) -> Result<(), ValidationError> {
    for (idx, test_case) in test_cases.iter().enumerate() {
        if test_case.input.len() > max_bytes {
            return Err(ValidationError::InputTooLarge {
                case_number: idx + 1,
                size: test_case.input.len(),
                limit: max_bytes,
            });
        }
    }
    Ok(())
}
