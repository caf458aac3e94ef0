//! TOML persistence of the carry-forward, so a run can resume in a later
//! process.

use std::fs;
use std::path::Path;

use super::IoError;
use crate::model::CarryForward;

/// Encodes a carry-forward as TOML.
///
/// # Errors
///
/// Returns `IoError::StateEncode` if serialization fails.
pub fn to_toml_string(carry: &CarryForward) -> Result<String, IoError> {
    Ok(toml::to_string(carry)?)
}

/// Decodes a carry-forward from TOML.
///
/// # Errors
///
/// Returns `IoError::StateDecode` on malformed input.
pub fn from_toml_str(s: &str) -> Result<CarryForward, IoError> {
    Ok(toml::from_str(s)?)
}

/// Writes the carry-forward to `path`.
///
/// # Errors
///
/// Returns an `IoError` if encoding or writing fails.
pub fn save_state(carry: &CarryForward, path: &Path) -> Result<(), IoError> {
    let text = to_toml_string(carry)?;
    fs::write(path, text).map_err(|source| IoError::File {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a carry-forward from `path`.
///
/// # Errors
///
/// Returns an `IoError` if the file cannot be read or decoded.
pub fn load_state(path: &Path) -> Result<CarryForward, IoError> {
    let text = fs::read_to_string(path).map_err(|source| IoError::File {
        path: path.to_path_buf(),
        source,
    })?;
    from_toml_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ControlAction;

    #[test]
    fn carry_survives_encoding() {
        let mut carry = CarryForward::fresh(2, 2);
        carry.counters.consec_cap = 2;
        carry.counters.old_day = Some(3);
        carry.transformers[1].control_done = true;
        carry.transformers[1].tap = Some(-4);
        carry.transformers[1].mvar = Some(6.5);
        carry.transformers[1].prev_ctl = Some(ControlAction::Lower);
        carry.capacitors[0].trip_ex = true;

        let text = to_toml_string(&carry).unwrap_or_default();
        assert!(text.contains("prev_ctl = \"lower\""));
        let back = from_toml_str(&text).ok();
        assert_eq!(back.as_ref(), Some(&carry));
    }

    #[test]
    fn bank_carry_holds_counts_and_last_control() {
        let mut carry = CarryForward::fresh(0, 1);
        carry.capacitors[0].prev_ctl = Some(ControlAction::Close);
        carry.capacitors[0].nc_close = 1;
        let text = to_toml_string(&carry).unwrap_or_default();
        assert!(text.contains("nc_close = 1"));
        assert!(!text.contains("control_done"));
    }

    #[test]
    fn missing_fields_default() {
        let text = "[counters]\nconsec_tap = 1\n";
        let carry = from_toml_str(text).ok();
        assert_eq!(carry.as_ref().map(|c| c.counters.consec_tap), Some(1));
        assert_eq!(carry.as_ref().map(|c| c.transformers.len()), Some(0));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            from_toml_str("counters = 5"),
            Err(IoError::StateDecode(_))
        ));
    }
}
