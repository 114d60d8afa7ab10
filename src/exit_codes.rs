use crate::config::ConfigError;
use crate::envelope::EnvelopeError;
use crate::legacy_gpg::GpgError;
use crate::prompt::PromptError;
use crate::record::RecordError;
use crate::vault::VaultError;
use crate::vault::fileformat::FormatError;
use std::process::ExitCode;

pub const EXIT_USAGE: u8 = 64;
pub const EXIT_IO: u8 = 2;
pub const EXIT_SOFTWARE: u8 = 1;

pub fn exit_code_for_config_error(error: &ConfigError) -> ExitCode {
    match error {
        ConfigError::HomeDirUnavailable | ConfigError::Io(_) => ExitCode::from(EXIT_IO),
        ConfigError::Parse(_) | ConfigError::Serialize(_) => ExitCode::from(EXIT_SOFTWARE),
    }
}

pub fn exit_code_for_prompt_error(error: &PromptError) -> ExitCode {
    match error {
        PromptError::Io(_) => ExitCode::from(EXIT_IO),
        PromptError::Empty | PromptError::Mismatch => ExitCode::from(EXIT_USAGE),
    }
}

pub fn exit_code_for_record_error(_error: &RecordError) -> ExitCode {
    ExitCode::from(EXIT_USAGE)
}

pub fn exit_code_for_format_error(error: &FormatError) -> ExitCode {
    match error {
        FormatError::InvalidUtf8 | FormatError::FieldCountMismatch { .. } => {
            ExitCode::from(EXIT_USAGE)
        }
        FormatError::Record(_) => ExitCode::from(EXIT_USAGE),
    }
}

pub fn exit_code_for_envelope_error(error: &EnvelopeError) -> ExitCode {
    use EnvelopeError::*;
    match error {
        Aead(_) => ExitCode::from(EXIT_USAGE),
        BadMagic | CorruptHeader | ChecksumMismatch | Truncated | SaltTooShort(_)
        | UnsupportedKdf(_) | UnknownCompression(_) | UnknownCipher(_) => {
            ExitCode::from(EXIT_SOFTWARE)
        }
        Kdf(_) | Compress(_) | Base64(_) => ExitCode::from(EXIT_SOFTWARE),
        NoKey => ExitCode::from(EXIT_SOFTWARE),
    }
}

pub fn exit_code_for_vault_error(error: &VaultError) -> ExitCode {
    use VaultError::*;
    match error {
        AuthFailed => ExitCode::from(EXIT_USAGE),
        ItemNotFound(_) | IllegalField | UnknownColumn(_) => ExitCode::from(EXIT_USAGE),
        IllegalValue(e) => exit_code_for_record_error(e),
        Envelope(e) => exit_code_for_envelope_error(e),
        Format(e) => exit_code_for_format_error(e),
        Io(_) => ExitCode::from(EXIT_IO),
        Json(_) => ExitCode::from(EXIT_SOFTWARE),
    }
}

pub fn exit_code_for_gpg_error(error: &GpgError) -> ExitCode {
    match error {
        GpgError::Spawn(_) => ExitCode::from(EXIT_IO),
        GpgError::Failed(_) => ExitCode::from(EXIT_SOFTWARE),
    }
}
