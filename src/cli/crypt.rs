use crate::engine::{BoxSize, Key, StreamCipher};
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension given to encrypted files by default
pub const CIPHERTEXT_EXTENSION: &str = "rc4";

/// Extension given to decrypted files whose name has no `.rc4` to strip
pub const PLAINTEXT_EXTENSION: &str = "plain";

/// Options for the encrypt and decrypt commands
#[derive(Debug, Clone)]
pub struct CryptOptions {
    pub key: Vec<u8>,
    pub box_size: usize,
}

impl Default for CryptOptions {
    fn default() -> Self {
        Self {
            key: Vec::new(),
            box_size: BoxSize::default().get(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Result of a file operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptSummary {
    pub output: PathBuf,
    pub bytes: usize,
}

/// Output path used when none is given.
///
/// Encrypting `data.txt` writes `data.txt.rc4`. Decrypting `data.txt.rc4`
/// writes `data.txt`; any other name gets `.plain` appended.
pub fn default_output_path(input: &Path, direction: Direction) -> PathBuf {
    match direction {
        Direction::Encrypt => append_extension(input, CIPHERTEXT_EXTENSION),
        Direction::Decrypt => {
            if input.extension().is_some_and(|ext| ext == CIPHERTEXT_EXTENSION) {
                input.with_extension("")
            } else {
                append_extension(input, PLAINTEXT_EXTENSION)
            }
        }
    }
}

fn append_extension(path: &Path, extension: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".");
    os.push(extension);
    PathBuf::from(os)
}

pub fn encrypt_file(input: &Path, output: Option<&Path>, options: &CryptOptions) -> Result<CryptSummary> {
    crypt_file(input, output, options, Direction::Encrypt)
}

pub fn decrypt_file(input: &Path, output: Option<&Path>, options: &CryptOptions) -> Result<CryptSummary> {
    crypt_file(input, output, options, Direction::Decrypt)
}

/// Read `input` fully, run it through the cipher, write the result.
///
/// Key and box size are validated before the input is read, so a bad key
/// never leaves a partial output file behind.
pub fn crypt_file(
    input: &Path,
    output: Option<&Path>,
    options: &CryptOptions,
    direction: Direction,
) -> Result<CryptSummary> {
    let cipher = StreamCipher::new(Key::new(options.key.as_slice())?, BoxSize::new(options.box_size)?)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input, direction));

    let mut data = std::fs::read(input)?;
    cipher.crypt_in_place(&mut data);
    std::fs::write(&output, &data)?;

    debug!(?direction, bytes = data.len(), output = %output.display(), "file processed");
    Ok(CryptSummary {
        output,
        bytes: data.len(),
    })
}
