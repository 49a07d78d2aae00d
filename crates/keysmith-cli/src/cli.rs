use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "keysmith",
    about = "Generate keys, encrypt files, and keep keys in a local store",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate a new 256-bit key and print it as hex.
    Keygen {
        /// Also store the key under this id.
        #[arg(long, value_name = "ID")]
        save: Option<String>,
    },
    /// Encrypt a file; prints the IV needed for decryption.
    Encrypt(EncryptArgs),
    /// Decrypt a file produced by `encrypt`.
    Decrypt(DecryptArgs),
    /// Manage stored keys.
    #[command(subcommand)]
    Key(KeyCommand),
    /// Round-trip a probe record through the configured store.
    Health,
    /// Print version and exit.
    Version,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Where the encryption key comes from: literal hex or a stored id.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
#[group(required = true, multiple = false)]
pub struct KeySource {
    /// Key as 64 hex characters.
    #[arg(long, value_name = "HEX")]
    pub key: Option<String>,
    /// Id of a key in the store.
    #[arg(long, value_name = "ID")]
    pub key_id: Option<String>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct EncryptArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    #[command(flatten)]
    pub source: KeySource,
    /// Write `<iv>:<base64>` text instead of raw bytes.
    #[arg(long)]
    pub armor: bool,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct DecryptArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    #[command(flatten)]
    pub source: KeySource,
    /// IV printed by `encrypt` (32 hex characters). Not needed with --armor.
    #[arg(long, value_name = "HEX", required_unless_present = "armor")]
    pub iv: Option<String>,
    /// Input is armored text carrying its own IV.
    #[arg(long)]
    pub armor: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum KeyCommand {
    /// Store a key under an id (overwrites).
    Put { id: String, key: String },
    /// Print the key stored under an id.
    Get { id: String },
    /// Delete the key stored under an id.
    Delete { id: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}
