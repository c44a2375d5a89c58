use clap::{Args, Parser, Subcommand};
use rc4lab::cli::{decrypt_file, encrypt_file, show_test, CryptOptions, TestOptions};
use rc4lab::harness::{TestKind, TrialCount, DEFAULT_KEY_SIZE};
use rc4lab::{Key, Rc4Error, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Version info from build.rs
const VERSION: &str = env!("RC4LAB_VERSION");
const BUILD: &str = env!("RC4LAB_BUILD");
const PROFILE: &str = env!("RC4LAB_PROFILE");
const GIT_HASH: &str = env!("RC4LAB_GIT_HASH");

/// Environment variable holding the log filter
const LOG_ENV: &str = "RC4LAB_LOG";

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "rc4lab")]
#[command(author, about = "RC4 stream cipher and key-scheduling bias tests", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file
    #[command(alias = "e")]
    Encrypt(CryptArgs),

    /// Decrypt a file
    #[command(alias = "d")]
    Decrypt(CryptArgs),

    /// Measure how often each S-box position survives key scheduling
    #[command(alias = "s")]
    SwapTest(TestArgs),

    /// Measure keystream value frequencies for one key
    #[command(alias = "r")]
    RandomTest(TestArgs),
}

#[derive(Args)]
struct CryptArgs {
    /// Key text (the UTF-8 bytes of the text are the key)
    #[arg(long, required_unless_present = "key_hex", conflicts_with = "key_hex")]
    key: Option<String>,

    /// Key as hex digits
    #[arg(long)]
    key_hex: Option<String>,

    /// S-box size (1-256)
    #[arg(long, default_value_t = 256)]
    box_size: usize,

    /// Input file
    input: PathBuf,

    /// Output file (default derived from the input name)
    output: Option<PathBuf>,
}

#[derive(Args)]
struct TestArgs {
    /// Number of trials; invalid values fall back to 100000
    #[arg(long, allow_hyphen_values = true)]
    count: Option<String>,

    /// Length of each random trial key
    #[arg(long, default_value_t = DEFAULT_KEY_SIZE)]
    key_size: usize,

    /// S-box size
    #[arg(long, default_value_t = 256)]
    box_size: usize,

    /// Seed for the trial-key generator
    #[arg(long)]
    seed: Option<u64>,

    /// Print the raw payload as JSON
    #[arg(long)]
    json: bool,
}

impl CryptArgs {
    fn options(&self) -> Result<CryptOptions> {
        let key = match (&self.key, &self.key_hex) {
            (_, Some(hex)) => Key::from_hex(hex)?,
            (Some(text), None) => text.parse::<Key>()?,
            (None, None) => return Err(Rc4Error::InvalidKey),
        };
        Ok(CryptOptions {
            key: key.as_bytes().to_vec(),
            box_size: self.box_size,
        })
    }
}

impl TestArgs {
    fn options(&self, kind: TestKind) -> TestOptions {
        TestOptions {
            kind,
            count: self
                .count
                .as_deref()
                .map(TrialCount::parse_lenient)
                .unwrap_or_default(),
            key_size: self.key_size,
            box_size: self.box_size,
            seed: self.seed,
            json: self.json,
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("rc4lab=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Encrypt(crypt) => {
            let summary = encrypt_file(&crypt.input, crypt.output.as_deref(), &crypt.options()?)?;
            println!("Encrypted {} bytes to {}", summary.bytes, summary.output.display());
        }
        Commands::Decrypt(crypt) => {
            let summary = decrypt_file(&crypt.input, crypt.output.as_deref(), &crypt.options()?)?;
            println!("Decrypted {} bytes to {}", summary.bytes, summary.output.display());
        }
        Commands::SwapTest(test) => {
            print!("{}", show_test(&test.options(TestKind::SwapPersistence))?);
        }
        Commands::RandomTest(test) => {
            print!("{}", show_test(&test.options(TestKind::Randomness))?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("rc4lab {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            if let Err(e) = Cli::command().print_help() {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
            println!();
            return ExitCode::SUCCESS;
        }
    };

    init_logging();

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
