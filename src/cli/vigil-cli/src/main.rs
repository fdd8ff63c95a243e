//! Vigil CLI - Command line interface.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use clap::{Parser, Subcommand};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use vigil_crypto::random::OsRng;
use vigil_crypto::{aead, random, signature, CipherConfig, CryptoError, SignatureConfig};
use vigil_policy::PasswordPolicy;
use vigil_sanitize::{Sanitizer, SanitizerConfig, DEFAULT_FORBIDDEN_PATTERNS};

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Vigil CLI - Password policy, encryption, signatures and input sanitizing")]
#[command(version)]
struct Cli {
    /// Vigil server address
    #[arg(long, default_value = "http://localhost:5000", env = "VIGIL_ADDR")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the server whether a password is secure
    Validate {
        /// Password (or read from stdin if not provided)
        password: Option<String>,
    },
    /// Check a password locally and show which rules fail
    Check {
        /// Password (or read from stdin if not provided)
        password: Option<String>,
        /// Minimum password length
        #[arg(long, default_value_t = vigil_policy::DEFAULT_MIN_LENGTH)]
        min_length: usize,
        /// Allowed symbols
        #[arg(long, default_value = vigil_policy::DEFAULT_SYMBOLS)]
        symbols: String,
    },
    /// Encrypt and decrypt a message with a one-off AES-GCM key
    Encrypt {
        /// Message to encrypt
        message: String,
        /// Key length in bits (128 or 256)
        #[arg(long, default_value_t = 128)]
        key_bits: usize,
        /// Associated data to authenticate
        #[arg(long)]
        aad: Option<String>,
        /// Flip one ciphertext bit before decrypting
        #[arg(long)]
        tamper: bool,
    },
    /// Sign a message with a one-off RSA-PSS key pair and verify it
    Sign {
        /// Message to sign
        message: String,
        /// RSA modulus size in bits
        #[arg(long, default_value_t = 2048)]
        key_size: usize,
        /// PSS salt length in bytes
        #[arg(long, default_value_t = 32)]
        salt_len: usize,
        /// Digest (sha256, sha384, sha512)
        #[arg(long, default_value = "sha256")]
        hash: String,
        /// Also verify the signature against this altered message
        #[arg(long)]
        altered: Option<String>,
    },
    /// Sanitize untrusted text
    Sanitize {
        /// Text to sanitize
        text: String,
        /// Maximum length in characters
        #[arg(long, default_value_t = vigil_sanitize::DEFAULT_MAX_LENGTH)]
        max_length: usize,
        /// Forbidden pattern (repeatable, replaces the defaults)
        #[arg(long = "forbid")]
        forbid: Vec<String>,
    },
    /// Check server status
    Status,
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
struct ValidateRequest<'a> {
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    secure: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// HTTP Client
// ============================================================================

struct VigilClient {
    client: Client,
    base_url: String,
}

impl VigilClient {
    fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_health(&self) -> Result<HealthResponse> {
        let resp = self
            .client
            .get(self.url("/v1/sys/health"))
            .send()
            .await
            .context("Failed to connect to server")?;

        if !resp.status().is_success() {
            let error: ErrorResponse = resp.json().await.unwrap_or(ErrorResponse {
                error: "Unknown error".into(),
            });
            bail!("Server error: {}", error.error);
        }

        resp.json().await.context("Failed to parse response")
    }

    async fn validate(&self, password: &str) -> Result<ValidateResponse> {
        let resp = self
            .client
            .post(self.url("/validate"))
            .json(&ValidateRequest { password })
            .send()
            .await
            .context("Failed to connect to server")?;

        if !resp.status().is_success() {
            let error: ErrorResponse = resp.json().await.unwrap_or(ErrorResponse {
                error: "Unknown error".into(),
            });
            bail!("Validation failed: {}", error.error);
        }

        resp.json().await.context("Failed to parse response")
    }
}

// ============================================================================
// Commands
// ============================================================================

fn read_password(password: Option<String>) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None => {
            print!("Enter password: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string())
        },
    }
}

async fn cmd_status(client: &VigilClient) -> Result<()> {
    let health = client.get_health().await?;

    println!("Vigil server status:");
    println!("  Status:  {}", health.status);
    println!("  Version: {}", health.version);

    Ok(())
}

async fn cmd_validate(client: &VigilClient, password: Option<String>) -> Result<()> {
    let password = read_password(password)?;
    let result = client.validate(&password).await?;

    println!("secure: {}", result.secure);

    Ok(())
}

fn cmd_check(password: Option<String>, min_length: usize, symbols: &str) -> Result<()> {
    let policy = PasswordPolicy::new(min_length, symbols)?;
    let password = read_password(password)?;
    let report = policy.check(&password);

    if report.is_secure() {
        println!("Password is secure.");
    } else {
        println!("Password is NOT secure. Failed rules:");
        for rule in report.failures() {
            println!("  - {}", rule);
        }
    }

    Ok(())
}

fn cmd_encrypt(message: &str, key_bits: usize, aad: Option<&str>, tamper: bool) -> Result<()> {
    let config = CipherConfig {
        key_bits,
        ..CipherConfig::default()
    };
    let key = config.generate_key(&mut OsRng)?;
    let nonce = random::generate_nonce(&mut OsRng)?;
    let aad = aad.map(str::as_bytes);

    let mut ciphertext = aead::encrypt(&key, &nonce, message.as_bytes(), aad)?;

    println!("Algorithm:  AES-{}-GCM", key.bit_length());
    println!("Nonce:      {}", BASE64.encode(nonce.as_bytes()));
    println!("Ciphertext: {}", BASE64.encode(&ciphertext));

    if tamper {
        ciphertext[0] ^= 0x01;
        println!("Flipped one ciphertext bit.");
    }

    match aead::decrypt(&key, &nonce, &ciphertext, aad) {
        Ok(plaintext) => {
            let text = std::str::from_utf8(&plaintext).context("Plaintext is not UTF-8")?;
            println!("Decrypted:  {}", text);
            Ok(())
        },
        Err(CryptoError::AuthenticationFailed) => {
            bail!("Authentication failed while decrypting (invalid tag)")
        },
        Err(e) => Err(e.into()),
    }
}

fn cmd_sign(
    message: &str,
    key_size: usize,
    salt_len: usize,
    hash: &str,
    altered: Option<&str>,
) -> Result<()> {
    let config = SignatureConfig {
        key_size,
        hash: hash.parse()?,
        salt_len,
        ..SignatureConfig::default()
    };
    config.validate()?;
    let params = config.params();

    println!("Generating {}-bit RSA key pair...", key_size);
    let pair = signature::generate_keypair(&mut OsRng, &config)?;

    let sig = signature::sign(&mut OsRng, pair.private_key(), message.as_bytes(), &params)?;
    println!("Message:   {}", message);
    println!("Signature: {}", BASE64.encode(sig.as_bytes()));

    match signature::verify(pair.public_key(), message.as_bytes(), &sig, &params) {
        Ok(()) => println!("Verification succeeded: signature matches message and public key."),
        Err(CryptoError::InvalidSignature) => bail!("Verification failed for the original message"),
        Err(e) => return Err(e.into()),
    }

    if let Some(altered) = altered {
        match signature::verify(pair.public_key(), altered.as_bytes(), &sig, &params) {
            Ok(()) => bail!("Altered message verified; this must not happen"),
            Err(CryptoError::InvalidSignature) => {
                println!("Altered message rejected: signature does not match.")
            },
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn cmd_sanitize(text: &str, max_length: usize, forbid: Vec<String>) -> Result<()> {
    let forbidden_patterns = if forbid.is_empty() {
        DEFAULT_FORBIDDEN_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .collect()
    } else {
        forbid
    };

    let sanitizer = Sanitizer::new(SanitizerConfig {
        max_length,
        forbidden_patterns,
    })?;

    let sanitized = sanitizer.sanitize(text)?;
    println!("{}", sanitized);

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => cmd_status(&VigilClient::new(&cli.addr)?).await,
        Commands::Validate { password } => {
            cmd_validate(&VigilClient::new(&cli.addr)?, password).await
        },
        Commands::Check {
            password,
            min_length,
            symbols,
        } => cmd_check(password, min_length, &symbols),
        Commands::Encrypt {
            message,
            key_bits,
            aad,
            tamper,
        } => cmd_encrypt(&message, key_bits, aad.as_deref(), tamper),
        Commands::Sign {
            message,
            key_size,
            salt_len,
            hash,
            altered,
        } => cmd_sign(&message, key_size, salt_len, &hash, altered.as_deref()),
        Commands::Sanitize {
            text,
            max_length,
            forbid,
        } => cmd_sanitize(&text, max_length, forbid),
    }
}
